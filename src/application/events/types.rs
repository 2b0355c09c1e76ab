//! Notification events
//!
//! Everything the admin dashboard can subscribe to over the notification
//! WebSocket.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::station::SlotStatus;
use crate::domain::{BookingRequest, RequestKind, RequestStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Event {
    StationCreated(StationEvent),
    StationUpdated(StationEvent),
    StationDeleted(StationEvent),
    SlotStatusChanged(SlotStatusChangedEvent),
    /// A booking or emergency request entered the pending queue
    RequestSubmitted(RequestSubmittedEvent),
    RequestDecided(RequestDecidedEvent),
}

impl Event {
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::StationCreated(_) => "station_created",
            Event::StationUpdated(_) => "station_updated",
            Event::StationDeleted(_) => "station_deleted",
            Event::SlotStatusChanged(_) => "slot_status_changed",
            Event::RequestSubmitted(_) => "request_submitted",
            Event::RequestDecided(_) => "request_decided",
        }
    }

    /// Station the event concerns, if any
    pub fn station_id(&self) -> Option<&str> {
        match self {
            Event::StationCreated(e) | Event::StationUpdated(e) | Event::StationDeleted(e) => {
                Some(&e.station_id)
            }
            Event::SlotStatusChanged(e) => Some(&e.station_id),
            Event::RequestSubmitted(e) => e.station_id.as_deref(),
            Event::RequestDecided(e) => e.station_id.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationEvent {
    pub station_id: String,
    pub name: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotStatusChangedEvent {
    pub station_id: String,
    pub slot_id: String,
    pub old_status: Option<SlotStatus>,
    pub new_status: SlotStatus,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestSubmittedEvent {
    pub request_id: String,
    pub kind: RequestKind,
    pub user_id: String,
    pub user_name: String,
    pub station_id: Option<String>,
    pub slot_id: Option<String>,
    /// Pending requests after this one was added
    pub pending_count: u64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestDecidedEvent {
    pub request_id: String,
    pub kind: RequestKind,
    pub status: RequestStatus,
    pub decided_by: String,
    pub station_id: Option<String>,
    pub slot_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl RequestSubmittedEvent {
    pub fn from_request(request: &BookingRequest, pending_count: u64) -> Self {
        let (station_id, slot_id) = split_slot_ref(request);
        Self {
            request_id: request.id.clone(),
            kind: request.kind(),
            user_id: request.user_id.clone(),
            user_name: request.user_name.clone(),
            station_id,
            slot_id,
            pending_count,
            timestamp: request.created_at,
        }
    }
}

impl RequestDecidedEvent {
    pub fn from_request(request: &BookingRequest) -> Self {
        let (station_id, slot_id) = split_slot_ref(request);
        Self {
            request_id: request.id.clone(),
            kind: request.kind(),
            status: request.status,
            decided_by: request.decided_by.clone().unwrap_or_default(),
            station_id,
            slot_id,
            timestamp: request.decided_at.unwrap_or_else(Utc::now),
        }
    }
}

fn split_slot_ref(request: &BookingRequest) -> (Option<String>, Option<String>) {
    match request.slot_ref() {
        Some((station, slot)) => (Some(station.to_string()), Some(slot.to_string())),
        None => (None, None),
    }
}

/// Envelope sent to subscribers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: Event,
}

impl EventMessage {
    pub fn new(event: Event) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RequestDetails;

    #[test]
    fn message_serializes_with_type_tag() {
        let msg = EventMessage::new(Event::StationDeleted(StationEvent {
            station_id: "station-1".into(),
            name: "Central Green Charge".into(),
            timestamp: Utc::now(),
        }));
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "StationDeleted");
        assert_eq!(json["data"]["station_id"], "station-1");
        assert!(json["id"].is_string());
    }

    #[test]
    fn emergency_events_have_no_station() {
        let request = BookingRequest::new(
            None,
            "Guest",
            RequestDetails::Emergency {
                location: "Ring Road".into(),
                vehicle_type: "SUV".into(),
                message: None,
            },
        );
        let event = Event::RequestSubmitted(RequestSubmittedEvent::from_request(&request, 1));
        assert_eq!(event.event_type(), "request_submitted");
        assert_eq!(event.station_id(), None);
    }
}
