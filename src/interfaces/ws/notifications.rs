//! WebSocket handler for admin notification clients
//!
//! Browsers cannot set headers on a WebSocket upgrade, so the admin token
//! travels in the `token` query parameter.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::select;
use tracing::{debug, error, info, warn};

use crate::application::events::{EventMessage, SharedEventBus};
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::interfaces::http::middleware::{
    auth_error_response, authenticate_token, AuthError, AuthenticatedUser,
};
use crate::shared::ShutdownSignal;

#[derive(Debug, Default, Deserialize)]
pub struct NotificationQuery {
    pub token: Option<String>,
    /// Comma-separated event types, e.g. `request_submitted,request_decided`
    pub event_types: Option<String>,
    /// Only events concerning this station
    pub station_id: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct EventFilter {
    pub event_types: Option<Vec<String>>,
    pub station_id: Option<String>,
}

impl EventFilter {
    pub fn from_query(query: &NotificationQuery) -> Self {
        let event_types = query.event_types.as_deref().map(|types| {
            types
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
        });
        Self {
            event_types: event_types.filter(|t| !t.is_empty()),
            station_id: query.station_id.clone(),
        }
    }

    pub fn matches(&self, message: &EventMessage) -> bool {
        if let Some(ref types) = self.event_types {
            let event_type = message.event.event_type();
            if !types.iter().any(|t| t == event_type) {
                return false;
            }
        }
        if let Some(ref station_id) = self.station_id {
            if message.event.station_id() != Some(station_id.as_str()) {
                return false;
            }
        }
        true
    }
}

#[derive(Clone)]
pub struct NotificationState {
    pub event_bus: SharedEventBus,
    pub jwt_config: JwtConfig,
    pub shutdown: ShutdownSignal,
}

/// `GET /api/v1/notifications/ws?token=..&event_types=..`
pub async fn ws_notifications_handler(
    ws: WebSocketUpgrade,
    State(state): State<NotificationState>,
    Query(query): Query<NotificationQuery>,
) -> Response {
    let Some(token) = query.token.as_deref() else {
        return auth_error_response(AuthError::MissingToken);
    };
    let admin = match authenticate_token(token, &state.jwt_config) {
        Ok(user) if user.is_admin() => user,
        Ok(_) => return auth_error_response(AuthError::InsufficientPermissions),
        Err(e) => return auth_error_response(e),
    };

    let filter = EventFilter::from_query(&query);
    info!(
        admin_id = %admin.user_id,
        event_types = ?filter.event_types,
        station_id = ?filter.station_id,
        "Notification stream requested"
    );

    ws.on_upgrade(move |socket| handle_notification_socket(socket, state, filter, admin))
        .into_response()
}

async fn handle_notification_socket(
    socket: WebSocket,
    state: NotificationState,
    filter: EventFilter,
    admin: AuthenticatedUser,
) {
    let (mut sender, mut receiver) = socket.split();
    let mut subscriber = state.event_bus.subscribe();
    let shutdown = state.shutdown.clone();

    let welcome = serde_json::json!({
        "type": "connected",
        "message": "Connected to notification stream",
        "filter": {
            "event_types": filter.event_types,
            "station_id": filter.station_id,
        }
    });
    if let Err(e) = sender.send(Message::Text(welcome.to_string().into())).await {
        error!(error = %e, "Failed to send welcome message");
        return;
    }

    loop {
        select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if let Err(e) = sender.send(Message::Pong(data)).await {
                            warn!(error = %e, "Failed to send pong");
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(error = %e, "WebSocket error");
                        break;
                    }
                }
            }

            event = subscriber.recv() => {
                let Some(event_msg) = event else {
                    warn!("Event bus closed");
                    break;
                };
                if !filter.matches(&event_msg) {
                    continue;
                }
                match serde_json::to_string(&event_msg) {
                    Ok(json) => {
                        if let Err(e) = sender.send(Message::Text(json.into())).await {
                            warn!(error = %e, "Failed to send event");
                            break;
                        }
                        debug!(event_type = event_msg.event.event_type(), "Event sent");
                    }
                    Err(e) => error!(error = %e, "Failed to serialize event"),
                }
            }

            _ = shutdown.wait() => {
                let _ = sender.send(Message::Close(None)).await;
                break;
            }
        }
    }

    info!(admin_id = %admin.user_id, "Notification stream closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::events::{Event, RequestSubmittedEvent, StationEvent};
    use crate::domain::{BookingRequest, RequestDetails};
    use chrono::Utc;

    fn station_deleted(id: &str) -> EventMessage {
        EventMessage::new(Event::StationDeleted(StationEvent {
            station_id: id.into(),
            name: "Suburban Fast Fill".into(),
            timestamp: Utc::now(),
        }))
    }

    fn submitted() -> EventMessage {
        let request = BookingRequest::new(
            None,
            "Guest",
            RequestDetails::Emergency {
                location: "Ring Road exit 4".into(),
                vehicle_type: "SUV".into(),
                message: None,
            },
        );
        EventMessage::new(Event::RequestSubmitted(RequestSubmittedEvent::from_request(
            &request, 1,
        )))
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = EventFilter::from_query(&NotificationQuery::default());
        assert!(filter.matches(&station_deleted("station-3")));
        assert!(filter.matches(&submitted()));
    }

    #[test]
    fn event_type_list_is_trimmed() {
        let filter = EventFilter::from_query(&NotificationQuery {
            event_types: Some(" request_submitted , request_decided,".into()),
            ..Default::default()
        });
        assert!(filter.matches(&submitted()));
        assert!(!filter.matches(&station_deleted("station-3")));
    }

    #[test]
    fn station_filter_drops_unrelated_events() {
        let filter = EventFilter::from_query(&NotificationQuery {
            station_id: Some("station-3".into()),
            ..Default::default()
        });
        assert!(filter.matches(&station_deleted("station-3")));
        assert!(!filter.matches(&station_deleted("station-1")));
        assert!(!filter.matches(&submitted()));
    }
}
