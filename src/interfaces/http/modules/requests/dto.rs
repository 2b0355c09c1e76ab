//! Request DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::services::{BookingSubmission, EmergencySubmission};
use crate::domain::station::model::slot_label;
use crate::domain::{BookingRequest, RequestDetails, RequestKind, RequestStatus};

/// Flat request representation; kind-specific fields are omitted when empty
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RequestDto {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: RequestKind,
    pub status: RequestStatus,
    pub user_id: String,
    pub user_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub station_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub station_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot_id: Option<String>,
    /// `3` for `slot-3`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
    pub decided_by: Option<String>,
}

impl From<BookingRequest> for RequestDto {
    fn from(r: BookingRequest) -> Self {
        let mut dto = Self {
            id: r.id,
            kind: r.details.kind(),
            status: r.status,
            user_id: r.user_id,
            user_name: r.user_name,
            phone_number: r.phone_number,
            duration_minutes: r.duration_minutes,
            station_id: None,
            station_name: None,
            slot_id: None,
            slot_label: None,
            vehicle_number: None,
            location: None,
            vehicle_type: None,
            message: None,
            created_at: r.created_at,
            decided_at: r.decided_at,
            decided_by: r.decided_by,
        };
        match r.details {
            RequestDetails::Booking {
                station_id,
                station_name,
                slot_id,
                vehicle_number,
            } => {
                dto.slot_label = Some(slot_label(&slot_id).to_string());
                dto.station_id = Some(station_id);
                dto.station_name = Some(station_name);
                dto.slot_id = Some(slot_id);
                dto.vehicle_number = Some(vehicle_number);
            }
            RequestDetails::Emergency {
                location,
                vehicle_type,
                message,
            } => {
                dto.location = Some(location);
                dto.vehicle_type = Some(vehicle_type);
                dto.message = message;
            }
        }
        dto
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBookingRequest {
    #[validate(length(min = 1, message = "Station is required."))]
    pub station_id: String,
    #[validate(length(min = 1, message = "Please select a slot."))]
    pub slot_id: String,
    #[validate(length(min = 3, message = "Vehicle number must be at least 3 characters."))]
    pub vehicle_number: String,
    /// Booking on behalf of someone else
    #[validate(length(min = 2, message = "Name must be at least 2 characters."))]
    pub user_name: Option<String>,
    #[validate(length(min = 10, message = "Please enter a valid phone number."))]
    pub phone_number: Option<String>,
    #[validate(range(min = 1, max = 1440, message = "Duration must be between 1 and 1440 minutes."))]
    pub duration_minutes: Option<u32>,
}

impl From<CreateBookingRequest> for BookingSubmission {
    fn from(b: CreateBookingRequest) -> Self {
        Self {
            station_id: b.station_id,
            slot_id: b.slot_id,
            vehicle_number: b.vehicle_number,
            user_name: b.user_name,
            phone_number: b.phone_number,
            duration_minutes: b.duration_minutes,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateEmergencyRequest {
    #[validate(length(min = 10, message = "Please provide a more detailed location."))]
    pub location: String,
    #[validate(length(min = 3, message = "Vehicle details must be at least 3 characters."))]
    pub vehicle_type: String,
    pub message: Option<String>,
    #[validate(length(min = 2, message = "Name must be at least 2 characters."))]
    pub user_name: Option<String>,
    #[validate(length(min = 10, message = "Please enter a valid phone number."))]
    pub phone_number: Option<String>,
    #[validate(range(min = 1, max = 1440, message = "Duration must be between 1 and 1440 minutes."))]
    pub duration_minutes: Option<u32>,
}

impl From<CreateEmergencyRequest> for EmergencySubmission {
    fn from(b: CreateEmergencyRequest) -> Self {
        Self {
            location: b.location,
            vehicle_type: b.vehicle_type,
            message: b.message,
            user_name: b.user_name,
            phone_number: b.phone_number,
            duration_minutes: b.duration_minutes,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListRequestsParams {
    /// `pending`, `approved` or `rejected`
    pub status: Option<RequestStatus>,
    /// `booking` or `emergency`
    #[serde(alias = "type")]
    pub kind: Option<RequestKind>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PendingCountDto {
    pub pending: u64,
}
