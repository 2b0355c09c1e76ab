//! Booking request domain entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// User id recorded for requests submitted without a token.
pub const GUEST_USER_ID: &str = "guest";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    Booking,
    Emergency,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Booking => "booking",
            Self::Emergency => "emergency",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "booking" => Some(Self::Booking),
            "emergency" => Some(Self::Emergency),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Admin disposition of a pending request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn target_status(&self) -> RequestStatus {
        match self {
            Self::Approve => RequestStatus::Approved,
            Self::Reject => RequestStatus::Rejected,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
        }
    }
}

/// Kind-specific payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestDetails {
    Booking {
        station_id: String,
        station_name: String,
        slot_id: String,
        vehicle_number: String,
    },
    Emergency {
        location: String,
        vehicle_type: String,
        message: Option<String>,
    },
}

impl RequestDetails {
    pub fn kind(&self) -> RequestKind {
        match self {
            Self::Booking { .. } => RequestKind::Booking,
            Self::Emergency { .. } => RequestKind::Emergency,
        }
    }
}

/// User-submitted request awaiting admin disposition
#[derive(Debug, Clone, PartialEq)]
pub struct BookingRequest {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub phone_number: Option<String>,
    pub duration_minutes: Option<u32>,
    pub details: RequestDetails,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
    pub decided_by: Option<String>,
}

impl BookingRequest {
    /// New pending request with a fresh id
    pub fn new(
        user_id: Option<&str>,
        user_name: impl Into<String>,
        details: RequestDetails,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.unwrap_or(GUEST_USER_ID).to_string(),
            user_name: user_name.into(),
            phone_number: None,
            duration_minutes: None,
            details,
            status: RequestStatus::Pending,
            created_at: Utc::now(),
            decided_at: None,
            decided_by: None,
        }
    }

    pub fn with_contact(mut self, phone_number: Option<String>, duration_minutes: Option<u32>) -> Self {
        self.phone_number = phone_number;
        self.duration_minutes = duration_minutes;
        self
    }

    pub fn kind(&self) -> RequestKind {
        self.details.kind()
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    pub fn is_guest(&self) -> bool {
        self.user_id == GUEST_USER_ID
    }

    /// `(station_id, slot_id)` for booking requests
    pub fn slot_ref(&self) -> Option<(&str, &str)> {
        match &self.details {
            RequestDetails::Booking {
                station_id,
                slot_id,
                ..
            } => Some((station_id.as_str(), slot_id.as_str())),
            RequestDetails::Emergency { .. } => None,
        }
    }

    /// Record an admin decision on the in-memory copy.
    pub fn apply_decision(&mut self, decision: Decision, admin_id: &str, at: DateTime<Utc>) {
        self.status = decision.target_status();
        self.decided_at = Some(at);
        self.decided_by = Some(admin_id.to_string());
    }
}

/// Listing filter; `None` fields match everything
#[derive(Debug, Clone, Default)]
pub struct RequestFilter {
    pub status: Option<RequestStatus>,
    pub kind: Option<RequestKind>,
    pub user_id: Option<String>,
}

// ── Tests ──────────────────────────────────────────────────────
