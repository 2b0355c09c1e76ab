//! Shared HTTP plumbing: response envelope, pagination, error mapping

pub mod validated_json;

pub use validated_json::ValidatedJson;

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::{IntoParams, ToSchema};

use crate::domain::station::model::slot_label;
use crate::domain::DomainError;
use crate::shared::{validate_pagination, PaginatedResult};

/// Standard response envelope.
///
/// Success: `{"success": true, "data": {...}}`,
/// failure: `{"success": false, "data": null, "error": "reason"}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Query parameters for list endpoints
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PaginationParams {
    /// Page number, starting at 1 (default 1)
    pub page: Option<u32>,
    /// Items per page, 1 to 100 (default 20)
    pub limit: Option<u32>,
}

impl PaginationParams {
    pub fn resolve(&self) -> (u32, u32) {
        validate_pagination(self.page, self.limit)
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl<T, U: Into<T>> From<PaginatedResult<U>> for PaginatedResponse<T> {
    fn from(result: PaginatedResult<U>) -> Self {
        Self {
            items: result.items.into_iter().map(Into::into).collect(),
            total: result.total,
            page: result.page,
            limit: result.limit,
            total_pages: result.total_pages,
        }
    }
}

/// Error half of every handler result
pub type ApiError = (StatusCode, Json<ApiResponse<()>>);

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

pub fn status_for(e: &DomainError) -> StatusCode {
    match e {
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::Conflict(_) => StatusCode::CONFLICT,
        DomainError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
        DomainError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Translate a domain error into the response envelope.
///
/// Conflicts and validation failures carry their message verbatim so the
/// dashboard can show the reason; storage details stay in the log.
pub fn error_response(e: DomainError) -> ApiError {
    let status = status_for(&e);
    let message = match e {
        DomainError::Validation(msg) | DomainError::Conflict(msg) => msg,
        DomainError::Unauthorized(msg) | DomainError::Forbidden(msg) => msg,
        DomainError::NotFound { entity, value, .. } => not_found_message(entity, &value),
        DomainError::Storage(detail) => {
            error!(error = %detail, "Storage failure");
            "Internal storage error".to_string()
        }
    };
    (status, Json(ApiResponse::error(message)))
}

fn not_found_message(entity: &str, value: &str) -> String {
    match entity {
        "BookingRequest" => "Request document does not exist".to_string(),
        "Slot" => format!("Slot {} not found in station.", slot_label(value)),
        _ => format!("{} '{}' not found", entity, value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_status_codes() {
        let cases = [
            (DomainError::not_found("Station", "id", "s9"), StatusCode::NOT_FOUND),
            (DomainError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (DomainError::Conflict("taken".into()), StatusCode::CONFLICT),
            (DomainError::Unauthorized("no".into()), StatusCode::UNAUTHORIZED),
            (DomainError::Forbidden("no".into()), StatusCode::FORBIDDEN),
            (DomainError::Storage("locked".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(status_for(&err), status);
        }
    }

    #[test]
    fn conflict_message_is_passed_through() {
        let (status, Json(body)) =
            error_response(DomainError::Conflict("Slot 1 is no longer available.".into()));
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(!body.success);
        assert_eq!(body.error.as_deref(), Some("Slot 1 is no longer available."));
    }

    #[test]
    fn missing_request_and_slot_use_dashboard_wording() {
        let (status, Json(body)) =
            error_response(DomainError::not_found("BookingRequest", "id", "req-9"));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error.as_deref(), Some("Request document does not exist"));

        let (_, Json(body)) = error_response(DomainError::not_found("Slot", "id", "slot-7"));
        assert_eq!(body.error.as_deref(), Some("Slot 7 not found in station."));

        let (_, Json(body)) = error_response(DomainError::not_found("Station", "id", "station-9"));
        assert_eq!(body.error.as_deref(), Some("Station 'station-9' not found"));
    }

    #[test]
    fn storage_detail_is_hidden() {
        let (_, Json(body)) = error_response(DomainError::Storage("disk I/O error".into()));
        assert_eq!(body.error.as_deref(), Some("Internal storage error"));
    }
}
