//! Booking / emergency request handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{
    CreateBookingRequest, CreateEmergencyRequest, ListRequestsParams, PendingCountDto, RequestDto,
};
use crate::application::services::BookingService;
use crate::domain::Decision;
use crate::interfaces::http::common::{
    error_response, ok, ApiError, ApiResponse, ApiResult, PaginatedResponse, PaginationParams,
    ValidatedJson,
};
use crate::interfaces::http::middleware::AuthenticatedUser;
use crate::shared::validate_pagination;

#[derive(Clone)]
pub struct RequestHandlerState {
    pub bookings: Arc<BookingService>,
}

type Created = Result<(StatusCode, Json<ApiResponse<RequestDto>>), ApiError>;

#[utoipa::path(
    post,
    path = "/api/v1/requests/booking",
    tag = "Requests",
    security((), ("bearer_auth" = [])),
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking request queued", body = ApiResponse<RequestDto>),
        (status = 404, description = "Station or slot not found"),
        (status = 409, description = "Slot not available"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn submit_booking(
    State(state): State<RequestHandlerState>,
    user: Option<Extension<AuthenticatedUser>>,
    ValidatedJson(body): ValidatedJson<CreateBookingRequest>,
) -> Created {
    let submitter = user.map(|Extension(u)| u.as_submitter());
    let request = state
        .bookings
        .submit_booking(submitter.as_ref(), body.into())
        .await
        .map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(request.into()))))
}

#[utoipa::path(
    post,
    path = "/api/v1/requests/emergency",
    tag = "Requests",
    security((), ("bearer_auth" = [])),
    request_body = CreateEmergencyRequest,
    responses(
        (status = 201, description = "Emergency request queued", body = ApiResponse<RequestDto>),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn submit_emergency(
    State(state): State<RequestHandlerState>,
    user: Option<Extension<AuthenticatedUser>>,
    ValidatedJson(body): ValidatedJson<CreateEmergencyRequest>,
) -> Created {
    let submitter = user.map(|Extension(u)| u.as_submitter());
    let request = state
        .bookings
        .submit_emergency(submitter.as_ref(), body.into())
        .await
        .map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(request.into()))))
}

#[utoipa::path(
    get,
    path = "/api/v1/requests/mine",
    tag = "Requests",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses(
        (status = 200, description = "Caller's requests, newest first", body = ApiResponse<PaginatedResponse<RequestDto>>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn my_requests(
    State(state): State<RequestHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(params): Query<PaginationParams>,
) -> ApiResult<PaginatedResponse<RequestDto>> {
    let (page, limit) = params.resolve();
    let result = state
        .bookings
        .list_for_user(&user.user_id, page, limit)
        .await
        .map_err(error_response)?;
    ok(result.into())
}

#[utoipa::path(
    get,
    path = "/api/v1/requests",
    tag = "Requests",
    security(("bearer_auth" = [])),
    params(ListRequestsParams),
    responses(
        (status = 200, description = "Requests, newest first", body = ApiResponse<PaginatedResponse<RequestDto>>),
        (status = 403, description = "Admin only")
    )
)]
pub async fn list_requests(
    State(state): State<RequestHandlerState>,
    Query(params): Query<ListRequestsParams>,
) -> ApiResult<PaginatedResponse<RequestDto>> {
    let (page, limit) = validate_pagination(params.page, params.limit);
    let result = state
        .bookings
        .list(params.status, params.kind, page, limit)
        .await
        .map_err(error_response)?;
    ok(result.into())
}

#[utoipa::path(
    get,
    path = "/api/v1/requests/pending/count",
    tag = "Requests",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Pending requests for the notification badge", body = ApiResponse<PendingCountDto>)
    )
)]
pub async fn pending_count(State(state): State<RequestHandlerState>) -> ApiResult<PendingCountDto> {
    let pending = state.bookings.count_pending().await.map_err(error_response)?;
    ok(PendingCountDto { pending })
}

#[utoipa::path(
    get,
    path = "/api/v1/requests/{id}",
    tag = "Requests",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request details", body = ApiResponse<RequestDto>),
        (status = 404, description = "Request not found")
    )
)]
pub async fn get_request(
    State(state): State<RequestHandlerState>,
    Path(id): Path<String>,
) -> ApiResult<RequestDto> {
    let request = state.bookings.get(&id).await.map_err(error_response)?;
    ok(request.into())
}

#[utoipa::path(
    post,
    path = "/api/v1/requests/{id}/approve",
    tag = "Requests",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Approved; a booking's slot is now occupied", body = ApiResponse<RequestDto>),
        (status = 400, description = "Booking data incomplete"),
        (status = 404, description = "Request, station or slot not found"),
        (status = 409, description = "Already processed or slot taken")
    )
)]
pub async fn approve_request(
    State(state): State<RequestHandlerState>,
    Extension(admin): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<RequestDto> {
    decide(&state, &id, Decision::Approve, &admin).await
}

#[utoipa::path(
    post,
    path = "/api/v1/requests/{id}/reject",
    tag = "Requests",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Rejected", body = ApiResponse<RequestDto>),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Already processed")
    )
)]
pub async fn reject_request(
    State(state): State<RequestHandlerState>,
    Extension(admin): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<RequestDto> {
    decide(&state, &id, Decision::Reject, &admin).await
}

async fn decide(
    state: &RequestHandlerState,
    id: &str,
    decision: Decision,
    admin: &AuthenticatedUser,
) -> ApiResult<RequestDto> {
    let request = state
        .bookings
        .decide(id, decision, &admin.user_id)
        .await
        .map_err(error_response)?;
    ok(request.into())
}
