//! User profile handlers
//!
//! Identities belong to the token issuer; profiles are keyed by the
//! token subject.

use axum::{
    extract::{Query, State},
    Extension,
};

use super::dto::{ProfileDto, UpdateProfileRequest};
use crate::domain::{DomainError, RepositoryProvider, UserProfile};
use crate::interfaces::http::common::{
    error_response, ok, ApiResponse, ApiResult, PaginatedResponse, PaginationParams, ValidatedJson,
};
use crate::interfaces::http::middleware::AuthenticatedUser;

use std::sync::Arc;

#[derive(Clone)]
pub struct UserHandlerState {
    pub repos: Arc<dyn RepositoryProvider>,
}

#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's profile", body = ApiResponse<ProfileDto>),
        (status = 404, description = "No profile stored yet")
    )
)]
pub async fn get_my_profile(
    State(state): State<UserHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<ProfileDto> {
    let profile = state
        .repos
        .users()
        .find_by_id(&user.user_id)
        .await
        .map_err(error_response)?
        .ok_or_else(|| error_response(DomainError::not_found("UserProfile", "id", user.user_id.as_str())))?;
    ok(profile.into())
}

#[utoipa::path(
    put,
    path = "/api/v1/users/me",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile saved", body = ApiResponse<ProfileDto>),
        (status = 400, description = "No email in body or token"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn upsert_my_profile(
    State(state): State<UserHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(body): ValidatedJson<UpdateProfileRequest>,
) -> ApiResult<ProfileDto> {
    let email = body.email.or(user.email).ok_or_else(|| {
        error_response(DomainError::Validation("An email address is required.".to_string()))
    })?;

    let profile = state
        .repos
        .users()
        .upsert(UserProfile::new(user.user_id, body.name.trim(), email))
        .await
        .map_err(error_response)?;
    ok(profile.into())
}

#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses(
        (status = 200, description = "Profiles, newest first", body = ApiResponse<PaginatedResponse<ProfileDto>>),
        (status = 403, description = "Admin only")
    )
)]
pub async fn list_users(
    State(state): State<UserHandlerState>,
    Query(params): Query<PaginationParams>,
) -> ApiResult<PaginatedResponse<ProfileDto>> {
    let (page, limit) = params.resolve();
    let result = state
        .repos
        .users()
        .find_all(page, limit)
        .await
        .map_err(error_response)?;
    ok(result.into())
}
