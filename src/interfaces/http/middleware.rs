//! Authentication middleware for Axum
//!
//! Bearer tokens are verified against the shared issuer secret. Roles come
//! from the `role` claim; nothing is looked up in the database.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

use super::common::ApiResponse;
use crate::application::services::Submitter;
use crate::domain::UserRole;
use crate::infrastructure::crypto::jwt::{verify_token, JwtConfig, TokenClaims};

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    InsufficientPermissions,
}

#[derive(Clone)]
pub struct AuthState {
    pub jwt_config: JwtConfig,
}

/// Caller identity placed in request extensions
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: UserRole,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: TokenClaims) -> Self {
        let role = claims.role();
        Self {
            user_id: claims.sub,
            name: claims.name,
            email: claims.email,
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn as_submitter(&self) -> Submitter {
        Submitter {
            user_id: self.user_id.clone(),
            name: self.name.clone().or_else(|| self.email.clone()),
        }
    }
}

fn extract_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn bearer_token(request: &Request<Body>) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_token)
}

/// Resolve a raw token to the caller, for transports without headers
pub fn authenticate_token(token: &str, config: &JwtConfig) -> Result<AuthenticatedUser, AuthError> {
    verify_token(token, config)
        .map(AuthenticatedUser::from_claims)
        .map_err(|e| {
            debug!(error = %e, "Token rejected");
            AuthError::InvalidToken
        })
}

/// Requires a valid bearer token
pub async fn auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(&request) else {
        return auth_error_response(AuthError::MissingToken);
    };

    match authenticate_token(token, &auth_state.jwt_config) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => auth_error_response(e),
    }
}

/// Attaches the caller when a valid token is present; anonymous otherwise.
/// An invalid token is treated as anonymous too.
pub async fn optional_auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let user = bearer_token(&request)
        .and_then(|token| authenticate_token(token, &auth_state.jwt_config).ok());
    if let Some(user) = user {
        request.extensions_mut().insert(user);
    }
    next.run(request).await
}

/// Admin-only middleware - must be used after auth_middleware
pub async fn admin_middleware(request: Request<Body>, next: Next) -> Response {
    let user = request.extensions().get::<AuthenticatedUser>();

    match user {
        Some(user) if user.is_admin() => next.run(request).await,
        Some(_) => auth_error_response(AuthError::InsufficientPermissions),
        None => auth_error_response(AuthError::MissingToken),
    }
}

pub fn auth_error_response(error: AuthError) -> Response {
    let (status, message) = match error {
        AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "Missing authentication token"),
        AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid or expired authentication token"),
        AuthError::InsufficientPermissions => (StatusCode::FORBIDDEN, "Admin privileges required"),
    };

    (status, Json(ApiResponse::<()>::error(message))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_prefix_is_required() {
        assert_eq!(extract_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(extract_token("Bearer   "), None);
        assert_eq!(extract_token("Basic dXNlcjpwdw=="), None);
    }

    #[test]
    fn submitter_falls_back_to_email() {
        let user = AuthenticatedUser {
            user_id: "user-9".into(),
            name: None,
            email: Some("dana@example.com".into()),
            role: UserRole::User,
        };
        let submitter = user.as_submitter();
        assert_eq!(submitter.user_id, "user-9");
        assert_eq!(submitter.name.as_deref(), Some("dana@example.com"));
        assert!(!user.is_admin());
    }
}
