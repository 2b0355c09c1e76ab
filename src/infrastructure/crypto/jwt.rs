//! JWT bearer token handling
//!
//! Tokens are issued by the identity provider that shares `secret`; this
//! service only verifies them. `create_token` exists for tooling and tests.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::UserRole;

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// HS256 signing secret shared with the issuer
    pub secret: String,
    /// Lifetime of tokens minted by `create_token`
    pub expiration_hours: i64,
    /// Expected `iss` claim
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "change-me-in-production".to_string(),
            expiration_hours: 24,
            issuer: "chargehub".to_string(),
        }
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"***")
            .field("expiration_hours", &self.expiration_hours)
            .field("issuer", &self.issuer)
            .finish()
    }
}

/// JWT TokenClaims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TokenClaims {
    /// Subject (user ID)
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// `admin` or `user`
    #[serde(default = "default_role")]
    pub role: String,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
}

fn default_role() -> String {
    UserRole::User.as_str().to_string()
}

impl TokenClaims {
    pub fn new(user_id: &str, name: Option<&str>, role: UserRole, config: &JwtConfig) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(config.expiration_hours);

        Self {
            sub: user_id.to_string(),
            name: name.map(str::to_string),
            email: None,
            role: role.as_str().to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: config.issuer.clone(),
        }
    }

    pub fn role(&self) -> UserRole {
        UserRole::from_claim(&self.role)
    }

    pub fn is_admin(&self) -> bool {
        self.role() == UserRole::Admin
    }
}

/// Mint a token for a user
pub fn create_token(
    user_id: &str,
    name: Option<&str>,
    role: UserRole,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = TokenClaims::new(user_id, name, role, config);

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Verify signature, expiry and issuer, then decode the claims
pub fn verify_token(
    token: &str,
    config: &JwtConfig,
) -> Result<TokenClaims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.set_issuer(&[&config.issuer]);

    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minted_token_verifies() {
        let config = JwtConfig::default();
        let token = create_token("admin-1", Some("Ops"), UserRole::Admin, &config).unwrap();
        let claims = verify_token(&token, &config).unwrap();
        assert_eq!(claims.sub, "admin-1");
        assert_eq!(claims.name.as_deref(), Some("Ops"));
        assert!(claims.is_admin());
    }

    #[test]
    fn wrong_secret_or_issuer_is_rejected() {
        let config = JwtConfig::default();
        let token = create_token("user-1", None, UserRole::User, &config).unwrap();

        let other_secret = JwtConfig {
            secret: "another-secret".into(),
            ..JwtConfig::default()
        };
        assert!(verify_token(&token, &other_secret).is_err());

        let other_issuer = JwtConfig {
            issuer: "someone-else".into(),
            ..JwtConfig::default()
        };
        assert!(verify_token(&token, &other_issuer).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let config = JwtConfig {
            expiration_hours: -2,
            ..JwtConfig::default()
        };
        let token = create_token("user-1", None, UserRole::User, &config).unwrap();
        assert!(verify_token(&token, &config).is_err());
    }

    #[test]
    fn unknown_role_claim_is_plain_user() {
        let mut claims = TokenClaims::new("u", None, UserRole::User, &JwtConfig::default());
        claims.role = "superuser".into();
        assert!(!claims.is_admin());
    }
}
