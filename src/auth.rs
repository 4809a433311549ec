use crate::errors::ServiceError;
use crate::AppState;
use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

const TOKEN_ISSUER: &str = "workshop-api";

/// Workshop staff roles carried in token claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Role {
    Admin,
    Mechanic,
    Receptionist,
}

/// JWT claims for bearer tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,          // Subject (user ID)
    pub name: Option<String>, // User's display name
    pub roles: Vec<String>,   // User's roles
    pub jti: String,          // JWT ID (unique identifier for this token)
    pub iat: i64,             // Issued at time
    pub exp: i64,             // Expiration time
    pub iss: String,          // Issuer
}

/// Authenticated user data extracted from the JWT token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: String,
    pub name: Option<String>,
    pub roles: Vec<Role>,
}

impl AuthUser {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Rejects with Forbidden unless the user holds at least one of the roles.
    pub fn require_any(&self, allowed: &[Role]) -> Result<(), ServiceError> {
        if allowed.iter().any(|r| self.has_role(*r)) {
            Ok(())
        } else {
            Err(ServiceError::Forbidden(format!(
                "requires one of roles: {}",
                allowed
                    .iter()
                    .map(|r| r.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            )))
        }
    }
}

/// Validates (and, for tests and tooling, mints) bearer tokens.
///
/// Account registration, login and role administration live in an external
/// identity service; this crate only consumes its tokens.
pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: Duration,
}

impl AuthService {
    pub fn new(secret: &str, token_ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_ttl,
        }
    }

    /// Issues a signed token for the given subject and roles.
    pub fn issue_token(&self, user_id: &str, roles: &[Role]) -> Result<String, ServiceError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            name: None,
            roles: roles.iter().map(|r| r.to_string()).collect(),
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + self.token_ttl.as_secs() as i64,
            iss: TOKEN_ISSUER.to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| ServiceError::InternalError(format!("failed to sign token: {}", e)))
    }

    /// Validates a token and returns the authenticated user.
    pub fn validate_token(&self, token: &str) -> Result<AuthUser, ServiceError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[TOKEN_ISSUER]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| ServiceError::Unauthorized(format!("invalid token: {}", e)))?;

        let roles = data
            .claims
            .roles
            .iter()
            .filter_map(|r| Role::from_str(r).ok())
            .collect();

        Ok(AuthUser {
            user_id: data.claims.sub,
            name: data.claims.name,
            roles,
        })
    }
}

pub type SharedAuthService = Arc<AuthService>;

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ServiceError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ServiceError::Unauthorized("missing Authorization header".into()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ServiceError::Unauthorized("expected Bearer token".into()))?;

        state.auth.validate_token(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        AuthService::new("unit-test-secret-unit-test-secret", Duration::from_secs(60))
    }

    #[test]
    fn issued_token_round_trips() {
        let auth = service();
        let token = auth
            .issue_token("user-1", &[Role::Admin, Role::Mechanic])
            .expect("token should be issued");

        let user = auth.validate_token(&token).expect("token should validate");
        assert_eq!(user.user_id, "user-1");
        assert!(user.has_role(Role::Admin));
        assert!(user.has_role(Role::Mechanic));
        assert!(!user.has_role(Role::Receptionist));
    }

    #[test]
    fn garbage_token_is_unauthorized() {
        let auth = service();
        let err = auth.validate_token("not-a-token").unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
    }

    #[test]
    fn role_gate_rejects_missing_role() {
        let user = AuthUser {
            user_id: "user-2".into(),
            name: None,
            roles: vec![Role::Mechanic],
        };

        assert!(user.require_any(&[Role::Mechanic]).is_ok());
        assert!(matches!(
            user.require_any(&[Role::Admin, Role::Receptionist]),
            Err(ServiceError::Forbidden(_))
        ));
    }

    #[test]
    fn role_parsing_is_case_insensitive() {
        assert_eq!(Role::from_str("admin").unwrap(), Role::Admin);
        assert_eq!(Role::from_str("RECEPTIONIST").unwrap(), Role::Receptionist);
        assert!(Role::from_str("janitor").is_err());
    }
}
