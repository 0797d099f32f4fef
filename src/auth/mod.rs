use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::{Principal, ProfileClaims};
use crate::config;
use crate::types::Role;

/// JWT claims for an admin session. Profile data (role, organization) is
/// embedded at token issuance, so per-request principal construction needs
/// no database round trip.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub name: String,
    pub is_global_admin: bool,
    pub role: Option<Role>,
    pub organization_id: Option<Uuid>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(
        sub: Uuid,
        name: String,
        is_global_admin: bool,
        role: Option<Role>,
        organization_id: Option<Uuid>,
    ) -> Self {
        let now = Utc::now();
        let expiry_hours = config::config().security.jwt_expiry_hours;
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub,
            name,
            is_global_admin,
            role,
            organization_id,
            exp,
            iat: now.timestamp(),
        }
    }
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Principal {
            user_id: claims.sub,
            is_global_admin: claims.is_global_admin,
            profile: claims.role.map(|role| ProfileClaims {
                role,
                organization_id: claims.organization_id,
            }),
        }
    }
}

#[derive(Debug)]
pub enum JwtError {
    TokenGeneration(String),
    InvalidSecret,
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::TokenGeneration(msg) => write!(f, "JWT generation error: {}", msg),
            JwtError::InvalidSecret => write!(f, "Invalid JWT secret"),
        }
    }
}

impl std::error::Error for JwtError {}

pub fn generate_jwt(claims: Claims) -> Result<String, JwtError> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    let header = Header::default();

    encode(&header, &claims, &encoding_key)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_without_role_yield_a_profileless_principal() {
        let claims = Claims::new(Uuid::new_v4(), "svc".into(), false, None, None);
        let principal: Principal = claims.into();
        assert!(principal.profile.is_none());
        assert!(principal.organization_id().is_none());
    }

    #[test]
    fn claims_carry_role_and_organization_through() {
        let org = Uuid::new_v4();
        let claims = Claims::new(Uuid::new_v4(), "op".into(), false, Some(Role::Operator), Some(org));
        let principal: Principal = claims.into();
        assert_eq!(principal.role(), Some(Role::Operator));
        assert_eq!(principal.organization_id(), Some(org));
    }
}
