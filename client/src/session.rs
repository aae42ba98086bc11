//! Session context passed to the inventory store
//!
//! The bearer token is handed in explicitly at construction; expiry is a
//! pure check against a caller-supplied clock.

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::Deserialize;

use crate::error::{InventoryError, InventoryResult};

/// Bearer token and its expiry
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionContext {
    pub token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct ExpiryClaims {
    exp: Option<i64>,
}

impl SessionContext {
    pub fn new(token: impl Into<String>, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            token: token.into(),
            expires_at,
        }
    }

    /// Build a session from a JWT, reading expiry from its `exp` claim.
    ///
    /// The signature is not checked here; the API server verifies it.
    pub fn from_jwt(token: impl Into<String>) -> InventoryResult<Self> {
        let token = token.into();

        let mut validation = Validation::default();
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let data = decode::<ExpiryClaims>(&token, &DecodingKey::from_secret(&[]), &validation)
            .map_err(|_| InventoryError::SessionExpired)?;

        let expires_at = data
            .claims
            .exp
            .and_then(|exp| Utc.timestamp_opt(exp, 0).single());

        Ok(Self { token, expires_at })
    }

    /// `Authorization` header value
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Check whether a session can still be used at `now`
pub fn is_session_expired(session: &SessionContext, now: DateTime<Utc>) -> bool {
    if session.token.trim().is_empty() {
        return true;
    }
    session.expires_at.map_or(false, |expires_at| expires_at <= now)
}
