// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Decode-only access to JWT claims.
//!
//! Tokens are issued by the identity backend and reach us over TLS. Nothing
//! here verifies a signature; callers must not treat decoded claims as
//! authenticated beyond that trust boundary.

use crate::error::AppError;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Claims carried by backend tokens.
///
/// Every field is optional at this level; [`validate_claims`] enforces the
/// ones a session depends on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Expiration time (Unix timestamp, seconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// Issued at (Unix timestamp, seconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Application-specific claims
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    /// Expiry in epoch milliseconds, if present and representable.
    ///
    /// An `exp` too large to express in milliseconds yields `None`, so the
    /// token counts as expired.
    pub fn expires_at_millis(&self) -> Option<i64> {
        self.exp
            .filter(|exp| *exp > 0)
            .and_then(|exp| exp.checked_mul(1000))
    }

    /// True when the token carries no expiry or it is not after `now_millis`.
    pub fn is_expired_at(&self, now_millis: i64) -> bool {
        match self.expires_at_millis() {
            Some(expires_at) => expires_at <= now_millis,
            None => true,
        }
    }

    /// True when the named application claim is present and non-null.
    pub fn has_claim(&self, name: &str) -> bool {
        self.extra.get(name).is_some_and(|v| !v.is_null())
    }
}

/// Claims with the fields every session depends on.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidClaims {
    pub subject: String,
    /// Unix timestamp, seconds
    pub expires_at: i64,
    pub claims: Claims,
}

/// Claim validation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClaimsError {
    #[error("Invalid user ID in token")]
    InvalidUserId,
    #[error("Invalid user data in token: missing claim {0}")]
    InvalidUserData(String),
}

/// Structural JWT decoding, without signature or expiry checks.
pub fn decode_unverified(token: &str) -> Result<Claims, AppError> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .map_err(|e| AppError::Decoding(e.to_string()))
}

/// Require `sub` and `exp` to be present.
pub fn validate_claims(claims: Claims) -> Result<ValidClaims, ClaimsError> {
    let subject = claims
        .sub
        .clone()
        .filter(|sub| !sub.is_empty())
        .ok_or(ClaimsError::InvalidUserId)?;
    let expires_at = claims
        .exp
        .filter(|exp| *exp > 0)
        .ok_or(ClaimsError::InvalidUserId)?;

    Ok(ValidClaims {
        subject,
        expires_at,
        claims,
    })
}

/// Seam for claim decoding so callers can be instrumented.
pub trait ClaimsDecoder: Send + Sync {
    fn decode(&self, token: &str) -> Result<Claims, AppError>;
}

/// The production decoder: [`decode_unverified`].
#[derive(Debug, Clone, Copy, Default)]
pub struct UnverifiedDecoder;

impl ClaimsDecoder for UnverifiedDecoder {
    fn decode(&self, token: &str) -> Result<Claims, AppError> {
        decode_unverified(token)
    }
}
