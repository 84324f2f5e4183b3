// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session models persisted in cookies.
//!
//! Field names are camelCase on the wire because the browser client reads
//! the client cookie directly.

use crate::models::forms::{field_errors, FieldErrors};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Access/refresh credential pair issued by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: String,
}

/// Full server-side session, stored only in the httpOnly cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken {
    /// Subject of the refresh token
    pub id: String,
    pub access: Credential,
}

impl SessionToken {
    /// Client-safe projection without the refresh token.
    pub fn reduced(&self) -> Session {
        Session {
            id: self.id.clone(),
            access: AccessView {
                access_token: self.access.access_token.clone(),
            },
        }
    }
}

/// Access part of a [`Session`]; the refresh token never leaves the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AccessView {
    pub access_token: String,
}

/// Client-visible session, stored in the non-httpOnly cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Session {
    pub id: String,
    pub access: AccessView,
}

/// Partial update of a session. Only the access token can change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionUpdate {
    #[serde(default)]
    pub access: Option<AccessUpdate>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AccessUpdate {
    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required"))]
    pub access_token: Option<String>,
}

impl SessionUpdate {
    /// Update that only swaps the access token.
    pub fn access_token(token: impl Into<String>) -> Self {
        Self {
            access: Some(AccessUpdate {
                access_token: Some(token.into()),
            }),
        }
    }

    /// Per-field problems with this update, keyed under `access.`.
    pub fn field_errors(&self) -> Option<FieldErrors> {
        let errors = self.access.as_ref()?.validate().err()?;
        Some(
            field_errors(&errors)
                .into_iter()
                .map(|(field, messages)| (format!("access.{field}"), messages))
                .collect(),
        )
    }

    /// Apply this update on top of an existing credential pair.
    pub fn apply(&self, current: &SessionToken) -> SessionToken {
        let mut updated = current.clone();
        if let Some(token) = self
            .access
            .as_ref()
            .and_then(|access| access.access_token.clone())
        {
            updated.access.access_token = token;
        }
        updated
    }
}

/// Outcome of an action that has no other payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionStatus {
    pub status: u16,
    pub message: String,
}

impl ActionStatus {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> SessionToken {
        SessionToken {
            id: "u1".to_string(),
            access: Credential {
                access_token: "A1".to_string(),
                refresh_token: "R1".to_string(),
            },
        }
    }

    #[test]
    fn reduced_session_drops_refresh_token() {
        let json = serde_json::to_value(token().reduced()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": "u1", "access": {"accessToken": "A1"}})
        );
    }

    #[test]
    fn session_token_wire_format() {
        let json = serde_json::to_string(&token()).unwrap();
        assert_eq!(
            json,
            r#"{"id":"u1","access":{"accessToken":"A1","refreshToken":"R1"}}"#
        );
    }

    #[test]
    fn update_keeps_refresh_token_and_id() {
        let updated = SessionUpdate::access_token("A2").apply(&token());
        assert_eq!(updated.id, "u1");
        assert_eq!(updated.access.access_token, "A2");
        assert_eq!(updated.access.refresh_token, "R1");
    }

    #[test]
    fn empty_access_token_is_a_field_error() {
        let update: SessionUpdate =
            serde_json::from_str(r#"{"access":{"accessToken":""}}"#).unwrap();
        let errors = update.field_errors().unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors.keys().all(|k| k.starts_with("access.")));

        assert!(SessionUpdate::access_token("A2").field_errors().is_none());
        assert!(SessionUpdate::default().field_errors().is_none());
    }

    #[test]
    fn empty_update_is_noop() {
        let update: SessionUpdate = serde_json::from_str("{}").unwrap();
        assert_eq!(update.apply(&token()), token());
    }
}
