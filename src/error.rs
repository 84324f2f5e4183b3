// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.
//!
//! `Display` carries the diagnostic detail that goes to the log. The HTTP
//! body only ever carries the generic catalogue text below.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::models::FieldErrors;
use crate::services::cookies::CookieError;
use crate::services::token::ClaimsError;

/// A user-facing message and its longer description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserMessage {
    pub message: &'static str,
    pub description: &'static str,
}

/// Why a caller is not (or no longer) authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnauthorizedReason {
    SessionExpired,
    InvalidToken,
}

impl UnauthorizedReason {
    pub fn user_message(self) -> UserMessage {
        match self {
            Self::SessionExpired => AppError::SESSION_EXPIRED,
            Self::InvalidToken => AppError::INVALID_TOKEN,
        }
    }
}

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation failed for fields: {0:?}")]
    Validation(FieldErrors),

    #[error("Malformed token: {0}")]
    Decoding(String),

    #[error(transparent)]
    InvalidClaims(#[from] ClaimsError),

    #[error("Unauthorized: {}", .0.user_message().message)]
    Unauthorized(UnauthorizedReason),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),

    #[error("Backend unreachable: {0}")]
    Network(String),

    #[error("Backend returned HTTP {status}: {message}")]
    Backend { status: u16, message: String },

    #[error(transparent)]
    Cookie(#[from] CookieError),
}

impl AppError {
    pub const SESSION_EXPIRED: UserMessage = UserMessage {
        message: "Session expired",
        description: "Please sign in again.",
    };
    pub const INVALID_TOKEN: UserMessage = UserMessage {
        message: "Invalid token",
        description: "The provided token is invalid or has expired.",
    };
    pub const SERVER_ERROR: UserMessage = UserMessage {
        message: "Internal error",
        description: "An error occurred on the server.",
    };
    pub const VALIDATION_FAILED: UserMessage = UserMessage {
        message: "Validation error",
        description: "The request contains invalid data.",
    };
    pub const BAD_GATEWAY: UserMessage = UserMessage {
        message: "Bad gateway",
        description: "Error while communicating with the authentication server.",
    };

    /// True when the backend rejected the caller's credentials.
    ///
    /// A failed refresh with this classification forces a full sign-out.
    pub fn is_authorization_failure(&self) -> bool {
        matches!(self, AppError::Backend { status: 401 | 403, .. })
    }

    /// HTTP status used when this error reaches a handler boundary.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Decoding(_) | AppError::InvalidClaims(_) | AppError::Unauthorized(_) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Internal(_) | AppError::Cookie(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Network(_) | AppError::Backend { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    /// Generic text shown to the end user.
    pub fn user_message(&self) -> UserMessage {
        match self {
            AppError::Validation(_) => Self::VALIDATION_FAILED,
            AppError::Decoding(_) | AppError::InvalidClaims(_) => Self::INVALID_TOKEN,
            AppError::Unauthorized(reason) => reason.user_message(),
            AppError::Internal(_) | AppError::Cookie(_) => Self::SERVER_ERROR,
            AppError::Network(_) | AppError::Backend { .. } => Self::BAD_GATEWAY,
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    status: u16,
    message: &'static str,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<FieldErrors>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let UserMessage {
            message,
            description,
        } = self.user_message();

        match &self {
            AppError::Internal(err) => tracing::error!(error = ?err, "Internal server error"),
            AppError::Cookie(err) => tracing::error!(error = %err, "Cookie store error"),
            AppError::Network(_) | AppError::Backend { .. } => {
                tracing::warn!(error = %self, "Backend error")
            }
            _ => {}
        }

        let errors = match self {
            AppError::Validation(fields) => Some(fields),
            _ => None,
        };

        let body = ErrorResponse {
            status: status.as_u16(),
            message,
            description,
            errors,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
