// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Operation-scoped logging helpers on top of `tracing`.
//!
//! Every caught error in the session lifecycle goes through [`log_error`] so
//! the full cause is recorded even when the caller only sees a generic
//! message.

use serde_json::Value;
use std::fmt;

/// Log a failed operation with its full error chain and context.
pub fn log_error<E>(operation: &str, error: &E, context: Value)
where
    E: fmt::Display + fmt::Debug + ?Sized,
{
    tracing::error!(
        operation,
        error = %error,
        detail = ?error,
        context = %context,
        "Operation failed"
    );
}

/// Log an informational step of an operation.
pub fn log_info(operation: &str, message: &str) {
    tracing::info!(operation, "{}", message);
}
