// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for timestamps.

use anyhow::Context;
use chrono::Utc;
use time::OffsetDateTime;

/// Current time in epoch milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Convert a JWT `exp` (Unix seconds) into a cookie expiry.
pub fn expiry_from_unix(seconds: i64) -> anyhow::Result<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp(seconds)
        .with_context(|| format!("expiry timestamp out of range: {seconds}"))
}
