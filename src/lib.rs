// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Session-Keeper: cookie-backed sessions for a token-issuing identity backend
//!
//! This crate keeps an access/refresh token pair in an HTTP-only cookie,
//! mirrors a reduced session into a client-readable cookie, and refreshes
//! tokens against the backend when asked.

pub mod config;
pub mod error;
pub mod logger;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use services::{AuthService, SessionManager};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub sessions: SessionManager,
    pub auth: AuthService,
}
