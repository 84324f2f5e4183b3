// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - session lifecycle and backend access.

pub mod auth;
pub mod backend;
pub mod cookies;
pub mod session;
pub mod session_cache;
pub mod token;

pub use auth::{AuthOutcome, AuthService};
pub use backend::BackendClient;
pub use cookies::{AuthCookies, CookiePolicy, CookieStore};
pub use session::SessionManager;
pub use session_cache::SessionCache;
pub use token::{decode_unverified, ClaimsDecoder, UnverifiedDecoder};
