// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::Router;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use session_keeper::config::Config;
use session_keeper::error::AppError;
use session_keeper::models::{Credential, SessionToken};
use session_keeper::routes::create_router;
use session_keeper::services::token::Claims;
use session_keeper::services::{
    AuthService, BackendClient, ClaimsDecoder, SessionCache, SessionManager, UnverifiedDecoder,
};
use session_keeper::AppState;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Nothing listens here; connections are refused immediately.
#[allow(dead_code)]
pub const UNREACHABLE_BACKEND: &str = "http://127.0.0.1:9";

#[allow(dead_code)]
pub fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

/// Sign `claims` with a key this service never sees.
#[allow(dead_code)]
pub fn mint(claims: Value) -> String {
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"identity-backend-secret"),
    )
    .unwrap()
}

/// Access token for `sub` expiring `ttl_secs` from now (negative = already expired).
#[allow(dead_code)]
pub fn access_token(sub: &str, ttl_secs: i64) -> String {
    let now = now_secs();
    mint(json!({ "sub": sub, "iat": now, "exp": now + ttl_secs }))
}

/// Refresh token carrying the identity claim.
#[allow(dead_code)]
pub fn refresh_token(sub: &str, exp: i64) -> String {
    mint(json!({
        "sub": sub,
        "iat": now_secs(),
        "exp": exp,
        "Email": format!("{sub}@example.com"),
    }))
}

#[allow(dead_code)]
pub fn session_token(sub: &str, access_ttl_secs: i64, refresh_exp: i64) -> SessionToken {
    SessionToken {
        id: sub.to_string(),
        access: Credential {
            access_token: access_token(sub, access_ttl_secs),
            refresh_token: refresh_token(sub, refresh_exp),
        },
    }
}

/// Decoder that counts how often it is asked to decode.
#[allow(dead_code)]
#[derive(Default)]
pub struct CountingDecoder {
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl CountingDecoder {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ClaimsDecoder for CountingDecoder {
    fn decode(&self, token: &str) -> Result<Claims, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        UnverifiedDecoder.decode(token)
    }
}

/// Serve `router` on an ephemeral local port and return its base URL.
#[allow(dead_code)]
pub async fn spawn_backend(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

#[allow(dead_code)]
pub fn test_config(backend_url: &str) -> Config {
    Config {
        backend_url: backend_url.to_string(),
        backend_timeout: Duration::from_secs(2),
        ..Config::default()
    }
}

/// Session manager with an isolated cache.
#[allow(dead_code)]
pub fn test_sessions(backend_url: &str) -> SessionManager {
    let config = test_config(backend_url);
    let backend = BackendClient::new(&config.backend_url, config.backend_timeout).unwrap();
    SessionManager::new(&config, SessionCache::new(), backend)
}

#[allow(dead_code)]
pub fn test_state_with_config(config: Config) -> Arc<AppState> {
    let backend = BackendClient::new(&config.backend_url, config.backend_timeout).unwrap();
    let sessions = SessionManager::new(&config, SessionCache::new(), backend.clone());
    let auth = AuthService::new(backend, sessions.clone());
    Arc::new(AppState {
        config,
        sessions,
        auth,
    })
}

/// Create a test app talking to `backend_url`.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app(backend_url: &str) -> (Router, Arc<AppState>) {
    let state = test_state_with_config(test_config(backend_url));
    (create_router(state.clone()), state)
}
