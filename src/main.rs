// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session-Keeper API Server
//!
//! Signs users in against the identity backend and keeps their session in
//! cookies.

use session_keeper::{
    config::Config,
    services::{AuthService, BackendClient, SessionCache, SessionManager},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        environment = ?config.environment,
        "Starting Session-Keeper API"
    );

    let backend = BackendClient::new(&config.backend_url, config.backend_timeout)?;
    tracing::info!(
        backend = %config.backend_url,
        timeout_secs = config.backend_timeout.as_secs(),
        "Backend client initialized"
    );

    // One cache per process, shared by every request
    let cache = SessionCache::new();
    let sessions = SessionManager::new(&config, cache, backend.clone());
    let auth = AuthService::new(backend, sessions.clone());

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        sessions,
        auth,
    });

    // Build router
    let app = session_keeper::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("session_keeper=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
