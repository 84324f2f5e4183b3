// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session authentication middleware.

use crate::error::{AppError, UnauthorizedReason};
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

/// Middleware that requires a valid session cookie.
///
/// The resolved [`Session`](crate::models::Session) is inserted as a request
/// extension. Cookie removals made while rejecting an invalid session are
/// sent back with the 401.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    mut jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(session) = state.sessions.get_session(&mut jar) else {
        return (
            jar,
            AppError::Unauthorized(UnauthorizedReason::SessionExpired),
        )
            .into_response();
    };

    tracing::debug!(user_id = %session.id, "Session authenticated");
    request.extensions_mut().insert(session);

    (jar, next.run(request).await).into_response()
}
