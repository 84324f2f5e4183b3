// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sign-in, sign-up and session routes.
//!
//! Every handler that touches cookies hands the jar back alongside its
//! result, so removals made on a failure path still reach the browser.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{AppError, UnauthorizedReason};
use crate::models::{Session, SessionUpdate, SignInForm, SignUpForm};
use crate::services::AuthOutcome;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/sign-in", post(sign_in))
        .route("/auth/sign-up", post(sign_up))
        .route("/auth/sign-out", post(sign_out))
        .route("/auth/session", get(get_session).patch(update_session))
        .route("/auth/refresh", post(refresh_session))
        .route("/auth/refresh-token", post(refresh_token))
}

/// Redirects use 303 so the browser follows up with a GET.
fn outcome_response(outcome: AuthOutcome) -> Response {
    match outcome {
        AuthOutcome::Redirect(href) => Redirect::to(href).into_response(),
        AuthOutcome::Form(state) => {
            let status = state
                .status
                .and_then(|s| StatusCode::from_u16(s).ok())
                .unwrap_or(StatusCode::BAD_REQUEST);
            (status, Json(state)).into_response()
        }
    }
}

/// Sign in with email and password.
async fn sign_in(
    State(state): State<Arc<AppState>>,
    mut jar: CookieJar,
    Form(form): Form<SignInForm>,
) -> Response {
    let outcome = state.auth.sign_in(&mut jar, form).await;
    (jar, outcome_response(outcome)).into_response()
}

/// Register a new account.
async fn sign_up(State(state): State<Arc<AppState>>, Form(form): Form<SignUpForm>) -> Response {
    outcome_response(state.auth.sign_up(form).await)
}

/// Sign out: clear both cookies and the cached session.
async fn sign_out(State(state): State<Arc<AppState>>, mut jar: CookieJar) -> Response {
    let result = state.sessions.destroy_session(&mut jar).map(Json);
    (jar, result).into_response()
}

/// Current client session, or `null` when signed out.
async fn get_session(
    State(state): State<Arc<AppState>>,
    mut jar: CookieJar,
) -> (CookieJar, Json<Option<Session>>) {
    let session = state.sessions.get_session(&mut jar);
    (jar, Json(session))
}

/// Merge a partial update into the current session.
async fn update_session(
    State(state): State<Arc<AppState>>,
    mut jar: CookieJar,
    Json(updates): Json<SessionUpdate>,
) -> Response {
    if let Some(errors) = updates.field_errors() {
        return (jar, AppError::Validation(errors)).into_response();
    }

    let result = state.sessions.update_session(&mut jar, &updates).map(Json);
    (jar, result).into_response()
}

/// Refresh the session using the refresh token in the auth cookie.
async fn refresh_session(State(state): State<Arc<AppState>>, mut jar: CookieJar) -> Response {
    let Some(current) = state.sessions.get_session_token(&mut jar) else {
        return (
            jar,
            AppError::Unauthorized(UnauthorizedReason::SessionExpired),
        )
            .into_response();
    };

    let result = state
        .sessions
        .update_token(&mut jar, &current.access.refresh_token)
        .await
        .map(Json);
    (jar, result).into_response()
}

#[derive(Deserialize)]
struct RefreshTokenRequest {
    refresh: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshTokenResponse {
    access_token: String,
}

/// Exchange a refresh token for a new access token. Cookies are untouched.
async fn refresh_token(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RefreshTokenRequest>,
) -> Response {
    match state.auth.refresh_token(&body.refresh).await {
        Ok(access_token) => Json(RefreshTokenResponse { access_token }).into_response(),
        Err(status) => (StatusCode::UNAUTHORIZED, Json(status)).into_response(),
    }
}
