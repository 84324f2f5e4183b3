// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sign-in, sign-up and refresh entry points.
//!
//! These validate form input, make a single backend call and hand the
//! resulting credential pair to [`SessionManager`]. Failures come back as a
//! [`FormState`] for the form to render, never as an error.

use crate::config::{HOME_HREF, SIGN_IN_HREF};
use crate::error::AppError;
use crate::logger::{log_error, log_info};
use crate::models::forms::field_errors;
use crate::models::{ActionStatus, Credential, FormState, SessionToken, SignInForm, SignUpForm};
use crate::services::backend::BackendClient;
use crate::services::cookies::CookieStore;
use crate::services::session::SessionManager;
use serde_json::json;
use std::time::Instant;
use validator::Validate;

/// What a form action asks the browser to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Redirect(&'static str),
    Form(FormState),
}

/// Form-facing authentication actions.
#[derive(Clone)]
pub struct AuthService {
    backend: BackendClient,
    sessions: SessionManager,
}

impl AuthService {
    pub fn new(backend: BackendClient, sessions: SessionManager) -> Self {
        Self { backend, sessions }
    }

    /// Validate credentials, authenticate with the backend and start a session.
    pub async fn sign_in<S: CookieStore + ?Sized>(
        &self,
        cookies: &mut S,
        form: SignInForm,
    ) -> AuthOutcome {
        log_info("sign_in", "Starting sign-in");

        if let Err(errors) = form.validate() {
            let errors = field_errors(&errors);
            tracing::debug!(fields = ?errors.keys().collect::<Vec<_>>(), "Sign-in validation failed");
            return AuthOutcome::Form(FormState::invalid(errors));
        }

        let started = Instant::now();
        let result = self.backend.sign_in(&form.email, &form.password).await;
        tracing::debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            ok = result.is_ok(),
            "Backend sign-in responded"
        );

        let data = match result {
            Ok(data) => data,
            Err(AppError::Backend { status, message }) => {
                tracing::info!(status, "Backend rejected sign-in");
                return AuthOutcome::Form(FormState::failure(status, message));
            }
            Err(e) => return AuthOutcome::Form(unauthorized("sign_in", &e)),
        };

        let payload = SessionToken {
            id: data.id,
            access: Credential {
                access_token: data.access_token,
                refresh_token: data.refresh_token,
            },
        };

        match self.sessions.create_session(cookies, payload) {
            Ok(session) => {
                tracing::info!(user_id = %session.id, "User signed in");
                AuthOutcome::Redirect(HOME_HREF)
            }
            Err(e) => AuthOutcome::Form(unauthorized("sign_in", &e)),
        }
    }

    /// Validate the registration form and create the account on the backend.
    pub async fn sign_up(&self, form: SignUpForm) -> AuthOutcome {
        if let Err(errors) = form.validate() {
            return AuthOutcome::Form(FormState::invalid(field_errors(&errors)));
        }

        match self.backend.sign_up(&form).await {
            Ok(()) => {
                tracing::info!("Account created");
                AuthOutcome::Redirect(SIGN_IN_HREF)
            }
            Err(AppError::Backend { status, message }) => {
                AuthOutcome::Form(FormState::failure(status, message))
            }
            Err(e) => AuthOutcome::Form(unauthorized("sign_up", &e)),
        }
    }

    /// Exchange a refresh token for a new access token without touching cookies.
    pub async fn refresh_token(&self, old_refresh_token: &str) -> Result<String, ActionStatus> {
        match self.backend.refresh(old_refresh_token).await {
            Ok(tokens) => Ok(tokens.access_token),
            Err(e) => {
                log_error(
                    "refresh_token",
                    &e,
                    json!({ "has_refresh_token": !old_refresh_token.is_empty() }),
                );
                Err(ActionStatus::new(401, "Failed to refresh token"))
            }
        }
    }
}

fn unauthorized(operation: &str, error: &AppError) -> FormState {
    log_error(operation, error, json!({}));
    FormState::failure(401, error.user_message().message)
}
