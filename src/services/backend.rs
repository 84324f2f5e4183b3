// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP client for the identity backend.
//!
//! Handles:
//! - Credential sign-in (returns an access/refresh pair)
//! - Account sign-up
//! - Refresh-token exchange
//!
//! Every request is bounded by the configured timeout. Nothing is retried
//! here; a failure surfaces immediately to the caller.

use crate::error::AppError;
use crate::models::SignUpForm;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Backend API client.
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Create a client for `base_url` with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed building backend HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Exchange an email/password pair for a credential pair.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SignInData, AppError> {
        let url = format!("{}/auth/user/signin", self.base_url);
        let body = SignInRequest { email, password };

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Network(format!("Sign-in request failed: {}", e)))?;

        let envelope: SignInResponse = self.check_response_json(response).await?;
        Ok(envelope.data)
    }

    /// Register a new account.
    pub async fn sign_up(&self, form: &SignUpForm) -> Result<(), AppError> {
        let url = format!("{}/auth/user/signup", self.base_url);
        let body = SignUpRequest {
            name: &form.name,
            lastname: &form.lastname,
            email: &form.email,
            password: &form.password,
        };

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Network(format!("Sign-up request failed: {}", e)))?;

        self.check_response(response).await
    }

    /// Exchange a refresh token for a new credential pair.
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, AppError> {
        let url = format!("{}/auth/refresh", self.base_url);

        let response = self
            .http
            .post(&url)
            .header("X-Requested-With", "XMLHttpRequest")
            .json(&RefreshRequest {
                refresh: refresh_token,
            })
            .send()
            .await
            .map_err(|e| AppError::Network(format!("Token refresh request failed: {}", e)))?;

        self.check_response_json(response).await
    }

    /// Check response status and return error if not successful.
    async fn check_response(&self, response: reqwest::Response) -> Result<(), AppError> {
        if response.status().is_success() {
            return Ok(());
        }
        Err(Self::backend_error(response).await)
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            return Err(Self::backend_error(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Network(format!("JSON parse error: {}", e)))
    }

    async fn backend_error(response: reqwest::Response) -> AppError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        tracing::warn!(status = %status, body = %body, "Backend request failed");

        AppError::Backend {
            status: status.as_u16(),
            message: status
                .canonical_reason()
                .unwrap_or("Authentication failed")
                .to_string(),
        }
    }
}

#[derive(Serialize)]
struct SignInRequest<'a> {
    #[serde(rename = "Email")]
    email: &'a str,
    #[serde(rename = "Password")]
    password: &'a str,
}

#[derive(Serialize)]
struct SignUpRequest<'a> {
    #[serde(rename = "Nome")]
    name: &'a str,
    #[serde(rename = "Sobrenome")]
    lastname: &'a str,
    #[serde(rename = "Email")]
    email: &'a str,
    #[serde(rename = "Password")]
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

#[derive(Deserialize)]
struct SignInResponse {
    data: SignInData,
}

/// Credential pair returned by a successful sign-in.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInData {
    pub id: String,
    pub access_token: String,
    pub refresh_token: String,
}

/// Credential pair returned by a successful refresh.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
}
