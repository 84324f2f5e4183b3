// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session lifecycle: create, read, update, refresh and destroy.
//!
//! The cookies are the durable state; [`SessionCache`] only saves decoding
//! work on repeated reads. The cache key is always the raw client-cookie
//! value.
//!
//! Read paths (`get_session`, `get_session_token`) never fail: anything
//! unexpected is logged and the caller sees "no session", with both cookies
//! cleared when the stored token is invalid or expired. Write paths log the
//! full cause and return a classified [`AppError`] with a generic message.

use crate::config::Config;
use crate::error::{AppError, UnauthorizedReason};
use crate::logger::log_error;
use crate::models::{ActionStatus, Credential, Session, SessionToken, SessionUpdate};
use crate::services::backend::BackendClient;
use crate::services::cookies::{
    AuthCookies, CookiePolicy, CookieStore, AUTH_COOKIE, CLIENT_COOKIE,
};
use crate::services::session_cache::SessionCache;
use crate::services::token::{
    validate_claims, ClaimsDecoder, ClaimsError, UnverifiedDecoder, ValidClaims,
};
use crate::time_utils::{expiry_from_unix, now_millis};
use serde_json::json;
use std::sync::Arc;

/// Result of looking up a stored session before it reaches the public API.
enum SessionLookup<T> {
    Found(T),
    NotFound,
    /// A value was stored but is unusable; the session must be torn down.
    Invalid(AppError),
}

/// Orchestrates session cookies, the session cache and token refresh.
#[derive(Clone)]
pub struct SessionManager {
    cache: SessionCache,
    backend: BackendClient,
    decoder: Arc<dyn ClaimsDecoder>,
    policy: CookiePolicy,
    identity_claim: Arc<str>,
}

impl SessionManager {
    pub fn new(config: &Config, cache: SessionCache, backend: BackendClient) -> Self {
        Self {
            cache,
            backend,
            decoder: Arc::new(UnverifiedDecoder),
            policy: CookiePolicy {
                secure: config.secure_cookies(),
            },
            identity_claim: config.identity_claim.as_str().into(),
        }
    }

    /// Replace the claims decoder.
    pub fn with_decoder(mut self, decoder: Arc<dyn ClaimsDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn cache(&self) -> &SessionCache {
        &self.cache
    }

    fn cookies<'a, S: CookieStore + ?Sized>(&self, store: &'a mut S) -> AuthCookies<'a, S> {
        AuthCookies::new(store, self.policy)
    }

    // ─── Create ──────────────────────────────────────────────────────────────

    /// Persist a freshly issued credential pair and return the client session.
    pub fn create_session<S: CookieStore + ?Sized>(
        &self,
        cookies: &mut S,
        payload: SessionToken,
    ) -> Result<Session, AppError> {
        self.try_create_session(cookies, &payload).map_err(|e| {
            log_error(
                "create_session",
                &e,
                json!({ "has_token": !payload.access.access_token.is_empty() }),
            );
            AppError::Internal(anyhow::anyhow!("session creation failed"))
        })
    }

    fn try_create_session<S: CookieStore + ?Sized>(
        &self,
        cookies: &mut S,
        payload: &SessionToken,
    ) -> Result<Session, AppError> {
        let refresh = validate_claims(self.decoder.decode(&payload.access.refresh_token)?)?;
        if !refresh.claims.has_claim(&self.identity_claim) {
            return Err(ClaimsError::InvalidUserData(self.identity_claim.to_string()).into());
        }

        // Decode before any cookie is written so a bad access token leaves
        // the jar untouched.
        let access = self.decoder.decode(&payload.access.access_token)?;

        let token = SessionToken {
            id: refresh.subject.clone(),
            access: payload.access.clone(),
        };
        let expires_at = expiry_from_unix(refresh.expires_at)?;
        let client_value = self.cookies(cookies).set_auth_cookies(&token, expires_at)?;

        let session = token.reduced();
        if let Some(access_expires_at) = access.expires_at_millis() {
            self.cache.put(client_value, session.clone(), access_expires_at);
        }

        tracing::debug!(user_id = %session.id, "Session created");
        Ok(session)
    }

    // ─── Read ────────────────────────────────────────────────────────────────

    /// Current client session, if there is a valid one.
    pub fn get_session<S: CookieStore + ?Sized>(&self, cookies: &mut S) -> Option<Session> {
        match self.lookup_session(cookies) {
            SessionLookup::Found(session) => Some(session),
            SessionLookup::NotFound => None,
            SessionLookup::Invalid(e) => {
                log_error("get_session", &e, json!({ "reason": "invalid token" }));
                self.discard(cookies);
                None
            }
        }
    }

    fn lookup_session<S: CookieStore + ?Sized>(&self, cookies: &S) -> SessionLookup<Session> {
        let Some(raw) = cookies.get_value(CLIENT_COOKIE) else {
            return SessionLookup::NotFound;
        };

        let now = now_millis();
        if let Some(session) = self.cache.get_fresh(&raw, now) {
            return SessionLookup::Found(session);
        }

        let session: Session = match serde_json::from_str(&raw) {
            Ok(session) => session,
            Err(e) => {
                return SessionLookup::Invalid(AppError::Decoding(format!(
                    "client cookie is not a session: {}",
                    e
                )))
            }
        };

        let claims = match self.decoder.decode(&session.access.access_token) {
            Ok(claims) => claims,
            Err(e) => return SessionLookup::Invalid(e),
        };

        match claims.expires_at_millis() {
            Some(expires_at) if expires_at > now => {
                self.cache.put(raw, session.clone(), expires_at);
                SessionLookup::Found(session)
            }
            _ => SessionLookup::Invalid(AppError::Unauthorized(UnauthorizedReason::SessionExpired)),
        }
    }

    /// Current full session token, if its refresh token is still valid.
    pub fn get_session_token<S: CookieStore + ?Sized>(
        &self,
        cookies: &mut S,
    ) -> Option<SessionToken> {
        self.get_session_token_with_claims(cookies)
            .map(|(token, _)| token)
    }

    fn get_session_token_with_claims<S: CookieStore + ?Sized>(
        &self,
        cookies: &mut S,
    ) -> Option<(SessionToken, ValidClaims)> {
        match self.lookup_session_token(cookies) {
            SessionLookup::Found(found) => Some(found),
            SessionLookup::NotFound => None,
            SessionLookup::Invalid(e) => {
                log_error(
                    "get_session_token",
                    &e,
                    json!({ "reason": "invalid refresh token" }),
                );
                self.discard(cookies);
                None
            }
        }
    }

    fn lookup_session_token<S: CookieStore + ?Sized>(
        &self,
        cookies: &S,
    ) -> SessionLookup<(SessionToken, ValidClaims)> {
        let Some(raw) = cookies.get_value(AUTH_COOKIE) else {
            return SessionLookup::NotFound;
        };

        let token: SessionToken = match serde_json::from_str(&raw) {
            Ok(token) => token,
            Err(e) => {
                return SessionLookup::Invalid(AppError::Decoding(format!(
                    "auth cookie is not a session token: {}",
                    e
                )))
            }
        };

        let claims = match self.decoder.decode(&token.access.refresh_token) {
            Ok(claims) => claims,
            Err(e) => return SessionLookup::Invalid(e),
        };

        if claims.is_expired_at(now_millis()) {
            return SessionLookup::Invalid(AppError::Unauthorized(
                UnauthorizedReason::SessionExpired,
            ));
        }

        match validate_claims(claims) {
            Ok(valid) => SessionLookup::Found((token, valid)),
            Err(e) => SessionLookup::Invalid(e.into()),
        }
    }

    // ─── Destroy ─────────────────────────────────────────────────────────────

    /// Remove both cookies and the cached entry for the client cookie.
    ///
    /// Idempotent. Unlike the read paths, a cookie store failure is returned.
    pub fn destroy_session<S: CookieStore + ?Sized>(
        &self,
        cookies: &mut S,
    ) -> Result<ActionStatus, AppError> {
        let mut jar = self.cookies(cookies);
        let previous = jar.get_client_cookie();

        let client = jar.delete_client_cookie();
        let auth = jar.delete_auth_cookie();

        if let Some(previous) = previous {
            self.cache.delete(&previous);
        }

        if let Err(e) = client.and(auth) {
            log_error("destroy_session", &e, json!({}));
            return Err(e.into());
        }

        Ok(ActionStatus::new(200, "Session removed"))
    }

    /// Teardown from a read path: failures are logged, never returned.
    fn discard<S: CookieStore + ?Sized>(&self, cookies: &mut S) {
        if let Err(e) = self.destroy_session(cookies) {
            tracing::warn!(error = %e, "Failed to clear invalid session");
        }
    }

    // ─── Update ──────────────────────────────────────────────────────────────

    /// Merge `updates` into the current session and rewrite both cookies.
    pub fn update_session<S: CookieStore + ?Sized>(
        &self,
        cookies: &mut S,
        updates: &SessionUpdate,
    ) -> Result<Session, AppError> {
        let Some((current, refresh)) = self.get_session_token_with_claims(cookies) else {
            return Err(AppError::Unauthorized(UnauthorizedReason::SessionExpired));
        };

        self.try_update_session(cookies, &current, refresh, updates)
            .map_err(|e| {
                log_error("update_session", &e, json!({ "user_id": current.id }));
                AppError::Unauthorized(UnauthorizedReason::InvalidToken)
            })
    }

    fn try_update_session<S: CookieStore + ?Sized>(
        &self,
        cookies: &mut S,
        current: &SessionToken,
        refresh: ValidClaims,
        updates: &SessionUpdate,
    ) -> Result<Session, AppError> {
        let updated = updates.apply(current);

        // Expiry stays tied to the existing refresh token.
        let refresh = validate_claims(refresh.claims)?;
        let expires_at = expiry_from_unix(refresh.expires_at)?;

        let mut jar = self.cookies(cookies);
        let previous = jar.get_client_cookie();
        let client_value = jar.set_auth_cookies(&updated, expires_at)?;

        if let Some(previous) = previous.filter(|p| *p != client_value) {
            self.cache.delete(&previous);
        }

        Ok(updated.reduced())
    }

    // ─── Refresh ─────────────────────────────────────────────────────────────

    /// Exchange `old_refresh_token` with the backend and store the new pair.
    ///
    /// If the backend rejects the refresh token the session is destroyed
    /// before the error is returned.
    pub async fn update_token<S: CookieStore + ?Sized>(
        &self,
        cookies: &mut S,
        old_refresh_token: &str,
    ) -> Result<Session, AppError> {
        match self.try_update_token(cookies, old_refresh_token).await {
            Ok(session) => Ok(session),
            Err(e) => {
                log_error(
                    "update_token",
                    &e,
                    json!({ "has_refresh_token": !old_refresh_token.is_empty() }),
                );

                if e.is_authorization_failure() {
                    tracing::info!("Refresh token rejected by backend, signing out");
                    self.discard(cookies);
                }

                Err(AppError::Unauthorized(UnauthorizedReason::InvalidToken))
            }
        }
    }

    async fn try_update_token<S: CookieStore + ?Sized>(
        &self,
        cookies: &mut S,
        old_refresh_token: &str,
    ) -> Result<Session, AppError> {
        let tokens = self.backend.refresh(old_refresh_token).await?;

        let subject = self
            .decoder
            .decode(&tokens.access_token)?
            .sub
            .filter(|sub| !sub.is_empty())
            .ok_or(ClaimsError::InvalidUserId)?;

        let refresh = validate_claims(self.decoder.decode(&tokens.refresh_token)?)?;
        let expires_at = expiry_from_unix(refresh.expires_at)?;

        let token = SessionToken {
            id: subject,
            access: Credential {
                access_token: tokens.access_token,
                refresh_token: tokens.refresh_token,
            },
        };

        let mut jar = self.cookies(cookies);
        // Must be read before the new client cookie replaces it.
        let previous = jar.get_client_cookie();
        jar.set_auth_cookies(&token, expires_at)?;

        if let Some(previous) = previous {
            self.cache.delete(&previous);
        }

        tracing::info!(user_id = %token.id, "Session tokens refreshed");
        Ok(token.reduced())
    }
}
