// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Auth cookie persistence.
//!
//! Two cookies make up a session:
//! - `auth_token`: the full [`SessionToken`] (httpOnly, SameSite=Strict)
//! - `session`: the reduced [`Session`] the browser may read (SameSite=Lax)
//!
//! Both expire with the refresh token and are `Secure` only in production.

use crate::models::{Session, SessionToken};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;
use time::OffsetDateTime;

/// Cookie holding the serialized [`SessionToken`].
pub const AUTH_COOKIE: &str = "auth_token";
/// Cookie holding the serialized [`Session`].
pub const CLIENT_COOKIE: &str = "session";

/// Cookie persistence errors.
#[derive(Debug, thiserror::Error)]
pub enum CookieError {
    #[error("Failed to serialize cookie {0}: {1}")]
    Serialize(&'static str, String),

    #[error("Cookie store rejected {0}: {1}")]
    Store(String, String),
}

/// Request-scoped cookie storage.
///
/// Implemented for axum's [`CookieJar`]; handlers lend the jar for the
/// duration of one operation and return it with the response.
pub trait CookieStore {
    /// Current value of the named cookie.
    fn get_value(&self, name: &str) -> Option<String>;
    fn add_cookie(&mut self, cookie: Cookie<'static>) -> Result<(), CookieError>;
    /// Remove a cookie; `cookie` carries the attributes it was created with.
    fn remove_cookie(&mut self, cookie: Cookie<'static>) -> Result<(), CookieError>;
}

impl CookieStore for CookieJar {
    fn get_value(&self, name: &str) -> Option<String> {
        self.get(name).map(|cookie| cookie.value().to_string())
    }

    fn add_cookie(&mut self, cookie: Cookie<'static>) -> Result<(), CookieError> {
        let jar = std::mem::replace(self, CookieJar::new());
        *self = jar.add(cookie);
        Ok(())
    }

    fn remove_cookie(&mut self, cookie: Cookie<'static>) -> Result<(), CookieError> {
        let jar = std::mem::replace(self, CookieJar::new());
        *self = jar.remove(cookie);
        Ok(())
    }
}

/// Security attributes shared by both cookies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookiePolicy {
    pub secure: bool,
}

/// Typed access to the two session cookies of one request.
pub struct AuthCookies<'a, S: CookieStore + ?Sized> {
    store: &'a mut S,
    policy: CookiePolicy,
}

impl<'a, S: CookieStore + ?Sized> AuthCookies<'a, S> {
    pub fn new(store: &'a mut S, policy: CookiePolicy) -> Self {
        Self { store, policy }
    }

    pub fn get_auth_cookie(&self) -> Option<String> {
        self.store.get_value(AUTH_COOKIE)
    }

    pub fn get_client_cookie(&self) -> Option<String> {
        self.store.get_value(CLIENT_COOKIE)
    }

    /// Write the full session token. Returns the stored value.
    pub fn set_auth_cookie(
        &mut self,
        token: &SessionToken,
        expires_at: OffsetDateTime,
    ) -> Result<String, CookieError> {
        let value = serialize(AUTH_COOKIE, token)?;
        let cookie = self.auth_cookie(value.clone(), Some(expires_at));
        self.store.add_cookie(cookie)?;
        Ok(value)
    }

    /// Write the client-visible session. Returns the stored value.
    pub fn set_client_cookie(
        &mut self,
        session: &Session,
        expires_at: OffsetDateTime,
    ) -> Result<String, CookieError> {
        let value = serialize(CLIENT_COOKIE, session)?;
        let cookie = self.client_cookie(value.clone(), Some(expires_at));
        self.store.add_cookie(cookie)?;
        Ok(value)
    }

    /// Write both cookies for `token`. Returns the client cookie value.
    ///
    /// If the client cookie cannot be serialized or stored, the auth cookie
    /// just written is removed again, so a failed call never leaves a new
    /// auth cookie next to an old client cookie.
    pub fn set_auth_cookies(
        &mut self,
        token: &SessionToken,
        expires_at: OffsetDateTime,
    ) -> Result<String, CookieError> {
        self.set_auth_cookie(token, expires_at)?;

        match self.set_client_cookie(&token.reduced(), expires_at) {
            Ok(client_value) => Ok(client_value),
            Err(e) => {
                if let Err(rollback) = self.delete_auth_cookie() {
                    tracing::error!(
                        error = %rollback,
                        "Failed to roll back auth cookie after partial write"
                    );
                }
                Err(e)
            }
        }
    }

    pub fn delete_auth_cookie(&mut self) -> Result<(), CookieError> {
        let cookie = self.auth_cookie(String::new(), None);
        self.store.remove_cookie(cookie)
    }

    pub fn delete_client_cookie(&mut self) -> Result<(), CookieError> {
        let cookie = self.client_cookie(String::new(), None);
        self.store.remove_cookie(cookie)
    }

    fn auth_cookie(&self, value: String, expires_at: Option<OffsetDateTime>) -> Cookie<'static> {
        let mut cookie = Cookie::build((AUTH_COOKIE, value))
            .path("/")
            .same_site(SameSite::Strict)
            .http_only(true)
            .secure(self.policy.secure)
            .build();
        if let Some(expires_at) = expires_at {
            cookie.set_expires(expires_at);
        }
        cookie
    }

    fn client_cookie(&self, value: String, expires_at: Option<OffsetDateTime>) -> Cookie<'static> {
        let mut cookie = Cookie::build((CLIENT_COOKIE, value))
            .path("/")
            .same_site(SameSite::Lax)
            .http_only(false)
            .secure(self.policy.secure)
            .build();
        if let Some(expires_at) = expires_at {
            cookie.set_expires(expires_at);
        }
        cookie
    }
}

fn serialize<T: Serialize>(name: &'static str, value: &T) -> Result<String, CookieError> {
    serde_json::to_string(value).map_err(|e| CookieError::Serialize(name, e.to_string()))
}
