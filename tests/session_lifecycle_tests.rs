// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session lifecycle tests against a bare cookie jar.
//!
//! These tests verify that:
//! 1. A created session reads back without contacting the backend
//! 2. Cached sessions are served without decoding the token again
//! 3. Expired or malformed cookies are treated as signed out and cleared
//! 4. Updates keep the expiry of the existing refresh token

use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde_json::json;
use session_keeper::error::{AppError, UnauthorizedReason};
use session_keeper::models::SessionUpdate;
use session_keeper::services::cookies::{AUTH_COOKIE, CLIENT_COOKIE};
use std::sync::Arc;

mod common;
use common::{CountingDecoder, UNREACHABLE_BACKEND};

fn client_value(jar: &CookieJar) -> String {
    jar.get(CLIENT_COOKIE).unwrap().value().to_string()
}

#[test]
fn test_create_then_get_returns_reduced_session() {
    let sessions = common::test_sessions(UNREACHABLE_BACKEND);
    let mut jar = CookieJar::new();
    let payload = common::session_token("u1", 600, common::now_secs() + 86400);

    let created = sessions.create_session(&mut jar, payload.clone()).unwrap();
    assert_eq!(created.id, "u1");
    assert_eq!(created.access.access_token, payload.access.access_token);

    let session = sessions.get_session(&mut jar).expect("session should exist");
    assert_eq!(session, created);

    let token = sessions.get_session_token(&mut jar).expect("token should exist");
    assert_eq!(token, payload);

    // Only the server-side cookie carries the refresh token
    assert!(!client_value(&jar).contains(&payload.access.refresh_token));
    assert!(jar
        .get(AUTH_COOKIE)
        .unwrap()
        .value()
        .contains(&payload.access.refresh_token));
}

#[test]
fn test_create_uses_refresh_subject_and_expiry() {
    let sessions = common::test_sessions(UNREACHABLE_BACKEND);
    let mut jar = CookieJar::new();
    let refresh_exp = common::now_secs() + 7200;
    let mut payload = common::session_token("u1", 600, refresh_exp);
    payload.id = "ignored".to_string();

    let created = sessions.create_session(&mut jar, payload).unwrap();

    assert_eq!(created.id, "u1");
    for name in [AUTH_COOKIE, CLIENT_COOKIE] {
        let expires = jar.get(name).unwrap().expires_datetime().unwrap();
        assert_eq!(expires.unix_timestamp(), refresh_exp);
    }
}

#[test]
fn test_create_without_identity_claim_writes_nothing() {
    let sessions = common::test_sessions(UNREACHABLE_BACKEND);
    let mut jar = CookieJar::new();
    let mut payload = common::session_token("u1", 600, common::now_secs() + 86400);
    payload.access.refresh_token = common::mint(json!({
        "sub": "u1",
        "exp": common::now_secs() + 86400,
    }));

    let result = sessions.create_session(&mut jar, payload);

    assert!(matches!(result, Err(AppError::Internal(_))));
    assert!(jar.get(AUTH_COOKIE).is_none());
    assert!(jar.get(CLIENT_COOKIE).is_none());
    assert!(sessions.cache().is_empty());
}

#[test]
fn test_create_with_malformed_access_token_writes_nothing() {
    let sessions = common::test_sessions(UNREACHABLE_BACKEND);
    let mut jar = CookieJar::new();
    let mut payload = common::session_token("u1", 600, common::now_secs() + 86400);
    payload.access.access_token = "not-a-jwt".to_string();

    assert!(sessions.create_session(&mut jar, payload).is_err());
    assert!(jar.get(AUTH_COOKIE).is_none());
    assert!(jar.get(CLIENT_COOKIE).is_none());
}

#[test]
fn test_cache_hit_does_not_decode_again() {
    let decoder = Arc::new(CountingDecoder::default());
    let sessions = common::test_sessions(UNREACHABLE_BACKEND).with_decoder(decoder.clone());
    let mut jar = CookieJar::new();

    sessions
        .create_session(
            &mut jar,
            common::session_token("u1", 600, common::now_secs() + 86400),
        )
        .unwrap();
    let after_create = decoder.calls();

    assert!(sessions.get_session(&mut jar).is_some());
    assert!(sessions.get_session(&mut jar).is_some());
    assert_eq!(decoder.calls(), after_create);
}

#[test]
fn test_cold_cache_decodes_once_then_caches() {
    let writer = common::test_sessions(UNREACHABLE_BACKEND);
    let mut jar = CookieJar::new();
    writer
        .create_session(
            &mut jar,
            common::session_token("u1", 600, common::now_secs() + 86400),
        )
        .unwrap();

    // A second process with its own empty cache sees the same cookies
    let decoder = Arc::new(CountingDecoder::default());
    let reader = common::test_sessions(UNREACHABLE_BACKEND).with_decoder(decoder.clone());

    assert!(reader.get_session(&mut jar).is_some());
    assert_eq!(decoder.calls(), 1);
    assert!(reader.cache().get(&client_value(&jar)).is_some());

    assert!(reader.get_session(&mut jar).is_some());
    assert_eq!(decoder.calls(), 1);
}

#[test]
fn test_expired_access_token_clears_session() {
    let sessions = common::test_sessions(UNREACHABLE_BACKEND);
    let mut jar = CookieJar::new();
    sessions
        .create_session(
            &mut jar,
            common::session_token("u1", -60, common::now_secs() + 86400),
        )
        .unwrap();

    assert!(sessions.get_session(&mut jar).is_none());
    assert!(jar.get(AUTH_COOKIE).is_none());
    assert!(jar.get(CLIENT_COOKIE).is_none());
    assert!(sessions.cache().is_empty());
}

#[test]
fn test_malformed_client_cookie_clears_session() {
    let sessions = common::test_sessions(UNREACHABLE_BACKEND);
    let mut jar = CookieJar::new()
        .add(Cookie::new(CLIENT_COOKIE, "{not json"))
        .add(Cookie::new(AUTH_COOKIE, "{not json"));

    assert!(sessions.get_session(&mut jar).is_none());
    assert!(jar.get(CLIENT_COOKIE).is_none());
    assert!(jar.get(AUTH_COOKIE).is_none());
}

#[test]
fn test_no_cookies_means_no_session() {
    let sessions = common::test_sessions(UNREACHABLE_BACKEND);
    let mut jar = CookieJar::new();

    assert!(sessions.get_session(&mut jar).is_none());
    assert!(sessions.get_session_token(&mut jar).is_none());
}

#[test]
fn test_expired_refresh_token_clears_session() {
    let sessions = common::test_sessions(UNREACHABLE_BACKEND);
    let token = common::session_token("u1", 600, common::now_secs() - 10);
    let mut jar = CookieJar::new()
        .add(Cookie::new(
            AUTH_COOKIE,
            serde_json::to_string(&token).unwrap(),
        ))
        .add(Cookie::new(
            CLIENT_COOKIE,
            serde_json::to_string(&token.reduced()).unwrap(),
        ));

    assert!(sessions.get_session_token(&mut jar).is_none());
    assert!(jar.get(AUTH_COOKIE).is_none());
    assert!(jar.get(CLIENT_COOKIE).is_none());
}

#[test]
fn test_destroy_is_idempotent() {
    let sessions = common::test_sessions(UNREACHABLE_BACKEND);
    let mut jar = CookieJar::new();
    sessions
        .create_session(
            &mut jar,
            common::session_token("u1", 600, common::now_secs() + 86400),
        )
        .unwrap();
    assert_eq!(sessions.cache().len(), 1);

    let first = sessions.destroy_session(&mut jar).unwrap();
    assert_eq!(first.status, 200);
    assert_eq!(first.message, "Session removed");
    assert!(sessions.cache().is_empty());
    assert!(jar.get(AUTH_COOKIE).is_none());
    assert!(jar.get(CLIENT_COOKIE).is_none());

    let second = sessions.destroy_session(&mut jar).unwrap();
    assert_eq!(second, first);
    assert!(sessions.get_session(&mut jar).is_none());
}

#[test]
fn test_update_session_keeps_original_expiry() {
    let sessions = common::test_sessions(UNREACHABLE_BACKEND);
    let mut jar = CookieJar::new();
    let refresh_exp = common::now_secs() + 3600;
    let payload = common::session_token("u1", 600, refresh_exp);
    sessions.create_session(&mut jar, payload.clone()).unwrap();
    let old_key = client_value(&jar);

    let new_access = common::access_token("u1", 900);
    let updated = sessions
        .update_session(&mut jar, &SessionUpdate::access_token(new_access.clone()))
        .unwrap();

    assert_eq!(updated.id, "u1");
    assert_eq!(updated.access.access_token, new_access);
    for name in [AUTH_COOKIE, CLIENT_COOKIE] {
        let expires = jar.get(name).unwrap().expires_datetime().unwrap();
        assert_eq!(expires.unix_timestamp(), refresh_exp);
    }

    let token = sessions.get_session_token(&mut jar).unwrap();
    assert_eq!(token.access.access_token, new_access);
    assert_eq!(token.access.refresh_token, payload.access.refresh_token);

    // The stale cache entry is gone and the new cookie decodes fresh
    assert!(sessions.cache().get(&old_key).is_none());
    assert_eq!(sessions.get_session(&mut jar).unwrap(), updated);
}

#[test]
fn test_update_session_without_session_is_session_expired() {
    let sessions = common::test_sessions(UNREACHABLE_BACKEND);
    let mut jar = CookieJar::new();

    let result = sessions.update_session(&mut jar, &SessionUpdate::access_token("A2"));

    assert!(matches!(
        result,
        Err(AppError::Unauthorized(UnauthorizedReason::SessionExpired))
    ));
}

#[test]
fn test_out_of_range_expiry_clears_session() {
    let sessions = common::test_sessions(UNREACHABLE_BACKEND);
    let huge_exp = i64::MAX / 10;
    let mut token = common::session_token("u1", 600, huge_exp);
    token.access.access_token = common::mint(json!({ "sub": "u1", "exp": huge_exp }));
    let mut jar = CookieJar::new()
        .add(Cookie::new(
            AUTH_COOKIE,
            serde_json::to_string(&token).unwrap(),
        ))
        .add(Cookie::new(
            CLIENT_COOKIE,
            serde_json::to_string(&token.reduced()).unwrap(),
        ));

    assert!(sessions.get_session(&mut jar).is_none());
    assert!(jar.get(AUTH_COOKIE).is_none());
    assert!(jar.get(CLIENT_COOKIE).is_none());
    assert!(sessions.cache().is_empty());
}

#[test]
fn test_out_of_range_refresh_expiry_is_no_session_token() {
    let sessions = common::test_sessions(UNREACHABLE_BACKEND);
    let token = common::session_token("u1", 600, i64::MAX / 10);
    let mut jar = CookieJar::new().add(Cookie::new(
        AUTH_COOKIE,
        serde_json::to_string(&token).unwrap(),
    ));

    assert!(sessions.get_session_token(&mut jar).is_none());
    assert!(jar.get(AUTH_COOKIE).is_none());
}
