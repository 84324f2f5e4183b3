// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory cache of decoded client sessions.
//!
//! Entries are keyed by the raw client-cookie value. Expiry is lazy: nothing
//! evicts entries, readers compare `expires_at` with the current time and
//! treat a stale hit as a miss. Cookies remain the source of truth.

use crate::models::Session;
use dashmap::DashMap;
use std::sync::Arc;

/// Cached session with its absolute expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub session: Session,
    /// Epoch milliseconds
    pub expires_at: i64,
}

impl CacheEntry {
    pub fn is_fresh(&self, now_millis: i64) -> bool {
        self.expires_at > now_millis
    }
}

/// Process-wide session cache. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct SessionCache {
    entries: Arc<DashMap<String, CacheEntry>>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw lookup, fresh or not.
    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Lookup that only returns entries still valid at `now_millis`.
    pub fn get_fresh(&self, key: &str, now_millis: i64) -> Option<Session> {
        self.entries
            .get(key)
            .filter(|entry| entry.is_fresh(now_millis))
            .map(|entry| entry.session.clone())
    }

    /// Insert or overwrite the entry for `key`.
    pub fn put(&self, key: impl Into<String>, session: Session, expires_at: i64) {
        self.entries
            .insert(key.into(), CacheEntry { session, expires_at });
    }

    pub fn delete(&self, key: &str) {
        self.entries.remove(key);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
