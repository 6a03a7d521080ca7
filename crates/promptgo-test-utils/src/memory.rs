// SPDX-FileCopyrightText: 2026 PromptGo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory stores.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use promptgo_core::{PatternStore, PromptGoError, UsageRecord, UsageStore};

fn injected(what: &str) -> PromptGoError {
    PromptGoError::storage(std::io::Error::other(format!("injected {what} failure")))
}

/// Usage log backed by a `Vec`.
#[derive(Default)]
pub struct MemoryUsageStore {
    records: Mutex<Vec<UsageRecord>>,
    fail_inserts: AtomicBool,
}

impl MemoryUsageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-loaded with `records`.
    pub fn with_records(records: Vec<UsageRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            fail_inserts: AtomicBool::new(false),
        }
    }

    /// Every record inserted so far, in insertion order.
    pub fn all(&self) -> Vec<UsageRecord> {
        self.records.lock().expect("usage store poisoned").clone()
    }

    /// Make subsequent inserts fail with a storage error.
    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl UsageStore for MemoryUsageStore {
    async fn insert(&self, record: &UsageRecord) -> Result<(), PromptGoError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(injected("insert"));
        }
        self.records
            .lock()
            .expect("usage store poisoned")
            .push(record.clone());
        Ok(())
    }

    async fn query_between(
        &self,
        org: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<UsageRecord>, PromptGoError> {
        let mut out: Vec<UsageRecord> = self
            .records
            .lock()
            .expect("usage store poisoned")
            .iter()
            .filter(|r| r.org == org && r.timestamp >= start && r.timestamp < end)
            .cloned()
            .collect();
        out.sort_by_key(|r| r.timestamp);
        Ok(out)
    }
}

/// Pattern store keyed by org, holding raw JSON.
#[derive(Default)]
pub struct MemoryPatternStore {
    blobs: Mutex<HashMap<String, String>>,
    fail_loads: AtomicBool,
    fail_saves: AtomicBool,
}

impl MemoryPatternStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Saved JSON for `org`, if any.
    pub fn raw(&self, org: &str) -> Option<String> {
        self.blobs
            .lock()
            .expect("pattern store poisoned")
            .get(org)
            .cloned()
    }

    /// Overwrite the saved blob for `org`, e.g. with corrupt JSON.
    pub fn put_raw(&self, org: &str, json: &str) {
        self.blobs
            .lock()
            .expect("pattern store poisoned")
            .insert(org.to_string(), json.to_string());
    }

    pub fn fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl PatternStore for MemoryPatternStore {
    async fn load_patterns(&self, org: &str) -> Result<Option<String>, PromptGoError> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(injected("load"));
        }
        Ok(self.raw(org))
    }

    async fn save_patterns(&self, org: &str, state_json: &str) -> Result<(), PromptGoError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(injected("save"));
        }
        self.put_raw(org, state_json);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use promptgo_core::Channel;

    #[tokio::test]
    async fn query_is_half_open_and_org_scoped() {
        let now = Utc::now();
        let mut a = UsageRecord::new("acme", Channel::Web, "m");
        a.timestamp = now - Duration::hours(1);
        let mut b = UsageRecord::new("acme", Channel::Web, "m");
        b.timestamp = now;
        let other = UsageRecord::new("beta", Channel::Web, "m");

        let store = MemoryUsageStore::with_records(vec![b, a.clone(), other]);
        let got = store
            .query_between("acme", now - Duration::days(1), now)
            .await
            .unwrap();
        assert_eq!(got, vec![a]);
    }

    #[tokio::test]
    async fn injected_failures_surface() {
        let store = MemoryPatternStore::new();
        store.fail_saves(true);
        assert!(store.save_patterns("acme", "{}").await.is_err());
        store.fail_saves(false);
        store.save_patterns("acme", "{}").await.unwrap();
        assert_eq!(store.load_patterns("acme").await.unwrap().as_deref(), Some("{}"));
    }
}
