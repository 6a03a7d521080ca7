// SPDX-FileCopyrightText: 2026 PromptGo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the PromptGo store traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use promptgo_core::{PatternStore, PromptGoError, UsageRecord, UsageStore};
use tracing::debug;

use crate::database::Database;
use crate::queries;

/// SQLite-backed usage log and pattern store sharing one connection.
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Open the database file at `path` and wrap it.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, PromptGoError> {
        Ok(Self::new(Database::open(path, wal_mode).await?))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl UsageStore for SqliteStore {
    async fn insert(&self, record: &UsageRecord) -> Result<(), PromptGoError> {
        queries::usage::insert_usage(&self.db, record).await?;
        debug!(org = %record.org, id = %record.id, "usage record stored");
        Ok(())
    }

    async fn query_between(
        &self,
        org: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<UsageRecord>, PromptGoError> {
        queries::usage::usage_between(&self.db, org, start, end).await
    }
}

#[async_trait]
impl PatternStore for SqliteStore {
    async fn load_patterns(&self, org: &str) -> Result<Option<String>, PromptGoError> {
        queries::patterns::load_patterns(&self.db, org).await
    }

    async fn save_patterns(&self, org: &str, state_json: &str) -> Result<(), PromptGoError> {
        queries::patterns::save_patterns(&self.db, org, state_json).await
    }
}
