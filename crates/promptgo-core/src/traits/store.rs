// SPDX-FileCopyrightText: 2026 PromptGo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage traits for usage records and learned routing patterns.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::PromptGoError;
use crate::types::UsageRecord;

/// Append-only log of served requests.
#[async_trait]
pub trait UsageStore: Send + Sync {
    /// Append one record.
    async fn insert(&self, record: &UsageRecord) -> Result<(), PromptGoError>;

    /// All records for `org` with `start <= timestamp < end`, oldest first.
    async fn query_between(
        &self,
        org: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<UsageRecord>, PromptGoError>;
}

/// Durable home for each organization's serialized learning state.
///
/// The state is opaque JSON at this seam so that a corrupt blob can be
/// detected and reset by the router instead of failing inside the store.
#[async_trait]
pub trait PatternStore: Send + Sync {
    /// Load the raw state for `org`, or `None` if nothing was saved yet.
    async fn load_patterns(&self, org: &str) -> Result<Option<String>, PromptGoError>;

    /// Replace the saved state for `org`.
    async fn save_patterns(&self, org: &str, state_json: &str) -> Result<(), PromptGoError>;
}
