// SPDX-FileCopyrightText: 2026 PromptGo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fluent construction of usage records for tests.

use chrono::{DateTime, Utc};
use promptgo_core::{Channel, UsageRecord};

/// Builds a [`UsageRecord`] with sensible test defaults.
pub struct RecordBuilder {
    record: UsageRecord,
}

impl RecordBuilder {
    /// A `direct` request on `openai/gpt-4o-mini` for `org`, stamped now.
    pub fn new(org: &str) -> Self {
        Self {
            record: UsageRecord::new(org, Channel::Direct, "openai/gpt-4o-mini"),
        }
    }

    pub fn channel(mut self, channel: Channel) -> Self {
        self.record.channel = channel;
        self
    }

    pub fn model(mut self, model: &str) -> Self {
        self.record.model = model.to_string();
        self
    }

    pub fn user(mut self, user: &str) -> Self {
        self.record.user = user.to_string();
        self
    }

    pub fn feature(mut self, feature: &str) -> Self {
        self.record.feature = feature.to_string();
        self
    }

    pub fn cost(mut self, cost_usd: f64) -> Self {
        self.record.cost_usd = cost_usd;
        self
    }

    pub fn tokens(mut self, tokens_in: u64, tokens_out: u64) -> Self {
        self.record.tokens_in = tokens_in;
        self.record.tokens_out = tokens_out;
        self
    }

    pub fn latency(mut self, latency_ms: u64) -> Self {
        self.record.latency_ms = latency_ms;
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.record.timestamp = timestamp;
        self
    }

    pub fn build(self) -> UsageRecord {
        self.record
    }
}
