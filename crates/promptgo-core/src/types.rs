// SPDX-FileCopyrightText: 2026 PromptGo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common domain types shared across the PromptGo crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// One of the four fixed prompt-handling destinations.
///
/// Variant order is the tie-break order for ranking: `web, agent, ask, direct`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Web search for fresh or volatile information.
    Web,
    /// Autonomous multi-step agent execution.
    Agent,
    /// Ask the user a clarifying question first.
    Ask,
    /// Answer directly.
    Direct,
}

impl Channel {
    /// All channels in declared (tie-break) order.
    pub const ALL: [Channel; 4] = [Channel::Web, Channel::Agent, Channel::Ask, Channel::Direct];

    /// Position of this channel within [`Channel::ALL`].
    pub fn index(self) -> usize {
        match self {
            Channel::Web => 0,
            Channel::Agent => 1,
            Channel::Ask => 2,
            Channel::Direct => 3,
        }
    }
}

fn unit_weight() -> f64 {
    1.0
}

/// Per-channel score multipliers.
///
/// Missing entries deserialize to 1.0, so a partial `[weights]` table only
/// overrides the channels it names.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingWeights {
    #[serde(default = "unit_weight")]
    pub web: f64,
    #[serde(default = "unit_weight")]
    pub agent: f64,
    #[serde(default = "unit_weight")]
    pub ask: f64,
    #[serde(default = "unit_weight")]
    pub direct: f64,
}

impl Default for RoutingWeights {
    fn default() -> Self {
        Self {
            web: 1.0,
            agent: 1.0,
            ask: 1.0,
            direct: 1.0,
        }
    }
}

impl RoutingWeights {
    /// Weight for a channel.
    pub fn get(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Web => self.web,
            Channel::Agent => self.agent,
            Channel::Ask => self.ask,
            Channel::Direct => self.direct,
        }
    }

    /// Mutable weight for a channel.
    pub fn get_mut(&mut self, channel: Channel) -> &mut f64 {
        match channel {
            Channel::Web => &mut self.web,
            Channel::Agent => &mut self.agent,
            Channel::Ask => &mut self.ask,
            Channel::Direct => &mut self.direct,
        }
    }

    /// Iterate `(channel, weight)` pairs in declared order.
    pub fn iter(&self) -> impl Iterator<Item = (Channel, f64)> + '_ {
        Channel::ALL.into_iter().map(|c| (c, self.get(c)))
    }
}

/// Optional structured hints attached to a routing request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Context {
    pub org: Option<String>,
    pub user: Option<String>,
    pub source_app: Option<String>,
    pub repo_detected: Option<bool>,
    pub has_internet: Option<bool>,
    pub files_touched: Vec<String>,
    pub feature_tag: Option<String>,
}

/// Observed outcome of a routing suggestion.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Good,
    Neutral,
    Bad,
}

/// Key used to bucket usage records into rollups.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    #[default]
    User,
    Feature,
    Model,
}

impl GroupBy {
    /// Extract the grouping key from a record.
    pub fn key<'a>(&self, record: &'a UsageRecord) -> &'a str {
        match self {
            GroupBy::User => &record.user,
            GroupBy::Feature => &record.feature,
            GroupBy::Model => &record.model,
        }
    }
}

/// One served request, as persisted in the append-only usage log.
///
/// The raw prompt is never stored; only its SHA-256 digest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Unique record identifier (UUID v4).
    pub id: String,
    /// When the request was served.
    pub timestamp: DateTime<Utc>,
    pub org: String,
    pub user: String,
    pub feature: String,
    pub source_app: String,
    pub prompt_hash: String,
    pub channel: Channel,
    pub model: String,
    pub tokens_in: u64,
    pub tokens_out: u64,
    pub cost_usd: f64,
    pub latency_ms: u64,
}

impl UsageRecord {
    /// Create a record stamped now, with placeholder user/feature/source values.
    pub fn new(org: impl Into<String>, channel: Channel, model: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            org: org.into(),
            user: "unknown".to_string(),
            feature: "default".to_string(),
            source_app: "cursor".to_string(),
            prompt_hash: String::new(),
            channel,
            model: model.into(),
            tokens_in: 0,
            tokens_out: 0,
            cost_usd: 0.0,
            latency_ms: 0,
        }
    }
}

/// A single feedback observation kept in the adaptive router's pattern logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEvent {
    pub timestamp: DateTime<Utc>,
    pub prompt_hash: String,
    pub suggested_route: Channel,
    pub actual_route: Channel,
    pub outcome: Outcome,
    pub user: Option<String>,
}
