// SPDX-FileCopyrightText: 2026 PromptGo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request and response shapes for the service operations.

use promptgo_core::Channel;
use promptgo_router::SuggestionPack;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankedChannel {
    pub channel: Channel,
    pub score: f64,
}

/// Result of a routing suggestion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestResponse {
    pub top_channel: Channel,
    /// Every channel, best first; equal scores keep declared order.
    pub ranking: Vec<RankedChannel>,
    pub reasons: Vec<String>,
    pub suggestions: SuggestionPack,
    pub learning_applied: bool,
}

/// A served request to append to the usage log.
///
/// A missing org falls back to `service.org`. Missing user, feature, and
/// source fall back to `unknown`, `default`, and `cursor`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRequest {
    pub prompt: String,
    pub route: Channel,
    pub model: String,
    #[serde(default)]
    pub org: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub feature: Option<String>,
    #[serde(default)]
    pub source_app: Option<String>,
    #[serde(default)]
    pub tokens_in: u64,
    #[serde(default)]
    pub tokens_out: u64,
    #[serde(default)]
    pub latency_ms: u64,
}

impl LogRequest {
    pub fn new(prompt: impl Into<String>, route: Channel, model: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            route,
            model: model.into(),
            org: None,
            user: None,
            feature: None,
            source_app: None,
            tokens_in: 0,
            tokens_out: 0,
            latency_ms: 0,
        }
    }
}

/// Acknowledgement for a logged request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogReceipt {
    pub id: String,
    pub cost_usd: f64,
}
