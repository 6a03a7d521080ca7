// SPDX-FileCopyrightText: 2026 PromptGo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-organization adaptive routing state.
//!
//! An [`AdaptiveRouter`] owns one team's learned channel weights, per-user
//! channel histograms, and bounded feedback logs. Everything here is
//! synchronous and I/O-free; loading, locking, and persistence live in
//! [`crate::registry`].

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Utc};
use promptgo_core::{Channel, FeedbackEvent, Outcome, RoutingWeights, UsageRecord};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::scorer::{self, ScoreVector};

/// Maximum entries kept in each feedback log.
pub const PATTERN_LOG_CAP: usize = 1000;

/// How many of the newest successful entries feed the keyword boost.
pub const KEYWORD_WINDOW: usize = 100;

const KEYWORD_BOOST: f64 = 1.1;
const USER_PREFERENCE_BOOST: f64 = 1.2;
const USER_MIN_REQUESTS: u64 = 10;
const USER_PREFERENCE_SHARE: f64 = 0.4;
const MAX_EFFICIENCY_BONUS: f64 = 0.5;

/// Persisted learning state for one organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternState {
    #[serde(default)]
    pub route_weights: RoutingWeights,
    /// user → channel → observed request count.
    #[serde(default)]
    pub user_preferences: BTreeMap<String, BTreeMap<Channel, u64>>,
    #[serde(default)]
    pub successful_patterns: VecDeque<FeedbackEvent>,
    #[serde(default)]
    pub failed_patterns: VecDeque<FeedbackEvent>,
    pub last_updated: DateTime<Utc>,
}

impl Default for PatternState {
    fn default() -> Self {
        Self {
            route_weights: RoutingWeights::default(),
            user_preferences: BTreeMap::new(),
            successful_patterns: VecDeque::new(),
            failed_patterns: VecDeque::new(),
            last_updated: Utc::now(),
        }
    }
}

/// Result of scoring with learned weights.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdaptiveSuggestion {
    pub top_channel: Channel,
    pub scores: ScoreVector,
    /// Score of the top channel.
    pub confidence: f64,
    pub learning_applied: bool,
    /// The requesting user has a learned preference histogram.
    pub user_personalized: bool,
}

/// Summary of one organization's learning state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LearningStats {
    pub org: String,
    pub patterns_learned: usize,
    pub failed_patterns: usize,
    pub users_with_preferences: usize,
    pub route_weights: RoutingWeights,
    pub last_updated: DateTime<Utc>,
}

/// One team's adaptive router.
#[derive(Debug, Clone)]
pub struct AdaptiveRouter {
    org: String,
    state: PatternState,
}

impl AdaptiveRouter {
    /// A router with default weights and empty logs.
    pub fn new(org: impl Into<String>) -> Self {
        Self::with_state(org, PatternState::default())
    }

    /// A router resumed from previously saved state.
    pub fn with_state(org: impl Into<String>, state: PatternState) -> Self {
        Self {
            org: org.into(),
            state,
        }
    }

    pub fn org(&self) -> &str {
        &self.org
    }

    pub fn state(&self) -> &PatternState {
        &self.state
    }

    /// Recompute weights and user histograms from a usage window.
    ///
    /// Channels earn up to a 1.5× weight in proportion to their requests per
    /// dollar relative to the most efficient channel. Channels with no usage
    /// or no cost keep 1.0. An empty window leaves the state untouched and
    /// returns `false`.
    pub fn learn_from_usage(&mut self, records: &[UsageRecord]) -> bool {
        if records.is_empty() {
            debug!(org = %self.org, "no usage in learning window");
            return false;
        }

        let mut totals: BTreeMap<Channel, (u64, f64)> = BTreeMap::new();
        let mut preferences: BTreeMap<String, BTreeMap<Channel, u64>> = BTreeMap::new();

        for r in records {
            let entry = totals.entry(r.channel).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += r.cost_usd;

            if !r.user.is_empty() {
                *preferences
                    .entry(r.user.clone())
                    .or_default()
                    .entry(r.channel)
                    .or_insert(0) += 1;
            }
        }

        let efficiency: BTreeMap<Channel, f64> = totals
            .iter()
            .filter(|(_, (count, cost))| *count > 0 && *cost > 0.0)
            .map(|(channel, (count, cost))| (*channel, *count as f64 / cost))
            .collect();

        let mut weights = RoutingWeights::default();
        if let Some(max) = efficiency.values().copied().reduce(f64::max) {
            for (channel, eff) in &efficiency {
                *weights.get_mut(*channel) = 1.0 + (eff / max) * MAX_EFFICIENCY_BONUS;
            }
        }

        debug!(
            org = %self.org,
            records = records.len(),
            weights = ?weights,
            "learned route weights"
        );

        self.state.route_weights = weights;
        self.state.user_preferences = preferences;
        true
    }

    /// Learned weights, boosted for a user's strongly preferred channels.
    ///
    /// Applies only once the user has more than 10 observed requests; every
    /// channel holding over 40% of them gets ×1.2.
    pub fn adaptive_weights(&self, user: Option<&str>) -> RoutingWeights {
        let mut weights = self.state.route_weights;

        let Some(prefs) = user.and_then(|u| self.state.user_preferences.get(u)) else {
            return weights;
        };
        let total: u64 = prefs.values().sum();
        if total <= USER_MIN_REQUESTS {
            return weights;
        }
        for (channel, count) in prefs {
            if *count as f64 / total as f64 > USER_PREFERENCE_SHARE {
                *weights.get_mut(*channel) *= USER_PREFERENCE_BOOST;
            }
        }
        weights
    }

    /// Score with learned weights, then apply the success-log boost.
    ///
    /// Every one of the newest [`KEYWORD_WINDOW`] successful entries whose
    /// suggested and actual channels agree multiplies that channel by 1.1.
    /// The boost compounds and ignores prompt similarity.
    pub fn suggest(&self, prompt: &str, user: Option<&str>) -> AdaptiveSuggestion {
        let weights = self.adaptive_weights(user);
        let mut scores = scorer::score(prompt, &weights);

        let skip = self
            .state
            .successful_patterns
            .len()
            .saturating_sub(KEYWORD_WINDOW);
        for pattern in self.state.successful_patterns.iter().skip(skip) {
            if pattern.suggested_route == pattern.actual_route {
                scores.scale(pattern.suggested_route, KEYWORD_BOOST);
            }
        }

        let (top_channel, confidence) = scores.top();
        AdaptiveSuggestion {
            top_channel,
            scores,
            confidence,
            learning_applied: true,
            user_personalized: user.is_some_and(|u| self.state.user_preferences.contains_key(u)),
        }
    }

    /// Log a feedback event.
    ///
    /// A `good` outcome where the suggestion was followed goes to the success
    /// log, any `bad` outcome to the failure log; other events are dropped.
    /// Both logs are trimmed to [`PATTERN_LOG_CAP`], oldest first. Returns
    /// whether the event was kept.
    pub fn record_feedback(&mut self, event: FeedbackEvent) -> bool {
        let kept = match event.outcome {
            Outcome::Good if event.suggested_route == event.actual_route => {
                self.state.successful_patterns.push_back(event);
                true
            }
            Outcome::Bad => {
                self.state.failed_patterns.push_back(event);
                true
            }
            _ => false,
        };

        trim_front(&mut self.state.successful_patterns);
        trim_front(&mut self.state.failed_patterns);
        kept
    }

    /// Counts and weights for reporting.
    pub fn stats(&self) -> LearningStats {
        LearningStats {
            org: self.org.clone(),
            patterns_learned: self.state.successful_patterns.len(),
            failed_patterns: self.state.failed_patterns.len(),
            users_with_preferences: self.state.user_preferences.len(),
            route_weights: self.state.route_weights,
            last_updated: self.state.last_updated,
        }
    }

    /// Stamp `last_updated` and serialize for persistence.
    pub fn snapshot(&mut self, now: DateTime<Utc>) -> Result<String, serde_json::Error> {
        self.state.last_updated = now;
        serde_json::to_string_pretty(&self.state)
    }
}

fn trim_front(log: &mut VecDeque<FeedbackEvent>) {
    while log.len() > PATTERN_LOG_CAP {
        log.pop_front();
    }
}
