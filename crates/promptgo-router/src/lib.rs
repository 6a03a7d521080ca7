// SPDX-FileCopyrightText: 2026 PromptGo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel routing for PromptGo.
//!
//! Stateless pieces (signal matching, scoring, explanations) sit beside the
//! stateful adaptive router and the per-organization registry that owns it.

pub mod adaptive;
pub mod explain;
pub mod registry;
pub mod scorer;
pub mod signals;
pub mod strategy;

pub use adaptive::{AdaptiveRouter, AdaptiveSuggestion, LearningStats, PatternState};
pub use explain::{explain, suggestion_pack, suggestion_pack_for, SuggestionPack};
pub use registry::{LearningRegistry, TeamInsights};
pub use scorer::{score, PromptFeatures, ScoreVector};
pub use signals::Signal;
pub use strategy::ScoringStrategy;
