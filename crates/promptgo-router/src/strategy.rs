// SPDX-FileCopyrightText: 2026 PromptGo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};

/// How a suggestion is scored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringStrategy {
    /// Heuristic scorer with the team's configured weights.
    #[default]
    Static,
    /// Learned weights, user preferences, and feedback boosts.
    Adaptive,
}

impl ScoringStrategy {
    /// Strategy implied by `routing.learning_enabled`.
    pub fn from_learning_enabled(enabled: bool) -> Self {
        if enabled { Self::Adaptive } else { Self::Static }
    }
}
