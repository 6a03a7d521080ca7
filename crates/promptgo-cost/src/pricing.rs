// SPDX-FileCopyrightText: 2026 PromptGo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model rate tables and cost estimation.
//!
//! Rates are USD per thousand tokens. The table can be overridden by a TOML
//! file:
//!
//! ```toml
//! [models."openai/gpt-4o"]
//! in = 2.50
//! out = 10.00
//! ```
//!
//! Unknown models cost nothing so estimation never fails.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Per-model pricing in USD per thousand tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelRate {
    #[serde(rename = "in")]
    pub input_per_1k: f64,
    #[serde(rename = "out")]
    pub output_per_1k: f64,
}

impl ModelRate {
    /// Input plus output rate, used to rank models by price.
    pub fn blended(&self) -> f64 {
        self.input_per_1k + self.output_per_1k
    }
}

/// Model name → rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateTable {
    #[serde(default)]
    pub models: BTreeMap<String, ModelRate>,
}

impl Default for RateTable {
    fn default() -> Self {
        let models = [
            ("openai/gpt-4o-mini", 0.15, 0.60),
            ("openai/gpt-4o", 2.50, 10.00),
            ("openai/gpt-3.5-turbo", 0.50, 1.50),
            ("anthropic/claude-3-haiku", 0.25, 1.25),
            ("local/tiny-llama", 0.0, 0.0),
        ]
        .into_iter()
        .map(|(name, input, output)| {
            (
                name.to_string(),
                ModelRate {
                    input_per_1k: input,
                    output_per_1k: output,
                },
            )
        })
        .collect();
        Self { models }
    }
}

impl RateTable {
    /// Rate for `model`; zero for models not in the table.
    pub fn rate(&self, model: &str) -> ModelRate {
        self.priced(model).unwrap_or_default()
    }

    /// Rate for `model` only if the table lists it.
    pub fn priced(&self, model: &str) -> Option<ModelRate> {
        self.models.get(model).copied()
    }
}

/// Load a rate table, falling back to the built-in defaults.
///
/// `None`, a missing file, a malformed file, and a file with no models all
/// yield [`RateTable::default`].
pub fn load_rates(path: Option<&Path>) -> RateTable {
    let Some(path) = path else {
        return RateTable::default();
    };

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "rate table unreadable, using defaults");
            return RateTable::default();
        }
    };

    match toml::from_str::<RateTable>(&content) {
        Ok(table) if !table.models.is_empty() => {
            debug!(path = %path.display(), models = table.models.len(), "loaded rate table");
            table
        }
        Ok(_) => {
            warn!(path = %path.display(), "rate table is empty, using defaults");
            RateTable::default()
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "malformed rate table, using defaults");
            RateTable::default()
        }
    }
}

/// Cost in USD of one request.
pub fn estimate(tokens_in: u64, tokens_out: u64, model: &str, rates: &RateTable) -> f64 {
    let rate = rates.rate(model);
    (tokens_in as f64 / 1000.0) * rate.input_per_1k
        + (tokens_out as f64 / 1000.0) * rate.output_per_1k
}

/// Pre-flight estimate for one candidate model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateEstimate {
    pub model: String,
    pub tokens_in: u64,
    pub tokens_out: u64,
    pub cost_usd: f64,
    /// Not known before the request is sent.
    pub latency_ms: Option<u64>,
}

/// Estimate what `prompt` would cost on each of `models`.
///
/// Input tokens are approximated as one per four characters and the reply as
/// half the input. Output keeps the order of `models`.
pub fn estimate_candidates(prompt: &str, models: &[String], rates: &RateTable) -> Vec<CandidateEstimate> {
    let tokens_in = (prompt.chars().count() / 4) as u64;
    let tokens_out = tokens_in / 2;
    models
        .iter()
        .map(|model| CandidateEstimate {
            model: model.clone(),
            tokens_in,
            tokens_out,
            cost_usd: estimate(tokens_in, tokens_out, model, rates),
            latency_ms: None,
        })
        .collect()
}
