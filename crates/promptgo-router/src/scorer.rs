// SPDX-FileCopyrightText: 2026 PromptGo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heuristic channel scoring.
//!
//! Maps prompt text to a four-channel score vector using additive signal
//! contributions, a logistic squash, and per-channel weights. No model
//! inference, no network, no state: identical inputs give identical output.

use promptgo_core::{Channel, RoutingWeights};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::signals::{self, Signal};

/// Prompts at or above this many characters never score as a direct answer.
pub const SHORT_PROMPT_CHARS: usize = 280;

const FRESH_BOOST: f64 = 1.2;
const COMPARE_BOOST: f64 = 0.4;
const COMPLEX_BOOST: f64 = 1.1;
const AMBIGUOUS_BOOST: f64 = 0.9;
const DIRECT_BOOST: f64 = 0.9;

/// Boolean features extracted from a prompt, shared by scoring and explanations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PromptFeatures {
    pub fresh: bool,
    pub complex: bool,
    pub ambiguous: bool,
    pub step_by_step: bool,
    /// Two or more `\n- ` bullet continuations.
    pub bulleted: bool,
    /// Mentions "how much" or "compare".
    pub comparison: bool,
    pub not_sure: bool,
    /// Says "recommend" without mentioning a budget.
    pub open_recommendation: bool,
    /// Under [`SHORT_PROMPT_CHARS`] with exactly one `?`.
    pub short_single_question: bool,
}

impl PromptFeatures {
    /// Extract features from raw prompt text.
    pub fn extract(prompt: &str) -> Self {
        let p = prompt.to_lowercase();
        Self {
            fresh: signals::matches(Signal::Fresh, &p),
            complex: signals::matches(Signal::Complex, &p),
            ambiguous: signals::matches(Signal::Ambiguous, &p),
            step_by_step: p.contains("step-by-step"),
            bulleted: p.matches("\n- ").count() >= 2,
            comparison: p.contains("how much") || p.contains("compare"),
            not_sure: p.contains("not sure"),
            open_recommendation: p.contains("recommend") && !p.contains("budget"),
            short_single_question: p.chars().count() < SHORT_PROMPT_CHARS
                && p.matches('?').count() == 1,
        }
    }

    /// Unsquashed per-channel accumulators.
    fn raw(&self) -> [f64; 4] {
        let mut s = [0.0; 4];
        if self.fresh {
            s[Channel::Web.index()] += FRESH_BOOST;
        }
        if self.comparison {
            s[Channel::Web.index()] += COMPARE_BOOST;
        }
        if self.complex || self.step_by_step || self.bulleted {
            s[Channel::Agent.index()] += COMPLEX_BOOST;
        }
        if self.ambiguous || self.not_sure || self.open_recommendation {
            s[Channel::Ask.index()] += AMBIGUOUS_BOOST;
        }
        if self.short_single_question && !self.fresh && !self.complex {
            s[Channel::Direct.index()] += DIRECT_BOOST;
        }
        s
    }
}

/// Exactly one score per channel, in declared order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreVector([f64; 4]);

impl ScoreVector {
    /// Score for a channel.
    pub fn get(&self, channel: Channel) -> f64 {
        self.0[channel.index()]
    }

    /// Multiply one channel's score.
    pub fn scale(&mut self, channel: Channel, factor: f64) {
        self.0[channel.index()] *= factor;
    }

    /// `(channel, score)` pairs in declared order.
    pub fn iter(&self) -> impl Iterator<Item = (Channel, f64)> + '_ {
        Channel::ALL.into_iter().map(|c| (c, self.get(c)))
    }

    /// Arg-max; ties go to the channel declared first.
    pub fn top(&self) -> (Channel, f64) {
        self.iter()
            .fold((Channel::Web, f64::NEG_INFINITY), |best, (c, s)| {
                if s > best.1 { (c, s) } else { best }
            })
    }

    /// Channels by descending score; equal scores keep declared order.
    pub fn ranked(&self) -> Vec<(Channel, f64)> {
        let mut ranked: Vec<(Channel, f64)> = self.iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}

impl Serialize for ScoreVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4))?;
        for (channel, score) in self.iter() {
            map.serialize_entry(&channel, &score)?;
        }
        map.end()
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Score a prompt against all four channels.
///
/// A channel with no signal still lands at 0.5 before weighting.
pub fn score(prompt: &str, weights: &RoutingWeights) -> ScoreVector {
    let raw = PromptFeatures::extract(prompt).raw();
    let mut out = [0.0; 4];
    for channel in Channel::ALL {
        let i = channel.index();
        out[i] = sigmoid(raw[i]) * weights.get(channel);
    }
    ScoreVector(out)
}
