// SPDX-FileCopyrightText: 2026 PromptGo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Human-readable reasons and per-channel follow-up suggestions.

use serde::{Deserialize, Serialize};

use crate::scorer::PromptFeatures;

pub const REASON_FRESH: &str = "Fresh/volatile info → web";
pub const REASON_MULTI_STEP: &str = "Multi-step/tooling → agent";
pub const REASON_UNDERSPECIFIED: &str = "Underspecified → ask";
pub const REASON_SHORT_QUESTION: &str = "Short Q → direct";
pub const REASON_FALLBACK: &str = "No strong signals; direct or ask are safe defaults";

const CLARIFYING_QUESTIONS: [&str; 3] = [
    "Goal & success metric?",
    "Constraints (budget, deadline, platform)?",
    "Inputs available (files, URLs, APIs)?",
];

const AGENT_PLAN: &str = "Plan:\n1) Subtasks\n2) Tools\n3) Execute\n4) Verify\n5) Summarize";
const AGENT_TOOLS: &str = "Tools: web.search → parse → write.md / commit PR";
const DIRECT_INSTRUCTION: &str = "Answer concisely with 3 bullets and a short example.";
const WEB_QUERY_FILTER: &str = "site:docs official after:2024-01-01";
const WEB_QUERY_AFTER: &str = "after:2024-01-01";

/// Ready-to-use follow-ups for every channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionPack {
    /// Clarifying questions to put to the user.
    pub ask: Vec<String>,
    /// A search query derived from the prompt.
    pub web: String,
    /// Plan template followed by the tool chain.
    pub agent: Vec<String>,
    /// Instruction for answering in place.
    pub direct: String,
}

/// Why each triggered channel was considered, in `web, agent, ask, direct` order.
///
/// The direct-answer reason only excludes fresh prompts; the scorer also
/// excludes complex ones, so an explanation may mention `direct` even when it
/// did not score.
pub fn explain(prompt: &str) -> Vec<&'static str> {
    let f = PromptFeatures::extract(prompt);
    let mut reasons = Vec::new();
    if f.fresh {
        reasons.push(REASON_FRESH);
    }
    if f.complex || f.step_by_step {
        reasons.push(REASON_MULTI_STEP);
    }
    if f.ambiguous {
        reasons.push(REASON_UNDERSPECIFIED);
    }
    if f.short_single_question && !f.fresh {
        reasons.push(REASON_SHORT_QUESTION);
    }
    if reasons.is_empty() {
        reasons.push(REASON_FALLBACK);
    }
    reasons
}

/// Build the follow-up payload for every channel.
pub fn suggestion_pack(prompt: &str) -> SuggestionPack {
    suggestion_pack_for(prompt, &[])
}

/// Like [`suggestion_pack`], but the web query is restricted to a team's
/// trusted `domains` when any are given.
pub fn suggestion_pack_for(prompt: &str, domains: &[String]) -> SuggestionPack {
    let query = prompt.trim().trim_end_matches('?');
    let sites: Vec<String> = domains
        .iter()
        .map(|d| d.trim())
        .filter(|d| !d.is_empty())
        .map(|d| format!("site:{d}"))
        .collect();
    let web = if sites.is_empty() {
        format!("{query} {WEB_QUERY_FILTER}")
    } else {
        format!("{query} ({}) {WEB_QUERY_AFTER}", sites.join(" OR "))
    };
    SuggestionPack {
        ask: CLARIFYING_QUESTIONS.iter().map(|q| q.to_string()).collect(),
        web,
        agent: vec![AGENT_PLAN.to_string(), AGENT_TOOLS.to_string()],
        direct: DIRECT_INSTRUCTION.to_string(),
    }
}
