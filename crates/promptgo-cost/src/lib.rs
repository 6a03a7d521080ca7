// SPDX-FileCopyrightText: 2026 PromptGo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cost estimation, usage rollups, and budget management for PromptGo.
//!
//! Every function here is pure: callers load usage from a store and pass it
//! in, which keeps budget math testable against fixed clocks.

pub mod aggregator;
pub mod budget;
pub mod pricing;
pub mod report;
pub mod team;

pub use aggregator::{summarize, Rollup};
pub use budget::{
    AlertLevel, BudgetAlert, BudgetManager, BudgetStatus, EnforcementDecision, EnforcementInfo,
};
pub use pricing::{estimate, estimate_candidates, load_rates, CandidateEstimate, ModelRate, RateTable};
pub use report::{downshift_savings, optimization_report, roi_markdown, OptimizationReport};
pub use team::{team_metrics, weekly_rules, RuleStats, TeamMetrics, WeeklyRules};

/// Round half away from zero to `dp` decimal places.
pub fn round_to(value: f64, dp: i32) -> f64 {
    let factor = 10f64.powi(dp);
    (value * factor).round() / factor
}
