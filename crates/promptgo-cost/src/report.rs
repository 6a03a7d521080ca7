// SPDX-FileCopyrightText: 2026 PromptGo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cost optimization reports and ROI summaries.

use chrono::{DateTime, Utc};
use promptgo_config::BudgetPolicy;
use promptgo_core::{Channel, UsageRecord};
use serde::Serialize;

use crate::budget::BudgetStatus;
use crate::round_to;

/// Share of premium-model spend assumed recoverable by downgrading.
const MODEL_DOWNGRADE_SAVINGS: f64 = 0.6;
/// Share of agent spend assumed recoverable by better routing.
const AGENT_ROUTING_SAVINGS: f64 = 0.3;
/// Agent share of spend above which route optimization is suggested.
const AGENT_COST_SHARE: f64 = 0.4;

/// Fraction of requests assumed safe to move to a cheaper model.
pub const DEFAULT_DOWNSHIFT_RATIO: f64 = 0.2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavingsOpportunity {
    pub category: String,
    pub description: String,
    pub current_cost: f64,
    pub potential_savings: f64,
    pub impact: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavingsSummary {
    /// Rounded to cents.
    pub total_potential_savings: f64,
    pub opportunities: Vec<SavingsOpportunity>,
    /// Savings as a share of spend, to one decimal; 0 when nothing was spent.
    pub optimization_percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Recommendations {
    pub immediate: Vec<String>,
    pub medium_term: Vec<String>,
    pub long_term: Vec<String>,
}

impl Recommendations {
    /// Every recommendation, most urgent first.
    pub fn all(&self) -> Vec<String> {
        self.immediate
            .iter()
            .chain(&self.medium_term)
            .chain(&self.long_term)
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationReport {
    pub org: String,
    pub period: String,
    pub budget_status: BudgetStatus,
    pub savings_opportunities: SavingsSummary,
    pub recommendations: Recommendations,
    /// Savings if [`DEFAULT_DOWNSHIFT_RATIO`] of the month's requests moved
    /// to cheaper models, to cents.
    pub downshift_estimate: f64,
    pub generated_at: DateTime<Utc>,
}

/// Savings opportunities in the month-to-date usage.
pub fn savings_opportunities(records: &[UsageRecord], policy: &BudgetPolicy) -> SavingsSummary {
    let total: f64 = records.iter().map(|r| r.cost_usd).sum();
    let premium: f64 = records
        .iter()
        .filter(|r| policy.is_premium(&r.model))
        .map(|r| r.cost_usd)
        .sum();
    let agent: f64 = records
        .iter()
        .filter(|r| r.channel == Channel::Agent)
        .map(|r| r.cost_usd)
        .sum();

    let mut opportunities = Vec::new();
    if premium > 0.0 {
        opportunities.push(SavingsOpportunity {
            category: "Model Optimization".into(),
            description: "Downgrade premium models for routine tasks".into(),
            current_cost: premium,
            potential_savings: premium * MODEL_DOWNGRADE_SAVINGS,
            impact: "High".into(),
        });
    }
    if agent > total * AGENT_COST_SHARE {
        opportunities.push(SavingsOpportunity {
            category: "Route Optimization".into(),
            description: "Optimize agent-mode usage with better prompt structuring".into(),
            current_cost: agent,
            potential_savings: agent * AGENT_ROUTING_SAVINGS,
            impact: "Medium".into(),
        });
    }

    let potential: f64 = opportunities.iter().map(|o| o.potential_savings).sum();
    SavingsSummary {
        total_potential_savings: round_to(potential, 2),
        opportunities,
        optimization_percentage: if total > 0.0 {
            round_to(potential / total * 100.0, 1)
        } else {
            0.0
        },
    }
}

/// Tiered recommendations; the immediate tier only appears past 80% of budget.
pub fn recommendations(percentage_used: f64) -> Recommendations {
    let immediate = if percentage_used > 80.0 {
        vec![
            "Enable soft budget enforcement to automatically downgrade models".to_string(),
            "Review and optimize agent-mode prompts for efficiency".to_string(),
            "Batch non-urgent requests to spread costs".to_string(),
        ]
    } else {
        Vec::new()
    };

    Recommendations {
        immediate,
        medium_term: vec![
            "Set up team routing preferences based on usage patterns".into(),
            "Implement prompt templates for common use cases".into(),
            "Enable adaptive learning to improve routing efficiency".into(),
        ],
        long_term: vec![
            "Consider local/on-premise models for routine tasks".into(),
            "Establish team guidelines for cost-effective prompting".into(),
            "Regular budget reviews and optimization sessions".into(),
        ],
    }
}

/// Assemble the full report from an unrounded status and the same usage window.
pub fn optimization_report(
    status: BudgetStatus,
    records: &[UsageRecord],
    policy: &BudgetPolicy,
    now: DateTime<Utc>,
) -> OptimizationReport {
    let recommendations = recommendations(status.percentage_used);
    let costs: Vec<f64> = records.iter().map(|r| r.cost_usd).collect();
    OptimizationReport {
        org: status.org.clone(),
        period: "current_month".to_string(),
        savings_opportunities: savings_opportunities(records, policy),
        budget_status: status.rounded(),
        recommendations,
        downshift_estimate: round_to(downshift_savings(&costs, DEFAULT_DOWNSHIFT_RATIO), 2),
        generated_at: now,
    }
}

/// Estimated savings from moving `ratio` of the given spend to cheaper models.
pub fn downshift_savings(costs: &[f64], ratio: f64) -> f64 {
    costs.iter().sum::<f64>() * ratio
}

/// Group the integer part of a dollar amount with commas.
fn format_usd(amount: f64) -> String {
    let cents = format!("{:.2}", amount.abs());
    let (whole, frac) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));
    let mut grouped = String::new();
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{sign}${grouped}.{frac}")
}

/// Markdown ROI summary suitable for pasting into a team update.
pub fn roi_markdown(savings_usd: f64, notes: &[String]) -> String {
    let bullets: Vec<String> = notes.iter().map(|n| format!("- {n}")).collect();
    format!(
        "# PromptGo ROI Report\n\n**Estimated monthly savings:** {}\n\nRecommendations:\n{}\n",
        format_usd(savings_usd),
        bullets.join("\n")
    )
}
