// SPDX-FileCopyrightText: 2026 PromptGo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Monthly budget tracking, alerts, suggestions, and enforcement.
//!
//! Everything here is a pure function of the org's policy, the rate table,
//! the month-to-date usage, and the current instant. Callers fetch the usage
//! window (`[month_start(now), now)`) and pass it in; nothing is cached.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use promptgo_config::{BudgetPolicy, EnforcementMode};
use promptgo_core::{Channel, UsageRecord};
use serde::Serialize;
use strum::Display;
use tracing::{debug, info};

use crate::pricing::RateTable;
use crate::round_to;

const CRITICAL_PERCENT: f64 = 90.0;
const EXCEEDED_PERCENT: f64 = 100.0;
const PROJECTED_WARNING_FACTOR: f64 = 1.1;
const PROJECTED_ENFORCE_FACTOR: f64 = 1.2;
const AGENT_DOWNGRADE_PERCENT: f64 = 95.0;

/// Hard-mode model when no fallback target has a known price.
pub const DEFAULT_HARD_FALLBACK: &str = "gpt-3.5-turbo";

/// Severity of a budget alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetAlert {
    pub level: AlertLevel,
    pub message: String,
    pub suggestion: Option<String>,
    pub action_required: bool,
}

/// Month-to-date budget position for one org.
///
/// Values are unrounded; call [`BudgetStatus::rounded`] before presenting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetStatus {
    pub org: String,
    pub period: String,
    pub current_spend: f64,
    pub budget_limit: f64,
    pub percentage_used: f64,
    pub days_remaining: i64,
    pub projected_spend: f64,
    pub alerts: Vec<BudgetAlert>,
    pub suggestions: Vec<String>,
}

impl BudgetStatus {
    /// Spend and projection to cents, percentage to one decimal.
    pub fn rounded(mut self) -> Self {
        self.current_spend = round_to(self.current_spend, 2);
        self.projected_spend = round_to(self.projected_spend, 2);
        self.percentage_used = round_to(self.percentage_used, 1);
        self
    }
}

/// What enforcement did to a request, and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnforcementInfo {
    pub enforced: bool,
    pub original_route: Channel,
    pub original_model: String,
    pub reason: Option<String>,
    pub savings_estimated: Option<String>,
}

/// Route and model after enforcement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnforcementDecision {
    pub route: Channel,
    pub model: String,
    pub info: EnforcementInfo,
}

/// Midnight UTC on the first day of `now`'s month.
pub fn month_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let first = NaiveDate::from_ymd_opt(now.year(), now.month(), 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_else(|| now.naive_utc());
    Utc.from_utc_datetime(&first)
}

/// Number of days in `now`'s month.
pub fn days_in_month(now: DateTime<Utc>) -> i64 {
    let (year, month) = if now.month() == 12 {
        (now.year() + 1, 1)
    } else {
        (now.year(), now.month() + 1)
    };
    match (
        NaiveDate::from_ymd_opt(now.year(), now.month(), 1),
        NaiveDate::from_ymd_opt(year, month, 1),
    ) {
        (Some(this), Some(next)) => (next - this).num_days(),
        _ => 30,
    }
}

/// Budget evaluation for one org's policy.
pub struct BudgetManager<'a> {
    policy: &'a BudgetPolicy,
    rates: &'a RateTable,
}

impl<'a> BudgetManager<'a> {
    pub fn new(policy: &'a BudgetPolicy, rates: &'a RateTable) -> Self {
        Self { policy, rates }
    }

    /// Compute status from the month-to-date usage.
    pub fn status(&self, org: &str, records: &[UsageRecord], now: DateTime<Utc>) -> BudgetStatus {
        let spend: f64 = records.iter().map(|r| r.cost_usd).sum();
        let limit = self.policy.monthly_limit_usd;

        let elapsed = (now - month_start(now)).num_days() + 1;
        let in_month = days_in_month(now);
        let projected = spend / elapsed as f64 * in_month as f64;
        let percentage = if limit > 0.0 { spend / limit * 100.0 } else { 0.0 };

        debug!(org, spend, limit, percentage, projected, "budget status computed");

        BudgetStatus {
            org: org.to_string(),
            period: "monthly".to_string(),
            current_spend: spend,
            budget_limit: limit,
            percentage_used: percentage,
            days_remaining: in_month - elapsed,
            projected_spend: projected,
            alerts: self.alerts(spend, limit, projected, percentage, now.day()),
            suggestions: self.suggestions(records, now.day()),
        }
    }

    fn alerts(
        &self,
        spend: f64,
        limit: f64,
        projected: f64,
        percentage: f64,
        day_of_month: u32,
    ) -> Vec<BudgetAlert> {
        let mut alerts = Vec::new();
        let warning_percent = self.policy.alert_threshold * 100.0;

        if percentage >= EXCEEDED_PERCENT {
            alerts.push(BudgetAlert {
                level: AlertLevel::Critical,
                message: format!("Budget exceeded! Current spend: ${spend:.2} / ${limit:.2}"),
                suggestion: Some("Consider enabling hard budget limits or upgrading your plan".into()),
                action_required: true,
            });
        } else if percentage >= CRITICAL_PERCENT {
            alerts.push(BudgetAlert {
                level: AlertLevel::Critical,
                message: format!("Budget nearly exhausted: {percentage:.1}% used"),
                suggestion: Some("Enable cost-saving measures immediately".into()),
                action_required: true,
            });
        } else if percentage >= warning_percent {
            alerts.push(BudgetAlert {
                level: AlertLevel::Warning,
                message: format!("Budget alert: {percentage:.1}% of monthly limit used"),
                suggestion: Some("Consider reviewing routing patterns to optimize costs".into()),
                action_required: false,
            });
        } else if projected > limit * PROJECTED_WARNING_FACTOR {
            alerts.push(BudgetAlert {
                level: AlertLevel::Warning,
                message: format!("Projected to exceed budget: ${projected:.2} estimated for month"),
                suggestion: Some("Current usage patterns may lead to budget overrun".into()),
                action_required: false,
            });
        }

        if percentage < 50.0 && day_of_month > 15 {
            alerts.push(BudgetAlert {
                level: AlertLevel::Info,
                message: "Budget usage is lower than expected - good cost management!".into(),
                suggestion: Some("Consider investing saved budget in advanced features".into()),
                action_required: false,
            });
        }

        alerts
    }

    fn suggestions(&self, records: &[UsageRecord], day_of_month: u32) -> Vec<String> {
        if records.is_empty() {
            return vec![
                "Start using PromptGo to get personalized cost optimization suggestions".into(),
            ];
        }

        let mut channel_cost = [0.0f64; 4];
        let mut channel_count = [0u64; 4];
        let mut premium_cost = 0.0;
        for r in records {
            channel_cost[r.channel.index()] += r.cost_usd;
            channel_count[r.channel.index()] += 1;
            if self.policy.is_premium(&r.model) {
                premium_cost += r.cost_usd;
            }
        }
        let total_cost: f64 = channel_cost.iter().sum();
        let total_requests = records.len() as u64;
        let cost_of = |c: Channel| channel_cost[c.index()];
        let count_of = |c: Channel| channel_count[c.index()];

        let mut out = Vec::new();

        if total_cost > 0.0 {
            if cost_of(Channel::Agent) / total_cost > 0.5 {
                out.push(
                    "Agent mode accounts for >50% of costs. Try breaking complex tasks into smaller prompts."
                        .to_string(),
                );
            }
            if cost_of(Channel::Direct) / total_cost > 0.4 && count_of(Channel::Direct) > 20 {
                out.push(
                    "Consider using smaller/local models for simple direct questions to reduce costs by ~60%."
                        .to_string(),
                );
            }
        }

        if (count_of(Channel::Web) as f64) < total_requests as f64 * 0.1 {
            out.push(
                "Web search is underused. Route fresh info queries to web to avoid expensive LLM calls."
                    .to_string(),
            );
        }

        if total_cost > 0.0 {
            let premium_share = premium_cost / total_cost;
            if premium_share > 0.7 && !self.policy.budget_fallbacks.is_empty() {
                out.push(format!(
                    "Premium models account for {:.1}% of costs. Enable automatic fallbacks to save ~40% on routine tasks.",
                    premium_share * 100.0
                ));
            }
        }

        if total_requests > 100 {
            let avg = total_cost / total_requests as f64;
            if avg > 0.05 {
                out.push(format!(
                    "Average cost per request (${avg:.3}) is high. Consider more specific prompts and better routing."
                ));
            }
        }

        if day_of_month > 20 && total_cost > self.policy.monthly_limit_usd * 0.8 {
            out.push(
                "High usage in late month detected. Consider batching non-urgent requests for next month."
                    .to_string(),
            );
        }

        out
    }

    /// Rewrite `route`/`model` according to the policy's enforcement mode.
    pub fn enforce(&self, status: &BudgetStatus, route: Channel, model: &str) -> EnforcementDecision {
        let mut decision = EnforcementDecision {
            route,
            model: model.to_string(),
            info: EnforcementInfo {
                enforced: false,
                original_route: route,
                original_model: model.to_string(),
                reason: None,
                savings_estimated: None,
            },
        };

        if self.policy.mode == EnforcementMode::Observe {
            return decision;
        }

        let triggered = status.percentage_used > CRITICAL_PERCENT
            || status.projected_spend > status.budget_limit * PROJECTED_ENFORCE_FACTOR;
        if !triggered {
            return decision;
        }

        match self.policy.mode {
            EnforcementMode::Observe => {}
            EnforcementMode::Soft => {
                if let Some(fallback) = self.policy.budget_fallbacks.get(model) {
                    decision.info.reason =
                        Some(format!("Budget enforcement: downgraded {model} → {fallback}"));
                    decision.info.savings_estimated = Some("~40%".into());
                    decision.info.enforced = true;
                    decision.model = fallback.clone();
                }
                if route == Channel::Agent && status.percentage_used > AGENT_DOWNGRADE_PERCENT {
                    decision.route = Channel::Ask;
                    decision.info.reason = Some(
                        "Budget critical: routing to 'ask' for clarification instead of agent mode"
                            .into(),
                    );
                    decision.info.savings_estimated = Some("~70%".into());
                    decision.info.enforced = true;
                }
            }
            EnforcementMode::Hard => {
                if status.percentage_used >= EXCEEDED_PERCENT
                    && (route == Channel::Agent || self.policy.is_premium(model))
                {
                    decision.route = Channel::Ask;
                    decision.model = self.cheapest_fallback();
                    decision.info.reason =
                        Some("Hard budget limit reached: forcing cost-effective alternatives".into());
                    decision.info.savings_estimated = Some("~80%".into());
                    decision.info.enforced = true;
                }
            }
        }

        if decision.info.enforced {
            info!(
                org = %status.org,
                mode = ?self.policy.mode,
                from_route = %route,
                to_route = %decision.route,
                from_model = model,
                to_model = %decision.model,
                "budget enforcement applied"
            );
        }
        decision
    }

    /// Model used by hard enforcement.
    ///
    /// An explicit `hard_fallback_model` wins. Otherwise the priced fallback
    /// target with the lowest blended rate, ties going to the earliest table
    /// key. Targets missing from the rate table are skipped; when none is
    /// priced the result is [`DEFAULT_HARD_FALLBACK`].
    pub fn cheapest_fallback(&self) -> String {
        if let Some(model) = &self.policy.hard_fallback_model {
            return model.clone();
        }
        let cheapest = self
            .policy
            .budget_fallbacks
            .values()
            .filter_map(|candidate| {
                self.rates
                    .priced(candidate)
                    .map(|rate| (candidate, rate.blended()))
            })
            .fold(None::<(&String, f64)>, |best, (candidate, rate)| match best {
                Some((_, best_rate)) if best_rate <= rate => best,
                _ => Some((candidate, rate)),
            });
        cheapest.map_or_else(|| DEFAULT_HARD_FALLBACK.to_string(), |(m, _)| m.clone())
    }
}
