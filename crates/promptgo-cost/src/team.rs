// SPDX-FileCopyrightText: 2026 PromptGo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Team metrics and weekly routing-rule recommendations.
//!
//! Both are computed from a window of usage records the caller has already
//! loaded, in the same way as [`crate::summarize`].

use std::collections::BTreeMap;

use promptgo_core::{Channel, GroupBy, UsageRecord};
use serde::Serialize;

use crate::aggregator::summarize;
use crate::round_to;

/// Share of the unoptimized cost that routed traffic is assumed to pay.
pub const OPTIMIZED_COST_SHARE: f64 = 0.75;

/// Users listed in [`TeamMetrics::top_users`].
pub const TOP_USERS: usize = 5;

const SIMPLE_QA_RATIO: f64 = 0.3;
const FRESHNESS_HITS: u64 = 50;
const AGENT_OVERUSE_RATIO: f64 = 0.2;

const RULES_SUMMARY: &str = "Use smaller models for short Q&A, prefer web for freshness, and require action verbs for agents.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopUser {
    pub user: String,
    pub requests: u64,
    pub cost: f64,
}

/// Headline numbers for one team over a trailing window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamMetrics {
    pub org: String,
    pub period_days: u32,
    pub total_requests: u64,
    pub total_cost: f64,
    /// What the same traffic would have cost unrouted, minus what it did cost.
    pub estimated_savings: f64,
    /// Request count per channel that saw traffic.
    pub route_distribution: BTreeMap<String, u64>,
    pub top_users: Vec<TopUser>,
}

/// Build [`TeamMetrics`] from the records in the window.
///
/// Top users are ranked by cost, highest first; equal costs keep the order
/// in which the users first appear.
pub fn team_metrics(org: &str, period_days: u32, records: &[UsageRecord]) -> TeamMetrics {
    let total_cost: f64 = records.iter().map(|r| r.cost_usd).sum();

    let mut route_distribution = BTreeMap::new();
    for r in records {
        *route_distribution.entry(r.channel.to_string()).or_insert(0u64) += 1;
    }

    let mut users = summarize(records, GroupBy::User);
    users.sort_by(|a, b| b.cost_usd.total_cmp(&a.cost_usd));
    let top_users = users
        .into_iter()
        .take(TOP_USERS)
        .map(|u| TopUser {
            user: u.key,
            requests: u.requests,
            cost: u.cost_usd,
        })
        .collect();

    TeamMetrics {
        org: org.to_string(),
        period_days,
        total_requests: records.len() as u64,
        total_cost: round_to(total_cost, 2),
        estimated_savings: round_to(total_cost / OPTIMIZED_COST_SHARE - total_cost, 2),
        route_distribution,
        top_users,
    }
}

/// Channel mix that drives rule recommendations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RuleStats {
    /// Fraction of requests answered directly.
    pub simple_qa_ratio: f64,
    /// Requests routed to web search.
    pub freshness_hits: u64,
    /// Fraction of requests sent to agent mode.
    pub agent_overuse: f64,
}

impl RuleStats {
    pub fn from_records(records: &[UsageRecord]) -> Self {
        if records.is_empty() {
            return Self::default();
        }
        let count = |c: Channel| records.iter().filter(|r| r.channel == c).count();
        let total = records.len() as f64;
        Self {
            simple_qa_ratio: count(Channel::Direct) as f64 / total,
            freshness_hits: count(Channel::Web) as u64,
            agent_overuse: count(Channel::Agent) as f64 / total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleRecommendation {
    pub rule: String,
    pub action: String,
}

/// Editor rules worth adopting this week.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyRules {
    pub summary: String,
    pub stats: RuleStats,
    pub rules: Vec<RuleRecommendation>,
}

fn rule(rule: &str, action: &str) -> RuleRecommendation {
    RuleRecommendation {
        rule: rule.to_string(),
        action: action.to_string(),
    }
}

/// Recommend routing rules from a week's channel mix.
pub fn weekly_rules(stats: RuleStats) -> WeeklyRules {
    let mut rules = Vec::new();
    if stats.simple_qa_ratio > SIMPLE_QA_RATIO {
        rules.push(rule(
            "downshift_simple_qa",
            "use gpt-3.5 or local tiny-llama for short single-question prompts",
        ));
    }
    if stats.freshness_hits > FRESHNESS_HITS {
        rules.push(rule(
            "prefer_web_for_freshness",
            "route 'latest/pricing/update/version' prompts to web first",
        ));
    }
    if stats.agent_overuse > AGENT_OVERUSE_RATIO {
        rules.push(rule(
            "agent_threshold",
            "require 'plan/implement/deploy' verbs before agent route",
        ));
    }
    WeeklyRules {
        summary: RULES_SUMMARY.to_string(),
        stats,
        rules,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptgo_test_utils::RecordBuilder;

    fn rec(channel: Channel, user: &str, cost: f64) -> UsageRecord {
        RecordBuilder::new("acme").channel(channel).user(user).cost(cost).build()
    }

    #[test]
    fn metrics_for_empty_window_are_zero() {
        let m = team_metrics("acme", 7, &[]);
        assert_eq!(m.total_requests, 0);
        assert_eq!(m.total_cost, 0.0);
        assert_eq!(m.estimated_savings, 0.0);
        assert!(m.route_distribution.is_empty());
        assert!(m.top_users.is_empty());
    }

    #[test]
    fn metrics_count_routes_and_estimate_savings() {
        let records = vec![
            rec(Channel::Web, "ana", 1.0),
            rec(Channel::Web, "bo", 0.5),
            rec(Channel::Agent, "ana", 1.5),
        ];
        let m = team_metrics("acme", 7, &records);
        assert_eq!(m.total_requests, 3);
        assert_eq!(m.total_cost, 3.0);
        // 3.0 / 0.75 - 3.0
        assert_eq!(m.estimated_savings, 1.0);
        assert_eq!(m.route_distribution.get("web"), Some(&2));
        assert_eq!(m.route_distribution.get("agent"), Some(&1));
        assert!(!m.route_distribution.contains_key("ask"));
        assert_eq!(m.top_users[0].user, "ana");
        assert_eq!(m.top_users[0].requests, 2);
        assert_eq!(m.top_users[0].cost, 2.5);
    }

    #[test]
    fn top_users_are_capped_and_ranked_by_cost() {
        let records: Vec<_> = (0..7)
            .map(|i| rec(Channel::Direct, &format!("u{i}"), f64::from(i)))
            .collect();
        let m = team_metrics("acme", 30, &records);
        assert_eq!(m.top_users.len(), TOP_USERS);
        let names: Vec<_> = m.top_users.iter().map(|u| u.user.as_str()).collect();
        assert_eq!(names, vec!["u6", "u5", "u4", "u3", "u2"]);
    }

    #[test]
    fn rule_stats_from_channel_mix() {
        let records = vec![
            rec(Channel::Direct, "a", 0.0),
            rec(Channel::Direct, "a", 0.0),
            rec(Channel::Agent, "a", 0.0),
            rec(Channel::Web, "a", 0.0),
        ];
        let s = RuleStats::from_records(&records);
        assert_eq!(s.simple_qa_ratio, 0.5);
        assert_eq!(s.agent_overuse, 0.25);
        assert_eq!(s.freshness_hits, 1);
        assert_eq!(RuleStats::from_records(&[]), RuleStats::default());
    }

    #[test]
    fn every_threshold_fires_its_rule() {
        let w = weekly_rules(RuleStats {
            simple_qa_ratio: 0.35,
            freshness_hits: 72,
            agent_overuse: 0.24,
        });
        let names: Vec<_> = w.rules.iter().map(|r| r.rule.as_str()).collect();
        assert_eq!(
            names,
            vec!["downshift_simple_qa", "prefer_web_for_freshness", "agent_threshold"]
        );
        assert!(w.summary.starts_with("Use smaller models"));
    }

    #[test]
    fn thresholds_are_strict() {
        let w = weekly_rules(RuleStats {
            simple_qa_ratio: 0.3,
            freshness_hits: 50,
            agent_overuse: 0.2,
        });
        assert!(w.rules.is_empty());
    }
}
