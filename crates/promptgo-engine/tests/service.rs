// SPDX-FileCopyrightText: 2026 PromptGo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the PromptGo service over in-memory and SQLite stores.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use promptgo_config::PromptGoConfig;
use promptgo_core::{Channel, Context, GroupBy, Outcome, PromptGoError, UsageStore};
use promptgo_engine::{LogRequest, PromptGo};
use promptgo_router::ScoringStrategy;
use promptgo_test_utils::{MemoryPatternStore, MemoryUsageStore, RecordBuilder};
use tempfile::TempDir;

struct Harness {
    _policy_dir: TempDir,
    usage: Arc<MemoryUsageStore>,
    patterns: Arc<MemoryPatternStore>,
    service: PromptGo,
}

fn harness_with(policy_files: &[(&str, &str)], usage: MemoryUsageStore) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    for (name, body) in policy_files {
        std::fs::write(dir.path().join(name), body).unwrap();
    }
    let mut config = PromptGoConfig::default();
    config.service.org = "acme".into();
    config.policy.policy_dir = dir.path().display().to_string();

    let usage = Arc::new(usage);
    let patterns = Arc::new(MemoryPatternStore::new());
    let service = PromptGo::new(config, usage.clone(), patterns.clone());
    Harness {
        _policy_dir: dir,
        usage,
        patterns,
        service,
    }
}

fn harness() -> Harness {
    harness_with(&[], MemoryUsageStore::new())
}

#[tokio::test]
async fn static_suggestion_routes_fresh_prompt_to_web() {
    let h = harness();
    let resp = h
        .service
        .suggest_route(
            "What's the latest macOS policy update in 2025?",
            &Context::default(),
            ScoringStrategy::Static,
        )
        .await;

    assert_eq!(resp.top_channel, Channel::Web);
    assert_eq!(resp.ranking.len(), 4);
    assert_eq!(resp.ranking[0].channel, Channel::Web);
    assert_eq!(resp.reasons[0], "Fresh/volatile info → web");
    assert!(resp.suggestions.web.ends_with("site:docs official after:2024-01-01"));
    assert!(!resp.learning_applied);
}

#[tokio::test]
async fn team_weights_steer_static_suggestions() {
    let h = harness_with(&[("tilted.toml", "[weights]\nask = 3.0\n")], MemoryUsageStore::new());
    let ctx = Context {
        org: Some("tilted".into()),
        ..Context::default()
    };
    let resp = h
        .service
        .suggest_route("hello there", &ctx, ScoringStrategy::Static)
        .await;
    assert_eq!(resp.top_channel, Channel::Ask);
}

#[tokio::test]
async fn team_freshness_domains_shape_web_query() {
    let h = harness_with(
        &[("docs_team.toml", "freshness_domains = [\"docs.rs\"]\n")],
        MemoryUsageStore::new(),
    );
    let ctx = Context {
        org: Some("docs_team".into()),
        ..Context::default()
    };
    let resp = h
        .service
        .suggest_route("latest serde release?", &ctx, ScoringStrategy::Adaptive)
        .await;
    assert_eq!(resp.suggestions.web, "latest serde release (site:docs.rs) after:2024-01-01");
}

#[tokio::test]
async fn log_request_prices_and_hashes() {
    let h = harness();
    let mut req = LogRequest::new("secret prompt text", Channel::Direct, "openai/gpt-3.5-turbo");
    req.tokens_in = 1000;
    req.tokens_out = 500;
    req.latency_ms = 120;
    let receipt = h.service.log_request(req).await.unwrap();
    assert!((receipt.cost_usd - 1.25).abs() < 1e-12);

    let stored = h.usage.all();
    assert_eq!(stored.len(), 1);
    let r = &stored[0];
    assert_eq!(r.id, receipt.id);
    assert_eq!(r.org, "acme");
    assert_eq!(r.user, "unknown");
    assert_eq!(r.feature, "default");
    assert_eq!(r.source_app, "cursor");
    assert_eq!(r.prompt_hash, promptgo_core::prompt_hash("secret prompt text"));
    assert_ne!(r.prompt_hash, "secret prompt text");
}

#[tokio::test]
async fn log_request_surfaces_storage_failure() {
    let h = harness();
    h.usage.fail_inserts(true);
    let err = h
        .service
        .log_request(LogRequest::new("p", Channel::Web, "local/tiny-llama"))
        .await
        .unwrap_err();
    assert!(matches!(err, PromptGoError::Storage { .. }));
}

#[tokio::test]
async fn usage_summary_groups_window() {
    let now = Utc::now();
    let usage = MemoryUsageStore::with_records(vec![
        RecordBuilder::new("acme").model("m1").cost(1.0).at(now - Duration::hours(2)).build(),
        RecordBuilder::new("acme").model("m2").cost(2.0).at(now - Duration::hours(1)).build(),
        RecordBuilder::new("acme").model("m1").cost(3.0).at(now - Duration::days(10)).build(),
    ]);
    let h = harness_with(&[], usage);

    let rollups = h
        .service
        .usage_summary("acme", now - Duration::days(1), now, GroupBy::Model)
        .await
        .unwrap();
    assert_eq!(rollups.len(), 2);
    assert_eq!(rollups[0].key, "m1");
    assert_eq!(rollups[0].cost_usd, 1.0);

    let err = h
        .service
        .usage_summary("acme", now, now - Duration::days(1), GroupBy::User)
        .await
        .unwrap_err();
    assert!(matches!(err, PromptGoError::InvalidInput(_)));
}

#[tokio::test]
async fn hard_policy_blocks_agent_once_budget_is_spent() {
    let now = Utc.with_ymd_and_hms(2025, 5, 20, 12, 0, 0).unwrap();
    let usage = MemoryUsageStore::with_records(vec![
        RecordBuilder::new("acme")
            .channel(Channel::Agent)
            .model("gpt-4")
            .cost(120.0)
            .at(now - Duration::days(3))
            .build(),
    ]);
    let h = harness_with(
        &[(
            "acme.toml",
            "[budget]\nmonthly_limit_usd = 100.0\nmode = \"hard\"\nhard_fallback_model = \"local/tiny-llama\"\n",
        )],
        usage,
    );

    let status = h.service.budget_status_at("acme", now).await.unwrap();
    assert!(status.percentage_used >= 100.0);
    assert_eq!(status.budget_limit, 100.0);

    let decision = h
        .service
        .enforce_budget_at("acme", Channel::Agent, "gpt-4", now)
        .await
        .unwrap();
    assert!(decision.info.enforced);
    assert_eq!(decision.route, Channel::Ask);
    assert_eq!(decision.model, "local/tiny-llama");
}

#[tokio::test]
async fn fresh_org_budget_is_empty() {
    let h = harness();
    let status = h.service.budget_status("nobody").await.unwrap();
    assert_eq!(status.current_spend, 0.0);
    assert_eq!(status.budget_limit, 500.0);
    assert_eq!(status.suggestions.len(), 1);
}

#[tokio::test]
async fn feedback_boosts_adaptive_suggestions() {
    let h = harness();
    for _ in 0..3 {
        let logged = h
            .service
            .record_feedback("acme", "hello", Channel::Direct, Channel::Direct, Outcome::Good, None)
            .await
            .unwrap();
        assert!(logged);
    }

    let resp = h
        .service
        .suggest_route("hello there", &Context::default(), ScoringStrategy::Adaptive)
        .await;
    assert!(resp.learning_applied);
    assert_eq!(resp.top_channel, Channel::Direct);
    assert!(h.patterns.raw("acme").is_some());
}

#[tokio::test]
async fn learning_reweights_and_reports_stats() {
    let now = Utc::now();
    let mut records = Vec::new();
    for _ in 0..12 {
        records.push(
            RecordBuilder::new("acme")
                .channel(Channel::Web)
                .user("ana")
                .cost(0.01)
                .at(now - Duration::hours(3))
                .build(),
        );
    }
    records.push(
        RecordBuilder::new("acme")
            .channel(Channel::Agent)
            .user("ana")
            .cost(2.0)
            .at(now - Duration::hours(3))
            .build(),
    );
    let h = harness_with(&[], MemoryUsageStore::with_records(records));

    assert!(h.service.learn_at("acme", Some(7), now).await.unwrap());
    let stats = h.service.learning_stats("acme").await;
    assert!(stats.route_weights.web > stats.route_weights.agent);
    assert_eq!(stats.users_with_preferences, 1);

    // An empty window leaves the learned state alone.
    assert!(!h.service.learn_at("acme", Some(1), now - Duration::days(30)).await.unwrap());
    assert_eq!(h.service.learning_stats("acme").await.route_weights, stats.route_weights);

    assert_eq!(h.service.learn_all().await, 1);
    let insights = h.service.team_insights().await;
    assert_eq!(insights.total_teams, 1);
    assert!(insights.team_stats.contains_key("acme"));

    let err = h.service.learn("acme", Some(0)).await.unwrap_err();
    assert!(matches!(err, PromptGoError::InvalidInput(_)));
}

#[tokio::test]
async fn optimization_report_finds_premium_savings() {
    let now = Utc.with_ymd_and_hms(2025, 5, 10, 12, 0, 0).unwrap();
    let usage = MemoryUsageStore::with_records(vec![
        RecordBuilder::new("acme")
            .channel(Channel::Direct)
            .model("claude-3-opus")
            .cost(50.0)
            .at(now - Duration::days(1))
            .build(),
    ]);
    let h = harness_with(&[], usage);
    let report = h.service.optimization_report_at("acme", now).await.unwrap();
    assert_eq!(report.savings_opportunities.opportunities.len(), 1);
    assert_eq!(report.savings_opportunities.total_potential_savings, 30.0);
    assert_eq!(report.savings_opportunities.optimization_percentage, 60.0);
    assert!(report.recommendations.immediate.is_empty());
    assert_eq!(report.budget_status.current_spend, 50.0);
}

#[tokio::test]
async fn team_metrics_cover_trailing_window() {
    let now = Utc.with_ymd_and_hms(2025, 5, 10, 12, 0, 0).unwrap();
    let usage = MemoryUsageStore::with_records(vec![
        RecordBuilder::new("acme").channel(Channel::Web).user("ana").cost(1.5).at(now - Duration::days(1)).build(),
        RecordBuilder::new("acme").channel(Channel::Agent).user("bo").cost(1.5).at(now - Duration::days(2)).build(),
        RecordBuilder::new("acme").channel(Channel::Agent).user("bo").cost(9.0).at(now - Duration::days(20)).build(),
    ]);
    let h = harness_with(&[], usage);

    let weekly = h.service.team_metrics_at("acme", None, now).await.unwrap();
    assert_eq!(weekly.period_days, 7);
    assert_eq!(weekly.total_requests, 2);
    assert_eq!(weekly.total_cost, 3.0);
    assert_eq!(weekly.estimated_savings, 1.0);
    assert_eq!(weekly.route_distribution.get("agent"), Some(&1));

    let monthly = h.service.team_metrics_at("acme", Some(30), now).await.unwrap();
    assert_eq!(monthly.total_requests, 3);
    assert_eq!(monthly.top_users[0].user, "bo");

    let err = h.service.team_metrics_at("acme", Some(0), now).await.unwrap_err();
    assert!(matches!(err, PromptGoError::InvalidInput(_)));
}

#[tokio::test]
async fn weekly_rules_follow_channel_mix() {
    let now = Utc.with_ymd_and_hms(2025, 5, 10, 12, 0, 0).unwrap();
    let mut records = Vec::new();
    for _ in 0..3 {
        records.push(RecordBuilder::new("acme").channel(Channel::Agent).at(now - Duration::days(1)).build());
    }
    records.push(RecordBuilder::new("acme").channel(Channel::Direct).at(now - Duration::days(1)).build());
    // Outside the week.
    for _ in 0..10 {
        records.push(RecordBuilder::new("acme").channel(Channel::Direct).at(now - Duration::days(9)).build());
    }
    let h = harness_with(&[], MemoryUsageStore::with_records(records));

    let rules = h.service.weekly_rules_at("acme", now).await.unwrap();
    assert_eq!(rules.stats.agent_overuse, 0.75);
    let names: Vec<_> = rules.rules.iter().map(|r| r.rule.as_str()).collect();
    assert_eq!(names, vec!["agent_threshold"]);

    let empty = h.service.weekly_rules_at("nobody", now).await.unwrap();
    assert!(empty.rules.is_empty());
}

#[tokio::test]
async fn estimates_candidates_with_configured_rates() {
    let h = harness();
    let models = vec!["openai/gpt-4o-mini".to_string(), "unknown/model".to_string()];
    let out = h.service.estimate_costs(&"a".repeat(4000), &models);
    assert_eq!(out[0].tokens_in, 1000);
    assert!((out[0].cost_usd - (0.15 + 0.5 * 0.60)).abs() < 1e-12);
    assert_eq!(out[1].cost_usd, 0.0);
}

#[tokio::test]
async fn sqlite_backed_service_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = PromptGoConfig::default();
    config.storage.database_path = dir.path().join("promptgo.db").display().to_string();
    config.policy.policy_dir = dir.path().display().to_string();
    config.service.org = "acme".into();

    let service = PromptGo::open(config.clone()).await.unwrap();
    let mut req = LogRequest::new("deploy the service", Channel::Agent, "openai/gpt-4o");
    req.tokens_in = 2000;
    req.tokens_out = 1000;
    service.log_request(req).await.unwrap();
    service
        .record_feedback("acme", "deploy", Channel::Agent, Channel::Agent, Outcome::Good, None)
        .await
        .unwrap();
    drop(service);

    let reopened = PromptGo::open(config).await.unwrap();
    let now = Utc::now() + Duration::seconds(1);
    let rollups = reopened
        .usage_summary("acme", now - Duration::days(1), now, GroupBy::User)
        .await
        .unwrap();
    assert_eq!(rollups.len(), 1);
    assert_eq!(rollups[0].cost_usd, 15.0);
    assert_eq!(reopened.learning_stats("acme").await.patterns_learned, 1);
}

#[tokio::test]
async fn memory_store_is_usable_as_trait_object() {
    let store: Arc<dyn UsageStore> = Arc::new(MemoryUsageStore::new());
    let got = store
        .query_between("acme", Utc::now() - Duration::days(1), Utc::now())
        .await
        .unwrap();
    assert!(got.is_empty());
}
