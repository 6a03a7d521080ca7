// SPDX-FileCopyrightText: 2026 PromptGo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The [`PromptGo`] service object.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use promptgo_config::{load_team_policy, PromptGoConfig, TeamPolicy};
use promptgo_core::{
    prompt_hash, Channel, Context, GroupBy, Outcome, PatternStore, PromptGoError, UsageRecord,
    UsageStore,
};
use promptgo_cost::budget::month_start;
use promptgo_cost::{
    estimate, estimate_candidates, load_rates, optimization_report, round_to, summarize,
    team_metrics, weekly_rules, BudgetManager, BudgetStatus, CandidateEstimate,
    EnforcementDecision, OptimizationReport, RateTable, Rollup, RuleStats, TeamMetrics,
    WeeklyRules,
};
use promptgo_router::{
    explain, score, suggestion_pack_for, LearningRegistry, LearningStats, ScoringStrategy,
    TeamInsights,
};
use promptgo_storage::SqliteStore;
use tracing::{debug, info, warn};

use crate::requests::{LogReceipt, LogRequest, RankedChannel, SuggestResponse};

/// Default window for [`PromptGo::team_metrics`].
pub const DEFAULT_METRICS_DAYS: u32 = 7;

const RULES_WINDOW_DAYS: i64 = 7;

/// Shared PromptGo service.
pub struct PromptGo {
    config: PromptGoConfig,
    usage: Arc<dyn UsageStore>,
    registry: LearningRegistry,
    rates: RateTable,
}

impl PromptGo {
    /// Build a service over explicit stores, loading the configured rate table.
    pub fn new(
        config: PromptGoConfig,
        usage: Arc<dyn UsageStore>,
        patterns: Arc<dyn PatternStore>,
    ) -> Self {
        let rates = load_rates(config.cost.rates_path.as_deref().map(Path::new));
        Self::with_rates(config, usage, patterns, rates)
    }

    /// Build a service with an explicit rate table.
    pub fn with_rates(
        config: PromptGoConfig,
        usage: Arc<dyn UsageStore>,
        patterns: Arc<dyn PatternStore>,
        rates: RateTable,
    ) -> Self {
        Self {
            config,
            usage,
            registry: LearningRegistry::new(patterns),
            rates,
        }
    }

    /// Open the configured SQLite database and build a service over it.
    pub async fn open(config: PromptGoConfig) -> Result<Self, PromptGoError> {
        let store = Arc::new(
            SqliteStore::open(&config.storage.database_path, config.storage.wal_mode).await?,
        );
        Ok(Self::new(config, store.clone(), store))
    }

    pub fn config(&self) -> &PromptGoConfig {
        &self.config
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    /// Strategy selected by `routing.learning_enabled`.
    pub fn default_strategy(&self) -> ScoringStrategy {
        ScoringStrategy::from_learning_enabled(self.config.routing.learning_enabled)
    }

    /// Effective policy for `org`.
    pub fn team_policy(&self, org: &str) -> TeamPolicy {
        load_team_policy(&self.config.policy, &self.config.routing.weights, org)
    }

    fn org_or_default<'a>(&'a self, org: Option<&'a str>) -> &'a str {
        org.filter(|o| !o.is_empty())
            .unwrap_or(&self.config.service.org)
    }

    /// Score `prompt` and decorate the winner with reasons and follow-ups.
    pub async fn suggest_route(
        &self,
        prompt: &str,
        context: &Context,
        strategy: ScoringStrategy,
    ) -> SuggestResponse {
        let org = self.org_or_default(context.org.as_deref());
        let policy = self.team_policy(org);

        let (scores, learning_applied) = match strategy {
            ScoringStrategy::Static => (score(prompt, &policy.weights), false),
            ScoringStrategy::Adaptive => {
                let s = self.registry.suggest(org, prompt, context.user.as_deref()).await;
                (s.scores, s.learning_applied)
            }
        };

        let ranking: Vec<RankedChannel> = scores
            .ranked()
            .into_iter()
            .map(|(channel, s)| RankedChannel {
                channel,
                score: round_to(s, 4),
            })
            .collect();
        let top_channel = scores.top().0;

        debug!(org, %top_channel, ?strategy, "route suggested");

        SuggestResponse {
            top_channel,
            ranking,
            reasons: explain(prompt).into_iter().map(str::to_string).collect(),
            suggestions: suggestion_pack_for(prompt, &policy.freshness_domains),
            learning_applied,
        }
    }

    /// Price and persist one served request.
    pub async fn log_request(&self, request: LogRequest) -> Result<LogReceipt, PromptGoError> {
        let org = self.org_or_default(request.org.as_deref()).to_string();
        let cost = estimate(request.tokens_in, request.tokens_out, &request.model, &self.rates);

        let mut record = UsageRecord::new(org, request.route, request.model);
        record.prompt_hash = prompt_hash(&request.prompt);
        record.tokens_in = request.tokens_in;
        record.tokens_out = request.tokens_out;
        record.cost_usd = cost;
        record.latency_ms = request.latency_ms;
        if let Some(user) = request.user.filter(|u| !u.is_empty()) {
            record.user = user;
        }
        if let Some(feature) = request.feature.filter(|f| !f.is_empty()) {
            record.feature = feature;
        }
        if let Some(source) = request.source_app.filter(|s| !s.is_empty()) {
            record.source_app = source;
        }

        self.usage.insert(&record).await?;
        info!(
            org = %record.org,
            route = %record.channel,
            model = %record.model,
            tokens_in = record.tokens_in,
            tokens_out = record.tokens_out,
            cost_usd = cost,
            "request logged"
        );
        Ok(LogReceipt {
            id: record.id,
            cost_usd: cost,
        })
    }

    /// Rollups of `org`'s usage in `[since, until)`.
    pub async fn usage_summary(
        &self,
        org: &str,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
        group_by: GroupBy,
    ) -> Result<Vec<Rollup>, PromptGoError> {
        if since > until {
            return Err(PromptGoError::InvalidInput(format!(
                "summary window starts after it ends ({since} > {until})"
            )));
        }
        let records = self.usage.query_between(org, since, until).await?;
        Ok(summarize(&records, group_by))
    }

    async fn month_to_date(&self, org: &str, now: DateTime<Utc>) -> Result<Vec<UsageRecord>, PromptGoError> {
        self.usage.query_between(org, month_start(now), now).await
    }

    /// Month-to-date budget status (unrounded).
    pub async fn budget_status(&self, org: &str) -> Result<BudgetStatus, PromptGoError> {
        self.budget_status_at(org, Utc::now()).await
    }

    /// Budget status as of `now`.
    pub async fn budget_status_at(
        &self,
        org: &str,
        now: DateTime<Utc>,
    ) -> Result<BudgetStatus, PromptGoError> {
        let policy = self.team_policy(org);
        let records = self.month_to_date(org, now).await?;
        Ok(BudgetManager::new(&policy.budget, &self.rates).status(org, &records, now))
    }

    /// Apply `org`'s enforcement mode to a planned route and model.
    pub async fn enforce_budget(
        &self,
        org: &str,
        route: Channel,
        model: &str,
    ) -> Result<EnforcementDecision, PromptGoError> {
        self.enforce_budget_at(org, route, model, Utc::now()).await
    }

    /// Enforcement as of `now`.
    pub async fn enforce_budget_at(
        &self,
        org: &str,
        route: Channel,
        model: &str,
        now: DateTime<Utc>,
    ) -> Result<EnforcementDecision, PromptGoError> {
        let policy = self.team_policy(org);
        let records = self.month_to_date(org, now).await?;
        let manager = BudgetManager::new(&policy.budget, &self.rates);
        let status = manager.status(org, &records, now);
        Ok(manager.enforce(&status, route, model))
    }

    /// Record how a suggestion worked out. Returns whether it was logged.
    pub async fn record_feedback(
        &self,
        org: &str,
        prompt: &str,
        suggested: Channel,
        actual: Channel,
        outcome: Outcome,
        user: Option<String>,
    ) -> Result<bool, PromptGoError> {
        self.registry
            .record_feedback(org, prompt_hash(prompt), suggested, actual, outcome, user)
            .await
    }

    /// Retrain `org` from the trailing `days_back` days (default
    /// `routing.learning_window_days`). Returns `false` for an empty window.
    pub async fn learn(&self, org: &str, days_back: Option<u32>) -> Result<bool, PromptGoError> {
        self.learn_at(org, days_back, Utc::now()).await
    }

    /// Learning as of `now`.
    pub async fn learn_at(
        &self,
        org: &str,
        days_back: Option<u32>,
        now: DateTime<Utc>,
    ) -> Result<bool, PromptGoError> {
        let days = days_back.unwrap_or(self.config.routing.learning_window_days);
        if days == 0 {
            return Err(PromptGoError::InvalidInput("learning window must be at least one day".into()));
        }
        let records = self
            .usage
            .query_between(org, now - Duration::days(i64::from(days)), now)
            .await?;
        self.registry.learn(org, &records).await
    }

    /// Retrain every org with a loaded router. Failures are logged and
    /// skipped; returns how many orgs were updated.
    pub async fn learn_all(&self) -> usize {
        let mut updated = 0;
        for org in self.registry.loaded_orgs() {
            match self.learn(&org, None).await {
                Ok(true) => updated += 1,
                Ok(false) => {}
                Err(e) => warn!(org = %org, error = %e, "learning update failed"),
            }
        }
        info!(updated, "learning cycle complete");
        updated
    }

    pub async fn learning_stats(&self, org: &str) -> LearningStats {
        self.registry.stats(org).await
    }

    pub async fn team_insights(&self) -> TeamInsights {
        self.registry.insights().await
    }

    /// Savings opportunities and recommendations for the current month.
    pub async fn optimization_report(&self, org: &str) -> Result<OptimizationReport, PromptGoError> {
        self.optimization_report_at(org, Utc::now()).await
    }

    /// Optimization report as of `now`.
    pub async fn optimization_report_at(
        &self,
        org: &str,
        now: DateTime<Utc>,
    ) -> Result<OptimizationReport, PromptGoError> {
        let policy = self.team_policy(org);
        let records = self.month_to_date(org, now).await?;
        let status = BudgetManager::new(&policy.budget, &self.rates).status(org, &records, now);
        Ok(optimization_report(status, &records, &policy.budget, now))
    }

    /// Request, cost, and user totals for `org` over the trailing `days`
    /// (default [`DEFAULT_METRICS_DAYS`]).
    pub async fn team_metrics(&self, org: &str, days: Option<u32>) -> Result<TeamMetrics, PromptGoError> {
        self.team_metrics_at(org, days, Utc::now()).await
    }

    /// Team metrics as of `now`.
    pub async fn team_metrics_at(
        &self,
        org: &str,
        days: Option<u32>,
        now: DateTime<Utc>,
    ) -> Result<TeamMetrics, PromptGoError> {
        let days = days.unwrap_or(DEFAULT_METRICS_DAYS);
        if days == 0 {
            return Err(PromptGoError::InvalidInput("metrics window must be at least one day".into()));
        }
        let records = self
            .usage
            .query_between(org, now - Duration::days(i64::from(days)), now)
            .await?;
        Ok(team_metrics(org, days, &records))
    }

    /// Rule recommendations from `org`'s last seven days of traffic.
    pub async fn weekly_rules(&self, org: &str) -> Result<WeeklyRules, PromptGoError> {
        self.weekly_rules_at(org, Utc::now()).await
    }

    /// Weekly rules as of `now`.
    pub async fn weekly_rules_at(
        &self,
        org: &str,
        now: DateTime<Utc>,
    ) -> Result<WeeklyRules, PromptGoError> {
        let records = self
            .usage
            .query_between(org, now - Duration::days(RULES_WINDOW_DAYS), now)
            .await?;
        let rules = weekly_rules(RuleStats::from_records(&records));
        debug!(org, rules = rules.rules.len(), "weekly rules computed");
        Ok(rules)
    }

    /// Pre-flight cost estimates for `prompt` on each candidate model.
    pub fn estimate_costs(&self, prompt: &str, models: &[String]) -> Vec<CandidateEstimate> {
        estimate_candidates(prompt, models, &self.rates)
    }
}
