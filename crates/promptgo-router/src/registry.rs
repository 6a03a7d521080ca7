// SPDX-FileCopyrightText: 2026 PromptGo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-organization router registry.
//!
//! Each organization gets one [`AdaptiveRouter`] behind its own async mutex.
//! Routers are loaded lazily from the [`PatternStore`] on first use and the
//! whole read-modify-persist cycle for an org runs under that org's lock, so
//! different orgs never contend.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use promptgo_core::{Channel, FeedbackEvent, Outcome, PatternStore, PromptGoError, UsageRecord};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::adaptive::{AdaptiveRouter, AdaptiveSuggestion, LearningStats, PatternState};

/// Stats for every router currently loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamInsights {
    pub total_teams: usize,
    pub team_stats: BTreeMap<String, LearningStats>,
}

/// Lazily populated map of org → adaptive router.
pub struct LearningRegistry {
    routers: DashMap<String, Arc<Mutex<AdaptiveRouter>>>,
    store: Arc<dyn PatternStore>,
}

impl LearningRegistry {
    pub fn new(store: Arc<dyn PatternStore>) -> Self {
        Self {
            routers: DashMap::new(),
            store,
        }
    }

    /// The router for `org`, loading saved state on first access.
    ///
    /// Corrupt state is replaced by defaults. A failed load is returned as
    /// an error and nothing is cached, so the next call retries.
    pub async fn router(&self, org: &str) -> Result<Arc<Mutex<AdaptiveRouter>>, PromptGoError> {
        if let Some(existing) = self.routers.get(org) {
            return Ok(Arc::clone(existing.value()));
        }

        // Load outside the map guard; a concurrent loader for the same org
        // may race us, in which case the first insert wins.
        let loaded = Arc::new(Mutex::new(self.load(org).await?));
        let entry = self
            .routers
            .entry(org.to_string())
            .or_insert(loaded);
        Ok(Arc::clone(entry.value()))
    }

    /// The cached router, or an uncached default when the store is down.
    async fn router_or_default(&self, org: &str) -> Arc<Mutex<AdaptiveRouter>> {
        match self.router(org).await {
            Ok(router) => router,
            Err(e) => {
                warn!(org, error = %e, "failed to load pattern state, answering from defaults");
                Arc::new(Mutex::new(AdaptiveRouter::new(org)))
            }
        }
    }

    async fn load(&self, org: &str) -> Result<AdaptiveRouter, PromptGoError> {
        let router = match self.store.load_patterns(org).await? {
            Some(json) => match serde_json::from_str::<PatternState>(&json) {
                Ok(state) => {
                    debug!(org, "loaded learned patterns");
                    AdaptiveRouter::with_state(org, state)
                }
                Err(e) => {
                    warn!(org, error = %e, "corrupt pattern state, resetting to defaults");
                    AdaptiveRouter::new(org)
                }
            },
            None => AdaptiveRouter::new(org),
        };
        Ok(router)
    }

    /// Persist `router`, restoring `previous` if the save fails so memory
    /// never runs ahead of the store.
    async fn persist_or_restore(
        &self,
        router: &mut AdaptiveRouter,
        previous: AdaptiveRouter,
    ) -> Result<(), PromptGoError> {
        let saved = match router.snapshot(Utc::now()) {
            Ok(json) => self.store.save_patterns(router.org(), &json).await,
            Err(e) => Err(PromptGoError::storage(e)),
        };
        if saved.is_err() {
            *router = previous;
        }
        saved
    }

    /// Adaptive suggestion for `prompt` within `org`.
    pub async fn suggest(&self, org: &str, prompt: &str, user: Option<&str>) -> AdaptiveSuggestion {
        let router = self.router_or_default(org).await;
        let guard = router.lock().await;
        guard.suggest(prompt, user)
    }

    /// Retrain `org` from a usage window and persist the result.
    ///
    /// Returns `false` (and writes nothing) when the window is empty.
    pub async fn learn(&self, org: &str, records: &[UsageRecord]) -> Result<bool, PromptGoError> {
        let router = self.router(org).await?;
        let mut guard = router.lock().await;
        let previous = guard.clone();
        if !guard.learn_from_usage(records) {
            return Ok(false);
        }
        self.persist_or_restore(&mut guard, previous).await?;
        info!(org, records = records.len(), "route weights updated");
        Ok(true)
    }

    /// Record feedback for `org` and persist the updated logs.
    pub async fn record_feedback(
        &self,
        org: &str,
        prompt_hash: String,
        suggested: Channel,
        actual: Channel,
        outcome: Outcome,
        user: Option<String>,
    ) -> Result<bool, PromptGoError> {
        let event = FeedbackEvent {
            timestamp: Utc::now(),
            prompt_hash,
            suggested_route: suggested,
            actual_route: actual,
            outcome,
            user,
        };

        let router = self.router(org).await?;
        let mut guard = router.lock().await;
        let previous = guard.clone();
        let kept = guard.record_feedback(event);
        self.persist_or_restore(&mut guard, previous).await?;
        debug!(org, %suggested, %actual, %outcome, kept, "feedback recorded");
        Ok(kept)
    }

    /// Learning stats for `org`.
    pub async fn stats(&self, org: &str) -> LearningStats {
        let router = self.router_or_default(org).await;
        let guard = router.lock().await;
        guard.stats()
    }

    /// Orgs with a loaded router, sorted.
    pub fn loaded_orgs(&self) -> Vec<String> {
        let mut orgs: Vec<String> = self.routers.iter().map(|e| e.key().clone()).collect();
        orgs.sort();
        orgs
    }

    /// Stats across every loaded router.
    pub async fn insights(&self) -> TeamInsights {
        // Snapshot the handles first so no map guard is held across an await.
        let routers: Vec<(String, Arc<Mutex<AdaptiveRouter>>)> = self
            .routers
            .iter()
            .map(|e| (e.key().clone(), Arc::clone(e.value())))
            .collect();

        let mut team_stats = BTreeMap::new();
        for (org, router) in routers {
            let stats = router.lock().await.stats();
            team_stats.insert(org, stats);
        }
        TeamInsights {
            total_teams: team_stats.len(),
            team_stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptgo_test_utils::MemoryPatternStore;

    fn registry() -> (Arc<MemoryPatternStore>, LearningRegistry) {
        let store = Arc::new(MemoryPatternStore::new());
        let registry = LearningRegistry::new(store.clone());
        (store, registry)
    }

    fn costed(channel: Channel, cost: f64) -> UsageRecord {
        let mut r = UsageRecord::new("acme", channel, "openai/gpt-4o");
        r.cost_usd = cost;
        r
    }

    #[tokio::test]
    async fn learning_persists_state() {
        let (store, registry) = registry();
        let learned = registry
            .learn("acme", &[costed(Channel::Web, 0.1), costed(Channel::Agent, 1.0)])
            .await
            .unwrap();
        assert!(learned);

        let json = store.raw("acme").expect("state saved");
        let state: PatternState = serde_json::from_str(&json).unwrap();
        assert!((state.route_weights.web - 1.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn empty_learning_window_writes_nothing() {
        let (store, registry) = registry();
        assert!(!registry.learn("acme", &[]).await.unwrap());
        assert!(store.raw("acme").is_none());
    }

    #[tokio::test]
    async fn state_reloads_from_store() {
        let (store, registry) = registry();
        registry
            .record_feedback("acme", "h".into(), Channel::Ask, Channel::Ask, Outcome::Good, None)
            .await
            .unwrap();

        let fresh = LearningRegistry::new(store);
        assert_eq!(fresh.stats("acme").await.patterns_learned, 1);
    }

    #[tokio::test]
    async fn corrupt_state_resets_to_defaults() {
        let (store, registry) = registry();
        store.put_raw("acme", "{not json");
        let stats = registry.stats("acme").await;
        assert_eq!(stats.patterns_learned, 0);
        assert_eq!(stats.route_weights, promptgo_core::RoutingWeights::default());
    }

    #[tokio::test]
    async fn load_failure_falls_back_to_defaults() {
        let (store, registry) = registry();
        store.fail_loads(true);
        let s = registry.suggest("acme", "Implement a parser", None).await;
        assert_eq!(s.top_channel, Channel::Agent);
    }

    #[tokio::test]
    async fn load_failure_does_not_overwrite_saved_state() {
        let (store, registry) = registry();
        for i in 0..3 {
            registry
                .record_feedback("acme", i.to_string(), Channel::Web, Channel::Web, Outcome::Good, None)
                .await
                .unwrap();
        }

        let fresh = LearningRegistry::new(store.clone());
        store.fail_loads(true);
        fresh.suggest("acme", "hello", None).await;
        assert!(fresh.loaded_orgs().is_empty());
        let err = fresh
            .record_feedback("acme", "x".into(), Channel::Web, Channel::Web, Outcome::Good, None)
            .await
            .unwrap_err();
        assert!(matches!(err, PromptGoError::Storage { .. }));
        assert!(fresh.learn("acme", &[costed(Channel::Web, 0.1)]).await.is_err());

        store.fail_loads(false);
        fresh
            .record_feedback("acme", "y".into(), Channel::Web, Channel::Web, Outcome::Good, None)
            .await
            .unwrap();
        let state: PatternState = serde_json::from_str(&store.raw("acme").unwrap()).unwrap();
        assert_eq!(state.successful_patterns.len(), 4);
    }

    #[tokio::test]
    async fn failed_save_rolls_back_in_memory_change() {
        let (store, registry) = registry();
        registry
            .learn("acme", &[costed(Channel::Web, 0.1), costed(Channel::Agent, 1.0)])
            .await
            .unwrap();
        let before = registry.stats("acme").await;

        store.fail_saves(true);
        assert!(registry
            .record_feedback("acme", "h".into(), Channel::Ask, Channel::Ask, Outcome::Good, None)
            .await
            .is_err());
        assert!(registry
            .learn("acme", &[costed(Channel::Agent, 0.1), costed(Channel::Web, 5.0)])
            .await
            .is_err());
        assert_eq!(registry.stats("acme").await, before);
    }

    #[tokio::test]
    async fn save_failure_surfaces_as_storage_error() {
        let (store, registry) = registry();
        store.fail_saves(true);
        let err = registry
            .record_feedback("acme", "h".into(), Channel::Web, Channel::Web, Outcome::Good, None)
            .await
            .unwrap_err();
        assert!(matches!(err, PromptGoError::Storage { .. }));
    }

    #[tokio::test]
    async fn insights_cover_loaded_orgs() {
        let (_store, registry) = registry();
        registry.stats("beta").await;
        registry.stats("acme").await;
        let insights = registry.insights().await;
        assert_eq!(insights.total_teams, 2);
        assert_eq!(registry.loaded_orgs(), vec!["acme", "beta"]);
        assert!(insights.team_stats.contains_key("acme"));
    }

    #[tokio::test]
    async fn concurrent_feedback_for_one_org_is_not_lost() {
        let (_store, registry) = registry();
        let registry = Arc::new(registry);
        let mut handles = Vec::new();
        for i in 0..20 {
            let registry = Arc::clone(&registry);
            handles.push(tokio::spawn(async move {
                registry
                    .record_feedback("acme", i.to_string(), Channel::Web, Channel::Web, Outcome::Good, None)
                    .await
                    .unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(registry.stats("acme").await.patterns_learned, 20);
    }
}
