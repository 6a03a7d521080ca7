// SPDX-FileCopyrightText: 2026 PromptGo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for PromptGo.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::collections::BTreeMap;

use promptgo_core::RoutingWeights;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Top-level PromptGo configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PromptGoConfig {
    /// Service identity and logging.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Channel scoring and adaptive learning settings.
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Cost estimation settings.
    #[serde(default)]
    pub cost: CostConfig,

    /// Team policy lookup and fallback budget.
    #[serde(default)]
    pub policy: PolicyConfig,
}

/// Service identity configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Organization used when a request carries none.
    #[serde(default = "default_org")]
    pub org: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            org: default_org(),
            log_level: default_log_level(),
        }
    }
}

fn default_org() -> String {
    "unknown".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("promptgo").join("promptgo.db"))
        .unwrap_or_else(|| "promptgo.db".into())
        .display()
        .to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// Channel scoring configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    /// Use the adaptive (learned-weight) strategy by default.
    #[serde(default)]
    pub learning_enabled: bool,

    /// Trailing window of usage the learner looks at.
    #[serde(default = "default_learning_window_days")]
    pub learning_window_days: u32,

    /// Static weights used when a team has no policy file.
    #[serde(default)]
    pub weights: RoutingWeights,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            learning_enabled: false,
            learning_window_days: default_learning_window_days(),
            weights: RoutingWeights::default(),
        }
    }
}

fn default_learning_window_days() -> u32 {
    7
}

/// Cost estimation configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CostConfig {
    /// TOML rate table. `None` or a missing file selects the built-in table.
    #[serde(default)]
    pub rates_path: Option<String>,
}

/// Where per-team policy files live, and what applies when one is absent.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyConfig {
    /// Directory holding `<org slug>.toml` policy files.
    #[serde(default = "default_policy_dir")]
    pub policy_dir: String,

    /// Budget applied to teams without their own `[budget]` section.
    #[serde(default)]
    pub default_budget: BudgetPolicy,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            policy_dir: default_policy_dir(),
            default_budget: BudgetPolicy::default(),
        }
    }
}

fn default_policy_dir() -> String {
    "config".to_string()
}

/// Budget enforcement tier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EnforcementMode {
    /// Report only.
    Observe,
    /// Downgrade models, and agent to ask when nearly exhausted.
    #[default]
    Soft,
    /// Force cheap alternatives once the limit is reached.
    Hard,
}

/// Monthly budget configuration for one team.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BudgetPolicy {
    /// Monthly spending limit in USD.
    #[serde(default = "default_monthly_limit")]
    pub monthly_limit_usd: f64,

    /// Fraction of the limit at which the warning alert fires.
    #[serde(default = "default_alert_threshold")]
    pub alert_threshold: f64,

    /// Enforcement tier.
    #[serde(default)]
    pub mode: EnforcementMode,

    /// Model downgrade table used by soft enforcement.
    #[serde(default = "default_budget_fallbacks")]
    pub budget_fallbacks: BTreeMap<String, String>,

    /// Models treated as premium for suggestions and hard enforcement.
    #[serde(default = "default_premium_models")]
    pub premium_models: Vec<String>,

    /// Model forced by hard enforcement. `None` picks the cheapest fallback.
    #[serde(default)]
    pub hard_fallback_model: Option<String>,
}

impl Default for BudgetPolicy {
    fn default() -> Self {
        Self {
            monthly_limit_usd: default_monthly_limit(),
            alert_threshold: default_alert_threshold(),
            mode: EnforcementMode::default(),
            budget_fallbacks: default_budget_fallbacks(),
            premium_models: default_premium_models(),
            hard_fallback_model: None,
        }
    }
}

impl BudgetPolicy {
    /// Whether `model` counts as premium under this policy.
    pub fn is_premium(&self, model: &str) -> bool {
        self.premium_models.iter().any(|m| m == model)
    }
}

fn default_monthly_limit() -> f64 {
    500.0
}

fn default_alert_threshold() -> f64 {
    0.8
}

fn default_budget_fallbacks() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("gpt-4".to_string(), "gpt-3.5-turbo".to_string()),
        ("claude-3-opus".to_string(), "claude-3-haiku".to_string()),
    ])
}

fn default_premium_models() -> Vec<String> {
    vec![
        "gpt-4".to_string(),
        "claude-3-opus".to_string(),
        "gpt-4-turbo".to_string(),
    ]
}
