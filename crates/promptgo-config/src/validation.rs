// SPDX-FileCopyrightText: 2026 PromptGo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as positive weights, non-empty paths, and sane budget thresholds.

use promptgo_core::RoutingWeights;

use crate::diagnostic::ConfigError;
use crate::model::{BudgetPolicy, PromptGoConfig};

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every violation instead of failing fast.
pub fn validate_config(config: &PromptGoConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.policy.policy_dir.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "policy.policy_dir must not be empty".to_string(),
        });
    }

    if config.routing.learning_window_days == 0 {
        errors.push(ConfigError::Validation {
            message: "routing.learning_window_days must be at least 1".to_string(),
        });
    }

    check_weights("routing.weights", &config.routing.weights, &mut errors);
    check_budget("policy.default_budget", &config.policy.default_budget, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate a single team budget section.
pub fn validate_budget_policy(policy: &BudgetPolicy) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    check_budget("budget", policy, &mut errors);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate a weight table: every multiplier must be finite and positive.
pub fn validate_weights(weights: &RoutingWeights) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    check_weights("weights", weights, &mut errors);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_weights(prefix: &str, weights: &RoutingWeights, errors: &mut Vec<ConfigError>) {
    for (channel, w) in weights.iter() {
        if !w.is_finite() || w <= 0.0 {
            errors.push(ConfigError::Validation {
                message: format!("{prefix}.{channel} must be a positive number, got {w}"),
            });
        }
    }
}

fn check_budget(prefix: &str, policy: &BudgetPolicy, errors: &mut Vec<ConfigError>) {
    if !policy.monthly_limit_usd.is_finite() || policy.monthly_limit_usd <= 0.0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "{prefix}.monthly_limit_usd must be positive, got {}",
                policy.monthly_limit_usd
            ),
        });
    }

    if !(policy.alert_threshold > 0.0 && policy.alert_threshold <= 1.0) {
        errors.push(ConfigError::Validation {
            message: format!(
                "{prefix}.alert_threshold must be in (0, 1], got {}",
                policy.alert_threshold
            ),
        });
    }

    for (from, to) in &policy.budget_fallbacks {
        if to.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("{prefix}.budget_fallbacks.{from} must name a model"),
            });
        }
    }
}
