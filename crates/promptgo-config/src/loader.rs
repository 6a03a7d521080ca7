// SPDX-FileCopyrightText: 2026 PromptGo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./promptgo.toml` > `~/.config/promptgo/promptgo.toml` > `/etc/promptgo/promptgo.toml`
//! with environment variable overrides via `PROMPTGO_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::PromptGoConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/promptgo/promptgo.toml` (system-wide)
/// 3. `~/.config/promptgo/promptgo.toml` (user XDG config)
/// 4. `./promptgo.toml` (local directory)
/// 5. `PROMPTGO_*` environment variables
pub fn load_config() -> Result<PromptGoConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<PromptGoConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PromptGoConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<PromptGoConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PromptGoConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(PromptGoConfig::default()))
        .merge(Toml::file("/etc/promptgo/promptgo.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("promptgo/promptgo.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("promptgo.toml"))
        .merge(env_provider())
}

/// Environment provider with explicit section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `PROMPTGO_ROUTING_LEARNING_ENABLED` must map to
/// `routing.learning_enabled`, not `routing.learning.enabled`. The nested
/// `routing.weights` and `policy.default_budget` tables get a second pass.
fn env_provider() -> Env {
    Env::prefixed("PROMPTGO_").map(|key| {
        let mapped = key
            .as_str()
            .replacen("service_", "service.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("routing_", "routing.", 1)
            .replacen("cost_", "cost.", 1)
            .replacen("policy_", "policy.", 1)
            .replacen("routing.weights_", "routing.weights.", 1)
            .replacen("policy.default_budget_", "policy.default_budget.", 1);
        mapped.into()
    })
}
