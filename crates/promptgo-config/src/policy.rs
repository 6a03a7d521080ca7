// SPDX-FileCopyrightText: 2026 PromptGo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-team policy files.
//!
//! Each organization may drop a `<slug>.toml` into `policy.policy_dir`:
//!
//! ```toml
//! freshness_domains = ["docs.rs"]
//!
//! [weights]
//! web = 1.2
//!
//! [budget]
//! monthly_limit_usd = 250.0
//! mode = "hard"
//! ```
//!
//! Loading never fails: a missing, unreadable, malformed, or invalid file
//! falls back to the service-wide defaults with a warning.

use std::path::{Path, PathBuf};

use promptgo_core::RoutingWeights;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::model::{BudgetPolicy, PolicyConfig};
use crate::validation::{validate_budget_policy, validate_weights};

/// Effective policy for one organization after defaults are applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamPolicy {
    pub org: String,
    pub weights: RoutingWeights,
    pub freshness_domains: Vec<String>,
    pub budget: BudgetPolicy,
}

/// On-disk shape of a team policy file. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TeamPolicyFile {
    #[serde(default)]
    weights: Option<RoutingWeights>,
    #[serde(default)]
    freshness_domains: Vec<String>,
    #[serde(default)]
    budget: Option<BudgetPolicy>,
}

/// File-name slug for an organization: lower-cased, spaces to underscores,
/// path separators neutralized.
pub fn org_slug(org: &str) -> String {
    org.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Path of the policy file for `org` under `policy_dir`.
pub fn policy_path(policy_dir: &Path, org: &str) -> PathBuf {
    policy_dir.join(format!("{}.toml", org_slug(org)))
}

/// Resolve the effective policy for `org`.
pub fn load_team_policy(
    config: &PolicyConfig,
    default_weights: &RoutingWeights,
    org: &str,
) -> TeamPolicy {
    let defaults = TeamPolicy {
        org: org.to_string(),
        weights: *default_weights,
        freshness_domains: Vec::new(),
        budget: config.default_budget.clone(),
    };

    let path = policy_path(Path::new(&config.policy_dir), org);
    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(org, path = %path.display(), "no team policy file, using defaults");
            return defaults;
        }
        Err(e) => {
            warn!(org, path = %path.display(), error = %e, "unreadable team policy, using defaults");
            return defaults;
        }
    };

    let file: TeamPolicyFile = match toml::from_str(&content) {
        Ok(file) => file,
        Err(e) => {
            warn!(org, path = %path.display(), error = %e, "malformed team policy, using defaults");
            return defaults;
        }
    };

    let weights = match file.weights {
        Some(w) if validate_weights(&w).is_ok() => w,
        Some(w) => {
            warn!(org, weights = ?w, "invalid team weights, using defaults");
            defaults.weights
        }
        None => defaults.weights,
    };

    let budget = match file.budget {
        Some(b) => match validate_budget_policy(&b) {
            Ok(()) => b,
            Err(errors) => {
                for e in &errors {
                    warn!(org, error = %e, "invalid team budget");
                }
                defaults.budget.clone()
            }
        },
        None => defaults.budget.clone(),
    };

    TeamPolicy {
        org: org.to_string(),
        weights,
        freshness_domains: file.freshness_domains,
        budget,
    }
}
