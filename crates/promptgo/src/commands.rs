// SPDX-FileCopyrightText: 2026 PromptGo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subcommand dispatch.

use std::collections::BTreeMap;

use promptgo_config::PromptGoConfig;
use promptgo_core::{Context, PromptGoError};
use promptgo_cost::roi_markdown;
use promptgo_engine::{LogRequest, PromptGo};
use serde::Serialize;
use tracing::debug;

use crate::Commands;

fn print_json<T: Serialize>(value: &T) -> Result<(), PromptGoError> {
    let out = serde_json::to_string_pretty(value)
        .map_err(|e| PromptGoError::Internal(format!("failed to encode output: {e}")))?;
    println!("{out}");
    Ok(())
}

/// Open the service and run one subcommand against it.
pub async fn run(config: PromptGoConfig, command: Commands) -> Result<(), PromptGoError> {
    let service = PromptGo::open(config).await?;
    let default_org = service.config().service.org.clone();
    let org_or_default = |org: Option<String>| org.unwrap_or_else(|| default_org.clone());

    match command {
        Commands::Suggest {
            prompt,
            org,
            user,
            strategy,
        } => {
            let strategy = strategy.map_or_else(|| service.default_strategy(), Into::into);
            debug!(?strategy, "suggesting route");
            let ctx = Context {
                org,
                user,
                ..Context::default()
            };
            let resp = service.suggest_route(&prompt, &ctx, strategy).await;
            print_json(&resp)
        }
        Commands::Log {
            prompt,
            route,
            model,
            org,
            user,
            feature,
            source_app,
            tokens_in,
            tokens_out,
            latency_ms,
        } => {
            let mut req = LogRequest::new(prompt, route, model);
            req.org = org;
            req.user = user;
            req.feature = feature;
            req.source_app = source_app;
            req.tokens_in = tokens_in;
            req.tokens_out = tokens_out;
            req.latency_ms = latency_ms;
            let receipt = service.log_request(req).await?;
            print_json(&receipt)
        }
        Commands::Summary {
            org,
            since,
            until,
            by,
        } => {
            let rollups = service.usage_summary(&org, since, until, by).await?;
            print_json(&rollups)
        }
        Commands::Budget { org } => {
            let status = service.budget_status(&org_or_default(org)).await?;
            print_json(&status.rounded())
        }
        Commands::Enforce { route, model, org } => {
            let decision = service
                .enforce_budget(&org_or_default(org), route, &model)
                .await?;
            print_json(&decision)
        }
        Commands::Feedback {
            prompt,
            suggested,
            actual,
            outcome,
            org,
            user,
        } => {
            let org = org_or_default(org);
            let logged = service
                .record_feedback(&org, &prompt, suggested, actual, outcome, user)
                .await?;
            print_json(&serde_json::json!({ "org": org, "logged": logged }))
        }
        Commands::Learn { orgs, days } => {
            let orgs = if orgs.is_empty() {
                vec![default_org.clone()]
            } else {
                orgs
            };
            let mut updated = BTreeMap::new();
            for org in orgs {
                let changed = service.learn(&org, days).await?;
                updated.insert(org, changed);
            }
            print_json(&updated)
        }
        Commands::Report { org, markdown } => {
            let report = service.optimization_report(&org_or_default(org)).await?;
            if markdown {
                print!(
                    "{}",
                    roi_markdown(
                        report.savings_opportunities.total_potential_savings,
                        &report.recommendations.all(),
                    )
                );
                Ok(())
            } else {
                print_json(&report)
            }
        }
        Commands::Estimate { prompt, models } => {
            let estimates = service.estimate_costs(&prompt, &models);
            print_json(&estimates)
        }
        Commands::Metrics { org, days } => {
            let metrics = service.team_metrics(&org_or_default(org), days).await?;
            print_json(&metrics)
        }
        Commands::Rules { org } => {
            let rules = service.weekly_rules(&org_or_default(org)).await?;
            print_json(&rules)
        }
        Commands::Insights { orgs } => {
            let orgs = if orgs.is_empty() {
                vec![default_org.clone()]
            } else {
                orgs
            };
            // Insights cover loaded routers; touching each org loads it.
            for org in &orgs {
                service.learning_stats(org).await;
            }
            print_json(&service.team_insights().await)
        }
    }
}
