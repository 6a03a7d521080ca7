// SPDX-FileCopyrightText: 2026 PromptGo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! PromptGo - route prompts to the cheapest channel that will answer them well.
//!
//! This is the binary entry point. Every subcommand prints its result as
//! pretty JSON on stdout; logs go to stderr.

mod commands;

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use promptgo_core::{Channel, GroupBy, Outcome};
use promptgo_router::ScoringStrategy;

/// PromptGo - prompt routing, usage tracking, and budget control.
#[derive(Parser, Debug)]
#[command(name = "promptgo", version, about, long_about = None)]
struct Cli {
    /// Load configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Scoring strategy selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
    Static,
    Adaptive,
}

impl From<StrategyArg> for ScoringStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Static => ScoringStrategy::Static,
            StrategyArg::Adaptive => ScoringStrategy::Adaptive,
        }
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Suggest a channel for a prompt.
    Suggest {
        prompt: String,
        #[arg(long)]
        org: Option<String>,
        #[arg(long)]
        user: Option<String>,
        /// Defaults to `adaptive` when `routing.learning_enabled` is set.
        #[arg(long, value_enum)]
        strategy: Option<StrategyArg>,
    },
    /// Record a served request in the usage log.
    Log {
        prompt: String,
        #[arg(long)]
        route: Channel,
        #[arg(long)]
        model: String,
        #[arg(long)]
        org: Option<String>,
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        feature: Option<String>,
        #[arg(long)]
        source_app: Option<String>,
        #[arg(long, default_value_t = 0)]
        tokens_in: u64,
        #[arg(long, default_value_t = 0)]
        tokens_out: u64,
        #[arg(long, default_value_t = 0)]
        latency_ms: u64,
    },
    /// Summarize usage between two instants.
    Summary {
        #[arg(long)]
        org: String,
        /// RFC 3339 timestamp or YYYY-MM-DD (midnight UTC).
        #[arg(long, value_parser = parse_instant)]
        since: DateTime<Utc>,
        #[arg(long, value_parser = parse_instant)]
        until: DateTime<Utc>,
        #[arg(long, default_value = "user")]
        by: GroupBy,
    },
    /// Show month-to-date budget status.
    Budget {
        #[arg(long)]
        org: Option<String>,
    },
    /// Apply budget enforcement to a planned route and model.
    Enforce {
        #[arg(long)]
        route: Channel,
        #[arg(long)]
        model: String,
        #[arg(long)]
        org: Option<String>,
    },
    /// Record how a suggestion worked out.
    Feedback {
        prompt: String,
        #[arg(long)]
        suggested: Channel,
        #[arg(long)]
        actual: Channel,
        #[arg(long)]
        outcome: Outcome,
        #[arg(long)]
        org: Option<String>,
        #[arg(long)]
        user: Option<String>,
    },
    /// Retrain adaptive routing from recent usage.
    Learn {
        /// Organizations to retrain; defaults to `service.org`.
        #[arg(long = "org")]
        orgs: Vec<String>,
        /// Trailing window in days; defaults to `routing.learning_window_days`.
        #[arg(long)]
        days: Option<u32>,
    },
    /// Cost optimization report for the current month.
    Report {
        #[arg(long)]
        org: Option<String>,
        /// Print a Markdown ROI summary instead of JSON.
        #[arg(long)]
        markdown: bool,
    },
    /// Estimate what a prompt would cost on candidate models.
    Estimate {
        prompt: String,
        #[arg(long = "model", required = true)]
        models: Vec<String>,
    },
    /// Request, cost, and route totals for a team.
    Metrics {
        #[arg(long)]
        org: Option<String>,
        /// Trailing window in days.
        #[arg(long)]
        days: Option<u32>,
    },
    /// Routing rules worth adopting, from the last week of traffic.
    Rules {
        #[arg(long)]
        org: Option<String>,
    },
    /// Learning stats across teams.
    Insights {
        /// Organizations to include.
        #[arg(long = "org")]
        orgs: Vec<String>,
    },
}

/// Parse an RFC 3339 timestamp or a bare date.
fn parse_instant(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("`{raw}` is neither RFC 3339 nor YYYY-MM-DD"))
}

/// Initialize the tracing subscriber with an env filter.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("promptgo={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => promptgo_config::load_and_validate_path(path),
        None => promptgo_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            promptgo_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.service.log_level);

    if let Err(e) = commands::run(config, cli.command).await {
        eprintln!("promptgo: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn binary_loads_config_defaults() {
        let config = promptgo_config::load_and_validate_str("")
            .expect("default config should be valid");
        assert_eq!(config.service.org, "unknown");
    }

    #[test]
    fn parses_suggest_with_strategy() {
        let cli = Cli::try_parse_from([
            "promptgo", "suggest", "what changed?", "--strategy", "adaptive", "--org", "acme",
        ])
        .unwrap();
        match cli.command {
            Commands::Suggest { strategy, org, .. } => {
                assert_eq!(strategy, Some(StrategyArg::Adaptive));
                assert_eq!(org.as_deref(), Some("acme"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn channel_and_outcome_parse_case_insensitively() {
        let cli = Cli::try_parse_from([
            "promptgo", "feedback", "p", "--suggested", "WEB", "--actual", "ask", "--outcome", "Bad",
        ])
        .unwrap();
        match cli.command {
            Commands::Feedback { suggested, actual, outcome, .. } => {
                assert_eq!(suggested, Channel::Web);
                assert_eq!(actual, Channel::Ask);
                assert_eq!(outcome, Outcome::Bad);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn unknown_channel_is_rejected() {
        assert!(Cli::try_parse_from(["promptgo", "enforce", "--route", "email", "--model", "m"]).is_err());
    }

    #[test]
    fn estimate_requires_a_model() {
        assert!(Cli::try_parse_from(["promptgo", "estimate", "hi"]).is_err());
    }

    #[test]
    fn instants_accept_dates_and_rfc3339() {
        assert_eq!(
            parse_instant("2025-02-01").unwrap(),
            Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            parse_instant("2025-02-01T10:00:00+02:00").unwrap(),
            Utc.with_ymd_and_hms(2025, 2, 1, 8, 0, 0).unwrap()
        );
        assert!(parse_instant("last tuesday").is_err());
    }

    #[test]
    fn parses_metrics_and_rules() {
        let cli = Cli::try_parse_from(["promptgo", "metrics", "--org", "acme", "--days", "30"]).unwrap();
        match cli.command {
            Commands::Metrics { org, days } => {
                assert_eq!(org.as_deref(), Some("acme"));
                assert_eq!(days, Some(30));
            }
            other => panic!("unexpected command {other:?}"),
        }
        let cli = Cli::try_parse_from(["promptgo", "rules"]).unwrap();
        assert!(matches!(cli.command, Commands::Rules { org: None }));
    }

    #[test]
    fn global_config_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["promptgo", "insights", "--config", "/tmp/p.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/p.toml")));
    }
}
