// SPDX-FileCopyrightText: 2026 PromptGo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns figment extraction failures into miette diagnostics.
//!
//! Unknown keys get a "did you mean" hint from the closest valid key and,
//! when the offending file is known, a label pointing at the key itself.

#![allow(unused_assignments)] // emitted by the miette Diagnostic derive

use figment::error::Kind;
use miette::{Diagnostic, GraphicalReportHandler, NamedSource, SourceSpan};
use thiserror::Error;

/// Jaro-Winkler similarity a valid key needs before it is offered as a hint.
const MIN_HINT_SIMILARITY: f64 = 0.75;

/// One problem found while loading `promptgo.toml`.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("`{key}` is not a PromptGo setting")]
    #[diagnostic(
        code(promptgo::config::unknown_key),
        help("{}", hint_for(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        suggestion: Option<String>,
        valid_keys: String,
        #[label("unrecognized here")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("`{key}` has the wrong type: {detail}")]
    #[diagnostic(code(promptgo::config::invalid_type), help("use a value of type {expected}"))]
    InvalidType {
        key: String,
        detail: String,
        expected: String,
    },

    #[error("`{key}` is required")]
    #[diagnostic(
        code(promptgo::config::missing_key),
        help("set `{key}` in promptgo.toml or via a PROMPTGO_ variable")
    )]
    MissingKey { key: String },

    /// Parsed fine but breaks a semantic rule (see `validation`).
    #[error("invalid setting: {message}")]
    #[diagnostic(code(promptgo::config::validation))]
    Validation { message: String },

    #[error("could not load configuration: {0}")]
    #[diagnostic(code(promptgo::config::other))]
    Other(String),
}

fn hint_for(suggestion: Option<&str>, valid_keys: &str) -> String {
    suggestion.map_or_else(
        || format!("expected one of: {valid_keys}"),
        |s| format!("perhaps `{s}`? Expected one of: {valid_keys}"),
    )
}

/// Map every error inside a `figment::Error` to a [`ConfigError`].
///
/// `sources` pairs file paths with their contents so unknown keys can be
/// highlighted in place.
pub fn figment_to_config_errors(
    err: figment::Error,
    sources: &[(String, String)],
) -> Vec<ConfigError> {
    err.into_iter().map(|e| convert(&e, sources)).collect()
}

fn convert(error: &figment::error::Error, sources: &[(String, String)]) -> ConfigError {
    match &error.kind {
        Kind::UnknownField(field, expected) => {
            let (span, src) = highlight(error, field, sources);
            ConfigError::UnknownKey {
                key: field.clone(),
                suggestion: suggest_key(field, expected),
                valid_keys: expected.join(", "),
                span,
                src,
            }
        }
        Kind::MissingField(field) => ConfigError::MissingKey {
            key: field.to_string(),
        },
        Kind::InvalidType(found, wanted) => ConfigError::InvalidType {
            key: error.path.join("."),
            detail: format!("got {found}, wanted {wanted}"),
            expected: wanted.to_string(),
        },
        _ => ConfigError::Other(error.to_string()),
    }
}

/// Source file and key span for an error, when both can be resolved.
fn highlight(
    error: &figment::error::Error,
    field: &str,
    sources: &[(String, String)],
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let origin = error.metadata.as_ref().and_then(|meta| match meta.source.as_ref() {
        Some(figment::Source::File(path)) => Some(path.display().to_string()),
        _ => None,
    });

    origin
        .and_then(|origin| sources.iter().find(|(name, _)| *name == origin))
        .and_then(|(name, content)| {
            let offset = find_key_offset(content, &error.path, field)?;
            Some((
                Some(SourceSpan::new(offset.into(), field.len())),
                Some(NamedSource::new(name, content.clone())),
            ))
        })
        .unwrap_or((None, None))
}

/// Byte offset of `field = ...` inside the table named by `path`.
///
/// `path = ["routing", "weights"]` searches below `[routing.weights]` up to
/// the next table header; an empty path searches from the top of the file.
pub fn find_key_offset(content: &str, path: &[String], field: &str) -> Option<usize> {
    let start = if path.is_empty() {
        0
    } else {
        let header = format!("[{}]", path.join("."));
        content.find(&header)? + header.len()
    };

    let mut offset = start;
    for line in content[start..].split_inclusive('\n') {
        let body = line.trim_start();
        if body.starts_with('[') && offset != start {
            break;
        }
        if let Some(rest) = body.strip_prefix(field)
            && rest.trim_start().starts_with('=')
        {
            return Some(offset + (line.len() - body.len()));
        }
        offset += line.len();
    }
    None
}

/// Closest valid key to `unknown`, if any is similar enough.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|k| (strsim::jaro_winkler(unknown, k), *k))
        .filter(|(similarity, _)| *similarity > MIN_HINT_SIMILARITY)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, k)| k.to_string())
}

/// Print each diagnostic to stderr, graphically when possible.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut rendered = String::new();
        match handler.render_report(&mut rendered, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{rendered}"),
            Err(_) => eprintln!("config: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggests_learning_enabled() {
        let valid = &["learning_enabled", "learning_window_days", "weights"];
        assert_eq!(
            suggest_key("learnin_enabled", valid),
            Some("learning_enabled".to_string())
        );
    }

    #[test]
    fn unrelated_key_gets_no_hint() {
        assert_eq!(suggest_key("qqqqqq", &["org", "log_level"]), None);
    }

    #[test]
    fn finds_key_in_nested_table() {
        let content = "[routing]\nlearning_enabled = true\n\n[routing.weights]\nwbe = 1.2\n";
        let path = vec!["routing".to_string(), "weights".to_string()];
        let o = find_key_offset(content, &path, "wbe").unwrap();
        assert_eq!(&content[o..o + 3], "wbe");
    }

    #[test]
    fn key_lookup_stops_at_next_table() {
        let content = "[service]\norg = \"a\"\n[storage]\nwal = true\n";
        let path = vec!["service".to_string()];
        assert!(find_key_offset(content, &path, "wal").is_none());
    }

    #[test]
    fn unknown_field_becomes_unknown_key() {
        let err = crate::loader::load_config_from_str("[service]\norgg = \"x\"\n").unwrap_err();
        let errors = figment_to_config_errors(err, &[]);
        assert!(errors.iter().any(|e| matches!(
            e,
            ConfigError::UnknownKey { key, suggestion: Some(s), .. } if key == "orgg" && s == "org"
        )));
    }

    #[test]
    fn hint_text_mentions_suggestion() {
        assert!(hint_for(Some("org"), "org, log_level").starts_with("perhaps `org`?"));
        assert!(hint_for(None, "org").starts_with("expected one of"));
    }
}
