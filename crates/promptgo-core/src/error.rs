// SPDX-FileCopyrightText: 2026 PromptGo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for PromptGo.

use thiserror::Error;

/// The primary error type returned by PromptGo stores and services.
#[derive(Debug, Error)]
pub enum PromptGoError {
    /// Configuration errors (invalid TOML, unreadable policy files, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Caller supplied a value the core cannot interpret.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PromptGoError {
    /// Wrap any error as a storage failure.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        PromptGoError::Storage {
            source: Box::new(err),
        }
    }
}
