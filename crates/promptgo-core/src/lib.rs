// SPDX-FileCopyrightText: 2026 PromptGo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for PromptGo.
//!
//! This crate provides the domain types, error type, and persistence traits
//! shared by the router, cost, storage, and engine crates.

pub mod error;
pub mod hashing;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::PromptGoError;
pub use hashing::prompt_hash;
pub use traits::{PatternStore, UsageStore};
pub use types::{
    Channel, Context, FeedbackEvent, GroupBy, Outcome, RoutingWeights, UsageRecord,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_variants_render() {
        let config = PromptGoError::Config("bad weights".into());
        assert_eq!(config.to_string(), "configuration error: bad weights");

        let storage = PromptGoError::storage(std::io::Error::other("disk full"));
        assert!(storage.to_string().contains("disk full"));

        let input = PromptGoError::InvalidInput("channel `email`".into());
        assert!(input.to_string().starts_with("invalid input"));

        let internal = PromptGoError::Internal("poisoned".into());
        assert!(internal.to_string().contains("poisoned"));
    }

    #[test]
    fn store_traits_are_object_safe() {
        fn _usage(_: &dyn UsageStore) {}
        fn _patterns(_: &dyn PatternStore) {}
    }
}
