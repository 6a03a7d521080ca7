// SPDX-FileCopyrightText: 2026 PromptGo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for PromptGo.
//!
//! In-memory implementations of the storage traits plus a small record
//! builder, so router, cost, and engine tests run without SQLite.
//!
//! # Components
//!
//! - [`MemoryUsageStore`] - append-only usage log held in a `Vec`
//! - [`MemoryPatternStore`] - per-org JSON blobs with injectable failures
//! - [`RecordBuilder`] - fluent [`UsageRecord`] construction

pub mod builders;
pub mod memory;

pub use builders::RecordBuilder;
pub use memory::{MemoryPatternStore, MemoryUsageStore};
