// SPDX-FileCopyrightText: 2026 PromptGo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence seams consumed by the routing and cost crates.
//!
//! All store traits use `#[async_trait]` so they can be held as
//! `Arc<dyn UsageStore>` by the service layer.

pub mod store;

pub use store::{PatternStore, UsageStore};
