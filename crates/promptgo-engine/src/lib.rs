// SPDX-FileCopyrightText: 2026 PromptGo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The PromptGo service.
//!
//! [`PromptGo`] is constructed once per process and shared. It owns the
//! learning registry, the rate table, and handles to the usage and pattern
//! stores, and exposes every caller-facing operation.

pub mod requests;
pub mod service;

pub use requests::{LogReceipt, LogRequest, RankedChannel, SuggestResponse};
pub use service::PromptGo;
