// SPDX-FileCopyrightText: 2026 PromptGo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Privacy-preserving prompt digests.

use sha2::{Digest, Sha256};

/// SHA-256 of the prompt's UTF-8 bytes, lower-case hex.
pub fn prompt_hash(prompt: &str) -> String {
    hex::encode(Sha256::digest(prompt.as_bytes()))
}
