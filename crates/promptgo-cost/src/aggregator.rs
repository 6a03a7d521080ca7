// SPDX-FileCopyrightText: 2026 PromptGo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Usage rollups keyed by user, feature, or model.

use std::collections::HashMap;

use promptgo_core::{GroupBy, UsageRecord};
use serde::Serialize;

use crate::round_to;

/// Aggregated usage for one grouping key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rollup {
    pub key: String,
    pub requests: u64,
    pub tokens_in: u64,
    pub tokens_out: u64,
    /// Rounded to cents.
    pub cost_usd: f64,
    /// Nearest-rank 95th percentile.
    pub p95_latency_ms: u64,
}

/// Index of the nearest-rank 95th percentile in a sorted sample of `n`.
///
/// `ceil(0.95 n) - 1`, computed in integers; 0 for an empty sample.
pub fn p95_index(n: usize) -> usize {
    (n * 95).div_ceil(100).saturating_sub(1)
}

/// Reduce records into rollups, in order of each key's first appearance.
pub fn summarize(records: &[UsageRecord], group_by: GroupBy) -> Vec<Rollup> {
    struct Bucket<'a> {
        key: &'a str,
        requests: u64,
        tokens_in: u64,
        tokens_out: u64,
        cost_usd: f64,
        latencies: Vec<u64>,
    }

    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut buckets: Vec<Bucket<'_>> = Vec::new();

    for r in records {
        let key = group_by.key(r);
        let i = *index.entry(key).or_insert_with(|| {
            buckets.push(Bucket {
                key,
                requests: 0,
                tokens_in: 0,
                tokens_out: 0,
                cost_usd: 0.0,
                latencies: Vec::new(),
            });
            buckets.len() - 1
        });
        let b = &mut buckets[i];
        b.requests += 1;
        b.tokens_in += r.tokens_in;
        b.tokens_out += r.tokens_out;
        b.cost_usd += r.cost_usd;
        b.latencies.push(r.latency_ms);
    }

    buckets
        .into_iter()
        .map(|mut b| {
            b.latencies.sort_unstable();
            let p95 = b
                .latencies
                .get(p95_index(b.latencies.len()))
                .copied()
                .unwrap_or(0);
            Rollup {
                key: b.key.to_string(),
                requests: b.requests,
                tokens_in: b.tokens_in,
                tokens_out: b.tokens_out,
                cost_usd: round_to(b.cost_usd, 2),
                p95_latency_ms: p95,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptgo_test_utils::RecordBuilder;

    #[test]
    fn empty_input_gives_no_rollups() {
        assert!(summarize(&[], GroupBy::User).is_empty());
    }

    #[test]
    fn p95_index_uses_nearest_rank() {
        assert_eq!(p95_index(0), 0);
        assert_eq!(p95_index(1), 0);
        assert_eq!(p95_index(10), 9);
        assert_eq!(p95_index(20), 18);
        assert_eq!(p95_index(100), 94);
    }

    #[test]
    fn single_record_p95_is_its_latency() {
        let r = RecordBuilder::new("acme").latency(420).build();
        let out = summarize(&[r], GroupBy::Model);
        assert_eq!(out[0].p95_latency_ms, 420);
    }

    #[test]
    fn groups_in_first_seen_order_with_sums() {
        let records = vec![
            RecordBuilder::new("acme").user("zoe").tokens(10, 5).cost(0.004).latency(100).build(),
            RecordBuilder::new("acme").user("abe").tokens(1, 1).cost(1.0).latency(50).build(),
            RecordBuilder::new("acme").user("zoe").tokens(20, 10).cost(0.003).latency(300).build(),
        ];
        let out = summarize(&records, GroupBy::User);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].key, "zoe");
        assert_eq!(out[0].requests, 2);
        assert_eq!(out[0].tokens_in, 30);
        assert_eq!(out[0].tokens_out, 15);
        assert_eq!(out[0].cost_usd, 0.01);
        assert_eq!(out[0].p95_latency_ms, 300);
        assert_eq!(out[1].key, "abe");
    }

    #[test]
    fn twenty_samples_take_nineteenth() {
        let records: Vec<_> = (1..=20)
            .rev()
            .map(|ms| RecordBuilder::new("acme").feature("chat").latency(ms * 10).build())
            .collect();
        let out = summarize(&records, GroupBy::Feature);
        assert_eq!(out[0].p95_latency_ms, 190);
    }
}
