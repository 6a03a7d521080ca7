// SPDX-FileCopyrightText: 2026 PromptGo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Usage log operations.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use promptgo_core::{Channel, PromptGoError, UsageRecord};
use rusqlite::params;

use crate::database::{format_ts, map_tr_err, parse_ts, Database};

/// Counters are stored as SQLite INTEGER, which is signed.
fn to_sql_int(field: &str, value: u64) -> Result<i64, PromptGoError> {
    i64::try_from(value)
        .map_err(|_| PromptGoError::InvalidInput(format!("{field} {value} is too large to store")))
}

fn from_sql_int(row: &rusqlite::Row<'_>, idx: usize) -> Result<u64, rusqlite::Error> {
    let value: i64 = row.get(idx)?;
    u64::try_from(value).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Integer, Box::new(e))
    })
}

/// Append one record.
pub async fn insert_usage(db: &Database, record: &UsageRecord) -> Result<(), PromptGoError> {
    let tokens_in = to_sql_int("tokens_in", record.tokens_in)?;
    let tokens_out = to_sql_int("tokens_out", record.tokens_out)?;
    let latency_ms = to_sql_int("latency_ms", record.latency_ms)?;
    let r = record.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO usage_records (id, ts, org, user_id, feature, source_app, prompt_hash, \
                 route, model, tokens_in, tokens_out, cost_usd, latency_ms) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                params![
                    r.id,
                    format_ts(&r.timestamp),
                    r.org,
                    r.user,
                    r.feature,
                    r.source_app,
                    r.prompt_hash,
                    r.channel.to_string(),
                    r.model,
                    tokens_in,
                    tokens_out,
                    r.cost_usd,
                    latency_ms,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Records for `org` with `start <= ts < end`, oldest first.
pub async fn usage_between(
    db: &Database,
    org: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<UsageRecord>, PromptGoError> {
    let org = org.to_string();
    let start = format_ts(&start);
    let end = format_ts(&end);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, ts, org, user_id, feature, source_app, prompt_hash, route, model, \
                 tokens_in, tokens_out, cost_usd, latency_ms \
                 FROM usage_records WHERE org = ?1 AND ts >= ?2 AND ts < ?3 \
                 ORDER BY ts ASC, rowid ASC",
            )?;
            let rows = stmt.query_map(params![org, start, end], |row| {
                let ts: String = row.get(1)?;
                let route: String = row.get(7)?;
                Ok(UsageRecord {
                    id: row.get(0)?,
                    timestamp: parse_ts(1, &ts)?,
                    org: row.get(2)?,
                    user: row.get(3)?,
                    feature: row.get(4)?,
                    source_app: row.get(5)?,
                    prompt_hash: row.get(6)?,
                    channel: Channel::from_str(&route).map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(
                            7,
                            rusqlite::types::Type::Text,
                            Box::new(e),
                        )
                    })?,
                    model: row.get(8)?,
                    tokens_in: from_sql_int(row, 9)?,
                    tokens_out: from_sql_int(row, 10)?,
                    cost_usd: row.get(11)?,
                    latency_ms: from_sql_int(row, 12)?,
                })
            })?;
            let mut records = Vec::new();
            for row in rows {
                records.push(row?);
            }
            Ok(records)
        })
        .await
        .map_err(map_tr_err)
}
