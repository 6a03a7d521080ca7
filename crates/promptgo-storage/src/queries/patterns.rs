// SPDX-FileCopyrightText: 2026 PromptGo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Learned-pattern state, one JSON blob per organization.

use chrono::Utc;
use promptgo_core::PromptGoError;
use rusqlite::params;

use crate::database::{format_ts, map_tr_err, Database};

/// Saved state for `org`, if any.
pub async fn load_patterns(db: &Database, org: &str) -> Result<Option<String>, PromptGoError> {
    let org = org.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare("SELECT state_json FROM learned_patterns WHERE org = ?1")?;
            match stmt.query_row(params![org], |row| row.get(0)) {
                Ok(json) => Ok(Some(json)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Insert or replace the state for `org`.
pub async fn save_patterns(db: &Database, org: &str, state_json: &str) -> Result<(), PromptGoError> {
    let org = org.to_string();
    let state_json = state_json.to_string();
    let updated_at = format_ts(&Utc::now());
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO learned_patterns (org, state_json, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(org) DO UPDATE SET state_json = excluded.state_json,
                                                updated_at = excluded.updated_at",
                params![org, state_json, updated_at],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_org_loads_none() {
        let db = Database::open_in_memory().await.unwrap();
        assert!(load_patterns(&db, "acme").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_replaces_previous_state() {
        let db = Database::open_in_memory().await.unwrap();
        save_patterns(&db, "acme", "{\"v\":1}").await.unwrap();
        save_patterns(&db, "acme", "{\"v\":2}").await.unwrap();
        save_patterns(&db, "beta", "{\"v\":9}").await.unwrap();
        assert_eq!(load_patterns(&db, "acme").await.unwrap().as_deref(), Some("{\"v\":2}"));
    }
}
