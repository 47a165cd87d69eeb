// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sync-state key-value checkpoints.
//!
//! A small durability record, not an audit log: one row per key,
//! last-write-wins.

use rusqlite::params;
use tether_core::{SyncCheckpoint, TetherError};

use crate::database::{map_tr_err, Database};

/// Fixed key under which the last successful sync pass is recorded.
pub const LAST_SYNC_KEY: &str = "last_sync";

/// Upsert a checkpoint value.
pub async fn set_value(db: &Database, key: &str, value: &str, now: i64) -> Result<(), TetherError> {
    let key = key.to_string();
    let value = value.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO sync_state (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET
                     value = excluded.value,
                     updated_at = excluded.updated_at",
                params![key, value, now],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Read a checkpoint value and its update time.
pub async fn get_value(db: &Database, key: &str) -> Result<Option<(String, i64)>, TetherError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| {
            use rusqlite::OptionalExtension;
            let row = conn
                .query_row(
                    "SELECT value, updated_at FROM sync_state WHERE key = ?1",
                    params![key],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;
            Ok(row)
        })
        .await
        .map_err(map_tr_err)
}

/// Record the reason and time of a completed sync pass.
pub async fn record_last_sync(db: &Database, reason: &str, now: i64) -> Result<(), TetherError> {
    set_value(db, LAST_SYNC_KEY, reason, now).await
}

/// The checkpoint for the most recent completed sync pass, if any.
pub async fn last_sync(db: &Database) -> Result<Option<SyncCheckpoint>, TetherError> {
    Ok(get_value(db, LAST_SYNC_KEY)
        .await?
        .map(|(reason, at)| SyncCheckpoint { reason, at }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn checkpoint_round_trip_and_overwrite() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();

        assert!(last_sync(&db).await.unwrap().is_none());

        record_last_sync(&db, "periodic", 1_000).await.unwrap();
        let cp = last_sync(&db).await.unwrap().unwrap();
        assert_eq!(cp.reason, "periodic");
        assert_eq!(cp.at, 1_000);

        record_last_sync(&db, "push", 2_000).await.unwrap();
        let cp = last_sync(&db).await.unwrap().unwrap();
        assert_eq!(cp.reason, "push");
        assert_eq!(cp.at, 2_000);
    }
}
