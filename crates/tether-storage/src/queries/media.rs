// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cached-media row operations backing the media cache.
//!
//! The media cache owns these rows exclusively. The row set and the tracked
//! files must stay in one-to-one correspondence except for the non-durable
//! window between file write and row upsert.

use rusqlite::params;
use tether_core::{CachedMedia, TetherError};

use crate::database::{map_tr_err, Database};

const MEDIA_COLUMNS: &str = "file_id, mime_type, size_bytes, local_path, last_accessed_at, pinned";

fn row_to_media(row: &rusqlite::Row<'_>) -> rusqlite::Result<CachedMedia> {
    Ok(CachedMedia {
        file_id: row.get(0)?,
        mime_type: row.get(1)?,
        size_bytes: row.get(2)?,
        local_path: row.get(3)?,
        last_accessed_at: row.get(4)?,
        pinned: row.get(5)?,
    })
}

/// Upsert a media row keyed by `file_id` (last-write-wins).
pub async fn upsert_media(db: &Database, media: &CachedMedia) -> Result<(), TetherError> {
    let media = media.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                &format!(
                    "INSERT INTO media ({MEDIA_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                     ON CONFLICT(file_id) DO UPDATE SET
                         mime_type = excluded.mime_type,
                         size_bytes = excluded.size_bytes,
                         local_path = excluded.local_path,
                         last_accessed_at = excluded.last_accessed_at,
                         pinned = excluded.pinned"
                ),
                params![
                    media.file_id,
                    media.mime_type,
                    media.size_bytes,
                    media.local_path,
                    media.last_accessed_at,
                    media.pinned,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get a media row without refreshing its access time.
pub async fn get_media(db: &Database, file_id: &str) -> Result<Option<CachedMedia>, TetherError> {
    let file_id = file_id.to_string();
    db.connection()
        .call(move |conn| {
            use rusqlite::OptionalExtension;
            let media = conn
                .query_row(
                    &format!("SELECT {MEDIA_COLUMNS} FROM media WHERE file_id = ?1"),
                    params![file_id],
                    row_to_media,
                )
                .optional()?;
            Ok(media)
        })
        .await
        .map_err(map_tr_err)
}

/// Look up a media row and refresh its last-accessed timestamp in the same
/// writer pass. Returns the row as it was found (absence is not an error).
pub async fn resolve_and_touch(
    db: &Database,
    file_id: &str,
    now: i64,
) -> Result<Option<CachedMedia>, TetherError> {
    let file_id = file_id.to_string();
    db.connection()
        .call(move |conn| {
            use rusqlite::OptionalExtension;
            let media = conn
                .query_row(
                    &format!("SELECT {MEDIA_COLUMNS} FROM media WHERE file_id = ?1"),
                    params![file_id],
                    row_to_media,
                )
                .optional()?;
            if media.is_some() {
                conn.execute(
                    "UPDATE media SET last_accessed_at = ?2 WHERE file_id = ?1",
                    params![file_id, now],
                )?;
            }
            Ok(media)
        })
        .await
        .map_err(map_tr_err)
}

/// Set or clear the pinned flag. Returns `false` if the row does not exist.
pub async fn set_pinned(db: &Database, file_id: &str, pinned: bool) -> Result<bool, TetherError> {
    let file_id = file_id.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE media SET pinned = ?2 WHERE file_id = ?1",
                params![file_id, pinned],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Aggregate tracked size over all rows.
pub async fn total_size(db: &Database) -> Result<i64, TetherError> {
    db.connection()
        .call(move |conn| {
            let total = conn.query_row(
                "SELECT COALESCE(SUM(size_bytes), 0) FROM media",
                [],
                |row| row.get(0),
            )?;
            Ok(total)
        })
        .await
        .map_err(map_tr_err)
}

/// The least-recently-accessed non-pinned row, if any.
pub async fn lru_candidate(db: &Database) -> Result<Option<CachedMedia>, TetherError> {
    db.connection()
        .call(move |conn| {
            use rusqlite::OptionalExtension;
            let media = conn
                .query_row(
                    &format!(
                        "SELECT {MEDIA_COLUMNS} FROM media WHERE pinned = 0
                         ORDER BY last_accessed_at ASC, file_id ASC LIMIT 1"
                    ),
                    [],
                    row_to_media,
                )
                .optional()?;
            Ok(media)
        })
        .await
        .map_err(map_tr_err)
}

/// Delete a single row.
pub async fn delete_media(db: &Database, file_id: &str) -> Result<(), TetherError> {
    let file_id = file_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute("DELETE FROM media WHERE file_id = ?1", params![file_id])?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// List every row (clear-all path).
pub async fn list_all(db: &Database) -> Result<Vec<CachedMedia>, TetherError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!("SELECT {MEDIA_COLUMNS} FROM media"))?;
            let rows = stmt.query_map([], row_to_media)?;
            let mut entries = Vec::new();
            for row in rows {
                entries.push(row?);
            }
            Ok(entries)
        })
        .await
        .map_err(map_tr_err)
}

/// Delete every row.
pub async fn delete_all(db: &Database) -> Result<(), TetherError> {
    db.connection()
        .call(move |conn| {
            conn.execute("DELETE FROM media", [])?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn make_media(file_id: &str, size: i64, accessed: i64, pinned: bool) -> CachedMedia {
        CachedMedia {
            file_id: file_id.to_string(),
            mime_type: "image/jpeg".to_string(),
            size_bytes: size,
            local_path: format!("/cache/{file_id}"),
            last_accessed_at: accessed,
            pinned,
        }
    }

    #[tokio::test]
    async fn upsert_replaces_by_file_id() {
        let (db, _dir) = setup_db().await;
        upsert_media(&db, &make_media("f1", 100, 1, false))
            .await
            .unwrap();
        upsert_media(&db, &make_media("f1", 250, 2, true))
            .await
            .unwrap();

        let got = get_media(&db, "f1").await.unwrap().unwrap();
        assert_eq!(got.size_bytes, 250);
        assert!(got.pinned);
        assert_eq!(total_size(&db).await.unwrap(), 250);
    }

    #[tokio::test]
    async fn resolve_and_touch_refreshes_access_time() {
        let (db, _dir) = setup_db().await;
        upsert_media(&db, &make_media("f1", 100, 1, false))
            .await
            .unwrap();

        let found = resolve_and_touch(&db, "f1", 50).await.unwrap();
        assert!(found.is_some());
        let got = get_media(&db, "f1").await.unwrap().unwrap();
        assert_eq!(got.last_accessed_at, 50);

        assert!(resolve_and_touch(&db, "missing", 60).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn lru_candidate_skips_pinned() {
        let (db, _dir) = setup_db().await;
        upsert_media(&db, &make_media("pinned-old", 10, 0, true))
            .await
            .unwrap();
        upsert_media(&db, &make_media("a", 10, 5, false))
            .await
            .unwrap();
        upsert_media(&db, &make_media("b", 10, 3, false))
            .await
            .unwrap();

        let candidate = lru_candidate(&db).await.unwrap().unwrap();
        assert_eq!(candidate.file_id, "b", "oldest non-pinned wins");

        delete_media(&db, "b").await.unwrap();
        delete_media(&db, "a").await.unwrap();
        assert!(lru_candidate(&db).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_pinned_reports_missing_rows() {
        let (db, _dir) = setup_db().await;
        upsert_media(&db, &make_media("f1", 10, 1, false))
            .await
            .unwrap();

        assert!(set_pinned(&db, "f1", true).await.unwrap());
        assert!(get_media(&db, "f1").await.unwrap().unwrap().pinned);
        assert!(!set_pinned(&db, "nope", true).await.unwrap());
    }

    #[tokio::test]
    async fn clear_all_empties_the_table() {
        let (db, _dir) = setup_db().await;
        upsert_media(&db, &make_media("f1", 10, 1, false))
            .await
            .unwrap();
        upsert_media(&db, &make_media("f2", 20, 2, true))
            .await
            .unwrap();

        assert_eq!(list_all(&db).await.unwrap().len(), 2);
        delete_all(&db).await.unwrap();
        assert_eq!(list_all(&db).await.unwrap().len(), 0);
        assert_eq!(total_size(&db).await.unwrap(), 0);
    }
}
