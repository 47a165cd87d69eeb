// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dialog CRUD operations.
//!
//! Dialogs are upserted on every sync pass or incoming push and never
//! independently deleted by this core. All mutations are keyed upserts so
//! that concurrent writers serialize per row.

use rusqlite::params;
use tether_core::Dialog;
use tether_core::TetherError;

use crate::database::{map_tr_err, Database};

fn row_to_dialog(row: &rusqlite::Row<'_>) -> rusqlite::Result<Dialog> {
    Ok(Dialog {
        id: row.get(0)?,
        title: row.get(1)?,
        last_message_preview: row.get(2)?,
        last_message_at: row.get(3)?,
        unread_count: row.get(4)?,
    })
}

const DIALOG_COLUMNS: &str = "id, title, last_message_preview, last_message_at, unread_count";

/// Upsert a full dialog row (sync snapshot path). The snapshot's unread
/// count is authoritative for the dialogs it covers.
pub async fn upsert_dialog(db: &Database, dialog: &Dialog) -> Result<(), TetherError> {
    let dialog = dialog.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO dialogs (id, title, last_message_preview, last_message_at, unread_count)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(id) DO UPDATE SET
                     title = excluded.title,
                     last_message_preview = excluded.last_message_preview,
                     last_message_at = MAX(last_message_at, excluded.last_message_at),
                     unread_count = excluded.unread_count",
                params![
                    dialog.id,
                    dialog.title,
                    dialog.last_message_preview,
                    dialog.last_message_at,
                    dialog.unread_count,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Ensure a dialog row exists without disturbing an existing one
/// (push-ingestion path for not-yet-synced dialogs).
pub async fn ensure_dialog(db: &Database, id: i64) -> Result<(), TetherError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO dialogs (id) VALUES (?1) ON CONFLICT(id) DO NOTHING",
                params![id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get a single dialog by id.
pub async fn get_dialog(db: &Database, id: i64) -> Result<Option<Dialog>, TetherError> {
    db.connection()
        .call(move |conn| {
            use rusqlite::OptionalExtension;
            let dialog = conn
                .query_row(
                    &format!("SELECT {DIALOG_COLUMNS} FROM dialogs WHERE id = ?1"),
                    params![id],
                    row_to_dialog,
                )
                .optional()?;
            Ok(dialog)
        })
        .await
        .map_err(map_tr_err)
}

/// List all dialogs, most recent message first.
pub async fn list_dialogs(db: &Database) -> Result<Vec<Dialog>, TetherError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {DIALOG_COLUMNS} FROM dialogs ORDER BY last_message_at DESC, id ASC"
            ))?;
            let rows = stmt.query_map([], row_to_dialog)?;
            let mut dialogs = Vec::new();
            for row in rows {
                dialogs.push(row?);
            }
            Ok(dialogs)
        })
        .await
        .map_err(map_tr_err)
}

/// Update preview and activity timestamp after a local write. The timestamp
/// only moves forward.
pub async fn touch_last_message(
    db: &Database,
    id: i64,
    preview: &str,
    at: i64,
) -> Result<(), TetherError> {
    let preview = preview.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE dialogs SET
                     last_message_preview = ?2,
                     last_message_at = MAX(last_message_at, ?3)
                 WHERE id = ?1",
                params![id, preview, at],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Increment the unread counter by one.
pub async fn increment_unread(db: &Database, id: i64) -> Result<(), TetherError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE dialogs SET unread_count = unread_count + 1 WHERE id = ?1",
                params![id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Reset the unread counter to zero (coarse per-dialog mark-read).
pub async fn reset_unread(db: &Database, id: i64) -> Result<(), TetherError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE dialogs SET unread_count = 0 WHERE id = ?1",
                params![id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Aggregate unread count over all dialogs.
pub async fn total_unread(db: &Database) -> Result<i64, TetherError> {
    db.connection()
        .call(move |conn| {
            let total = conn.query_row(
                "SELECT COALESCE(SUM(unread_count), 0) FROM dialogs",
                [],
                |row| row.get(0),
            )?;
            Ok(total)
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

    fn make_dialog(id: i64, at: i64, unread: i64) -> Dialog {
        Dialog {
            id,
            title: format!("chat {id}"),
            last_message_preview: "hello".to_string(),
            last_message_at: at,
            unread_count: unread,
        }
    }

    #[tokio::test]
    async fn upsert_then_get_round_trips() {
        let (db, _dir) = setup_db().await;
        let dialog = make_dialog(1, 1_000, 2);
        upsert_dialog(&db, &dialog).await.unwrap();

        let got = get_dialog(&db, 1).await.unwrap().unwrap();
        assert_eq!(got, dialog);
    }

    #[tokio::test]
    async fn upsert_replaces_but_keeps_newest_timestamp() {
        let (db, _dir) = setup_db().await;
        upsert_dialog(&db, &make_dialog(1, 5_000, 0)).await.unwrap();

        // A stale snapshot must not move last_message_at backwards.
        let mut stale = make_dialog(1, 1_000, 3);
        stale.title = "renamed".to_string();
        upsert_dialog(&db, &stale).await.unwrap();

        let got = get_dialog(&db, 1).await.unwrap().unwrap();
        assert_eq!(got.title, "renamed");
        assert_eq!(got.last_message_at, 5_000);
        assert_eq!(got.unread_count, 3);
    }

    #[tokio::test]
    async fn list_orders_by_last_message_desc() {
        let (db, _dir) = setup_db().await;
        upsert_dialog(&db, &make_dialog(1, 100, 0)).await.unwrap();
        upsert_dialog(&db, &make_dialog(2, 300, 0)).await.unwrap();
        upsert_dialog(&db, &make_dialog(3, 200, 0)).await.unwrap();

        let dialogs = list_dialogs(&db).await.unwrap();
        let ids: Vec<i64> = dialogs.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[tokio::test]
    async fn ensure_dialog_does_not_disturb_existing_row() {
        let (db, _dir) = setup_db().await;
        upsert_dialog(&db, &make_dialog(7, 100, 4)).await.unwrap();
        ensure_dialog(&db, 7).await.unwrap();

        let got = get_dialog(&db, 7).await.unwrap().unwrap();
        assert_eq!(got.unread_count, 4);
        assert_eq!(got.title, "chat 7");
    }

    #[tokio::test]
    async fn unread_counter_lifecycle() {
        let (db, _dir) = setup_db().await;
        ensure_dialog(&db, 1).await.unwrap();
        ensure_dialog(&db, 2).await.unwrap();

        increment_unread(&db, 1).await.unwrap();
        increment_unread(&db, 1).await.unwrap();
        increment_unread(&db, 2).await.unwrap();
        assert_eq!(total_unread(&db).await.unwrap(), 3);

        reset_unread(&db, 1).await.unwrap();
        assert_eq!(total_unread(&db).await.unwrap(), 1);
        assert_eq!(get_dialog(&db, 1).await.unwrap().unwrap().unread_count, 0);
    }

    #[tokio::test]
    async fn touch_only_moves_forward() {
        let (db, _dir) = setup_db().await;
        upsert_dialog(&db, &make_dialog(1, 500, 0)).await.unwrap();

        touch_last_message(&db, 1, "newer", 900).await.unwrap();
        let got = get_dialog(&db, 1).await.unwrap().unwrap();
        assert_eq!(got.last_message_at, 900);
        assert_eq!(got.last_message_preview, "newer");

        touch_last_message(&db, 1, "older", 100).await.unwrap();
        let got = get_dialog(&db, 1).await.unwrap().unwrap();
        assert_eq!(got.last_message_at, 900);
    }
}
