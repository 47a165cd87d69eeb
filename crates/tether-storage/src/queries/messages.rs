// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message CRUD operations.
//!
//! A message keeps its locally generated `local_id` as primary key even
//! after the gateway assigns a remote identifier. Remotely identified
//! messages are deduplicated per dialog through the partial unique index on
//! `(dialog_id, remote_id)`.

use std::str::FromStr;

use rusqlite::params;
use tether_core::{ChatMessage, MessageStatus, TetherError};

use crate::database::{map_tr_err, Database};

const MESSAGE_COLUMNS: &str = "local_id, remote_id, dialog_id, sender_id, text, status, \
                               created_at, updated_at, media_file_id";

fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<ChatMessage> {
    let status: String = row.get(5)?;
    let status = MessageStatus::from_str(&status).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(ChatMessage {
        local_id: row.get(0)?,
        remote_id: row.get(1)?,
        dialog_id: row.get(2)?,
        sender_id: row.get(3)?,
        text: row.get(4)?,
        status,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
        media_file_id: row.get(8)?,
    })
}

/// Insert a new message row as-is (optimistic send path).
pub async fn insert_message(db: &Database, msg: &ChatMessage) -> Result<(), TetherError> {
    let msg = msg.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                &format!("INSERT INTO messages ({MESSAGE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"),
                params![
                    msg.local_id,
                    msg.remote_id,
                    msg.dialog_id,
                    msg.sender_id,
                    msg.text,
                    msg.status.to_string(),
                    msg.created_at,
                    msg.updated_at,
                    msg.media_file_id,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Idempotently upsert a remotely identified message.
///
/// Returns `true` if a new row was inserted, `false` if a row for the same
/// `(dialog_id, remote_id)` already existed. Existing rows are left
/// untouched, so re-delivery of a push cannot double-count.
pub async fn upsert_received(db: &Database, msg: &ChatMessage) -> Result<bool, TetherError> {
    let msg = msg.clone();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                &format!(
                    "INSERT INTO messages ({MESSAGE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                     ON CONFLICT(dialog_id, remote_id) WHERE remote_id IS NOT NULL DO NOTHING"
                ),
                params![
                    msg.local_id,
                    msg.remote_id,
                    msg.dialog_id,
                    msg.sender_id,
                    msg.text,
                    msg.status.to_string(),
                    msg.created_at,
                    msg.updated_at,
                    msg.media_file_id,
                ],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Transition a pending message to `sent`, recording the remote identifier.
pub async fn mark_sent(
    db: &Database,
    local_id: i64,
    remote_id: i64,
    updated_at: i64,
) -> Result<(), TetherError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE messages SET status = 'sent', remote_id = ?2, updated_at = ?3
                 WHERE local_id = ?1 AND status = 'pending'",
                params![local_id, remote_id, updated_at],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Transition a pending message to `failed`.
pub async fn mark_failed(db: &Database, local_id: i64, updated_at: i64) -> Result<(), TetherError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE messages SET status = 'failed', updated_at = ?2
                 WHERE local_id = ?1 AND status = 'pending'",
                params![local_id, updated_at],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Look up a single message by its local identifier.
pub async fn get_message(db: &Database, local_id: i64) -> Result<Option<ChatMessage>, TetherError> {
    db.connection()
        .call(move |conn| {
            use rusqlite::OptionalExtension;
            let msg = conn
                .query_row(
                    &format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE local_id = ?1"),
                    params![local_id],
                    row_to_message,
                )
                .optional()?;
            Ok(msg)
        })
        .await
        .map_err(map_tr_err)
}

/// List messages for a dialog, newest first.
pub async fn list_messages(
    db: &Database,
    dialog_id: i64,
    limit: Option<i64>,
) -> Result<Vec<ChatMessage>, TetherError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages WHERE dialog_id = ?1
                 ORDER BY created_at DESC, local_id DESC LIMIT ?2"
            ))?;
            let rows = stmt.query_map(params![dialog_id, limit.unwrap_or(-1)], row_to_message)?;
            let mut messages = Vec::new();
            for row in rows {
                messages.push(row?);
            }
            Ok(messages)
        })
        .await
        .map_err(map_tr_err)
}
