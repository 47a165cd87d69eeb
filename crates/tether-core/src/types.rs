// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Tether workspace.
//!
//! Timestamps are UTC epoch milliseconds throughout. Local message
//! identifiers are generated by the sync engine and remain the primary key
//! for a message even after the gateway assigns a remote identifier.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Returns the current UTC time as epoch milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Lifecycle state of a [`ChatMessage`].
///
/// `Pending` is the initial state for locally authored messages only.
/// `Sent` and `Received` are terminal. `Failed` is reached from `Pending`
/// when the gateway rejects a send; a fresh send creates a new message row
/// rather than retrying a failed one.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    Pending,
    Sent,
    Received,
    Failed,
}

/// A chat/conversation summary record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dialog {
    pub id: i64,
    pub title: String,
    pub last_message_preview: String,
    /// Epoch millis of the most recent message, used for list ordering.
    pub last_message_at: i64,
    /// Non-negative unread counter, reset by `mark_read`.
    pub unread_count: i64,
}

/// A single chat message owned by the sync engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Locally generated identifier; primary key for lookup even after a
    /// remote identifier is assigned.
    pub local_id: i64,
    /// Remote identifier assigned by the gateway, if any.
    pub remote_id: Option<i64>,
    pub dialog_id: i64,
    pub sender_id: i64,
    pub text: String,
    pub status: MessageStatus,
    pub created_at: i64,
    pub updated_at: i64,
    /// Media file identifier resolvable through the media cache.
    pub media_file_id: Option<String>,
}

/// A cached media entry tracked by the media cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedMedia {
    /// Stable file identifier, the cache key.
    pub file_id: String,
    pub mime_type: String,
    pub size_bytes: i64,
    /// Local storage path, owned exclusively by the media cache.
    pub local_path: String,
    pub last_accessed_at: i64,
    /// Pinned entries are exempt from automatic eviction.
    pub pinned: bool,
}

/// A message arriving on the gateway's incoming stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub message_id: i64,
    pub chat_id: i64,
    pub sender_user_id: i64,
    pub text: String,
    pub created_at: i64,
    pub media_file_id: Option<String>,
}

/// One dialog as returned by a gateway snapshot fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogSnapshot {
    pub chat_id: i64,
    pub title: String,
    pub unread_count: i64,
    pub last_message_preview: String,
    pub last_message_at: i64,
}

/// Raw key-value payload of an inbound push notification.
pub type PushPayload = HashMap<String, String>;

/// Persisted marker recording the reason and time of the last sync pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncCheckpoint {
    pub reason: String,
    pub at: i64,
}
