// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event and command payload types crossing the bridge boundary.
//!
//! Payloads are opaque string-keyed maps; the bridge transports them without
//! interpretation. The constructors here cover the core's outbound
//! vocabulary so call sites cannot misspell a key.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// An outbound notification flowing from the core to the UI consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebEvent {
    pub kind: String,
    pub payload: HashMap<String, String>,
}

impl WebEvent {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            payload: HashMap::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    /// A remotely authored message arrived via push or stream.
    pub fn push_message_received(chat_id: i64, message_id: i64, preview: &str) -> Self {
        Self::new("PUSH_MESSAGE_RECEIVED")
            .with("chatId", chat_id.to_string())
            .with("messageId", message_id.to_string())
            .with("preview", preview)
    }

    /// Media download progress. `local_uri` is set on completion, `error`
    /// on failure.
    pub fn download_progress(
        file_id: &str,
        percent: u8,
        local_uri: Option<&str>,
        error: Option<&str>,
    ) -> Self {
        let mut event = Self::new("DOWNLOAD_PROGRESS")
            .with("fileId", file_id)
            .with("percent", percent.to_string());
        if let Some(uri) = local_uri {
            event = event.with("localUri", uri);
        }
        if let Some(message) = error {
            event = event.with("error", message);
        }
        event
    }

    /// Network connectivity changed.
    pub fn network_state(online: bool) -> Self {
        Self::new("NETWORK_STATE").with("online", online.to_string())
    }

    /// A sync pass completed.
    pub fn sync_state(last_sync_at: i64, unread_count: i64) -> Self {
        Self::new("SYNC_STATE")
            .with("lastSyncAt", last_sync_at.to_string())
            .with("unreadCount", unread_count.to_string())
    }
}

/// An inbound command flowing from the UI consumer into the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebCommand {
    pub kind: String,
    pub payload: HashMap<String, String>,
}

impl WebCommand {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            payload: HashMap::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.payload.get(key).map(String::as_str)
    }
}

/// Inbound command kinds the UI layer is known to send. The bridge does not
/// interpret these; handlers match on them.
pub mod commands {
    pub const DOWNLOAD_MEDIA: &str = "DOWNLOAD_MEDIA";
    pub const PIN_MEDIA: &str = "PIN_MEDIA";
    pub const GET_OFFLINE_STATUS: &str = "GET_OFFLINE_STATUS";
    pub const SET_PROXY: &str = "SET_PROXY";
    pub const GET_PROXY_STATUS: &str = "GET_PROXY_STATUS";
    pub const SET_KEEP_ALIVE: &str = "SET_KEEP_ALIVE";
}
