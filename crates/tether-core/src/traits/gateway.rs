// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Remote gateway trait abstracting the remote chat protocol client.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::TetherError;
use crate::types::{DialogSnapshot, IncomingMessage};

/// Abstraction over the remote chat protocol.
///
/// Callers depend only on this trait; implementations range from the
/// in-memory stub used in tests to a real protocol client. Gateway failures
/// are transient by taxonomy: they propagate to the caller and the job
/// layer decides retry policy.
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// Opens the incoming-message stream.
    ///
    /// The returned receiver yields remotely authored messages for as long
    /// as the gateway connection lives. Dropping the receiver detaches the
    /// observer without affecting the connection.
    async fn observe_incoming(&self) -> Result<mpsc::Receiver<IncomingMessage>, TetherError>;

    /// Fetches a bounded dialog snapshot, most recently active first.
    async fn fetch_dialogs(&self, limit: u32) -> Result<Vec<DialogSnapshot>, TetherError>;

    /// Sends a message and returns the remote-assigned message identifier.
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<i64, TetherError>;

    /// Triggers a synchronization pass on the remote side.
    async fn synchronize(&self, reason: &str) -> Result<(), TetherError>;
}
