// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Host-environment adapters.
//!
//! A mobile embedding supplies real implementations of the gateway and
//! network monitor (the platform's chat protocol stack and connectivity
//! callbacks). The standalone binary runs with the placeholders here: a
//! gateway that has no remote peer and a network monitor the host process
//! can flip.

use async_trait::async_trait;
use tether_core::{
    DialogSnapshot, IncomingMessage, NetworkMonitor, RemoteGateway, TetherError,
};
use tokio::sync::{mpsc, watch};

/// Connectivity monitor fed by the host process.
///
/// Starts online; an embedding wires platform connectivity callbacks to
/// [`set_online`](HostNetwork::set_online).
pub struct HostNetwork {
    state: watch::Sender<bool>,
}

impl HostNetwork {
    pub fn new() -> Self {
        Self {
            state: watch::channel(true).0,
        }
    }

    #[allow(dead_code)] // called by embeddings, not by the standalone binary
    pub fn set_online(&self, online: bool) {
        self.state.send_replace(online);
    }
}

impl NetworkMonitor for HostNetwork {
    fn is_online(&self) -> bool {
        *self.state.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.state.subscribe()
    }
}

/// Gateway with no remote peer.
///
/// `fetch_dialogs` returns the empty snapshot and the incoming stream
/// never yields, so the core runs fully against local state. Sends fail
/// explicitly rather than pretending to deliver.
pub struct NullGateway;

#[async_trait]
impl RemoteGateway for NullGateway {
    async fn observe_incoming(&self) -> Result<mpsc::Receiver<IncomingMessage>, TetherError> {
        let (tx, rx) = mpsc::channel(1);
        // Keep the sender alive so the stream stays open but silent.
        tokio::spawn(async move {
            tx.closed().await;
        });
        Ok(rx)
    }

    async fn fetch_dialogs(&self, _limit: u32) -> Result<Vec<DialogSnapshot>, TetherError> {
        Ok(Vec::new())
    }

    async fn send_message(&self, _chat_id: i64, _text: &str) -> Result<i64, TetherError> {
        Err(TetherError::gateway("no remote protocol adapter configured"))
    }

    async fn synchronize(&self, _reason: &str) -> Result<(), TetherError> {
        Ok(())
    }
}
