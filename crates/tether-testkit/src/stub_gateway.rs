// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted in-memory gateway for deterministic testing.
//!
//! Send results pop from a FIFO script; when the script is empty a send
//! succeeds with an auto-assigned remote id. Sends can be gated behind a
//! semaphore so tests can observe the optimistic window while a send is
//! in flight.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tether_core::{DialogSnapshot, IncomingMessage, RemoteGateway, TetherError};
use tokio::sync::{mpsc, watch, Semaphore};

/// A stub implementation of [`RemoteGateway`].
pub struct StubGateway {
    dialogs: Mutex<Vec<DialogSnapshot>>,
    send_script: Mutex<VecDeque<Result<i64, String>>>,
    sync_script: Mutex<VecDeque<Result<(), String>>>,
    sent: Mutex<Vec<(i64, String)>>,
    sync_calls: Mutex<Vec<String>>,
    next_remote_id: AtomicI64,
    incoming_tx: Mutex<Option<mpsc::Sender<IncomingMessage>>>,
    send_gate: Mutex<Option<Arc<Semaphore>>>,
    send_started: watch::Sender<u64>,
}

impl StubGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            dialogs: Mutex::new(Vec::new()),
            send_script: Mutex::new(VecDeque::new()),
            sync_script: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
            sync_calls: Mutex::new(Vec::new()),
            next_remote_id: AtomicI64::new(1_000),
            incoming_tx: Mutex::new(None),
            send_gate: Mutex::new(None),
            send_started: watch::channel(0).0,
        })
    }

    /// Replace the dialog snapshot returned by `fetch_dialogs`.
    pub fn set_dialogs(&self, dialogs: Vec<DialogSnapshot>) {
        *self.dialogs.lock().unwrap() = dialogs;
    }

    /// Script the outcome of the next unscripted `send_message` call.
    pub fn script_send(&self, result: Result<i64, &str>) {
        self.send_script
            .lock()
            .unwrap()
            .push_back(result.map_err(str::to_string));
    }

    /// Script the outcome of the next `synchronize` call.
    pub fn script_sync(&self, result: Result<(), &str>) {
        self.sync_script
            .lock()
            .unwrap()
            .push_back(result.map_err(str::to_string));
    }

    /// Gate sends behind a semaphore with zero permits. Each
    /// `add_permits(1)` releases one in-flight send.
    pub fn gate_sends(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.send_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Wait until at least `n` sends have entered the gateway.
    pub async fn wait_sends_started(&self, n: u64) {
        let mut rx = self.send_started.subscribe();
        while *rx.borrow() < n {
            rx.changed().await.expect("stub gateway dropped");
        }
    }

    /// Messages the engine has pushed through this gateway.
    pub fn sent_messages(&self) -> Vec<(i64, String)> {
        self.sent.lock().unwrap().clone()
    }

    /// Reasons passed to `synchronize`, in call order.
    pub fn sync_reasons(&self) -> Vec<String> {
        self.sync_calls.lock().unwrap().clone()
    }

    /// Feed one message into the incoming stream. Panics if no observer
    /// has attached yet.
    pub async fn feed_incoming(&self, message: IncomingMessage) {
        let tx = self
            .incoming_tx
            .lock()
            .unwrap()
            .clone()
            .expect("no incoming observer attached");
        tx.send(message).await.expect("incoming receiver dropped");
    }
}

#[async_trait]
impl RemoteGateway for StubGateway {
    async fn observe_incoming(&self) -> Result<mpsc::Receiver<IncomingMessage>, TetherError> {
        let (tx, rx) = mpsc::channel(64);
        *self.incoming_tx.lock().unwrap() = Some(tx);
        Ok(rx)
    }

    async fn fetch_dialogs(&self, limit: u32) -> Result<Vec<DialogSnapshot>, TetherError> {
        let dialogs = self.dialogs.lock().unwrap();
        Ok(dialogs.iter().take(limit as usize).cloned().collect())
    }

    async fn send_message(&self, chat_id: i64, text: &str) -> Result<i64, TetherError> {
        self.send_started.send_modify(|n| *n += 1);
        let gate = self.send_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            let permit = gate.acquire().await.expect("send gate closed");
            permit.forget();
        }

        let scripted = self.send_script.lock().unwrap().pop_front();
        match scripted {
            Some(Err(message)) => Err(TetherError::gateway(message)),
            Some(Ok(remote_id)) => {
                self.sent.lock().unwrap().push((chat_id, text.to_string()));
                Ok(remote_id)
            }
            None => {
                self.sent.lock().unwrap().push((chat_id, text.to_string()));
                Ok(self.next_remote_id.fetch_add(1, Ordering::SeqCst))
            }
        }
    }

    async fn synchronize(&self, reason: &str) -> Result<(), TetherError> {
        let scripted = self.sync_script.lock().unwrap().pop_front();
        if let Some(Err(message)) = scripted {
            return Err(TetherError::gateway(message));
        }
        self.sync_calls.lock().unwrap().push(reason.to_string());
        Ok(())
    }
}
