// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The sync engine: canonical owner of local dialog/message state.
//!
//! Reconciles locally authored intent (optimistic sends) with remote truth
//! (gateway snapshots, pushes, the incoming stream). All dialog and message
//! rows are mutated exclusively through this engine; every mutation is a
//! keyed upsert so concurrent writers serialize per logical row.

use std::sync::{Arc, Mutex as StdMutex};

use dashmap::DashMap;
use tether_bridge::{Bridge, WebEvent};
use tether_config::model::SyncConfig;
use tether_core::types::now_ms;
use tether_core::{
    ChatMessage, Dialog, IncomingMessage, MessageStatus, RemoteGateway, SyncCheckpoint,
    TetherError,
};
use tether_storage::queries::{dialogs, messages, sync_state};
use tether_storage::Database;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::ids::LocalIdGenerator;

/// Snapshot of engine health for status surfaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncStatus {
    pub last_sync: Option<SyncCheckpoint>,
    pub unread_total: i64,
}

/// Canonical local state owner; see module docs.
pub struct SyncEngine {
    db: Arc<Database>,
    gateway: Arc<dyn RemoteGateway>,
    bridge: Arc<Bridge>,
    config: SyncConfig,
    ids: LocalIdGenerator,
    dialogs_view: watch::Sender<Vec<Dialog>>,
    message_views: DashMap<i64, watch::Sender<Vec<ChatMessage>>>,
    /// Optional outlet for media prefetch decisions; the composition root
    /// connects it to the download pipeline.
    prefetch_tx: StdMutex<Option<mpsc::UnboundedSender<String>>>,
}

impl SyncEngine {
    /// Build the engine and prime the live dialog view from local storage.
    pub async fn new(
        db: Arc<Database>,
        gateway: Arc<dyn RemoteGateway>,
        bridge: Arc<Bridge>,
        config: SyncConfig,
    ) -> Result<Arc<Self>, TetherError> {
        let current = dialogs::list_dialogs(&db).await?;
        let (dialogs_view, _) = watch::channel(current);
        Ok(Arc::new(Self {
            db,
            gateway,
            bridge,
            config,
            ids: LocalIdGenerator::new(),
            dialogs_view,
            message_views: DashMap::new(),
            prefetch_tx: StdMutex::new(None),
        }))
    }

    /// Route media file ids of newly ingested messages into `tx`.
    pub fn set_prefetch_channel(&self, tx: mpsc::UnboundedSender<String>) {
        *self.prefetch_tx.lock().expect("prefetch lock poisoned") = Some(tx);
    }

    /// Live dialog list, sorted by last-message time descending. The view
    /// updates on every local write.
    pub fn observe_dialog_list(&self) -> watch::Receiver<Vec<Dialog>> {
        self.dialogs_view.subscribe()
    }

    /// Live message list for one dialog, newest first.
    pub async fn observe_messages(
        &self,
        dialog_id: i64,
    ) -> Result<watch::Receiver<Vec<ChatMessage>>, TetherError> {
        if let Some(view) = self.message_views.get(&dialog_id) {
            return Ok(view.subscribe());
        }
        let current = messages::list_messages(&self.db, dialog_id, None).await?;
        let view = self
            .message_views
            .entry(dialog_id)
            .or_insert_with(move || watch::channel(current).0);
        Ok(view.subscribe())
    }

    async fn refresh_dialog_view(&self) -> Result<(), TetherError> {
        let current = dialogs::list_dialogs(&self.db).await?;
        self.dialogs_view.send_replace(current);
        Ok(())
    }

    async fn refresh_message_view(&self, dialog_id: i64) -> Result<(), TetherError> {
        // Clone the sender out of the map; the shard guard must not be
        // held across the query await.
        let Some(view) = self.message_views.get(&dialog_id).map(|v| v.clone()) else {
            return Ok(());
        };
        let current = messages::list_messages(&self.db, dialog_id, None).await?;
        view.send_replace(current);
        Ok(())
    }

    /// Send a message: optimistic `pending` write, gateway call, then the
    /// `sent`/`failed` transition.
    ///
    /// The pending row is visible to observers before the gateway responds.
    /// Gateway failures mark the row `failed` and propagate; a fresh call
    /// creates a new message rather than retrying a failed one.
    pub async fn send_message(
        &self,
        dialog_id: i64,
        text: &str,
    ) -> Result<ChatMessage, TetherError> {
        if dialogs::get_dialog(&self.db, dialog_id).await?.is_none() {
            return Err(TetherError::NotFound {
                entity: "dialog",
                id: dialog_id.to_string(),
            });
        }

        let local_id = self.ids.next_id();
        let now = now_ms();
        let pending = ChatMessage {
            local_id,
            remote_id: None,
            dialog_id,
            sender_id: self.config.self_user_id,
            text: text.to_string(),
            status: MessageStatus::Pending,
            created_at: now,
            updated_at: now,
            media_file_id: None,
        };
        messages::insert_message(&self.db, &pending).await?;
        dialogs::touch_last_message(&self.db, dialog_id, text, now).await?;
        self.refresh_message_view(dialog_id).await?;
        self.refresh_dialog_view().await?;

        match self.gateway.send_message(dialog_id, text).await {
            Ok(remote_id) => {
                messages::mark_sent(&self.db, local_id, remote_id, now_ms()).await?;
                self.refresh_message_view(dialog_id).await?;
                debug!(local_id, remote_id, dialog_id, "message sent");
                messages::get_message(&self.db, local_id)
                    .await?
                    .ok_or(TetherError::NotFound {
                        entity: "message",
                        id: local_id.to_string(),
                    })
            }
            Err(e) => {
                warn!(local_id, dialog_id, error = %e, "send failed");
                messages::mark_failed(&self.db, local_id, now_ms()).await?;
                self.refresh_message_view(dialog_id).await?;
                Err(e)
            }
        }
    }

    /// Shared ingestion path for pushes and the incoming stream.
    ///
    /// Returns `true` if the message was new. Duplicate deliveries are
    /// detected by remote id and leave the unread counter untouched.
    async fn ingest_remote(
        &self,
        dialog_id: i64,
        remote_id: i64,
        sender_id: i64,
        text: &str,
        created_at: i64,
        media_file_id: Option<&str>,
    ) -> Result<bool, TetherError> {
        dialogs::ensure_dialog(&self.db, dialog_id).await?;
        let message = ChatMessage {
            local_id: self.ids.next_id(),
            remote_id: Some(remote_id),
            dialog_id,
            sender_id,
            text: text.to_string(),
            status: MessageStatus::Received,
            created_at,
            updated_at: now_ms(),
            media_file_id: media_file_id.map(str::to_string),
        };
        let inserted = messages::upsert_received(&self.db, &message).await?;
        if !inserted {
            debug!(dialog_id, remote_id, "duplicate remote message ignored");
            return Ok(false);
        }

        dialogs::increment_unread(&self.db, dialog_id).await?;
        dialogs::touch_last_message(&self.db, dialog_id, text, created_at).await?;
        if let Some(file_id) = media_file_id {
            let tx = self.prefetch_tx.lock().expect("prefetch lock poisoned");
            if let Some(tx) = &*tx {
                let _ = tx.send(file_id.to_string());
            }
        }
        self.bridge
            .post_to_web(WebEvent::push_message_received(dialog_id, remote_id, text));
        self.refresh_message_view(dialog_id).await?;
        self.refresh_dialog_view().await?;
        Ok(true)
    }

    /// Idempotent upsert of a pushed message preview.
    ///
    /// Invoked from push processing, possibly repeatedly for the same
    /// message id; only the first delivery counts toward unread.
    pub async fn ingest_push_message(
        &self,
        dialog_id: i64,
        message_id: i64,
        preview: &str,
    ) -> Result<bool, TetherError> {
        self.ingest_remote(dialog_id, message_id, 0, preview, now_ms(), None)
            .await
    }

    /// Ingest one message from the gateway's incoming stream.
    pub async fn ingest_incoming(&self, incoming: &IncomingMessage) -> Result<bool, TetherError> {
        self.ingest_remote(
            incoming.chat_id,
            incoming.message_id,
            incoming.sender_user_id,
            &incoming.text,
            incoming.created_at,
            incoming.media_file_id.as_deref(),
        )
        .await
    }

    /// Coarse per-dialog mark-read: resets the unread counter to zero.
    /// The message id is accepted for interface symmetry; per-message
    /// granularity is not tracked.
    pub async fn mark_read(&self, dialog_id: i64, _message_id: i64) -> Result<(), TetherError> {
        dialogs::reset_unread(&self.db, dialog_id).await?;
        self.refresh_dialog_view().await
    }

    /// Full reconciliation pass against the gateway.
    ///
    /// Fetches a bounded dialog snapshot, upserts every returned dialog,
    /// recomputes the aggregate unread count, emits a `SYNC_STATE` event,
    /// and persists a checkpoint for `reason`. Gateway failures propagate;
    /// the job layer owns retry policy.
    pub async fn sync_now(&self, reason: &str) -> Result<SyncStatus, TetherError> {
        self.gateway.synchronize(reason).await?;
        let snapshot = self
            .gateway
            .fetch_dialogs(self.config.dialog_page_size)
            .await?;
        let fetched = snapshot.len();

        for dialog in snapshot {
            dialogs::upsert_dialog(
                &self.db,
                &Dialog {
                    id: dialog.chat_id,
                    title: dialog.title,
                    last_message_preview: dialog.last_message_preview,
                    last_message_at: dialog.last_message_at,
                    unread_count: dialog.unread_count,
                },
            )
            .await?;
        }

        let unread_total = dialogs::total_unread(&self.db).await?;
        let now = now_ms();
        sync_state::record_last_sync(&self.db, reason, now).await?;
        self.bridge
            .post_to_web(WebEvent::sync_state(now, unread_total));
        self.refresh_dialog_view().await?;
        info!(reason, fetched, unread_total, "sync pass complete");

        Ok(SyncStatus {
            last_sync: Some(SyncCheckpoint {
                reason: reason.to_string(),
                at: now,
            }),
            unread_total,
        })
    }

    /// Consume the gateway's incoming stream for the life of the process.
    pub async fn spawn_incoming_loop(
        self: &Arc<Self>,
    ) -> Result<tokio::task::JoinHandle<()>, TetherError> {
        let mut rx = self.gateway.observe_incoming().await?;
        let engine = Arc::clone(self);
        Ok(tokio::spawn(async move {
            while let Some(incoming) = rx.recv().await {
                if let Err(e) = engine.ingest_incoming(&incoming).await {
                    warn!(error = %e, "failed to ingest incoming message");
                }
            }
            debug!("incoming stream closed");
        }))
    }

    /// Checkpoint and unread totals for status surfaces.
    pub async fn status(&self) -> Result<SyncStatus, TetherError> {
        Ok(SyncStatus {
            last_sync: sync_state::last_sync(&self.db).await?,
            unread_total: dialogs::total_unread(&self.db).await?,
        })
    }
}
