// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tether serve` command implementation.
//!
//! The composition root: constructs every core component at startup and
//! passes explicit handles down. Nothing here is globally registered;
//! late-running background jobs receive the engine and cache by reference
//! instead of looking them up.

use std::path::PathBuf;
use std::sync::Arc;

use tether_bridge::{commands, Bridge, WebCommand, WebEvent};
use tether_cache::{FsMediaStore, MediaCache};
use tether_config::model::TetherConfig;
use tether_core::{NetworkMonitor, TetherError};
use tether_jobs::JobScheduler;
use tether_relay::RelayClient;
use tether_storage::Database;
use tether_sync::SyncEngine;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::host::{HostNetwork, NullGateway};

/// Runs the `tether serve` command.
///
/// Wires storage, bridge, cache, sync engine, and scheduler; starts the
/// periodic sync schedule and the incoming-stream consumer; then waits for
/// SIGINT/SIGTERM and shuts down in reverse order.
pub async fn run_serve(config: TetherConfig) -> Result<(), TetherError> {
    init_tracing(&config.log.level);

    info!("starting tether serve");

    let db = Arc::new(
        Database::open_with(&config.storage.database_path, config.storage.wal_mode).await?,
    );
    let bridge = Arc::new(Bridge::new());
    let store = Arc::new(FsMediaStore::new(PathBuf::from(&config.cache.directory))?);
    let cache = Arc::new(MediaCache::new(
        db.clone(),
        store,
        bridge.clone(),
        config.cache.quota_bytes,
    ));

    let network: Arc<dyn NetworkMonitor> = Arc::new(HostNetwork::new());
    let gateway = Arc::new(NullGateway);
    warn!("no remote protocol adapter configured; running against local state only");

    let engine =
        SyncEngine::new(db.clone(), gateway, bridge.clone(), config.sync.clone()).await?;

    // Prefetch decisions flow from ingestion to the download pipeline.
    let (prefetch_tx, prefetch_rx) = mpsc::unbounded_channel();
    engine.set_prefetch_channel(prefetch_tx);
    spawn_prefetch_consumer(cache.clone(), prefetch_rx);

    let incoming = engine.spawn_incoming_loop().await?;

    let scheduler = JobScheduler::new(
        engine.clone(),
        network.clone(),
        bridge.clone(),
        &config.jobs,
    );
    scheduler.schedule_periodic();

    register_ui_handlers(&bridge, &cache, &engine);

    if config.relay.enabled {
        let relay = RelayClient::new(&config.relay)?;
        match relay.health().await {
            Ok(true) => info!(base_url = %config.relay.base_url, "push relay reachable"),
            Ok(false) => warn!(base_url = %config.relay.base_url, "push relay unhealthy"),
            Err(e) => warn!(error = %e, "push relay health probe failed"),
        }
    }

    let cancel = install_signal_handler();
    cancel.cancelled().await;

    scheduler.stop();
    incoming.abort();
    db.close().await?;

    info!("tether serve shutdown complete");
    Ok(())
}

/// Consume media prefetch requests emitted by the sync engine.
///
/// With a remote media source attached this is where downloads start; the
/// standalone binary can only report what is already cached.
fn spawn_prefetch_consumer(
    cache: Arc<MediaCache>,
    mut rx: mpsc::UnboundedReceiver<String>,
) {
    tokio::spawn(async move {
        while let Some(file_id) = rx.recv().await {
            match cache.resolve(&file_id).await {
                Ok(Some(_)) => debug!(file_id = %file_id, "prefetch target already cached"),
                Ok(None) => debug!(file_id = %file_id, "prefetch requested, no media source attached"),
                Err(e) => warn!(file_id = %file_id, error = %e, "prefetch lookup failed"),
            }
        }
    });
}

/// Register handlers for the inbound command vocabulary the core answers.
///
/// Proxy and keep-alive commands are transported to whatever embedding
/// handler registers for them; the core does not interpret those.
fn register_ui_handlers(bridge: &Arc<Bridge>, cache: &Arc<MediaCache>, engine: &Arc<SyncEngine>) {
    let cache = cache.clone();
    let engine = engine.clone();
    let events = bridge.clone();
    bridge.register_command_handler(Arc::new(move |command: &WebCommand| {
        match command.kind.as_str() {
            commands::DOWNLOAD_MEDIA => {
                let Some(file_id) = command.get("fileId").map(str::to_string) else {
                    warn!("DOWNLOAD_MEDIA command without fileId");
                    return;
                };
                let cache = cache.clone();
                let events = events.clone();
                tokio::spawn(async move {
                    match cache.resolve(&file_id).await {
                        Ok(Some(entry)) => events.post_to_web(WebEvent::download_progress(
                            &file_id,
                            100,
                            Some(&entry.local_path),
                            None,
                        )),
                        Ok(None) => events.post_to_web(WebEvent::download_progress(
                            &file_id,
                            0,
                            None,
                            Some("not cached and no media source attached"),
                        )),
                        Err(e) => events.post_to_web(WebEvent::download_progress(
                            &file_id,
                            0,
                            None,
                            Some(&e.to_string()),
                        )),
                    }
                });
            }
            commands::PIN_MEDIA => {
                let Some(file_id) = command.get("fileId").map(str::to_string) else {
                    warn!("PIN_MEDIA command without fileId");
                    return;
                };
                let pinned = command.get("pinned") != Some("false");
                let cache = cache.clone();
                tokio::spawn(async move {
                    match cache.set_pinned(&file_id, pinned).await {
                        Ok(true) => debug!(file_id = %file_id, pinned, "pin state updated"),
                        Ok(false) => warn!(file_id = %file_id, "PIN_MEDIA for unknown file id"),
                        Err(e) => warn!(file_id = %file_id, error = %e, "pin update failed"),
                    }
                });
            }
            commands::GET_OFFLINE_STATUS => {
                let engine = engine.clone();
                let events = events.clone();
                tokio::spawn(async move {
                    match engine.status().await {
                        Ok(status) => {
                            let at = status.last_sync.map(|c| c.at).unwrap_or(0);
                            events.post_to_web(WebEvent::sync_state(at, status.unread_total));
                        }
                        Err(e) => warn!(error = %e, "offline status query failed"),
                    }
                });
            }
            other => {
                debug!(kind = other, "command left to embedding handlers");
            }
        }
    }));
}

/// Installs signal handlers for SIGTERM and SIGINT.
///
/// Returns a [`CancellationToken`] that is cancelled when either signal is
/// received.
fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let mut sigterm = match signal(SignalKind::terminate()) {
                Ok(sigterm) => sigterm,
                Err(e) => {
                    warn!(error = %e, "failed to install SIGTERM handler");
                    let _ = ctrl_c.await;
                    token_clone.cancel();
                    return;
                }
            };

            tokio::select! {
                _ = ctrl_c => {
                    info!("received SIGINT (Ctrl+C), initiating shutdown");
                }
                _ = sigterm.recv() => {
                    info!("received SIGTERM, initiating shutdown");
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
            info!("received Ctrl+C, initiating shutdown");
        }

        token_clone.cancel();
    });

    token
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tether={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
