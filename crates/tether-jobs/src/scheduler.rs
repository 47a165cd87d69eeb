// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Background job scheduler.
//!
//! Two job kinds: a periodic sync pass gated on network connectivity, and
//! push-processing jobs consumed one at a time from a serial queue. Both
//! treat failure as a retryable outcome with exponential backoff; neither
//! ever reports a permanent failure. Cancelling the periodic schedule never
//! affects work that has already started; in-flight push jobs run to
//! completion.

use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use metrics::counter;
use tether_bridge::{Bridge, WebEvent};
use tether_config::model::JobsConfig;
use tether_core::{NetworkMonitor, PushPayload, TetherError};
use tether_sync::SyncEngine;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::retry::{JobOutcome, RetryPolicy};

/// Drives periodic and push-triggered sync under network constraints.
pub struct JobScheduler {
    engine: Arc<SyncEngine>,
    network: Arc<dyn NetworkMonitor>,
    bridge: Arc<Bridge>,
    policy: RetryPolicy,
    interval: Duration,
    periodic: StdMutex<Option<CancellationToken>>,
    push_tx: mpsc::UnboundedSender<PushPayload>,
    shutdown: CancellationToken,
}

impl JobScheduler {
    /// Build the scheduler and start its push worker and network watcher.
    /// The periodic job does not run until [`schedule_periodic`] is called.
    ///
    /// [`schedule_periodic`]: JobScheduler::schedule_periodic
    pub fn new(
        engine: Arc<SyncEngine>,
        network: Arc<dyn NetworkMonitor>,
        bridge: Arc<Bridge>,
        config: &JobsConfig,
    ) -> Arc<Self> {
        let (push_tx, push_rx) = mpsc::unbounded_channel();
        let scheduler = Arc::new(Self {
            engine,
            network,
            bridge,
            policy: RetryPolicy::from_config(config),
            interval: Duration::from_secs(config.periodic_interval_secs),
            periodic: StdMutex::new(None),
            push_tx,
            shutdown: CancellationToken::new(),
        });
        scheduler.spawn_push_worker(push_rx);
        scheduler.spawn_network_watcher();
        scheduler
    }

    /// Start (or restart) the periodic sync job.
    ///
    /// Re-scheduling replaces the pending schedule instead of duplicating
    /// it: the previous schedule is cancelled, already-started work is not.
    pub fn schedule_periodic(self: &Arc<Self>) {
        let token = CancellationToken::new();
        let previous = self
            .periodic
            .lock()
            .expect("scheduler lock poisoned")
            .replace(token.clone());
        if let Some(previous) = previous {
            previous.cancel();
            debug!("replaced pending periodic schedule");
        }

        let this = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(this.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // interval's first tick completes immediately; consume it so
            // the job runs on the interval, not at schedule time.
            ticker.tick().await;
            info!(interval = ?this.interval, "periodic sync scheduled");
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = this.shutdown.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                if !this.network.is_online() {
                    debug!("skipping periodic sync: offline");
                    continue;
                }
                this.run_periodic_once(&token).await;
            }
            debug!("periodic sync schedule stopped");
        });
    }

    /// Cancel the pending periodic schedule. Already-started work finishes.
    pub fn cancel_periodic(&self) {
        if let Some(token) = self
            .periodic
            .lock()
            .expect("scheduler lock poisoned")
            .take()
        {
            token.cancel();
        }
    }

    /// Enqueue an inbound push payload for processing. Payloads are
    /// processed strictly one at a time, in submission order.
    pub fn submit_push(&self, payload: PushPayload) -> Result<(), TetherError> {
        self.push_tx
            .send(payload)
            .map_err(|_| TetherError::Internal("push worker has shut down".into()))
    }

    /// Stop intake and pending schedules. In-flight jobs run to completion
    /// unless they are between retry attempts.
    pub fn stop(&self) {
        self.cancel_periodic();
        self.shutdown.cancel();
    }

    async fn run_periodic_once(&self, token: &CancellationToken) {
        let mut attempt = 0;
        loop {
            match self.engine.sync_now("periodic").await {
                Ok(_) => return,
                Err(e) => {
                    counter!("tether_jobs_retries_total", "job" => "periodic").increment(1);
                    let delay = self.policy.delay(attempt);
                    warn!(attempt, ?delay, error = %e, "periodic sync failed, will retry");
                    attempt += 1;
                    tokio::select! {
                        _ = token.cancelled() => return,
                        _ = self.shutdown.cancelled() => return,
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }
    }

    fn spawn_push_worker(self: &Arc<Self>, mut rx: mpsc::UnboundedReceiver<PushPayload>) {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                let payload = tokio::select! {
                    _ = this.shutdown.cancelled() => break,
                    next = rx.recv() => match next {
                        Some(payload) => payload,
                        None => break,
                    },
                };

                let mut attempt = 0;
                loop {
                    match this.process_push(&payload).await {
                        JobOutcome::Done => break,
                        JobOutcome::Retry => {
                            counter!("tether_jobs_retries_total", "job" => "push").increment(1);
                            let delay = this.policy.delay(attempt);
                            warn!(attempt, ?delay, "push processing failed, will retry");
                            attempt += 1;
                            tokio::select! {
                                _ = this.shutdown.cancelled() => return,
                                _ = tokio::time::sleep(delay) => {}
                            }
                        }
                    }
                }
            }
            debug!("push worker stopped");
        });
    }

    /// One push-processing pass: ingest the pushed message, then a full
    /// sync. Malformed payloads are dropped, not retried; processing
    /// errors report `Retry`.
    async fn process_push(&self, payload: &PushPayload) -> JobOutcome {
        let chat_id = payload.get("chatId").and_then(|v| v.parse::<i64>().ok());
        let message_id = payload.get("messageId").and_then(|v| v.parse::<i64>().ok());
        let (Some(chat_id), Some(message_id)) = (chat_id, message_id) else {
            warn!(?payload, "dropping malformed push payload");
            return JobOutcome::Done;
        };
        let preview = payload.get("preview").map(String::as_str).unwrap_or("");

        if let Err(e) = self
            .engine
            .ingest_push_message(chat_id, message_id, preview)
            .await
        {
            warn!(chat_id, message_id, error = %e, "push ingestion failed");
            return JobOutcome::Retry;
        }
        if let Err(e) = self.engine.sync_now("push").await {
            warn!(error = %e, "post-push sync failed");
            return JobOutcome::Retry;
        }
        JobOutcome::Done
    }

    fn spawn_network_watcher(self: &Arc<Self>) {
        let mut rx = self.network.subscribe();
        let this = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = this.shutdown.cancelled() => break,
                    changed = rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let online = *rx.borrow_and_update();
                        debug!(online, "network state changed");
                        this.bridge.post_to_web(WebEvent::network_state(online));
                    }
                }
            }
        });
    }
}
