// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Quota-bounded media cache with LRU eviction and pinning.
//!
//! The cache exclusively owns the `media` rows and the files they point at.
//! Writes for the same file id are serialized through per-key locks; the
//! quota check-and-evict sequence is not globally atomic across concurrent
//! `cache()` calls, but eviction never deletes a pinned entry and tracked
//! bytes are recomputed from the row set on every pass.

pub mod fs_store;

use std::path::Path;
use std::sync::Arc;

use dashmap::DashMap;
use metrics::counter;
use tether_bridge::{Bridge, WebEvent};
use tether_core::traits::media_store::{ByteStream, MediaStore};
use tether_core::{CachedMedia, TetherError};
use tether_storage::queries::media;
use tether_storage::Database;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub use fs_store::FsMediaStore;

/// Content-addressed local media cache over a remote file catalog.
pub struct MediaCache {
    db: Arc<Database>,
    store: Arc<dyn MediaStore>,
    bridge: Arc<Bridge>,
    quota_bytes: i64,
    /// Per-key write locks: at most one writer per file id.
    in_flight: DashMap<String, Arc<Mutex<()>>>,
}

impl MediaCache {
    pub fn new(
        db: Arc<Database>,
        store: Arc<dyn MediaStore>,
        bridge: Arc<Bridge>,
        quota_bytes: i64,
    ) -> Self {
        Self {
            db,
            store,
            bridge,
            quota_bytes,
            in_flight: DashMap::new(),
        }
    }

    fn key_lock(&self, file_id: &str) -> Arc<Mutex<()>> {
        self.in_flight
            .entry(file_id.to_string())
            .or_default()
            .clone()
    }

    /// Write `source` into a fresh storage slot and upsert the row for
    /// `file_id`, then enforce the quota.
    ///
    /// A prior entry for the same id is replaced last-write-wins; its
    /// backing file is deleted before the row upsert so no orphan survives
    /// the replace.
    pub async fn cache(
        &self,
        file_id: &str,
        mime_type: &str,
        size_bytes: i64,
        source: ByteStream,
        pinned: bool,
    ) -> Result<CachedMedia, TetherError> {
        let lock = self.key_lock(file_id);
        let result = {
            let _guard = lock.lock().await;
            self.write_entry(file_id, mime_type, size_bytes, source, pinned)
                .await
        };
        // Prune the lock once no other writer holds a clone (count 2 =
        // the map's entry plus ours).
        self.in_flight
            .remove_if(file_id, |_, l| Arc::strong_count(l) == 2);
        result
    }

    async fn write_entry(
        &self,
        file_id: &str,
        mime_type: &str,
        size_bytes: i64,
        source: ByteStream,
        pinned: bool,
    ) -> Result<CachedMedia, TetherError> {
        self.bridge
            .post_to_web(WebEvent::download_progress(file_id, 0, None, None));

        let path = match self.store.write(file_id, source).await {
            Ok(path) => path,
            Err(e) => {
                self.bridge.post_to_web(WebEvent::download_progress(
                    file_id,
                    0,
                    None,
                    Some(&e.to_string()),
                ));
                return Err(e);
            }
        };

        // Delete-on-replace: drop the old backing file before the row
        // flips to the new path.
        if let Some(prev) = media::get_media(&self.db, file_id).await? {
            self.store.delete(Path::new(&prev.local_path)).await?;
            debug!(file_id, old = %prev.local_path, "replaced cached media");
        }

        let entry = CachedMedia {
            file_id: file_id.to_string(),
            mime_type: mime_type.to_string(),
            size_bytes,
            local_path: path.to_string_lossy().into_owned(),
            last_accessed_at: tether_core::types::now_ms(),
            pinned,
        };
        media::upsert_media(&self.db, &entry).await?;

        self.bridge.post_to_web(WebEvent::download_progress(
            file_id,
            100,
            Some(&entry.local_path),
            None,
        ));

        self.evict_if_needed().await?;
        Ok(entry)
    }

    /// Look up a cached file by id, refreshing its LRU position.
    ///
    /// Absence is not an error; it signals "not cached".
    pub async fn resolve(&self, file_id: &str) -> Result<Option<CachedMedia>, TetherError> {
        media::resolve_and_touch(&self.db, file_id, tether_core::types::now_ms()).await
    }

    /// Pin or unpin an entry. Returns `false` when the id is not cached.
    pub async fn set_pinned(&self, file_id: &str, pinned: bool) -> Result<bool, TetherError> {
        media::set_pinned(&self.db, file_id, pinned).await
    }

    /// Evict least-recently-accessed non-pinned entries until the tracked
    /// total fits the quota or no evictable candidates remain.
    ///
    /// If pinned entries alone exceed the quota the overage is accepted and
    /// logged, not reported as an error.
    pub async fn evict_if_needed(&self) -> Result<(), TetherError> {
        loop {
            let total = media::total_size(&self.db).await?;
            if total <= self.quota_bytes {
                return Ok(());
            }
            let Some(candidate) = media::lru_candidate(&self.db).await? else {
                warn!(
                    total,
                    quota = self.quota_bytes,
                    "cache over quota but all entries pinned"
                );
                return Ok(());
            };

            self.store.delete(Path::new(&candidate.local_path)).await?;
            media::delete_media(&self.db, &candidate.file_id).await?;
            counter!("tether_cache_evictions_total").increment(1);
            debug!(
                file_id = %candidate.file_id,
                size = candidate.size_bytes,
                "evicted cached media"
            );
        }
    }

    /// Unconditionally delete every backing file and row, pinned included.
    pub async fn clear_all(&self) -> Result<(), TetherError> {
        let entries = media::list_all(&self.db).await?;
        let count = entries.len();
        for entry in entries {
            self.store.delete(Path::new(&entry.local_path)).await?;
        }
        media::delete_all(&self.db).await?;
        info!(count, "media cache cleared");
        Ok(())
    }

    /// Current tracked footprint in bytes.
    pub async fn total_size(&self) -> Result<i64, TetherError> {
        media::total_size(&self.db).await
    }
}
