// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end test harness.
//!
//! Assembles the full core stack (temp SQLite database, bridge, media
//! cache, sync engine) around stub collaborators, the same way the binary's
//! composition root wires the real thing.

use std::sync::Arc;

use tether_bridge::Bridge;
use tether_cache::{FsMediaStore, MediaCache};
use tether_config::model::{CacheConfig, SyncConfig};
use tether_core::TetherError;
use tether_storage::Database;
use tether_sync::SyncEngine;

use crate::stub_gateway::StubGateway;

/// A fully wired core over stub collaborators.
pub struct Harness {
    pub db: Arc<Database>,
    pub bridge: Arc<Bridge>,
    pub gateway: Arc<StubGateway>,
    pub cache: Arc<MediaCache>,
    pub engine: Arc<SyncEngine>,
    _tempdir: tempfile::TempDir,
}

impl Harness {
    /// Build a harness with default config values.
    pub async fn new() -> Result<Self, TetherError> {
        Self::with_config(SyncConfig::default(), CacheConfig::default()).await
    }

    /// Build a harness with explicit sync/cache settings. The cache
    /// directory setting is ignored; media always lands in the temp dir.
    pub async fn with_config(
        sync: SyncConfig,
        cache_config: CacheConfig,
    ) -> Result<Self, TetherError> {
        let tempdir = tempfile::tempdir().map_err(|e| TetherError::Storage {
            source: Box::new(e),
        })?;
        let db_path = tempdir.path().join("tether.db");
        let db = Arc::new(
            Database::open(db_path.to_str().ok_or_else(|| {
                TetherError::Internal("temp path is not valid UTF-8".into())
            })?)
            .await?,
        );

        let bridge = Arc::new(Bridge::new());
        let gateway = StubGateway::new();
        let store = Arc::new(FsMediaStore::new(tempdir.path().join("media"))?);
        let cache = Arc::new(MediaCache::new(
            db.clone(),
            store,
            bridge.clone(),
            cache_config.quota_bytes,
        ));
        let engine =
            SyncEngine::new(db.clone(), gateway.clone(), bridge.clone(), sync).await?;

        Ok(Self {
            db,
            bridge,
            gateway,
            cache,
            engine,
            _tempdir: tempdir,
        })
    }
}
