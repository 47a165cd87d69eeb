// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Opaque storage capability backing the media cache.

use std::path::{Path, PathBuf};
use std::pin::Pin;

use async_trait::async_trait;
use tokio::io::AsyncRead;

/// A readable byte stream handed to or returned by the store.
pub type ByteStream = Pin<Box<dyn AsyncRead + Send>>;

use crate::error::TetherError;

/// Narrow storage capability for media bytes.
///
/// Encryption at rest is a property of the implementation, not of the
/// cache's eviction logic. The cache never constructs paths itself; it only
/// round-trips paths returned by `write`.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Streams `source` into a newly allocated, uniquely named slot and
    /// returns its path. Distinct calls with the same key must not collide.
    async fn write(&self, key: &str, source: ByteStream) -> Result<PathBuf, TetherError>;

    /// Opens a previously written slot for reading.
    async fn read(&self, path: &Path) -> Result<ByteStream, TetherError>;

    /// Deletes a slot. Deleting a missing slot is not an error.
    async fn delete(&self, path: &Path) -> Result<(), TetherError>;
}
