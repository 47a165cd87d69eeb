// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plain-filesystem implementation of the [`MediaStore`] capability.
//!
//! Slots are uuid-named files under a single directory, so repeated writes
//! for the same key never collide. An encrypted store would implement the
//! same trait; nothing in the cache logic changes.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tether_core::traits::media_store::{ByteStream, MediaStore};
use tether_core::TetherError;
use tokio::fs;
use tracing::trace;
use uuid::Uuid;

/// Filesystem-backed media store.
pub struct FsMediaStore {
    root: PathBuf,
}

impl FsMediaStore {
    /// Create a store rooted at `root`, creating the directory if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, TetherError> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .map_err(|e| TetherError::cache_io(format!("create {}", root.display()), e))?;
        Ok(Self { root })
    }
}

#[async_trait]
impl MediaStore for FsMediaStore {
    async fn write(&self, key: &str, mut source: ByteStream) -> Result<PathBuf, TetherError> {
        let slot = self.root.join(format!("{}.bin", Uuid::new_v4()));
        let mut file = fs::File::create(&slot)
            .await
            .map_err(|e| TetherError::cache_io(format!("create slot for {key}"), e))?;
        let written = tokio::io::copy(&mut source, &mut file)
            .await
            .map_err(|e| TetherError::cache_io(format!("write slot for {key}"), e))?;
        file.sync_all()
            .await
            .map_err(|e| TetherError::cache_io(format!("sync slot for {key}"), e))?;
        trace!(key, written, path = %slot.display(), "media slot written");
        Ok(slot)
    }

    async fn read(&self, path: &Path) -> Result<ByteStream, TetherError> {
        let file = fs::File::open(path)
            .await
            .map_err(|e| TetherError::cache_io(format!("open {}", path.display()), e))?;
        Ok(Box::pin(file))
    }

    async fn delete(&self, path: &Path) -> Result<(), TetherError> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(TetherError::cache_io(format!("delete {}", path.display()), e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    fn stream(bytes: &[u8]) -> ByteStream {
        Box::pin(std::io::Cursor::new(bytes.to_vec()))
    }

    #[tokio::test]
    async fn write_read_delete_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsMediaStore::new(dir.path().join("media")).unwrap();

        let path = store.write("f1", stream(b"hello media")).await.unwrap();
        assert!(path.exists());

        let mut reader = store.read(&path).await.unwrap();
        let mut contents = Vec::new();
        reader.read_to_end(&mut contents).await.unwrap();
        assert_eq!(contents, b"hello media");

        store.delete(&path).await.unwrap();
        assert!(!path.exists());
        // Deleting a missing slot is not an error.
        store.delete(&path).await.unwrap();
    }

    #[tokio::test]
    async fn same_key_gets_distinct_slots() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsMediaStore::new(dir.path().join("media")).unwrap();

        let a = store.write("f1", stream(b"one")).await.unwrap();
        let b = store.write("f1", stream(b"two")).await.unwrap();
        assert_ne!(a, b);
        assert!(a.exists() && b.exists());
    }
}
