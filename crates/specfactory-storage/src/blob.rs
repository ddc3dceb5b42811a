// SPDX-License-Identifier: MIT OR Apache-2.0
//! Filesystem-backed [`BlobStorage`] with transparent at-rest compression.

use crate::compression::{compress, decompress, Codec, CompressionStats};
use anyhow::{bail, Result};
use async_trait::async_trait;
use specfactory_capability::BlobStorage;
use std::path::PathBuf;
use tokio::sync::Mutex;

/// Stores each key as a file under `root`, preserving `/`-separated keys as
/// nested directories (the `spec.md` §6.2 key layout is itself a path
/// hierarchy). Values are compressed with `codec` before being written.
pub struct FileBlobStorage {
    root: PathBuf,
    codec: Codec,
    stats: Mutex<CompressionStats>,
}

impl FileBlobStorage {
    /// Open storage rooted at `root`, creating it if absent.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, codec: Codec) -> Self {
        Self { root: root.into(), codec, stats: Mutex::new(CompressionStats::default()) }
    }

    /// Snapshot of cumulative compression statistics across every `put`.
    pub async fn stats(&self) -> CompressionStats {
        self.stats.lock().await.clone()
    }

    fn resolve(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.split('/').any(|segment| segment == ".." || segment.is_empty()) {
            bail!("invalid blob key: {key:?}");
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl BlobStorage for FileBlobStorage {
    async fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let stored = compress(self.codec, value)?;
        self.stats.lock().await.record(value.len(), stored.len());
        tokio::fs::write(&path, stored).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.resolve(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(decompress(self.codec, &bytes)?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn append(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut combined = self.get(key).await?.unwrap_or_default();
        combined.extend_from_slice(value);
        self.put(key, &combined).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileBlobStorage::new(dir.path(), Codec::Gzip);
        storage.put("a/b/c.json", b"hello").await.unwrap();
        assert_eq!(storage.get("a/b/c.json").await.unwrap(), Some(b"hello".to_vec()));
    }

    #[tokio::test]
    async fn missing_key_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileBlobStorage::new(dir.path(), Codec::None);
        assert_eq!(storage.get("nope.json").await.unwrap(), None);
    }

    #[tokio::test]
    async fn append_concatenates_onto_existing_value() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileBlobStorage::new(dir.path(), Codec::None);
        storage.append("ledger.jsonl", b"{\"a\":1}\n").await.unwrap();
        storage.append("ledger.jsonl", b"{\"a\":2}\n").await.unwrap();
        let contents = storage.get("ledger.jsonl").await.unwrap().unwrap();
        assert_eq!(contents, b"{\"a\":1}\n{\"a\":2}\n");
    }

    #[tokio::test]
    async fn append_to_a_missing_key_creates_it() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileBlobStorage::new(dir.path(), Codec::None);
        storage.append("new.jsonl", b"line\n").await.unwrap();
        assert_eq!(storage.get("new.jsonl").await.unwrap(), Some(b"line\n".to_vec()));
    }

    #[tokio::test]
    async fn path_traversal_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileBlobStorage::new(dir.path(), Codec::None);
        assert!(storage.put("../escape.json", b"x").await.is_err());
    }

    #[tokio::test]
    async fn put_tracks_compression_stats() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileBlobStorage::new(dir.path(), Codec::Gzip);
        storage.put("x.json", &vec![b'a'; 1_000]).await.unwrap();
        let stats = storage.stats().await;
        assert_eq!(stats.total_original, 1_000);
        assert!(stats.total_stored < 1_000);
    }
}
