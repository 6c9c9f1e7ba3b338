//! Write-once storage of submission bodies
//!
//! Each accepted body is written verbatim to `<root>/<id>.json` before any
//! structured commit is attempted. Files are never overwritten or removed
//! once complete, so a failed commit can always be replayed from here.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum RawStoreError {
    /// Identifier already used; raw payloads are write-once
    #[error("Raw payload {0} already exists")]
    AlreadyExists(Uuid),

    #[error("Raw payload write failed: {0}")]
    Write(#[source] std::io::Error),

    #[error("Raw payload read failed: {0}")]
    Read(#[source] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct RawStore {
    root: PathBuf,
}

impl RawStore {
    /// Use `root` as the payload directory without touching the filesystem
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Create the payload directory if missing
    pub async fn open(root: PathBuf) -> Result<Self, RawStoreError> {
        fs::create_dir_all(&root).await.map_err(RawStoreError::Write)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, id: Uuid) -> PathBuf {
        self.root.join(format!("{}.json", id))
    }

    /// Durably store `body` under `id`
    ///
    /// Returns only after the file contents are synced to disk. A partially
    /// written file is removed before the error is returned.
    pub async fn put(&self, id: Uuid, body: &[u8]) -> Result<(), RawStoreError> {
        let path = self.path_for(id);

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => RawStoreError::AlreadyExists(id),
                _ => RawStoreError::Write(e),
            })?;

        let written = async {
            file.write_all(body).await?;
            file.sync_all().await
        }
        .await;

        if let Err(e) = written {
            drop(file);
            if let Err(cleanup) = fs::remove_file(&path).await {
                tracing::warn!(%id, error = %cleanup, "Failed to remove partial raw payload");
            }
            return Err(RawStoreError::Write(e));
        }

        self.sync_directory().await;
        Ok(())
    }

    /// Read back a stored body
    pub async fn get(&self, id: Uuid) -> Result<Option<Vec<u8>>, RawStoreError> {
        match fs::read(self.path_for(id)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(RawStoreError::Read(e)),
        }
    }

    /// Persist the new directory entry
    #[cfg(unix)]
    async fn sync_directory(&self) {
        let synced = async { fs::File::open(&self.root).await?.sync_all().await }.await;
        if let Err(e) = synced {
            tracing::warn!(root = %self.root.display(), error = %e, "Failed to sync raw payload directory");
        }
    }

    #[cfg(not(unix))]
    async fn sync_directory(&self) {}
}
