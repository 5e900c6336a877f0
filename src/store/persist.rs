// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! On-device key-value store for state snapshots.
//!
//! Each key maps to `<dir>/<key>.json`. Writes go to a temporary file that
//! is renamed over the old snapshot, so a crash never leaves a torn file.

use crate::error::AppError;
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};

/// JSON snapshot storage rooted at a directory.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Read the snapshot stored under `key`.
    ///
    /// A missing file is `None`. An unreadable or corrupt file is logged and
    /// also treated as `None` so the app starts from a clean state.
    pub async fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.path_for(key);

        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read snapshot");
                return None;
            }
        };

        match serde_json::from_slice(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Discarding corrupt snapshot");
                None
            }
        }
    }

    /// Replace the snapshot stored under `key`.
    pub async fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), AppError> {
        let data = serde_json::to_vec(value).map_err(|e| AppError::Storage(e.to_string()))?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| AppError::Storage(format!("{}: {}", self.dir.display(), e)))?;

        let path = self.path_for(key);
        // Unique per write so overlapping saves never share a temp file
        let tmp = self
            .dir
            .join(format!(".{}.{}.json.tmp", key, uuid::Uuid::new_v4().simple()));

        tokio::fs::write(&tmp, &data)
            .await
            .map_err(|e| AppError::Storage(format!("{}: {}", tmp.display(), e)))?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(AppError::Storage(format!("{}: {}", path.display(), e)));
        }

        tracing::trace!(key, bytes = data.len(), "Snapshot saved");
        Ok(())
    }
}
