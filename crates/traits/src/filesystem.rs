//! Directory-backed store.
//!
//! Each identifier maps to one file under the base directory. Fetches hand
//! back an open file as a stream so large payloads are never buffered here.

use crate::ident::is_safe_identifier;
use crate::store::{Fetched, Store, StoreError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Filesystem-based store backend
#[derive(Debug)]
pub struct FilesystemStore {
    base_path: PathBuf,
}

impl FilesystemStore {
    /// Creates the store, creating the base directory if it doesn't exist.
    pub async fn new(base_path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let base_path = base_path.into();
        tokio::fs::create_dir_all(&base_path).await.map_err(|e| {
            StoreError::Backend(format!(
                "failed to create store directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(Self { base_path })
    }

    pub fn base(&self) -> &Path {
        &self.base_path
    }

    fn file_path(&self, id: &str) -> Result<PathBuf, StoreError> {
        if !is_safe_identifier(id) {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(self.base_path.join(id))
    }
}

#[async_trait]
impl Store for FilesystemStore {
    async fn fetch(&self, id: &str) -> Result<Fetched, StoreError> {
        let path = self.file_path(id)?;
        match tokio::fs::File::open(&path).await {
            Ok(file) => Ok(Fetched::Reader(Box::new(file))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(id.to_string()))
            }
            Err(e) => Err(StoreError::Backend(format!(
                "failed to open {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn store(&self, id: &str, data: Fetched) -> Result<(), StoreError> {
        let path = self.file_path(id)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        match data {
            Fetched::Bytes(bytes) => tokio::fs::write(&path, bytes).await?,
            Fetched::Reader(mut reader) => {
                let mut file = tokio::fs::File::create(&path).await?;
                tokio::io::copy(&mut reader, &mut file).await?;
            }
        }

        tracing::debug!("stored {} at {}", id, path.display());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "FilesystemStore"
    }
}
