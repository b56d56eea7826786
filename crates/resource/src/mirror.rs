//! The root directory as a local mirror of the remote store.
//!
//! Identifiers are resolved relative to the root with the same traversal
//! protection the store applies: absolute paths and `..` components never
//! reach the filesystem.

use crate::error::{Kind, ResourceError};
use std::path::{Path, PathBuf};
use texpress_cache::KeyedLocks;
use texpress_traits::{Fetched, SharedStore, Store, StoreError, is_safe_identifier};
use tokio::io::AsyncWriteExt;

/// Disk-then-store resolution shared by templates, resources and details.
pub struct Mirror {
    root: PathBuf,
    store: Option<SharedStore>,
    fetches: KeyedLocks,
}

impl Mirror {
    /// Creates a mirror rooted at `root`. Without a store, identifiers that
    /// are not already on disk are reported as not found.
    pub fn new(root: impl Into<PathBuf>, store: Option<SharedStore>) -> Self {
        let root = root.into();
        // Workspace links point here, so keep the root absolute.
        let root = std::path::absolute(&root).unwrap_or(root);
        Self {
            root,
            store,
            fetches: KeyedLocks::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The canonical on-disk location of `id`.
    pub fn path_for(&self, kind: Kind, id: &str) -> Result<PathBuf, ResourceError> {
        if !is_safe_identifier(id) {
            return Err(ResourceError::InvalidIdentifier {
                kind,
                id: id.to_string(),
            });
        }
        Ok(self.root.join(id))
    }

    /// Returns the local path of `id`, fetching it from the store and
    /// persisting it first if it is not on disk yet.
    ///
    /// Concurrent calls for the same identifier fetch once; later callers
    /// find the file the first one wrote.
    pub async fn locate(&self, kind: Kind, id: &str) -> Result<PathBuf, ResourceError> {
        let path = self.path_for(kind, id)?;
        if on_disk(kind, id, &path).await? {
            tracing::debug!("{} {} found on disk at {}", kind, id, path.display());
            return Ok(path);
        }

        let _fetch = self.fetches.lock(id).await;
        if on_disk(kind, id, &path).await? {
            tracing::debug!("{} {} written by a concurrent request", kind, id);
            return Ok(path);
        }

        let Some(store) = self.store.as_ref() else {
            return Err(ResourceError::NotFound {
                kind,
                id: id.to_string(),
            });
        };

        tracing::info!("fetching {} {} from {}", kind, id, store.name());
        let fetched = match store.fetch(id).await {
            Ok(fetched) => fetched,
            Err(StoreError::NotFound(_)) => {
                return Err(ResourceError::NotFound {
                    kind,
                    id: id.to_string(),
                });
            }
            Err(StoreError::Backend(message)) => {
                return Err(ResourceError::Store {
                    kind,
                    id: id.to_string(),
                    store: store.name(),
                    message,
                });
            }
        };

        self.persist(&path, fetched).await?;
        tracing::info!("persisted {} {} to {}", kind, id, path.display());
        Ok(path)
    }

    /// Locates `id` and reads it into memory.
    pub async fn read(&self, kind: Kind, id: &str) -> Result<Vec<u8>, ResourceError> {
        let path = self.locate(kind, id).await?;
        let read = tokio::fs::read(&path).await;
        read.map_err(|source| ResourceError::Read { path, source })
    }

    // Written to a temporary file in the root and renamed into place, so
    // nobody observes a partially written payload.
    async fn persist(&self, path: &Path, fetched: Fetched) -> Result<(), ResourceError> {
        let write_err = |source: std::io::Error| ResourceError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }

        let root = self.root.clone();
        let (file, temp_path) = blocking(move || {
            tempfile::NamedTempFile::new_in(root).map(tempfile::NamedTempFile::into_parts)
        })
        .await
        .map_err(write_err)?;
        let mut file = tokio::fs::File::from_std(file);
        match fetched {
            Fetched::Bytes(bytes) => file.write_all(&bytes).await.map_err(write_err)?,
            Fetched::Reader(mut reader) => {
                tokio::io::copy(&mut reader, &mut file)
                    .await
                    .map_err(write_err)?;
            }
        }
        file.flush().await.map_err(write_err)?;
        drop(file);

        let target = path.to_path_buf();
        blocking(move || temp_path.persist(target).map_err(|e| e.error))
            .await
            .map_err(write_err)
    }
}

/// Whether `id` is already mirrored. Anything at `path` that is not a regular
/// file (a workspace directory, say) is treated as not found.
async fn on_disk(kind: Kind, id: &str, path: &Path) -> Result<bool, ResourceError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => Ok(true),
        Ok(_) => {
            tracing::debug!("{} is not a regular file", path.display());
            Err(ResourceError::NotFound {
                kind,
                id: id.to_string(),
            })
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(ResourceError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

async fn blocking<T, F>(f: F) -> std::io::Result<T>
where
    F: FnOnce() -> std::io::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(std::io::Error::other)?
}
