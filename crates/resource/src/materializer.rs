use crate::error::{Kind, ResourceError};
use crate::mirror::Mirror;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use texpress_cache::{CacheError, KeyedLru};

/// Links resources into request workspaces.
///
/// Resolution order for an identifier: the resource-path cache, then the
/// mirror (local disk, then the store). The cache maps identifier to path,
/// never to bytes; resources are linked, not copied, so a large file exists
/// once on disk no matter how many workspaces use it.
pub struct ResourceMaterializer {
    mirror: Arc<Mirror>,
    paths: KeyedLru<PathBuf>,
}

impl ResourceMaterializer {
    pub fn new(mirror: Arc<Mirror>, capacity: usize) -> Result<Self, CacheError> {
        Ok(Self {
            mirror,
            paths: KeyedLru::new("resource", capacity)?,
        })
    }

    /// Resolves `id` to its local path without linking it anywhere.
    pub async fn resolve(&self, id: &str) -> Result<PathBuf, ResourceError> {
        if let Some(path) = self.paths.get(id) {
            if tokio::fs::try_exists(&path).await.unwrap_or(false) {
                return Ok(path);
            }
            tracing::warn!("cached path {} for resource {} vanished", path.display(), id);
        }

        let path = self.mirror.locate(Kind::Resource, id).await?;
        self.paths.put(id, path.clone());
        Ok(path)
    }

    /// Resolves `id` and symlinks it into `workspace` under its identifier.
    /// Returns the link's path.
    pub async fn materialize(&self, id: &str, workspace: &Path) -> Result<PathBuf, ResourceError> {
        let target = self.resolve(id).await?;
        let link_path = workspace.join(id);

        if let Some(parent) = link_path.parent()
            && parent != workspace
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| ResourceError::Link {
                    target: target.clone(),
                    source,
                })?;
        }

        if let Err(source) = link(&target, &link_path).await {
            return Err(ResourceError::Link { target, source });
        }
        tracing::debug!("linked {} -> {}", link_path.display(), target.display());
        Ok(link_path)
    }

    /// The cached path for `id`, if any. Refreshes its recency.
    pub fn cached_path(&self, id: &str) -> Option<PathBuf> {
        self.paths.get(id)
    }

    pub fn cache_len(&self) -> usize {
        self.paths.len()
    }

    pub fn mirror(&self) -> &Mirror {
        &self.mirror
    }
}

#[cfg(unix)]
async fn link(target: &Path, link_path: &Path) -> std::io::Result<()> {
    tokio::fs::symlink(target, link_path).await
}

#[cfg(windows)]
async fn link(target: &Path, link_path: &Path) -> std::io::Result<()> {
    tokio::fs::symlink_file(target, link_path).await
}
