//! Per-request scratch directories.
//!
//! A [`Workspace`] is created under the root directory before anything is
//! resolved and removed when it is dropped: on success, on error, and when
//! the request future is cancelled. Removal runs as a detached background
//! task; failures are logged and never reach the client.

use crate::error::{Result, ServiceError};
use std::path::{Path, PathBuf};
use tokio::task::JoinHandle;
use uuid::Uuid;

#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
    name: String,
    removed: bool,
}

impl Workspace {
    /// Creates a uniquely named directory under `root`.
    pub async fn create(root: &Path) -> Result<Self> {
        let name = Uuid::new_v4().simple().to_string();
        let path = root.join(&name);
        tokio::fs::create_dir(&path)
            .await
            .map_err(|e| ServiceError::io(format!("creating workspace {}", path.display()), e))?;

        tracing::info!("created workspace {}", path.display());
        Ok(Self {
            path,
            name,
            removed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The directory's base name; used as the compiler job name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Schedules removal now and returns the background task, so callers
    /// that care (tests, shutdown) can wait for it.
    pub fn remove(mut self) -> Option<JoinHandle<()>> {
        self.removed = true;
        schedule_removal(self.path.clone())
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if !self.removed {
            schedule_removal(std::mem::take(&mut self.path));
        }
    }
}

fn schedule_removal(path: PathBuf) -> Option<JoinHandle<()>> {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => Some(handle.spawn(async move {
            match tokio::fs::remove_dir_all(&path).await {
                Ok(()) => tracing::debug!("removed workspace {}", path.display()),
                Err(e) => tracing::error!("failed to remove workspace {}: {}", path.display(), e),
            }
        })),
        // Outside a runtime there is nothing to detach onto.
        Err(_) => {
            if let Err(e) = std::fs::remove_dir_all(&path) {
                tracing::error!("failed to remove workspace {}: {}", path.display(), e);
            }
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_create_and_remove() {
        let root = tempdir().unwrap();
        let ws = Workspace::create(root.path()).await.unwrap();
        let path = ws.path().to_path_buf();

        assert!(path.is_dir());
        assert_eq!(path.parent(), Some(root.path()));
        assert_eq!(path.file_name().unwrap().to_str(), Some(ws.name()));

        ws.remove().unwrap().await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_drop_removes_contents() {
        let root = tempdir().unwrap();
        let path = {
            let ws = Workspace::create(root.path()).await.unwrap();
            std::fs::write(ws.path().join("job.tex"), b"\\relax").unwrap();
            ws.path().to_path_buf()
        };

        for _ in 0..100 {
            if !path.exists() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_names_are_unique() {
        let root = tempdir().unwrap();
        let a = Workspace::create(root.path()).await.unwrap();
        let b = Workspace::create(root.path()).await.unwrap();
        assert_ne!(a.name(), b.name());
    }

    #[test]
    fn test_drop_outside_runtime_removes_synchronously() {
        let root = tempdir().unwrap();
        let path = root.path().join("orphan");
        std::fs::create_dir(&path).unwrap();
        let ws = Workspace {
            path: path.clone(),
            name: "orphan".to_string(),
            removed: false,
        };
        drop(ws);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_missing_root_is_io_error() {
        let root = tempdir().unwrap();
        let err = Workspace::create(&root.path().join("missing")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Io { .. }));
    }
}
