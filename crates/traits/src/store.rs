//! Store trait for abstracting the durable backing store.
//!
//! The resolution core never knows whether identifiers live in a SQL table,
//! a key-value service or a directory. It only asks for the payload behind an
//! identifier and gets back bytes, a stream, or a not-found signal.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Outcome of a failed store operation.
///
/// `NotFound` is a client-facing condition (the caller named something that
/// does not exist); `Backend` is everything else.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{0} not found in store")]
    NotFound(String),

    #[error("store backend failure: {0}")]
    Backend(String),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

/// A payload returned by [`Store::fetch`].
pub enum Fetched {
    /// The whole payload, already in memory.
    Bytes(Vec<u8>),
    /// A stream the caller drains.
    Reader(Box<dyn AsyncRead + Send + Unpin>),
}

impl Fetched {
    /// Drains the payload into memory.
    pub async fn into_bytes(self) -> std::io::Result<Vec<u8>> {
        match self {
            Fetched::Bytes(bytes) => Ok(bytes),
            Fetched::Reader(mut reader) => {
                let mut buf = Vec::new();
                reader.read_to_end(&mut buf).await?;
                Ok(buf)
            }
        }
    }
}

impl From<Vec<u8>> for Fetched {
    fn from(bytes: Vec<u8>) -> Self {
        Fetched::Bytes(bytes)
    }
}

impl fmt::Debug for Fetched {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fetched::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Fetched::Reader(_) => f.write_str("Reader(..)"),
        }
    }
}

/// Durable, identifier-keyed backing store.
///
/// # Implementations
///
/// - `InMemoryStore`: pre-populated map, used in tests and for seeding
/// - `FilesystemStore`: one file per identifier under a directory
#[async_trait]
pub trait Store: Send + Sync {
    /// Fetch the payload stored under `id`.
    ///
    /// Returns `StoreError::NotFound` when nothing is stored under `id`.
    async fn fetch(&self, id: &str) -> Result<Fetched, StoreError>;

    /// Store a payload under `id`, replacing any previous value.
    async fn store(&self, id: &str, data: Fetched) -> Result<(), StoreError>;

    /// Returns a human-readable name for this store (for logging/debugging).
    fn name(&self) -> &'static str;
}

/// Store handle shared across request handlers.
pub type SharedStore = Arc<dyn Store>;

/// An in-memory store.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: RwLock<HashMap<String, Arc<Vec<u8>>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a payload synchronously; convenient when seeding fixtures.
    pub fn insert(&self, id: impl Into<String>, data: impl Into<Vec<u8>>) {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.insert(id.into(), Arc::new(data.into()));
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries
            .read()
            .map(|e| e.contains_key(id))
            .unwrap_or(false)
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn fetch(&self, id: &str) -> Result<Fetched, StoreError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| StoreError::Backend("store lock poisoned".to_string()))?;
        entries
            .get(id)
            .map(|data| Fetched::Bytes(data.as_ref().clone()))
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn store(&self, id: &str, data: Fetched) -> Result<(), StoreError> {
        let bytes = data.into_bytes().await?;
        self.insert(id, bytes);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "InMemoryStore"
    }
}
