use crate::error::{Result, ServiceError};
use std::sync::Arc;
use texpress_resource::{Kind, Mirror};
use texpress_template::Details;

/// Resolves details payloads named by identifier.
///
/// Only the raw bytes are kept (on disk, by the mirror); the decoded mapping
/// is per-request data and is never cached.
pub struct DetailsResolver {
    mirror: Arc<Mirror>,
}

impl DetailsResolver {
    pub fn new(mirror: Arc<Mirror>) -> Self {
        Self { mirror }
    }

    pub async fn resolve(&self, id: &str) -> Result<Details> {
        let bytes = self.mirror.read(Kind::Details, id).await?;
        serde_json::from_slice(&bytes).map_err(|e| ServiceError::Details {
            id: id.to_string(),
            diagnostic: e.to_string(),
        })
    }
}
