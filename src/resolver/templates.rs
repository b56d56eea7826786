use crate::error::{Result, ServiceError};
use std::future::Future;
use std::sync::Arc;
use texpress_cache::{CacheError, KeyGuard, KeyedLocks, KeyedLru};
use texpress_resource::{Kind, Mirror};
use texpress_template::{Delimiters, Template, content_key, identifier_key};

/// Content-addressed store of parsed templates.
///
/// Inline templates are keyed by content fingerprint plus delimiters;
/// templates named by identifier by the identifier plus delimiters. Each key
/// is parsed once for as long as it stays cached: first-time resolutions of
/// the same key wait on one another, distinct keys proceed in parallel.
pub struct TemplateStore {
    mirror: Arc<Mirror>,
    cache: KeyedLru<Arc<Template>>,
    parsing: KeyedLocks,
}

impl TemplateStore {
    pub fn new(mirror: Arc<Mirror>, capacity: usize) -> std::result::Result<Self, CacheError> {
        Ok(Self {
            mirror,
            cache: KeyedLru::new("template", capacity)?,
            parsing: KeyedLocks::new(),
        })
    }

    /// Resolves a template whose raw content came with the request.
    pub async fn resolve_inline(
        &self,
        content: &[u8],
        delimiters: &Delimiters,
    ) -> Result<Arc<Template>> {
        let key = content_key(content, delimiters);
        self.get_or_parse(&key, delimiters, async { Ok(content.to_vec()) })
            .await
    }

    /// Resolves a template by identifier: cache, then local disk, then the
    /// store.
    pub async fn resolve_id(&self, id: &str, delimiters: &Delimiters) -> Result<Arc<Template>> {
        let key = identifier_key(id, delimiters);
        let load = async {
            self.mirror
                .read(Kind::Template, id)
                .await
                .map_err(ServiceError::from)
        };
        self.get_or_parse(&key, delimiters, load).await
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_cached(&self, key: &str) -> bool {
        self.cache.contains(key)
    }

    async fn get_or_parse<F>(&self, key: &str, delimiters: &Delimiters, load: F) -> Result<Arc<Template>>
    where
        F: Future<Output = Result<Vec<u8>>>,
    {
        if let Some(template) = self.cache.get(key) {
            tracing::debug!(key, "template cache hit");
            return Ok(template);
        }

        let _parsing: KeyGuard<'_> = self.parsing.lock(key).await;
        if let Some(template) = self.cache.get(key) {
            tracing::debug!(key, "template parsed by a concurrent request");
            return Ok(template);
        }

        let source = load.await?;
        let template = Arc::new(Template::parse_bytes(key, &source, delimiters)?);
        self.cache.put(key, Arc::clone(&template));
        tracing::info!(key, "cached parsed template");
        Ok(template)
    }
}
