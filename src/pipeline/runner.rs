use super::request::{Artifact, JobRequest};
use crate::compiler::Compiler;
use crate::config::Config;
use crate::error::{Result, ServiceError};
use crate::resolver::{DetailsResolver, TemplateStore};
use crate::workspace::Workspace;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use texpress_resource::{Kind, Mirror, ResourceError, ResourceMaterializer};
use texpress_template::Details;
use texpress_traits::{SharedStore, is_safe_identifier};
use tokio::sync::Semaphore;

/// Owns the resolution components and the compiler, and turns requests into
/// artifacts. Shared by every request; the caches inside are the only
/// mutable shared state.
pub struct Pipeline {
    root: PathBuf,
    templates: TemplateStore,
    resources: ResourceMaterializer,
    details: DetailsResolver,
    compiler: Compiler,
    /// Limits concurrent compiler processes.
    jobs: Semaphore,
}

impl Pipeline {
    pub fn new(config: &Config, store: Option<SharedStore>, compiler: Compiler) -> Result<Self> {
        if config.concurrency.max_jobs == 0 {
            return Err(ServiceError::Config(
                "concurrency.max_jobs must be at least 1".to_string(),
            ));
        }

        let mirror = Arc::new(Mirror::new(&config.storage.root, store));
        Ok(Self {
            root: mirror.root().to_path_buf(),
            templates: TemplateStore::new(Arc::clone(&mirror), config.cache.template_capacity)?,
            resources: ResourceMaterializer::new(
                Arc::clone(&mirror),
                config.cache.resource_capacity,
            )?,
            details: DetailsResolver::new(mirror),
            compiler,
            jobs: Semaphore::new(config.concurrency.max_jobs),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn templates(&self) -> &TemplateStore {
        &self.templates
    }

    pub fn resources(&self) -> &ResourceMaterializer {
        &self.resources
    }

    /// Runs one job to completion. The workspace is scheduled for removal
    /// when this returns, whatever the outcome, or when the future is
    /// dropped.
    pub async fn run(&self, request: JobRequest) -> Result<Artifact> {
        let workspace = Workspace::create(&self.root).await?;

        let template = match (&request.inline_template, &request.template_id) {
            (Some(content), _) => {
                self.templates
                    .resolve_inline(content, &request.delimiters)
                    .await?
            }
            (None, Some(id)) => self.templates.resolve_id(id, &request.delimiters).await?,
            (None, None) => {
                return Err(ServiceError::BadRequest("no template provided".to_string()));
            }
        };

        for (name, bytes) in &request.inline_resources {
            write_inline_resource(&workspace, name, bytes).await?;
        }
        for id in &request.resource_ids {
            self.resources.materialize(id, workspace.path()).await?;
        }

        let details = match (request.details, &request.details_id) {
            (Some(details), _) => details,
            (None, Some(id)) => self.details.resolve(id).await?,
            (None, None) => Details::new(),
        };

        let artifact = {
            let _permit = self
                .jobs
                .acquire()
                .await
                .map_err(|_| ServiceError::Internal("compiler queue closed".to_string()))?;
            self.compiler.compile(&template, &details, &workspace).await?
        };

        let bytes = tokio::fs::read(&artifact)
            .await
            .map_err(|e| ServiceError::io(format!("reading {}", artifact.display()), e))?;

        tracing::info!(
            job = workspace.name(),
            template = template.name(),
            bytes = bytes.len(),
            "job complete"
        );
        Ok(Artifact {
            name: format!("{}.pdf", workspace.name()),
            bytes,
        })
    }
}

async fn write_inline_resource(workspace: &Workspace, name: &str, bytes: &[u8]) -> Result<()> {
    if !is_safe_identifier(name) {
        return Err(ResourceError::InvalidIdentifier {
            kind: Kind::Resource,
            id: name.to_string(),
        }
        .into());
    }

    let path = workspace.path().join(name);
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| ResourceError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
    }
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|source| ResourceError::Write {
            path: path.clone(),
            source,
        })?;
    tracing::debug!("wrote inline resource {}", path.display());
    Ok(())
}
