use crate::compiler::Compiler;
use crate::config::Config;
use crate::error::Result;
use crate::pipeline::Pipeline;
use std::sync::Arc;
use texpress_traits::SharedStore;

/// Shared application state accessible to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Resolution caches, compiler and the compile semaphore.
    pub pipeline: Arc<Pipeline>,

    pub config: Arc<Config>,
}

impl AppState {
    /// Fails when a cache capacity or the job limit is zero.
    pub fn new(config: Config, store: Option<SharedStore>, compiler: Compiler) -> Result<Self> {
        let pipeline = Pipeline::new(&config, store, compiler)?;
        Ok(Self {
            pipeline: Arc::new(pipeline),
            config: Arc::new(config),
        })
    }
}
