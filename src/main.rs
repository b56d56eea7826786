use std::sync::Arc;
use texpress::{AppState, Compiler, Config, api};
use texpress_traits::{FilesystemStore, SharedStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    tracing::info!("Starting texpress...");

    let config = Config::load()?;
    tracing::info!("Configuration loaded");

    tokio::fs::create_dir_all(&config.storage.root)
        .await
        .map_err(|e| {
            anyhow::anyhow!(
                "Failed to create root directory {}: {}",
                config.storage.root.display(),
                e
            )
        })?;
    tracing::info!("Root directory: {}", config.storage.root.display());

    let compiler = Compiler::from_config(&config.compiler)?;
    tracing::info!("Compiler: {}", compiler.command().display());

    let store: Option<SharedStore> = match &config.storage.store_dir {
        Some(dir) => {
            let store = FilesystemStore::new(dir.clone())
                .await
                .map_err(|e| anyhow::anyhow!("Failed to initialize store: {}", e))?;
            tracing::info!("Store initialized at {}", store.base().display());
            Some(Arc::new(store))
        }
        None => {
            tracing::info!("No store configured; identifiers resolve from the root directory only");
            None
        }
    };

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = api::build_router(AppState::new(config, store, compiler)?);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("texpress listening on {}", addr);
    tracing::info!("Endpoints:");
    tracing::info!("  - GET|POST /generate");
    tracing::info!("  - GET      /health");

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,texpress=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
