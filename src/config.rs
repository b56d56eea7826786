use serde::Deserialize;
use std::path::PathBuf;

/// Environment variable naming an alternative config file (without `.toml`).
pub const CONFIG_ENV: &str = "TEXPRESS_CONFIG";

const DEFAULT_CONFIG: &str = "config/default";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub cache: CacheConfig,
    pub compiler: CompilerConfig,
    pub concurrency: ConcurrencyConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_request_size_mb: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 27182,
            max_request_size_mb: 32,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Local mirror of the store plus per-request workspaces.
    pub root: PathBuf,
    /// Directory backing the remote store. No store when unset.
    pub store_dir: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let root = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("texpress");
        Self {
            root,
            store_dir: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub template_capacity: usize,
    pub resource_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            template_capacity: 64,
            resource_capacity: 256,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Typesetting binary. Resolved against `PATH` at startup when unset.
    pub command: Option<String>,
    pub timeout_secs: u64,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            command: None,
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConcurrencyConfig {
    /// Limits concurrent compiler processes.
    pub max_jobs: usize,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self { max_jobs: 8 }
    }
}

impl Config {
    /// Loads `config/default.toml` (or the file named by `TEXPRESS_CONFIG`)
    /// with `TEXPRESS__SECTION__KEY` environment variables layered on top.
    /// Missing files are fine; every key has a default.
    pub fn load() -> Result<Self, config::ConfigError> {
        let path = std::env::var(CONFIG_ENV)
            .ok()
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_CONFIG.to_string());

        config::Config::builder()
            .add_source(config::File::with_name(&path).required(false))
            .add_source(config::Environment::with_prefix("TEXPRESS").separator("__"))
            .build()?
            .try_deserialize()
    }
}
