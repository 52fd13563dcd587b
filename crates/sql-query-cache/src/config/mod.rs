//! Configuration management
//!
//! Supports configuration loading with precedence: env > file > defaults

mod env;
mod file;

use std::path::Path;

use crate::Result;

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservabilityConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub log_level: String,
    /// Emit JSON lines instead of human-readable output
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

/// Query cache configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryCacheConfig {
    /// Enable the process-wide cache as soon as it is built
    pub enabled: bool,
    /// Log literal SQL instead of fingerprints
    ///
    /// Query text can reveal schema and literal values; keep this off
    /// outside of development.
    pub log_query_text: bool,
    pub observability: ObservabilityConfig,
}

impl QueryCacheConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Load configuration with precedence: env > file > defaults
pub fn load_config() -> Result<QueryCacheConfig> {
    let mut config = QueryCacheConfig::default();

    if let Some(path) = file::find_config_file() {
        tracing::info!("Loading configuration from {}", path.display());
        config = file::load_from_file(&path, config)?;
    }

    env::load_from_env(config)
}

/// Load configuration from a specific file path
pub fn load_config_from_path(path: &Path) -> Result<QueryCacheConfig> {
    let config = file::load_from_file(path, QueryCacheConfig::default())?;

    env::load_from_env(config)
}
