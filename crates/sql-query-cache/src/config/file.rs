//! TOML configuration file loading

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::QueryCacheConfig;
use crate::Result;

/// Configuration file locations checked in order
const CONFIG_PATHS: &[&str] = &[
    "./sql-query-cache.toml",
    "~/.config/sql-query-cache/config.toml",
    "/etc/sql-query-cache/config.toml",
];

/// Find the first existing configuration file
pub fn find_config_file() -> Option<PathBuf> {
    for path_str in CONFIG_PATHS {
        let path = if path_str.starts_with('~') {
            if let Ok(home) = std::env::var("HOME") {
                PathBuf::from(path_str.replacen('~', &home, 1))
            } else {
                continue;
            }
        } else {
            PathBuf::from(path_str)
        };

        if path.exists() {
            return Some(path);
        }
    }
    None
}

/// Load configuration from a TOML file on top of `config`
pub fn load_from_file(path: &Path, config: QueryCacheConfig) -> Result<QueryCacheConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        crate::Error::Config(format!(
            "Failed to read config file {}: {}",
            path.display(),
            e
        ))
    })?;

    let file_config: FileConfig = toml::from_str(&content).map_err(|e| {
        crate::Error::Config(format!(
            "Failed to parse config file {}: {}",
            path.display(),
            e
        ))
    })?;

    Ok(apply_file_config(config, file_config))
}

fn apply_file_config(mut config: QueryCacheConfig, file: FileConfig) -> QueryCacheConfig {
    if let Some(cache) = file.cache {
        if let Some(enabled) = cache.enabled {
            config.enabled = enabled;
        }

        if let Some(log_query_text) = cache.log_query_text {
            config.log_query_text = log_query_text;
        }
    }

    if let Some(obs) = file.observability {
        if let Some(level) = obs.log_level {
            config.observability.log_level = level;
        }

        if let Some(json) = obs.json_logs {
            config.observability.json_logs = json;
        }
    }

    config
}

/// Root configuration file structure
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    cache: Option<CacheFileConfig>,
    observability: Option<ObservabilityFileConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CacheFileConfig {
    enabled: Option<bool>,
    log_query_text: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ObservabilityFileConfig {
    log_level: Option<String>,
    json_logs: Option<bool>,
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[cache]
enabled = true
log_query_text = true

[observability]
log_level = "debug"
json_logs = true
"#;

        let file = create_temp_config(toml_content);
        let config = load_from_file(file.path(), QueryCacheConfig::default()).unwrap();

        assert!(config.enabled);
        assert!(config.log_query_text);
        assert_eq!(config.observability.log_level, "debug");
        assert!(config.observability.json_logs);
    }

    #[test]
    fn test_parse_minimal_config() {
        let toml_content = r"
[cache]
enabled = true
";

        let file = create_temp_config(toml_content);
        let config = load_from_file(file.path(), QueryCacheConfig::default()).unwrap();

        assert!(config.enabled);
        assert!(!config.log_query_text);
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_empty_file_keeps_base() {
        let file = create_temp_config("");
        let base = QueryCacheConfig {
            enabled: true,
            ..Default::default()
        };

        let config = load_from_file(file.path(), base.clone()).unwrap();
        assert_eq!(config, base);
    }

    #[test]
    fn test_invalid_toml() {
        let file = create_temp_config("[cache\nenabled = ");
        let err = load_from_file(file.path(), QueryCacheConfig::default()).unwrap_err();

        assert!(err.is_config());
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let file = create_temp_config("[cache]\nmax_entries = 100\n");
        let result = load_from_file(file.path(), QueryCacheConfig::default());

        assert!(result.is_err());
    }

    #[test]
    fn test_wrong_type_rejected() {
        let file = create_temp_config("[cache]\nenabled = \"yes\"\n");
        let result = load_from_file(file.path(), QueryCacheConfig::default());

        assert!(result.is_err());
    }
}
