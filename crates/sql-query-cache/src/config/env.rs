//! Environment variable loading for configuration

use std::env;

use super::QueryCacheConfig;
use crate::Result;

/// Environment variable names
mod vars {
    pub const ENABLED: &str = "SQL_QUERY_CACHE_ENABLED";
    pub const LOG_SQL: &str = "SQL_QUERY_CACHE_LOG_SQL";
    pub const JSON_LOGS: &str = "SQL_QUERY_CACHE_JSON_LOGS";
    pub const RUST_LOG: &str = "RUST_LOG";
}

/// Override `config` with values from environment variables
pub fn load_from_env(mut config: QueryCacheConfig) -> Result<QueryCacheConfig> {
    if let Ok(val) = env::var(vars::ENABLED) {
        config.enabled = parse_bool(&val);
    }

    if let Ok(val) = env::var(vars::LOG_SQL) {
        config.log_query_text = parse_bool(&val);
    }

    if let Ok(level) = env::var(vars::RUST_LOG) {
        if level.trim().is_empty() {
            return Err(crate::Error::Config(format!("{} is empty", vars::RUST_LOG)));
        }
        config.observability.log_level = level;
    }

    if let Ok(val) = env::var(vars::JSON_LOGS) {
        config.observability.json_logs = parse_bool(&val);
    }

    Ok(config)
}

fn parse_bool(s: &str) -> bool {
    matches!(s.to_lowercase().as_str(), "true" | "1" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const ALL_VARS: &[&str] = &[
        vars::ENABLED,
        vars::LOG_SQL,
        vars::JSON_LOGS,
        vars::RUST_LOG,
    ];

    /// Run `f` with exactly `vars` set among the variables this module reads
    fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let _guard = ENV_MUTEX.lock().unwrap();

        let old_values: Vec<_> = ALL_VARS.iter().map(|k| (*k, env::var(k).ok())).collect();

        for key in ALL_VARS {
            // SAFETY: We hold a mutex lock to ensure no concurrent modifications
            unsafe { env::remove_var(key) };
        }
        for (key, value) in vars {
            // SAFETY: We hold a mutex lock to ensure no concurrent modifications
            unsafe { env::set_var(key, value) };
        }

        let result = f();

        for (key, old_value) in old_values {
            match old_value {
                // SAFETY: We hold a mutex lock to ensure no concurrent modifications
                Some(v) => unsafe { env::set_var(key, v) },
                None => unsafe { env::remove_var(key) },
            }
        }

        result
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("true"));
        assert!(parse_bool("TRUE"));
        assert!(parse_bool("1"));
        assert!(parse_bool("yes"));
        assert!(parse_bool("on"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool("0"));
        assert!(!parse_bool("no"));
        assert!(!parse_bool(""));
    }

    #[test]
    fn test_no_vars_keeps_config() {
        with_env_vars(&[], || {
            let base = QueryCacheConfig {
                enabled: true,
                ..Default::default()
            };
            let config = load_from_env(base.clone()).unwrap();
            assert_eq!(config, base);
        });
    }

    #[test]
    fn test_load_enabled() {
        with_env_vars(&[("SQL_QUERY_CACHE_ENABLED", "yes")], || {
            let config = load_from_env(QueryCacheConfig::default()).unwrap();
            assert!(config.enabled);
        });
    }

    #[test]
    fn test_env_disables_file_setting() {
        with_env_vars(&[("SQL_QUERY_CACHE_ENABLED", "false")], || {
            let base = QueryCacheConfig {
                enabled: true,
                ..Default::default()
            };
            let config = load_from_env(base).unwrap();
            assert!(!config.enabled);
        });
    }

    #[test]
    fn test_load_logging() {
        with_env_vars(
            &[
                ("SQL_QUERY_CACHE_LOG_SQL", "1"),
                ("SQL_QUERY_CACHE_JSON_LOGS", "on"),
                ("RUST_LOG", "sql_query_cache=debug"),
            ],
            || {
                let config = load_from_env(QueryCacheConfig::default()).unwrap();
                assert!(config.log_query_text);
                assert!(config.observability.json_logs);
                assert_eq!(config.observability.log_level, "sql_query_cache=debug");
            },
        );
    }

    #[test]
    fn test_empty_log_level_rejected() {
        with_env_vars(&[("RUST_LOG", "  ")], || {
            let err = load_from_env(QueryCacheConfig::default()).unwrap_err();
            assert!(err.is_config());
            assert!(err.to_string().contains("RUST_LOG"));
        });
    }
}
