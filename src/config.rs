use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Status server port (disabled when absent)
    #[serde(default)]
    pub status_port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Backend base URL (e.g., "http://localhost:8000" or "https://host/api")
    pub base_url: String,
    /// Per-request timeout; transport defaults apply when unset
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}

/// How to resolve overlapping refresh attempts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseOrdering {
    /// Whichever attempt resolves last overwrites the state
    #[default]
    LastResolved,
    /// Only the most recently issued attempt may update the state
    LatestIssued,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Refresh cadence while healthy, in milliseconds
    #[serde(default = "default_base_interval")]
    pub base_interval_ms: u64,
    /// Backoff ceiling, in milliseconds
    #[serde(default = "default_max_interval")]
    pub max_interval_ms: u64,
    /// Minimum absolute edge movement flagged as a change (0.01 = 1pp)
    #[serde(default = "default_edge_change_threshold")]
    pub edge_change_threshold: f64,
    #[serde(default)]
    pub response_ordering: ResponseOrdering,
}

fn default_base_interval() -> u64 {
    15_000
}

fn default_max_interval() -> u64 {
    60_000
}

fn default_edge_change_threshold() -> f64 {
    0.01
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_interval_ms: default_base_interval(),
            max_interval_ms: default_max_interval(),
            edge_change_threshold: default_edge_change_threshold(),
            response_ordering: ResponseOrdering::default(),
        }
    }
}

impl SyncConfig {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.base_interval_ms == 0 {
            errors.push("sync.base_interval_ms must be > 0".to_string());
        }
        if self.max_interval_ms < self.base_interval_ms {
            errors.push("sync.max_interval_ms must be >= sync.base_interval_ms".to_string());
        }
        if !self.edge_change_threshold.is_finite() || self.edge_change_threshold < 0.0 {
            errors.push("sync.edge_change_threshold must be a finite value >= 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Input must be stable this long before a search is issued
    #[serde(default = "default_debounce")]
    pub debounce_ms: u64,
    /// Queries shorter than this never hit the backend
    #[serde(default = "default_min_query_len")]
    pub min_query_len: usize,
    /// Result-count limit sent with each search
    #[serde(default = "default_search_limit")]
    pub limit: u32,
}

fn default_debounce() -> u64 {
    300
}

fn default_min_query_len() -> usize {
    2
}

fn default_search_limit() -> u32 {
    8
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce(),
            min_query_len: default_min_query_len(),
            limit: default_search_limit(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default values
            .set_default("api.base_url", "http://localhost:8000")?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("EDGEWATCH_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (EDGEWATCH_API__BASE_URL, etc.)
            .add_source(
                Environment::with_prefix("EDGEWATCH")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Create a default configuration for CLI usage
    pub fn default_config(base_url: &str) -> Self {
        Self {
            api: ApiConfig {
                base_url: base_url.to_string(),
                request_timeout_ms: None,
            },
            sync: SyncConfig::default(),
            search: SearchConfig::default(),
            logging: LoggingConfig::default(),
            status_port: None,
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.api.base_url.trim().is_empty() {
            errors.push("api.base_url must not be empty".to_string());
        } else if url::Url::parse(&self.api.base_url).is_err() {
            errors.push(format!("api.base_url is not a valid URL: {}", self.api.base_url));
        }
        if self.api.request_timeout_ms == Some(0) {
            errors.push("api.request_timeout_ms must be > 0 when set".to_string());
        }

        if let Err(sync_errors) = self.sync.validate() {
            errors.extend(sync_errors);
        }

        if !(1..=50).contains(&self.search.limit) {
            errors.push("search.limit must be between 1 and 50".to_string());
        }
        if self.search.min_query_len == 0 {
            errors.push("search.min_query_len must be >= 1".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let cfg = AppConfig::default_config("http://localhost:8000");
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.sync.base_interval_ms, 15_000);
        assert_eq!(cfg.sync.max_interval_ms, 60_000);
        assert_eq!(cfg.sync.edge_change_threshold, 0.01);
        assert_eq!(cfg.sync.response_ordering, ResponseOrdering::LastResolved);
        assert_eq!(cfg.search.debounce_ms, 300);
        assert_eq!(cfg.search.min_query_len, 2);
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let mut cfg = AppConfig::default_config("not a url");
        cfg.sync.base_interval_ms = 20_000;
        cfg.sync.max_interval_ms = 10_000;
        cfg.sync.edge_change_threshold = f64::NAN;
        cfg.search.limit = 0;

        let errors = cfg.validate().unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.iter().any(|e| e.contains("max_interval_ms")));
    }

    #[test]
    fn test_sync_section_from_toml() {
        let cfg: AppConfig = Config::builder()
            .add_source(config::File::from_str(
                r#"
                [api]
                base_url = "https://example.test/api"

                [sync]
                base_interval_ms = 5000
                response_ordering = "latest_issued"
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(cfg.sync.base_interval_ms, 5000);
        assert_eq!(cfg.sync.max_interval_ms, 60_000);
        assert_eq!(cfg.sync.response_ordering, ResponseOrdering::LatestIssued);
        assert!(cfg.status_port.is_none());
    }
}
