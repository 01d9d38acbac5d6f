use std::time::Duration;

use npk_feed::{SourceConfig, DEFAULT_FETCH_TIMEOUT};

/// Environment variable holding the default sensor feed URL
pub const SOURCE_URL_VAR: &str = "NPK_SOURCE_URL";
pub const SOURCE_ID_PATTERN_VAR: &str = "NPK_SOURCE_ID_PATTERN";
pub const EXPORT_URL_TEMPLATE_VAR: &str = "NPK_EXPORT_URL_TEMPLATE";
pub const FETCH_TIMEOUT_SECS_VAR: &str = "NPK_FETCH_TIMEOUT_SECS";

/// Serializes tests that touch process environment variables
#[cfg(test)]
pub static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// Configuration for the Feed API
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Source resolution settings (default URL, id pattern, export template)
    pub source: SourceConfig,
    /// Upper bound on a single feed fetch
    pub fetch_timeout: Duration,
}

impl FeedConfig {
    /// Create a new FeedConfig instance from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let source_url = std::env::var(SOURCE_URL_VAR)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(SOURCE_URL_VAR.to_string()))?;

        let mut source = SourceConfig::new(source_url.trim());

        if let Ok(pattern) = std::env::var(SOURCE_ID_PATTERN_VAR) {
            source = source.with_id_pattern(&pattern).map_err(|e| {
                ConfigError::InvalidValue(SOURCE_ID_PATTERN_VAR.to_string(), e.to_string())
            })?;
        }

        if let Ok(template) = std::env::var(EXPORT_URL_TEMPLATE_VAR) {
            source = source.with_export_url_template(template).map_err(|e| {
                ConfigError::InvalidValue(EXPORT_URL_TEMPLATE_VAR.to_string(), e.to_string())
            })?;
        }

        let fetch_timeout = match std::env::var(FETCH_TIMEOUT_SECS_VAR) {
            Ok(raw) => parse_timeout_secs(&raw)?,
            Err(_) => DEFAULT_FETCH_TIMEOUT,
        };

        Ok(FeedConfig {
            source,
            fetch_timeout,
        })
    }
}

fn parse_timeout_secs(raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidValue(
            FETCH_TIMEOUT_SECS_VAR.to_string(),
            format!("expected a positive number of seconds, got {:?}", raw),
        )),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}
