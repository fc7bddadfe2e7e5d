//! Enrichment configuration
//!
//! Sources, lowest precedence first: defaults, optional TOML file,
//! environment (`JJI_*`). Empty values count as unset.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

pub const ENV_SERVER_URL: &str = "JJI_SERVER_URL";
pub const ENV_TIMEOUT: &str = "JJI_TIMEOUT";
pub const ENV_AI_PROVIDER: &str = "JJI_AI_PROVIDER";
pub const ENV_AI_MODEL: &str = "JJI_AI_MODEL";

/// Default request timeout (seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = crate::analysis::transport_ureq::DEFAULT_TIMEOUT_SECS;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Analysis service settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightConfig {
    /// Base URL of the analysis service (required)
    pub server_url: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// AI provider, e.g. claude, gemini, cursor (required)
    pub ai_provider: Option<String>,

    /// AI model (required)
    pub ai_model: Option<String>,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            server_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            ai_provider: None,
            ai_model: None,
        }
    }
}

impl InsightConfig {
    /// Defaults overlaid with the process environment
    pub fn from_env() -> Self {
        Self::default().overlay(|key| std::env::var(key).ok())
    }

    /// Load a TOML file, then overlay the process environment
    pub fn from_file_and_env(path: &Path) -> Result<Self, ConfigError> {
        Ok(Self::from_toml_file(path)?.overlay(|key| std::env::var(key).ok()))
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str::<Self>(&content)
            .map(Self::normalized)
            .map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })
    }

    /// Overlay values from a key lookup (the environment, or a map in tests)
    pub fn overlay<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = non_empty(lookup(ENV_SERVER_URL)) {
            self.server_url = Some(url);
        }
        if let Some(raw) = non_empty(lookup(ENV_TIMEOUT)) {
            match raw.trim().parse::<u64>() {
                Ok(secs) => self.timeout_secs = secs,
                Err(_) => warn!(
                    "{}={:?} is not a whole number of seconds, using {}s",
                    ENV_TIMEOUT, raw, self.timeout_secs
                ),
            }
        }
        if let Some(provider) = non_empty(lookup(ENV_AI_PROVIDER)) {
            self.ai_provider = Some(provider);
        }
        if let Some(model) = non_empty(lookup(ENV_AI_MODEL)) {
            self.ai_model = Some(model);
        }
        self
    }

    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = non_empty(Some(url.into()));
        self
    }

    pub fn with_ai(mut self, provider: impl Into<String>, model: impl Into<String>) -> Self {
        self.ai_provider = non_empty(Some(provider.into()));
        self.ai_model = non_empty(Some(model.into()));
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn provider(&self) -> &str {
        self.ai_provider.as_deref().unwrap_or_default()
    }

    pub fn model(&self) -> &str {
        self.ai_model.as_deref().unwrap_or_default()
    }

    fn normalized(mut self) -> Self {
        self.server_url = non_empty(self.server_url.take());
        self.ai_provider = non_empty(self.ai_provider.take());
        self.ai_model = non_empty(self.ai_model.take());
        self
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = InsightConfig::default();
        assert_eq!(config.timeout_secs, 600);
        assert!(config.server_url.is_none());
        assert_eq!(config.provider(), "");
    }

    #[test]
    fn test_overlay_reads_all_keys() {
        let config = InsightConfig::default().overlay(lookup(&[
            (ENV_SERVER_URL, "http://jji:8000"),
            (ENV_TIMEOUT, "30"),
            (ENV_AI_PROVIDER, "claude"),
            (ENV_AI_MODEL, "test-model"),
        ]));
        assert_eq!(config.server_url.as_deref(), Some("http://jji:8000"));
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.provider(), "claude");
        assert_eq!(config.model(), "test-model");
    }

    #[test]
    fn test_empty_values_are_unset() {
        let config = InsightConfig::default().overlay(lookup(&[
            (ENV_SERVER_URL, ""),
            (ENV_AI_PROVIDER, "  "),
        ]));
        assert!(config.server_url.is_none());
        assert!(config.ai_provider.is_none());
    }

    #[test]
    fn test_bad_timeout_keeps_default() {
        let config = InsightConfig::default().overlay(lookup(&[(ENV_TIMEOUT, "ten")]));
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_toml_file_then_overlay() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("insight.toml");
        std::fs::write(
            &path,
            "server_url = \"http://file:1\"\ntimeout_secs = 5\nai_provider = \"gemini\"\nai_model = \"\"\n",
        )
        .unwrap();

        let config = InsightConfig::from_toml_file(&path).unwrap();
        assert_eq!(config.server_url.as_deref(), Some("http://file:1"));
        assert_eq!(config.timeout_secs, 5);
        assert!(config.ai_model.is_none());

        let config = config.overlay(lookup(&[(ENV_SERVER_URL, "http://env:2")]));
        assert_eq!(config.server_url.as_deref(), Some("http://env:2"));
        assert_eq!(config.provider(), "gemini");
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "timeout_secs = \"soon\"").unwrap();
        assert!(matches!(
            InsightConfig::from_toml_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_error() {
        let result = InsightConfig::from_toml_file(Path::new("/nonexistent/insight.toml"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
