//! # Configuration Module
//!
//! Application configuration loaded from a YAML (`.yaml`/`.yml`) or TOML (`.toml`)
//! file, then overridden by environment variables.
//!
//! ## Overview
//!
//! Every field has a serde default, so an empty file (or no file at all) yields a
//! working configuration:
//!
//! ```yaml
//! generator:
//!   base_url: https://api.example.com
//!   default_oauth_token_url: https://auth.example.com/oauth/token
//!   output_dir: generated
//! store:
//!   backend: sqlite
//!   path: apiforge.db
//! cache:
//!   artifact_ttl_secs: 300
//! logging:
//!   level: info
//!   format: pretty
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Field |
//! |----------|-------|
//! | `APIFORGE_BASE_URL` | `generator.base_url` |
//! | `APIFORGE_STORE_BACKEND` | `store.backend` (`memory` or `sqlite`) |
//! | `APIFORGE_STORE_PATH` | `store.path` |
//! | `APIFORGE_ARTIFACT_TTL_SECS` | `cache.artifact_ttl_secs` |
//! | `APIFORGE_LOG_LEVEL` | `logging.level` |
//! | `APIFORGE_LOG_FORMAT` | `logging.format` |
//!
//! URLs are validated after overrides are applied.

use crate::generator::{RenderOptions, DEFAULT_BASE_URL, DEFAULT_OAUTH_TOKEN_URL};
use crate::telemetry::{LogConfig, LogFormat};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

#[derive(Debug)]
pub enum ConfigError {
    /// The file could not be read
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The file could not be parsed
    Parse { path: PathBuf, message: String },
    /// The file extension is neither YAML nor TOML
    UnsupportedFormat { path: PathBuf },
    /// A URL field is not an absolute URL
    InvalidUrl {
        field: &'static str,
        value: String,
        message: String,
    },
    /// An environment override could not be interpreted
    InvalidValue { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "failed to read config {}: {}", path.display(), source)
            }
            ConfigError::Parse { path, message } => {
                write!(f, "failed to parse config {}: {}", path.display(), message)
            }
            ConfigError::UnsupportedFormat { path } => write!(
                f,
                "unsupported config format for {} (expected .yaml, .yml or .toml)",
                path.display()
            ),
            ConfigError::InvalidUrl {
                field,
                value,
                message,
            } => write!(f, "{field} '{value}' is not a valid absolute URL: {message}"),
            ConfigError::InvalidValue { key, value } => {
                write!(f, "invalid value '{value}' for {key}")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_oauth_token_url() -> String {
    DEFAULT_OAUTH_TOKEN_URL.to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("generated")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_oauth_token_url")]
    pub default_oauth_token_url: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            default_oauth_token_url: default_oauth_token_url(),
            output_dir: default_output_dir(),
        }
    }
}

impl GeneratorConfig {
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            base_url: self.base_url.clone(),
            default_oauth_token_url: self.default_oauth_token_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    #[default]
    Sqlite,
}

impl std::str::FromStr for StoreBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "sqlite" => Ok(StoreBackend::Sqlite),
            _ => Err(()),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("apiforge.db")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Sqlite,
            path: default_store_path(),
        }
    }
}

fn default_artifact_ttl_secs() -> u64 {
    300
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Lifetime of on-demand rendered artifacts
    #[serde(default = "default_artifact_ttl_secs")]
    pub artifact_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            artifact_ttl_secs: default_artifact_ttl_secs(),
        }
    }
}

impl CacheConfig {
    pub fn artifact_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::try_from(self.artifact_ttl_secs).unwrap_or(i64::MAX))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub generator: GeneratorConfig,
    pub store: StoreConfig,
    pub cache: CacheConfig,
    pub logging: LogConfig,
}

impl AppConfig {
    /// Parse a config file, picking the format from its extension.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let parse_err = |message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        };
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => {
                serde_yaml::from_str(&text).map_err(|e| parse_err(e.to_string()))
            }
            Some("toml") => toml::from_str(&text).map_err(|e| parse_err(e.to_string())),
            _ => Err(ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    /// Load from an optional file, apply environment overrides, then validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_from(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `APIFORGE_*` overrides using `lookup` to read variables.
    pub fn apply_env_from(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(v) = lookup("APIFORGE_BASE_URL") {
            self.generator.base_url = v;
        }
        if let Some(v) = lookup("APIFORGE_STORE_PATH") {
            self.store.path = PathBuf::from(v);
        }
        if let Some(v) = lookup("APIFORGE_STORE_BACKEND") {
            self.store.backend = v.parse().map_err(|_| ConfigError::InvalidValue {
                key: "APIFORGE_STORE_BACKEND",
                value: v.clone(),
            })?;
        }
        if let Some(v) = lookup("APIFORGE_ARTIFACT_TTL_SECS") {
            self.cache.artifact_ttl_secs = v.parse().map_err(|_| ConfigError::InvalidValue {
                key: "APIFORGE_ARTIFACT_TTL_SECS",
                value: v.clone(),
            })?;
        }
        if let Some(v) = lookup("APIFORGE_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Some(v) = lookup("APIFORGE_LOG_FORMAT") {
            self.logging.format = LogFormat::parse(&v);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("generator.base_url", &self.generator.base_url),
            (
                "generator.default_oauth_token_url",
                &self.generator.default_oauth_token_url,
            ),
        ] {
            let parsed = Url::parse(value).map_err(|e| ConfigError::InvalidUrl {
                field,
                value: value.clone(),
                message: e.to_string(),
            })?;
            if parsed.cannot_be_a_base() {
                return Err(ConfigError::InvalidUrl {
                    field,
                    value: value.clone(),
                    message: "URL cannot be a base".to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.generator.base_url, "https://api.example.com");
        assert_eq!(config.store.backend, StoreBackend::Sqlite);
        assert_eq!(config.cache.artifact_ttl_secs, 300);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("APIFORGE_BASE_URL", "https://internal.example.org/api"),
            ("APIFORGE_STORE_BACKEND", "memory"),
            ("APIFORGE_ARTIFACT_TTL_SECS", "5"),
            ("APIFORGE_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();
        let mut config = AppConfig::default();
        config
            .apply_env_from(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.generator.base_url, "https://internal.example.org/api");
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.cache.artifact_ttl_secs, 5);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_bad_env_value() {
        let mut config = AppConfig::default();
        let err = config
            .apply_env_from(|k| (k == "APIFORGE_STORE_BACKEND").then(|| "oracle".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_relative_url_rejected() {
        let mut config = AppConfig::default();
        config.generator.base_url = "/api".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidUrl { field: "generator.base_url", .. })
        ));
    }
}
