#![allow(clippy::unwrap_used, clippy::expect_used)]

use apiforge::config::{AppConfig, ConfigError, StoreBackend};
use apiforge::telemetry::LogFormat;
use std::path::PathBuf;

fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_yaml_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        &dir,
        "apiforge.yaml",
        r#"
generator:
  base_url: https://hr.example.org
store:
  backend: memory
logging:
  format: json
  level: debug
"#,
    );
    let config = AppConfig::from_file(&path).unwrap();
    assert_eq!(config.generator.base_url, "https://hr.example.org");
    assert_eq!(
        config.generator.default_oauth_token_url,
        "https://auth.example.com/oauth/token"
    );
    assert_eq!(config.store.backend, StoreBackend::Memory);
    assert_eq!(config.cache.artifact_ttl_secs, 300);
    assert_eq!(config.logging.format, LogFormat::Json);
    assert_eq!(config.generator.render_options().base_url, "https://hr.example.org");
}

#[test]
fn test_toml_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        &dir,
        "apiforge.toml",
        r#"
[store]
backend = "sqlite"
path = "/var/lib/apiforge/apis.db"

[cache]
artifact_ttl_secs = 30
"#,
    );
    let config = AppConfig::from_file(&path).unwrap();
    assert_eq!(config.store.path, PathBuf::from("/var/lib/apiforge/apis.db"));
    assert_eq!(config.cache.artifact_ttl(), chrono::Duration::seconds(30));
    assert_eq!(config.generator.base_url, "https://api.example.com");
}

#[test]
fn test_unsupported_and_broken_files() {
    let dir = tempfile::tempdir().unwrap();
    let ini = write(&dir, "apiforge.ini", "[store]");
    assert!(matches!(
        AppConfig::from_file(&ini),
        Err(ConfigError::UnsupportedFormat { .. })
    ));

    let broken = write(&dir, "apiforge.toml", "store = [");
    let err = AppConfig::from_file(&broken).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("apiforge.toml"));

    let missing = dir.path().join("missing.yaml");
    assert!(matches!(
        AppConfig::from_file(&missing),
        Err(ConfigError::Io { .. })
    ));
}

#[test]
fn test_invalid_token_url_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        &dir,
        "apiforge.yml",
        "generator:\n  default_oauth_token_url: not a url\n",
    );
    let config = AppConfig::from_file(&path).unwrap();
    match config.validate() {
        Err(ConfigError::InvalidUrl { field, .. }) => {
            assert_eq!(field, "generator.default_oauth_token_url")
        }
        other => panic!("unexpected result {other:?}"),
    }
}
