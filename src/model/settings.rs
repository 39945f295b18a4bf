use serde::{Deserialize, Serialize};

fn default_content_type() -> String {
    "application/json".to_string()
}

fn default_true() -> bool {
    true
}

/// Shape of incoming requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestConfig {
    #[serde(default = "default_content_type")]
    pub content_type: String,
    /// Raw sample body. When it parses as JSON it doubles as the request schema.
    #[serde(default)]
    pub sample: Option<String>,
    #[serde(default)]
    pub max_size_bytes: Option<u64>,
    #[serde(default)]
    pub validate_schema: bool,
    #[serde(default)]
    pub allowed_media_types: Vec<String>,
    #[serde(default)]
    pub required_fields: Vec<String>,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            content_type: default_content_type(),
            sample: None,
            max_size_bytes: None,
            validate_schema: false,
            allowed_media_types: Vec::new(),
            required_fields: Vec::new(),
        }
    }
}

/// Shape of outgoing responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseConfig {
    #[serde(default)]
    pub success_schema: Option<String>,
    #[serde(default)]
    pub error_schema: Option<String>,
    #[serde(default)]
    pub include_metadata: bool,
    /// Metadata keys to keep; empty keeps all of them.
    #[serde(default)]
    pub metadata_fields: Vec<String>,
    #[serde(default = "default_content_type")]
    pub content_type: String,
    #[serde(default)]
    pub compression: bool,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            success_schema: None,
            error_schema: None,
            include_metadata: false,
            metadata_fields: Vec::new(),
            content_type: default_content_type(),
            compression: false,
        }
    }
}

/// Runtime toggles plus the three generation switches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsConfig {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_max_records")]
    pub max_records: u32,
    #[serde(default)]
    pub enable_logging: bool,
    #[serde(default)]
    pub log_level: Option<String>,
    #[serde(default)]
    pub enable_caching: bool,
    #[serde(default)]
    pub cache_ttl_seconds: Option<u64>,
    #[serde(default)]
    pub enable_rate_limiting: bool,
    #[serde(default)]
    pub rate_limit_per_minute: Option<u32>,
    #[serde(default)]
    pub enable_audit: bool,
    #[serde(default)]
    pub enable_monitoring: bool,
    #[serde(default)]
    pub enable_alerting: bool,
    #[serde(default)]
    pub alert_email: Option<String>,
    #[serde(default)]
    pub enable_tracing: bool,
    #[serde(default)]
    pub cors_enabled: bool,
    #[serde(default)]
    pub cors_origins: Vec<String>,
    #[serde(default = "default_true")]
    pub generate_swagger: bool,
    #[serde(default = "default_true")]
    pub generate_postman: bool,
    /// Accepted but not acted on; see `GenerationOrchestrator::generate`.
    #[serde(default)]
    pub generate_client_sdk: bool,
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_max_records() -> u32 {
    1_000
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            max_records: default_max_records(),
            enable_logging: false,
            log_level: None,
            enable_caching: false,
            cache_ttl_seconds: None,
            enable_rate_limiting: false,
            rate_limit_per_minute: None,
            enable_audit: false,
            enable_monitoring: false,
            enable_alerting: false,
            alert_email: None,
            enable_tracing: false,
            cors_enabled: false,
            cors_origins: Vec::new(),
            generate_swagger: true,
            generate_postman: true,
            generate_client_sdk: false,
        }
    }
}
