use super::auth::AuthConfig;
use super::fields::{ApiTest, Header, Parameter, ParameterLocation, ResponseMapping};
use super::schema::SchemaConfig;
use super::settings::{RequestConfig, ResponseConfig, SettingsConfig};
use crate::ids::ApiId;
use chrono::{DateTime, SecondsFormat, Utc};
use http::Method;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ApiStatus {
    #[default]
    Draft,
    Published,
    Deprecated,
}

impl fmt::Display for ApiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ApiStatus::Draft => "DRAFT",
            ApiStatus::Published => "PUBLISHED",
            ApiStatus::Deprecated => "DEPRECATED",
        };
        f.write_str(s)
    }
}

mod method_serde {
    use http::Method;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(method: &Method, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(method.as_str())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Method, D::Error> {
        let s = String::deserialize(deserializer)?;
        let upper = s.trim().to_ascii_uppercase();
        match upper.as_str() {
            "GET" | "POST" | "PUT" | "PATCH" | "DELETE" | "HEAD" | "OPTIONS" => {
                Method::from_bytes(upper.as_bytes()).map_err(serde::de::Error::custom)
            }
            _ => Err(serde::de::Error::custom(format!(
                "unsupported http method '{s}'"
            ))),
        }
    }
}

fn default_version() -> String {
    "1.0.0".to_string()
}

fn default_method() -> Method {
    Method::GET
}

fn default_true() -> bool {
    true
}

/// The full declarative model of one generated API.
///
/// The descriptor owns its sub-configurations and collections outright; the
/// repository persists and loads the whole graph at once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ApiId>,
    pub api_name: String,
    pub api_code: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub status: ApiStatus,
    #[serde(default = "default_method", with = "method_serde")]
    pub http_method: Method,
    #[serde(default)]
    pub base_path: String,
    pub endpoint_path: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub total_calls: u64,
    #[serde(default)]
    pub last_called_at: Option<DateTime<Utc>>,
    /// Opaque metadata about the object the API was created from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_object: Option<serde_json::Value>,

    pub schema_config: SchemaConfig,
    #[serde(default)]
    pub auth_config: AuthConfig,
    #[serde(default)]
    pub request_config: RequestConfig,
    #[serde(default)]
    pub response_config: ResponseConfig,
    #[serde(default)]
    pub settings: SettingsConfig,

    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub response_mappings: Vec<ResponseMapping>,
    #[serde(default)]
    pub headers: Vec<Header>,
    #[serde(default)]
    pub tests: Vec<ApiTest>,
}

impl ApiDescriptor {
    pub fn new(
        api_name: &str,
        api_code: &str,
        http_method: Method,
        endpoint_path: &str,
        schema_config: SchemaConfig,
    ) -> Self {
        Self {
            id: None,
            api_name: api_name.to_string(),
            api_code: api_code.to_string(),
            description: None,
            version: default_version(),
            status: ApiStatus::Draft,
            http_method,
            base_path: String::new(),
            endpoint_path: endpoint_path.to_string(),
            category: None,
            owner: None,
            tags: BTreeSet::new(),
            created_at: None,
            updated_at: None,
            created_by: None,
            is_active: true,
            total_calls: 0,
            last_called_at: None,
            source_object: None,
            schema_config,
            auth_config: AuthConfig::default(),
            request_config: RequestConfig::default(),
            response_config: ResponseConfig::default(),
            settings: SettingsConfig::default(),
            parameters: Vec::new(),
            response_mappings: Vec::new(),
            headers: Vec::new(),
            tests: Vec::new(),
        }
    }

    pub fn from_json(input: &str) -> serde_json::Result<Self> {
        serde_json::from_str(input)
    }

    pub fn from_yaml(input: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(input)
    }

    /// Rewrite collection positions to `0..n-1` in their current order.
    pub fn normalize_positions(&mut self) {
        for (i, p) in self.parameters.iter_mut().enumerate() {
            p.position = i as u32;
        }
        for (i, m) in self.response_mappings.iter_mut().enumerate() {
            m.position = i as u32;
        }
        for (i, h) in self.headers.iter_mut().enumerate() {
            h.position = i as u32;
        }
    }

    /// Sort collections by their stored position (stable for ties).
    pub fn sort_by_position(&mut self) {
        self.parameters.sort_by_key(|p| p.position);
        self.response_mappings.sort_by_key(|m| m.position);
        self.headers.sort_by_key(|h| h.position);
    }

    /// `basePath + endpointPath`.
    pub fn full_path(&self) -> String {
        format!(
            "{}{}",
            self.base_path.trim_end_matches('/'),
            self.endpoint_path
        )
    }

    pub fn included_mappings(&self) -> impl Iterator<Item = &ResponseMapping> {
        self.response_mappings
            .iter()
            .filter(|m| m.include_in_response)
    }

    pub fn parameters_in(
        &self,
        location: ParameterLocation,
    ) -> impl Iterator<Item = &Parameter> {
        self.parameters
            .iter()
            .filter(move |p| p.location == location)
    }

    /// Stamp used in generated headers: last update, else creation, else `N/A`.
    pub fn generated_stamp(&self) -> String {
        self.updated_at
            .or(self.created_at)
            .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
            .unwrap_or_else(|| "N/A".to_string())
    }
}
