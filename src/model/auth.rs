use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminant of [`AuthScheme`], handy for matching without the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthType {
    None,
    ApiKey,
    Basic,
    Jwt,
    Bearer,
    OAuth2,
}

impl AuthType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthType::None => "NONE",
            AuthType::ApiKey => "API_KEY",
            AuthType::Basic => "BASIC",
            AuthType::Jwt => "JWT",
            AuthType::Bearer => "BEARER",
            AuthType::OAuth2 => "OAUTH2",
        }
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_api_key_header() -> String {
    "X-API-Key".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyAuth {
    #[serde(default = "default_api_key_header")]
    pub api_key_header: String,
    #[serde(default)]
    pub api_key_value: Option<String>,
    #[serde(default)]
    pub api_secret_header: Option<String>,
    #[serde(default)]
    pub api_secret_value: Option<String>,
}

impl Default for ApiKeyAuth {
    fn default() -> Self {
        Self {
            api_key_header: default_api_key_header(),
            api_key_value: None,
            api_secret_header: None,
            api_secret_value: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicAuth {
    #[serde(default)]
    pub basic_username: String,
    #[serde(default)]
    pub basic_password: String,
    #[serde(default)]
    pub basic_realm: Option<String>,
}

fn default_jwt_algorithm() -> String {
    "HS256".to_string()
}

/// Shared by `JWT` and `BEARER`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JwtAuth {
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default)]
    pub jwt_issuer: Option<String>,
    #[serde(default)]
    pub jwt_audience: Option<String>,
    #[serde(default)]
    pub jwt_expiration_minutes: Option<u32>,
    #[serde(default = "default_jwt_algorithm")]
    pub jwt_algorithm: String,
}

impl Default for JwtAuth {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_issuer: None,
            jwt_audience: None,
            jwt_expiration_minutes: None,
            jwt_algorithm: default_jwt_algorithm(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuth2Auth {
    #[serde(default)]
    pub oauth_token_url: Option<String>,
    #[serde(default)]
    pub oauth_client_id: Option<String>,
    #[serde(default)]
    pub oauth_client_secret: Option<String>,
    #[serde(default)]
    pub oauth_scopes: Vec<String>,
}

/// Authentication scheme with only the fields that belong to it.
///
/// Serialized with an `authType` tag: `{"authType":"API_KEY","apiKeyHeader":"X-Key"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "authType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthScheme {
    #[default]
    None,
    ApiKey(ApiKeyAuth),
    Basic(BasicAuth),
    Jwt(JwtAuth),
    Bearer(JwtAuth),
    #[serde(rename = "OAUTH2")]
    OAuth2(OAuth2Auth),
}

impl AuthScheme {
    pub fn auth_type(&self) -> AuthType {
        match self {
            AuthScheme::None => AuthType::None,
            AuthScheme::ApiKey(_) => AuthType::ApiKey,
            AuthScheme::Basic(_) => AuthType::Basic,
            AuthScheme::Jwt(_) => AuthType::Jwt,
            AuthScheme::Bearer(_) => AuthType::Bearer,
            AuthScheme::OAuth2(_) => AuthType::OAuth2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RateLimitPeriod {
    Second,
    #[default]
    Minute,
    Hour,
    Day,
}

impl RateLimitPeriod {
    pub fn as_seconds(&self) -> i64 {
        match self {
            RateLimitPeriod::Second => 1,
            RateLimitPeriod::Minute => 60,
            RateLimitPeriod::Hour => 3_600,
            RateLimitPeriod::Day => 86_400,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimit {
    pub requests: u32,
    #[serde(default)]
    pub period: RateLimitPeriod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditLevel {
    None,
    #[default]
    Basic,
    Detailed,
    Full,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorsPolicy {
    #[serde(default)]
    pub origins: Vec<String>,
    #[serde(default)]
    pub allow_credentials: bool,
}

/// Authorization fields that apply whatever the authentication scheme.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationPolicy {
    #[serde(default)]
    pub required_roles: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<RateLimit>,
    #[serde(default)]
    pub audit_level: AuditLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cors: Option<CorsPolicy>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(flatten)]
    pub scheme: AuthScheme,
    #[serde(flatten)]
    pub policy: AuthorizationPolicy,
}

impl AuthConfig {
    pub fn new(scheme: AuthScheme) -> Self {
        Self {
            scheme,
            policy: AuthorizationPolicy::default(),
        }
    }

    pub fn auth_type(&self) -> AuthType {
        self.scheme.auth_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flattened_api_key() {
        let cfg: AuthConfig = serde_json::from_str(
            r#"{"authType":"API_KEY","apiKeyValue":"k-123","requiredRoles":["reader"],
                "rateLimit":{"requests":5,"period":"SECOND"}}"#,
        )
        .unwrap();
        match &cfg.scheme {
            AuthScheme::ApiKey(key) => {
                assert_eq!(key.api_key_header, "X-API-Key");
                assert_eq!(key.api_key_value.as_deref(), Some("k-123"));
            }
            other => panic!("unexpected scheme {other:?}"),
        }
        assert_eq!(cfg.policy.required_roles, vec!["reader"]);
        assert_eq!(cfg.policy.rate_limit.unwrap().period.as_seconds(), 1);
    }

    #[test]
    fn test_oauth2_tag_and_unknown_type() {
        let cfg: AuthConfig =
            serde_json::from_str(r#"{"authType":"OAUTH2","oauthScopes":["read"]}"#).unwrap();
        assert_eq!(cfg.auth_type(), AuthType::OAuth2);
        assert!(serde_json::from_str::<AuthConfig>(r#"{"authType":"KERBEROS"}"#).is_err());
    }

    #[test]
    fn test_none_serializes_with_tag() {
        let json = serde_json::to_value(AuthConfig::default()).unwrap();
        assert_eq!(json["authType"], "NONE");
    }
}
