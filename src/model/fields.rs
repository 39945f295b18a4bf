use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a parameter travels in the HTTP request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    #[default]
    Query,
    Body,
    Header,
}

impl ParameterLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterLocation::Path => "path",
            ParameterLocation::Query => "query",
            ParameterLocation::Body => "body",
            ParameterLocation::Header => "header",
        }
    }

    /// Path and query parameters identify rows; the rest carry values.
    pub fn is_filter(&self) -> bool {
        matches!(self, ParameterLocation::Path | ParameterLocation::Query)
    }
}

impl fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_oracle_type() -> String {
    "VARCHAR2".to_string()
}

fn default_api_type() -> String {
    "string".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    #[serde(default)]
    pub position: u32,
    pub key: String,
    /// Column the parameter filters or writes; falls back to `key`.
    #[serde(default)]
    pub db_column: Option<String>,
    /// Formal parameter name of the EXECUTE target, when it differs from `p_<key>`.
    /// Setting it on any parameter switches the call to named notation.
    #[serde(default)]
    pub db_parameter: Option<String>,
    #[serde(default = "default_oracle_type")]
    pub oracle_type: String,
    #[serde(default = "default_api_type")]
    pub api_type: String,
    #[serde(default, alias = "parameterLocation")]
    pub location: ParameterLocation,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub example: Option<String>,
    #[serde(default)]
    pub validation_pattern: Option<String>,
    #[serde(default)]
    pub default_value: Option<String>,
}

impl Parameter {
    pub fn new(key: &str, location: ParameterLocation, oracle_type: &str) -> Self {
        Self {
            position: 0,
            key: key.to_string(),
            db_column: None,
            db_parameter: None,
            oracle_type: oracle_type.to_string(),
            api_type: default_api_type(),
            location,
            required: false,
            description: None,
            example: None,
            validation_pattern: None,
            default_value: None,
        }
    }

    /// PL/SQL formal parameter name.
    pub fn plsql_name(&self) -> String {
        format!("p_{}", self.key)
    }

    /// Name of the matching formal parameter on the called object.
    pub fn db_parameter_name(&self) -> String {
        self.db_parameter.clone().unwrap_or_else(|| self.plsql_name())
    }

    pub fn column(&self) -> &str {
        self.db_column
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(&self.key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMapping {
    #[serde(default)]
    pub position: u32,
    pub api_field: String,
    pub db_column: String,
    #[serde(default = "default_oracle_type")]
    pub oracle_type: String,
    #[serde(default = "default_api_type")]
    pub api_type: String,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub is_primary_key: bool,
    #[serde(default = "default_true")]
    pub include_in_response: bool,
}

impl ResponseMapping {
    pub fn new(api_field: &str, db_column: &str) -> Self {
        Self {
            position: 0,
            api_field: api_field.to_string(),
            db_column: db_column.to_string(),
            oracle_type: default_oracle_type(),
            api_type: default_api_type(),
            format: None,
            nullable: false,
            is_primary_key: false,
            include_in_response: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    #[serde(default)]
    pub position: u32,
    pub key: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_request_header: bool,
    #[serde(default)]
    pub is_response_header: bool,
}

impl Header {
    pub fn request(key: &str, value: &str) -> Self {
        Self {
            position: 0,
            key: key.to_string(),
            value: Some(value.to_string()),
            required: false,
            description: None,
            is_request_header: true,
            is_response_header: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TestType {
    #[default]
    Unit,
    Integration,
    Data,
}

/// A stored test case; the payload is opaque to the generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTest {
    pub name: String,
    #[serde(default)]
    pub test_type: TestType,
    #[serde(default)]
    pub payload: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_column_fallback() {
        let mut p = Parameter::new("id", ParameterLocation::Path, "NUMBER");
        assert_eq!(p.column(), "id");
        p.db_column = Some("EMPLOYEE_ID".into());
        assert_eq!(p.column(), "EMPLOYEE_ID");
        p.db_column = Some("  ".into());
        assert_eq!(p.column(), "id");
    }

    #[test]
    fn test_location_accepts_both_keys() {
        let a: Parameter =
            serde_json::from_str(r#"{"key":"id","parameterLocation":"path"}"#).unwrap();
        let b: Parameter = serde_json::from_str(r#"{"key":"id","location":"path"}"#).unwrap();
        assert_eq!(a.location, ParameterLocation::Path);
        assert_eq!(b.location, ParameterLocation::Path);
        assert!(serde_json::from_str::<Parameter>(r#"{"key":"id","location":"cookie"}"#).is_err());
    }
}
