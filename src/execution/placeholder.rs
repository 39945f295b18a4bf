//! Deterministic sample values for simulated responses, keyed by API type and format.

use serde_json::{json, Value};

/// Placeholder JSON value for an API type and optional format hint.
pub fn placeholder_value(api_type: &str, format: Option<&str>) -> Value {
    match (api_type.to_ascii_lowercase().as_str(), format) {
        ("string", Some("date")) => json!("2024-01-01"),
        ("string", Some("date-time")) => json!("2024-01-01T00:00:00Z"),
        ("string", Some("email")) => json!("user@example.com"),
        ("string", Some("uuid")) => json!("00000000-0000-0000-0000-000000000000"),
        ("string", _) => json!("example"),
        ("integer", _) => json!(42),
        ("number", _) => json!(123.45),
        ("boolean", _) => json!(true),
        ("array", _) => json!([]),
        ("object", _) => json!({}),
        _ => Value::Null,
    }
}

/// Interpret a raw request value as the given API type, falling back to the text.
pub fn coerce_value(raw: &str, api_type: &str) -> Value {
    match api_type.to_ascii_lowercase().as_str() {
        "integer" => raw.parse::<i64>().map(Value::from).unwrap_or_else(|_| json!(raw)),
        "number" => raw.parse::<f64>().map(Value::from).unwrap_or_else(|_| json!(raw)),
        "boolean" => raw.parse::<bool>().map(Value::from).unwrap_or_else(|_| json!(raw)),
        _ => json!(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_formats() {
        assert_eq!(placeholder_value("string", None), json!("example"));
        assert_eq!(placeholder_value("string", Some("date")), json!("2024-01-01"));
        assert_eq!(placeholder_value("STRING", Some("email")), json!("user@example.com"));
    }

    #[test]
    fn test_scalars() {
        assert_eq!(placeholder_value("integer", None), json!(42));
        assert_eq!(placeholder_value("boolean", None), json!(true));
        assert_eq!(placeholder_value("array", None), json!([]));
    }

    #[test]
    fn test_unknown() {
        assert_eq!(placeholder_value("blob", None), Value::Null);
    }

    #[test]
    fn test_coerce() {
        assert_eq!(coerce_value("7", "integer"), json!(7));
        assert_eq!(coerce_value("seven", "integer"), json!("seven"));
        assert_eq!(coerce_value("true", "boolean"), json!(true));
        assert_eq!(coerce_value("7", "string"), json!("7"));
    }
}
