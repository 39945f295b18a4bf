use crate::model::ApiDescriptor;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// Facts about one execution that may be surfaced as response metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionMetadata {
    pub executed_at: DateTime<Utc>,
    pub execution_time_ms: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Value,
}

/// Shapes executor output according to `responseConfig`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseFormatter;

impl ResponseFormatter {
    pub fn format(
        &self,
        d: &ApiDescriptor,
        data: Value,
        meta: &ExecutionMetadata,
    ) -> FormattedResponse {
        let rc = &d.response_config;
        let body = if rc.include_metadata {
            let record_count = match &data {
                Value::Array(rows) => rows.len(),
                Value::Null => 0,
                _ => 1,
            };
            let all = [
                ("apiCode", json!(d.api_code)),
                ("version", json!(d.version)),
                (
                    "timestamp",
                    json!(meta
                        .executed_at
                        .to_rfc3339_opts(SecondsFormat::Millis, true)),
                ),
                ("executionTimeMs", json!(meta.execution_time_ms)),
                ("recordCount", json!(record_count)),
            ];
            let metadata: Map<String, Value> = all
                .into_iter()
                .filter(|(k, _)| rc.metadata_fields.is_empty() || rc.metadata_fields.iter().any(|f| f == k))
                .map(|(k, v)| (k.to_string(), v))
                .collect();
            json!({ "data": data, "metadata": metadata })
        } else {
            data
        };

        let mut headers: BTreeMap<String, String> = d
            .headers
            .iter()
            .filter(|h| h.is_response_header)
            .filter_map(|h| h.value.clone().map(|v| (h.key.clone(), v)))
            .collect();
        headers
            .entry("Content-Type".to_string())
            .or_insert_with(|| rc.content_type.clone());

        FormattedResponse {
            status: 200,
            headers,
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DbOperation, Header, SchemaConfig};
    use http::Method;

    fn descriptor() -> ApiDescriptor {
        ApiDescriptor::new(
            "Test",
            "T",
            Method::GET,
            "/t",
            SchemaConfig::new("HR", "T", DbOperation::Select),
        )
    }

    fn meta() -> ExecutionMetadata {
        ExecutionMetadata {
            executed_at: Utc::now(),
            execution_time_ms: 3,
        }
    }

    #[test]
    fn test_plain_body_without_metadata() {
        let out = ResponseFormatter.format(&descriptor(), json!([1, 2]), &meta());
        assert_eq!(out.body, json!([1, 2]));
        assert_eq!(out.headers["Content-Type"], "application/json");
    }

    #[test]
    fn test_metadata_allowlist() {
        let mut d = descriptor();
        d.response_config.include_metadata = true;
        d.response_config.metadata_fields = vec!["recordCount".into(), "apiCode".into()];
        let mut h = Header::request("X-Trace", "on");
        h.is_response_header = true;
        d.headers.push(h);

        let out = ResponseFormatter.format(&d, json!([{}, {}]), &meta());
        assert_eq!(out.body["metadata"], json!({"apiCode": "T", "recordCount": 2}));
        assert_eq!(out.body["data"], json!([{}, {}]));
        assert_eq!(out.headers["X-Trace"], "on");
    }
}
