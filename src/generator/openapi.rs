//! OpenAPI 3.0 rendering.
//!
//! One path with one operation, built from the same descriptor as the PL/SQL
//! package. Fixed error responses are always present; the 200 schema comes from
//! `responseConfig.successSchema` when it parses as JSON and is synthesized from
//! the included response mappings otherwise.

use super::{by_position, ArtifactKind, ArtifactRenderer, RenderOptions};
use crate::error::RenderError;
use crate::model::{ApiDescriptor, AuthScheme};
use http::StatusCode;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

pub const OPENAPI_VERSION: &str = "3.0.0";

const ERROR_STATUSES: [StatusCode; 6] = [
    StatusCode::BAD_REQUEST,
    StatusCode::UNAUTHORIZED,
    StatusCode::FORBIDDEN,
    StatusCode::NOT_FOUND,
    StatusCode::TOO_MANY_REQUESTS,
    StatusCode::INTERNAL_SERVER_ERROR,
];

#[derive(Debug, Clone, Default)]
pub struct OpenApiRenderer {
    options: RenderOptions,
}

impl OpenApiRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Build the document as a JSON value.
    pub fn document(&self, d: &ApiDescriptor) -> Value {
        let mut info = json!({
            "title": d.api_name,
            "description": d.description.clone().unwrap_or_default(),
            "version": d.version,
        });
        if let Some(owner) = d.owner.as_deref() {
            info["contact"] = json!({ "name": owner });
        }

        let mut operation = Map::new();
        operation.insert("operationId".into(), json!(d.api_code.to_lowercase()));
        operation.insert("summary".into(), json!(d.api_name));
        if let Some(desc) = d.description.as_deref() {
            operation.insert("description".into(), json!(desc));
        }
        let tags: Vec<&str> = if d.tags.is_empty() {
            vec!["default"]
        } else {
            d.tags.iter().map(String::as_str).collect()
        };
        operation.insert("tags".into(), json!(tags));
        operation.insert("parameters".into(), Value::Array(parameters(d)));
        if let Some(body) = request_body(d) {
            operation.insert("requestBody".into(), body);
        }
        operation.insert("responses".into(), responses(d));

        let mut doc = json!({
            "openapi": OPENAPI_VERSION,
            "info": info,
            "servers": [{
                "url": format!("{{baseUrl}}{}", d.base_path.trim_end_matches('/')),
                "variables": {
                    "baseUrl": { "default": self.options.base_url }
                }
            }],
        });

        if let Some((name, scheme, scopes)) = self.security_scheme(&d.auth_config.scheme) {
            operation.insert("security".into(), json!([{ name: scopes }]));
            doc["components"] = json!({ "securitySchemes": { name: scheme } });
        }

        let mut path_item = Map::new();
        path_item.insert(
            d.http_method.as_str().to_lowercase(),
            Value::Object(operation),
        );
        let mut paths = Map::new();
        paths.insert(d.endpoint_path.clone(), Value::Object(path_item));
        doc["paths"] = Value::Object(paths);
        doc
    }

    pub fn try_render(&self, d: &ApiDescriptor) -> Result<String, RenderError> {
        debug!(api_code = %d.api_code, "rendering OpenAPI document");
        Ok(serde_json::to_string_pretty(&self.document(d))?)
    }

    /// Render, degrading to `"{}"` on failure.
    pub fn render(&self, d: &ApiDescriptor) -> String {
        self.try_render(d).unwrap_or_else(|e| {
            warn!(api_code = %d.api_code, error = %e, "OpenAPI rendering failed, emitting empty document");
            "{}".to_string()
        })
    }

    fn security_scheme(&self, scheme: &AuthScheme) -> Option<(&'static str, Value, Vec<String>)> {
        match scheme {
            AuthScheme::None => None,
            AuthScheme::ApiKey(key) => Some((
                "apiKeyAuth",
                json!({ "type": "apiKey", "in": "header", "name": key.api_key_header }),
                Vec::new(),
            )),
            AuthScheme::Basic(_) => Some((
                "basicAuth",
                json!({ "type": "http", "scheme": "basic" }),
                Vec::new(),
            )),
            AuthScheme::Jwt(_) | AuthScheme::Bearer(_) => Some((
                "bearerAuth",
                json!({ "type": "http", "scheme": "bearer", "bearerFormat": "JWT" }),
                Vec::new(),
            )),
            AuthScheme::OAuth2(oauth) => {
                let scopes: Map<String, Value> = oauth
                    .oauth_scopes
                    .iter()
                    .map(|s| (s.clone(), json!(format!("{s} access"))))
                    .collect();
                let token_url = oauth
                    .oauth_token_url
                    .clone()
                    .unwrap_or_else(|| self.options.default_oauth_token_url.clone());
                Some((
                    "oauth2",
                    json!({
                        "type": "oauth2",
                        "flows": {
                            "clientCredentials": {
                                "tokenUrl": token_url,
                                "scopes": scopes,
                            }
                        }
                    }),
                    oauth.oauth_scopes.clone(),
                ))
            }
        }
    }
}

impl ArtifactRenderer for OpenApiRenderer {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Openapi
    }

    fn try_render(&self, descriptor: &ApiDescriptor) -> Result<String, RenderError> {
        OpenApiRenderer::try_render(self, descriptor)
    }
}

fn parameters(d: &ApiDescriptor) -> Vec<Value> {
    by_position(&d.parameters, |p| p.position)
        .into_iter()
        .map(|p| {
            let mut schema = json!({ "type": p.api_type });
            if let Some(pattern) = p.validation_pattern.as_deref() {
                schema["pattern"] = json!(pattern);
            }
            let mut param = json!({
                "name": p.key,
                "in": p.location.as_str(),
                "description": p.description.clone().unwrap_or_default(),
                "required": p.required,
                "schema": schema,
            });
            if let Some(example) = p.example.as_deref() {
                param["example"] = json!(example);
            }
            param
        })
        .collect()
}

fn parse_json(text: Option<&str>) -> Option<Value> {
    text.and_then(|t| serde_json::from_str(t).ok())
}

fn request_body(d: &ApiDescriptor) -> Option<Value> {
    let sample = d.request_config.sample.as_deref()?;
    let schema = parse_json(Some(sample)).unwrap_or_else(|| json!({ "type": "object" }));
    Some(json!({
        "required": true,
        "content": {
            d.request_config.content_type.as_str(): { "schema": schema }
        }
    }))
}

/// Object schema built from the included response mappings.
pub fn mapping_schema(d: &ApiDescriptor) -> Value {
    let properties: Map<String, Value> = by_position(&d.response_mappings, |m| m.position)
        .into_iter()
        .filter(|m| m.include_in_response)
        .map(|m| {
            let mut prop = json!({ "type": m.api_type });
            if let Some(format) = m.format.as_deref() {
                prop["format"] = json!(format);
            }
            if m.nullable {
                prop["nullable"] = json!(true);
            }
            (m.api_field.clone(), prop)
        })
        .collect();
    json!({ "type": "object", "properties": properties })
}

fn responses(d: &ApiDescriptor) -> Value {
    let success = parse_json(d.response_config.success_schema.as_deref())
        .unwrap_or_else(|| mapping_schema(d));
    let error_schema = parse_json(d.response_config.error_schema.as_deref());
    let content_type = d.response_config.content_type.as_str();

    let mut responses = Map::new();
    responses.insert(
        "200".into(),
        json!({
            "description": "Successful response",
            "content": { content_type: { "schema": success } }
        }),
    );
    for status in ERROR_STATUSES {
        let mut entry = json!({
            "description": status.canonical_reason().unwrap_or("Error"),
        });
        if let Some(schema) = &error_schema {
            entry["content"] = json!({ content_type: { "schema": schema } });
        }
        responses.insert(status.as_str().to_string(), entry);
    }
    Value::Object(responses)
}
