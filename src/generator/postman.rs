//! Postman Collection v2.1 rendering.

use super::{by_position, ArtifactKind, ArtifactRenderer, RenderOptions};
use crate::error::RenderError;
use crate::model::{ApiDescriptor, AuthScheme, ParameterLocation};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{json, Value};
use tracing::{debug, warn};

pub const POSTMAN_SCHEMA_URL: &str =
    "https://schema.getpostman.com/json/collection/v2.1.0/collection.json";

#[derive(Debug, Clone, Default)]
pub struct PostmanRenderer {
    options: RenderOptions,
}

fn header(key: &str, value: &str) -> Value {
    json!({ "key": key, "value": value, "type": "text" })
}

fn variable(key: &str, value: &str) -> Value {
    json!({ "key": key, "value": value })
}

impl PostmanRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn collection(&self, d: &ApiDescriptor) -> Value {
        let full_path = d.full_path();
        let mut url = json!({
            "raw": format!("{{{{baseUrl}}}}{full_path}"),
            "host": ["{{baseUrl}}"],
            "path": full_path.split('/').filter(|s| !s.is_empty()).collect::<Vec<_>>(),
        });
        let query: Vec<Value> = by_position(&d.parameters, |p| p.position)
            .into_iter()
            .filter(|p| p.location == ParameterLocation::Query)
            .map(|p| {
                json!({
                    "key": p.key,
                    "value": p.example.clone().or_else(|| p.default_value.clone()).unwrap_or_default(),
                    "description": p.description.clone().unwrap_or_default(),
                    "disabled": !p.required,
                })
            })
            .collect();
        if !query.is_empty() {
            url["query"] = Value::Array(query);
        }

        let mut request = json!({
            "method": d.http_method.as_str(),
            "header": self.headers(d),
            "url": url,
        });
        if let Some(desc) = d.description.as_deref() {
            request["description"] = json!(desc);
        }
        if let Some(sample) = d.request_config.sample.as_deref() {
            let mut body = json!({ "mode": "raw", "raw": sample });
            if d.request_config.content_type.contains("json") {
                body["options"] = json!({ "raw": { "language": "json" } });
            }
            request["body"] = body;
        }

        json!({
            "info": {
                "name": d.api_name,
                "description": d.description.clone().unwrap_or_default(),
                "schema": POSTMAN_SCHEMA_URL,
            },
            "item": [{
                "name": d.api_name,
                "request": request,
                "response": responses(d),
            }],
            "variable": self.variables(d),
        })
    }

    pub fn try_render(&self, d: &ApiDescriptor) -> Result<String, RenderError> {
        debug!(api_code = %d.api_code, "rendering Postman collection");
        Ok(serde_json::to_string_pretty(&self.collection(d))?)
    }

    /// Render, degrading to `"{}"` on failure.
    pub fn render(&self, d: &ApiDescriptor) -> String {
        self.try_render(d).unwrap_or_else(|e| {
            warn!(api_code = %d.api_code, error = %e, "Postman rendering failed, emitting empty collection");
            "{}".to_string()
        })
    }

    fn headers(&self, d: &ApiDescriptor) -> Vec<Value> {
        let mut synthetic = Vec::new();
        match &d.auth_config.scheme {
            AuthScheme::ApiKey(key) => {
                synthetic.push((key.api_key_header.clone(), "{{apiKey}}".to_string()));
                if let Some(secret_header) = key.api_secret_header.as_deref() {
                    synthetic.push((secret_header.to_string(), "{{apiSecret}}".to_string()));
                }
            }
            AuthScheme::Basic(_) => synthetic.push((
                "Authorization".to_string(),
                "Basic {{base64Credentials}}".to_string(),
            )),
            AuthScheme::Jwt(_) | AuthScheme::Bearer(_) => synthetic.push((
                "Authorization".to_string(),
                "Bearer {{jwtToken}}".to_string(),
            )),
            AuthScheme::None | AuthScheme::OAuth2(_) => {}
        }

        // Auth headers replace configured headers of the same name.
        let configured: Vec<_> = by_position(&d.headers, |h| h.position)
            .into_iter()
            .filter(|h| h.is_request_header)
            .filter(|h| !synthetic.iter().any(|(k, _)| k.eq_ignore_ascii_case(&h.key)))
            .collect();

        let mut out: Vec<Value> = configured
            .iter()
            .map(|h| {
                let mut v = header(&h.key, h.value.as_deref().unwrap_or_default());
                if let Some(desc) = h.description.as_deref() {
                    v["description"] = json!(desc);
                }
                v
            })
            .collect();
        out.extend(synthetic.iter().map(|(key, value)| header(key, value)));

        let has_content_type = configured
            .iter()
            .any(|h| h.key.eq_ignore_ascii_case("Content-Type"));
        if d.request_config.sample.is_some() && !has_content_type {
            out.push(header("Content-Type", &d.request_config.content_type));
        }
        out
    }

    fn variables(&self, d: &ApiDescriptor) -> Vec<Value> {
        let mut vars = vec![variable("baseUrl", &self.options.base_url)];
        match &d.auth_config.scheme {
            AuthScheme::ApiKey(key) => {
                vars.push(variable(
                    "apiKey",
                    key.api_key_value.as_deref().unwrap_or_default(),
                ));
                if key.api_secret_header.is_some() || key.api_secret_value.is_some() {
                    vars.push(variable(
                        "apiSecret",
                        key.api_secret_value.as_deref().unwrap_or_default(),
                    ));
                }
            }
            AuthScheme::Basic(basic) => {
                let credentials = format!("{}:{}", basic.basic_username, basic.basic_password);
                vars.push(variable("base64Credentials", &STANDARD.encode(credentials)));
            }
            // The configured secret doubles as the token placeholder value.
            AuthScheme::Jwt(jwt) | AuthScheme::Bearer(jwt) => {
                vars.push(variable("jwtToken", &jwt.jwt_secret));
            }
            AuthScheme::None | AuthScheme::OAuth2(_) => {}
        }
        vars
    }
}

impl ArtifactRenderer for PostmanRenderer {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Postman
    }

    fn try_render(&self, descriptor: &ApiDescriptor) -> Result<String, RenderError> {
        PostmanRenderer::try_render(self, descriptor)
    }
}

fn responses(d: &ApiDescriptor) -> Vec<Value> {
    let content_type = &d.response_config.content_type;
    [
        ("Success Response", 200, "OK", &d.response_config.success_schema),
        ("Error Response", 400, "Bad Request", &d.response_config.error_schema),
    ]
    .into_iter()
    .filter_map(|(name, code, status, body)| {
        body.as_deref().map(|body| {
            json!({
                "name": name,
                "code": code,
                "status": status,
                "_postman_previewlanguage": "json",
                "header": [header("Content-Type", content_type)],
                "body": body,
            })
        })
    })
    .collect()
}
