use super::{ExecutionError, ExecutionRequest};
use crate::cache::TtlCache;
use crate::clock::Clock;
use crate::model::{ApiDescriptor, AuthScheme, ParameterLocation, RateLimit, RateLimitPeriod};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Duration;
use regex::Regex;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Checks a request against a descriptor before it is executed.
pub trait ApiValidator: Send + Sync {
    fn validate_authentication(
        &self,
        descriptor: &ApiDescriptor,
        request: &ExecutionRequest,
    ) -> Result<(), ExecutionError>;

    fn validate_authorization(
        &self,
        descriptor: &ApiDescriptor,
        request: &ExecutionRequest,
    ) -> Result<(), ExecutionError>;

    fn check_rate_limit(
        &self,
        descriptor: &ApiDescriptor,
        request: &ExecutionRequest,
    ) -> Result<(), ExecutionError>;

    fn validate_parameters(
        &self,
        descriptor: &ApiDescriptor,
        request: &ExecutionRequest,
    ) -> Result<(), ExecutionError>;

    /// Run every check in order, stopping at the first failure.
    fn validate(
        &self,
        descriptor: &ApiDescriptor,
        request: &ExecutionRequest,
    ) -> Result<(), ExecutionError> {
        self.validate_authentication(descriptor, request)?;
        self.validate_authorization(descriptor, request)?;
        self.check_rate_limit(descriptor, request)?;
        self.validate_parameters(descriptor, request)
    }
}

/// Rate-limit counters are tracked per API and client.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RateWindowKey {
    pub api_code: String,
    pub client_id: String,
}

/// The current fixed window of one client and the calls made in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateWindow {
    /// Window index: unix seconds divided by the period length
    pub window: i64,
    pub used: u32,
}

/// Shape-only validator driven entirely by the descriptor.
pub struct DescriptorValidator {
    windows: TtlCache<RateWindowKey, RateWindow>,
    counter_lock: Mutex<()>,
}

impl DescriptorValidator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        // Windows never outlive the longest period.
        let ttl = Duration::seconds(RateLimitPeriod::Day.as_seconds());
        Self {
            windows: TtlCache::new(ttl, clock),
            counter_lock: Mutex::new(()),
        }
    }

    /// Number of (API, client) pairs with a tracked window.
    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }

    fn effective_rate_limit(d: &ApiDescriptor) -> Option<RateLimit> {
        d.auth_config.policy.rate_limit.or_else(|| {
            if d.settings.enable_rate_limiting {
                d.settings.rate_limit_per_minute.map(|requests| RateLimit {
                    requests,
                    period: RateLimitPeriod::Minute,
                })
            } else {
                None
            }
        })
    }
}

fn unauthenticated(reason: impl Into<String>) -> ExecutionError {
    ExecutionError::Unauthenticated(reason.into())
}

fn bearer_token(request: &ExecutionRequest) -> Result<&str, ExecutionError> {
    let auth = request
        .header("Authorization")
        .ok_or_else(|| unauthenticated("missing Authorization header"))?;
    let token = auth
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| unauthenticated("expected a Bearer token"))?;
    Ok(token)
}

fn expect_header(
    request: &ExecutionRequest,
    name: &str,
    configured: Option<&str>,
) -> Result<(), ExecutionError> {
    let value = request
        .header(name)
        .ok_or_else(|| unauthenticated(format!("missing {name} header")))?;
    match configured {
        Some(expected) if expected != value => {
            Err(unauthenticated(format!("{name} does not match")))
        }
        _ => Ok(()),
    }
}

fn is_schema(value: &Value) -> bool {
    value
        .as_object()
        .map(|o| o.contains_key("$schema") || o.contains_key("type") || o.contains_key("properties"))
        .unwrap_or(false)
}

impl ApiValidator for DescriptorValidator {
    fn validate_authentication(
        &self,
        d: &ApiDescriptor,
        request: &ExecutionRequest,
    ) -> Result<(), ExecutionError> {
        match &d.auth_config.scheme {
            AuthScheme::None => Ok(()),
            AuthScheme::ApiKey(key) => {
                expect_header(request, &key.api_key_header, key.api_key_value.as_deref())?;
                if let Some(secret_header) = key.api_secret_header.as_deref() {
                    expect_header(request, secret_header, key.api_secret_value.as_deref())?;
                }
                Ok(())
            }
            AuthScheme::Basic(basic) => {
                let encoded = request
                    .header("Authorization")
                    .and_then(|h| h.strip_prefix("Basic "))
                    .ok_or_else(|| unauthenticated("expected Basic credentials"))?;
                let decoded = STANDARD
                    .decode(encoded.trim())
                    .ok()
                    .and_then(|bytes| String::from_utf8(bytes).ok())
                    .ok_or_else(|| unauthenticated("malformed Basic credentials"))?;
                let expected = format!("{}:{}", basic.basic_username, basic.basic_password);
                if decoded == expected {
                    Ok(())
                } else {
                    Err(unauthenticated("invalid username or password"))
                }
            }
            AuthScheme::Jwt(_) => {
                let token = bearer_token(request)?;
                if token.split('.').filter(|s| !s.is_empty()).count() == 3 {
                    Ok(())
                } else {
                    Err(unauthenticated("token is not a JWT"))
                }
            }
            AuthScheme::Bearer(_) | AuthScheme::OAuth2(_) => bearer_token(request).map(|_| ()),
        }
    }

    fn validate_authorization(
        &self,
        d: &ApiDescriptor,
        request: &ExecutionRequest,
    ) -> Result<(), ExecutionError> {
        let missing_roles: Vec<String> = d
            .auth_config
            .policy
            .required_roles
            .iter()
            .filter(|r| !request.roles.contains(*r))
            .cloned()
            .collect();
        if missing_roles.is_empty() {
            Ok(())
        } else {
            Err(ExecutionError::Forbidden { missing_roles })
        }
    }

    fn check_rate_limit(
        &self,
        d: &ApiDescriptor,
        request: &ExecutionRequest,
    ) -> Result<(), ExecutionError> {
        let Some(limit) = Self::effective_rate_limit(d) else {
            return Ok(());
        };
        let period_secs = limit.period.as_seconds();
        let now = self.windows.now();
        let window = now.timestamp().div_euclid(period_secs);
        let key = RateWindowKey {
            api_code: d.api_code.clone(),
            client_id: request.client_id.clone(),
        };

        let _guard = self.counter_lock.lock().unwrap_or_else(|e| e.into_inner());
        // Clients idle for longer than the longest period are dropped.
        self.windows.purge_expired();
        let used = match self.windows.get(&key) {
            Some(current) if current.window == window => current.used,
            _ => 0,
        };
        if used >= limit.requests {
            debug!(api_code = %d.api_code, client = %request.client_id, used, "rate limit exceeded");
            return Err(ExecutionError::RateLimited {
                limit: limit.requests,
                period_secs,
            });
        }
        self.windows.insert(
            key,
            RateWindow {
                window,
                used: used + 1,
            },
        );
        Ok(())
    }

    fn validate_parameters(
        &self,
        d: &ApiDescriptor,
        request: &ExecutionRequest,
    ) -> Result<(), ExecutionError> {
        let mut problems = Vec::new();
        let body_field = |key: &str| -> Option<String> {
            request.body.as_ref()?.get(key).map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
        };

        for p in &d.parameters {
            let value = match p.location {
                ParameterLocation::Path | ParameterLocation::Query => {
                    request.params.get(&p.key).cloned()
                }
                ParameterLocation::Header => request.header(&p.key).map(str::to_string),
                ParameterLocation::Body => body_field(&p.key),
            };
            let Some(value) = value else {
                if p.required && p.default_value.is_none() {
                    problems.push(format!("missing required {} parameter '{}'", p.location, p.key));
                }
                continue;
            };
            if let Some(pattern) = p.validation_pattern.as_deref() {
                match Regex::new(&format!("^(?:{pattern})$")) {
                    Ok(re) if re.is_match(&value) => {}
                    Ok(_) => problems.push(format!(
                        "parameter '{}' does not match pattern {pattern}",
                        p.key
                    )),
                    Err(e) => problems.push(format!("pattern for '{}' is invalid: {e}", p.key)),
                }
            }
        }

        let rc = &d.request_config;
        if let Some(body) = request.body.as_ref() {
            if let Some(max) = rc.max_size_bytes {
                let size = body.to_string().len() as u64;
                if size > max {
                    problems.push(format!("request body is {size} bytes, limit is {max}"));
                }
            }
            for field in &rc.required_fields {
                if body.get(field).is_none() {
                    problems.push(format!("missing required body field '{field}'"));
                }
            }
            if rc.validate_schema {
                let schema = rc
                    .sample
                    .as_deref()
                    .and_then(|s| serde_json::from_str::<Value>(s).ok())
                    .filter(is_schema);
                if let Some(schema) = schema {
                    match jsonschema::validator_for(&schema) {
                        Ok(validator) => problems.extend(
                            validator
                                .iter_errors(body)
                                .map(|err| format!("body: {err}")),
                        ),
                        Err(e) => problems.push(format!("request schema is invalid: {e}")),
                    }
                }
            }
        } else if !rc.required_fields.is_empty() {
            problems.push("request body is required".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ExecutionError::InvalidRequest(problems))
        }
    }
}
