//! # Execution Path
//!
//! Runs a stored API against a runtime request without touching a database:
//!
//! ```text
//! find_by_code → active? → ApiValidator → ApiExecutor → ResponseFormatter → record_call
//! ```
//!
//! The validator checks request shape only: credentials present and matching
//! the configured static values, roles, a fixed-window rate limit, parameter
//! presence and patterns, and the request body. [`SimulatedExecutor`] synthesizes
//! placeholder rows from the response mappings in place of a real executor.

mod executor;
mod formatter;
mod placeholder;
mod service;
mod validator;

pub use executor::*;
pub use formatter::*;
pub use placeholder::*;
pub use service::*;
pub use validator::*;

use crate::store::StoreError;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Client anonymous requests are rate-limited under.
pub const ANONYMOUS_CLIENT: &str = "anonymous";

/// One runtime call against a stored API.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionRequest {
    /// Path and query parameter values
    pub params: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Value>,
    pub client_id: String,
    pub roles: BTreeSet<String>,
}

impl Default for ExecutionRequest {
    fn default() -> Self {
        Self {
            params: BTreeMap::new(),
            headers: BTreeMap::new(),
            body: None,
            client_id: ANONYMOUS_CLIENT.to_string(),
            roles: BTreeSet::new(),
        }
    }
}

impl ExecutionRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_param(mut self, key: &str, value: &str) -> Self {
        self.params.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_client(mut self, client_id: &str) -> Self {
        self.client_id = client_id.to_string();
        self
    }

    pub fn with_role(mut self, role: &str) -> Self {
        self.roles.insert(role.to_string());
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug)]
pub enum ExecutionError {
    NotFound { api_code: String },
    Inactive { api_code: String },
    Unauthenticated(String),
    Forbidden { missing_roles: Vec<String> },
    RateLimited { limit: u32, period_secs: i64 },
    InvalidRequest(Vec<String>),
    Store(StoreError),
}

impl ExecutionError {
    /// HTTP status a transport layer would answer with.
    pub fn status(&self) -> http::StatusCode {
        use http::StatusCode;
        match self {
            ExecutionError::NotFound { .. } => StatusCode::NOT_FOUND,
            ExecutionError::Inactive { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ExecutionError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ExecutionError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ExecutionError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ExecutionError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ExecutionError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionError::NotFound { api_code } => write!(f, "no API with code '{api_code}'"),
            ExecutionError::Inactive { api_code } => write!(f, "API '{api_code}' is inactive"),
            ExecutionError::Unauthenticated(reason) => {
                write!(f, "authentication failed: {reason}")
            }
            ExecutionError::Forbidden { missing_roles } => {
                write!(f, "missing required role(s): {}", missing_roles.join(", "))
            }
            ExecutionError::RateLimited { limit, period_secs } => write!(
                f,
                "rate limit of {limit} request(s) per {period_secs}s exceeded"
            ),
            ExecutionError::InvalidRequest(problems) => {
                write!(f, "invalid request: {}", problems.join("; "))
            }
            ExecutionError::Store(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ExecutionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExecutionError::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for ExecutionError {
    fn from(e: StoreError) -> Self {
        ExecutionError::Store(e)
    }
}
