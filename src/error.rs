//! Error types for generation and rendering.
//!
//! Storage, execution and configuration errors live next to their modules
//! ([`crate::store::StoreError`], [`crate::execution::ExecutionError`],
//! [`crate::config::ConfigError`]); this module holds the ones the generator raises.

use crate::generator::ArtifactKind;
use crate::lint::LintIssue;
use crate::store::StoreError;
use std::fmt;

/// Failure while turning a descriptor into one artifact.
#[derive(Debug)]
pub enum RenderError {
    /// The PL/SQL template failed to format
    Template(askama::Error),
    /// A JSON document could not be serialized
    Json(serde_json::Error),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Template(e) => write!(f, "template rendering failed: {e}"),
            RenderError::Json(e) => write!(f, "JSON serialization failed: {e}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Template(e) => Some(e),
            RenderError::Json(e) => Some(e),
        }
    }
}

impl From<askama::Error> for RenderError {
    fn from(e: askama::Error) -> Self {
        RenderError::Template(e)
    }
}

impl From<serde_json::Error> for RenderError {
    fn from(e: serde_json::Error) -> Self {
        RenderError::Json(e)
    }
}

/// Failure of a whole generation call.
///
/// Every variant aborts the request. Optional JSON artifacts never surface
/// here; they degrade to `"{}"` inside their renderer instead.
#[derive(Debug)]
pub enum GenerationError {
    /// The descriptor failed linting; nothing was persisted
    InvalidDescriptor {
        /// Error-severity issues only
        issues: Vec<LintIssue>,
    },
    /// The API code is already taken; nothing was persisted
    DuplicateCode {
        api_code: String,
    },
    /// The repository failed for a reason other than a duplicate code
    Persistence(StoreError),
    /// A mandatory artifact failed to render
    Render {
        kind: ArtifactKind,
        source: RenderError,
    },
    /// No stored descriptor carries this code
    NotFound {
        api_code: String,
    },
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationError::InvalidDescriptor { issues } => {
                write!(f, "descriptor is invalid ({} error(s))", issues.len())?;
                for issue in issues {
                    write!(f, "; {}: {}", issue.location, issue.message)?;
                }
                Ok(())
            }
            GenerationError::DuplicateCode { api_code } => {
                write!(f, "API code '{api_code}' already exists")
            }
            GenerationError::Persistence(e) => write!(f, "failed to persist descriptor: {e}"),
            GenerationError::Render { kind, source } => {
                write!(f, "failed to render {kind} artifact: {source}")
            }
            GenerationError::NotFound { api_code } => {
                write!(f, "no API with code '{api_code}'")
            }
        }
    }
}

impl std::error::Error for GenerationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GenerationError::Persistence(e) => Some(e),
            GenerationError::Render { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<StoreError> for GenerationError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict { api_code } => GenerationError::DuplicateCode { api_code },
            other => GenerationError::Persistence(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_becomes_duplicate_code() {
        let err: GenerationError = StoreError::Conflict {
            api_code: "GET_EMP".into(),
        }
        .into();
        assert!(matches!(err, GenerationError::DuplicateCode { ref api_code } if api_code == "GET_EMP"));
        assert_eq!(err.to_string(), "API code 'GET_EMP' already exists");
    }

    #[test]
    fn test_io_stays_persistence() {
        let err: GenerationError = StoreError::Io("disk full".into()).into();
        assert!(matches!(err, GenerationError::Persistence(_)));
    }
}
