//! # Descriptor Storage
//!
//! The [`ApiRepository`] trait is the only persistence seam the generator and the
//! execution path depend on. Two backends ship with the crate:
//!
//! - [`InMemoryApiRepository`] - `RwLock<HashMap>` keyed by API code, used by tests
//!   and the `memory` store backend
//! - [`SqliteApiRepository`] - one parent row per descriptor plus ordered child rows,
//!   written in a single transaction
//!
//! Both enforce the unique API code on `save` itself. The orchestrator still checks
//! [`ApiRepository::exists_by_code`] first, but a concurrent writer can slip between
//! the check and the insert; that writer gets [`StoreError::Conflict`].

mod memory;
mod sqlite;

pub use memory::InMemoryApiRepository;
pub use sqlite::SqliteApiRepository;

use crate::model::ApiDescriptor;
use chrono::{DateTime, Utc};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The API code is already stored
    Conflict { api_code: String },
    /// The backend failed (I/O, SQL, poisoned lock)
    Io(String),
    /// A stored value could not be encoded or decoded
    Serialization(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Conflict { api_code } => {
                write!(f, "API code '{api_code}' violates the unique constraint")
            }
            StoreError::Io(msg) => write!(f, "storage error: {msg}"),
            StoreError::Serialization(msg) => write!(f, "serialization error: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// Persistence for descriptor graphs.
pub trait ApiRepository: Send + Sync {
    fn exists_by_code(&self, api_code: &str) -> Result<bool, StoreError>;

    /// Persist the whole graph atomically, assigning an id when it has none.
    ///
    /// Fails with [`StoreError::Conflict`] when the code is already stored.
    fn save(&self, descriptor: ApiDescriptor) -> Result<ApiDescriptor, StoreError>;

    /// Load a descriptor with its collections sorted by position.
    fn find_by_code(&self, api_code: &str) -> Result<Option<ApiDescriptor>, StoreError>;

    /// Bump the call counter and stamp the last-called time.
    ///
    /// Returns `false` when no descriptor carries the code.
    fn record_call(&self, api_code: &str, at: DateTime<Utc>) -> Result<bool, StoreError>;
}

impl<R: ApiRepository + ?Sized> ApiRepository for std::sync::Arc<R> {
    fn exists_by_code(&self, api_code: &str) -> Result<bool, StoreError> {
        (**self).exists_by_code(api_code)
    }

    fn save(&self, descriptor: ApiDescriptor) -> Result<ApiDescriptor, StoreError> {
        (**self).save(descriptor)
    }

    fn find_by_code(&self, api_code: &str) -> Result<Option<ApiDescriptor>, StoreError> {
        (**self).find_by_code(api_code)
    }

    fn record_call(&self, api_code: &str, at: DateTime<Utc>) -> Result<bool, StoreError> {
        (**self).record_call(api_code, at)
    }
}
