use super::{ApiRepository, StoreError};
use crate::ids::ApiId;
use crate::model::ApiDescriptor;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;

/// Process-local repository keyed by API code.
#[derive(Debug, Default)]
pub struct InMemoryApiRepository {
    apis: RwLock<HashMap<String, ApiDescriptor>>,
}

impl InMemoryApiRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.apis.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> StoreError {
    StoreError::Io("repository lock poisoned".to_string())
}

impl ApiRepository for InMemoryApiRepository {
    fn exists_by_code(&self, api_code: &str) -> Result<bool, StoreError> {
        Ok(self.apis.read().map_err(|_| poisoned())?.contains_key(api_code))
    }

    fn save(&self, mut descriptor: ApiDescriptor) -> Result<ApiDescriptor, StoreError> {
        let mut apis = self.apis.write().map_err(|_| poisoned())?;
        if apis.contains_key(&descriptor.api_code) {
            return Err(StoreError::Conflict {
                api_code: descriptor.api_code,
            });
        }
        descriptor.id.get_or_insert_with(ApiId::new);
        apis.insert(descriptor.api_code.clone(), descriptor.clone());
        Ok(descriptor)
    }

    fn find_by_code(&self, api_code: &str) -> Result<Option<ApiDescriptor>, StoreError> {
        let apis = self.apis.read().map_err(|_| poisoned())?;
        Ok(apis.get(api_code).cloned().map(|mut d| {
            d.sort_by_position();
            d
        }))
    }

    fn record_call(&self, api_code: &str, at: DateTime<Utc>) -> Result<bool, StoreError> {
        let mut apis = self.apis.write().map_err(|_| poisoned())?;
        match apis.get_mut(api_code) {
            Some(d) => {
                d.total_calls += 1;
                d.last_called_at = Some(at);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DbOperation, SchemaConfig};
    use http::Method;

    fn descriptor(code: &str) -> ApiDescriptor {
        ApiDescriptor::new(
            "Test",
            code,
            Method::GET,
            "/t",
            SchemaConfig::new("HR", "T", DbOperation::Select),
        )
    }

    #[test]
    fn test_save_assigns_id_and_rejects_duplicates() {
        let repo = InMemoryApiRepository::new();
        let saved = repo.save(descriptor("A")).unwrap();
        assert!(saved.id.is_some());
        assert!(repo.exists_by_code("A").unwrap());

        let err = repo.save(descriptor("A")).unwrap_err();
        assert_eq!(
            err,
            StoreError::Conflict {
                api_code: "A".into()
            }
        );
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn test_record_call() {
        let repo = InMemoryApiRepository::new();
        repo.save(descriptor("A")).unwrap();
        let now = Utc::now();
        assert!(repo.record_call("A", now).unwrap());
        assert!(!repo.record_call("B", now).unwrap());
        let d = repo.find_by_code("A").unwrap().unwrap();
        assert_eq!(d.total_calls, 1);
        assert_eq!(d.last_called_at, Some(now));
    }
}
