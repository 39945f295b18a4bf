#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use apiforge::clock::ManualClock;
use apiforge::error::GenerationError;
use apiforge::generator::{
    sha256_hex, write_artifacts, ArtifactCacheKey, ArtifactKind, GenerationOrchestrator,
    RenderOptions,
};
use apiforge::store::{ApiRepository, InMemoryApiRepository, StoreError};
use apiforge::ApiDescriptor;
use chrono::{DateTime, Duration, Utc};
use common::fixtures::{get_emp_descriptor, t0};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn orchestrator(
    clock: &Arc<ManualClock>,
) -> GenerationOrchestrator<Arc<InMemoryApiRepository>> {
    GenerationOrchestrator::with_clock(
        Arc::new(InMemoryApiRepository::new()),
        RenderOptions::default(),
        Arc::clone(clock) as Arc<dyn apiforge::clock::Clock>,
        Duration::seconds(60),
    )
}

#[test]
fn test_generate_all_artifacts() {
    let clock = Arc::new(ManualClock::new(t0()));
    let orch = orchestrator(&clock);

    let result = orch.generate(get_emp_descriptor(), "alice").unwrap();
    assert_eq!(result.artifacts.len(), 3);

    let sql = result.artifact(ArtifactKind::Plsql).unwrap();
    assert!(sql.contains("-- Generated: 2024-03-01T09:30:00Z"));
    assert!(sql.contains("AND EMPLOYEE_ID = p_id;"));

    let openapi: serde_json::Value =
        serde_json::from_str(result.artifact(ArtifactKind::Openapi).unwrap()).unwrap();
    assert!(openapi["paths"]["/employees/{id}"]["get"].is_object());

    let stored = orch.repository().find_by_code("GET_EMP").unwrap().unwrap();
    assert_eq!(stored.id, Some(result.persisted_id));
    assert_eq!(stored.created_by.as_deref(), Some("alice"));
    assert_eq!(stored.created_at, Some(t0()));
    assert!(stored.is_active);
}

#[test]
fn test_metadata_counts_and_digests() {
    let clock = Arc::new(ManualClock::new(t0()));
    let orch = orchestrator(&clock);
    let result = orch.generate(get_emp_descriptor(), "alice").unwrap();

    let meta = &result.metadata;
    assert_eq!(meta.parameter_count, 1);
    assert_eq!(meta.response_mapping_count, 2);
    assert_eq!(meta.header_count, 0);
    assert_eq!(meta.generated_at, t0());
    for (kind, text) in &result.artifacts {
        assert_eq!(meta.digests[kind], sha256_hex(text));
        assert_eq!(meta.digests[kind].len(), 64);
    }
}

#[test]
fn test_optional_artifacts_are_gated() {
    let clock = Arc::new(ManualClock::new(t0()));
    let orch = orchestrator(&clock);
    let mut d = get_emp_descriptor();
    d.settings.generate_swagger = false;
    d.settings.generate_postman = false;
    d.settings.generate_client_sdk = true;

    let result = orch.generate(d, "alice").unwrap();
    assert_eq!(
        result.artifacts.keys().copied().collect::<Vec<_>>(),
        vec![ArtifactKind::Plsql]
    );
    assert!(result.artifact(ArtifactKind::Postman).is_none());
}

#[test]
fn test_duplicate_code_rejected_without_second_save() {
    let clock = Arc::new(ManualClock::new(t0()));
    let orch = orchestrator(&clock);
    orch.generate(get_emp_descriptor(), "alice").unwrap();

    let mut again = get_emp_descriptor();
    again.api_name = "Other".into();
    let err = orch.generate(again, "bob").unwrap_err();
    assert!(matches!(err, GenerationError::DuplicateCode { ref api_code } if api_code == "GET_EMP"));

    assert_eq!(orch.repository().len(), 1);
    let stored = orch.repository().find_by_code("GET_EMP").unwrap().unwrap();
    assert_eq!(stored.api_name, "Get Employee");
}

#[test]
fn test_lint_errors_abort_before_persisting() {
    let clock = Arc::new(ManualClock::new(t0()));
    let orch = orchestrator(&clock);
    let mut d = get_emp_descriptor();
    d.api_code = "get emp".into();
    d.schema_config.object_name = String::new();

    match orch.generate(d, "alice").unwrap_err() {
        GenerationError::InvalidDescriptor { issues } => {
            let kinds: Vec<_> = issues.iter().map(|i| i.kind.as_str()).collect();
            assert!(kinds.contains(&"invalid_api_code"));
            assert!(kinds.contains(&"empty_object_name"));
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(orch.repository().is_empty());
}

#[test]
fn test_missing_operation_still_generates() {
    let clock = Arc::new(ManualClock::new(t0()));
    let orch = orchestrator(&clock);
    let mut d = get_emp_descriptor();
    d.schema_config.operation = None;

    let result = orch.generate(d, "alice").unwrap();
    assert!(result
        .artifact(ArtifactKind::Plsql)
        .unwrap()
        .contains("        NULL;\n"));
}

#[test]
fn test_artifact_cache_expires_with_clock() {
    let clock = Arc::new(ManualClock::new(t0()));
    let orch = orchestrator(&clock);
    let generated = orch.generate(get_emp_descriptor(), "alice").unwrap();

    let first = orch.artifact("GET_EMP", ArtifactKind::Postman).unwrap();
    assert_eq!(Some(first.as_str()), generated.artifact(ArtifactKind::Postman));
    let key = ArtifactCacheKey {
        api_code: "GET_EMP".into(),
        kind: ArtifactKind::Postman,
    };
    assert_eq!(orch.cache().entry(&key).unwrap().stored_at, t0());

    clock.advance(Duration::seconds(30));
    orch.artifact("GET_EMP", ArtifactKind::Postman).unwrap();
    assert_eq!(orch.cache().entry(&key).unwrap().stored_at, t0());

    clock.advance(Duration::seconds(30));
    assert!(orch.cache().get(&key).is_none());
    orch.artifact("GET_EMP", ArtifactKind::Postman).unwrap();
    assert_eq!(
        orch.cache().entry(&key).unwrap().stored_at,
        t0() + Duration::seconds(60)
    );
}

#[test]
fn test_artifact_invalidate_and_not_found() {
    let clock = Arc::new(ManualClock::new(t0()));
    let orch = orchestrator(&clock);
    orch.generate(get_emp_descriptor(), "alice").unwrap();
    for kind in ArtifactKind::ALL {
        orch.artifact("GET_EMP", kind).unwrap();
    }
    assert_eq!(orch.cache().len(), 3);
    assert_eq!(orch.invalidate("GET_EMP"), 3);
    assert!(orch.cache().is_empty());

    let err = orch.artifact("NOPE", ArtifactKind::Plsql).unwrap_err();
    assert!(matches!(err, GenerationError::NotFound { .. }));
}

#[test]
fn test_write_artifacts_to_directory() {
    let clock = Arc::new(ManualClock::new(t0()));
    let orch = orchestrator(&clock);
    let result = orch.generate(get_emp_descriptor(), "alice").unwrap();

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("generated");
    let written = write_artifacts(&result, "GET_EMP", &out).unwrap();

    let names: Vec<_> = written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec![
            "GET_EMP_pkg.sql",
            "GET_EMP.openapi.json",
            "GET_EMP.postman_collection.json"
        ]
    );
    let sql = std::fs::read_to_string(&written[0]).unwrap();
    assert_eq!(sql, result.artifacts[&ArtifactKind::Plsql]);
}

/// Another writer inserts the same code between the existence check and the save.
#[derive(Default)]
struct RacingRepository {
    saves: AtomicUsize,
}

impl ApiRepository for RacingRepository {
    fn exists_by_code(&self, _api_code: &str) -> Result<bool, StoreError> {
        Ok(false)
    }

    fn save(&self, descriptor: ApiDescriptor) -> Result<ApiDescriptor, StoreError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Conflict {
            api_code: descriptor.api_code,
        })
    }

    fn find_by_code(&self, _api_code: &str) -> Result<Option<ApiDescriptor>, StoreError> {
        Ok(None)
    }

    fn record_call(&self, _api_code: &str, _at: DateTime<Utc>) -> Result<bool, StoreError> {
        Ok(false)
    }
}

#[test]
fn test_unique_constraint_race_reports_duplicate_code() {
    let clock = Arc::new(ManualClock::new(t0()));
    let orch = GenerationOrchestrator::with_clock(
        RacingRepository::default(),
        RenderOptions::default(),
        Arc::clone(&clock) as Arc<dyn apiforge::clock::Clock>,
        Duration::seconds(60),
    );

    match orch.generate(get_emp_descriptor(), "alice") {
        Err(GenerationError::DuplicateCode { api_code }) => assert_eq!(api_code, "GET_EMP"),
        other => panic!("unexpected result {other:?}"),
    }
    assert_eq!(orch.repository().saves.load(Ordering::SeqCst), 1);
    assert!(orch.cache().is_empty());
}
