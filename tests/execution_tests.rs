#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use apiforge::clock::{Clock, ManualClock};
use apiforge::execution::{ExecutionError, ExecutionRequest, ExecutionService};
use apiforge::model::{RateLimit, RateLimitPeriod};
use apiforge::store::{ApiRepository, InMemoryApiRepository};
use chrono::Duration;
use common::fixtures::{api_key_descriptor, t0};
use http::StatusCode;
use serde_json::json;
use std::sync::Arc;

struct Harness {
    clock: Arc<ManualClock>,
    repo: Arc<InMemoryApiRepository>,
    service: ExecutionService<Arc<InMemoryApiRepository>>,
}

fn harness(descriptors: Vec<apiforge::ApiDescriptor>) -> Harness {
    let clock = Arc::new(ManualClock::new(t0()));
    let repo = Arc::new(InMemoryApiRepository::new());
    for d in descriptors {
        repo.save(d).unwrap();
    }
    let service = ExecutionService::simulated_with_clock(
        Arc::clone(&repo),
        Arc::clone(&clock) as Arc<dyn Clock>,
    );
    Harness {
        clock,
        repo,
        service,
    }
}

fn authorized() -> ExecutionRequest {
    ExecutionRequest::new()
        .with_param("id", "7")
        .with_header("x-api-key", "k-1")
}

#[test]
fn test_execute_select_with_api_key() {
    let h = harness(vec![api_key_descriptor("GET_EMP", "k-1")]);

    let response = h.service.execute("GET_EMP", &authorized()).unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.headers["Content-Type"], "application/json");
    assert_eq!(response.body, json!([{"id": 7, "firstName": "example"}]));

    let stored = h.repo.find_by_code("GET_EMP").unwrap().unwrap();
    assert_eq!(stored.total_calls, 1);
    assert_eq!(stored.last_called_at, Some(t0()));
}

#[test]
fn test_rejections_map_to_statuses() {
    let mut inactive = api_key_descriptor("OLD_EMP", "k-1");
    inactive.is_active = false;
    let h = harness(vec![api_key_descriptor("GET_EMP", "k-1"), inactive]);

    let err = h.service.execute("NOPE", &authorized()).unwrap_err();
    assert_eq!(err.status(), StatusCode::NOT_FOUND);

    let err = h.service.execute("OLD_EMP", &authorized()).unwrap_err();
    assert!(matches!(err, ExecutionError::Inactive { .. }));

    let err = h
        .service
        .execute("GET_EMP", &ExecutionRequest::new().with_param("id", "7"))
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::UNAUTHORIZED);

    let wrong_key = ExecutionRequest::new()
        .with_param("id", "7")
        .with_header("X-API-Key", "nope");
    assert!(matches!(
        h.service.execute("GET_EMP", &wrong_key).unwrap_err(),
        ExecutionError::Unauthenticated(_)
    ));

    let bad_id = authorized().with_param("id", "7a");
    match h.service.execute("GET_EMP", &bad_id).unwrap_err() {
        ExecutionError::InvalidRequest(problems) => {
            assert_eq!(problems.len(), 1);
            assert!(problems[0].contains("'id'"));
        }
        other => panic!("unexpected error {other:?}"),
    }

    let stored = h.repo.find_by_code("GET_EMP").unwrap().unwrap();
    assert_eq!(stored.total_calls, 0);
}

#[test]
fn test_required_roles_must_all_be_held() {
    let mut d = api_key_descriptor("GET_EMP", "k-1");
    d.auth_config.policy.required_roles = vec!["hr".into(), "reader".into()];
    let h = harness(vec![d]);

    match h
        .service
        .execute("GET_EMP", &authorized().with_role("hr"))
        .unwrap_err()
    {
        ExecutionError::Forbidden { missing_roles } => assert_eq!(missing_roles, vec!["reader"]),
        other => panic!("unexpected error {other:?}"),
    }
    h.service
        .execute("GET_EMP", &authorized().with_role("hr").with_role("reader"))
        .unwrap();
}

#[test]
fn test_rate_limit_window_per_client() {
    let mut d = api_key_descriptor("GET_EMP", "k-1");
    d.auth_config.policy.rate_limit = Some(RateLimit {
        requests: 2,
        period: RateLimitPeriod::Minute,
    });
    let h = harness(vec![d]);
    let alice = authorized().with_client("alice");

    h.service.execute("GET_EMP", &alice).unwrap();
    h.service.execute("GET_EMP", &alice).unwrap();
    let err = h.service.execute("GET_EMP", &alice).unwrap_err();
    assert_eq!(err.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(matches!(
        err,
        ExecutionError::RateLimited {
            limit: 2,
            period_secs: 60
        }
    ));

    h.service
        .execute("GET_EMP", &authorized().with_client("bob"))
        .unwrap();

    h.clock.advance(Duration::seconds(60));
    h.service.execute("GET_EMP", &alice).unwrap();
}

#[test]
fn test_settings_rate_limit_applies_when_enabled() {
    let mut d = api_key_descriptor("GET_EMP", "k-1");
    d.settings.rate_limit_per_minute = Some(1);
    let h = harness(vec![d]);
    h.service.execute("GET_EMP", &authorized()).unwrap();
    h.service.execute("GET_EMP", &authorized()).unwrap();

    let mut limited = api_key_descriptor("LIM_EMP", "k-1");
    limited.settings.enable_rate_limiting = true;
    limited.settings.rate_limit_per_minute = Some(1);
    h.repo.save(limited).unwrap();
    h.service.execute("LIM_EMP", &authorized()).unwrap();
    assert!(h.service.execute("LIM_EMP", &authorized()).is_err());
}

#[test]
fn test_metadata_envelope() {
    let mut d = api_key_descriptor("GET_EMP", "k-1");
    d.response_config.include_metadata = true;
    d.response_config.metadata_fields = vec!["apiCode".into(), "timestamp".into()];
    let h = harness(vec![d]);

    let response = h.service.execute("GET_EMP", &authorized()).unwrap();
    assert_eq!(
        response.body["metadata"],
        json!({"apiCode": "GET_EMP", "timestamp": "2024-03-01T09:30:00.000Z"})
    );
    assert_eq!(response.body["data"][0]["id"], 7);
}
