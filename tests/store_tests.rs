#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use apiforge::model::{ApiTest, AuthScheme, Header, TestType};
use apiforge::store::{ApiRepository, InMemoryApiRepository, SqliteApiRepository, StoreError};
use chrono::Duration;
use common::fixtures::{get_emp_descriptor, t0, GET_EMP_JSON};
use serde_json::json;

fn backends() -> Vec<(&'static str, Box<dyn ApiRepository>)> {
    vec![
        ("memory", Box::new(InMemoryApiRepository::new())),
        ("sqlite", Box::new(SqliteApiRepository::open_in_memory().unwrap())),
    ]
}

#[test]
fn test_save_assigns_id_and_round_trips() {
    for (name, repo) in backends() {
        let mut d = get_emp_descriptor();
        d.created_at = Some(t0());
        d.updated_at = Some(t0());
        d.headers.push(Header::request("X-Trace", "on"));
        d.tests.push(ApiTest {
            name: "smoke".into(),
            test_type: TestType::Integration,
            payload: json!({"id": 1}),
        });

        assert!(!repo.exists_by_code("GET_EMP").unwrap(), "{name}");
        let saved = repo.save(d.clone()).unwrap();
        assert!(saved.id.is_some(), "{name}");
        assert!(repo.exists_by_code("GET_EMP").unwrap(), "{name}");

        let loaded = repo.find_by_code("GET_EMP").unwrap().unwrap();
        assert_eq!(loaded, saved, "{name}");
        assert_eq!(loaded.response_mappings[1].db_column, "FIRST_NAME", "{name}");
        assert_eq!(loaded.tests[0].payload, json!({"id": 1}), "{name}");
    }
}

#[test]
fn test_duplicate_code_conflicts() {
    for (name, repo) in backends() {
        repo.save(get_emp_descriptor()).unwrap();
        let err = repo.save(get_emp_descriptor()).unwrap_err();
        assert_eq!(
            err,
            StoreError::Conflict {
                api_code: "GET_EMP".into()
            },
            "{name}"
        );
    }
}

#[test]
fn test_collections_load_in_position_order() {
    for (name, repo) in backends() {
        let mut d = get_emp_descriptor();
        d.response_mappings[0].position = 9;
        repo.save(d).unwrap();
        let loaded = repo.find_by_code("GET_EMP").unwrap().unwrap();
        let fields: Vec<_> = loaded
            .response_mappings
            .iter()
            .map(|m| m.api_field.as_str())
            .collect();
        assert_eq!(fields, vec!["firstName", "id"], "{name}");
    }
}

#[test]
fn test_record_call_updates_counters() {
    for (name, repo) in backends() {
        repo.save(get_emp_descriptor()).unwrap();
        assert!(repo.record_call("GET_EMP", t0()).unwrap(), "{name}");
        let later = t0() + Duration::minutes(5);
        assert!(repo.record_call("GET_EMP", later).unwrap(), "{name}");
        assert!(!repo.record_call("MISSING", later).unwrap(), "{name}");

        let loaded = repo.find_by_code("GET_EMP").unwrap().unwrap();
        assert_eq!(loaded.total_calls, 2, "{name}");
        assert_eq!(loaded.last_called_at, Some(later), "{name}");
    }
}

#[test]
fn test_sqlite_file_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("apis.db");

    let d = apiforge::ApiDescriptor::from_json(GET_EMP_JSON).unwrap();
    let saved = {
        let repo = SqliteApiRepository::open(&path).unwrap();
        repo.save(d).unwrap()
    };

    let repo = SqliteApiRepository::open(&path).unwrap();
    let loaded = repo.find_by_code("GET_EMP").unwrap().unwrap();
    assert_eq!(loaded.id, saved.id);
    match &loaded.auth_config.scheme {
        AuthScheme::Bearer(jwt) => assert_eq!(jwt.jwt_secret, "dev-token"),
        other => panic!("unexpected scheme {other:?}"),
    }
    assert!(repo.find_by_code("OTHER").unwrap().is_none());
}
