//! Black-box tests of the exposition service
//!
//! Binds the real router on an ephemeral port and queries it over HTTP,
//! the way a status consumer or metrics scraper would.

use std::net::SocketAddr;

use sentinel_common::{
    Attempt, ExecutionSnapshot, ScenarioResult, SnapshotStore, SuiteRun, TestState,
};
use sentinel_web::{ArtifactRoots, WebServer};
use tempfile::TempDir;

struct TestService {
    base_url: String,
    store: SnapshotStore,
    // Held so the evidence directories outlive the server
    _dirs: TempDir,
}

async fn start_service() -> TestService {
    let dirs = tempfile::tempdir().unwrap();
    let roots = ArtifactRoots {
        videos: dirs.path().join("videos"),
        screenshots: dirs.path().join("screenshots"),
        report: dirs.path().join("status"),
    };
    std::fs::create_dir_all(&roots.videos).unwrap();

    let store = SnapshotStore::new();
    let server = WebServer::new(store.clone(), roots).unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, server.router()).await.unwrap();
    });

    TestService {
        base_url: format!("http://{addr}"),
        store,
        _dirs: dirs,
    }
}

fn passing_snapshot() -> ExecutionSnapshot {
    ExecutionSnapshot {
        runs: vec![SuiteRun {
            video: Some("/a/b/vid.mp4".into()),
            tests: vec![ScenarioResult {
                title: vec!["Goose Sighting".into(), "Record a goose sighting".into()],
                state: TestState::Passed,
                attempts: vec![Attempt { duration: 4200 }],
            }],
        }],
        started_tests_at: Some("2024-01-01T00:00:00Z".into()),
        ended_tests_at: Some("2024-01-01T00:00:05Z".into()),
        total_duration: 4200,
        total_suites: 1,
        total_tests: 1,
        total_passed: 1,
        ..Default::default()
    }
}

#[tokio::test]
async fn health_is_ok_before_any_run() {
    let svc = start_service().await;

    let resp = reqwest::get(format!("{}/health", svc.base_url))
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn summary_links_use_the_request_host() {
    let svc = start_service().await;
    svc.store.publish(passing_snapshot());

    let resp = reqwest::get(format!("{}/", svc.base_url)).await.unwrap();
    let body: serde_json::Value = resp.json().await.unwrap();

    assert_eq!(
        body["lastRun"]["tests"][0]["title"],
        "Goose Sighting | Record a goose sighting"
    );
    assert_eq!(
        body["lastRun"]["tests"][0]["videoLink"],
        format!("{}/videos/vid.mp4", svc.base_url)
    );
    assert_eq!(body["metricsLink"], format!("{}/metrics", svc.base_url));
}

#[tokio::test]
async fn summary_of_the_empty_snapshot_has_no_tests() {
    let svc = start_service().await;

    let resp = reqwest::get(format!("{}/", svc.base_url)).await.unwrap();
    let body: serde_json::Value = resp.json().await.unwrap();

    assert_eq!(body["lastRun"]["tests"].as_array().unwrap().len(), 0);
    assert!(body["lastRun"]["startedTestsAt"].is_null());
}

#[tokio::test]
async fn debug_returns_the_raw_snapshot() {
    let svc = start_service().await;
    svc.store.publish(passing_snapshot());

    let resp = reqwest::get(format!("{}/debug", svc.base_url)).await.unwrap();
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["totalPassed"], 1);
    assert_eq!(body["runs"][0]["video"], "/a/b/vid.mp4");
}

#[tokio::test]
async fn metrics_reflect_the_latest_published_snapshot() {
    let svc = start_service().await;

    let text = reqwest::get(format!("{}/metrics", svc.base_url))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(text.contains(r#"scenario_status{scenario="rollup"} 0"#));

    let mut failing = passing_snapshot();
    failing.runs[0].tests[0].state = TestState::Failed;
    failing.total_passed = 0;
    failing.total_failed = 1;
    svc.store.publish(failing);

    let text = reqwest::get(format!("{}/metrics", svc.base_url))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(text.contains(r#"scenario_status{scenario="rollup"} -1"#));
    assert!(text
        .contains(r#"scenario_status{scenario="Goose Sighting | Record a goose sighting"} -1"#));
    assert!(text
        .contains(r#"scenario_timing{scenario="Goose Sighting | Record a goose sighting"} 4200"#));
}

#[tokio::test]
async fn evidence_files_are_served_and_listed() {
    let svc = start_service().await;
    std::fs::write(svc._dirs.path().join("videos").join("vid.mp4"), b"movie").unwrap();

    let resp = reqwest::get(format!("{}/videos/vid.mp4", svc.base_url))
        .await
        .unwrap();
    assert!(resp.status().is_success());
    assert_eq!(
        resp.headers()[reqwest::header::CONTENT_TYPE]
            .to_str()
            .unwrap(),
        "video/mp4"
    );
    assert_eq!(resp.bytes().await.unwrap().as_ref(), b"movie");

    let resp = reqwest::get(format!("{}/videos/missing.mp4", svc.base_url))
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);

    let resp = reqwest::get(format!("{}/videos", svc.base_url)).await.unwrap();
    assert!(resp.status().is_success());
    assert!(resp.text().await.unwrap().contains("vid.mp4"));
}

#[tokio::test]
async fn unknown_paths_are_not_found() {
    let svc = start_service().await;
    let resp = reqwest::get(format!("{}/nope", svc.base_url)).await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
}
