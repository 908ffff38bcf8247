// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace-level end-to-end scenarios (spec §8). Most are driven
//! against the real axum router with a [`FakeRuntime`] standing in for
//! Docker; S4 instead drives the action-executor pipeline directly,
//! since it's a worker-side scenario with no HTTP surface. Each test
//! here corresponds to a literal scenario (`S1`..`S6`) or a
//! cross-cutting invariant spec §8 names.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use oj_adapters::FakeRuntime;
use oj_core::clock::FakeClock;
use oj_core::config::OrchestratorConfig;
use oj_core::plan::{Action, ActionPlan, FileOperationKind};
use oj_daemon::{router, AppState};
use oj_engine::{HealthSupervisor, LifecycleManager, MetricsCollector};
use oj_storage::JobRegistry;

struct Harness {
    state: AppState,
    runtime: Arc<FakeRuntime>,
    dir: tempfile::TempDir,
}

fn config(dir: &std::path::Path) -> OrchestratorConfig {
    OrchestratorConfig {
        output_dir: dir.to_path_buf(),
        jobs_file: dir.join("jobs.json"),
        logs_subdir: "logs".to_string(),
        agent_image: "containerized-agent:latest".to_string(),
        retention_days: 1,
        health_check_interval: std::time::Duration::from_secs(30),
        metrics_retention_hours: 24,
        metrics_collection_interval: std::time::Duration::from_secs(30),
        listen_addr: "0.0.0.0:8000".to_string(),
    }
}

fn harness() -> Harness {
    let dir = tempfile::tempdir().expect("tempdir");
    let runtime = Arc::new(FakeRuntime::new());
    let clock = Arc::new(FakeClock::new());
    let registry = JobRegistry::load_or_create(dir.path().join("jobs.json")).expect("loads registry");
    let lifecycle = Arc::new(LifecycleManager::new(registry, runtime.clone(), clock.clone(), config(dir.path())));
    let health = Arc::new(HealthSupervisor::new(runtime.clone(), clock.clone()));
    let metrics = Arc::new(MetricsCollector::with_retention(runtime.clone(), clock, 24, 30));
    let state = AppState { lifecycle, health, metrics, base_url: "http://localhost:8000".to_string() };
    Harness { state, runtime, dir }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.expect("collect body").to_bytes();
    serde_json::from_slice(&bytes).expect("valid json body")
}

/// S1: schedule → poll to completion → download returns a zip whose
/// `result.json` echoes the original prompt as `task`.
#[tokio::test]
async fn s1_schedule_poll_complete_then_download() {
    let h = harness();
    let app = router(h.state.clone());

    let request = Request::post("/schedule")
        .header("content-type", "application/json")
        .body(Body::from(json!({"prompt": "echo Hello World"}).to_string()))
        .expect("request");
    let response = app.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "scheduled");
    let job_id = body["job_id"].as_str().expect("job_id string").to_string();

    let job = h.state.lifecycle.get_job(oj_core::id::JobId::parse(&job_id).expect("uuid")).expect("job exists");
    let container_id = job.container_id.expect("container id");
    h.runtime.mark_exited(&container_id, 0);

    // The worker always leaves result.json behind before the container
    // exits is observed, so the output directory exists by the time
    // `/status` first reports `complete` (spec §4.7).
    let output_dir = h.dir.path().join(&job_id);
    std::fs::create_dir_all(&output_dir).expect("mkdir");
    std::fs::write(output_dir.join("result.json"), json!({"task": "echo Hello World", "status": "completed"}).to_string()).expect("write manifest");

    let request = Request::get(format!("/status/{job_id}")).body(Body::empty()).expect("request");
    let response = app.clone().oneshot(request).await.expect("response");
    let body = body_json(response).await;
    assert_eq!(body["status"], "complete");
    assert!(body["download_link"].is_string());
    assert!(body["output"].is_string());

    let request = Request::get(format!("/download/{job_id}")).body(Body::empty()).expect("request");
    let response = app.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("content-type").expect("content-type"), "application/zip");
    let zip_bytes = response.into_body().collect().await.expect("collect").to_bytes();

    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_bytes.to_vec())).expect("valid zip");
    let mut manifest_file = archive.by_name("result.json").expect("result.json present in archive");
    let mut contents = String::new();
    std::io::Read::read_to_string(&mut manifest_file, &mut contents).expect("read manifest");
    let manifest: Value = serde_json::from_str(&contents).expect("manifest json");
    assert_eq!(manifest["task"], "echo Hello World");
}

/// S2: cancel a running job, then confirm `/status` reports `cancelled`
/// and `/download` 404s (no completed output was ever produced).
#[tokio::test]
async fn s2_cancel_a_running_job() {
    let h = harness();
    let app = router(h.state.clone());

    let request = Request::post("/schedule")
        .header("content-type", "application/json")
        .body(Body::from(json!({"prompt": "sleep 100"}).to_string()))
        .expect("request");
    let response = app.clone().oneshot(request).await.expect("response");
    let body = body_json(response).await;
    let job_id = body["job_id"].as_str().expect("job_id").to_string();

    let request = Request::post(format!("/cancel/{job_id}")).body(Body::empty()).expect("request");
    let response = app.clone().oneshot(request).await.expect("response");
    let body = body_json(response).await;
    assert_eq!(body["cancelled"], true);
    assert_eq!(body["status"], "cancelled");

    let request = Request::get(format!("/status/{job_id}")).body(Body::empty()).expect("request");
    let response = app.clone().oneshot(request).await.expect("response");
    let body = body_json(response).await;
    assert_eq!(body["status"], "cancelled");

    let request = Request::get(format!("/download/{job_id}")).body(Body::empty()).expect("request");
    let response = app.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// S3: a malformed id on any id-bearing route returns the pinned 400
/// body and never touches the registry (invariant 1).
#[tokio::test]
async fn s3_malformed_job_id_returns_400_on_every_route() {
    let h = harness();
    let app = router(h.state.clone());

    for (method, path) in [
        ("GET", "/status/not-a-uuid"),
        ("POST", "/cancel/not-a-uuid"),
        ("GET", "/job/not-a-uuid"),
        ("GET", "/logs/not-a-uuid"),
        ("GET", "/download/not-a-uuid"),
    ] {
        let request = Request::builder().method(method).uri(path).body(Body::empty()).expect("request");
        let response = app.clone().oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{method} {path}");
        let body = body_json(response).await;
        assert_eq!(body["error"], "Invalid job_id format (must be UUID)");
    }

    assert!(h.state.lifecycle.list_jobs().is_empty(), "malformed ids must never touch the registry");
}

/// S4: the literal "create a directory called 'test_data' ... then a
/// script that reads it" task, run through the real three-stage pipeline
/// directly (no HTTP, no container — this exercises the executor itself).
#[tokio::test]
async fn s4_create_directory_write_file_then_script_reads_it() {
    let dir = tempfile::tempdir().expect("tempdir");
    let plan = ActionPlan {
        actions: vec![
            Action::FileOperation {
                description: "create a directory called 'test_data'".into(),
                operation: FileOperationKind::CreateDirectory,
                filename: "test_data".into(),
                content: None,
            },
            Action::FileOperation {
                description: "create a file called 'data.txt' inside it".into(),
                operation: FileOperationKind::Write,
                filename: "test_data/data.txt".into(),
                content: Some("Hello World\nThis is test data\nLine 3".into()),
            },
            Action::PythonCode {
                description: "a script that reads it".into(),
                code: "print(open('test_data/data.txt').read())".into(),
            },
        ],
        estimated_time: "1 minute".into(),
        requirements: vec![],
    };

    let ctx = oj_shell::run_pipeline(dir.path().to_path_buf(), plan.clone(), std::time::Duration::from_secs(10)).await;
    let created_files = oj_shell::snapshot_workspace(dir.path()).await;
    let outcome: oj_shell::PipelineOutcome = ctx.into();

    assert_eq!(outcome.python_results.len(), 1);
    assert!(outcome.python_results[0].success, "{:?}", outcome.python_results[0]);
    assert!(
        outcome.python_results[0].output.as_deref().expect("script output").starts_with("Hello World"),
        "{:?}",
        outcome.python_results[0]
    );

    let data_file = created_files.iter().find(|f| f.filename == "test_data/data.txt").expect("data.txt captured in snapshot");
    assert_eq!(data_file.content.as_deref(), Some("Hello World\nThis is test data\nLine 3"));
}

/// Invariant 2: once `GetStatus` first observes a terminal status, a
/// second call returns the same value without re-inspecting the runtime.
#[tokio::test]
async fn terminal_absorption_stops_further_inspect_calls() {
    let h = harness();

    let job_id = h.state.lifecycle.launch_job("anything").await;
    let container_id = h.state.lifecycle.get_job(job_id).expect("job").container_id.expect("container id");
    h.runtime.mark_exited(&container_id, 0);

    let first = h.state.lifecycle.get_status(job_id).await.expect("status");
    assert_eq!(first.status, oj_core::job::JobStatus::Complete { exit_code: 0 });

    let calls_before = h.runtime.calls().len();
    let second = h.state.lifecycle.get_status(job_id).await.expect("status");
    assert_eq!(second.status, first.status);
    assert_eq!(h.runtime.calls().len(), calls_before, "terminal status must not re-inspect");
}

/// S5: two concurrent schedule calls produce distinct job ids, and the
/// on-disk snapshot parses and contains both.
#[tokio::test]
async fn s5_concurrent_schedules_produce_distinct_persisted_jobs() {
    let h = harness();
    let app = router(h.state.clone());

    let schedule = |prompt: &'static str| {
        let app = app.clone();
        async move {
            let request = Request::post("/schedule")
                .header("content-type", "application/json")
                .body(Body::from(json!({"prompt": prompt}).to_string()))
                .expect("request");
            let response = app.oneshot(request).await.expect("response");
            body_json(response).await
        }
    };

    let (a, b) = tokio::join!(schedule("task a"), schedule("task b"));
    let id_a = a["job_id"].as_str().expect("job_id").to_string();
    let id_b = b["job_id"].as_str().expect("job_id").to_string();
    assert_ne!(id_a, id_b);

    let snapshot = std::fs::read_to_string(h.dir.path().join("jobs.json")).expect("snapshot readable");
    let parsed: Value = serde_json::from_str(&snapshot).expect("snapshot parses cleanly");
    let jobs = parsed["jobs"].as_array().expect("jobs.json has a jobs array");
    let ids: Vec<&str> = jobs.iter().map(|j| j["id"].as_str().expect("job id string")).collect();
    assert!(ids.contains(&id_a.as_str()));
    assert!(ids.contains(&id_b.as_str()));
}

/// S6: simulate a process restart by loading a fresh registry from the
/// same snapshot file and confirming a completed job's status survives.
#[tokio::test]
async fn s6_status_survives_a_simulated_process_restart() {
    let h = harness();
    let job_id = h.state.lifecycle.launch_job("echo Hello World").await;
    let container_id = h.state.lifecycle.get_job(job_id).expect("job").container_id.expect("container id");
    h.runtime.mark_exited(&container_id, 0);
    h.state.lifecycle.get_status(job_id).await;

    // "Restart": a brand new registry loaded from the same jobs.json.
    let reloaded = JobRegistry::load_or_create(h.dir.path().join("jobs.json")).expect("reloads");
    let job = reloaded.get(&job_id).expect("job survives reload");
    assert_eq!(job.status, oj_core::job::JobStatus::Complete { exit_code: 0 });
}
