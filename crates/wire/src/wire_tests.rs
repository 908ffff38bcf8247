// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use oj_core::id::JobId;
use oj_core::job::Job;

#[test]
fn status_response_has_no_download_link_while_running() {
    let job = Job::new(JobId::new(), "prompt", 1);
    let resp = StatusResponse::from_job(&job, "http://localhost:8000", None);
    assert_eq!(resp.status, "running");
    assert!(resp.download_link.is_none());
    assert!(resp.output.is_none());
    assert!(!resp.logs_link.is_empty());
}

#[test]
fn status_response_has_download_link_once_complete() {
    let mut job = Job::new(JobId::new(), "prompt", 1);
    job.status = JobStatus::Complete { exit_code: 0 };
    let resp = StatusResponse::from_job(&job, "http://localhost:8000", Some("/tmp/out/output.zip".to_string()));
    assert_eq!(resp.exit_code, Some(0));
    assert!(resp.download_link.as_deref().unwrap().ends_with(&job.id.to_string()));
    assert_eq!(resp.output.as_deref(), Some("/tmp/out/output.zip"));
    assert!(resp.logs_link.ends_with(&job.id.to_string()));
}

#[test]
fn status_response_surfaces_error_message() {
    let mut job = Job::new(JobId::new(), "prompt", 1);
    job.status = JobStatus::Error { message: "docker daemon unreachable".to_string() };
    let resp = StatusResponse::from_job(&job, "http://localhost:8000", None);
    assert_eq!(resp.error.as_deref(), Some("docker daemon unreachable"));
    assert!(resp.download_link.is_none());
}

#[test]
fn not_found_status_gets_a_canned_error_message() {
    let mut job = Job::new(JobId::new(), "prompt", 1);
    job.status = JobStatus::NotFound;
    let resp = StatusResponse::from_job(&job, "http://localhost:8000", None);
    assert_eq!(resp.error.as_deref(), Some("Container not found."));
}

#[test]
fn logs_link_is_present_even_while_running() {
    let job = Job::new(JobId::new(), "prompt", 1);
    let resp = StatusResponse::from_job(&job, "http://localhost:8000", None);
    assert_eq!(resp.logs_link, format!("http://localhost:8000/logs/{}", job.id));
}
