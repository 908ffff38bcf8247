// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Request/response DTOs for the HTTP control API, kept separate from
//! `oj-core`'s internal data model so the wire shape can evolve
//! independently of the registry's storage schema.

use serde::{Deserialize, Serialize};

use oj_core::health::{ContainerHealthSample, ContainerMetricsSample, SystemHealthSample, SystemMetricsSample};
use oj_core::job::{Job, JobStatus};

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleRequest {
    pub prompt: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleResponse {
    pub job_id: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub job_id: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created: u64,
    pub started: Option<u64>,
    pub completed: Option<u64>,
    /// Filesystem path to the output archive, once built — only present
    /// once the job has reached `complete` (spec §6).
    pub output: Option<String>,
    /// Only present once the job has reached `complete`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_link: Option<String>,
    /// Logs are readable while a job is still running, so unlike
    /// `download_link` this is never omitted (spec §4.3.5, §6).
    pub logs_link: String,
}

impl StatusResponse {
    /// `output` is the archive path returned by `LifecycleManager::get_output`,
    /// already `None` for any job that hasn't reached `complete`.
    pub fn from_job(job: &Job, base_url: &str, output: Option<String>) -> Self {
        let (exit_code, error) = match &job.status {
            JobStatus::Complete { exit_code } => (Some(*exit_code), None),
            JobStatus::Error { message } => (None, Some(message.clone())),
            JobStatus::NotFound => (None, Some("Container not found.".to_string())),
            JobStatus::Other { raw } => (None, Some(format!("unrecognized container state: {raw}"))),
            JobStatus::Running | JobStatus::Cancelled => (None, None),
        };
        Self {
            job_id: job.id.to_string(),
            status: job.status.to_string(),
            exit_code,
            error,
            created: job.created,
            started: job.started,
            completed: job.completed,
            download_link: output.is_some().then(|| format!("{base_url}/download/{}", job.id)),
            logs_link: format!("{base_url}/logs/{}", job.id),
            output,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JobSummary {
    pub job_id: String,
    pub status: String,
    pub created: u64,
    pub started: Option<u64>,
    pub completed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&Job> for JobSummary {
    fn from(job: &Job) -> Self {
        let error = match &job.status {
            JobStatus::Error { message } => Some(message.clone()),
            JobStatus::NotFound => Some("Container not found.".to_string()),
            JobStatus::Other { raw } => Some(format!("unrecognized container state: {raw}")),
            JobStatus::Running | JobStatus::Complete { .. } | JobStatus::Cancelled => None,
        };
        Self {
            job_id: job.id.to_string(),
            status: job.status.to_string(),
            created: job.created,
            started: job.started,
            completed: job.completed,
            error,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JobListResponse {
    pub jobs: Vec<JobSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CancelResponse {
    pub job_id: String,
    pub cancelled: bool,
    pub status: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LogsQuery {
    pub log_type: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogsResponse {
    pub job_id: String,
    pub log_type: String,
    pub last_1000_lines: String,
    pub full_log: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { error: message.into() }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub overall_status: String,
    pub system: SystemHealthSample,
    pub containers: Vec<ContainerHealthSample>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct MetricsQuery {
    pub hours: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsResponse {
    pub system: Vec<SystemMetricsSample>,
    pub containers: std::collections::HashMap<String, Vec<ContainerMetricsSample>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AggregatedMetric {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AggregatedMetricsResponse {
    pub cpu_percent: AggregatedMetric,
    pub memory_percent: AggregatedMetric,
}

#[cfg(test)]
#[path = "wire_tests.rs"]
mod tests;
