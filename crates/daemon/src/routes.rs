// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP Control API handlers (C4, spec §4.4/§6). Every `job_id` path
//! parameter is parsed as a UUID at the boundary; a malformed one never
//! reaches the lifecycle manager.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};

use oj_core::id::JobId;
use oj_engine::LogKind;
use oj_wire::{
    AggregatedMetric, AggregatedMetricsResponse, CancelResponse, HealthResponse, JobListResponse, JobSummary, LogsQuery,
    LogsResponse, MetricsQuery, MetricsResponse, ScheduleRequest, ScheduleResponse, StatusResponse,
};

use crate::error::ApiError;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/schedule", post(schedule))
        .route("/status/:id", get(status))
        .route("/cancel/:id", post(cancel))
        .route("/jobs", get(list_jobs))
        .route("/job/:id", get(get_job))
        .route("/logs/:id", get(logs_summary))
        .route("/logs/:id/:kind", get(logs_download))
        .route("/download/:id", get(download))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/metrics/aggregate", get(metrics_aggregate))
        .with_state(state)
}

fn parse_id(raw: &str) -> Result<JobId, ApiError> {
    JobId::parse(raw).map_err(|_| ApiError::InvalidJobId)
}

async fn index() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "orchestration server is running." }))
}

async fn schedule(State(state): State<AppState>, Json(req): Json<ScheduleRequest>) -> impl IntoResponse {
    let id = state.lifecycle.launch_job(req.prompt).await;
    (StatusCode::OK, Json(ScheduleResponse { job_id: id.to_string(), status: "scheduled".to_string() }))
}

async fn status(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<StatusResponse>, ApiError> {
    let id = parse_id(&id)?;
    let job = state.lifecycle.get_status(id).await.ok_or_else(|| ApiError::NotFound("job not found".to_string()))?;
    let output = state.lifecycle.get_output(id).await.map(|path| path.to_string_lossy().into_owned());
    Ok(Json(StatusResponse::from_job(&job, &state.base_url, output)))
}

async fn cancel(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<CancelResponse>, ApiError> {
    let id = parse_id(&id)?;
    let cancelled = state.lifecycle.cancel_job(id).await;
    let job = state.lifecycle.get_job(id).ok_or_else(|| ApiError::NotFound("job not found".to_string()))?;
    Ok(Json(CancelResponse { job_id: id.to_string(), cancelled, status: job.status.to_string() }))
}

async fn list_jobs(State(state): State<AppState>) -> Json<JobListResponse> {
    let jobs = state.lifecycle.list_jobs().iter().map(JobSummary::from).collect();
    Json(JobListResponse { jobs })
}

async fn get_job(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    let job = state.lifecycle.get_job(id).ok_or_else(|| ApiError::NotFound("job not found".to_string()))?;
    Ok(Json(job).into_response())
}

async fn logs_summary(State(state): State<AppState>, Path(id): Path<String>, Query(query): Query<LogsQuery>) -> Result<Json<LogsResponse>, ApiError> {
    let id = parse_id(&id)?;
    let kind = match query.log_type.as_deref() {
        Some(raw) => LogKind::parse(raw).ok_or_else(|| ApiError::BadRequest(format!("unknown log_type: {raw}")))?,
        None => LogKind::Stdout,
    };
    let full_log = state.lifecycle.read_log(id, kind).await.unwrap_or_default();
    let last_1000_lines = state.lifecycle.last_lines(id, kind, 1000).await.unwrap_or_default();
    Ok(Json(LogsResponse {
        job_id: id.to_string(),
        log_type: query.log_type.unwrap_or_else(|| "stdout".to_string()),
        last_1000_lines,
        full_log,
    }))
}

async fn logs_download(State(state): State<AppState>, Path((id, kind)): Path<(String, String)>) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    let kind = LogKind::parse(&kind).ok_or_else(|| ApiError::BadRequest(format!("unknown log kind: {kind}")))?;
    let content = state.lifecycle.read_log(id, kind).await.ok_or_else(|| ApiError::NotFound("log file not found".to_string()))?;
    Ok(([(header::CONTENT_TYPE, "text/plain")], content).into_response())
}

async fn download(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    let path = state.lifecycle.get_output(id).await.ok_or_else(|| ApiError::NotFound("output not available".to_string()))?;
    let bytes = tokio::fs::read(&path).await.map_err(|err| ApiError::Fault(format!("failed to read archive: {err}")))?;
    Ok(([(header::CONTENT_TYPE, "application/zip")], bytes).into_response())
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let (overall, system, containers) = state.health.latest();
    Json(HealthResponse {
        overall_status: overall.to_string(),
        system: system.unwrap_or(oj_core::health::SystemHealthSample {
            status: overall,
            cpu_percent: 0.0,
            memory_percent: 0.0,
            disk_percent: 0.0,
            load_average: [0.0, 0.0, 0.0],
            active_containers: 0,
            failed_containers: 0,
            sampled_at: 0,
        }),
        containers,
    })
}

async fn metrics(State(state): State<AppState>, Query(query): Query<MetricsQuery>) -> Json<MetricsResponse> {
    let hours = query.hours.unwrap_or(24);
    let system = state.metrics.system_history(hours);
    let containers: HashMap<_, _> = state
        .metrics
        .tracked_container_ids()
        .into_iter()
        .map(|id| {
            let history = state.metrics.container_history(&id, hours);
            (id, history)
        })
        .collect();
    Json(MetricsResponse { system, containers })
}

async fn metrics_aggregate(State(state): State<AppState>, Query(query): Query<MetricsQuery>) -> Result<Json<AggregatedMetricsResponse>, ApiError> {
    let hours = query.hours.unwrap_or(24);
    let (cpu, memory) = state.metrics.system_aggregate(hours).ok_or_else(|| ApiError::NotFound("no metrics recorded in that window".to_string()))?;
    Ok(Json(AggregatedMetricsResponse {
        cpu_percent: AggregatedMetric { avg: cpu.avg, min: cpu.min, max: cpu.max },
        memory_percent: AggregatedMetric { avg: memory.avg, min: memory.min, max: memory.max },
    }))
}
