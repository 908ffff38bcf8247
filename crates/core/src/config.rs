// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Environment-variable configuration, loaded once at process startup.
//!
//! Kept deliberately as a thin typed-accessor layer over `std::env`, the
//! same level of ceremony the system this replaces used for its own
//! config module — no config-file format, no hierarchical overrides.

use std::path::PathBuf;
use std::time::Duration;

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Orchestrator-side configuration: where jobs live on disk, what image to
/// launch, and the background task intervals. Env var names and defaults
/// are pinned by spec §6: `AGENT_OUTPUT_DIR` (default `/tmp/agent_jobs`),
/// `AGENT_IMAGE` (default `containerized-agent:latest`), `RETENTION_DAYS`
/// (default 1).
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub output_dir: PathBuf,
    pub jobs_file: PathBuf,
    pub logs_subdir: String,
    pub agent_image: String,
    pub retention_days: u64,
    pub health_check_interval: Duration,
    pub metrics_retention_hours: u64,
    pub metrics_collection_interval: Duration,
    pub listen_addr: String,
}

impl OrchestratorConfig {
    pub fn from_env() -> Self {
        let output_dir = PathBuf::from(env_or("AGENT_OUTPUT_DIR", "/tmp/agent_jobs"));
        let jobs_file = output_dir.join(env_or("JOBS_FILE_NAME", "jobs.json"));
        Self {
            jobs_file,
            output_dir,
            logs_subdir: env_or("LOGS_SUBDIR", "logs"),
            agent_image: env_or("AGENT_IMAGE", "containerized-agent:latest"),
            retention_days: env_parse_or("RETENTION_DAYS", 1),
            health_check_interval: Duration::from_secs(env_parse_or("HEALTH_CHECK_INTERVAL_SECS", 30)),
            metrics_retention_hours: env_parse_or("METRICS_RETENTION_HOURS", 24),
            metrics_collection_interval: Duration::from_secs(env_parse_or("METRICS_COLLECTION_INTERVAL_SECS", 30)),
            listen_addr: env_or("ORCHESTRATOR_LISTEN_ADDR", "0.0.0.0:8000"),
        }
    }
}

/// Worker-side configuration, read inside the job's container. Env vars
/// per spec §6: `JOB_PROMPT`, `JOB_ID`, optional `AGENT_OUTPUT_DIR`,
/// `CONTAINER_ENV`.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub job_prompt: String,
    pub job_id: String,
    /// Explicit override for the worker runtime's output-directory
    /// detection (spec §4.7 step 1). `None` means "detect".
    pub output_dir: Option<PathBuf>,
    pub container_env: bool,
    pub model_api_url: Option<String>,
    pub model_api_key: Option<String>,
    pub script_timeout: Duration,
}

impl WorkerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let job_prompt = std::env::var("JOB_PROMPT").map_err(|_| ConfigError::Missing("JOB_PROMPT"))?;
        let job_id = std::env::var("JOB_ID").map_err(|_| ConfigError::Missing("JOB_ID"))?;
        Ok(Self {
            job_prompt,
            job_id,
            output_dir: std::env::var("AGENT_OUTPUT_DIR").ok().map(PathBuf::from),
            container_env: std::env::var("CONTAINER_ENV").map(|v| v == "true").unwrap_or(false),
            model_api_url: std::env::var("MODEL_API_URL").ok(),
            model_api_key: std::env::var("MODEL_API_KEY").ok(),
            script_timeout: Duration::from_secs(env_parse_or("SCRIPT_TIMEOUT_SECS", 30)),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),
}
