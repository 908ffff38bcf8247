// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The job lifecycle manager (C3): launch, status reconciliation, cancel,
//! output packaging, and retention GC, all routed through the registry
//! mutex per spec §4.3.7 — no runtime call is ever made while the
//! registry lock is held.

use std::path::PathBuf;
use std::sync::Arc;

use oj_core::clock::Clock;
use oj_core::config::OrchestratorConfig;
use oj_core::container::ContainerConfig;
use oj_core::id::JobId;
use oj_core::job::{Job, JobStatus};
use oj_adapters::runtime::{ContainerRuntime, ContainerState, RuntimeError};
use oj_storage::JobRegistry;

use crate::archive;
use crate::error::EngineError;

/// Which of a job's two log streams the caller wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    Stdout,
    Stderr,
}

impl LogKind {
    pub fn filename(self) -> &'static str {
        match self {
            LogKind::Stdout => "stdout.log",
            LogKind::Stderr => "stderr.log",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "stdout" => Some(LogKind::Stdout),
            "stderr" => Some(LogKind::Stderr),
            _ => None,
        }
    }
}

pub struct LifecycleManager {
    registry: JobRegistry,
    runtime: Arc<dyn ContainerRuntime>,
    clock: Arc<dyn Clock>,
    config: OrchestratorConfig,
}

impl LifecycleManager {
    /// Construct the manager. The caller is responsible for invoking
    /// [`LifecycleManager::cleanup`] once right after construction to
    /// mirror the original `JobManager.__init__`'s eager
    /// `self.cleanup_jobs()` call — this constructor itself stays
    /// synchronous since `cleanup` performs runtime I/O.
    pub fn new(registry: JobRegistry, runtime: Arc<dyn ContainerRuntime>, clock: Arc<dyn Clock>, config: OrchestratorConfig) -> Self {
        Self { registry, runtime, clock, config }
    }

    fn job_output_dir(&self, id: &JobId) -> PathBuf {
        self.config.output_dir.join(id.to_string())
    }

    fn job_logs_dir(&self, id: &JobId) -> PathBuf {
        self.job_output_dir(id).join(&self.config.logs_subdir)
    }

    /// §4.3.1: generate a JobId, stand up its output directory, launch
    /// the worker container, and insert a registry record either way.
    pub async fn launch_job(&self, prompt: impl Into<String>) -> JobId {
        let prompt = prompt.into();
        let id = JobId::new();
        let created = self.clock.epoch_secs();

        let logs_dir = self.job_logs_dir(&id);
        if let Err(err) = std::fs::create_dir_all(&logs_dir) {
            tracing::error!(job_id = %id, error = %err, "could not create job output directory");
            let job = Job::new_launch_failure(id, prompt, created, format!("could not create output directory: {err}"));
            let _ = self.registry.insert(job);
            return id;
        }

        let output_dir = self.job_output_dir(&id);
        let name = format!("agent_job_{}", id.short());
        let container_config = ContainerConfig::new(&self.config.agent_image, &name)
            .with_env("JOB_PROMPT", &prompt)
            .with_env("JOB_ID", id.to_string())
            .with_env("CONTAINER_ENV", "true")
            .with_mount(&output_dir, "/workspace/output", false);

        match self.runtime.run(&container_config).await {
            Ok(container_id) => {
                let mut job = Job::new(id, prompt, created);
                job.started = Some(created);
                job.container_id = Some(container_id);
                let _ = self.registry.insert(job);
            }
            Err(err) => {
                tracing::error!(job_id = %id, error = %err, "failed to launch worker container");
                let job = Job::new_launch_failure(id, prompt, created, err.to_string());
                let _ = self.registry.insert(job);
            }
        }

        id
    }

    /// §4.3.2: reconcile status against the runtime unless already
    /// terminal. Returns `None` only when the job was never registered.
    pub async fn get_status(&self, id: JobId) -> Option<Job> {
        let job = self.registry.get(&id)?;
        if job.is_terminal() {
            return Some(job);
        }
        let Some(container_id) = job.container_id.clone() else {
            return Some(job);
        };

        let now = self.clock.epoch_secs();
        match self.runtime.inspect(&container_id).await {
            Ok(ContainerState::Exited { exit_code }) => self
                .registry
                .update(&id, |job| {
                    if !job.is_terminal() {
                        job.status = JobStatus::Complete { exit_code };
                        if job.completed.is_none() {
                            job.completed = Some(now);
                        }
                    }
                })
                .ok()
                .flatten(),
            Ok(ContainerState::Running) => Some(job),
            Ok(ContainerState::Other(state)) => self
                .registry
                .update(&id, |job| {
                    if !job.is_terminal() {
                        job.status = JobStatus::Other { raw: state.clone() };
                    }
                })
                .ok()
                .flatten(),
            Err(RuntimeError::NotFound(_)) => self
                .registry
                .update(&id, |job| {
                    if !job.is_terminal() {
                        job.status = JobStatus::NotFound;
                    }
                })
                .ok()
                .flatten(),
            Err(RuntimeError::Other(message)) => self
                .registry
                .update(&id, |job| {
                    if !job.is_terminal() {
                        job.status = JobStatus::Error { message: message.clone() };
                    }
                })
                .ok()
                .flatten(),
        }
    }

    /// §4.3.3: force-remove the container. A race with natural completion
    /// resolves in `complete`'s favor because the registry closure here
    /// refuses to overwrite an already-terminal status.
    pub async fn cancel_job(&self, id: JobId) -> bool {
        let Some(job) = self.registry.get(&id) else { return false };
        let Some(container_id) = job.container_id else { return false };

        match self.runtime.remove(&container_id, true).await {
            Ok(()) => {
                let now = self.clock.epoch_secs();
                let _ = self.registry.update(&id, |job| {
                    if !job.is_terminal() {
                        job.status = JobStatus::Cancelled;
                        job.cancelled = Some(now);
                    }
                });
                true
            }
            Err(_) => false,
        }
    }

    /// §4.3.4: lazily build `output.zip`, never rebuilding once present
    /// (invariant 4, archive idempotence). Only a completed job has one.
    pub async fn get_output(&self, id: JobId) -> Option<PathBuf> {
        let job = self.registry.get(&id)?;
        if !matches!(job.status, JobStatus::Complete { .. }) {
            return None;
        }
        let output_dir = self.job_output_dir(&id);
        let archive_path = output_dir.join("output.zip");
        if !archive_path.exists() {
            if let Err(err) = archive::build(&output_dir, &archive_path).await {
                tracing::error!(job_id = %id, error = %err, "failed to build output archive");
                return None;
            }
        }
        Some(archive_path)
    }

    /// §4.3.5: path to a log file, if present.
    pub fn log_path(&self, id: JobId, kind: LogKind) -> Option<PathBuf> {
        let path = self.job_logs_dir(&id).join(kind.filename());
        path.exists().then_some(path)
    }

    /// §4.3.5: full contents of a log file, if present.
    pub async fn read_log(&self, id: JobId, kind: LogKind) -> Option<String> {
        let path = self.log_path(id, kind)?;
        tokio::fs::read_to_string(path).await.ok()
    }

    /// The last `n` lines of a log file, if present.
    pub async fn last_lines(&self, id: JobId, kind: LogKind, n: usize) -> Option<String> {
        let content = self.read_log(id, kind).await?;
        let mut lines: Vec<&str> = content.lines().rev().take(n).collect();
        lines.reverse();
        Some(lines.join("\n"))
    }

    /// §4.3.6: retention GC. Best-effort container removal for every
    /// terminal job, then delete (and drop the record for) any output
    /// directory older than `RETENTION_DAYS`.
    pub async fn cleanup(&self) {
        let retention_secs = self.config.retention_days.saturating_mul(86_400);
        for job in self.registry.iter_snapshot() {
            if job.is_terminal() {
                if let Some(container_id) = &job.container_id {
                    if let Err(err) = self.runtime.remove(container_id, true).await {
                        tracing::warn!(job_id = %job.id, error = %err, "best-effort container removal during cleanup failed");
                    }
                }
            }

            let output_dir = self.job_output_dir(&job.id);
            let Ok(metadata) = std::fs::metadata(&output_dir) else { continue };
            let Ok(modified) = metadata.modified() else { continue };
            let age = std::time::SystemTime::now().duration_since(modified).unwrap_or_default();
            if age.as_secs() <= retention_secs {
                continue;
            }
            if let Err(err) = std::fs::remove_dir_all(&output_dir) {
                tracing::warn!(job_id = %job.id, error = %err, "failed to delete expired output directory");
                continue;
            }
            if let Err(err) = self.registry.remove(&job.id) {
                tracing::warn!(job_id = %job.id, error = %err, "failed to drop expired job record");
            }
        }
    }

    pub fn list_jobs(&self) -> Vec<Job> {
        self.registry.iter_snapshot()
    }

    pub fn get_job(&self, id: JobId) -> Option<Job> {
        self.registry.get(&id)
    }
}
