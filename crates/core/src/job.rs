// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The job record tracked by the registry and persisted to disk.

use serde::{Deserialize, Serialize};

use crate::id::JobId;

/// A job's current lifecycle state.
///
/// `NotFound` and `Other` are reached from `Running` when the container
/// runtime reports something the lifecycle manager did not expect (the
/// container disappeared, or is in a Docker state this system does not
/// model directly, e.g. `paused`). Neither is terminal: the underlying
/// container may still transition to a real exit later, so both stay
/// eligible for re-inspection just like `Running`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatus {
    Running,
    Complete { exit_code: i64 },
    Error { message: String },
    Cancelled,
    NotFound,
    Other { raw: String },
}

crate::simple_display! {
    JobStatus {
        Running => "running",
        Complete(..) => "complete",
        Error(..) => "error",
        Cancelled => "cancelled",
        NotFound => "not_found",
        Other(..) => "other",
    }
}

impl JobStatus {
    /// Once a job reaches a terminal status it never moves again —
    /// invariant 2 (terminal absorption). Only `Complete`/`Error`/
    /// `Cancelled` are terminal; `Running`, `NotFound`, and `Other` all
    /// remain eligible for re-inspection.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Complete { .. } | JobStatus::Error { .. } | JobStatus::Cancelled)
    }
}

/// A job's full record, as held by the registry and persisted to
/// `jobs.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub prompt: String,

    #[serde(flatten)]
    pub status: JobStatus,

    /// The runtime's container id, once launched. Absent only for jobs
    /// that failed before the container was created.
    pub container_id: Option<String>,

    /// Seconds since the Unix epoch.
    pub created: u64,
    pub started: Option<u64>,
    pub completed: Option<u64>,
    pub cancelled: Option<u64>,
}

impl Job {
    pub fn new(id: JobId, prompt: impl Into<String>, created: u64) -> Self {
        Self {
            id,
            prompt: prompt.into(),
            status: JobStatus::Running,
            container_id: None,
            created,
            started: None,
            completed: None,
            cancelled: None,
        }
    }

    /// A job that failed to launch never gets a `started` timestamp or a
    /// container id.
    pub fn new_launch_failure(id: JobId, prompt: impl Into<String>, created: u64, message: impl Into<String>) -> Self {
        Self {
            id,
            prompt: prompt.into(),
            status: JobStatus::Error { message: message.into() },
            container_id: None,
            created,
            started: None,
            completed: None,
            cancelled: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
