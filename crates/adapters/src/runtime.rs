// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `ContainerRuntime` trait every container backend implements.
//!
//! Modeled on the teacher's `AgentAdapter` trait
//! (`examples/alfredjeanlab-oddjobs/crates/daemon/src/adapters/agent/mod.rs`):
//! a small `#[async_trait]` surface the rest of the system programs
//! against, with exactly one production implementation and one fake for
//! tests.

use async_trait::async_trait;
use oj_core::container::ContainerConfig;

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("container not found: {0}")]
    NotFound(String),

    #[error("container runtime error: {0}")]
    Other(String),
}

/// A container's lifecycle state as reported by the runtime, reduced to
/// the three buckets the lifecycle manager cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerState {
    Running,
    Exited { exit_code: i64 },
    /// Any other Docker state (`created`, `paused`, `restarting`, ...),
    /// passed through verbatim.
    Other(String),
}

/// A single non-streaming stats sample, with percentages already derived
/// the way `health_monitor.py`/`metrics_collector.py` derive them
/// (`cpu_delta / system_delta * online_cpus * 100`) so callers never see
/// bollard's raw cumulative counters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerStats {
    pub cpu_percent: f64,
    pub memory_used_bytes: u64,
    pub memory_limit_bytes: u64,
    pub network_rx_bytes: u64,
    pub network_tx_bytes: u64,
    pub disk_read_bytes: u64,
    pub disk_write_bytes: u64,
}

impl ContainerStats {
    pub fn memory_percent(&self) -> f64 {
        if self.memory_limit_bytes == 0 {
            0.0
        } else {
            self.memory_used_bytes as f64 / self.memory_limit_bytes as f64 * 100.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSummary {
    pub id: String,
    pub name: String,
    pub state: String,
    pub restart_count: i64,
    pub started_at: Option<String>,
}

#[async_trait]
pub trait ContainerRuntime: Send + Sync + 'static {
    /// Launch a new container from `config`, returning its runtime id.
    async fn run(&self, config: &ContainerConfig) -> Result<String, RuntimeError>;

    async fn inspect(&self, container_id: &str) -> Result<ContainerState, RuntimeError>;

    /// One non-streaming stats sample.
    async fn stats(&self, container_id: &str) -> Result<ContainerStats, RuntimeError>;

    /// Concatenated stdout+stderr, optionally limited to the last `tail`
    /// lines.
    async fn logs(&self, container_id: &str, tail: Option<usize>) -> Result<Vec<u8>, RuntimeError>;

    async fn remove(&self, container_id: &str, force: bool) -> Result<(), RuntimeError>;

    /// List containers whose name contains `name_contains`, for the
    /// health supervisor's agent-container discovery.
    async fn list(&self, name_contains: Option<&str>) -> Result<Vec<ContainerSummary>, RuntimeError>;

    /// Run a short-lived probe command inside the container and report
    /// whether it exited zero — used for the VNC/X server/noVNC/Jupyter
    /// liveness checks.
    async fn exec_probe(&self, container_id: &str, command: &[&str]) -> Result<bool, RuntimeError>;
}
