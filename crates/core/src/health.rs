// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Health classification and raw metrics sample types produced by the
//! health & metrics supervisor.

use serde::{Deserialize, Serialize};

/// A container or host's overall classified health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
    Unknown,
}

crate::simple_display! {
    HealthStatus {
        Healthy => "healthy",
        Warning => "warning",
        Critical => "critical",
        Unknown => "unknown",
    }
}

/// Liveness of one of the auxiliary services a worker container may run
/// (VNC, X server, noVNC, Jupyter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    Up,
    Down,
    Unknown,
}

/// One classified sample for a single container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerHealthSample {
    pub container_id: String,
    pub name: String,
    pub status: HealthStatus,
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub restart_count: i64,
    pub uptime_secs: u64,
    pub vnc: ServiceStatus,
    pub xserver: ServiceStatus,
    pub novnc: ServiceStatus,
    pub jupyter: ServiceStatus,
    pub sampled_at: u64,
}

/// One classified sample for the host system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemHealthSample {
    pub status: HealthStatus,
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub disk_percent: f64,
    pub load_average: [f64; 3],
    pub active_containers: u64,
    pub failed_containers: u64,
    pub sampled_at: u64,
}

/// Raw (unclassified) per-container numeric sample, retained for the
/// `/metrics` history and aggregation endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerMetricsSample {
    pub container_id: String,
    pub cpu_percent: f64,
    pub memory_used_mb: f64,
    pub memory_limit_mb: f64,
    pub memory_percent: f64,
    pub network_rx_bytes: u64,
    pub network_tx_bytes: u64,
    pub disk_read_bytes: u64,
    pub disk_write_bytes: u64,
    pub sampled_at: u64,
}

/// Raw (unclassified) host-wide numeric sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemMetricsSample {
    pub cpu_percent: f64,
    pub memory_used_gb: f64,
    pub memory_total_gb: f64,
    pub disk_used_gb: f64,
    pub disk_total_gb: f64,
    pub load_average: [f64; 3],
    pub sampled_at: u64,
}

/// Thresholds used to classify raw samples into [`HealthStatus`], grounded
/// in the retained-but-unexported defaults of the system's health monitor:
/// 80%/95% cpu and memory warn/critical splits, with a service-down count
/// escalating severity independent of resource usage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthThresholds {
    pub cpu_warning: f64,
    pub cpu_critical: f64,
    pub memory_warning: f64,
    pub memory_critical: f64,
    pub disk_warning: f64,
    pub disk_critical: f64,
}

impl Default for HealthThresholds {
    fn default() -> Self {
        Self {
            cpu_warning: 80.0,
            cpu_critical: 95.0,
            memory_warning: 80.0,
            memory_critical: 95.0,
            disk_warning: 85.0,
            disk_critical: 95.0,
        }
    }
}

impl HealthThresholds {
    /// Classify a container from its resource usage and the count of its
    /// auxiliary services reporting down/unknown.
    pub fn classify_container(&self, cpu_percent: f64, memory_percent: f64, unhealthy_services: usize) -> HealthStatus {
        if cpu_percent > self.cpu_critical || memory_percent > self.memory_critical || unhealthy_services >= 2 {
            return HealthStatus::Critical;
        }
        if cpu_percent > self.cpu_warning || memory_percent > self.memory_warning || unhealthy_services == 1 {
            return HealthStatus::Warning;
        }
        HealthStatus::Healthy
    }

    pub fn classify_system(&self, cpu_percent: f64, memory_percent: f64, disk_percent: f64) -> HealthStatus {
        if cpu_percent > self.cpu_critical || memory_percent > self.memory_critical || disk_percent > self.disk_critical {
            return HealthStatus::Critical;
        }
        if cpu_percent > self.cpu_warning || memory_percent > self.memory_warning || disk_percent > self.disk_warning {
            return HealthStatus::Warning;
        }
        HealthStatus::Healthy
    }
}

#[cfg(test)]
#[path = "health_tests.rs"]
mod tests;
