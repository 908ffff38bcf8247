// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The health half of the health & metrics supervisor (C8): periodic
//! classified sampling of the host and every agent-marked container,
//! grounded on `health_monitor.py`'s `HealthMonitor`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use oj_adapters::runtime::ContainerRuntime;
use oj_core::clock::Clock;
use oj_core::health::{ContainerHealthSample, HealthStatus, HealthThresholds, ServiceStatus, SystemHealthSample};
use parking_lot::Mutex;

/// Name substring used to recognize a worker container among everything
/// else running on the host (matches the `agent_job_<...>` naming
/// convention the lifecycle manager applies at launch).
pub const AGENT_NAME_MARKER: &str = "agent";

const SERVICE_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

struct Services {
    vnc: ServiceStatus,
    xserver: ServiceStatus,
    novnc: ServiceStatus,
    jupyter: ServiceStatus,
}

impl Services {
    fn unhealthy_count(&self) -> usize {
        [self.vnc, self.xserver, self.novnc, self.jupyter].iter().filter(|s| **s != ServiceStatus::Up).count()
    }
}

pub struct HealthSupervisor {
    runtime: Arc<dyn ContainerRuntime>,
    clock: Arc<dyn Clock>,
    thresholds: HealthThresholds,
    system: Mutex<sysinfo::System>,
    latest_system: Mutex<Option<SystemHealthSample>>,
    latest_containers: Mutex<HashMap<String, ContainerHealthSample>>,
}

impl HealthSupervisor {
    pub fn new(runtime: Arc<dyn ContainerRuntime>, clock: Arc<dyn Clock>) -> Self {
        Self {
            runtime,
            clock,
            thresholds: HealthThresholds::default(),
            system: Mutex::new(sysinfo::System::new_all()),
            latest_system: Mutex::new(None),
            latest_containers: Mutex::new(HashMap::new()),
        }
    }

    /// Run the periodic sampling loop forever. Owned by the daemon binary
    /// as a background task; idempotent across repeated `spawn`s since
    /// each tick just replaces the latest-sample state.
    pub async fn run(self: Arc<Self>, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            self.sample_once().await;
        }
    }

    pub async fn sample_once(&self) {
        let containers = match self.runtime.list(Some(AGENT_NAME_MARKER)).await {
            Ok(containers) => containers,
            Err(err) => {
                tracing::warn!(error = %err, "listing containers for health sampling failed");
                Vec::new()
            }
        };

        let mut failed = 0u64;
        let mut samples = HashMap::new();
        for summary in &containers {
            let sample = self.sample_container(&summary.id, &summary.name).await;
            if sample.status == HealthStatus::Critical {
                failed += 1;
            }
            samples.insert(summary.id.clone(), sample);
        }
        *self.latest_containers.lock() = samples;

        let system = self.sample_system(containers.len() as u64 - failed, failed);
        *self.latest_system.lock() = Some(system);
    }

    async fn sample_container(&self, container_id: &str, name: &str) -> ContainerHealthSample {
        let now = self.clock.epoch_secs();
        let stats = self.runtime.stats(container_id).await.ok();
        let services = self.probe_services(container_id).await;

        let status = match &stats {
            Some(stats) => self.thresholds.classify_container(stats.cpu_percent, stats.memory_percent(), services.unhealthy_count()),
            None => HealthStatus::Unknown,
        };

        ContainerHealthSample {
            container_id: container_id.to_string(),
            name: name.to_string(),
            status,
            cpu_percent: stats.map(|s| s.cpu_percent).unwrap_or(0.0),
            memory_percent: stats.map(|s| s.memory_percent()).unwrap_or(0.0),
            restart_count: 0,
            uptime_secs: 0,
            vnc: services.vnc,
            xserver: services.xserver,
            novnc: services.novnc,
            jupyter: services.jupyter,
            sampled_at: now,
        }
    }

    async fn probe_services(&self, container_id: &str) -> Services {
        Services {
            vnc: self.probe(container_id, &["sh", "-c", "nc -z 127.0.0.1 5901"]).await,
            xserver: self.probe(container_id, &["pgrep", "Xvfb"]).await,
            novnc: self.probe(container_id, &["sh", "-c", "nc -z 127.0.0.1 6080"]).await,
            jupyter: self.probe(container_id, &["sh", "-c", "nc -z 127.0.0.1 8888"]).await,
        }
    }

    async fn probe(&self, container_id: &str, command: &[&str]) -> ServiceStatus {
        match tokio::time::timeout(SERVICE_PROBE_TIMEOUT, self.runtime.exec_probe(container_id, command)).await {
            Ok(Ok(true)) => ServiceStatus::Up,
            Ok(Ok(false)) => ServiceStatus::Down,
            Ok(Err(_)) | Err(_) => ServiceStatus::Unknown,
        }
    }

    fn sample_system(&self, active_containers: u64, failed_containers: u64) -> SystemHealthSample {
        let mut system = self.system.lock();
        system.refresh_all();

        let cpu_percent = system.global_cpu_info().cpu_usage() as f64;
        let memory_percent = if system.total_memory() > 0 { system.used_memory() as f64 / system.total_memory() as f64 * 100.0 } else { 0.0 };
        let disks = sysinfo::Disks::new_with_refreshed_list();
        let (disk_total, disk_used) = disks
            .list()
            .iter()
            .fold((0u64, 0u64), |(total, used), disk| (total + disk.total_space(), used + disk.total_space().saturating_sub(disk.available_space())));
        let disk_percent = if disk_total > 0 { disk_used as f64 / disk_total as f64 * 100.0 } else { 0.0 };
        let load = sysinfo::System::load_average();

        SystemHealthSample {
            status: self.thresholds.classify_system(cpu_percent, memory_percent, disk_percent),
            cpu_percent,
            memory_percent,
            disk_percent,
            load_average: [load.one, load.five, load.fifteen],
            active_containers,
            failed_containers,
            sampled_at: self.clock.epoch_secs(),
        }
    }

    /// `(overall status, system sample, per-container samples)`. Overall
    /// status is the worst of the system sample and every container.
    pub fn latest(&self) -> (HealthStatus, Option<SystemHealthSample>, Vec<ContainerHealthSample>) {
        let system = self.latest_system.lock().clone();
        let containers: Vec<_> = self.latest_containers.lock().values().cloned().collect();
        let overall = worst_status(system.as_ref().map(|s| s.status), containers.iter().map(|c| c.status));
        (overall, system, containers)
    }
}

fn worst_status(system: Option<HealthStatus>, containers: impl Iterator<Item = HealthStatus>) -> HealthStatus {
    fn severity(status: HealthStatus) -> u8 {
        match status {
            HealthStatus::Healthy => 0,
            HealthStatus::Unknown => 1,
            HealthStatus::Warning => 2,
            HealthStatus::Critical => 3,
        }
    }
    std::iter::once(system.unwrap_or(HealthStatus::Unknown))
        .chain(containers)
        .max_by_key(|s| severity(*s))
        .unwrap_or(HealthStatus::Unknown)
}

#[cfg(test)]
mod tests {
    use oj_adapters::fake::FakeRuntime;
    use oj_core::clock::FakeClock;
    use oj_core::container::ContainerConfig;

    use super::*;

    #[tokio::test]
    async fn sample_once_classifies_a_healthy_container() {
        let runtime = Arc::new(FakeRuntime::new());
        let id = runtime.run(&ContainerConfig::new("img", "agent_job_deadbeef")).await.expect("runs");
        runtime.set_probe_result(true);
        let supervisor = HealthSupervisor::new(runtime, Arc::new(FakeClock::new()));

        supervisor.sample_once().await;
        let (overall, system, containers) = supervisor.latest();
        assert_eq!(overall, HealthStatus::Healthy);
        assert!(system.is_some());
        assert_eq!(containers.len(), 1);
        assert_eq!(containers[0].container_id, id);
        assert_eq!(containers[0].status, HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn two_down_services_escalate_a_container_to_critical() {
        let runtime = Arc::new(FakeRuntime::new());
        runtime.run(&ContainerConfig::new("img", "agent_job_cafebabe")).await.expect("runs");
        runtime.set_probe_result(false);
        let supervisor = HealthSupervisor::new(runtime, Arc::new(FakeClock::new()));

        supervisor.sample_once().await;
        let (_, _, containers) = supervisor.latest();
        assert_eq!(containers[0].status, HealthStatus::Critical);
    }

    #[test]
    fn worst_status_prefers_critical_over_healthy_and_unknown() {
        let status = worst_status(Some(HealthStatus::Healthy), vec![HealthStatus::Unknown, HealthStatus::Critical].into_iter());
        assert_eq!(status, HealthStatus::Critical);
    }
}
