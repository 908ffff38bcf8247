// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The metrics half of the health & metrics supervisor (C8): raw,
//! unclassified numeric history for `/metrics` and `/metrics/aggregate`,
//! grounded on `metrics_collector.py`'s `MetricsCollector`. Runs as its
//! own background task independent of [`crate::health::HealthSupervisor`]
//! so a slow classification pass never starves history retention.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use oj_adapters::runtime::ContainerRuntime;
use oj_core::clock::Clock;
use oj_core::health::{ContainerMetricsSample, SystemMetricsSample};
use parking_lot::Mutex;

use crate::health::AGENT_NAME_MARKER;

const DEFAULT_RETENTION_HOURS: u64 = 24;
const DEFAULT_INTERVAL_SECS: u64 = 30;

pub struct MetricsCollector {
    runtime: Arc<dyn ContainerRuntime>,
    clock: Arc<dyn Clock>,
    system: Mutex<sysinfo::System>,
    capacity: usize,
    container_history: Mutex<HashMap<String, VecDeque<ContainerMetricsSample>>>,
    system_history: Mutex<VecDeque<SystemMetricsSample>>,
}

impl MetricsCollector {
    pub fn new(runtime: Arc<dyn ContainerRuntime>, clock: Arc<dyn Clock>) -> Self {
        Self::with_retention(runtime, clock, DEFAULT_RETENTION_HOURS, DEFAULT_INTERVAL_SECS)
    }

    /// `capacity = retention_hours * 3600 / interval_secs`, matching the
    /// fixed 2880-sample history (24h at 30s) the original collector
    /// retained at its defaults.
    pub fn with_retention(runtime: Arc<dyn ContainerRuntime>, clock: Arc<dyn Clock>, retention_hours: u64, interval_secs: u64) -> Self {
        let capacity = ((retention_hours * 3600) / interval_secs.max(1)).max(1) as usize;
        Self {
            runtime,
            clock,
            system: Mutex::new(sysinfo::System::new_all()),
            capacity,
            container_history: Mutex::new(HashMap::new()),
            system_history: Mutex::new(VecDeque::new()),
        }
    }

    pub async fn run(self: Arc<Self>, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            self.sample_once().await;
        }
    }

    pub async fn sample_once(&self) {
        let now = self.clock.epoch_secs();

        let containers = self.runtime.list(Some(AGENT_NAME_MARKER)).await.unwrap_or_default();
        for summary in &containers {
            let Ok(stats) = self.runtime.stats(&summary.id).await else {
                continue;
            };
            let sample = ContainerMetricsSample {
                container_id: summary.id.clone(),
                cpu_percent: stats.cpu_percent,
                memory_used_mb: stats.memory_used_bytes as f64 / (1024.0 * 1024.0),
                memory_limit_mb: stats.memory_limit_bytes as f64 / (1024.0 * 1024.0),
                memory_percent: stats.memory_percent(),
                network_rx_bytes: stats.network_rx_bytes,
                network_tx_bytes: stats.network_tx_bytes,
                disk_read_bytes: stats.disk_read_bytes,
                disk_write_bytes: stats.disk_write_bytes,
                sampled_at: now,
            };
            let mut history = self.container_history.lock();
            let queue = history.entry(summary.id.clone()).or_default();
            push_bounded(queue, sample, self.capacity);
        }

        let mut system = self.system.lock();
        system.refresh_all();
        let disks = sysinfo::Disks::new_with_refreshed_list();
        let (disk_total, disk_used) = disks
            .list()
            .iter()
            .fold((0u64, 0u64), |(total, used), disk| (total + disk.total_space(), used + disk.total_space().saturating_sub(disk.available_space())));
        let load = sysinfo::System::load_average();

        let sample = SystemMetricsSample {
            cpu_percent: system.global_cpu_info().cpu_usage() as f64,
            memory_used_gb: system.used_memory() as f64 / (1024.0 * 1024.0 * 1024.0),
            memory_total_gb: system.total_memory() as f64 / (1024.0 * 1024.0 * 1024.0),
            disk_used_gb: disk_used as f64 / (1024.0 * 1024.0 * 1024.0),
            disk_total_gb: disk_total as f64 / (1024.0 * 1024.0 * 1024.0),
            load_average: [load.one, load.five, load.fifteen],
            sampled_at: now,
        };
        push_bounded(&mut self.system_history.lock(), sample, self.capacity);
    }

    /// Container history within the last `hours`, oldest first.
    pub fn container_history(&self, container_id: &str, hours: u64) -> Vec<ContainerMetricsSample> {
        let cutoff = self.clock.epoch_secs().saturating_sub(hours * 3600);
        self.container_history
            .lock()
            .get(container_id)
            .map(|q| q.iter().filter(|s| s.sampled_at >= cutoff).cloned().collect())
            .unwrap_or_default()
    }

    pub fn system_history(&self, hours: u64) -> Vec<SystemMetricsSample> {
        let cutoff = self.clock.epoch_secs().saturating_sub(hours * 3600);
        self.system_history.lock().iter().filter(|s| s.sampled_at >= cutoff).cloned().collect()
    }

    /// Every container id with at least one recorded sample, for
    /// `/metrics`'s per-container map.
    pub fn tracked_container_ids(&self) -> Vec<String> {
        self.container_history.lock().keys().cloned().collect()
    }

    /// avg/min/max cpu and memory percent across the system history within
    /// the last `hours`, for `/metrics/aggregate`. `None` when there is no
    /// history in the window.
    pub fn system_aggregate(&self, hours: u64) -> Option<(MetricAggregate, MetricAggregate)> {
        let samples = self.system_history(hours);
        if samples.is_empty() {
            return None;
        }
        let cpu = aggregate(samples.iter().map(|s| s.cpu_percent));
        let mem = aggregate(samples.iter().map(|s| s.memory_used_gb / s.memory_total_gb.max(f64::EPSILON) * 100.0));
        Some((cpu, mem))
    }
}

/// One metric's average, minimum, and maximum over a window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricAggregate {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
}

fn aggregate(values: impl Iterator<Item = f64> + Clone) -> MetricAggregate {
    let count = values.clone().count() as f64;
    let sum: f64 = values.clone().sum();
    let min = values.clone().fold(f64::INFINITY, f64::min);
    let max = values.fold(f64::NEG_INFINITY, f64::max);
    MetricAggregate { avg: sum / count, min, max }
}

fn push_bounded<T>(queue: &mut VecDeque<T>, item: T, capacity: usize) {
    if queue.len() >= capacity {
        queue.pop_front();
    }
    queue.push_back(item);
}

#[cfg(test)]
mod tests {
    use oj_adapters::fake::FakeRuntime;
    use oj_core::clock::FakeClock;
    use oj_core::container::ContainerConfig;

    use super::*;

    #[tokio::test]
    async fn sample_once_records_container_and_system_history() {
        let runtime = Arc::new(FakeRuntime::new());
        let id = runtime.run(&ContainerConfig::new("img", "agent_job_deadbeef")).await.expect("runs");
        let clock = Arc::new(FakeClock::new());
        let collector = MetricsCollector::new(runtime, clock);

        collector.sample_once().await;
        let history = collector.container_history(&id, 24);
        assert_eq!(history.len(), 1);
        assert!(!collector.system_history(24).is_empty());
    }

    #[tokio::test]
    async fn history_window_excludes_samples_older_than_the_cutoff() {
        let runtime = Arc::new(FakeRuntime::new());
        let id = runtime.run(&ContainerConfig::new("img", "agent_job_deadbeef")).await.expect("runs");
        let clock = Arc::new(FakeClock::new());
        let collector = MetricsCollector::new(runtime, clock.clone());

        collector.sample_once().await;
        clock.advance(Duration::from_secs(48 * 3600));
        collector.sample_once().await;

        let recent = collector.container_history(&id, 1);
        assert_eq!(recent.len(), 1);
    }

    #[tokio::test]
    async fn history_respects_the_configured_capacity() {
        let runtime = Arc::new(FakeRuntime::new());
        runtime.run(&ContainerConfig::new("img", "agent_job_deadbeef")).await.expect("runs");
        let clock = Arc::new(FakeClock::new());
        let collector = Arc::new(MetricsCollector::with_retention(runtime, clock.clone(), 1, 3600));
        assert_eq!(collector.capacity, 1);

        collector.sample_once().await;
        clock.advance(Duration::from_secs(3600));
        collector.sample_once().await;

        assert_eq!(collector.system_history(u64::MAX / 3600).len(), 1);
    }

    #[tokio::test]
    async fn system_aggregate_is_none_without_any_history() {
        let runtime = Arc::new(FakeRuntime::new());
        let collector = MetricsCollector::new(runtime, Arc::new(FakeClock::new()));
        assert!(collector.system_aggregate(24).is_none());
    }
}
