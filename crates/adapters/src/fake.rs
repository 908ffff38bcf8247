// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! An in-memory `ContainerRuntime` test double, modeled on the teacher's
//! `FakeAgentAdapter` (`examples/alfredjeanlab-oddjobs/crates/daemon/src/adapters/agent/fake.rs`
//! pattern referenced from `mod.rs`): a `Mutex`-guarded map of fake
//! containers plus a call log, so lifecycle-manager and health-supervisor
//! tests can drive specific `run`/`inspect`/`stats`/`remove` outcomes
//! without a real Docker daemon.

#![cfg(any(test, feature = "test-support"))]

use std::collections::HashMap;

use async_trait::async_trait;
use oj_core::container::ContainerConfig;
use parking_lot::Mutex;

use crate::runtime::{ContainerRuntime, ContainerState, ContainerStats, ContainerSummary, RuntimeError};

#[derive(Debug, Clone)]
pub struct FakeContainer {
    pub id: String,
    pub name: String,
    pub state: ContainerState,
    pub stats: ContainerStats,
    pub logs: Vec<u8>,
    pub removed: bool,
}

impl FakeContainer {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            state: ContainerState::Running,
            stats: ContainerStats {
                cpu_percent: 0.0,
                memory_used_bytes: 0,
                memory_limit_bytes: 2 * 1024 * 1024 * 1024,
                network_rx_bytes: 0,
                network_tx_bytes: 0,
                disk_read_bytes: 0,
                disk_write_bytes: 0,
            },
            logs: Vec::new(),
            removed: false,
        }
    }
}

/// A call made against a [`FakeRuntime`], recorded for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeCall {
    Run { name: String },
    Inspect { id: String },
    Stats { id: String },
    Logs { id: String },
    Remove { id: String, force: bool },
    List,
    ExecProbe { id: String },
}

pub struct FakeRuntime {
    containers: Mutex<HashMap<String, FakeContainer>>,
    calls: Mutex<Vec<RuntimeCall>>,
    next_run_fails: Mutex<Option<String>>,
    probe_result: Mutex<bool>,
    auto_id: Mutex<u64>,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self {
            containers: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            next_run_fails: Mutex::new(None),
            probe_result: Mutex::new(true),
            auto_id: Mutex::new(0),
        }
    }

    /// Pre-seed a container the fake will immediately report as running.
    pub fn seed(&self, container: FakeContainer) {
        self.containers.lock().insert(container.id.clone(), container);
    }

    /// Make the next `run` call fail with the given message.
    pub fn fail_next_run(&self, message: impl Into<String>) {
        *self.next_run_fails.lock() = Some(message.into());
    }

    /// Force subsequent `exec_probe` calls to report failure.
    pub fn set_probe_result(&self, ok: bool) {
        *self.probe_result.lock() = ok;
    }

    /// Transition a previously-run container to `exited` with the given
    /// code, as if the underlying process had finished.
    pub fn mark_exited(&self, container_id: &str, exit_code: i64) {
        if let Some(c) = self.containers.lock().get_mut(container_id) {
            c.state = ContainerState::Exited { exit_code };
        }
    }

    pub fn set_logs(&self, container_id: &str, logs: impl Into<Vec<u8>>) {
        if let Some(c) = self.containers.lock().get_mut(container_id) {
            c.logs = logs.into();
        }
    }

    pub fn calls(&self) -> Vec<RuntimeCall> {
        self.calls.lock().clone()
    }

    pub fn contains(&self, container_id: &str) -> bool {
        self.containers.lock().contains_key(container_id)
    }
}

impl Default for FakeRuntime {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContainerRuntime for FakeRuntime {
    async fn run(&self, config: &ContainerConfig) -> Result<String, RuntimeError> {
        self.calls.lock().push(RuntimeCall::Run { name: config.name.clone() });
        if let Some(message) = self.next_run_fails.lock().take() {
            return Err(RuntimeError::Other(message));
        }
        let id = {
            let mut n = self.auto_id.lock();
            *n += 1;
            format!("fake-container-{n}")
        };
        self.containers.lock().insert(id.clone(), FakeContainer::new(id.clone(), config.name.clone()));
        Ok(id)
    }

    async fn inspect(&self, container_id: &str) -> Result<ContainerState, RuntimeError> {
        self.calls.lock().push(RuntimeCall::Inspect { id: container_id.to_string() });
        self.containers
            .lock()
            .get(container_id)
            .map(|c| c.state.clone())
            .ok_or_else(|| RuntimeError::NotFound(container_id.to_string()))
    }

    async fn stats(&self, container_id: &str) -> Result<ContainerStats, RuntimeError> {
        self.calls.lock().push(RuntimeCall::Stats { id: container_id.to_string() });
        self.containers
            .lock()
            .get(container_id)
            .map(|c| c.stats)
            .ok_or_else(|| RuntimeError::NotFound(container_id.to_string()))
    }

    async fn logs(&self, container_id: &str, _tail: Option<usize>) -> Result<Vec<u8>, RuntimeError> {
        self.calls.lock().push(RuntimeCall::Logs { id: container_id.to_string() });
        self.containers
            .lock()
            .get(container_id)
            .map(|c| c.logs.clone())
            .ok_or_else(|| RuntimeError::NotFound(container_id.to_string()))
    }

    async fn remove(&self, container_id: &str, force: bool) -> Result<(), RuntimeError> {
        self.calls.lock().push(RuntimeCall::Remove { id: container_id.to_string(), force });
        // Idempotent: removing a container the fake never heard of is not
        // an error, matching the real adapter's "missing container is not
        // an error" contract (spec §4.2).
        self.containers.lock().remove(container_id);
        Ok(())
    }

    async fn list(&self, name_contains: Option<&str>) -> Result<Vec<ContainerSummary>, RuntimeError> {
        self.calls.lock().push(RuntimeCall::List);
        let containers = self.containers.lock();
        Ok(containers
            .values()
            .filter(|c| match name_contains {
                Some(f) => c.name.to_lowercase().contains(&f.to_lowercase()),
                None => true,
            })
            .map(|c| ContainerSummary {
                id: c.id.clone(),
                name: c.name.clone(),
                state: match &c.state {
                    ContainerState::Running => "running".to_string(),
                    ContainerState::Exited { .. } => "exited".to_string(),
                    ContainerState::Other(s) => s.clone(),
                },
                restart_count: 0,
                started_at: None,
            })
            .collect())
    }

    async fn exec_probe(&self, container_id: &str, _command: &[&str]) -> Result<bool, RuntimeError> {
        self.calls.lock().push(RuntimeCall::ExecProbe { id: container_id.to_string() });
        if !self.containers.lock().contains_key(container_id) {
            return Err(RuntimeError::NotFound(container_id.to_string()));
        }
        Ok(*self.probe_result.lock())
    }
}
