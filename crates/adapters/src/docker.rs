// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The production `ContainerRuntime`, backed by `bollard`'s Docker API
//! client. Grounded on `examples/chiral-data-silva/crates/tui/src/utils/docker.rs`'s
//! `launch_container`/`test_exec_gromacs` for the create/start/exec
//! shapes, generalized here with inspect/stats/logs/list to cover the
//! full adapter surface this system needs.

use async_trait::async_trait;
use bollard::container::{
    Config as ContainerCreateConfig, CreateContainerOptions, InspectContainerOptions, ListContainersOptions,
    LogsOptions, RemoveContainerOptions, StatsOptions,
};
use bollard::exec::{CreateExecOptions, StartExecResults};
use bollard::image::CreateImageOptions;
use bollard::models::{HostConfig, HostConfigLogConfig};
use bollard::Docker;
use futures_util::TryStreamExt;
use oj_core::container::ContainerConfig;

use crate::runtime::{ContainerRuntime, ContainerState, ContainerStats, ContainerSummary, RuntimeError};

pub struct DockerRuntime {
    docker: Docker,
}

impl DockerRuntime {
    pub fn connect() -> Result<Self, RuntimeError> {
        let docker = Docker::connect_with_local_defaults().map_err(|e| RuntimeError::Other(e.to_string()))?;
        Ok(Self { docker })
    }

    fn map_err(err: bollard::errors::Error, container_id: &str) -> RuntimeError {
        if matches!(&err, bollard::errors::Error::DockerResponseServerError { status_code, .. } if *status_code == 404) {
            RuntimeError::NotFound(container_id.to_string())
        } else {
            RuntimeError::Other(err.to_string())
        }
    }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn run(&self, config: &ContainerConfig) -> Result<String, RuntimeError> {
        let create_image_options = CreateImageOptions { from_image: config.image.clone(), ..Default::default() };
        self.docker
            .create_image(Some(create_image_options), None, None)
            .try_collect::<Vec<_>>()
            .await
            .map_err(|e| RuntimeError::Other(e.to_string()))?;

        let env: Vec<String> = config.env.iter().map(|(k, v)| format!("{k}={v}")).collect();
        let binds: Vec<String> = config
            .mounts
            .iter()
            .map(|(host, (container, read_only))| {
                let mode = if *read_only { "ro" } else { "rw" };
                format!("{}:{}:{mode}", host.display(), container.display())
            })
            .collect();

        let host_config = HostConfig {
            binds: Some(binds),
            memory: Some(config.mem_limit_bytes),
            cpu_period: Some(config.cpu_period_us),
            cpu_quota: Some(config.cpu_quota_us),
            // Bound host log storage per worker container (spec §4.2/§5)
            // instead of the daemon's default logging driver.
            log_config: Some(HostConfigLogConfig { typ: Some("json-file".to_string()), config: None }),
            ..Default::default()
        };

        let create_options = CreateContainerOptions { name: config.name.clone(), platform: None };
        let container_config = ContainerCreateConfig {
            image: Some(config.image.clone()),
            env: Some(env),
            host_config: Some(host_config),
            tty: Some(false),
            attach_stdout: Some(true),
            attach_stderr: Some(true),
            ..Default::default()
        };

        let created = self
            .docker
            .create_container(Some(create_options), container_config)
            .await
            .map_err(|e| RuntimeError::Other(e.to_string()))?;

        self.docker
            .start_container::<String>(&created.id, None)
            .await
            .map_err(|e| Self::map_err(e, &created.id))?;

        Ok(created.id)
    }

    async fn inspect(&self, container_id: &str) -> Result<ContainerState, RuntimeError> {
        let info = self
            .docker
            .inspect_container(container_id, None::<InspectContainerOptions>)
            .await
            .map_err(|e| Self::map_err(e, container_id))?;

        let state = info.state.unwrap_or_default();
        let status = state.status.map(|s| s.to_string()).unwrap_or_default();

        match status.as_str() {
            "running" => Ok(ContainerState::Running),
            "exited" => Ok(ContainerState::Exited { exit_code: state.exit_code.unwrap_or(-1) }),
            other => Ok(ContainerState::Other(other.to_string())),
        }
    }

    async fn stats(&self, container_id: &str) -> Result<ContainerStats, RuntimeError> {
        let options = StatsOptions { stream: false, one_shot: true };
        let mut stream = self.docker.stats(container_id, Some(options));
        let sample = stream
            .try_next()
            .await
            .map_err(|e| Self::map_err(e, container_id))?
            .ok_or_else(|| RuntimeError::Other("no stats sample returned".to_string()))?;

        let cpu_delta = sample.cpu_stats.cpu_usage.total_usage as f64
            - sample.precpu_stats.cpu_usage.total_usage as f64;
        let system_delta = sample.cpu_stats.system_cpu_usage.unwrap_or(0) as f64
            - sample.precpu_stats.system_cpu_usage.unwrap_or(0) as f64;
        let online_cpus = sample.cpu_stats.online_cpus.unwrap_or(1) as f64;
        let cpu_percent = if system_delta > 0.0 && cpu_delta > 0.0 {
            (cpu_delta / system_delta) * online_cpus * 100.0
        } else {
            0.0
        };

        let memory_used = sample.memory_stats.usage.unwrap_or(0);
        let memory_limit = sample.memory_stats.limit.unwrap_or(0);

        let (rx, tx) = sample
            .networks
            .unwrap_or_default()
            .values()
            .fold((0u64, 0u64), |(rx, tx), n| (rx + n.rx_bytes, tx + n.tx_bytes));

        let (read, write) = sample
            .blkio_stats
            .io_service_bytes_recursive
            .unwrap_or_default()
            .iter()
            .fold((0u64, 0u64), |(read, write), entry| match entry.op.as_str() {
                "read" | "Read" => (read + entry.value, write),
                "write" | "Write" => (read, write + entry.value),
                _ => (read, write),
            });

        Ok(ContainerStats {
            cpu_percent,
            memory_used_bytes: memory_used,
            memory_limit_bytes: memory_limit,
            network_rx_bytes: rx,
            network_tx_bytes: tx,
            disk_read_bytes: read,
            disk_write_bytes: write,
        })
    }

    async fn logs(&self, container_id: &str, tail: Option<usize>) -> Result<Vec<u8>, RuntimeError> {
        let options = LogsOptions::<String> {
            stdout: true,
            stderr: true,
            tail: tail.map(|n| n.to_string()).unwrap_or_else(|| "all".to_string()),
            ..Default::default()
        };
        let chunks = self
            .docker
            .logs(container_id, Some(options))
            .try_collect::<Vec<_>>()
            .await
            .map_err(|e| Self::map_err(e, container_id))?;

        let mut out = Vec::new();
        for chunk in chunks {
            out.extend_from_slice(&chunk.into_bytes());
        }
        Ok(out)
    }

    async fn remove(&self, container_id: &str, force: bool) -> Result<(), RuntimeError> {
        let options = RemoveContainerOptions { force, ..Default::default() };
        self.docker
            .remove_container(container_id, Some(options))
            .await
            .map_err(|e| Self::map_err(e, container_id))
    }

    async fn list(&self, name_contains: Option<&str>) -> Result<Vec<ContainerSummary>, RuntimeError> {
        let options = ListContainersOptions::<String> { all: true, ..Default::default() };
        let containers = self
            .docker
            .list_containers(Some(options))
            .await
            .map_err(|e| RuntimeError::Other(e.to_string()))?;

        let summaries = containers
            .into_iter()
            .filter_map(|c| {
                let name = c.names.unwrap_or_default().into_iter().next().unwrap_or_default();
                if let Some(filter) = name_contains {
                    if !name.to_lowercase().contains(&filter.to_lowercase()) {
                        return None;
                    }
                }
                Some(ContainerSummary {
                    id: c.id.unwrap_or_default(),
                    name,
                    state: c.state.unwrap_or_default(),
                    restart_count: 0,
                    started_at: None,
                })
            })
            .collect();
        Ok(summaries)
    }

    async fn exec_probe(&self, container_id: &str, command: &[&str]) -> Result<bool, RuntimeError> {
        let options = CreateExecOptions {
            cmd: Some(command.iter().map(|s| s.to_string()).collect()),
            attach_stdout: Some(true),
            attach_stderr: Some(true),
            ..Default::default()
        };
        let exec = self
            .docker
            .create_exec(container_id, options)
            .await
            .map_err(|e| Self::map_err(e, container_id))?;

        match self.docker.start_exec(&exec.id, None).await.map_err(|e| RuntimeError::Other(e.to_string()))? {
            StartExecResults::Attached { mut output, .. } => {
                while output.try_next().await.map_err(|e| RuntimeError::Other(e.to_string()))?.is_some() {}
            }
            StartExecResults::Detached => {}
        }

        let inspect = self
            .docker
            .inspect_exec(&exec.id)
            .await
            .map_err(|e| RuntimeError::Other(e.to_string()))?;
        Ok(inspect.exit_code == Some(0))
    }
}
