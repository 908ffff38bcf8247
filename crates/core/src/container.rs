// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration for launching a job's worker container.

use std::collections::HashMap;
use std::path::PathBuf;

/// Everything the container runtime adapter needs to launch a job's
/// worker container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerConfig {
    pub image: String,
    pub name: String,
    pub env: Vec<(String, String)>,
    /// host path -> (container path, read-only)
    pub mounts: HashMap<PathBuf, (PathBuf, bool)>,
    pub mem_limit_bytes: i64,
    pub cpu_period_us: i64,
    pub cpu_quota_us: i64,
}

impl ContainerConfig {
    pub fn new(image: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            name: name.into(),
            env: Vec::new(),
            mounts: HashMap::new(),
            mem_limit_bytes: 2 * 1024 * 1024 * 1024,
            cpu_period_us: 100_000,
            cpu_quota_us: 50_000,
        }
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn with_mount(
        mut self,
        host_path: impl Into<PathBuf>,
        container_path: impl Into<PathBuf>,
        read_only: bool,
    ) -> Self {
        self.mounts
            .insert(host_path.into(), (container_path.into(), read_only));
        self
    }
}
