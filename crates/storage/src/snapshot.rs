// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Crash-consistent snapshot file: write to a temp file in the same
//! directory, then rename over the target, so a reader never observes a
//! partially-written `jobs.json`.

use std::io::Write;
use std::path::Path;

use oj_core::job::Job;
use serde::{Deserialize, Serialize};

pub const CURRENT_SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot version {found} is newer than the version this binary understands ({max})")]
    FutureVersion { found: u32, max: u32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub v: u32,
    pub jobs: Vec<Job>,
}

impl Snapshot {
    pub fn new(jobs: Vec<Job>) -> Self {
        Self { v: CURRENT_SNAPSHOT_VERSION, jobs }
    }
}

/// Write `jobs` to `path` atomically: a temp file is created alongside
/// `path` (same filesystem, so the final rename is atomic), fully
/// written and `fsync`'d, then renamed into place.
pub fn write_atomic(jobs: &[Job], path: &Path) -> Result<(), SnapshotError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;
    let snapshot = Snapshot::new(jobs.to_vec());
    let body = serde_json::to_vec_pretty(&snapshot)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(&body)?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(path).map_err(|e| SnapshotError::Io(e.error))?;
    Ok(())
}

/// Read and parse a snapshot file. A missing file is not represented
/// here — callers distinguish "no file yet" before calling this.
pub fn read(path: &Path) -> Result<Snapshot, SnapshotError> {
    let body = std::fs::read(path)?;
    let snapshot: Snapshot = serde_json::from_slice(&body)?;
    if snapshot.v > CURRENT_SNAPSHOT_VERSION {
        return Err(SnapshotError::FutureVersion { found: snapshot.v, max: CURRENT_SNAPSHOT_VERSION });
    }
    Ok(snapshot)
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
