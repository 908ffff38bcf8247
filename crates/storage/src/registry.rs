// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The in-memory job registry (C1), guarded by a single
//! [`parking_lot::Mutex`] and durably mirrored to disk after every
//! mutation.

use std::collections::HashMap;
use std::path::PathBuf;

use oj_core::id::JobId;
use oj_core::job::Job;
use parking_lot::Mutex;

use crate::snapshot::{self, SnapshotError};

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

pub struct JobRegistry {
    jobs: Mutex<HashMap<JobId, Job>>,
    path: PathBuf,
}

impl JobRegistry {
    /// Load the registry from `path`, or start empty if the file doesn't
    /// exist yet. A file that exists but fails to parse is a fatal error —
    /// this system never silently discards state it can't make sense of.
    pub fn load_or_create(path: PathBuf) -> Result<Self, RegistryError> {
        let jobs = if path.exists() {
            let snap = snapshot::read(&path)?;
            snap.jobs.into_iter().map(|j| (j.id, j)).collect()
        } else {
            HashMap::new()
        };
        Ok(Self { jobs: Mutex::new(jobs), path })
    }

    /// Insert a newly-launched (or launch-failed) job and persist.
    pub fn insert(&self, job: Job) -> Result<(), RegistryError> {
        let snapshot = {
            let mut jobs = self.jobs.lock();
            jobs.insert(job.id, job);
            jobs.values().cloned().collect::<Vec<_>>()
        };
        snapshot::write_atomic(&snapshot, &self.path)?;
        Ok(())
    }

    pub fn get(&self, id: &JobId) -> Option<Job> {
        self.jobs.lock().get(id).cloned()
    }

    /// Apply `f` to the job's current record and persist the result.
    /// Terminal jobs absorb subsequent updates silently (invariant 2):
    /// callers that need to distinguish "already terminal" from "updated"
    /// should check `Job::is_terminal()` on the returned record themselves
    /// before calling, since the mutation still runs either way — this
    /// keeps the registry a dumb store rather than encoding lifecycle
    /// policy here.
    pub fn update<F>(&self, id: &JobId, f: F) -> Result<Option<Job>, RegistryError>
    where
        F: FnOnce(&mut Job),
    {
        let (updated, snapshot) = {
            let mut jobs = self.jobs.lock();
            let updated = match jobs.get_mut(id) {
                Some(job) => {
                    f(job);
                    Some(job.clone())
                }
                None => None,
            };
            (updated, jobs.values().cloned().collect::<Vec<_>>())
        };
        if updated.is_some() {
            snapshot::write_atomic(&snapshot, &self.path)?;
        }
        Ok(updated)
    }

    /// A consistent point-in-time clone of every job, for `/jobs` listing
    /// and the retention sweep.
    pub fn iter_snapshot(&self) -> Vec<Job> {
        self.jobs.lock().values().cloned().collect()
    }

    /// Drop a job from the registry entirely (retention cleanup only —
    /// never called for a job still reachable via the HTTP API).
    pub fn remove(&self, id: &JobId) -> Result<Option<Job>, RegistryError> {
        let (removed, snapshot) = {
            let mut jobs = self.jobs.lock();
            let removed = jobs.remove(id);
            (removed, jobs.values().cloned().collect::<Vec<_>>())
        };
        if removed.is_some() {
            snapshot::write_atomic(&snapshot, &self.path)?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
