// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job identifiers.
//!
//! Unlike the rest of this workspace's identifiers, a [`JobId`] must be a
//! real UUID: it is parsed out of the HTTP path directly and the control
//! API rejects malformed values at the boundary (see `oj-daemon`'s
//! extractor), so it wraps [`uuid::Uuid`] rather than the nanoid-based
//! scheme used elsewhere.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A job's unique identifier, in canonical UUID textual form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

/// Error returned when a string does not parse as a UUID.
#[derive(Debug, thiserror::Error)]
#[error("invalid job_id format (must be a UUID): {0}")]
pub struct InvalidJobId(String);

impl JobId {
    /// Generate a new random (v4) job id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a job id from its canonical textual form.
    pub fn parse(s: &str) -> Result<Self, InvalidJobId> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| InvalidJobId(s.to_string()))
    }

    /// The first 8 characters of the id's hyphenless hex form, used for
    /// human-readable container names (`agent_job_<short>`).
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for JobId {
    type Err = InvalidJobId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Uuid> for JobId {
    fn from(u: Uuid) -> Self {
        Self(u)
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
