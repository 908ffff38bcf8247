// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors the job lifecycle manager and health/metrics supervisor can
//! surface to the control API.

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Registry(#[from] oj_storage::registry::RegistryError),

    #[error("archive error: {0}")]
    Archive(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
