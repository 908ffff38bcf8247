// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types shared across crate boundaries that don't warrant their own
//! dedicated error enum.

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid job id: {0}")]
    InvalidJobId(#[from] crate::id::InvalidJobId),

    #[error("config error: {0}")]
    Config(#[from] crate::config::ConfigError),
}
