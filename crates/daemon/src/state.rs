// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared state handed to every axum handler.

use std::sync::Arc;

use oj_engine::{HealthSupervisor, LifecycleManager, MetricsCollector};

#[derive(Clone)]
pub struct AppState {
    pub lifecycle: Arc<LifecycleManager>,
    pub health: Arc<HealthSupervisor>,
    pub metrics: Arc<MetricsCollector>,
    /// Used to build `download_link`/`logs_link` in `StatusResponse`.
    pub base_url: String,
}
