// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The orchestrator daemon process: loads configuration, connects to
//! Docker, and serves the HTTP control API.

use std::sync::Arc;

use oj_adapters::docker::DockerRuntime;
use oj_core::clock::SystemClock;
use oj_core::config::OrchestratorConfig;
use oj_daemon::{router, AppState};
use oj_engine::{HealthSupervisor, LifecycleManager, MetricsCollector};
use oj_storage::JobRegistry;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = OrchestratorConfig::from_env();
    std::fs::create_dir_all(&config.output_dir)?;

    let registry = JobRegistry::load_or_create(config.jobs_file.clone())?;
    let runtime = Arc::new(DockerRuntime::connect()?);
    let clock = Arc::new(SystemClock);

    let lifecycle = Arc::new(LifecycleManager::new(registry, runtime.clone(), clock.clone(), config.clone()));
    // Mirrors JobManager.__init__'s eager self.cleanup_jobs() call.
    lifecycle.cleanup().await;

    let health = Arc::new(HealthSupervisor::new(runtime.clone(), clock.clone()));
    let metrics = Arc::new(MetricsCollector::with_retention(runtime, clock, config.metrics_retention_hours, config.metrics_collection_interval.as_secs()));

    tokio::spawn(cleanup_loop(lifecycle.clone(), config.health_check_interval));
    tokio::spawn(health.clone().run(config.health_check_interval));
    tokio::spawn(metrics.clone().run(config.metrics_collection_interval));

    let base_url = format!("http://{}", config.listen_addr);
    let state = AppState { lifecycle, health, metrics, base_url };
    let app = router(state).layer(TraceLayer::new_for_http());

    tracing::info!(addr = %config.listen_addr, "orchestrator listening");
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn cleanup_loop(lifecycle: Arc<LifecycleManager>, interval: std::time::Duration) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        lifecycle.cleanup().await;
    }
}
