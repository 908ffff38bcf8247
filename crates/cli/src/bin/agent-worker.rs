// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The worker runtime (C7): the process that actually runs inside each
//! job's container. Picks an output directory, builds a plan via the
//! analyzer, runs the action-executor pipeline, and always leaves
//! `result.json` behind — grounded on
//! `examples/original_source/src/agent_container/agent_runner.py` and
//! `examples/original_source/src/agent/agent_runtime.py` (spec §4.7).

use std::path::{Path, PathBuf};

use oj_core::config::WorkerConfig;
use oj_core::plan::ResultManifest;
use oj_runbook::{HttpPlanSource, PlanSource};
use oj_shell::{manifest, run_pipeline};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = WorkerConfig::from_env()?;
    tracing::info!(job_id = %config.job_id, "agent runner started");

    let output_dir = resolve_output_dir(&config);
    let result_path = output_dir.join("result.json");

    // Step 5: workspace setup failing (output dir can't be created at
    // all) is the only case that can't even attempt the pipeline — it
    // still produces a `status=failed` manifest rather than propagating
    // and leaving no `result.json` behind (spec §4.7 step 5, §7
    // WorkerFatalError).
    let manifest = match std::fs::create_dir_all(&output_dir) {
        Ok(()) => {
            let workspace_dir = output_dir.join("workspace");
            let original_cwd = std::env::current_dir().ok();
            let effective_workspace = match prepare_workspace(&workspace_dir) {
                Ok(()) => workspace_dir.clone(),
                Err(err) => {
                    tracing::warn!(workspace = %workspace_dir.display(), error = %err, "could not enter workspace directory, falling back to output dir");
                    output_dir.clone()
                }
            };

            let manifest = run_job(&config, &output_dir, &effective_workspace).await;

            // Always restore the original working directory before
            // returning (spec §4.7 step 4).
            if let Some(cwd) = original_cwd {
                let _ = std::env::set_current_dir(cwd);
            }
            manifest
        }
        Err(err) => {
            tracing::error!(error = %err, "could not create output directory, writing a failed manifest");
            ResultManifest::failed(config.job_id.clone(), config.job_prompt.clone(), format!("could not create output directory: {err}"))
        }
    };

    let body = serde_json::to_string_pretty(&manifest)?;
    tokio::fs::write(&result_path, body).await?;
    tracing::info!(path = %result_path.display(), "results saved");

    Ok(())
}

/// Step 1: prefer `/workspace/output/<job_id>` under a detected
/// container, `<AGENT_OUTPUT_DIR>/<job_id>` when explicitly overridden,
/// else `./output/<job_id>` under the process's CWD.
fn resolve_output_dir(config: &WorkerConfig) -> PathBuf {
    if let Some(explicit) = &config.output_dir {
        return explicit.join(&config.job_id);
    }
    if is_running_in_container(config) && Path::new("/workspace").exists() {
        return PathBuf::from("/workspace/output").join(&config.job_id);
    }
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join("output").join(&config.job_id)
}

fn is_running_in_container(config: &WorkerConfig) -> bool {
    if config.container_env {
        return true;
    }
    if Path::new("/.dockerenv").exists() {
        return true;
    }
    std::fs::read_to_string("/proc/1/cgroup").map(|contents| contents.contains("docker")).unwrap_or(false)
}

/// Step 2: create `<output>/workspace` and chdir into it.
fn prepare_workspace(workspace_dir: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(workspace_dir)?;
    std::env::set_current_dir(workspace_dir)
}

/// Steps 3+5: build the plan, run the pipeline, compile the manifest.
/// Any uncaught error here still yields a `status=failed` manifest
/// (`WorkerFatalError`, spec §7) instead of propagating.
async fn run_job(config: &WorkerConfig, output_dir: &Path, workspace_dir: &Path) -> ResultManifest {
    let source = build_plan_source(config);
    let plan = source.analyze(&config.job_prompt).await;

    let pipeline_ctx = run_pipeline(workspace_dir.to_path_buf(), plan.clone(), config.script_timeout).await;
    let created_files = manifest::snapshot_workspace(workspace_dir).await;
    let outcome = pipeline_ctx.into();

    manifest::compile_manifest(
        config.job_id.clone(),
        config.job_prompt.clone(),
        plan,
        outcome,
        created_files,
        workspace_dir.to_string_lossy().into_owned(),
        output_dir.to_string_lossy().into_owned(),
    )
}

fn build_plan_source(config: &WorkerConfig) -> Box<dyn PlanSource> {
    match &config.model_api_url {
        Some(url) => Box::new(HttpPlanSource::new(url.clone(), config.model_api_key.clone())),
        None => {
            tracing::warn!("MODEL_API_URL not set, analyzer calls will always fail and fall back to the echo plan");
            Box::new(HttpPlanSource::new(String::new(), None))
        }
    }
}
