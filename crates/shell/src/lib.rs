// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! The action executor (C6): a small pipeline of three sub-executors run
//! in fixed order — file operations, then shell commands, then scripted
//! code — followed by a result-compilation step that produces the
//! [`ResultManifest`](oj_core::plan::ResultManifest). Every sub-executor
//! consumes only the actions tagged for it, left to right, and strikes
//! them from the plan (spec §4.6, §9 "context struct passed by
//! reference").

pub mod context;
pub mod file_ops;
pub mod manifest;
pub mod script;
pub mod shell_cmd;

pub use context::ExecutionContext;
pub use manifest::{snapshot_workspace, PipelineOutcome};

use std::path::PathBuf;
use std::time::Duration;

use oj_core::plan::{Action, ActionPlan};

/// The default wall-clock timeout for scripted-code actions (spec §4.6.3).
pub const DEFAULT_SCRIPT_TIMEOUT: Duration = Duration::from_secs(30);

/// Run the full three-stage pipeline over `plan` inside `workspace`.
///
/// Fixed order per spec §4.6: file operations first (so shell commands
/// referencing them see them on disk), then shell commands, then
/// scripted code. Returns the context with every bucket filled and
/// `actions` reduced to whatever no sub-executor claimed.
pub async fn run_pipeline(workspace: PathBuf, plan: ActionPlan, script_timeout: Duration) -> ExecutionContext {
    let mut ctx = ExecutionContext::new(workspace, plan);

    let file_actions = ctx.take_matching(|a| matches!(a, Action::FileOperation { .. }));
    ctx.file_results = file_ops::execute(&ctx.workspace, file_actions).await;

    let shell_actions = ctx.take_matching(|a| matches!(a, Action::ShellCommand { .. }));
    let known_files = shell_cmd::known_files_from(&ctx.file_results);
    ctx.shell_results = shell_cmd::execute(&ctx.workspace, shell_actions, &known_files).await;

    let script_actions = ctx.take_matching(|a| matches!(a, Action::PythonCode { .. }));
    ctx.python_results = script::execute(&ctx.workspace, script_actions, script_timeout).await;

    ctx
}
