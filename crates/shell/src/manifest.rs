// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The result compilation sub-executor (spec §4.6.4): snapshots every
//! file under the workspace and assembles the final
//! [`ResultManifest`](oj_core::plan::ResultManifest).

use std::path::Path;

use oj_core::plan::{Action, ActionPlan, ActionResult, CreatedFile, ResultManifest};

use crate::ExecutionContext;

/// The outcome of running the three sub-executors, ready to compile.
pub struct PipelineOutcome {
    pub shell_results: Vec<ActionResult>,
    pub python_results: Vec<ActionResult>,
    pub file_results: Vec<ActionResult>,
    pub remaining: Vec<Action>,
}

impl From<ExecutionContext> for PipelineOutcome {
    fn from(ctx: ExecutionContext) -> Self {
        Self {
            shell_results: ctx.shell_results,
            python_results: ctx.python_results,
            file_results: ctx.file_results,
            remaining: ctx.into_remaining(),
        }
    }
}

/// Walk `workspace` recursively, reading every file found (relative path,
/// byte size, UTF-8 content). Non-UTF-8 files are recorded with size
/// only and an error note, never excluded outright (spec §4.6.4).
pub async fn snapshot_workspace(workspace: &Path) -> Vec<CreatedFile> {
    let mut files = Vec::new();
    let mut stack = vec![workspace.to_path_buf()];

    while let Some(dir) = stack.pop() {
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!(dir = %dir.display(), error = %err, "could not read workspace directory while snapshotting");
                continue;
            }
        };
        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            let file_type = match entry.file_type().await {
                Ok(ft) => ft,
                Err(_) => continue,
            };
            if file_type.is_dir() {
                stack.push(path);
                continue;
            }
            if !file_type.is_file() {
                continue;
            }
            let rel = path.strip_prefix(workspace).unwrap_or(&path).to_string_lossy().into_owned();
            let metadata = tokio::fs::metadata(&path).await.ok();
            let size = metadata.map(|m| m.len()).unwrap_or(0);
            match tokio::fs::read(&path).await {
                Ok(bytes) => match String::from_utf8(bytes) {
                    Ok(content) => files.push(CreatedFile::with_content(rel, content)),
                    Err(_) => files.push(CreatedFile::unreadable(rel, size, "file is not valid UTF-8")),
                },
                Err(err) => files.push(CreatedFile::unreadable(rel, size, err.to_string())),
            }
        }
    }

    files
}

/// Compile the final manifest for a worker run, including the
/// `analysis` plan echoed back so `result.json` documents exactly what
/// the analyzer proposed.
#[allow(clippy::too_many_arguments)]
pub fn compile_manifest(
    job_id: impl Into<String>,
    task: impl Into<String>,
    analysis: ActionPlan,
    outcome: PipelineOutcome,
    created_files: Vec<CreatedFile>,
    workspace_dir: impl Into<String>,
    output_dir: impl Into<String>,
) -> ResultManifest {
    ResultManifest::new(
        job_id,
        task,
        analysis,
        outcome.shell_results,
        outcome.python_results,
        outcome.file_results,
        outcome.remaining,
        created_files,
        workspace_dir,
        output_dir,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn snapshot_reads_nested_text_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        tokio::fs::create_dir_all(dir.path().join("nested")).await.expect("mkdir");
        tokio::fs::write(dir.path().join("top.txt"), "top").await.expect("write");
        tokio::fs::write(dir.path().join("nested/inner.txt"), "inner").await.expect("write");

        let mut files = snapshot_workspace(dir.path()).await;
        files.sort_by(|a, b| a.filename.cmp(&b.filename));
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].filename, "nested/inner.txt");
        assert_eq!(files[0].content.as_deref(), Some("inner"));
        assert_eq!(files[1].filename, "top.txt");
    }

    #[tokio::test]
    async fn snapshot_records_non_utf8_files_with_size_only() {
        let dir = tempfile::tempdir().expect("tempdir");
        tokio::fs::write(dir.path().join("binary.dat"), [0xff, 0xfe, 0x00, 0xff]).await.expect("write");
        let files = snapshot_workspace(dir.path()).await;
        assert_eq!(files.len(), 1);
        assert!(files[0].content.is_none());
        assert_eq!(files[0].size, 4);
        assert!(files[0].error.is_some());
    }

    #[test]
    fn compile_manifest_is_completed_when_nothing_remains() {
        let outcome = PipelineOutcome {
            shell_results: vec![ActionResult::ok("shell_command", "d", "out")],
            python_results: vec![],
            file_results: vec![],
            remaining: vec![],
        };
        let manifest = compile_manifest(
            "job-1",
            "echo Hello World",
            ActionPlan::fallback(),
            outcome,
            vec![],
            "/workspace/output/job-1/workspace",
            "/workspace/output/job-1",
        );
        assert_eq!(manifest.status, oj_core::plan::ManifestStatus::Completed);
        assert_eq!(manifest.task, "echo Hello World");
    }
}
