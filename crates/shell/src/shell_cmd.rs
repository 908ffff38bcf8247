// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The shell sub-executor (spec §4.6.2): detects file references among a
//! command's tokens, polls briefly for files the file sub-executor just
//! wrote (to absorb filesystem publication lag), skips Linux-only
//! utilities on a non-Linux host, and otherwise runs the command as a
//! shell pipeline in the workspace.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use oj_core::plan::{Action, ActionResult};

/// The Linux-only command table from
/// `examples/original_source/src/agent/nodes.py::ShellCommandNode.exec`,
/// plus `ls -la` as a whole-command match (spec §4.6 supplemental).
const LINUX_ONLY_COMMANDS: &[&str] = &["ls", "pwd", "cat", "touch", "rm", "mv", "cp"];
const LINUX_ONLY_WHOLE_COMMANDS: &[&str] = &["ls -la"];

const FILE_POLL_ATTEMPTS: u32 = 10;
const FILE_POLL_INTERVAL: Duration = Duration::from_millis(100);

fn resolve(workspace: &Path, filename: &str) -> PathBuf {
    let path = Path::new(filename);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        workspace.join(path)
    }
}

/// Tokenize a command the same way the original does: strip quote
/// characters, then split on whitespace.
fn tokenize(command: &str) -> Vec<String> {
    command.trim().replace('"', "").replace('\'', "").split_whitespace().map(String::from).collect()
}

/// Build the set of filenames the file sub-executor has already written
/// (as lowercased basenames and lowercased posix paths), for the shell
/// sub-executor's file-reference detection.
pub fn known_files_from(file_results: &[ActionResult]) -> HashSet<String> {
    let mut known = HashSet::new();
    for result in file_results {
        if !result.success {
            continue;
        }
        let is_write_or_append = matches!(result.operation.as_deref(), Some("write") | Some("append"));
        if !is_write_or_append {
            continue;
        }
        let Some(filename) = &result.filename else { continue };
        let normalized = filename.replace('\\', "/").to_lowercase();
        if let Some(basename) = Path::new(&normalized).file_name().and_then(|n| n.to_str()) {
            known.insert(basename.to_string());
        }
        known.insert(normalized);
    }
    known
}

fn references_known_file(token: &str, known_files: &HashSet<String>) -> bool {
    let normalized = token.replace('\\', "/").to_lowercase();
    if known_files.contains(&normalized) {
        return true;
    }
    Path::new(&normalized).file_name().and_then(|n| n.to_str()).is_some_and(|basename| known_files.contains(basename))
}

async fn wait_for_file(path: &Path) -> bool {
    for attempt in 0..FILE_POLL_ATTEMPTS {
        if path.exists() {
            return true;
        }
        if attempt + 1 < FILE_POLL_ATTEMPTS {
            tokio::time::sleep(FILE_POLL_INTERVAL).await;
        }
    }
    path.exists()
}

async fn execute_one(workspace: &Path, description: &str, command: &str, known_files: &HashSet<String>) -> ActionResult {
    let tokens = tokenize(command);
    let Some(first) = tokens.first() else {
        return ActionResult::failed("shell_command", description, "empty command").command(command);
    };

    if cfg!(windows) && (LINUX_ONLY_COMMANDS.contains(&first.as_str()) || LINUX_ONLY_WHOLE_COMMANDS.contains(&command)) {
        return ActionResult::failed("shell_command", description, format!("{command} is Linux-only and was skipped"))
            .command(command);
    }

    for token in &tokens[1..] {
        if !references_known_file(token, known_files) {
            continue;
        }
        let path = resolve(workspace, token);
        if !wait_for_file(&path).await {
            return ActionResult::failed("shell_command", description, format!("File {} not found before execution.", path.display()))
                .command(command);
        }
    }

    match tokio::process::Command::new("sh").arg("-c").arg(command).current_dir(workspace).output().await {
        Ok(output) => {
            let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            ActionResult {
                kind: "shell_command".to_string(),
                description: description.to_string(),
                success: output.status.success(),
                output: Some(stdout),
                error: Some(stderr),
                exit_code: output.status.code(),
                command: Some(command.to_string()),
                filename: None,
                operation: None,
            }
        }
        Err(err) => ActionResult::failed("shell_command", description, err.to_string()).command(command),
    }
}

/// Run every `shell_command` action in order, in the workspace.
pub async fn execute(workspace: &Path, actions: Vec<Action>, known_files: &HashSet<String>) -> Vec<ActionResult> {
    let mut results = Vec::with_capacity(actions.len());
    for action in actions {
        let Action::ShellCommand { description, command } = action else { continue };
        results.push(execute_one(workspace, &description, &command, known_files).await);
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell(description: &str, command: &str) -> Action {
        Action::ShellCommand { description: description.to_string(), command: command.to_string() }
    }

    #[tokio::test]
    async fn runs_a_simple_command_and_captures_stdout() {
        let dir = tempfile::tempdir().expect("tempdir");
        let results = execute(dir.path(), vec![shell("say hi", "echo hello")], &HashSet::new()).await;
        assert!(results[0].success);
        assert_eq!(results[0].output.as_deref(), Some("hello\n"));
        assert_eq!(results[0].exit_code, Some(0));
    }

    #[tokio::test]
    async fn nonzero_exit_is_not_success_but_still_captured() {
        let dir = tempfile::tempdir().expect("tempdir");
        let results = execute(dir.path(), vec![shell("fail", "exit 3")], &HashSet::new()).await;
        assert!(!results[0].success);
        assert_eq!(results[0].exit_code, Some(3));
    }

    #[tokio::test]
    async fn referenced_file_that_exists_lets_the_command_run() {
        let dir = tempfile::tempdir().expect("tempdir");
        tokio::fs::write(dir.path().join("data.txt"), "hi").await.expect("writes");
        let mut known = HashSet::new();
        known.insert("data.txt".to_string());
        let results = execute(dir.path(), vec![shell("read it", "cat data.txt")], &known).await;
        assert!(results[0].success, "{:?}", results[0]);
        assert_eq!(results[0].output.as_deref(), Some("hi"));
    }

    #[tokio::test]
    async fn referenced_file_that_never_appears_fails_without_executing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut known = HashSet::new();
        known.insert("missing.txt".to_string());
        let results = execute(dir.path(), vec![shell("read it", "cat missing.txt")], &known).await;
        assert!(!results[0].success);
        assert!(results[0].error.as_ref().unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn unrelated_tokens_are_not_treated_as_file_references() {
        let dir = tempfile::tempdir().expect("tempdir");
        let results = execute(dir.path(), vec![shell("greet", "echo world")], &HashSet::new()).await;
        assert!(results[0].success);
    }
}
