// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The scripted-code sub-executor (spec §4.6.3): materializes each
//! `python_code` action's source to a fresh temp file, runs it under the
//! interpreter in the workspace with a hard wall-clock timeout, and
//! deletes the temp file afterward (best-effort).

use std::path::Path;
use std::time::Duration;

use oj_core::plan::{Action, ActionResult};

const INTERPRETER: &str = "python3";
const SOURCE_EXTENSION: &str = "py";

async fn execute_one(workspace: &Path, description: &str, code: &str, timeout: Duration) -> ActionResult {
    let temp_file = match tempfile::Builder::new().suffix(&format!(".{SOURCE_EXTENSION}")).tempfile() {
        Ok(f) => f,
        Err(err) => {
            return ActionResult::failed("python_code", description, format!("could not materialize script: {err}")).code_echo(code);
        }
    };
    let temp_path = temp_file.path().to_path_buf();
    // Keep the handle alive past this point via `temp_file`, but write
    // through the async API so a large script doesn't block the runtime.
    if let Err(err) = tokio::fs::write(&temp_path, code).await {
        return ActionResult::failed("python_code", description, format!("could not materialize script: {err}")).code_echo(code);
    }

    let run = tokio::process::Command::new(INTERPRETER).arg(&temp_path).current_dir(workspace).output();

    let result = match tokio::time::timeout(timeout, run).await {
        Ok(Ok(output)) => {
            let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            ActionResult {
                kind: "python_code".to_string(),
                description: description.to_string(),
                success: output.status.success(),
                output: Some(stdout),
                error: Some(stderr),
                exit_code: output.status.code(),
                command: Some(code.to_string()),
                filename: None,
                operation: None,
            }
        }
        Ok(Err(err)) => ActionResult::failed("python_code", description, err.to_string()).code_echo(code),
        Err(_elapsed) => ActionResult::failed("python_code", description, "Execution timed out").code_echo(code),
    };

    let _ = tokio::fs::remove_file(&temp_path).await;
    result
}

/// Run every `python_code` action in order, in the workspace.
pub async fn execute(workspace: &Path, actions: Vec<Action>, timeout: Duration) -> Vec<ActionResult> {
    let mut results = Vec::with_capacity(actions.len());
    for action in actions {
        let Action::PythonCode { description, code } = action else { continue };
        results.push(execute_one(workspace, &description, &code, timeout).await);
    }
    results
}

/// `ActionResult::command` is named for shell commands; scripted-code
/// actions echo their source the same way, under the same field, since
/// `ActionResult` doesn't keep separate `command`/`code` wire fields
/// (spec §3 lists them as alternative echoes of the same concept).
trait CodeEcho {
    fn code_echo(self, code: &str) -> Self;
}

impl CodeEcho for ActionResult {
    fn code_echo(self, code: &str) -> Self {
        self.command(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn python(description: &str, code: &str) -> Action {
        Action::PythonCode { description: description.to_string(), code: code.to_string() }
    }

    #[tokio::test]
    async fn runs_script_and_captures_stdout() {
        let dir = tempfile::tempdir().expect("tempdir");
        let results = execute(dir.path(), vec![python("say hi", "print('Hello World')")], Duration::from_secs(5)).await;
        assert!(results[0].success, "{:?}", results[0]);
        assert_eq!(results[0].output.as_deref(), Some("Hello World\n"));
    }

    #[tokio::test]
    async fn nonzero_exit_captures_stderr() {
        let dir = tempfile::tempdir().expect("tempdir");
        let results = execute(dir.path(), vec![python("raise", "raise SystemExit(2)")], Duration::from_secs(5)).await;
        assert!(!results[0].success);
        assert_eq!(results[0].exit_code, Some(2));
    }

    #[tokio::test]
    async fn runs_in_the_workspace_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        tokio::fs::write(dir.path().join("data.txt"), "hello from disk").await.expect("writes");
        let code = "print(open('data.txt').read())";
        let results = execute(dir.path(), vec![python("read file", code)], Duration::from_secs(5)).await;
        assert!(results[0].success, "{:?}", results[0]);
        assert_eq!(results[0].output.as_deref(), Some("hello from disk\n"));
    }

    #[tokio::test]
    async fn timeout_is_reported_as_a_failure() {
        let dir = tempfile::tempdir().expect("tempdir");
        let results = execute(dir.path(), vec![python("sleep", "import time; time.sleep(5)")], Duration::from_millis(50)).await;
        assert!(!results[0].success);
        assert_eq!(results[0].error.as_deref(), Some("Execution timed out"));
    }
}
