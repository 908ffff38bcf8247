// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The file operation sub-executor (spec §4.6.1): write/append/create a
//! directory, relative to the workspace root. All I/O errors are
//! captured as failure results; nothing here ever propagates an error
//! out of the pipeline.

use std::path::{Path, PathBuf};

use oj_core::plan::{Action, ActionResult, FileOperationKind};

fn resolve(workspace: &Path, filename: &str) -> PathBuf {
    let path = Path::new(filename);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        workspace.join(path)
    }
}

fn operation_name(operation: FileOperationKind) -> &'static str {
    match operation {
        FileOperationKind::Write => "write",
        FileOperationKind::Append => "append",
        FileOperationKind::CreateDirectory => "create_directory",
    }
}

async fn execute_one(workspace: &Path, description: &str, operation: FileOperationKind, filename: &str, content: Option<&str>) -> ActionResult {
    let op_name = operation_name(operation);
    if filename.is_empty() {
        return ActionResult::failed("file_operation", description, "no filename specified for file operation")
            .operation(op_name);
    }
    let path = resolve(workspace, filename);

    let outcome: std::io::Result<String> = async {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        match operation {
            FileOperationKind::Write => {
                let body = content.unwrap_or_default();
                tokio::fs::write(&path, body).await?;
                Ok(format!("Created file {} with {} characters", path.display(), body.len()))
            }
            FileOperationKind::Append => {
                use tokio::io::AsyncWriteExt;
                let mut file = tokio::fs::OpenOptions::new().create(true).append(true).open(&path).await?;
                file.write_all(content.unwrap_or_default().as_bytes()).await?;
                Ok(format!("Appended to file {}", path.display()))
            }
            FileOperationKind::CreateDirectory => {
                tokio::fs::create_dir_all(&path).await?;
                Ok(format!("Created directory {}", path.display()))
            }
        }
    }
    .await;

    match outcome {
        Ok(output) => ActionResult::ok("file_operation", description, output)
            .filename(path.display().to_string())
            .operation(op_name),
        Err(err) => ActionResult::failed("file_operation", description, err.to_string())
            .filename(path.display().to_string())
            .operation(op_name),
    }
}

/// Run every `file_operation` action in order, in the workspace.
pub async fn execute(workspace: &Path, actions: Vec<Action>) -> Vec<ActionResult> {
    let mut results = Vec::with_capacity(actions.len());
    for action in actions {
        let Action::FileOperation { description, operation, filename, content } = action else {
            continue;
        };
        results.push(execute_one(workspace, &description, operation, &filename, content.as_deref()).await);
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_action(filename: &str, content: &str) -> Action {
        Action::FileOperation {
            description: format!("write {filename}"),
            operation: FileOperationKind::Write,
            filename: filename.to_string(),
            content: Some(content.to_string()),
        }
    }

    #[tokio::test]
    async fn write_creates_file_with_content() {
        let dir = tempfile::tempdir().expect("tempdir");
        let results = execute(dir.path(), vec![write_action("notes.txt", "hello world")]).await;
        assert!(results[0].success);
        let body = tokio::fs::read_to_string(dir.path().join("notes.txt")).await.expect("reads");
        assert_eq!(body, "hello world");
    }

    #[tokio::test]
    async fn write_creates_parent_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let results = execute(dir.path(), vec![write_action("nested/dir/notes.txt", "x")]).await;
        assert!(results[0].success);
        assert!(dir.path().join("nested/dir/notes.txt").exists());
    }

    #[tokio::test]
    async fn append_adds_to_existing_content() {
        let dir = tempfile::tempdir().expect("tempdir");
        execute(dir.path(), vec![write_action("log.txt", "first\n")]).await;
        let append = Action::FileOperation {
            description: "append".into(),
            operation: FileOperationKind::Append,
            filename: "log.txt".into(),
            content: Some("second\n".into()),
        };
        let results = execute(dir.path(), vec![append]).await;
        assert!(results[0].success);
        let body = tokio::fs::read_to_string(dir.path().join("log.txt")).await.expect("reads");
        assert_eq!(body, "first\nsecond\n");
    }

    #[tokio::test]
    async fn create_directory_makes_a_directory_not_a_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let action = Action::FileOperation {
            description: "mkdir".into(),
            operation: FileOperationKind::CreateDirectory,
            filename: "test_data".into(),
            content: None,
        };
        let results = execute(dir.path(), vec![action]).await;
        assert!(results[0].success);
        assert!(dir.path().join("test_data").is_dir());
    }

    #[tokio::test]
    async fn missing_filename_is_a_failure_not_a_panic() {
        let dir = tempfile::tempdir().expect("tempdir");
        let action = Action::FileOperation {
            description: "bad".into(),
            operation: FileOperationKind::Write,
            filename: String::new(),
            content: Some("x".into()),
        };
        let results = execute(dir.path(), vec![action]).await;
        assert!(!results[0].success);
    }
}
