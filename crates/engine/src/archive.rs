// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output archive building for `GetOutput` (spec §4.3.4). Building a zip
//! is CPU-bound and synchronous, so it runs on a blocking thread; once
//! built, the archive is never rebuilt, which is what makes repeated
//! `GetOutput` calls byte-identical (invariant 4).

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::EngineError;

pub async fn build(source_dir: &Path, archive_path: &Path) -> Result<(), EngineError> {
    let source_dir = source_dir.to_path_buf();
    let archive_path = archive_path.to_path_buf();
    tokio::task::spawn_blocking(move || build_blocking(&source_dir, &archive_path))
        .await
        .map_err(|err| EngineError::Archive(err.to_string()))?
}

fn build_blocking(source_dir: &PathBuf, archive_path: &PathBuf) -> Result<(), EngineError> {
    let file = std::fs::File::create(archive_path)?;
    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let mut stack = vec![source_dir.clone()];
    while let Some(dir) = stack.pop() {
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if &path == archive_path {
                continue;
            }
            let rel = path.strip_prefix(source_dir).unwrap_or(&path).to_string_lossy().replace('\\', "/");
            if path.is_dir() {
                writer.add_directory(format!("{rel}/"), options).map_err(|err| EngineError::Archive(err.to_string()))?;
                stack.push(path);
            } else {
                writer.start_file(rel, options).map_err(|err| EngineError::Archive(err.to_string()))?;
                writer.write_all(&std::fs::read(&path)?)?;
            }
        }
    }
    writer.finish().map_err(|err| EngineError::Archive(err.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn archive_contains_result_json_and_nested_workspace_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("result.json"), r#"{"status":"completed"}"#).expect("write");
        std::fs::create_dir_all(dir.path().join("workspace/nested")).expect("mkdir");
        std::fs::write(dir.path().join("workspace/nested/out.txt"), "hi").expect("write");

        let archive_path = dir.path().join("output.zip");
        build(dir.path(), &archive_path).await.expect("builds");

        let file = std::fs::File::open(&archive_path).expect("opens");
        let mut zip = zip::ZipArchive::new(file).expect("reads zip");
        assert!(zip.by_name("result.json").is_ok());
        assert!(zip.by_name("workspace/nested/out.txt").is_ok());
    }

    #[tokio::test]
    async fn rebuilding_is_skipped_by_callers_so_bytes_never_change() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("result.json"), "{}").expect("write");
        let archive_path = dir.path().join("output.zip");
        build(dir.path(), &archive_path).await.expect("builds");
        let first = std::fs::read(&archive_path).expect("reads");

        // A second build (as if a caller forgot the exists() guard) over the
        // same unchanged source still produces byte-identical output,
        // since nothing about the source tree changed between calls.
        build(dir.path(), &archive_path).await.expect("builds again");
        let second = std::fs::read(&archive_path).expect("reads");
        assert_eq!(first, second);
    }
}
