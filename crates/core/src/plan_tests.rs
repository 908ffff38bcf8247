// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn parses_shell_command_action() {
    let json = serde_json::json!({
        "type": "shell_command",
        "description": "list files",
        "command": "ls -la",
    });
    let action: Action = serde_json::from_value(json).expect("parses");
    match action {
        Action::ShellCommand { description, command } => {
            assert_eq!(description, "list files");
            assert_eq!(command, "ls -la");
        }
        other => panic!("expected ShellCommand, got {other:?}"),
    }
}

#[test]
fn parses_file_operation_action_with_default_write() {
    let json = serde_json::json!({
        "type": "file_operation",
        "description": "save notes",
        "filename": "notes.txt",
        "content": "hello",
    });
    let action: Action = serde_json::from_value(json).expect("parses");
    match action {
        Action::FileOperation { operation, filename, content, .. } => {
            assert_eq!(operation, FileOperationKind::Write);
            assert_eq!(filename, "notes.txt");
            assert_eq!(content.as_deref(), Some("hello"));
        }
        other => panic!("expected FileOperation, got {other:?}"),
    }
}

#[test]
fn unknown_action_types_are_tolerated_not_rejected() {
    let json = serde_json::json!({
        "type": "quantum_teleport",
        "description": "beam me up",
        "target": "enterprise",
    });
    let action: Action = serde_json::from_value(json).expect("unknown types parse as Other");
    assert_eq!(action.kind(), "quantum_teleport");
    assert!(!action.is_executable());
}

#[test]
fn web_scraping_and_gui_automation_are_not_executable() {
    let scraping: Action = serde_json::from_value(serde_json::json!({
        "type": "web_scraping", "description": "scrape", "url": "https://example.com"
    }))
    .expect("parses");
    let gui: Action = serde_json::from_value(serde_json::json!({
        "type": "gui_automation", "description": "click", "target": "button"
    }))
    .expect("parses");
    assert!(!scraping.is_executable());
    assert!(!gui.is_executable());
}

#[test]
fn manifest_is_partial_when_anything_remains() {
    let manifest = ResultManifest::compile(
        "do stuff",
        vec![ActionResult::ok("shell_command", "d", "out")],
        vec![],
        vec![],
        vec![Action::WebScraping { description: "scrape".into(), detail: serde_json::json!({}) }],
    );
    assert_eq!(manifest.status, ManifestStatus::Partial);
    assert_eq!(manifest.executed_actions, 1);
    assert_eq!(manifest.remaining_actions, 1);
}

#[test]
fn manifest_is_completed_when_nothing_remains() {
    let manifest = ResultManifest::compile("do stuff", vec![], vec![], vec![], vec![]);
    assert_eq!(manifest.status, ManifestStatus::Completed);
}

#[test]
fn fallback_plan_is_a_single_harmless_echo() {
    let plan = ActionPlan::fallback();
    assert_eq!(plan.actions.len(), 1);
    assert_eq!(plan.estimated_time, "1 minute");
}

#[test]
fn failed_manifest_carries_no_results_and_an_error() {
    let manifest = ResultManifest::failed("job-1", "do stuff", "workspace dir vanished");
    assert_eq!(manifest.status, ManifestStatus::Failed);
    assert_eq!(manifest.error.as_deref(), Some("workspace dir vanished"));
    assert!(manifest.shell_results.is_empty());
    assert_eq!(manifest.job_id.as_deref(), Some("job-1"));
}

#[test]
fn full_manifest_carries_job_context_and_created_files() {
    let manifest = ResultManifest::new(
        "job-2",
        "make a file",
        ActionPlan::fallback(),
        vec![],
        vec![],
        vec![ActionResult::ok("file_operation", "write notes.txt", "wrote 5 bytes")],
        vec![],
        vec![CreatedFile::with_content("notes.txt", "hello")],
        "/workspace/output/job-2/workspace",
        "/workspace/output/job-2",
    );
    assert_eq!(manifest.status, ManifestStatus::Completed);
    assert_eq!(manifest.created_files.len(), 1);
    assert_eq!(manifest.created_files[0].size, 5);
    assert_eq!(manifest.workspace_dir.as_deref(), Some("/workspace/output/job-2/workspace"));
}
