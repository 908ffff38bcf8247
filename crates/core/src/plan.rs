// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The action plan produced by the action plan analyzer and consumed by
//! the action executor: [`Action`], [`ActionPlan`], [`ActionResult`], and
//! the final [`ResultManifest`].

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// A single step in an action plan.
///
/// `WebScraping` and `GuiAutomation` are recognized action types this
/// executor never runs directly — they are surfaced back in
/// `ResultManifest::remaining` and force `status = partial`. Any action
/// type this system has never heard of at all is tolerated the same way,
/// under `Other`, rather than rejected: a future analyzer may propose new
/// kinds the executor doesn't understand yet, and the plan should still
/// execute the parts it does.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ShellCommand { description: String, command: String },
    PythonCode { description: String, code: String },
    FileOperation {
        description: String,
        operation: FileOperationKind,
        filename: String,
        content: Option<String>,
    },
    WebScraping { description: String, detail: Value },
    GuiAutomation { description: String, detail: Value },
    Other { kind: String, description: String, detail: Value },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileOperationKind {
    Write,
    Append,
    CreateDirectory,
}

impl Action {
    pub fn kind(&self) -> &str {
        match self {
            Action::ShellCommand { .. } => "shell_command",
            Action::PythonCode { .. } => "python_code",
            Action::FileOperation { .. } => "file_operation",
            Action::WebScraping { .. } => "web_scraping",
            Action::GuiAutomation { .. } => "gui_automation",
            Action::Other { kind, .. } => kind,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Action::ShellCommand { description, .. }
            | Action::PythonCode { description, .. }
            | Action::FileOperation { description, .. }
            | Action::WebScraping { description, .. }
            | Action::GuiAutomation { description, .. }
            | Action::Other { description, .. } => description,
        }
    }

    /// The executor runs exactly these two kinds plus file operations;
    /// everything else is left for `remaining_actions`.
    pub fn is_executable(&self) -> bool {
        matches!(
            self,
            Action::ShellCommand { .. } | Action::PythonCode { .. } | Action::FileOperation { .. }
        )
    }
}

fn str_field<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key).and_then(Value::as_str)
}

impl<'de> Deserialize<'de> for Action {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let obj = value.as_object().ok_or_else(|| D::Error::custom("action must be a JSON object"))?;
        let kind = str_field(obj, "type").unwrap_or("").to_string();
        let description = str_field(obj, "description").unwrap_or_default().to_string();

        match kind.as_str() {
            "shell_command" => {
                let command = str_field(obj, "command").unwrap_or_default().to_string();
                Ok(Action::ShellCommand { description, command })
            }
            "python_code" => {
                let code = str_field(obj, "code").unwrap_or_default().to_string();
                Ok(Action::PythonCode { description, code })
            }
            "file_operation" => {
                let operation = match str_field(obj, "operation") {
                    Some("append") => FileOperationKind::Append,
                    Some("create_directory") => FileOperationKind::CreateDirectory,
                    _ => FileOperationKind::Write,
                };
                let filename = str_field(obj, "filename").unwrap_or_default().to_string();
                let content = str_field(obj, "content").map(str::to_string);
                Ok(Action::FileOperation { description, operation, filename, content })
            }
            "web_scraping" => Ok(Action::WebScraping { description, detail: value }),
            "gui_automation" => Ok(Action::GuiAutomation { description, detail: value }),
            other => Ok(Action::Other { kind: other.to_string(), description, detail: value }),
        }
    }
}

impl Serialize for Action {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", self.kind())?;
        map.serialize_entry("description", self.description())?;
        match self {
            Action::ShellCommand { command, .. } => {
                map.serialize_entry("command", command)?;
            }
            Action::PythonCode { code, .. } => {
                map.serialize_entry("code", code)?;
            }
            Action::FileOperation { operation, filename, content, .. } => {
                map.serialize_entry("operation", operation)?;
                map.serialize_entry("filename", filename)?;
                if let Some(content) = content {
                    map.serialize_entry("content", content)?;
                }
            }
            Action::WebScraping { detail, .. } | Action::GuiAutomation { detail, .. } | Action::Other { detail, .. } => {
                if let Some(extra) = detail.as_object() {
                    for (k, v) in extra {
                        if k != "type" && k != "description" {
                            map.serialize_entry(k, v)?;
                        }
                    }
                }
            }
        }
        map.end()
    }
}

/// An analyzed plan: the ordered actions to take plus the analyzer's own
/// estimate of effort and prerequisites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionPlan {
    pub actions: Vec<Action>,
    pub estimated_time: String,
    #[serde(default)]
    pub requirements: Vec<String>,
}

impl ActionPlan {
    /// The plan returned when the analyzer's response can't be parsed:
    /// one harmless shell command, so a job always does *something*
    /// rather than failing outright on a bad analyzer response.
    pub fn fallback() -> Self {
        Self {
            actions: vec![Action::ShellCommand {
                description: "Basic task".to_string(),
                command: "echo 'Task completed'".to_string(),
            }],
            estimated_time: "1 minute".to_string(),
            requirements: Vec::new(),
        }
    }

    /// The plan used when the analyzer call itself fails outright (not
    /// just an unparsable response): no actions at all.
    pub fn empty_with_unknown_estimate() -> Self {
        Self { actions: Vec::new(), estimated_time: "unknown".to_string(), requirements: Vec::new() }
    }
}

/// The outcome of executing a single action.
///
/// `command`/`filename`/`operation` echo the action's own fields back
/// (spec §3: "action-specific echo fields"), matching the flat result
/// dicts `ShellCommandNode`/`FileOperationNode`/`PythonCodeNode` each
/// return in `examples/original_source/src/agent/nodes.py`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    pub kind: String,
    pub description: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
}

impl ActionResult {
    pub fn ok(kind: impl Into<String>, description: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            description: description.into(),
            success: true,
            output: Some(output.into()),
            error: None,
            exit_code: None,
            command: None,
            filename: None,
            operation: None,
        }
    }

    pub fn failed(kind: impl Into<String>, description: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            description: description.into(),
            success: false,
            output: None,
            error: Some(error.into()),
            exit_code: None,
            command: None,
            filename: None,
            operation: None,
        }
    }

    crate::setters! {
        option {
            command: String,
            filename: String,
            operation: String,
        }
        set {
            exit_code: Option<i32>,
        }
    }
}

/// Overall completion status of a job's executed plan.
///
/// `Failed` is reserved for the worker-fatal case (spec §4.6.5): an
/// unhandled exception during workspace setup or manifest compilation,
/// distinct from `Partial`, which just means some actions (typically
/// `web_scraping`/`gui_automation`) were left unexecuted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManifestStatus {
    Completed,
    Partial,
    Failed,
}

/// A file found under the workspace directory after a pipeline run, for
/// the manifest's `created_files` snapshot. Non-UTF-8 files are recorded
/// with size only, per spec §4.6.4.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedFile {
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CreatedFile {
    pub fn with_content(filename: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        Self { filename: filename.into(), size: content.len() as u64, content: Some(content), error: None }
    }

    pub fn unreadable(filename: impl Into<String>, size: u64, error: impl Into<String>) -> Self {
        Self { filename: filename.into(), content: None, size, error: Some(error.into()) }
    }
}

/// The final summary written to `result.json` in the job's output
/// directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultManifest {
    pub task: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<ActionPlan>,
    pub executed_actions: usize,
    pub remaining_actions: usize,
    pub status: ManifestStatus,
    pub shell_results: Vec<ActionResult>,
    pub python_results: Vec<ActionResult>,
    pub file_results: Vec<ActionResult>,
    pub remaining: Vec<Action>,
    pub created_files: Vec<CreatedFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResultManifest {
    /// Minimal constructor used directly by tests that only care about
    /// the executed/remaining/status accounting.
    pub fn compile(
        task: impl Into<String>,
        shell_results: Vec<ActionResult>,
        python_results: Vec<ActionResult>,
        file_results: Vec<ActionResult>,
        remaining: Vec<Action>,
    ) -> Self {
        let executed_actions = shell_results.len() + python_results.len() + file_results.len();
        let remaining_actions = remaining.len();
        let status = if remaining.is_empty() { ManifestStatus::Completed } else { ManifestStatus::Partial };
        Self {
            task: task.into(),
            job_id: None,
            analysis: None,
            executed_actions,
            remaining_actions,
            status,
            shell_results,
            python_results,
            file_results,
            remaining,
            created_files: Vec::new(),
            workspace_dir: None,
            output_dir: None,
            error: None,
        }
    }

    /// The full constructor used by the worker runtime (`oj-cli`), with
    /// every field spec §3/§6 names.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        job_id: impl Into<String>,
        task: impl Into<String>,
        analysis: ActionPlan,
        shell_results: Vec<ActionResult>,
        python_results: Vec<ActionResult>,
        file_results: Vec<ActionResult>,
        remaining: Vec<Action>,
        created_files: Vec<CreatedFile>,
        workspace_dir: impl Into<String>,
        output_dir: impl Into<String>,
    ) -> Self {
        let executed_actions = shell_results.len() + python_results.len() + file_results.len();
        let remaining_actions = remaining.len();
        let status = if remaining.is_empty() { ManifestStatus::Completed } else { ManifestStatus::Partial };
        Self {
            task: task.into(),
            job_id: Some(job_id.into()),
            analysis: Some(analysis),
            executed_actions,
            remaining_actions,
            status,
            shell_results,
            python_results,
            file_results,
            remaining,
            created_files,
            workspace_dir: Some(workspace_dir.into()),
            output_dir: Some(output_dir.into()),
            error: None,
        }
    }

    /// The manifest written when an unhandled exception hits workspace
    /// setup or compilation itself (`WorkerFatalError`, spec §7) — no
    /// results to report, just the fault.
    pub fn failed(job_id: impl Into<String>, task: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            job_id: Some(job_id.into()),
            analysis: None,
            executed_actions: 0,
            remaining_actions: 0,
            status: ManifestStatus::Failed,
            shell_results: Vec::new(),
            python_results: Vec::new(),
            file_results: Vec::new(),
            remaining: Vec::new(),
            created_files: Vec::new(),
            workspace_dir: None,
            output_dir: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
#[path = "plan_tests.rs"]
mod tests;
