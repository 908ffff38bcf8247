// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `PlanSource` trait: the injected `Analyze(prompt) -> ActionPlan`
//! dependency spec §1 treats as an opaque collaborator. Every
//! implementation is expected to be infallible from the caller's point of
//! view — transport errors and unparsable responses both resolve to
//! [`ActionPlan::fallback`] rather than propagating, so a job always has
//! *something* to execute (spec §4.5, invariant 8).

use async_trait::async_trait;
use oj_core::plan::ActionPlan;

#[async_trait]
pub trait PlanSource: Send + Sync {
    async fn analyze(&self, prompt: &str) -> ActionPlan;
}

/// Parse a model's raw text response as an [`ActionPlan`], falling back
/// to the single-echo-action plan on any parse failure. Split out as a
/// pure function so the fallback behavior (invariant 8) can be tested
/// without a network dependency.
pub fn parse_or_fallback(raw: &str) -> ActionPlan {
    match serde_json::from_str::<ActionPlan>(raw) {
        Ok(plan) => plan,
        Err(err) => {
            tracing::warn!(error = %err, raw_len = raw.len(), "analyzer response did not parse as an action plan, falling back");
            ActionPlan::fallback()
        }
    }
}

/// The system instruction sent alongside every prompt, embedding the
/// target-OS assumption and action-type vocabulary verbatim from
/// `examples/original_source/src/agent/nodes.py::TaskAnalysisNode.exec`,
/// since spec §4.5 requires exactly this framing.
pub fn system_instruction() -> &'static str {
    r#"Assume the environment is Ubuntu Linux. All shell commands should be written for bash on Ubuntu.
Analyze the following task and return a JSON list of actions needed to accomplish it.
If the task involves writing, modifying, or executing code, always include a 'python_code' action with the code to be executed, and a 'file_operation' action if a file should be created or modified.

For file operations, use these operation types:
- "write": Create or overwrite a file with content
- "append": Add content to an existing file
- "create_directory": Create a directory structure

Use this JSON structure:
{
    "actions": [
        {
            "type": "shell_command" | "python_code" | "file_operation" | "web_scraping" | "gui_automation",
            "description": "what this action does",
            "command": "the actual command, code, or file content to execute",
            "filename": "(required for file_operation) the filename to write to",
            "operation": "(optional for file_operation) write|append|create_directory, defaults to write"
        }
    ],
    "estimated_time": "time estimate",
    "requirements": ["list", "of", "requirements"]
}

Respond with only the JSON object, no markdown fences and no surrounding text."#
}

#[cfg(test)]
mod tests {
    use super::*;
    use oj_core::plan::Action;

    #[test]
    fn valid_json_parses_into_the_plan() {
        let raw = r#"{"actions":[{"type":"shell_command","description":"list","command":"ls -la"}],"estimated_time":"2 minutes","requirements":["bash"]}"#;
        let plan = parse_or_fallback(raw);
        assert_eq!(plan.actions.len(), 1);
        assert_eq!(plan.estimated_time, "2 minutes");
        assert_eq!(plan.requirements, vec!["bash".to_string()]);
        match &plan.actions[0] {
            Action::ShellCommand { command, .. } => assert_eq!(command, "ls -la"),
            other => panic!("expected ShellCommand, got {other:?}"),
        }
    }

    #[test]
    fn invalid_json_falls_back_to_the_echo_plan() {
        let plan = parse_or_fallback("not json at all");
        assert_eq!(plan, ActionPlan::fallback());
    }

    #[test]
    fn markdown_fenced_response_is_not_unwrapped_and_falls_back() {
        // The original only ever calls json.loads() directly with no
        // fence-stripping; a fenced response is therefore invalid JSON
        // and falls back, matching that behavior exactly.
        let fenced = "```json\n{\"actions\":[]}\n```";
        let plan = parse_or_fallback(fenced);
        assert_eq!(plan, ActionPlan::fallback());
    }

    #[test]
    fn system_instruction_embeds_ubuntu_bash_framing() {
        let instruction = system_instruction();
        assert!(instruction.contains("Ubuntu Linux"));
        assert!(instruction.contains("web_scraping"));
        assert!(instruction.contains("gui_automation"));
    }
}
