// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ExecutionContext`: the shared state threaded by reference through
//! the three sub-executors, per spec §9's "shared-state dictionary...
//! maps naturally to a context struct passed by reference" design note.
//! Each sub-executor drains its own action kind out of `actions` and
//! appends to its own result bucket; nothing here is a trait object or
//! global — just a plain struct.

use std::path::PathBuf;

use oj_core::plan::{Action, ActionPlan, ActionResult};

pub struct ExecutionContext {
    pub workspace: PathBuf,
    pub actions: Vec<Action>,
    pub file_results: Vec<ActionResult>,
    pub shell_results: Vec<ActionResult>,
    pub python_results: Vec<ActionResult>,
}

impl ExecutionContext {
    pub fn new(workspace: PathBuf, plan: ActionPlan) -> Self {
        Self {
            workspace,
            actions: plan.actions,
            file_results: Vec::new(),
            shell_results: Vec::new(),
            python_results: Vec::new(),
        }
    }

    /// Remove every action matching `pred` from `self.actions`, in
    /// order, and return them for a sub-executor to run. Actions that
    /// don't match stay in place for the next stage (or end up in
    /// `remaining` if no stage claims them).
    pub fn take_matching<F>(&mut self, mut pred: F) -> Vec<Action>
    where
        F: FnMut(&Action) -> bool,
    {
        let mut taken = Vec::new();
        let mut kept = Vec::with_capacity(self.actions.len());
        for action in self.actions.drain(..) {
            if pred(&action) {
                taken.push(action);
            } else {
                kept.push(action);
            }
        }
        self.actions = kept;
        taken
    }

    /// Whatever no sub-executor claimed — `web_scraping`, `gui_automation`,
    /// or any action type the executor has never heard of.
    pub fn into_remaining(self) -> Vec<Action> {
        self.actions
    }
}
