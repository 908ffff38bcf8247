// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A `PlanSource` test double that returns a pre-configured plan instead
//! of calling a real model backend, for worker-runtime and engine tests
//! that need a deterministic plan without a network dependency.

use async_trait::async_trait;
use oj_core::plan::ActionPlan;
use parking_lot::Mutex;

use crate::source::PlanSource;

pub struct StaticPlanSource {
    plan: Mutex<ActionPlan>,
    prompts_seen: Mutex<Vec<String>>,
}

impl StaticPlanSource {
    pub fn new(plan: ActionPlan) -> Self {
        Self { plan: Mutex::new(plan), prompts_seen: Mutex::new(Vec::new()) }
    }

    pub fn fallback() -> Self {
        Self::new(ActionPlan::fallback())
    }

    pub fn set_plan(&self, plan: ActionPlan) {
        *self.plan.lock() = plan;
    }

    pub fn prompts_seen(&self) -> Vec<String> {
        self.prompts_seen.lock().clone()
    }
}

#[async_trait]
impl PlanSource for StaticPlanSource {
    async fn analyze(&self, prompt: &str) -> ActionPlan {
        self.prompts_seen.lock().push(prompt.to_string());
        self.plan.lock().clone()
    }
}
