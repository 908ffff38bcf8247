// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! The action plan analyzer (C5): turns a prompt into an [`ActionPlan`]
//! by calling an injected `dyn PlanSource`, falling back to a single
//! harmless action whenever the backend's response can't be parsed or
//! the call itself fails — the executor must always make forward
//! progress (spec §4.5).

pub mod source;
pub mod http;
pub mod static_source;

pub use oj_core::plan::ActionPlan;
pub use source::{parse_or_fallback, PlanSource};
pub use http::HttpPlanSource;
pub use static_source::StaticPlanSource;
