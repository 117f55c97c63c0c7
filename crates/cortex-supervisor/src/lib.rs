// SPDX-FileCopyrightText: 2026 Cortex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Supervision layer for the Cortex model router.
//!
//! The [`Supervisor`] drives a request through profiling, the risk and cost
//! gates, execution, two-stage validation and a bounded retry loop, and
//! records every attempt in the session [`TokenLedger`](cortex_cost::TokenLedger).

pub mod batch;
pub mod prompt;
pub mod supervisor;
pub mod validation;

pub use prompt::{DEFAULT_PERSONA, build_system_prompt};
pub use supervisor::{
    Outcome, Supervisor, SupervisorRequest, SupervisorResponse, SupervisorSettings, review_reason,
};
pub use validation::{PASS_THRESHOLD, validate_output_quality, validate_spec_compliance};
