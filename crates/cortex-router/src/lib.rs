// SPDX-FileCopyrightText: 2026 Cortex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Task profiling, model selection and provider routing for Cortex.
//!
//! This crate provides:
//! - [`TaskProfiler`]: heuristic complexity, capability and risk detection
//! - [`ModelSelector`]: rule-based model choice with an escalation chain
//! - [`ProviderRouter`]: direct-first routing with aggregator fallback
//!
//! Everything here is pure given configuration. No network calls are made.

pub mod profiler;
pub mod routing;
pub mod selector;

pub use profiler::{TaskProfiler, estimate_tokens, quick_response, upgrade_complexity};
pub use routing::{
    Availability, ProviderRouter, RoutingHealth, format_route, provider_display_name,
};
pub use selector::{
    ModelSelector, TOP_OF_CHAIN, exceeds_cost_threshold, format_selection, next_fallback,
    tier_label,
};
