// SPDX-FileCopyrightText: 2026 Cortex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model catalog for the Cortex model router.
//!
//! Provides the static table of known models, cost estimation from
//! per-million-token rates, capability queries, and a startup integrity check.

pub mod models;
pub mod pricing;
pub mod verify;

pub use models::{all_models, default_model_for, spec, ModelSpec, TaskKind};
pub use pricing::{
    cheapest_with_strengths, estimate_cost, has_strength, models_by_provider, models_by_tier,
};
pub use verify::{verify_catalog, CatalogIssue};
