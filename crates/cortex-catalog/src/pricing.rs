// SPDX-FileCopyrightText: 2026 Cortex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cost estimation and catalog queries.

use cortex_core::{ModelId, ModelTier, Provider, Strength};

use crate::models::{all_models, spec};

/// Estimated cost in USD for a call with the given token counts.
///
/// Formula: `input / 1M * input_rate + output / 1M * output_rate`.
pub fn estimate_cost(model: ModelId, input_tokens: u32, output_tokens: u32) -> f64 {
    let spec = spec(model);
    let input = (f64::from(input_tokens) / 1_000_000.0) * spec.input_per_mtok;
    let output = (f64::from(output_tokens) / 1_000_000.0) * spec.output_per_mtok;
    input + output
}

/// Whether the catalog lists `strength` for `model`.
pub fn has_strength(model: ModelId, strength: Strength) -> bool {
    spec(model).strengths.contains(&strength)
}

/// Models in one pricing tier, in catalog order.
pub fn models_by_tier(tier: ModelTier) -> Vec<ModelId> {
    all_models()
        .iter()
        .filter(|m| m.tier == tier)
        .map(|m| m.id)
        .collect()
}

/// Models natively served by `provider`, in catalog order.
pub fn models_by_provider(provider: Provider) -> Vec<ModelId> {
    all_models()
        .iter()
        .filter(|m| m.provider == provider)
        .map(|m| m.id)
        .collect()
}

/// Cheapest model carrying every one of `strengths`.
///
/// Ordered by the sum of input and output rates. Ties keep catalog order.
pub fn cheapest_with_strengths(strengths: &[Strength]) -> Option<ModelId> {
    all_models()
        .iter()
        .filter(|m| strengths.iter().all(|s| m.strengths.contains(s)))
        .min_by(|a, b| {
            (a.input_per_mtok + a.output_per_mtok).total_cmp(&(b.input_per_mtok + b.output_per_mtok))
        })
        .map(|m| m.id)
}
