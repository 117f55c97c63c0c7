// SPDX-FileCopyrightText: 2026 Cortex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Startup integrity check for the catalog.

use cortex_core::{ModelTier, Provider};
use thiserror::Error;

use crate::models::{all_models, ModelSpec};

/// One problem found in a catalog entry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogIssue {
    #[error("{model}: network model has no aggregator id and is not served by the aggregator")]
    Unreachable { model: String },

    #[error("{model}: rate `{field}` is negative or not finite")]
    BadRate { model: String, field: &'static str },

    #[error("{model}: free tier model has non-zero rates")]
    PricedFreeTier { model: String },

    #[error("{model}: context window or output cap is zero")]
    ZeroLimit { model: String },
}

/// Check every catalog entry, collecting all problems.
pub fn verify_catalog() -> Result<(), Vec<CatalogIssue>> {
    let issues: Vec<CatalogIssue> = all_models().iter().flat_map(check_entry).collect();
    if issues.is_empty() { Ok(()) } else { Err(issues) }
}

fn check_entry(spec: &ModelSpec) -> Vec<CatalogIssue> {
    let model = spec.id.to_string();
    let mut issues = Vec::new();

    if spec.provider != Provider::Local
        && spec.provider != Provider::OpenRouter
        && spec.aggregator_id.is_none()
    {
        issues.push(CatalogIssue::Unreachable {
            model: model.clone(),
        });
    }

    for (field, rate) in [
        ("input_per_mtok", spec.input_per_mtok),
        ("output_per_mtok", spec.output_per_mtok),
    ] {
        if !rate.is_finite() || rate < 0.0 {
            issues.push(CatalogIssue::BadRate {
                model: model.clone(),
                field,
            });
        }
    }

    if spec.tier == ModelTier::Free && (spec.input_per_mtok != 0.0 || spec.output_per_mtok != 0.0)
    {
        issues.push(CatalogIssue::PricedFreeTier {
            model: model.clone(),
        });
    }

    if spec.context_window == Some(0) || spec.max_output_tokens == Some(0) {
        issues.push(CatalogIssue::ZeroLimit { model });
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use cortex_core::{ModelId, Strength};

    fn entry() -> ModelSpec {
        ModelSpec {
            id: ModelId::Gpt4o,
            provider: Provider::OpenAi,
            tier: ModelTier::Premium,
            context_window: Some(128_000),
            input_per_mtok: 2.5,
            output_per_mtok: 10.0,
            max_output_tokens: Some(16_384),
            aggregator_id: Some("openai/gpt-4o"),
            strengths: &[Strength::JsonMode],
        }
    }

    #[test]
    fn shipped_catalog_is_consistent() {
        assert_eq!(verify_catalog(), Ok(()));
    }

    #[test]
    fn missing_aggregator_id_is_flagged() {
        let spec = ModelSpec {
            aggregator_id: None,
            ..entry()
        };
        assert!(matches!(
            check_entry(&spec).as_slice(),
            [CatalogIssue::Unreachable { .. }]
        ));
    }

    #[test]
    fn nan_rate_is_flagged() {
        let spec = ModelSpec {
            output_per_mtok: f64::NAN,
            ..entry()
        };
        assert_eq!(
            check_entry(&spec),
            vec![CatalogIssue::BadRate {
                model: "gpt-4o".into(),
                field: "output_per_mtok"
            }]
        );
    }

    #[test]
    fn priced_free_tier_is_flagged() {
        let spec = ModelSpec {
            tier: ModelTier::Free,
            ..entry()
        };
        assert!(check_entry(&spec).contains(&CatalogIssue::PricedFreeTier {
            model: "gpt-4o".into()
        }));
    }
}
