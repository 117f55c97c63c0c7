// SPDX-FileCopyrightText: 2026 Cortex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model selection with an escalation chain for retries.
//!
//! Orchestrates model choice: trivial shortcut > capability rules > complexity
//! default. Selection is a pure function of the profile and the catalog.

use cortex_catalog::{TaskKind, default_model_for, estimate_cost, spec};
use cortex_core::{Complexity, ModelId, ModelSelection, ModelTier, TaskProfile};
use tracing::{debug, info};

/// The model every escalation path ends at.
pub const TOP_OF_CHAIN: ModelId = ModelId::ClaudeSonnet4;

/// Picks a primary and fallback model for a profile.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelSelector;

impl ModelSelector {
    pub fn new() -> Self {
        Self
    }

    /// Select a model for `profile`. First matching rule wins.
    pub fn select(&self, profile: &TaskProfile) -> ModelSelection {
        if profile.complexity == Complexity::Trivial {
            return ModelSelection {
                model: ModelId::Local,
                reasoning: "Trivial task - no model call needed".to_string(),
                estimated_cost: 0.0,
                fallback: None,
            };
        }

        let caps = &profile.capabilities;
        let (model, fallback, reasoning) = if caps.structured_output {
            (
                default_model_for(TaskKind::StructuredOutput),
                ModelId::ClaudeHaiku35,
                "Structured output required - GPT-4o-mini has reliable JSON mode",
            )
        } else if caps.code {
            (
                default_model_for(TaskKind::CodeGeneration),
                ModelId::Gpt4o,
                "Code generation required - Sonnet has the strongest code quality",
            )
        } else if caps.reasoning && profile.complexity == Complexity::Complex {
            (
                default_model_for(TaskKind::DeepAnalysis),
                ModelId::Gpt4o,
                "Complex reasoning required - Sonnet has the strongest analysis",
            )
        } else if caps.long_context {
            (
                default_model_for(TaskKind::LongContext),
                ModelId::Gpt4o,
                "Long context required - Sonnet has a 200k context window",
            )
        } else if caps.creativity {
            (
                ModelId::ClaudeSonnet4,
                ModelId::Gpt4o,
                "Creative task - Sonnet produces better creative output",
            )
        } else if profile.complexity == Complexity::Simple {
            (
                default_model_for(TaskKind::QuickLookup),
                ModelId::Gpt4oMini,
                "Simple task - Haiku is fast and cost-efficient",
            )
        } else {
            (
                ModelId::ClaudeHaiku35,
                ModelId::ClaudeSonnet4,
                "Moderate task - starting with Haiku, can upgrade if needed",
            )
        };

        let estimated_cost = profile_cost(model, profile);
        debug!(
            task_id = %profile.task_id,
            model = %model,
            fallback = %fallback,
            estimated_cost,
            "model selected"
        );

        ModelSelection {
            model,
            reasoning: reasoning.to_string(),
            estimated_cost,
            fallback: Some(fallback),
        }
    }

    /// Selection for a caller-forced model.
    ///
    /// The cost is estimated from the profile like any other selection and
    /// the fallback is the model's escalation successor.
    pub fn select_forced(&self, model: ModelId, profile: &TaskProfile) -> ModelSelection {
        ModelSelection {
            model,
            reasoning: format!("Model forced by caller: {model}"),
            estimated_cost: profile_cost(model, profile),
            fallback: next_fallback(model),
        }
    }

    /// Escalate after a failed attempt.
    ///
    /// A fallback is promoted to primary and its chain successor becomes the
    /// new fallback. Without a fallback the selection jumps to the top of the
    /// chain with no further fallback.
    pub fn upgrade(&self, current: &ModelSelection, profile: &TaskProfile) -> ModelSelection {
        match current.fallback {
            Some(next) => {
                info!(
                    task_id = %profile.task_id,
                    from = %current.model,
                    to = %next,
                    "upgrading model"
                );
                ModelSelection {
                    model: next,
                    reasoning: format!("Upgraded from {} after failure", current.model),
                    estimated_cost: profile_cost(next, profile),
                    fallback: next_fallback(next),
                }
            }
            None => ModelSelection {
                model: TOP_OF_CHAIN,
                reasoning: "Upgraded to premium model after fallback exhausted".to_string(),
                estimated_cost: profile_cost(TOP_OF_CHAIN, profile),
                fallback: None,
            },
        }
    }
}

fn profile_cost(model: ModelId, profile: &TaskProfile) -> f64 {
    estimate_cost(
        model,
        profile.estimated_input_tokens,
        profile.estimated_output_tokens,
    )
}

/// Successor of `model` in the escalation chain. `None` at the top.
pub fn next_fallback(model: ModelId) -> Option<ModelId> {
    match model {
        ModelId::Local => Some(ModelId::ClaudeHaiku35),
        ModelId::ClaudeHaiku35 => Some(ModelId::ClaudeSonnet4),
        ModelId::Gpt4oMini => Some(ModelId::Gpt4o),
        ModelId::Gpt4o => Some(ModelId::ClaudeSonnet4),
        ModelId::Gemini20Flash => Some(ModelId::Gemini20Pro),
        ModelId::Gemini20Pro => Some(ModelId::ClaudeSonnet4),
        ModelId::ClaudeSonnet4 | ModelId::ClaudeOpus4 => None,
    }
}

/// Whether the selection's estimate is strictly above `threshold`.
pub fn exceeds_cost_threshold(selection: &ModelSelection, threshold: f64) -> bool {
    selection.estimated_cost > threshold
}

/// Display label for a model's tier.
pub fn tier_label(model: ModelId) -> &'static str {
    match spec(model).tier {
        ModelTier::Premium => "Premium",
        ModelTier::Efficient => "Efficient",
        ModelTier::Free => "Local",
    }
}

/// One-line summary, e.g. `gpt-4o (Premium) - ~$0.0123`.
pub fn format_selection(selection: &ModelSelection) -> String {
    let cost = if selection.estimated_cost > 0.0 {
        format!("~${:.4}", selection.estimated_cost)
    } else {
        "free".to_string()
    };
    format!("{} ({}) - {cost}", selection.model, tier_label(selection.model))
}
