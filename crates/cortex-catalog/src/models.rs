// SPDX-FileCopyrightText: 2026 Cortex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The static model table.
//!
//! Rates verified against vendor pricing pages on 2025-02-01:
//!
//! Claude Opus 4:      input=$15.00/MTok, output=$75.00/MTok
//! Claude Sonnet 4:    input=$3.00/MTok,  output=$15.00/MTok
//! Claude Haiku 3.5:   input=$0.80/MTok,  output=$4.00/MTok
//! GPT-4o:             input=$2.50/MTok,  output=$10.00/MTok
//! GPT-4o mini:        input=$0.15/MTok,  output=$0.60/MTok
//! Gemini 2.0 Flash:   input=$0.10/MTok,  output=$0.40/MTok
//! Gemini 2.0 Pro:     input=$1.25/MTok,  output=$5.00/MTok

use cortex_core::{ModelId, ModelTier, Provider, Strength};
use serde::Serialize;
use strum::{Display, EnumString};

/// Immutable facts about one model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelSpec {
    pub id: ModelId,
    /// Vendor that natively serves the model.
    pub provider: Provider,
    pub tier: ModelTier,
    /// Context window in tokens. `None` means unbounded.
    pub context_window: Option<u32>,
    /// USD per million input tokens.
    pub input_per_mtok: f64,
    /// USD per million output tokens.
    pub output_per_mtok: f64,
    /// Output token cap. `None` means no cap applies.
    pub max_output_tokens: Option<u32>,
    /// Identifier the aggregator uses for this model.
    pub aggregator_id: Option<&'static str>,
    pub strengths: &'static [Strength],
}

const CLAUDE_FRONTIER: &[Strength] = &[
    Strength::Reasoning,
    Strength::Code,
    Strength::Analysis,
    Strength::LongContext,
    Strength::Creative,
];

const CATALOG: [ModelSpec; 8] = [
    ModelSpec {
        id: ModelId::ClaudeOpus4,
        provider: Provider::Anthropic,
        tier: ModelTier::Premium,
        context_window: Some(200_000),
        input_per_mtok: 15.0,
        output_per_mtok: 75.0,
        max_output_tokens: Some(32_000),
        aggregator_id: Some("anthropic/claude-opus-4-20250514"),
        strengths: CLAUDE_FRONTIER,
    },
    ModelSpec {
        id: ModelId::ClaudeSonnet4,
        provider: Provider::Anthropic,
        tier: ModelTier::Premium,
        context_window: Some(200_000),
        input_per_mtok: 3.0,
        output_per_mtok: 15.0,
        max_output_tokens: Some(8192),
        aggregator_id: Some("anthropic/claude-sonnet-4-20250514"),
        strengths: CLAUDE_FRONTIER,
    },
    ModelSpec {
        id: ModelId::ClaudeHaiku35,
        provider: Provider::Anthropic,
        tier: ModelTier::Efficient,
        context_window: Some(200_000),
        input_per_mtok: 0.8,
        output_per_mtok: 4.0,
        max_output_tokens: Some(8192),
        aggregator_id: Some("anthropic/claude-3-5-haiku-20241022"),
        strengths: &[
            Strength::Speed,
            Strength::SimpleTasks,
            Strength::CostEfficient,
            Strength::Summarization,
        ],
    },
    ModelSpec {
        id: ModelId::Gpt4o,
        provider: Provider::OpenAi,
        tier: ModelTier::Premium,
        context_window: Some(128_000),
        input_per_mtok: 2.5,
        output_per_mtok: 10.0,
        max_output_tokens: Some(16_384),
        aggregator_id: Some("openai/gpt-4o"),
        strengths: &[
            Strength::StructuredOutput,
            Strength::JsonMode,
            Strength::FunctionCalling,
        ],
    },
    ModelSpec {
        id: ModelId::Gpt4oMini,
        provider: Provider::OpenAi,
        tier: ModelTier::Efficient,
        context_window: Some(128_000),
        input_per_mtok: 0.15,
        output_per_mtok: 0.6,
        max_output_tokens: Some(16_384),
        aggregator_id: Some("openai/gpt-4o-mini"),
        strengths: &[
            Strength::StructuredOutput,
            Strength::JsonMode,
            Strength::Speed,
            Strength::CostEfficient,
        ],
    },
    ModelSpec {
        id: ModelId::Gemini20Flash,
        provider: Provider::OpenRouter,
        tier: ModelTier::Efficient,
        context_window: Some(1_000_000),
        input_per_mtok: 0.1,
        output_per_mtok: 0.4,
        max_output_tokens: Some(8192),
        aggregator_id: Some("google/gemini-2.0-flash-001"),
        strengths: &[
            Strength::Speed,
            Strength::LongContext,
            Strength::CostEfficient,
            Strength::SimpleTasks,
        ],
    },
    ModelSpec {
        id: ModelId::Gemini20Pro,
        provider: Provider::OpenRouter,
        tier: ModelTier::Premium,
        context_window: Some(2_000_000),
        input_per_mtok: 1.25,
        output_per_mtok: 5.0,
        max_output_tokens: Some(8192),
        aggregator_id: Some("google/gemini-2.0-pro-exp-02-05"),
        strengths: &[
            Strength::Reasoning,
            Strength::LongContext,
            Strength::Analysis,
            Strength::Code,
        ],
    },
    ModelSpec {
        id: ModelId::Local,
        provider: Provider::Local,
        tier: ModelTier::Free,
        context_window: None,
        input_per_mtok: 0.0,
        output_per_mtok: 0.0,
        max_output_tokens: None,
        aggregator_id: None,
        strengths: &[
            Strength::Transforms,
            Strength::Parsing,
            Strength::FileProcessing,
        ],
    },
];

/// The full catalog, in declaration order.
pub fn all_models() -> &'static [ModelSpec] {
    &CATALOG
}

/// Catalog entry for `model`.
///
/// Every [`ModelId`] has exactly one entry, so this never fails.
pub fn spec(model: ModelId) -> &'static ModelSpec {
    match model {
        ModelId::ClaudeOpus4 => &CATALOG[0],
        ModelId::ClaudeSonnet4 => &CATALOG[1],
        ModelId::ClaudeHaiku35 => &CATALOG[2],
        ModelId::Gpt4o => &CATALOG[3],
        ModelId::Gpt4oMini => &CATALOG[4],
        ModelId::Gemini20Flash => &CATALOG[5],
        ModelId::Gemini20Pro => &CATALOG[6],
        ModelId::Local => &CATALOG[7],
    }
}

/// Broad task categories with a recommended default model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum TaskKind {
    QuickLookup,
    DeepAnalysis,
    CodeGeneration,
    StructuredOutput,
    LongContext,
    SimpleTransform,
}

/// Recommended model for a broad task category.
pub fn default_model_for(kind: TaskKind) -> ModelId {
    match kind {
        TaskKind::QuickLookup => ModelId::ClaudeHaiku35,
        TaskKind::DeepAnalysis | TaskKind::CodeGeneration | TaskKind::LongContext => {
            ModelId::ClaudeSonnet4
        }
        TaskKind::StructuredOutput => ModelId::Gpt4oMini,
        TaskKind::SimpleTransform => ModelId::Local,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn every_model_id_maps_to_its_own_entry() {
        for id in ModelId::iter() {
            assert_eq!(spec(id).id, id);
        }
    }

    #[test]
    fn catalog_has_one_entry_per_model() {
        assert_eq!(all_models().len(), ModelId::iter().count());
    }

    #[test]
    fn sonnet_rates() {
        let s = spec(ModelId::ClaudeSonnet4);
        assert!((s.input_per_mtok - 3.0).abs() < f64::EPSILON);
        assert!((s.output_per_mtok - 15.0).abs() < f64::EPSILON);
        assert_eq!(s.max_output_tokens, Some(8192));
    }

    #[test]
    fn gemini_is_served_by_the_aggregator() {
        assert_eq!(spec(ModelId::Gemini20Flash).provider, Provider::OpenRouter);
        assert_eq!(
            spec(ModelId::Gemini20Pro).aggregator_id,
            Some("google/gemini-2.0-pro-exp-02-05")
        );
    }

    #[test]
    fn local_is_free_and_unbounded() {
        let s = spec(ModelId::Local);
        assert_eq!(s.tier, ModelTier::Free);
        assert_eq!(s.context_window, None);
        assert_eq!(s.aggregator_id, None);
    }

    #[test]
    fn task_kind_defaults() {
        assert_eq!(default_model_for(TaskKind::QuickLookup), ModelId::ClaudeHaiku35);
        assert_eq!(default_model_for(TaskKind::DeepAnalysis), ModelId::ClaudeSonnet4);
        assert_eq!(default_model_for(TaskKind::CodeGeneration), ModelId::ClaudeSonnet4);
        assert_eq!(default_model_for(TaskKind::LongContext), ModelId::ClaudeSonnet4);
        assert_eq!(default_model_for(TaskKind::StructuredOutput), ModelId::Gpt4oMini);
        assert_eq!(default_model_for(TaskKind::SimpleTransform), ModelId::Local);
    }

    #[test]
    fn task_kind_parses_from_snake_case() {
        assert_eq!(
            "structured_output".parse::<TaskKind>().unwrap(),
            TaskKind::StructuredOutput
        );
    }
}
