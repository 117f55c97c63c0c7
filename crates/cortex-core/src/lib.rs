// SPDX-FileCopyrightText: 2026 Cortex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Cortex model router.
//!
//! This crate provides the error type, the shared domain types that flow
//! through the profile, select, route, execute and validate stages, and the
//! async traits at the seams between them.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::CortexError;
pub use types::{
    Capabilities, Completion, Complexity, ContextDomain, Endpoint, ModelId, ModelSelection,
    ModelTier, Provider, ProviderRoute, RiskFlags, RiskTier, Strength, TaskProfile, TokenUsage,
    ToolCall, ToolHint, ToolSpec, ValidationResult, ValidationStage, WorkerRequest,
    WorkerResult,
};

pub use traits::{Execute, ProviderAdapter};

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    fn sample_profile(complexity: Complexity) -> TaskProfile {
        TaskProfile {
            task_id: "task_1_abcdef".into(),
            input: "hello".into(),
            complexity,
            estimated_input_tokens: 502,
            estimated_output_tokens: 50,
            capabilities: Capabilities::default(),
            risk: RiskFlags::default(),
            latency_sensitive: true,
            cost_sensitive: true,
            tool_hints: vec![],
            required_context: vec![],
        }
    }

    fn sample_request() -> WorkerRequest {
        WorkerRequest {
            profile: sample_profile(Complexity::Simple),
            selection: ModelSelection {
                model: ModelId::ClaudeHaiku35,
                reasoning: "test".into(),
                estimated_cost: 0.001,
                fallback: None,
            },
            route: ProviderRoute {
                endpoint: Endpoint::Direct,
                provider: Provider::Anthropic,
                model: ModelId::ClaudeHaiku35,
                provider_model: "claude-3-5-haiku-20241022".into(),
                credential: Some(Provider::Anthropic),
                base_url: None,
            },
            system_prompt: String::new(),
            user_message: "hello".into(),
            tools: vec![],
            json_mode: false,
        }
    }

    #[test]
    fn cortex_error_has_all_variants() {
        let _config = CortexError::Config("test".into());
        let _storage = CortexError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _provider = CortexError::provider("test");
        let _timeout = CortexError::Timeout {
            duration: std::time::Duration::from_secs(30),
        };
        let _unknown = CortexError::UnknownModel("gpt-9".into());
        let _internal = CortexError::Internal("test".into());
    }

    #[test]
    fn model_ids_round_trip_through_strings() {
        for model in ModelId::iter() {
            let s = model.to_string();
            assert_eq!(s, model.as_str());
            assert_eq!(ModelId::from_str(&s).expect("should parse back"), model);
            let json = serde_json::to_string(&model).unwrap();
            assert_eq!(json, format!("\"{s}\""));
        }
        assert!(ModelId::from_str("gpt-9").is_err());
    }

    #[test]
    fn provider_names_are_lowercase() {
        assert_eq!(Provider::OpenAi.to_string(), "openai");
        assert_eq!(Provider::OpenRouter.to_string(), "openrouter");
        assert_eq!(
            serde_json::to_string(&Provider::OpenRouter).unwrap(),
            "\"openrouter\""
        );
    }

    #[test]
    fn complexity_upgrade_is_capped() {
        assert_eq!(Complexity::Trivial.upgraded(), Complexity::Simple);
        assert_eq!(Complexity::Simple.upgraded(), Complexity::Moderate);
        assert_eq!(Complexity::Moderate.upgraded(), Complexity::Complex);
        assert_eq!(Complexity::Complex.upgraded(), Complexity::Complex);
        assert!(Complexity::Trivial < Complexity::Complex);
    }

    #[test]
    fn risk_flags_map_to_tiers() {
        let mut flags = RiskFlags::default();
        assert_eq!(flags.tier(), RiskTier::Auto);
        flags.external_mutation = true;
        assert_eq!(flags.tier(), RiskTier::Notify);
        flags.filesystem = true;
        assert_eq!(flags.tier(), RiskTier::Review);
        let auth_only = RiskFlags {
            auth: true,
            ..RiskFlags::default()
        };
        assert_eq!(auth_only.tier(), RiskTier::Review);
    }

    #[test]
    fn capabilities_count() {
        let caps = Capabilities {
            reasoning: true,
            code: true,
            long_context: true,
            ..Capabilities::default()
        };
        assert_eq!(caps.count(), 3);
        assert_eq!(Capabilities::default().count(), 0);
    }

    #[test]
    fn skip_llm_requires_trivial_without_tools() {
        let mut profile = sample_profile(Complexity::Trivial);
        assert!(profile.can_skip_llm());
        profile.tool_hints.push(ToolHint::GetStatus);
        assert!(!profile.can_skip_llm());
        assert!(!sample_profile(Complexity::Simple).can_skip_llm());
    }

    #[test]
    fn route_availability() {
        let mut route = sample_request().route;
        assert!(route.is_available());
        route.credential = None;
        assert!(!route.is_available());
        route.endpoint = Endpoint::Local;
        assert!(route.is_available());
    }

    #[test]
    fn failure_result_has_zeroed_usage() {
        let request = sample_request();
        let result = WorkerResult::failure(&request, "boom", 12);
        assert!(!result.success);
        assert_eq!(result.usage, TokenUsage::default());
        assert_eq!(result.error.as_deref(), Some("boom"));
        assert_eq!(result.task_id, "task_1_abcdef");
        assert_eq!(result.latency_ms, 12);
        assert!(!result.has_content());
    }

    #[test]
    fn usage_accumulates() {
        let mut total = TokenUsage::default();
        total.accumulate(&TokenUsage::new(10, 5, 0.01));
        total.accumulate(&TokenUsage::new(1, 2, 0.02));
        assert_eq!(total.input_tokens, 11);
        assert_eq!(total.output_tokens, 7);
        assert_eq!(total.total_tokens, 18);
        assert!((total.cost - 0.03).abs() < 1e-10);
    }

    #[test]
    fn all_traits_are_exported() {
        fn _assert_execute<T: Execute>() {}
        fn _assert_provider_adapter<T: ProviderAdapter>() {}
    }
}
