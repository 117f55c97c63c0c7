// SPDX-FileCopyrightText: 2026 Cortex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `cortex explain`: a dry run of the pipeline up to dispatch.
//!
//! Applies the same gates the supervisor applies, in the same order, but
//! never calls a model.

use cortex_config::{CortexConfig, Credentials};
use cortex_core::{Capabilities, RiskTier};
use cortex_router::{
    ModelSelector, ProviderRouter, TaskProfiler, exceeds_cost_threshold, format_route,
    format_selection, quick_response,
};
use cortex_supervisor::{SupervisorSettings, review_reason};

pub fn explain_for_config(config: &CortexConfig, input: &str) -> String {
    let credentials = Credentials::from_config(config);
    let router = ProviderRouter::from_config(config, &credentials);
    explain(input, &router, &SupervisorSettings::from_config(config))
}

pub fn explain(input: &str, router: &ProviderRouter, settings: &SupervisorSettings) -> String {
    let profile = TaskProfiler::new().profile(input);
    let selection = ModelSelector::new().select(&profile);
    let route = router.route(selection.model);
    let alternate = router.fallback_route(&route, selection.model);

    let quick = if profile.can_skip_llm() {
        quick_response(input)
    } else {
        None
    };
    let decision = if let Some(reply) = quick {
        format!("answer locally with \"{reply}\"")
    } else if profile.risk_tier() == RiskTier::Review {
        format!("escalate: {}", review_reason(&profile))
    } else if exceeds_cost_threshold(&selection, settings.cost_checkpoint_threshold) {
        format!(
            "escalate: Estimated cost ${:.4} exceeds threshold ${:.2}",
            selection.estimated_cost, settings.cost_checkpoint_threshold
        )
    } else if !route.is_available() && alternate.is_none() {
        format!("dispatch, but no credentials are available for {}", selection.model)
    } else {
        "dispatch".to_string()
    };

    let mut lines = vec![
        format!("Task:         {}", profile.task_id),
        format!(
            "Complexity:   {} (~{} in / ~{} out tokens)",
            profile.complexity, profile.estimated_input_tokens, profile.estimated_output_tokens
        ),
        format!("Capabilities: {}", capability_list(&profile.capabilities)),
        format!("Risk tier:    {}", profile.risk_tier()),
        format!("Model:        {}", format_selection(&selection)),
        format!("Reasoning:    {}", selection.reasoning),
        format!(
            "Fallback:     {}",
            selection
                .fallback
                .map_or_else(|| "none".to_string(), |m| m.to_string())
        ),
        format!("Route:        {}", format_route(&route)),
        format!(
            "Alternate:    {}",
            alternate
                .as_ref()
                .map_or_else(|| "none".to_string(), format_route)
        ),
        format!(
            "JSON mode:    {}",
            if profile.capabilities.structured_output { "yes" } else { "no" }
        ),
    ];
    if !profile.tool_hints.is_empty() {
        let hints: Vec<String> = profile.tool_hints.iter().map(ToString::to_string).collect();
        lines.push(format!("Tool hints:   {}", hints.join(", ")));
    }
    lines.push(format!("Decision:     {decision}"));
    lines.join("\n")
}

fn capability_list(caps: &Capabilities) -> String {
    let names: Vec<&str> = [
        (caps.reasoning, "reasoning"),
        (caps.code, "code"),
        (caps.structured_output, "structured output"),
        (caps.creativity, "creativity"),
        (caps.long_context, "long context"),
    ]
    .into_iter()
    .filter_map(|(set, name)| set.then_some(name))
    .collect();
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    }
}
