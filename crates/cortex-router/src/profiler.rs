// SPDX-FileCopyrightText: 2026 Cortex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heuristic task profiling.
//!
//! Turns raw input into a [`TaskProfile`] using fixed keyword patterns. No
//! model pre-call, no network, no latency.

use std::sync::LazyLock;

use chrono::Utc;
use cortex_core::{
    Capabilities, Complexity, ContextDomain, RiskFlags, TaskProfile, ToolHint,
};
use regex::Regex;
use tracing::debug;

/// Tokens added to every input estimate for the system prompt.
const SYSTEM_PROMPT_OVERHEAD: u32 = 500;

/// Inputs below this many tokens may be classed as simple.
const SIMPLE_TOKEN_CEILING: u32 = 20;

/// Inputs above this many tokens are always complex.
const COMPLEX_TOKEN_FLOOR: u32 = 500;

fn pattern(source: &str) -> Regex {
    Regex::new(source).unwrap_or_else(|e| panic!("invalid built-in pattern {source}: {e}"))
}

static TOOL_TRIGGERS: LazyLock<Vec<(ToolHint, Regex)>> = LazyLock::new(|| {
    vec![
        (
            ToolHint::QueryInbox,
            pattern(r"(?i)\b(inbox|captures?|sparks?|what'?s\s+in)\b"),
        ),
        (
            ToolHint::QueryWorkQueue,
            pattern(r"(?i)\b(queue|tasks?|work|projects?|to-?do)\b"),
        ),
        (
            ToolHint::GetStatus,
            pattern(r"(?i)\b(status|overview|urgent|p0|priority|focus)\b"),
        ),
        (
            ToolHint::GetSystemState,
            pattern(r"(?i)\b(cortex|how'?s\s+it|state|health)\b"),
        ),
        (
            ToolHint::Search,
            pattern(r"(?i)\b(find|search|look\s+for|where\s+is)\b"),
        ),
        (
            ToolHint::CreateItem,
            pattern(r"(?i)\b(create|add|new|capture|save)\b"),
        ),
        (
            ToolHint::UpdateItem,
            pattern(r"(?i)\b(mark|complete|done|archive|dismiss|update)\b"),
        ),
    ]
});

static FILESYSTEM: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"(?i)\b(file|folder|directory|path|write|delete|create|save\s+to)\b")
});
static AUTH: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"(?i)\b(password|token|key|secret|credential|login|auth|api[_-]?key)\b")
});
static CODE_EXECUTION: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?i)\b(run|execute|eval|shell|command|script|code)\b"));
static EXTERNAL_MUTATION: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?i)\b(send|post|publish|deploy|delete|remove)\b"));

static REASONING: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"(?i)\b(analyze|compare|explain|why|how|evaluate|assess|think|consider)\b")
});
static CODE: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"(?i)\b(code|function|implement|fix|bug|error|debug|typescript|javascript|python)\b")
});
static STRUCTURED: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"(?i)\b(json|extract|parse|list|table|format|schema|structured)\b")
});
static CREATIVITY: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"(?i)\b(write|draft|compose|creative|story|poem|idea|brainstorm)\b")
});
static LONG_CONTEXT: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"(?i)\b(summarize|document|article|paper|long|entire|full)\b")
});

static TRIVIAL: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"(?i)^(hey|hi|hello|yo|sup|ok|okay|cool|nice|good|great|thanks?|thx|ty)!?$")
});

/// Zero-cost heuristic profiler.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskProfiler;

impl TaskProfiler {
    pub fn new() -> Self {
        Self
    }

    /// Profile one input. Never fails and performs no I/O.
    pub fn profile(&self, input: &str) -> TaskProfile {
        let task_id = generate_task_id();
        let tool_hints = detect_tools(input);
        let capabilities = detect_capabilities(input);
        let risk = detect_risks(input);
        let tokens = estimate_tokens(input);
        let complexity = classify(input, tokens, &capabilities);
        let required_context = required_context(&tool_hints);

        debug!(
            task_id = %task_id,
            complexity = %complexity,
            tools = tool_hints.len(),
            risk_tier = %risk.tier(),
            "task profiled"
        );

        TaskProfile {
            task_id,
            input: input.to_string(),
            complexity,
            estimated_input_tokens: tokens.saturating_add(SYSTEM_PROMPT_OVERHEAD),
            estimated_output_tokens: output_estimate(complexity),
            capabilities,
            risk,
            latency_sensitive: matches!(complexity, Complexity::Trivial | Complexity::Simple),
            cost_sensitive: true,
            tool_hints,
            required_context,
        }
    }
}

/// Approximate token count: one token per four characters, rounded up.
pub fn estimate_tokens(text: &str) -> u32 {
    u32::try_from(text.chars().count().div_ceil(4)).unwrap_or(u32::MAX)
}

/// Fixed output-token estimate per complexity class.
pub fn output_estimate(complexity: Complexity) -> u32 {
    match complexity {
        Complexity::Trivial => 50,
        Complexity::Simple => 150,
        Complexity::Moderate => 300,
        Complexity::Complex => 500,
    }
}

fn classify(input: &str, tokens: u32, caps: &Capabilities) -> Complexity {
    if TRIVIAL.is_match(input.trim()) {
        Complexity::Trivial
    } else if tokens < SIMPLE_TOKEN_CEILING && !caps.reasoning && !caps.code {
        Complexity::Simple
    } else if tokens > COMPLEX_TOKEN_FLOOR || caps.count() >= 3 || caps.long_context {
        Complexity::Complex
    } else {
        Complexity::Moderate
    }
}

fn detect_tools(input: &str) -> Vec<ToolHint> {
    TOOL_TRIGGERS
        .iter()
        .filter(|(_, re)| re.is_match(input))
        .map(|(hint, _)| *hint)
        .collect()
}

fn detect_capabilities(input: &str) -> Capabilities {
    Capabilities {
        reasoning: REASONING.is_match(input),
        code: CODE.is_match(input),
        structured_output: STRUCTURED.is_match(input),
        creativity: CREATIVITY.is_match(input),
        long_context: LONG_CONTEXT.is_match(input),
    }
}

fn detect_risks(input: &str) -> RiskFlags {
    RiskFlags {
        filesystem: FILESYSTEM.is_match(input),
        auth: AUTH.is_match(input),
        code_execution: CODE_EXECUTION.is_match(input),
        external_mutation: EXTERNAL_MUTATION.is_match(input),
    }
}

fn required_context(tools: &[ToolHint]) -> Vec<ContextDomain> {
    let has = |hint| tools.contains(&hint);
    let mut context = Vec::new();
    if has(ToolHint::QueryInbox) || has(ToolHint::CreateItem) {
        context.push(ContextDomain::InboxData);
    }
    if has(ToolHint::QueryWorkQueue) || has(ToolHint::UpdateItem) {
        context.push(ContextDomain::WorkQueueData);
    }
    if has(ToolHint::GetStatus) || has(ToolHint::GetSystemState) {
        context.push(ContextDomain::StatusSummary);
    }
    if has(ToolHint::Search) {
        context.push(ContextDomain::SearchIndex);
    }
    context
}

/// `task_{unix_millis}_{6 hex chars}`.
fn generate_task_id() -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("task_{}_{}", Utc::now().timestamp_millis(), &suffix[..6])
}

/// Canned reply for greetings and acknowledgements, if one applies.
pub fn quick_response(input: &str) -> Option<&'static str> {
    let lower = input.trim().to_lowercase();
    let word = lower.strip_suffix('!').unwrap_or(&lower);
    match word {
        "hey" | "hi" | "hello" | "yo" | "sup" => Some("Hey. What's up?"),
        "thanks" | "thank you" | "thx" | "ty" => Some("Got it."),
        "ok" | "okay" | "cool" | "nice" | "good" | "great" | "perfect" => {
            Some("Anything else?")
        }
        _ => None,
    }
}

/// A new profile one complexity tier higher with the output estimate scaled by 1.5.
pub fn upgrade_complexity(profile: &TaskProfile) -> TaskProfile {
    let scaled = (f64::from(profile.estimated_output_tokens) * 1.5).ceil();
    TaskProfile {
        complexity: profile.complexity.upgraded(),
        estimated_output_tokens: scaled.min(f64::from(u32::MAX)) as u32,
        ..profile.clone()
    }
}
