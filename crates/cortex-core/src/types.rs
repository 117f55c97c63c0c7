// SPDX-FileCopyrightText: 2026 Cortex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the profiler, selector, router, executor and supervisor.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Every model the router knows how to reach.
///
/// The string form is the vendor's model identifier and is what appears in
/// configuration, ledgers and logs.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
pub enum ModelId {
    #[strum(serialize = "claude-opus-4-20250514")]
    #[serde(rename = "claude-opus-4-20250514")]
    ClaudeOpus4,
    #[strum(serialize = "claude-sonnet-4-20250514")]
    #[serde(rename = "claude-sonnet-4-20250514")]
    ClaudeSonnet4,
    #[strum(serialize = "claude-3-5-haiku-20241022")]
    #[serde(rename = "claude-3-5-haiku-20241022")]
    ClaudeHaiku35,
    #[strum(serialize = "gpt-4o")]
    #[serde(rename = "gpt-4o")]
    Gpt4o,
    #[strum(serialize = "gpt-4o-mini")]
    #[serde(rename = "gpt-4o-mini")]
    Gpt4oMini,
    #[strum(serialize = "gemini-2.0-flash")]
    #[serde(rename = "gemini-2.0-flash")]
    Gemini20Flash,
    #[strum(serialize = "gemini-2.0-pro")]
    #[serde(rename = "gemini-2.0-pro")]
    Gemini20Pro,
    #[strum(serialize = "local")]
    #[serde(rename = "local")]
    Local,
}

impl ModelId {
    /// The vendor model identifier.
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Vendor that natively serves a model.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Anthropic,
    OpenAi,
    OpenRouter,
    Local,
}

/// Pricing tier of a catalog model.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    Premium,
    Efficient,
    Free,
}

/// Capability tags attached to catalog models.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Strength {
    Reasoning,
    Code,
    Analysis,
    LongContext,
    Creative,
    Speed,
    SimpleTasks,
    CostEfficient,
    Summarization,
    StructuredOutput,
    JsonMode,
    FunctionCalling,
    Transforms,
    Parsing,
    FileProcessing,
}

/// Complexity class assigned to a task by the profiler.
///
/// Variants are ordered from least to most demanding.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Trivial,
    Simple,
    Moderate,
    Complex,
}

impl Complexity {
    /// The next tier up, capped at `Complex`.
    pub fn upgraded(self) -> Self {
        match self {
            Complexity::Trivial => Complexity::Simple,
            Complexity::Simple => Complexity::Moderate,
            Complexity::Moderate | Complexity::Complex => Complexity::Complex,
        }
    }
}

/// Policy bucket deciding whether a task may proceed automatically.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    /// Proceed without telling anyone.
    Auto,
    /// Proceed, but the caller should surface what happened.
    Notify,
    /// Stop and ask a human.
    Review,
}

/// Kind of endpoint a request is sent to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    /// The model vendor's own API.
    Direct,
    /// The multi-vendor aggregator (OpenRouter).
    Aggregator,
    /// In-process no-op path that never calls a model.
    Local,
}

/// Tool the front-end may need to call, inferred from keywords.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ToolHint {
    QueryInbox,
    QueryWorkQueue,
    GetStatus,
    GetSystemState,
    Search,
    CreateItem,
    UpdateItem,
}

/// External data domain a request needs, consumed by the front-end.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ContextDomain {
    InboxData,
    WorkQueueData,
    StatusSummary,
    SearchIndex,
}

/// Capability requirements detected in the input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub reasoning: bool,
    pub code: bool,
    pub structured_output: bool,
    pub creativity: bool,
    pub long_context: bool,
}

impl Capabilities {
    /// Number of capability flags that are set.
    pub fn count(&self) -> usize {
        [
            self.reasoning,
            self.code,
            self.structured_output,
            self.creativity,
            self.long_context,
        ]
        .iter()
        .filter(|flag| **flag)
        .count()
    }
}

/// Risk indicators detected in the input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFlags {
    pub filesystem: bool,
    pub auth: bool,
    pub code_execution: bool,
    pub external_mutation: bool,
}

impl RiskFlags {
    /// Classify the flags into a policy tier.
    ///
    /// Auth, filesystem and code execution require review. External mutation
    /// alone only requires notification.
    pub fn tier(&self) -> RiskTier {
        if self.auth || self.filesystem || self.code_execution {
            RiskTier::Review
        } else if self.external_mutation {
            RiskTier::Notify
        } else {
            RiskTier::Auto
        }
    }
}

/// One classified unit of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskProfile {
    pub task_id: String,
    pub input: String,
    pub complexity: Complexity,
    pub estimated_input_tokens: u32,
    pub estimated_output_tokens: u32,
    pub capabilities: Capabilities,
    pub risk: RiskFlags,
    pub latency_sensitive: bool,
    pub cost_sensitive: bool,
    pub tool_hints: Vec<ToolHint>,
    pub required_context: Vec<ContextDomain>,
}

impl TaskProfile {
    /// Policy tier derived from the risk flags.
    pub fn risk_tier(&self) -> RiskTier {
        self.risk.tier()
    }

    /// Whether the request can be answered without any model call.
    pub fn can_skip_llm(&self) -> bool {
        self.complexity == Complexity::Trivial && self.tool_hints.is_empty()
    }
}

/// A chosen model plus rationale and fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSelection {
    pub model: ModelId,
    pub reasoning: String,
    pub estimated_cost: f64,
    pub fallback: Option<ModelId>,
}

/// Where a call for one model is sent.
///
/// `credential` names the provider whose key the executor should use. It is
/// `None` when no usable key was found, which makes the route unavailable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderRoute {
    pub endpoint: Endpoint,
    pub provider: Provider,
    pub model: ModelId,
    pub provider_model: String,
    pub credential: Option<Provider>,
    pub base_url: Option<String>,
}

impl ProviderRoute {
    /// A route is available when it is local or carries a credential.
    pub fn is_available(&self) -> bool {
        self.endpoint == Endpoint::Local || self.credential.is_some()
    }
}

/// Token usage and estimated cost of one call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
    pub cost: f64,
}

impl TokenUsage {
    /// Usage with the total filled in from its parts.
    pub fn new(input_tokens: u32, output_tokens: u32, cost: f64) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens: input_tokens.saturating_add(output_tokens),
            cost,
        }
    }

    /// Add another usage record into this one.
    pub fn accumulate(&mut self, other: &TokenUsage) {
        self.input_tokens = self.input_tokens.saturating_add(other.input_tokens);
        self.output_tokens = self.output_tokens.saturating_add(other.output_tokens);
        self.total_tokens = self.total_tokens.saturating_add(other.total_tokens);
        self.cost += other.cost;
    }
}

/// A tool the model may call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    pub input: serde_json::Value,
}

/// Everything the executor needs for one attempt.
#[derive(Debug, Clone)]
pub struct WorkerRequest {
    pub profile: TaskProfile,
    pub selection: ModelSelection,
    pub route: ProviderRoute,
    pub system_prompt: String,
    pub user_message: String,
    pub tools: Vec<ToolSpec>,
    pub json_mode: bool,
}

/// Normalized provider output before cost attribution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCall>,
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Outcome of one execution attempt. Always populated, even on failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerResult {
    pub task_id: String,
    pub success: bool,
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCall>,
    pub parsed_json: Option<serde_json::Value>,
    pub usage: TokenUsage,
    pub latency_ms: u64,
    pub model: ModelId,
    pub provider: Provider,
    pub endpoint: Endpoint,
    pub error: Option<String>,
}

impl WorkerResult {
    /// A failed attempt with zeroed usage.
    pub fn failure(request: &WorkerRequest, error: impl Into<String>, latency_ms: u64) -> Self {
        Self {
            task_id: request.profile.task_id.clone(),
            success: false,
            content: None,
            tool_calls: Vec::new(),
            parsed_json: None,
            usage: TokenUsage::default(),
            latency_ms,
            model: request.selection.model,
            provider: request.route.provider,
            endpoint: request.route.endpoint,
            error: Some(error.into()),
        }
    }

    /// True when the call succeeded and produced non-empty text.
    pub fn has_content(&self) -> bool {
        self.success && self.content.as_deref().is_some_and(|c| !c.is_empty())
    }
}

/// Which validation pass produced a result.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ValidationStage {
    SpecCompliance,
    OutputQuality,
}

/// Outcome of one validation stage, scored 0-100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub stage: ValidationStage,
    pub passed: bool,
    pub score: u8,
    pub issues: Vec<String>,
    pub suggestions: Vec<String>,
}
