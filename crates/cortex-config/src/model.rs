// SPDX-FileCopyrightText: 2026 Cortex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Cortex model router.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key is a
//! startup error with a suggestion, never a silently ignored setting.

use serde::{Deserialize, Serialize};

/// Top-level Cortex configuration.
///
/// Every section is optional and falls back to the defaults below.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CortexConfig {
    /// Identity, logging and prompt persona.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Anthropic Messages API settings.
    #[serde(default)]
    pub anthropic: AnthropicConfig,

    /// OpenAI chat completions settings.
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// OpenRouter aggregator settings.
    #[serde(default)]
    pub openrouter: OpenRouterConfig,

    /// Direct-versus-aggregator routing policy.
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Gates, retries, concurrency and timeouts.
    #[serde(default)]
    pub supervisor: SupervisorConfig,

    /// Optional SQLite sink for ledger and result records.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name used in logs and the default persona.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Persona preamble placed at the start of every generated system prompt.
    #[serde(default)]
    pub system_prompt: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            system_prompt: None,
        }
    }
}

fn default_agent_name() -> String {
    "cortex".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Anthropic API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AnthropicConfig {
    /// API key. Falls back to `ANTHROPIC_API_KEY` when unset or empty.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Value of the `anthropic-version` header.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// API base URL; `/messages` is appended.
    #[serde(default = "default_anthropic_base_url")]
    pub base_url: String,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_version: default_api_version(),
            base_url: default_anthropic_base_url(),
        }
    }
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}

fn default_anthropic_base_url() -> String {
    "https://api.anthropic.com/v1".to_string()
}

/// OpenAI API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OpenAiConfig {
    /// API key. Falls back to `OPENAI_API_KEY` when unset or empty.
    #[serde(default)]
    pub api_key: Option<String>,

    /// API base URL; `/chat/completions` is appended.
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_openai_base_url(),
        }
    }
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

/// OpenRouter aggregator configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OpenRouterConfig {
    /// API key. Falls back to `OPENROUTER_API_KEY` when unset or empty.
    #[serde(default)]
    pub api_key: Option<String>,

    /// API base URL; `/chat/completions` is appended.
    #[serde(default = "default_openrouter_base_url")]
    pub base_url: String,

    /// Sent as the `HTTP-Referer` attribution header.
    #[serde(default = "default_openrouter_referer")]
    pub referer: String,

    /// Sent as the `X-Title` attribution header.
    #[serde(default = "default_openrouter_title")]
    pub title: String,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_openrouter_base_url(),
            referer: default_openrouter_referer(),
            title: default_openrouter_title(),
        }
    }
}

fn default_openrouter_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_openrouter_referer() -> String {
    "https://github.com/cortex-router/cortex".to_string()
}

fn default_openrouter_title() -> String {
    "Cortex Model Router".to_string()
}

/// Routing policy between vendor APIs and the aggregator.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    /// Use the vendor's own API whenever its credential is present.
    #[serde(default = "default_true")]
    pub prefer_direct_api: bool,

    /// Allow routing through the aggregator when direct is not possible.
    #[serde(default = "default_true")]
    pub fallback_enabled: bool,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            prefer_direct_api: true,
            fallback_enabled: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Supervisor gates and limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SupervisorConfig {
    /// Estimated cost in USD above which a task is escalated instead of run.
    #[serde(default = "default_cost_checkpoint_threshold")]
    pub cost_checkpoint_threshold: f64,

    /// Attempts before the circuit breaker escalates.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Requests dispatched concurrently by the batch paths.
    #[serde(default = "default_max_concurrent_workers")]
    pub max_concurrent_workers: usize,

    /// Base per-call deadline, scaled by task complexity.
    #[serde(default = "default_timeout_ms")]
    pub default_timeout_ms: u64,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            cost_checkpoint_threshold: default_cost_checkpoint_threshold(),
            max_retries: default_max_retries(),
            max_concurrent_workers: default_max_concurrent_workers(),
            default_timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_cost_checkpoint_threshold() -> f64 {
    0.50
}

fn default_max_retries() -> u32 {
    3
}

fn default_max_concurrent_workers() -> usize {
    5
}

fn default_timeout_ms() -> u64 {
    30_000
}

/// SQLite persistence sink configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Persist ledger entries and worker results when true.
    #[serde(default)]
    pub enabled: bool,

    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("cortex").join("ledger.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("cortex-ledger.db"))
        .to_string_lossy()
        .into_owned()
}
