// SPDX-FileCopyrightText: 2026 Cortex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks semantic constraints serde cannot express: positive limits,
//! finite thresholds, well-formed URLs and log levels.

use crate::diagnostic::ConfigError;
use crate::model::CortexConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every problem rather than stopping at the first one.
pub fn validate_config(config: &CortexConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.agent.log_level.to_lowercase().as_str()) {
        errors.push(ConfigError::invalid(
            "agent.log_level",
            format!(
                "`{}` is not one of {}",
                config.agent.log_level,
                LOG_LEVELS.join(", ")
            ),
        ));
    }

    let threshold = config.supervisor.cost_checkpoint_threshold;
    if !threshold.is_finite() || threshold < 0.0 {
        errors.push(ConfigError::invalid(
            "supervisor.cost_checkpoint_threshold",
            format!("must be a non-negative amount, got {threshold}"),
        ));
    }

    if config.supervisor.max_retries == 0 {
        errors.push(ConfigError::invalid(
            "supervisor.max_retries",
            "must allow at least one attempt",
        ));
    }

    if config.supervisor.max_concurrent_workers == 0 {
        errors.push(ConfigError::invalid(
            "supervisor.max_concurrent_workers",
            "must be at least 1",
        ));
    }

    if config.supervisor.default_timeout_ms == 0 {
        errors.push(ConfigError::invalid(
            "supervisor.default_timeout_ms",
            "must be at least 1",
        ));
    }

    for (key, url) in [
        ("anthropic.base_url", &config.anthropic.base_url),
        ("openai.base_url", &config.openai.base_url),
        ("openrouter.base_url", &config.openrouter.base_url),
    ] {
        if let Some(message) = check_base_url(url) {
            errors.push(ConfigError::invalid(key, message));
        }
    }

    if config.storage.enabled && config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::invalid(
            "storage.database_path",
            "must not be empty when storage is enabled",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_base_url(url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        Some("must not be empty".to_string())
    } else if !(url.starts_with("https://") || url.starts_with("http://")) {
        Some(format!("`{url}` must start with http:// or https://"))
    } else {
        None
    }
}
