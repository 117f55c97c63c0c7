// SPDX-FileCopyrightText: 2026 Cortex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider credentials resolved from configuration and the environment.
//!
//! Keys are held as [`SecretString`] so they never reach logs through
//! `Debug`. A provider is "available" exactly when it has a non-empty key.

use cortex_core::Provider;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::model::CortexConfig;

/// Per-provider API keys.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    anthropic: Option<SecretString>,
    openai: Option<SecretString>,
    openrouter: Option<SecretString>,
}

impl Credentials {
    /// Resolve keys from config, falling back to the vendor env variables.
    ///
    /// Resolution order per provider:
    /// 1. `<provider>.api_key` in config if non-empty
    /// 2. `ANTHROPIC_API_KEY` / `OPENAI_API_KEY` / `OPENROUTER_API_KEY`
    /// 3. Absent
    pub fn from_config(config: &CortexConfig) -> Self {
        Self {
            anthropic: resolve_key(config.anthropic.api_key.as_deref(), "ANTHROPIC_API_KEY"),
            openai: resolve_key(config.openai.api_key.as_deref(), "OPENAI_API_KEY"),
            openrouter: resolve_key(config.openrouter.api_key.as_deref(), "OPENROUTER_API_KEY"),
        }
    }

    /// Build from literal keys without consulting the environment.
    pub fn from_keys(
        anthropic: Option<&str>,
        openai: Option<&str>,
        openrouter: Option<&str>,
    ) -> Self {
        Self {
            anthropic: non_empty(anthropic),
            openai: non_empty(openai),
            openrouter: non_empty(openrouter),
        }
    }

    /// The key for a provider, if one is configured. `Local` never has one.
    pub fn get(&self, provider: Provider) -> Option<&SecretString> {
        match provider {
            Provider::Anthropic => self.anthropic.as_ref(),
            Provider::OpenAi => self.openai.as_ref(),
            Provider::OpenRouter => self.openrouter.as_ref(),
            Provider::Local => None,
        }
    }

    /// Whether calls to this provider can be authenticated.
    ///
    /// The local backend needs no key and is always available.
    pub fn is_available(&self, provider: Provider) -> bool {
        provider == Provider::Local || self.get(provider).is_some()
    }

    /// Key text for building auth headers. Empty when absent.
    pub fn expose(&self, provider: Provider) -> &str {
        self.get(provider).map(|s| s.expose_secret()).unwrap_or("")
    }
}

fn non_empty(value: Option<&str>) -> Option<SecretString> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| SecretString::from(v.to_string()))
}

fn resolve_key(config_key: Option<&str>, env_var: &str) -> Option<SecretString> {
    if let Some(key) = non_empty(config_key) {
        return Some(key);
    }
    let from_env = non_empty(std::env::var(env_var).ok().as_deref());
    if from_env.is_some() {
        debug!(env_var, "api key taken from environment");
    }
    from_env
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_keys_are_unavailable() {
        let creds = Credentials::from_keys(Some("sk-ant"), Some(""), None);
        assert!(creds.is_available(Provider::Anthropic));
        assert!(!creds.is_available(Provider::OpenAi));
        assert!(!creds.is_available(Provider::OpenRouter));
        assert!(creds.is_available(Provider::Local));
        assert_eq!(creds.expose(Provider::Anthropic), "sk-ant");
        assert_eq!(creds.expose(Provider::OpenAi), "");
    }

    #[test]
    fn debug_output_redacts_keys() {
        let creds = Credentials::from_keys(Some("sk-ant-secret"), None, None);
        let debug = format!("{creds:?}");
        assert!(!debug.contains("sk-ant-secret"), "got: {debug}");
    }

    #[test]
    fn config_key_wins_over_environment() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("OPENAI_API_KEY", "sk-env");
            jail.set_env("OPENROUTER_API_KEY", "sk-or-env");
            let mut config = CortexConfig::default();
            config.openai.api_key = Some("sk-config".into());
            config.openrouter.api_key = Some("   ".into());

            let creds = Credentials::from_config(&config);
            assert_eq!(creds.expose(Provider::OpenAi), "sk-config");
            assert_eq!(creds.expose(Provider::OpenRouter), "sk-or-env");
            Ok(())
        });
    }
}
