// SPDX-FileCopyrightText: 2026 Cortex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider routing: prefer the vendor's own API, fall back to the aggregator.

use cortex_catalog::spec;
use cortex_config::{Credentials, CortexConfig};
use cortex_core::{Endpoint, ModelId, Provider, ProviderRoute};
use tracing::{debug, warn};

/// Which provider credentials are usable right now.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Availability {
    pub anthropic: bool,
    pub openai: bool,
    pub openrouter: bool,
}

impl Availability {
    pub fn from_credentials(credentials: &Credentials) -> Self {
        Self {
            anthropic: credentials.is_available(Provider::Anthropic),
            openai: credentials.is_available(Provider::OpenAi),
            openrouter: credentials.is_available(Provider::OpenRouter),
        }
    }

    pub fn has(&self, provider: Provider) -> bool {
        match provider {
            Provider::Anthropic => self.anthropic,
            Provider::OpenAi => self.openai,
            Provider::OpenRouter => self.openrouter,
            Provider::Local => true,
        }
    }
}

/// Health of the routing layer as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingHealth {
    /// At least one network provider is usable.
    pub healthy: bool,
    pub availability: Availability,
    /// e.g. `Direct: Anthropic, OpenAI | Fallback: OpenRouter`.
    pub summary: String,
}

/// Maps model ids to concrete routes. Stateless given availability.
#[derive(Debug, Clone)]
pub struct ProviderRouter {
    prefer_direct: bool,
    fallback_enabled: bool,
    availability: Availability,
    aggregator_base_url: String,
}

impl ProviderRouter {
    pub fn new(
        prefer_direct: bool,
        fallback_enabled: bool,
        availability: Availability,
        aggregator_base_url: impl Into<String>,
    ) -> Self {
        Self {
            prefer_direct,
            fallback_enabled,
            availability,
            aggregator_base_url: aggregator_base_url.into(),
        }
    }

    pub fn from_config(config: &CortexConfig, credentials: &Credentials) -> Self {
        Self::new(
            config.routing.prefer_direct_api,
            config.routing.fallback_enabled,
            Availability::from_credentials(credentials),
            config.openrouter.base_url.clone(),
        )
    }

    pub fn availability(&self) -> Availability {
        self.availability
    }

    fn fallback_available(&self) -> bool {
        self.fallback_enabled && self.availability.openrouter
    }

    /// Route a model to an endpoint.
    ///
    /// Falls through to an uncredentialed direct route as a last resort so
    /// the caller sees a provider-specific error instead of no route at all.
    pub fn route(&self, model: ModelId) -> ProviderRoute {
        let entry = spec(model);
        if entry.provider == Provider::Local {
            return local_route(model);
        }

        if self.prefer_direct && self.availability.has(entry.provider) {
            debug!(model = %model, provider = %entry.provider, "routing to direct API");
            return self.direct_route(model, Some(entry.provider));
        }

        if let Some(route) = self.aggregator_route(model) {
            debug!(model = %model, provider_model = %route.provider_model, "routing to aggregator");
            return route;
        }

        warn!(
            model = %model,
            provider = %entry.provider,
            "no confirmed credentials, trying direct route as last resort"
        );
        let credential = self
            .availability
            .has(entry.provider)
            .then_some(entry.provider);
        self.direct_route(model, credential)
    }

    /// Alternate route for the same model after `primary` failed.
    ///
    /// Direct falls back to the aggregator; the aggregator falls back to
    /// direct when the vendor key is usable. Models the aggregator natively
    /// serves have no alternate.
    pub fn fallback_route(&self, primary: &ProviderRoute, model: ModelId) -> Option<ProviderRoute> {
        let entry = spec(model);
        if entry.provider == Provider::OpenRouter {
            return None;
        }
        match primary.endpoint {
            Endpoint::Direct => self.aggregator_route(model),
            Endpoint::Aggregator if self.availability.has(entry.provider) => {
                debug!(model = %model, provider = %entry.provider, "direct fallback route");
                Some(self.direct_route(model, Some(entry.provider)))
            }
            _ => None,
        }
    }

    /// Endpoints currently usable for `model`, in routing order.
    pub fn available_endpoints(&self, model: ModelId) -> Vec<Endpoint> {
        let entry = spec(model);
        if entry.provider == Provider::Local {
            return vec![Endpoint::Local];
        }
        let mut endpoints = Vec::new();
        if self.availability.has(entry.provider) {
            endpoints.push(Endpoint::Direct);
        }
        if entry.provider != Provider::OpenRouter
            && self.fallback_available()
            && entry.aggregator_id.is_some()
        {
            endpoints.push(Endpoint::Aggregator);
        }
        endpoints
    }

    /// Order in which endpoints are tried for a vendor. Never empty.
    pub fn routing_order(&self, provider: Provider) -> Vec<Endpoint> {
        let mut order = Vec::new();
        if self.prefer_direct && self.availability.has(provider) {
            order.push(Endpoint::Direct);
        }
        if self.fallback_available() {
            order.push(Endpoint::Aggregator);
        }
        if order.is_empty() {
            order.push(Endpoint::Direct);
        }
        order
    }

    pub fn health(&self) -> RoutingHealth {
        let a = self.availability;
        let direct: Vec<&str> = [Provider::Anthropic, Provider::OpenAi]
            .into_iter()
            .filter(|p| a.has(*p))
            .map(provider_display_name)
            .collect();

        let mut parts = Vec::new();
        if !direct.is_empty() {
            parts.push(format!("Direct: {}", direct.join(", ")));
        }
        if self.fallback_available() {
            parts.push("Fallback: OpenRouter".to_string());
        } else if a.openrouter {
            parts.push("OpenRouter (fallback disabled)".to_string());
        }
        let summary = if parts.is_empty() {
            "No providers configured".to_string()
        } else {
            parts.join(" | ")
        };

        RoutingHealth {
            healthy: a.anthropic || a.openai || a.openrouter,
            availability: a,
            summary,
        }
    }

    fn direct_route(&self, model: ModelId, credential: Option<Provider>) -> ProviderRoute {
        let entry = spec(model);
        // Aggregator-native models are addressed by their aggregator id even on the direct path.
        let (provider_model, base_url) = if entry.provider == Provider::OpenRouter {
            (
                entry.aggregator_id.unwrap_or(model.as_str()).to_string(),
                Some(self.aggregator_base_url.clone()),
            )
        } else {
            (model.to_string(), None)
        };
        ProviderRoute {
            endpoint: Endpoint::Direct,
            provider: entry.provider,
            model,
            provider_model,
            credential,
            base_url,
        }
    }

    fn aggregator_route(&self, model: ModelId) -> Option<ProviderRoute> {
        if !self.fallback_available() {
            return None;
        }
        let aggregator_id = spec(model).aggregator_id?;
        Some(ProviderRoute {
            endpoint: Endpoint::Aggregator,
            provider: Provider::OpenRouter,
            model,
            provider_model: aggregator_id.to_string(),
            credential: Some(Provider::OpenRouter),
            base_url: Some(self.aggregator_base_url.clone()),
        })
    }
}

fn local_route(model: ModelId) -> ProviderRoute {
    ProviderRoute {
        endpoint: Endpoint::Local,
        provider: Provider::Local,
        model,
        provider_model: model.to_string(),
        credential: None,
        base_url: None,
    }
}

/// Human-readable provider name.
pub fn provider_display_name(provider: Provider) -> &'static str {
    match provider {
        Provider::Anthropic => "Anthropic",
        Provider::OpenAi => "OpenAI",
        Provider::OpenRouter => "OpenRouter",
        Provider::Local => "Local",
    }
}

/// One-line route description, e.g. `Anthropic (direct) → claude-sonnet-4-20250514`.
pub fn format_route(route: &ProviderRoute) -> String {
    if route.endpoint == Endpoint::Local {
        return "Local execution".to_string();
    }
    format!(
        "{} ({}) → {}",
        provider_display_name(route.provider),
        route.endpoint,
        route.provider_model
    )
}
