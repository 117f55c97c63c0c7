// SPDX-FileCopyrightText: 2026 Cortex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The worker executor: one request, one route, one normalized result.
//!
//! Provider failures never escape as errors. They are folded into a
//! [`WorkerResult`] with `success = false` and zeroed usage so the
//! supervisor's retry loop can act on them.

use std::sync::{Arc, LazyLock};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use cortex_catalog::estimate_cost;
use cortex_config::{CortexConfig, Credentials};
use cortex_core::{
    Complexity, CortexError, Endpoint, Execute, Provider, ProviderAdapter, ProviderRoute,
    TokenUsage, WorkerRequest, WorkerResult,
};
use futures::future::join_all;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::anthropic::AnthropicProvider;
use crate::local::LocalBackend;
use crate::openai::OpenAiProvider;

static RETRIABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(rate.?limit|429|timeout|timed out|502|503|overloaded|temporarily unavailable)",
    )
    .unwrap_or_else(|e| panic!("invalid retriable-error pattern: {e}"))
});

/// Whether a failed result looks transient and worth retrying.
pub fn is_retriable_error(result: &WorkerResult) -> bool {
    !result.success && result.error.as_deref().is_some_and(|e| RETRIABLE.is_match(e))
}

/// Per-call deadline: doubled for complex work, halved for trivial work.
pub fn worker_timeout(base_ms: u64, request: &WorkerRequest) -> Duration {
    let ms = match request.profile.complexity {
        Complexity::Complex => base_ms.saturating_mul(2),
        Complexity::Trivial => base_ms / 2,
        Complexity::Simple | Complexity::Moderate => base_ms,
    };
    Duration::from_millis(ms)
}

/// Run `requests` through `executor` in fixed-size concurrent batches.
///
/// Each batch of up to `max_concurrent` requests is awaited before the next
/// starts. Results come back in input order.
pub async fn execute_parallel<E>(
    executor: &E,
    requests: &[WorkerRequest],
    max_concurrent: usize,
) -> Vec<WorkerResult>
where
    E: Execute + ?Sized,
{
    let mut results = Vec::with_capacity(requests.len());
    for batch in requests.chunks(max_concurrent.max(1)) {
        results.extend(join_all(batch.iter().map(|r| executor.execute(r))).await);
    }
    results
}

/// Dispatches requests to the adapter matching their route.
#[derive(Clone)]
pub struct WorkerExecutor {
    anthropic: Arc<dyn ProviderAdapter>,
    openai: Arc<dyn ProviderAdapter>,
    openrouter: Arc<dyn ProviderAdapter>,
    local: Arc<dyn ProviderAdapter>,
    default_timeout_ms: u64,
    max_concurrent: usize,
}

impl WorkerExecutor {
    pub fn new(
        anthropic: Arc<dyn ProviderAdapter>,
        openai: Arc<dyn ProviderAdapter>,
        openrouter: Arc<dyn ProviderAdapter>,
        default_timeout_ms: u64,
        max_concurrent: usize,
    ) -> Self {
        Self {
            anthropic,
            openai,
            openrouter,
            local: Arc::new(LocalBackend),
            default_timeout_ms,
            max_concurrent,
        }
    }

    /// Build every adapter from configuration.
    ///
    /// Adapters are created even for providers without a key. A last-resort
    /// route then fails with the vendor's own authentication error.
    pub fn from_config(config: &CortexConfig, credentials: &Credentials) -> Result<Self, CortexError> {
        let anthropic = AnthropicProvider::new(
            credentials.expose(Provider::Anthropic),
            &config.anthropic.api_version,
            &config.anthropic.base_url,
        )?;
        let openai =
            OpenAiProvider::openai(credentials.expose(Provider::OpenAi), &config.openai.base_url)?;
        let openrouter =
            OpenAiProvider::openrouter(credentials.expose(Provider::OpenRouter), &config.openrouter)?;

        Ok(Self::new(
            Arc::new(anthropic),
            Arc::new(openai),
            Arc::new(openrouter),
            config.supervisor.default_timeout_ms,
            config.supervisor.max_concurrent_workers,
        ))
    }

    fn adapter_for(&self, route: &ProviderRoute) -> &dyn ProviderAdapter {
        match (route.endpoint, route.provider) {
            (Endpoint::Local, _) | (_, Provider::Local) => self.local.as_ref(),
            (Endpoint::Aggregator, _) | (_, Provider::OpenRouter) => self.openrouter.as_ref(),
            (Endpoint::Direct, Provider::Anthropic) => self.anthropic.as_ref(),
            (Endpoint::Direct, Provider::OpenAi) => self.openai.as_ref(),
        }
    }

    pub fn timeout_for(&self, request: &WorkerRequest) -> Duration {
        worker_timeout(self.default_timeout_ms, request)
    }

    pub async fn execute_parallel(&self, requests: &[WorkerRequest]) -> Vec<WorkerResult> {
        execute_parallel(self, requests, self.max_concurrent).await
    }
}

impl std::fmt::Debug for WorkerExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerExecutor")
            .field("default_timeout_ms", &self.default_timeout_ms)
            .field("max_concurrent", &self.max_concurrent)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Execute for WorkerExecutor {
    async fn execute(&self, request: &WorkerRequest) -> WorkerResult {
        let start = Instant::now();
        let adapter = self.adapter_for(&request.route);
        let deadline = self.timeout_for(request);
        debug!(
            task_id = %request.profile.task_id,
            adapter = adapter.name(),
            provider_model = %request.route.provider_model,
            timeout_ms = deadline.as_millis() as u64,
            "executing worker"
        );

        let outcome = tokio::time::timeout(deadline, adapter.complete(request)).await;
        let latency_ms = start.elapsed().as_millis() as u64;

        let completion = match outcome {
            Ok(Ok(completion)) => completion,
            Ok(Err(e)) => {
                warn!(task_id = %request.profile.task_id, error = %e, latency_ms, "worker failed");
                return WorkerResult::failure(request, e.to_string(), latency_ms);
            }
            Err(_) => {
                let message = format!("Request timeout after {}ms", deadline.as_millis());
                warn!(task_id = %request.profile.task_id, latency_ms, "{message}");
                return WorkerResult::failure(request, message, latency_ms);
            }
        };

        // Cost is always attributed to the nominal model's catalog rates.
        let cost_usd = estimate_cost(
            request.selection.model,
            completion.input_tokens,
            completion.output_tokens,
        );

        let parsed_json = match (&completion.content, request.json_mode) {
            (Some(text), true) => match serde_json::from_str(text) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!(task_id = %request.profile.task_id, error = %e, "JSON-mode response did not parse");
                    None
                }
            },
            _ => None,
        };

        info!(
            task_id = %request.profile.task_id,
            model = %request.selection.model,
            endpoint = %request.route.endpoint,
            latency_ms,
            cost_usd,
            "worker completed"
        );

        WorkerResult {
            task_id: request.profile.task_id.clone(),
            success: true,
            content: completion.content,
            tool_calls: completion.tool_calls,
            parsed_json,
            usage: TokenUsage::new(completion.input_tokens, completion.output_tokens, cost_usd),
            latency_ms,
            model: request.selection.model,
            provider: request.route.provider,
            endpoint: request.route.endpoint,
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cortex_core::{
        Capabilities, Completion, ModelId, ModelSelection, RiskFlags, TaskProfile,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn request(complexity: Complexity, endpoint: Endpoint, provider: Provider) -> WorkerRequest {
        let model = if provider == Provider::Local {
            ModelId::Local
        } else {
            ModelId::ClaudeHaiku35
        };
        WorkerRequest {
            profile: TaskProfile {
                task_id: "task_1_abcdef".into(),
                input: "hello".into(),
                complexity,
                estimated_input_tokens: 502,
                estimated_output_tokens: 150,
                capabilities: Capabilities::default(),
                risk: RiskFlags::default(),
                latency_sensitive: true,
                cost_sensitive: true,
                tool_hints: vec![],
                required_context: vec![],
            },
            selection: ModelSelection {
                model,
                reasoning: "test".into(),
                estimated_cost: 0.0,
                fallback: None,
            },
            route: ProviderRoute {
                endpoint,
                provider,
                model,
                provider_model: model.to_string(),
                credential: Some(provider),
                base_url: None,
            },
            system_prompt: "system".into(),
            user_message: "hello".into(),
            tools: vec![],
            json_mode: false,
        }
    }

    /// Adapter that counts calls and optionally sleeps or fails.
    struct Scripted {
        name: &'static str,
        calls: AtomicUsize,
        delay: Duration,
        fail: Option<&'static str>,
    }

    impl Scripted {
        fn ok(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                calls: AtomicUsize::new(0),
                delay: Duration::ZERO,
                fail: None,
            })
        }
    }

    #[async_trait]
    impl ProviderAdapter for Scripted {
        fn name(&self) -> &str {
            self.name
        }

        async fn complete(&self, request: &WorkerRequest) -> Result<Completion, CortexError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            match self.fail {
                Some(msg) => Err(CortexError::provider(msg)),
                None => Ok(Completion {
                    content: Some(format!("{} says {}", self.name, request.user_message)),
                    tool_calls: vec![],
                    input_tokens: 1000,
                    output_tokens: 500,
                }),
            }
        }
    }

    fn executor_with(
        anthropic: Arc<Scripted>,
        openai: Arc<Scripted>,
        openrouter: Arc<Scripted>,
        timeout_ms: u64,
    ) -> WorkerExecutor {
        WorkerExecutor::new(anthropic, openai, openrouter, timeout_ms, 2)
    }

    #[test]
    fn retriable_patterns() {
        let req = request(Complexity::Simple, Endpoint::Direct, Provider::Anthropic);
        let retriable = [
            "rate limited (429)",
            "Rate_Limit exceeded",
            "Request timeout after 100ms",
            "operation timed out",
            "API returned 502 Bad Gateway",
            "503 Service Unavailable",
            "Anthropic API error (overloaded_error): Overloaded",
            "service temporarily unavailable",
        ];
        for msg in retriable {
            assert!(is_retriable_error(&WorkerResult::failure(&req, msg, 0)), "{msg}");
        }
        for msg in ["400 Bad Request: invalid model", "401 authentication_error"] {
            assert!(!is_retriable_error(&WorkerResult::failure(&req, msg, 0)), "{msg}");
        }
    }

    #[test]
    fn successful_result_is_never_retriable() {
        let req = request(Complexity::Simple, Endpoint::Direct, Provider::Anthropic);
        let mut result = WorkerResult::failure(&req, "503", 0);
        result.success = true;
        assert!(!is_retriable_error(&result));
    }

    #[test]
    fn timeout_scales_with_complexity() {
        let base = 30_000;
        let t = |c| worker_timeout(base, &request(c, Endpoint::Direct, Provider::Anthropic));
        assert_eq!(t(Complexity::Complex), Duration::from_millis(60_000));
        assert_eq!(t(Complexity::Trivial), Duration::from_millis(15_000));
        assert_eq!(t(Complexity::Moderate), Duration::from_millis(30_000));
        assert_eq!(t(Complexity::Simple), Duration::from_millis(30_000));
    }

    #[tokio::test]
    async fn local_route_needs_no_network() {
        let anthropic = Scripted::ok("anthropic");
        let exec = executor_with(anthropic.clone(), Scripted::ok("openai"), Scripted::ok("openrouter"), 1000);
        let mut req = request(Complexity::Trivial, Endpoint::Local, Provider::Local);
        req.user_message = "x".repeat(150);

        let result = exec.execute(&req).await;
        assert!(result.success);
        assert_eq!(result.usage, TokenUsage::default());
        let content = result.content.unwrap();
        assert!(content.starts_with("Local processing not yet implemented for: "));
        assert_eq!(content.matches('x').count(), 100);
        assert_eq!(anthropic.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn aggregator_route_uses_openrouter_but_nominal_cost() {
        let openrouter = Scripted::ok("openrouter");
        let exec = executor_with(Scripted::ok("anthropic"), Scripted::ok("openai"), openrouter.clone(), 1000);
        let mut req = request(Complexity::Simple, Endpoint::Aggregator, Provider::OpenRouter);
        req.route.provider_model = "anthropic/claude-3-5-haiku-20241022".into();

        let result = exec.execute(&req).await;
        assert!(result.success);
        assert_eq!(openrouter.calls.load(Ordering::SeqCst), 1);
        assert_eq!(result.model, ModelId::ClaudeHaiku35);
        assert_eq!(result.endpoint, Endpoint::Aggregator);
        let expected = estimate_cost(ModelId::ClaudeHaiku35, 1000, 500);
        assert!((result.usage.cost - expected).abs() < 1e-12);
        assert_eq!(result.usage.total_tokens, 1500);
    }

    #[tokio::test]
    async fn provider_error_becomes_failed_result() {
        let failing = Arc::new(Scripted {
            name: "anthropic",
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
            fail: Some("API returned 503 Service Unavailable"),
        });
        let exec = executor_with(failing, Scripted::ok("openai"), Scripted::ok("openrouter"), 1000);
        let result = exec
            .execute(&request(Complexity::Simple, Endpoint::Direct, Provider::Anthropic))
            .await;
        assert!(!result.success);
        assert_eq!(result.usage, TokenUsage::default());
        assert!(is_retriable_error(&result));
    }

    #[tokio::test]
    async fn slow_call_times_out_as_retriable() {
        let slow = Arc::new(Scripted {
            name: "openai",
            calls: AtomicUsize::new(0),
            delay: Duration::from_secs(5),
            fail: None,
        });
        let exec = executor_with(Scripted::ok("anthropic"), slow, Scripted::ok("openrouter"), 100);
        let mut req = request(Complexity::Trivial, Endpoint::Direct, Provider::OpenAi);
        req.selection.model = ModelId::Gpt4oMini;

        let result = exec.execute(&req).await;
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Request timeout after 50ms"));
        assert!(is_retriable_error(&result));
    }

    #[tokio::test]
    async fn json_mode_parses_content() {
        struct JsonAdapter;
        #[async_trait]
        impl ProviderAdapter for JsonAdapter {
            fn name(&self) -> &str {
                "openai"
            }
            async fn complete(&self, _: &WorkerRequest) -> Result<Completion, CortexError> {
                Ok(Completion {
                    content: Some(r#"{"items": [1, 2]}"#.into()),
                    ..Completion::default()
                })
            }
        }
        let exec = WorkerExecutor::new(
            Scripted::ok("anthropic"),
            Arc::new(JsonAdapter),
            Scripted::ok("openrouter"),
            1000,
            5,
        );
        let mut req = request(Complexity::Simple, Endpoint::Direct, Provider::OpenAi);
        req.json_mode = true;
        let result = exec.execute(&req).await;
        assert_eq!(result.parsed_json, Some(serde_json::json!({"items": [1, 2]})));
    }

    #[tokio::test]
    async fn parallel_preserves_order_across_batches() {
        let anthropic = Scripted::ok("anthropic");
        let exec = executor_with(anthropic.clone(), Scripted::ok("openai"), Scripted::ok("openrouter"), 1000);
        let requests: Vec<WorkerRequest> = (0..5)
            .map(|i| {
                let mut r = request(Complexity::Simple, Endpoint::Direct, Provider::Anthropic);
                r.user_message = format!("msg-{i}");
                r
            })
            .collect();

        let results = exec.execute_parallel(&requests).await;
        assert_eq!(results.len(), 5);
        for (i, r) in results.iter().enumerate() {
            assert_eq!(r.content.as_deref(), Some(format!("anthropic says msg-{i}").as_str()));
        }
        assert_eq!(anthropic.calls.load(Ordering::SeqCst), 5);
    }
}
