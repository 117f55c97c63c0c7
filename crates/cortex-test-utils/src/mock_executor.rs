// SPDX-FileCopyrightText: 2026 Cortex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted executor for deterministic supervisor tests.
//!
//! `MockExecutor` implements `Execute` without any network. Outcomes are
//! popped from a FIFO queue; when the queue is empty the fallback outcome is
//! returned. Every request is recorded for later inspection.

use std::collections::VecDeque;

use async_trait::async_trait;
use cortex_catalog::estimate_cost;
use cortex_core::{Execute, TokenUsage, WorkerRequest, WorkerResult};
use tokio::sync::Mutex;

/// What the mock does for one call.
#[derive(Debug, Clone, PartialEq)]
pub enum MockOutcome {
    /// Succeed with this content and token counts.
    Success {
        content: String,
        input_tokens: u32,
        output_tokens: u32,
    },
    /// Fail with this error text and zero usage.
    Failure(String),
}

impl MockOutcome {
    /// Success with 100 input and 50 output tokens.
    pub fn success(content: impl Into<String>) -> Self {
        Self::Success {
            content: content.into(),
            input_tokens: 100,
            output_tokens: 50,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure(error.into())
    }
}

/// A mock executor that returns pre-configured outcomes.
pub struct MockExecutor {
    script: Mutex<VecDeque<MockOutcome>>,
    fallback: MockOutcome,
    requests: Mutex<Vec<WorkerRequest>>,
}

impl MockExecutor {
    /// Empty script; every call succeeds with "mock response".
    pub fn new() -> Self {
        Self::with_outcomes(Vec::new())
    }

    pub fn with_outcomes(outcomes: Vec<MockOutcome>) -> Self {
        Self::scripted(outcomes, MockOutcome::success("mock response"))
    }

    /// Every call returns `outcome`.
    pub fn always(outcome: MockOutcome) -> Self {
        Self::scripted(Vec::new(), outcome)
    }

    /// Play `outcomes` in order, then return `fallback` forever.
    pub fn scripted(outcomes: Vec<MockOutcome>, fallback: MockOutcome) -> Self {
        Self {
            script: Mutex::new(VecDeque::from(outcomes)),
            fallback,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub async fn push(&self, outcome: MockOutcome) {
        self.script.lock().await.push_back(outcome);
    }

    /// Requests received so far, in call order.
    pub async fn requests(&self) -> Vec<WorkerRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

impl Default for MockExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Execute for MockExecutor {
    async fn execute(&self, request: &WorkerRequest) -> WorkerResult {
        self.requests.lock().await.push(request.clone());
        let outcome = self
            .script
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        match outcome {
            MockOutcome::Success {
                content,
                input_tokens,
                output_tokens,
            } => WorkerResult {
                task_id: request.profile.task_id.clone(),
                success: true,
                content: Some(content),
                tool_calls: Vec::new(),
                parsed_json: None,
                usage: TokenUsage::new(
                    input_tokens,
                    output_tokens,
                    estimate_cost(request.selection.model, input_tokens, output_tokens),
                ),
                latency_ms: 1,
                model: request.selection.model,
                provider: request.route.provider,
                endpoint: request.route.endpoint,
                error: None,
            },
            MockOutcome::Failure(error) => WorkerResult::failure(request, error, 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cortex_router::{Availability, ModelSelector, ProviderRouter, TaskProfiler};

    fn request(input: &str) -> WorkerRequest {
        let profile = TaskProfiler::new().profile(input);
        let selection = ModelSelector::new().select(&profile);
        let route = ProviderRouter::new(
            true,
            true,
            Availability {
                anthropic: true,
                openai: true,
                openrouter: true,
            },
            "https://openrouter.test/api/v1",
        )
        .route(selection.model);
        WorkerRequest {
            profile,
            selection,
            route,
            system_prompt: String::new(),
            user_message: input.to_string(),
            tools: Vec::new(),
            json_mode: false,
        }
    }

    #[tokio::test]
    async fn default_response_when_queue_empty() {
        let executor = MockExecutor::new();
        let result = executor.execute(&request("Weather in Paris tomorrow?")).await;
        assert!(result.success);
        assert_eq!(result.content.as_deref(), Some("mock response"));
        assert!(result.usage.cost > 0.0);
    }

    #[tokio::test]
    async fn script_plays_in_order_then_falls_back() {
        let executor = MockExecutor::scripted(
            vec![MockOutcome::failure("rate limited (429)"), MockOutcome::success("second")],
            MockOutcome::success("fallback"),
        );
        executor.push(MockOutcome::success("pushed")).await;
        let req = request("Weather in Paris tomorrow?");

        let first = executor.execute(&req).await;
        assert!(!first.success);
        assert_eq!(first.usage.cost, 0.0);
        assert_eq!(executor.execute(&req).await.content.as_deref(), Some("second"));
        assert_eq!(executor.execute(&req).await.content.as_deref(), Some("pushed"));
        assert_eq!(executor.execute(&req).await.content.as_deref(), Some("fallback"));
        assert_eq!(executor.call_count().await, 4);
    }
}
