// SPDX-FileCopyrightText: 2026 Cortex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end supervisor behavior against a scripted executor.

use cortex_config::Credentials;
use cortex_core::{Complexity, Endpoint, ModelId, ValidationStage};
use cortex_supervisor::{Outcome, SupervisorRequest};
use cortex_test_utils::{MockOutcome, TestHarness};

/// Moderate complexity, no capabilities, no risk. Selects haiku, fallback sonnet.
const MODERATE: &str = "Give me a quick rundown of what happened at the marathon in Berlin yesterday morning near the river";
/// Same shape as [`MODERATE`] but longer than 100 characters.
const LONG_MODERATE: &str = "Give me a quick rundown of what happened at the marathon in Berlin yesterday morning near the river and along the embankment";
/// Simple complexity. Selects haiku, fallback gpt-4o-mini.
const SIMPLE: &str = "Weather in Paris tomorrow?";
/// Needs structured output. Selects gpt-4o-mini.
const STRUCTURED: &str = "Give me a table of the largest cities in Europe by population";

const GOOD_ANSWER: &str = "The Berlin marathon ran under clear skies and the course record held.";

fn verbose_with_filler() -> String {
    format!(
        "Great question! {}```a``` ```b``` ```",
        "The race went well overall. ".repeat(80)
    )
}

#[tokio::test]
async fn thanks_is_answered_without_a_model() {
    let h = TestHarness::builder().build();
    let response = h.supervise("thanks").await;

    assert!(response.success);
    assert_eq!(response.outcome, Outcome::QuickResponse);
    assert_eq!(response.content.as_deref(), Some("Got it."));
    assert_eq!(response.total_cost, 0.0);
    assert!(response.worker_results.is_empty());
    assert_eq!(h.executor.call_count().await, 0);
}

#[tokio::test]
async fn risky_input_is_escalated_before_selection() {
    let h = TestHarness::builder().build();
    let response = h.supervise("please delete the file in my downloads").await;

    assert!(!response.success);
    assert!(response.needs_review);
    assert_eq!(response.outcome, Outcome::RiskBlocked);
    assert_eq!(response.total_cost, 0.0);
    assert!(response.worker_results.is_empty());
    let reason = response.review_reason.unwrap();
    assert!(reason.contains("modifies files"), "{reason}");
    assert!(reason.ends_with("and requires your approval."), "{reason}");
    assert_eq!(h.executor.call_count().await, 0);
    assert_eq!(h.ledger.stats().await.request_count, 0);
}

#[tokio::test]
async fn expensive_task_is_escalated_with_the_estimate() {
    let h = TestHarness::builder().with_threshold(0.50).build();
    // 50,334 estimated tokens plus prompt overhead, complex output, at opus rates.
    let input = "a".repeat(201_336);
    let request = SupervisorRequest::new(input).with_model(ModelId::ClaudeOpus4);
    let response = h.supervisor.supervise(&request).await;

    assert_eq!(response.outcome, Outcome::CostExceeded);
    assert!(response.needs_review);
    let reason = response.review_reason.unwrap();
    assert!(reason.contains("0.80"), "{reason}");
    assert!(reason.contains("threshold $0.50"), "{reason}");
    assert_eq!(h.executor.call_count().await, 0);
}

#[tokio::test]
async fn non_retriable_failures_trip_the_circuit_breaker() {
    let h = TestHarness::builder()
        .with_max_retries(3)
        .always(MockOutcome::failure("API returned 400 Bad Request: invalid request"))
        .build();
    let response = h.supervise(MODERATE).await;

    assert!(!response.success);
    assert!(response.needs_review);
    assert_eq!(response.outcome, Outcome::CircuitBreakerExhausted);
    assert_eq!(response.worker_results.len(), 3);
    assert_eq!(response.review_reason.as_deref(), Some("Circuit breaker: 3 failures"));
    assert_eq!(
        response.content.as_deref(),
        Some("Failed after 3 attempts. May need a different approach.")
    );
    assert_eq!(h.executor.call_count().await, 3);
    assert_eq!(h.ledger.stats().await.request_count, 3);
}

#[tokio::test]
async fn non_retriable_failure_upgrades_the_model() {
    let h = TestHarness::builder()
        .with_outcomes(vec![
            MockOutcome::failure("API returned 400 Bad Request"),
            MockOutcome::success(GOOD_ANSWER),
        ])
        .build();
    let response = h.supervise(MODERATE).await;

    assert!(response.success);
    assert_eq!(response.outcome, Outcome::Completed);
    let requests = h.executor.requests().await;
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].selection.model, ModelId::ClaudeHaiku35);
    assert_eq!(requests[1].selection.model, ModelId::ClaudeSonnet4);
    assert_eq!(response.final_model(), Some(ModelId::ClaudeSonnet4));
}

#[tokio::test]
async fn retriable_failure_tries_the_alternate_route_first() {
    let h = TestHarness::builder()
        .with_outcomes(vec![
            MockOutcome::failure("rate limited (429): slow down"),
            MockOutcome::success(GOOD_ANSWER),
        ])
        .build();
    let response = h.supervise(MODERATE).await;

    assert!(response.success);
    let requests = h.executor.requests().await;
    assert_eq!(requests[0].route.endpoint, Endpoint::Direct);
    assert_eq!(requests[1].route.endpoint, Endpoint::Aggregator);
    assert_eq!(requests[1].route.provider_model, "anthropic/claude-3-5-haiku-20241022");
    assert_eq!(requests[0].selection.model, requests[1].selection.model);
}

#[tokio::test]
async fn alternate_route_is_used_once_per_model() {
    let h = TestHarness::builder()
        .with_max_retries(4)
        .always(MockOutcome::failure("API returned 503 Service Unavailable"))
        .build();
    let response = h.supervise(MODERATE).await;

    assert_eq!(response.outcome, Outcome::CircuitBreakerExhausted);
    let requests = h.executor.requests().await;
    let trail: Vec<(ModelId, Endpoint)> = requests
        .iter()
        .map(|r| (r.selection.model, r.route.endpoint))
        .collect();
    assert_eq!(
        trail,
        vec![
            (ModelId::ClaudeHaiku35, Endpoint::Direct),
            (ModelId::ClaudeHaiku35, Endpoint::Aggregator),
            (ModelId::ClaudeSonnet4, Endpoint::Direct),
            (ModelId::ClaudeSonnet4, Endpoint::Aggregator),
        ]
    );
}

#[tokio::test]
async fn spec_compliance_failure_upgrades_the_model() {
    let h = TestHarness::builder()
        .with_outcomes(vec![
            MockOutcome::success("I cannot."),
            MockOutcome::success(GOOD_ANSWER),
        ])
        .build();
    let response = h.supervise(LONG_MODERATE).await;

    assert!(response.success);
    assert_eq!(response.validations[0].stage, ValidationStage::SpecCompliance);
    assert!(!response.validations[0].passed);
    assert_eq!(response.validations[0].score, 50);
    let requests = h.executor.requests().await;
    assert_eq!(requests[1].selection.model, ModelId::ClaudeSonnet4);
    assert_eq!(requests[1].profile.complexity, Complexity::Moderate);
}

#[tokio::test]
async fn quality_failure_upgrades_complexity() {
    let h = TestHarness::builder()
        .with_outcomes(vec![
            MockOutcome::success(verbose_with_filler()),
            MockOutcome::success(GOOD_ANSWER),
        ])
        .build();
    let response = h.supervise(MODERATE).await;

    assert!(response.success);
    let stages: Vec<(ValidationStage, bool)> = response
        .validations
        .iter()
        .map(|v| (v.stage, v.passed))
        .collect();
    assert_eq!(
        stages,
        vec![
            (ValidationStage::SpecCompliance, true),
            (ValidationStage::OutputQuality, false),
            (ValidationStage::SpecCompliance, true),
            (ValidationStage::OutputQuality, true),
        ]
    );
    let requests = h.executor.requests().await;
    assert_eq!(requests[0].selection.model, requests[1].selection.model);
    assert_eq!(requests[1].profile.complexity, Complexity::Complex);
    assert_eq!(requests[1].profile.estimated_output_tokens, 450);
}

#[tokio::test]
async fn simple_tasks_skip_quality_validation() {
    let h = TestHarness::builder()
        .with_outcomes(vec![MockOutcome::success(verbose_with_filler())])
        .build();
    let response = h.supervise(SIMPLE).await;

    assert!(response.success);
    assert_eq!(response.validations.len(), 1);
    assert_eq!(response.validations[0].stage, ValidationStage::SpecCompliance);
}

#[tokio::test]
async fn skip_validation_accepts_first_content() {
    let h = TestHarness::builder()
        .with_outcomes(vec![MockOutcome::success("I cannot.")])
        .build();
    let request = SupervisorRequest::new(LONG_MODERATE).skip_validation();
    let response = h.supervisor.supervise(&request).await;

    assert!(response.success);
    assert_eq!(response.content.as_deref(), Some("I cannot."));
    assert!(response.validations.is_empty());
    assert_eq!(h.executor.call_count().await, 1);
}

#[tokio::test]
async fn missing_credentials_stop_without_burning_retries() {
    let h = TestHarness::builder()
        .with_credentials(Credentials::default())
        .always(MockOutcome::failure("API returned 401 Unauthorized: authentication_error"))
        .build();
    let response = h.supervise(MODERATE).await;

    assert_eq!(response.outcome, Outcome::ProviderUnavailable);
    assert!(response.needs_review);
    assert_eq!(response.worker_results.len(), 1);
    let reason = response.review_reason.unwrap();
    assert!(
        reason.starts_with("No provider credentials available for claude-3-5-haiku-20241022"),
        "{reason}"
    );
}

#[tokio::test]
async fn missing_vendor_key_escalates_to_a_reachable_model() {
    let h = TestHarness::builder()
        .with_credentials(Credentials::from_keys(None, Some("sk-openai-test"), None))
        .with_outcomes(vec![
            MockOutcome::failure("API returned 401 Unauthorized: invalid x-api-key"),
            MockOutcome::success("Sunny with a light breeze."),
        ])
        .build();
    let response = h.supervise(SIMPLE).await;

    assert!(response.success);
    assert_eq!(response.outcome, Outcome::Completed);
    let requests = h.executor.requests().await;
    let trail: Vec<(ModelId, Endpoint)> = requests
        .iter()
        .map(|r| (r.selection.model, r.route.endpoint))
        .collect();
    assert_eq!(
        trail,
        vec![
            (ModelId::ClaudeHaiku35, Endpoint::Direct),
            (ModelId::Gpt4oMini, Endpoint::Direct),
        ]
    );
    assert!(requests[1].route.is_available());
}

#[tokio::test]
async fn unreachable_models_are_skipped_on_escalation() {
    // Moderate input: haiku falls back to sonnet, neither reachable with only OpenAI.
    let h = TestHarness::builder()
        .with_credentials(Credentials::from_keys(None, Some("sk-openai-test"), None))
        .always(MockOutcome::failure("API returned 401 Unauthorized"))
        .build();
    let response = h.supervise(MODERATE).await;

    assert_eq!(response.outcome, Outcome::ProviderUnavailable);
    assert_eq!(h.executor.call_count().await, 1);
}

#[tokio::test]
async fn forced_model_is_used_and_priced() {
    let h = TestHarness::builder().build();
    let request = SupervisorRequest::new(MODERATE).with_model(ModelId::Gpt4o);
    let response = h.supervisor.supervise(&request).await;

    assert!(response.success);
    let requests = h.executor.requests().await;
    assert_eq!(requests[0].selection.model, ModelId::Gpt4o);
    assert!(requests[0].selection.estimated_cost > 0.0);
    assert_eq!(requests[0].route.provider_model, "gpt-4o");
}

#[tokio::test]
async fn structured_tasks_run_in_json_mode() {
    let h = TestHarness::builder()
        .with_persona("You are Ada.")
        .with_outcomes(vec![MockOutcome::success(r#"{"cities": ["Istanbul", "Moscow"]}"#)])
        .build();
    let response = h.supervise(STRUCTURED).await;

    assert!(response.success);
    let request = &h.executor.requests().await[0];
    assert!(request.json_mode);
    assert_eq!(request.selection.model, ModelId::Gpt4oMini);
    assert!(request.system_prompt.starts_with("You are Ada. Return valid JSON only"));
}

#[tokio::test]
async fn ledger_matches_response_totals() {
    let h = TestHarness::builder()
        .with_outcomes(vec![
            MockOutcome::failure("API returned 400 Bad Request"),
            MockOutcome::success(GOOD_ANSWER),
        ])
        .build();
    let response = h.supervise(MODERATE).await;

    let stats = h.ledger.stats().await;
    assert_eq!(stats.request_count, 2);
    assert!((stats.total_cost - response.total_cost).abs() < 1e-12);
    assert!(response.total_cost > 0.0);
    let entry_sum: f64 = h.ledger.entries().await.iter().map(|e| e.cost_usd).sum();
    assert!((entry_sum - stats.total_cost).abs() < 1e-12);
}

#[tokio::test]
async fn final_result_is_persisted_in_background() {
    let h = TestHarness::builder().build();
    let input = format!("{LONG_MODERATE} {LONG_MODERATE}");
    let response = h.supervise_and_drain(&SupervisorRequest::new(input.clone())).await;

    assert!(response.success);
    let entries = h.persistence.token_entries().await;
    let results = h.persistence.worker_results().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].summary, input.chars().take(100).collect::<String>());
    assert_eq!(results[0].token_entry_id.as_deref(), Some(entries[0].id.as_str()));
    assert_eq!(entries[0].task_id, response.task_id);
    let ledger_entries = h.ledger.entries().await;
    assert_eq!(entries[0].id, ledger_entries.last().unwrap().id);
    assert_eq!(entries[0].timestamp, ledger_entries.last().unwrap().timestamp);
}

#[tokio::test]
async fn persistence_failure_does_not_affect_the_response() {
    let h = TestHarness::builder().with_failing_persistence().build();
    let response = h.supervise_and_drain(&SupervisorRequest::new(MODERATE)).await;

    assert!(response.success);
    assert_eq!(response.outcome, Outcome::Completed);
    assert!(h.persistence.worker_results().await.is_empty());
}

#[tokio::test]
async fn parallel_dispatch_preserves_request_order() {
    let h = TestHarness::builder().with_max_concurrent(3).build();
    let inputs = [
        "thanks",
        MODERATE,
        "please delete the file in my downloads",
        "hello",
        SIMPLE,
        STRUCTURED,
        "ok",
    ];
    let requests: Vec<SupervisorRequest> = inputs.iter().map(|i| SupervisorRequest::new(*i)).collect();
    let responses = h.supervisor.supervise_parallel(&requests).await;

    let outcomes: Vec<Outcome> = responses.iter().map(|r| r.outcome).collect();
    assert_eq!(
        outcomes,
        vec![
            Outcome::QuickResponse,
            Outcome::Completed,
            Outcome::RiskBlocked,
            Outcome::QuickResponse,
            Outcome::Completed,
            Outcome::Completed,
            Outcome::QuickResponse,
        ]
    );
    assert_eq!(h.executor.call_count().await, 3);
}
