// SPDX-FileCopyrightText: 2026 Cortex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The supervisor: profile, gate, execute, validate, retry.
//!
//! One request moves through
//! `profiled -> risk checked -> cost checked -> executing -> validating`
//! and ends in exactly one [`Outcome`]. Every stop, including policy stops
//! and exhausted retries, is reported as data on [`SupervisorResponse`].

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use cortex_config::{CortexConfig, Credentials};
use cortex_core::{
    Complexity, CortexError, Execute, ModelId, ModelSelection, ProviderRoute, RiskTier,
    TaskProfile, ValidationResult, WorkerRequest, WorkerResult,
};
use cortex_cost::persistence::{self, Persistence};
use cortex_cost::{TokenLedger, TokenLedgerEntry, aggregate_usage, persist_recorded_execution};
use cortex_providers::{WorkerExecutor, is_retriable_error};
use cortex_router::{
    ModelSelector, ProviderRouter, TaskProfiler, exceeds_cost_threshold, quick_response,
    upgrade_complexity,
};
use serde::Serialize;
use strum::Display;
use tokio_util::task::TaskTracker;
use tracing::{error, info, warn};

use crate::prompt::{DEFAULT_PERSONA, build_system_prompt};
use crate::validation::{validate_output_quality, validate_spec_compliance};

/// Characters of the input kept as the persisted task summary.
const SUMMARY_CHARS: usize = 100;

/// One request to the supervisor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupervisorRequest {
    pub input: String,
    /// Bypass selection and use this model.
    pub force_model: Option<ModelId>,
    /// Accept the first response with content.
    pub skip_validation: bool,
}

impl SupervisorRequest {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            ..Self::default()
        }
    }

    pub fn with_model(mut self, model: ModelId) -> Self {
        self.force_model = Some(model);
        self
    }

    pub fn skip_validation(mut self) -> Self {
        self.skip_validation = true;
        self
    }
}

/// How a supervised run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// A response passed validation.
    Completed,
    /// A canned reply, no model call.
    QuickResponse,
    RiskBlocked,
    CostExceeded,
    /// No credential for the route and no alternate route.
    ProviderUnavailable,
    CircuitBreakerExhausted,
}

/// Everything the caller learns about one supervised run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupervisorResponse {
    pub task_id: String,
    pub success: bool,
    pub content: Option<String>,
    pub needs_review: bool,
    pub review_reason: Option<String>,
    pub outcome: Outcome,
    pub total_cost: f64,
    pub total_latency_ms: u64,
    pub worker_results: Vec<WorkerResult>,
    pub validations: Vec<ValidationResult>,
}

impl SupervisorResponse {
    fn stopped(profile: &TaskProfile, outcome: Outcome, reason: String, start: Instant) -> Self {
        Self {
            task_id: profile.task_id.clone(),
            success: false,
            content: None,
            needs_review: true,
            review_reason: Some(reason),
            outcome,
            total_cost: 0.0,
            total_latency_ms: elapsed_ms(start),
            worker_results: Vec::new(),
            validations: Vec::new(),
        }
    }

    /// Model that produced the last attempt, if any ran.
    pub fn final_model(&self) -> Option<ModelId> {
        self.worker_results.last().map(|r| r.model)
    }
}

/// Tunables taken from `[supervisor]` and `[agent]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SupervisorSettings {
    pub cost_checkpoint_threshold: f64,
    pub max_retries: u32,
    pub max_concurrent_workers: usize,
    pub persona: String,
}

impl Default for SupervisorSettings {
    fn default() -> Self {
        Self {
            cost_checkpoint_threshold: 0.50,
            max_retries: 3,
            max_concurrent_workers: 5,
            persona: DEFAULT_PERSONA.to_string(),
        }
    }
}

impl SupervisorSettings {
    pub fn from_config(config: &CortexConfig) -> Self {
        Self {
            cost_checkpoint_threshold: config.supervisor.cost_checkpoint_threshold,
            max_retries: config.supervisor.max_retries,
            max_concurrent_workers: config.supervisor.max_concurrent_workers,
            persona: config
                .agent
                .system_prompt
                .clone()
                .unwrap_or_else(|| DEFAULT_PERSONA.to_string()),
        }
    }
}

/// Human-readable list of the risk flags that tripped review.
pub fn review_reason(profile: &TaskProfile) -> String {
    let mut reasons = Vec::new();
    if profile.risk.auth {
        reasons.push("touches authentication");
    }
    if profile.risk.filesystem {
        reasons.push("modifies files");
    }
    if profile.risk.code_execution {
        reasons.push("executes code");
    }
    if profile.risk.external_mutation {
        reasons.push("modifies external systems");
    }
    format!("This task {} and requires your approval.", reasons.join(", "))
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Terminal state of the execute/validate loop.
struct LoopEnd {
    outcome: Outcome,
    content: Option<String>,
    review_reason: Option<String>,
}

/// Orchestrates the routing pipeline for one request at a time.
///
/// The ledger and persistence sink are shared; everything else is
/// per-call state, so one supervisor can serve concurrent requests.
pub struct Supervisor {
    profiler: TaskProfiler,
    selector: ModelSelector,
    router: ProviderRouter,
    executor: Arc<dyn Execute>,
    ledger: Arc<TokenLedger>,
    persistence: Arc<dyn Persistence>,
    settings: SupervisorSettings,
    background: TaskTracker,
}

impl Supervisor {
    pub fn new(
        router: ProviderRouter,
        executor: Arc<dyn Execute>,
        ledger: Arc<TokenLedger>,
        persistence: Arc<dyn Persistence>,
        settings: SupervisorSettings,
    ) -> Self {
        Self {
            profiler: TaskProfiler::new(),
            selector: ModelSelector::new(),
            router,
            executor,
            ledger,
            persistence,
            settings,
            background: TaskTracker::new(),
        }
    }

    /// Wire the full production stack from configuration.
    pub async fn from_config(
        config: &CortexConfig,
        credentials: &Credentials,
    ) -> Result<Self, CortexError> {
        let executor = WorkerExecutor::from_config(config, credentials)?;
        let sink: Arc<dyn Persistence> = Arc::from(persistence::from_config(&config.storage).await);
        Ok(Self::new(
            ProviderRouter::from_config(config, credentials),
            Arc::new(executor),
            Arc::new(TokenLedger::new()),
            sink,
            SupervisorSettings::from_config(config),
        ))
    }

    pub fn ledger(&self) -> &Arc<TokenLedger> {
        &self.ledger
    }

    pub fn router(&self) -> &ProviderRouter {
        &self.router
    }

    pub fn settings(&self) -> &SupervisorSettings {
        &self.settings
    }

    /// Wait for background persistence writes to finish.
    pub async fn drain(&self) {
        self.background.close();
        self.background.wait().await;
        self.background.reopen();
    }

    /// Run one request through the whole pipeline.
    pub async fn supervise(&self, request: &SupervisorRequest) -> SupervisorResponse {
        let start = Instant::now();
        let profile = self.profiler.profile(&request.input);
        info!(
            task_id = %profile.task_id,
            complexity = %profile.complexity,
            tools = profile.tool_hints.len(),
            "supervisor processing"
        );

        if let Some(reply) = profile
            .can_skip_llm()
            .then(|| quick_response(&request.input))
            .flatten()
        {
            return SupervisorResponse {
                task_id: profile.task_id,
                success: true,
                content: Some(reply.to_string()),
                needs_review: false,
                review_reason: None,
                outcome: Outcome::QuickResponse,
                total_cost: 0.0,
                total_latency_ms: elapsed_ms(start),
                worker_results: Vec::new(),
                validations: Vec::new(),
            };
        }

        if profile.risk_tier() == RiskTier::Review {
            let reason = review_reason(&profile);
            info!(task_id = %profile.task_id, reason = %reason, "risk gate stopped task");
            return SupervisorResponse::stopped(&profile, Outcome::RiskBlocked, reason, start);
        }

        let selection = match request.force_model {
            Some(model) => self.selector.select_forced(model, &profile),
            None => self.selector.select(&profile),
        };

        let threshold = self.settings.cost_checkpoint_threshold;
        if exceeds_cost_threshold(&selection, threshold) {
            let reason = format!(
                "Estimated cost ${:.4} exceeds threshold ${threshold:.2}",
                selection.estimated_cost
            );
            info!(task_id = %profile.task_id, model = %selection.model, reason = %reason, "cost gate stopped task");
            return SupervisorResponse::stopped(&profile, Outcome::CostExceeded, reason, start);
        }

        let task_id = profile.task_id.clone();
        let mut worker_results = Vec::new();
        let mut validations = Vec::new();
        let mut last_entry = None;
        let end = self
            .run_attempts(
                request,
                profile,
                selection,
                &mut worker_results,
                &mut validations,
                &mut last_entry,
            )
            .await;

        if let (Some(entry), Some(last)) = (last_entry, worker_results.last()) {
            self.persist_in_background(entry, last.clone(), &request.input);
        }

        SupervisorResponse {
            task_id,
            success: end.outcome == Outcome::Completed,
            content: end.content,
            needs_review: end.outcome != Outcome::Completed,
            review_reason: end.review_reason,
            outcome: end.outcome,
            total_cost: aggregate_usage(&worker_results).cost,
            total_latency_ms: elapsed_ms(start),
            worker_results,
            validations,
        }
    }

    /// The bounded execute/validate loop. At most `max_retries` attempts.
    async fn run_attempts(
        &self,
        request: &SupervisorRequest,
        mut profile: TaskProfile,
        mut selection: ModelSelection,
        worker_results: &mut Vec<WorkerResult>,
        validations: &mut Vec<ValidationResult>,
        last_entry: &mut Option<TokenLedgerEntry>,
    ) -> LoopEnd {
        let max_attempts = self.settings.max_retries.max(1);
        let mut attempts = 0;
        let mut pending_route: Option<ProviderRoute> = None;
        let mut rerouted: HashSet<ModelId> = HashSet::new();

        while attempts < max_attempts {
            attempts += 1;
            let route = pending_route
                .take()
                .unwrap_or_else(|| self.router.route(selection.model));

            let worker_request = WorkerRequest {
                system_prompt: build_system_prompt(&self.settings.persona, &profile),
                user_message: request.input.clone(),
                tools: Vec::new(),
                json_mode: profile.capabilities.structured_output,
                profile: profile.clone(),
                selection: selection.clone(),
                route: route.clone(),
            };

            let result = self.executor.execute(&worker_request).await;
            *last_entry = Some(self.ledger.record(&result).await);
            worker_results.push(result.clone());

            if let Some(content) = result.content.as_deref().filter(|_| result.has_content()) {
                if request.skip_validation {
                    return completed(content);
                }

                let spec = validate_spec_compliance(&request.input, content);
                let spec_passed = spec.passed;
                if !spec_passed {
                    warn!(
                        task_id = %profile.task_id,
                        score = spec.score,
                        issues = ?spec.issues,
                        "spec compliance failed"
                    );
                }
                validations.push(spec);
                if !spec_passed {
                    selection = self.selector.upgrade(&selection, &profile);
                    continue;
                }

                if profile.complexity != Complexity::Simple {
                    let quality = validate_output_quality(content);
                    let quality_passed = quality.passed;
                    if !quality_passed {
                        warn!(task_id = %profile.task_id, score = quality.score, "output quality low");
                    }
                    validations.push(quality);
                    if !quality_passed {
                        profile = upgrade_complexity(&profile);
                        continue;
                    }
                }

                return completed(content);
            }

            let error_text = result.error.clone().unwrap_or_else(|| "empty response".to_string());
            warn!(
                task_id = %profile.task_id,
                attempt = attempts,
                model = %selection.model,
                endpoint = %route.endpoint,
                error = %error_text,
                "worker attempt failed"
            );

            let alternate = self.router.fallback_route(&route, selection.model);

            if !route.is_available() && alternate.is_none() {
                match self.next_reachable(&selection, &profile) {
                    Some(next) => {
                        info!(
                            task_id = %profile.task_id,
                            from = %selection.model,
                            to = %next.model,
                            "no credentials for model, escalating to a reachable one"
                        );
                        selection = next;
                        continue;
                    }
                    None => {
                        return LoopEnd {
                            outcome: Outcome::ProviderUnavailable,
                            content: None,
                            review_reason: Some(format!(
                                "No provider credentials available for {}: {error_text}",
                                selection.model
                            )),
                        };
                    }
                }
            }

            let reroute = alternate
                .filter(|_| is_retriable_error(&result) && !rerouted.contains(&selection.model));
            if let Some(next) = reroute {
                info!(
                    task_id = %profile.task_id,
                    model = %selection.model,
                    fallback_endpoint = %next.endpoint,
                    "trying fallback route"
                );
                rerouted.insert(selection.model);
                pending_route = Some(next);
                continue;
            }

            selection = self.selector.upgrade(&selection, &profile);
        }

        error!(task_id = %profile.task_id, attempts, "circuit breaker triggered");
        LoopEnd {
            outcome: Outcome::CircuitBreakerExhausted,
            content: Some(format!(
                "Failed after {attempts} attempts. May need a different approach."
            )),
            review_reason: Some(format!("Circuit breaker: {attempts} failures")),
        }
    }

    /// First selection up the escalation chain whose model has a usable route.
    fn next_reachable(&self, current: &ModelSelection, profile: &TaskProfile) -> Option<ModelSelection> {
        let mut candidate = self.selector.upgrade(current, profile);
        loop {
            if !self.router.available_endpoints(candidate.model).is_empty() {
                return Some(candidate);
            }
            let next = self.selector.upgrade(&candidate, profile);
            if next.model == candidate.model {
                return None;
            }
            candidate = next;
        }
    }

    fn persist_in_background(&self, entry: TokenLedgerEntry, result: WorkerResult, input: &str) {
        let sink = Arc::clone(&self.persistence);
        let summary: String = input.chars().take(SUMMARY_CHARS).collect();
        self.background.spawn(async move {
            persist_recorded_execution(sink.as_ref(), &entry, &result, &summary).await;
        });
    }
}

fn completed(content: &str) -> LoopEnd {
    LoopEnd {
        outcome: Outcome::Completed,
        content: Some(content.to_string()),
        review_reason: None,
    }
}
