// SPDX-FileCopyrightText: 2026 Cortex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end supervisor tests.
//!
//! `TestHarness` assembles a [`Supervisor`] around a [`MockExecutor`], a
//! fresh ledger and a [`RecordingPersistence`], with fake credentials so
//! routing behaves as it would in production.

use std::sync::Arc;

use cortex_config::Credentials;
use cortex_cost::TokenLedger;
use cortex_router::{Availability, ProviderRouter};
use cortex_supervisor::{Supervisor, SupervisorRequest, SupervisorResponse, SupervisorSettings};

use crate::mock_executor::{MockExecutor, MockOutcome};
use crate::recording_persistence::RecordingPersistence;

/// Builder for harnesses with configurable credentials and limits.
pub struct TestHarnessBuilder {
    outcomes: Vec<MockOutcome>,
    fallback: Option<MockOutcome>,
    credentials: Credentials,
    prefer_direct: bool,
    fallback_enabled: bool,
    settings: SupervisorSettings,
    failing_persistence: bool,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            outcomes: Vec::new(),
            fallback: None,
            credentials: Credentials::from_keys(
                Some("test-anthropic"),
                Some("test-openai"),
                Some("test-openrouter"),
            ),
            prefer_direct: true,
            fallback_enabled: true,
            settings: SupervisorSettings::default(),
            failing_persistence: false,
        }
    }

    /// Outcomes returned in order by the mock executor.
    pub fn with_outcomes(mut self, outcomes: Vec<MockOutcome>) -> Self {
        self.outcomes = outcomes;
        self
    }

    /// Outcome returned once the scripted ones run out.
    pub fn always(mut self, outcome: MockOutcome) -> Self {
        self.fallback = Some(outcome);
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn prefer_direct(mut self, prefer: bool) -> Self {
        self.prefer_direct = prefer;
        self
    }

    pub fn with_fallback_enabled(mut self, enabled: bool) -> Self {
        self.fallback_enabled = enabled;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.settings.cost_checkpoint_threshold = threshold;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.settings.max_retries = max_retries;
        self
    }

    pub fn with_max_concurrent(mut self, max: usize) -> Self {
        self.settings.max_concurrent_workers = max;
        self
    }

    pub fn with_persona(mut self, persona: impl Into<String>) -> Self {
        self.settings.persona = persona.into();
        self
    }

    /// Make every persistence write fail.
    pub fn with_failing_persistence(mut self) -> Self {
        self.failing_persistence = true;
        self
    }

    pub fn build(self) -> TestHarness {
        let fallback = self
            .fallback
            .unwrap_or_else(|| MockOutcome::success("mock response"));
        let executor = MockExecutor::scripted(self.outcomes, fallback);
        let executor = Arc::new(executor);

        let persistence = Arc::new(if self.failing_persistence {
            RecordingPersistence::failing()
        } else {
            RecordingPersistence::new()
        });
        let ledger = Arc::new(TokenLedger::new());
        let router = ProviderRouter::new(
            self.prefer_direct,
            self.fallback_enabled,
            Availability::from_credentials(&self.credentials),
            "https://openrouter.test/api/v1",
        );

        let supervisor = Supervisor::new(
            router,
            executor.clone(),
            ledger.clone(),
            persistence.clone(),
            self.settings,
        );

        TestHarness {
            supervisor,
            executor,
            ledger,
            persistence,
        }
    }
}

/// A supervisor wired to test doubles, with handles to inspect them.
pub struct TestHarness {
    pub supervisor: Supervisor,
    pub executor: Arc<MockExecutor>,
    pub ledger: Arc<TokenLedger>,
    pub persistence: Arc<RecordingPersistence>,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Supervise `input` with default request options.
    pub async fn supervise(&self, input: &str) -> SupervisorResponse {
        self.supervisor.supervise(&SupervisorRequest::new(input)).await
    }

    /// Supervise and wait for background persistence to settle.
    pub async fn supervise_and_drain(&self, request: &SupervisorRequest) -> SupervisorResponse {
        let response = self.supervisor.supervise(request).await;
        self.supervisor.drain().await;
        response
    }
}
