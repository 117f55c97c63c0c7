// SPDX-FileCopyrightText: 2026 Cortex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for LLM backends (Anthropic, OpenAI, OpenRouter, local).

use async_trait::async_trait;

use crate::error::CortexError;
use crate::types::{Completion, WorkerRequest};

/// One wire-format backend.
///
/// Adapters translate a [`WorkerRequest`] into their provider's request
/// shape, perform the call, and normalize the reply. Failures are returned
/// as errors; turning them into failed worker results is the executor's job.
#[async_trait]
pub trait ProviderAdapter: Send + Sync + 'static {
    /// Human-readable name used in logs.
    fn name(&self) -> &str;

    /// Sends one completion request and returns the normalized response.
    async fn complete(&self, request: &WorkerRequest) -> Result<Completion, CortexError>;
}
