// SPDX-FileCopyrightText: 2026 Cortex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The execute capability consumed by the supervisor.

use async_trait::async_trait;

use crate::types::{WorkerRequest, WorkerResult};

/// Runs one attempt against the route carried by the request.
///
/// Implementations never fail: every error, timeout or missing backend is
/// captured as a [`WorkerResult`] with `success == false` and zeroed usage.
#[async_trait]
pub trait Execute: Send + Sync + 'static {
    async fn execute(&self, request: &WorkerRequest) -> WorkerResult;
}
