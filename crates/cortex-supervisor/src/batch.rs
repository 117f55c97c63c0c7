// SPDX-FileCopyrightText: 2026 Cortex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parallel dispatch of independent requests.

use futures::future::join_all;
use tracing::debug;

use crate::supervisor::{Supervisor, SupervisorRequest, SupervisorResponse};

impl Supervisor {
    /// Supervise every request, up to `max_concurrent_workers` at a time.
    ///
    /// Chunks run one after another; requests inside a chunk run
    /// concurrently. Responses are returned in request order.
    pub async fn supervise_parallel(&self, requests: &[SupervisorRequest]) -> Vec<SupervisorResponse> {
        let chunk_size = self.settings().max_concurrent_workers.max(1);
        let mut responses = Vec::with_capacity(requests.len());
        for (index, chunk) in requests.chunks(chunk_size).enumerate() {
            debug!(chunk = index, size = chunk.len(), "dispatching batch");
            responses.extend(join_all(chunk.iter().map(|r| self.supervise(r))).await);
        }
        responses
    }
}
