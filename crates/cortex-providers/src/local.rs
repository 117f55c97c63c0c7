// SPDX-FileCopyrightText: 2026 Cortex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process backend that never calls a model.

use async_trait::async_trait;
use cortex_core::{Completion, CortexError, ProviderAdapter, WorkerRequest};

/// Characters of the user message echoed back in the placeholder.
const PREVIEW_CHARS: usize = 100;

/// Placeholder backend for trivial and local-only work. Zero usage.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalBackend;

#[async_trait]
impl ProviderAdapter for LocalBackend {
    fn name(&self) -> &str {
        "local"
    }

    async fn complete(&self, request: &WorkerRequest) -> Result<Completion, CortexError> {
        let preview: String = request.user_message.chars().take(PREVIEW_CHARS).collect();
        Ok(Completion {
            content: Some(format!(
                "Local processing not yet implemented for: {preview}"
            )),
            ..Completion::default()
        })
    }
}
