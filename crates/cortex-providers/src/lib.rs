// SPDX-FileCopyrightText: 2026 Cortex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapters and the worker executor for Cortex.
//!
//! Three backends sit behind one [`Execute`](cortex_core::Execute) capability:
//! the Anthropic Messages API, the OpenAI-compatible Chat Completions API
//! (used for both OpenAI direct and the OpenRouter aggregator), and a local
//! placeholder that never leaves the process.

pub mod anthropic;
pub mod executor;
pub mod local;
pub mod openai;

use cortex_core::CortexError;

pub use anthropic::AnthropicProvider;
pub use executor::{WorkerExecutor, execute_parallel, is_retriable_error, worker_timeout};
pub use local::LocalBackend;
pub use openai::OpenAiProvider;

/// Output budget when the catalog has no cap for a model.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Error for a non-2xx response. The status code is always in the message.
///
/// 429 is spelled out as "rate limited" so the retry classifier sees it.
pub(crate) fn status_error(status: reqwest::StatusCode, detail: &str) -> CortexError {
    let message = if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        format!("rate limited ({}): {detail}", status.as_u16())
    } else {
        format!("API returned {status}: {detail}")
    };
    CortexError::provider(message)
}
