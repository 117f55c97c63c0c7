// SPDX-FileCopyrightText: 2026 Cortex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anthropic Claude adapter.

pub mod client;
pub mod types;

use async_trait::async_trait;
use cortex_catalog::spec;
use cortex_core::{Completion, CortexError, ProviderAdapter, ToolCall, WorkerRequest};

use self::client::AnthropicClient;
use self::types::{ApiMessage, MessageRequest, ResponseContentBlock, ToolDefinition};
use crate::DEFAULT_MAX_TOKENS;

/// Anthropic provider implementing [`ProviderAdapter`].
pub struct AnthropicProvider {
    client: AnthropicClient,
}

impl AnthropicProvider {
    pub fn new(api_key: &str, api_version: &str, base_url: &str) -> Result<Self, CortexError> {
        Ok(Self {
            client: AnthropicClient::new(api_key, api_version, base_url)?,
        })
    }

    /// Build the wire request. `max_tokens` is the model's output cap.
    fn to_message_request(request: &WorkerRequest) -> MessageRequest {
        let tools = (!request.tools.is_empty()).then(|| {
            request
                .tools
                .iter()
                .map(|t| ToolDefinition {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    input_schema: t.input_schema.clone(),
                })
                .collect()
        });

        MessageRequest {
            model: request.route.provider_model.clone(),
            messages: vec![ApiMessage {
                role: "user".into(),
                content: request.user_message.clone(),
            }],
            system: (!request.system_prompt.is_empty()).then(|| request.system_prompt.clone()),
            max_tokens: spec(request.selection.model)
                .max_output_tokens
                .unwrap_or(DEFAULT_MAX_TOKENS),
            tools,
        }
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn complete(&self, request: &WorkerRequest) -> Result<Completion, CortexError> {
        let api_request = Self::to_message_request(request);
        let response = self.client.complete_message(&api_request).await?;

        let mut text = Vec::new();
        let mut tool_calls = Vec::new();
        for block in response.content {
            match block {
                ResponseContentBlock::Text { text: t } => text.push(t),
                ResponseContentBlock::ToolUse { name, input, .. } => {
                    tool_calls.push(ToolCall { name, input });
                }
                ResponseContentBlock::Unsupported => {}
            }
        }

        Ok(Completion {
            content: (!text.is_empty()).then(|| text.join("")),
            tool_calls,
            input_tokens: response.usage.input_tokens,
            output_tokens: response.usage.output_tokens,
        })
    }
}
