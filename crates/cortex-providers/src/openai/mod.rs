// SPDX-FileCopyrightText: 2026 Cortex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat Completions adapters: OpenAI direct and the OpenRouter aggregator.
//!
//! Both speak the same wire format. OpenRouter additionally sends
//! attribution headers and always asks for a fixed output budget, since the
//! aggregator's per-model caps are not in the catalog.

pub mod client;
pub mod types;

use async_trait::async_trait;
use cortex_catalog::spec;
use cortex_config::model::OpenRouterConfig;
use cortex_core::{Completion, CortexError, ProviderAdapter, ToolCall, WorkerRequest};
use tracing::warn;

use self::client::ChatClient;
use self::types::{ChatMessage, ChatRequest, ChatTool, FunctionSpec, ResponseFormat};
use crate::DEFAULT_MAX_TOKENS;

/// An OpenAI-compatible provider implementing [`ProviderAdapter`].
pub struct OpenAiProvider {
    name: &'static str,
    client: ChatClient,
    /// Fixed `max_tokens`; `None` uses the model's catalog cap.
    fixed_max_tokens: Option<u32>,
}

impl OpenAiProvider {
    /// Direct OpenAI API.
    pub fn openai(api_key: &str, base_url: &str) -> Result<Self, CortexError> {
        Ok(Self {
            name: "openai",
            client: ChatClient::new("OpenAI", api_key, base_url, &[])?,
            fixed_max_tokens: None,
        })
    }

    /// OpenRouter aggregator with `HTTP-Referer` / `X-Title` attribution.
    pub fn openrouter(api_key: &str, config: &OpenRouterConfig) -> Result<Self, CortexError> {
        let headers = [
            ("http-referer", config.referer.as_str()),
            ("x-title", config.title.as_str()),
        ];
        Ok(Self {
            name: "openrouter",
            client: ChatClient::new("OpenRouter", api_key, &config.base_url, &headers)?,
            fixed_max_tokens: Some(DEFAULT_MAX_TOKENS),
        })
    }

    fn to_chat_request(&self, request: &WorkerRequest) -> ChatRequest {
        let tools = (!request.tools.is_empty()).then(|| {
            request
                .tools
                .iter()
                .map(|t| ChatTool {
                    kind: "function",
                    function: FunctionSpec {
                        name: t.name.clone(),
                        description: t.description.clone(),
                        parameters: t.input_schema.clone(),
                    },
                })
                .collect()
        });

        let max_tokens = self.fixed_max_tokens.unwrap_or_else(|| {
            spec(request.selection.model)
                .max_output_tokens
                .unwrap_or(DEFAULT_MAX_TOKENS)
        });

        ChatRequest {
            model: request.route.provider_model.clone(),
            messages: vec![
                ChatMessage::new("system", &request.system_prompt),
                ChatMessage::new("user", &request.user_message),
            ],
            max_tokens,
            tools,
            response_format: request.json_mode.then(ResponseFormat::json_object),
        }
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiProvider {
    fn name(&self) -> &str {
        self.name
    }

    async fn complete(&self, request: &WorkerRequest) -> Result<Completion, CortexError> {
        let response = self.client.chat(&self.to_chat_request(request)).await?;
        let usage = response.usage.unwrap_or_default();

        let message = response.choices.into_iter().next().map(|c| c.message);
        let (content, tool_calls) = match message {
            Some(m) => {
                let calls = m
                    .tool_calls
                    .into_iter()
                    .map(|tc| {
                        let input = serde_json::from_str(&tc.function.arguments).unwrap_or_else(|e| {
                            warn!(
                                task_id = %request.profile.task_id,
                                tool = %tc.function.name,
                                error = %e,
                                "tool arguments are not valid JSON, keeping raw string"
                            );
                            serde_json::Value::String(tc.function.arguments.clone())
                        });
                        ToolCall {
                            name: tc.function.name,
                            input,
                        }
                    })
                    .collect();
                (m.content.filter(|c| !c.is_empty()), calls)
            }
            None => (None, Vec::new()),
        };

        Ok(Completion {
            content,
            tool_calls,
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
        })
    }
}
