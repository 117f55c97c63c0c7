// SPDX-FileCopyrightText: 2026 Cortex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for Chat Completions endpoints.

use std::time::Duration;

use cortex_core::CortexError;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use tracing::debug;

use crate::openai::types::{ChatErrorResponse, ChatRequest, ChatResponse};
use crate::status_error;

/// Client for `{base_url}/chat/completions` with bearer authentication.
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    endpoint: String,
    label: &'static str,
}

impl ChatClient {
    /// `extra_headers` are sent on every request (OpenRouter attribution).
    pub fn new(
        label: &'static str,
        api_key: &str,
        base_url: &str,
        extra_headers: &[(&'static str, &str)],
    ) -> Result<Self, CortexError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|e| {
                CortexError::Config(format!("invalid API key header value: {e}"))
            })?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for &(name, value) in extra_headers {
            headers.insert(
                HeaderName::from_static(name),
                HeaderValue::from_str(value).map_err(|e| {
                    CortexError::Config(format!("invalid {name} header value: {e}"))
                })?,
            );
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| CortexError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            label,
        })
    }

    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, CortexError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| CortexError::Provider {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, provider = self.label, model = %request.model, "chat response received");

        let body = response.text().await.map_err(|e| CortexError::Provider {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;

        if !status.is_success() {
            let detail = match serde_json::from_str::<ChatErrorResponse>(&body) {
                Ok(err) => match err.error.type_ {
                    Some(kind) => format!("{} API error ({kind}): {}", self.label, err.error.message),
                    None => format!("{} API error: {}", self.label, err.error.message),
                },
                Err(_) => body,
            };
            return Err(status_error(status, &detail));
        }

        serde_json::from_str(&body).map_err(|e| CortexError::Provider {
            message: format!("failed to parse API response: {e}"),
            source: Some(Box::new(e)),
        })
    }
}
