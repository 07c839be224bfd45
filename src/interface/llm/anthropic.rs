use std::time::Duration;

use anyhow::Result;
use log::{debug, info};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use super::{http_client, to_llm_error};
use crate::shared::error::ai::LlmError;
use crate::shared::ports::ai::{AiFuture, ChatMessage, LlmPort};

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const API_VERSION: &str = "2023-06-01";

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: String,
    messages: Vec<ChatMessage>,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

/// Anthropic Messages API.
#[derive(Clone)]
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    model: String,
    max_tokens: u32,
    base_url: String,
}

impl AnthropicClient {
    pub fn new(api_key: String, model: String, max_tokens: u32, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            api_key,
            model,
            max_tokens,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn call(self, system_prompt: String, messages: Vec<ChatMessage>) -> Result<String> {
        let url = format!("{}/messages", self.base_url.trim_end_matches('/'));
        let req = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system: system_prompt,
            messages,
        };

        let resp = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&req)
            .send()
            .await?;
        let status = resp.status();
        let body_text = resp.text().await?;
        info!("[llm] claude status={}", status);
        debug!("[llm] claude body_len={}", body_text.len());

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimited.into());
        }
        if !status.is_success() {
            anyhow::bail!("Anthropic HTTP error {}: {}", status, body_text);
        }
        parse_reply(&body_text)
    }
}

fn parse_reply(body_text: &str) -> Result<String> {
    let body: MessagesResponse = serde_json::from_str(body_text)?;
    let text = body
        .content
        .into_iter()
        .next()
        .map(|block| block.text.trim().to_string())
        .unwrap_or_default();
    if text.is_empty() {
        return Err(LlmError::EmptyResponse.into());
    }
    Ok(text)
}

impl LlmPort for AnthropicClient {
    fn provider(&self) -> &'static str {
        "claude"
    }

    fn generate_answer(
        &self,
        system_prompt: String,
        messages: Vec<ChatMessage>,
    ) -> AiFuture<Result<String, LlmError>> {
        let this = self.clone();
        Box::pin(async move {
            this.call(system_prompt, messages)
                .await
                .map_err(to_llm_error)
        })
    }
}
