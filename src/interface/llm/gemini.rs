use std::time::Duration;

use anyhow::Result;
use log::{debug, info};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use super::{http_client, to_llm_error};
use crate::shared::constants::ASSISTANT_NAME;
use crate::shared::error::ai::LlmError;
use crate::shared::ports::ai::{AiFuture, ChatMessage, LlmPort, Role};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    top_p: f32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiContentOut,
}

#[derive(Deserialize)]
struct GeminiContentOut {
    #[serde(default)]
    parts: Vec<GeminiPartOut>,
}

#[derive(Deserialize)]
struct GeminiPartOut {
    #[serde(default)]
    text: String,
}

/// Gemini `generateContent`. The conversation is flattened into one prompt.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    max_output_tokens: u32,
    base_url: String,
}

impl GeminiClient {
    pub fn new(
        api_key: String,
        model: String,
        max_output_tokens: u32,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            api_key,
            model,
            max_output_tokens,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn call(self, system_prompt: String, messages: Vec<ChatMessage>) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );
        let req = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: flatten_prompt(&system_prompt, &messages),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.7,
                max_output_tokens: self.max_output_tokens,
                top_p: 0.9,
            },
        };

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&req)
            .send()
            .await?;
        let status = resp.status();
        let body_text = resp.text().await?;
        info!("[llm] gemini status={}", status);
        debug!("[llm] gemini body_len={}", body_text.len());

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimited.into());
        }
        if !status.is_success() {
            anyhow::bail!("Gemini HTTP error {}: {}", status, body_text);
        }
        parse_reply(&body_text)
    }
}

fn flatten_prompt(system_prompt: &str, messages: &[ChatMessage]) -> String {
    let conversation = messages
        .iter()
        .map(|m| {
            let speaker = match m.role {
                Role::User => "Uživatel",
                Role::Assistant => ASSISTANT_NAME,
            };
            format!("{}: {}", speaker, m.content)
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "{}\n\nKonverzace:\n{}\n\n{}:",
        system_prompt, conversation, ASSISTANT_NAME
    )
}

fn parse_reply(body_text: &str) -> Result<String> {
    let body: GeminiResponse = serde_json::from_str(body_text)?;
    let text = body
        .candidates
        .and_then(|c| c.into_iter().next())
        .and_then(|c| c.content.parts.into_iter().next())
        .map(|p| p.text.trim().to_string())
        .unwrap_or_default();
    if text.is_empty() {
        return Err(LlmError::EmptyResponse.into());
    }
    Ok(text)
}

impl LlmPort for GeminiClient {
    fn provider(&self) -> &'static str {
        "gemini"
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_labels_speakers() {
        let messages = vec![
            ChatMessage {
                role: Role::User,
                content: "Ahoj".to_string(),
            },
            ChatMessage {
                role: Role::Assistant,
                content: "Dobrý den".to_string(),
            },
        ];
        let prompt = flatten_prompt("SYS", &messages);
        assert_eq!(
            prompt,
            "SYS\n\nKonverzace:\nUživatel: Ahoj\nRadim: Dobrý den\n\nRadim:"
        );
    }

    #[test]
    fn first_candidate_text_is_used() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"  Ano. "}]}}]}"#;
        assert_eq!(parse_reply(body).unwrap(), "Ano.");
    }

    #[test]
    fn missing_candidates_is_empty_response() {
        let err = parse_reply(r#"{"candidates":[]}"#).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LlmError>(),
            Some(LlmError::EmptyResponse)
        ));
    }

    #[tokio::test]
    async fn transport_errors_do_not_carry_the_api_key() {
        let client = GeminiClient::new(
            "SECRET-KEY-123".to_string(),
            "m".to_string(),
            10,
            Duration::from_secs(2),
        )
        .unwrap()
        .with_base_url("http://127.0.0.1:1");
        let err = client
            .generate_answer("SYS".to_string(), Vec::new())
            .await
            .unwrap_err();
        assert!(!err.to_string().contains("SECRET-KEY-123"));
    }

    #[test]
    fn request_uses_camel_case_config() {
        let req = GeminiRequest {
            contents: Vec::new(),
            generation_config: GenerationConfig {
                temperature: 0.5,
                max_output_tokens: 100,
                top_p: 0.5,
            },
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 100);
        assert_eq!(json["generationConfig"]["topP"], 0.5);
    }
}
