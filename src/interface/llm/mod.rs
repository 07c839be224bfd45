//! llm: HTTP clients for the hosted text-generation APIs.
//! - Each client implements `LlmPort`; the voice chat decides the fallback order.
//! - Only plain text generation is used. No streaming, tools or images.

mod anthropic;
mod gemini;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use log::{info, warn};
use reqwest::Client;

use crate::shared::config::{self, AiConfig};
use crate::shared::error::ai::LlmError;
use crate::shared::ports::ai::LlmPort;

pub use anthropic::AnthropicClient;
pub use gemini::GeminiClient;

fn http_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder().timeout(timeout).build()?)
}

/// Maps a transport or API failure to the port error. Request URLs are dropped from
/// transport errors before they reach the message.
fn to_llm_error(err: anyhow::Error) -> LlmError {
    let err = match err.downcast::<LlmError>() {
        Ok(llm) => return llm,
        Err(other) => other,
    };
    match err.downcast::<reqwest::Error>() {
        Ok(req) if req.is_timeout() => LlmError::Timeout,
        Ok(req) => LlmError::GenerationFailed(req.without_url().to_string()),
        Err(other) => LlmError::GenerationFailed(other.to_string()),
    }
}

/// Providers in priority order: Gemini, then Anthropic. Unconfigured ones are skipped.
pub fn build_providers(cfg: &AiConfig) -> Vec<Arc<dyn LlmPort>> {
    let timeout = config::timeouts().ai_http;
    let mut providers: Vec<Arc<dyn LlmPort>> = Vec::new();

    if let Some(key) = &cfg.gemini_api_key {
        match GeminiClient::new(key.clone(), cfg.gemini_model.clone(), cfg.max_output_tokens, timeout) {
            Ok(client) => providers.push(Arc::new(client)),
            Err(e) => warn!("[llm] gemini client init failed: {:?}", e),
        }
    }
    if let Some(key) = &cfg.anthropic_api_key {
        match AnthropicClient::new(
            key.clone(),
            cfg.anthropic_model.clone(),
            cfg.max_output_tokens,
            timeout,
        ) {
            Ok(client) => providers.push(Arc::new(client)),
            Err(e) => warn!("[llm] anthropic client init failed: {:?}", e),
        }
    }

    let names: Vec<&str> = providers.iter().map(|p| p.provider()).collect();
    info!("[llm] providers={:?}", names);
    providers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn llm_errors_pass_through() {
        let err = anyhow::Error::new(LlmError::RateLimited);
        assert!(matches!(to_llm_error(err), LlmError::RateLimited));
        let err = anyhow::anyhow!("Gemini HTTP error 500");
        assert!(matches!(
            to_llm_error(err),
            LlmError::GenerationFailed(msg) if msg.contains("500")
        ));
    }

    #[test]
    fn no_keys_no_providers() {
        let cfg = AiConfig {
            gemini_api_key: None,
            gemini_model: "gemini-2.0-flash".to_string(),
            anthropic_api_key: None,
            anthropic_model: "claude-3-haiku-20240307".to_string(),
            max_output_tokens: 100,
        };
        assert!(build_providers(&cfg).is_empty());
    }

    #[test]
    fn configured_providers_keep_priority() {
        let cfg = AiConfig {
            gemini_api_key: Some("g".to_string()),
            gemini_model: "gemini-2.0-flash".to_string(),
            anthropic_api_key: Some("a".to_string()),
            anthropic_model: "claude-3-haiku-20240307".to_string(),
            max_output_tokens: 100,
        };
        let names: Vec<&str> = build_providers(&cfg).iter().map(|p| p.provider()).collect();
        assert_eq!(names, vec!["gemini", "claude"]);
    }
}
