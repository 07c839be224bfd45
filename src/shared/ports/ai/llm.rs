use crate::shared::error::ai::LlmError;

use super::{AiFuture, ChatMessage};

/// Text generation backend: system prompt plus recent turns in, reply text out.
pub trait LlmPort: Send + Sync {
    /// Short provider name reported to clients ("gemini", "claude", ...).
    fn provider(&self) -> &'static str;

    fn generate_answer(
        &self,
        system_prompt: String,
        messages: Vec<ChatMessage>,
    ) -> AiFuture<Result<String, LlmError>>;
}
