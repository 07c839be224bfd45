use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Generation failed: {0}")]
    GenerationFailed(String),
    #[error("Rate limited")]
    RateLimited,
    #[error("Timeout")]
    Timeout,
    #[error("Empty response")]
    EmptyResponse,
}
