use std::future::Future;
use std::pin::Pin;

pub mod llm;

pub use llm::LlmPort;

pub use crate::shared::entities::{ConversationTurn as ChatMessage, TurnRole as Role};
pub use crate::shared::error::ai::LlmError;

pub type AiFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;
