pub mod ai;
pub mod history;
pub mod session_store;

pub use history::{HistoryEntry, HistoryPort, SpeechSnapshot};
pub use session_store::{SessionHandle, SessionStore};
