pub mod identifiers;
pub mod session;

pub use identifiers::{SessionId, SessionIdError};
pub use session::{ConversationTurn, TurnRole, VoiceSession, VoiceState};
