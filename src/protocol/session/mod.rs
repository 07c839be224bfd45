//! Voice channel lifecycle: event parsing, the pure state machine and the
//! in-memory session store.

pub mod state_machine;
pub mod store;
pub mod types;

pub use state_machine::{apply_commands, VoiceCommand, VoiceStateMachine};
pub use store::InMemorySessionStore;
pub use types::{next_voice_state, VoiceEvent};
