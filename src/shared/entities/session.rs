use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::entities::identifiers::SessionId;

/// Voice channel phase. Changes only through `protocol::session::state_machine`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceState {
    Idle,
    WakeDetected,
    Listening,
    Thinking,
    Speaking,
}

impl VoiceState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::WakeDetected => "wake_detected",
            Self::Listening => "listening",
            Self::Thinking => "thinking",
            Self::Speaking => "speaking",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub content: String,
}

/// Per-channel runtime record.
#[derive(Debug, Clone)]
pub struct VoiceSession {
    pub id: SessionId,
    pub state: VoiceState,
    /// Load index C(t), kept within [0, 50] by the control law.
    pub load: f64,
    /// Coherence κ(t) in [0, 1].
    pub kappa: f64,
    /// Regulation α(t) in [0, 1].
    pub alpha: f64,
    pub last_tts_text: String,
    /// Append-only.
    pub conversation: Vec<ConversationTurn>,
    pub wake_count: u64,
    pub created: DateTime<Utc>,
}

impl VoiceSession {
    pub const INITIAL_LOAD: f64 = 5.0;
    pub const INITIAL_KAPPA: f64 = 0.8;
    pub const INITIAL_ALPHA: f64 = 0.0;

    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            state: VoiceState::Idle,
            load: Self::INITIAL_LOAD,
            kappa: Self::INITIAL_KAPPA,
            alpha: Self::INITIAL_ALPHA,
            last_tts_text: String::new(),
            conversation: Vec::new(),
            wake_count: 0,
            created: Utc::now(),
        }
    }

    pub fn push_turn(&mut self, role: TurnRole, content: impl Into<String>) {
        self.conversation.push(ConversationTurn {
            role,
            content: content.into(),
        });
    }
}
