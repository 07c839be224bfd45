use serde_json::Value;

use crate::shared::entities::VoiceState;

/// Event reported by the audio front end. Names outside the known set are kept as
/// `Other` and never change the state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceEvent {
    WakeDetected,
    VoiceValid,
    VoiceInvalid,
    Timeout,
    SpeechEnd,
    ResponseReady { text: String },
    TtsDone,
    Other(String),
}

impl VoiceEvent {
    /// Builds an event from its wire name and optional payload. Only `response_ready`
    /// reads the payload (`data.text`, empty when absent).
    pub fn parse(name: &str, data: Option<&Value>) -> Self {
        match name {
            "wake_detected" => Self::WakeDetected,
            "voice_valid" => Self::VoiceValid,
            "voice_invalid" => Self::VoiceInvalid,
            "timeout" => Self::Timeout,
            "speech_end" => Self::SpeechEnd,
            "response_ready" => Self::ResponseReady {
                text: data
                    .and_then(|d| d.get("text"))
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            },
            "tts_done" => Self::TtsDone,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::WakeDetected => "wake_detected",
            Self::VoiceValid => "voice_valid",
            Self::VoiceInvalid => "voice_invalid",
            Self::Timeout => "timeout",
            Self::SpeechEnd => "speech_end",
            Self::ResponseReady { .. } => "response_ready",
            Self::TtsDone => "tts_done",
            Self::Other(name) => name,
        }
    }
}

pub fn next_voice_state(current: VoiceState, event: &VoiceEvent) -> VoiceState {
    use VoiceEvent as E;
    use VoiceState as S;
    match (current, event) {
        (S::Idle, E::WakeDetected) => S::WakeDetected,
        (S::WakeDetected, E::VoiceValid) => S::Listening,
        (S::WakeDetected, E::VoiceInvalid | E::Timeout) => S::Idle,
        (S::Listening, E::SpeechEnd) => S::Thinking,
        (S::Listening, E::Timeout) => S::Idle,
        (S::Thinking, E::ResponseReady { .. }) => S::Speaking,
        (S::Speaking, E::TtsDone) => S::Idle,
        (state, _) => state,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_known_and_unknown_names() {
        assert_eq!(VoiceEvent::parse("wake_detected", None), VoiceEvent::WakeDetected);
        assert_eq!(
            VoiceEvent::parse("response_ready", Some(&json!({"text": "hello"}))),
            VoiceEvent::ResponseReady {
                text: "hello".to_string()
            }
        );
        assert_eq!(
            VoiceEvent::parse("response_ready", Some(&json!({"text": 5}))),
            VoiceEvent::ResponseReady {
                text: String::new()
            }
        );
        let other = VoiceEvent::parse("dance", None);
        assert_eq!(other, VoiceEvent::Other("dance".to_string()));
        assert_eq!(other.name(), "dance");
    }

    #[test]
    fn timeout_returns_to_idle_only_while_waiting() {
        assert_eq!(
            next_voice_state(VoiceState::WakeDetected, &VoiceEvent::Timeout),
            VoiceState::Idle
        );
        assert_eq!(
            next_voice_state(VoiceState::Listening, &VoiceEvent::Timeout),
            VoiceState::Idle
        );
        assert_eq!(
            next_voice_state(VoiceState::Thinking, &VoiceEvent::Timeout),
            VoiceState::Thinking
        );
        assert_eq!(
            next_voice_state(VoiceState::Speaking, &VoiceEvent::Timeout),
            VoiceState::Speaking
        );
    }

    #[test]
    fn unlisted_pairs_are_no_ops() {
        let states = [
            VoiceState::Idle,
            VoiceState::WakeDetected,
            VoiceState::Listening,
            VoiceState::Thinking,
            VoiceState::Speaking,
        ];
        for state in states {
            assert_eq!(
                next_voice_state(state, &VoiceEvent::Other("x".to_string())),
                state
            );
        }
        assert_eq!(
            next_voice_state(VoiceState::Idle, &VoiceEvent::TtsDone),
            VoiceState::Idle
        );
        assert_eq!(
            next_voice_state(VoiceState::Speaking, &VoiceEvent::WakeDetected),
            VoiceState::Speaking
        );
    }
}
