use crate::protocol::session::types::{next_voice_state, VoiceEvent};
use crate::shared::entities::{VoiceSession, VoiceState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceCommand {
    Transition(VoiceState),
    IncrementWakeCount,
    RecordSpokenText(String),
}

/// Pure voice state machine: decides commands, no I/O.
pub struct VoiceStateMachine {
    state: VoiceState,
}

impl VoiceStateMachine {
    pub fn at(state: VoiceState) -> Self {
        Self { state }
    }

    pub fn process_event(&self, event: &VoiceEvent) -> Vec<VoiceCommand> {
        let next = next_voice_state(self.state, event);
        if next == self.state {
            return Vec::new();
        }
        let mut commands = vec![VoiceCommand::Transition(next)];
        match (next, event) {
            (VoiceState::WakeDetected, _) => commands.push(VoiceCommand::IncrementWakeCount),
            (VoiceState::Speaking, VoiceEvent::ResponseReady { text }) => {
                commands.push(VoiceCommand::RecordSpokenText(text.clone()))
            }
            _ => {}
        }
        commands
    }

    /// Feeds one event and applies the resulting commands to `session`.
    /// Returns the state before the event.
    pub fn step(session: &mut VoiceSession, event: &VoiceEvent) -> VoiceState {
        let previous = session.state;
        let commands = Self::at(previous).process_event(event);
        apply_commands(session, &commands);
        previous
    }
}

pub fn apply_commands(session: &mut VoiceSession, commands: &[VoiceCommand]) {
    for command in commands {
        match command {
            VoiceCommand::Transition(next) => session.state = *next,
            VoiceCommand::IncrementWakeCount => session.wake_count += 1,
            VoiceCommand::RecordSpokenText(text) => session.last_tts_text = text.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::entities::SessionId;

    fn session() -> VoiceSession {
        VoiceSession::new(SessionId::new("test").unwrap())
    }

    fn full_cycle() -> Vec<VoiceEvent> {
        vec![
            VoiceEvent::WakeDetected,
            VoiceEvent::VoiceValid,
            VoiceEvent::SpeechEnd,
            VoiceEvent::ResponseReady {
                text: "hello".to_string(),
            },
            VoiceEvent::TtsDone,
        ]
    }

    #[test]
    fn wake_emits_transition_and_counter() {
        let sm = VoiceStateMachine::at(VoiceState::Idle);
        assert_eq!(
            sm.process_event(&VoiceEvent::WakeDetected),
            vec![
                VoiceCommand::Transition(VoiceState::WakeDetected),
                VoiceCommand::IncrementWakeCount
            ]
        );
        assert!(sm.process_event(&VoiceEvent::SpeechEnd).is_empty());
    }

    #[test]
    fn full_conversation_cycle() {
        let mut s = session();
        for event in full_cycle() {
            VoiceStateMachine::step(&mut s, &event);
        }
        assert_eq!(s.state, VoiceState::Idle);
        assert_eq!(s.wake_count, 1);
        assert_eq!(s.last_tts_text, "hello");
    }

    #[test]
    fn replay_is_deterministic() {
        let mut events = full_cycle();
        events.push(VoiceEvent::Other("noise".to_string()));
        events.push(VoiceEvent::WakeDetected);
        events.push(VoiceEvent::Timeout);
        events.push(VoiceEvent::WakeDetected);

        let run = || {
            let mut s = session();
            for event in &events {
                VoiceStateMachine::step(&mut s, event);
            }
            (s.state, s.wake_count, s.last_tts_text)
        };
        let first = run();
        assert_eq!(first, run());
        assert_eq!(first, (VoiceState::WakeDetected, 3, "hello".to_string()));
    }

    #[test]
    fn response_outside_thinking_keeps_last_text() {
        let mut s = session();
        s.last_tts_text = "before".to_string();
        let previous = VoiceStateMachine::step(
            &mut s,
            &VoiceEvent::ResponseReady {
                text: "after".to_string(),
            },
        );
        assert_eq!(previous, VoiceState::Idle);
        assert_eq!(s.state, VoiceState::Idle);
        assert_eq!(s.last_tts_text, "before");
    }
}
