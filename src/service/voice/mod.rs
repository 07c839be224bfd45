//! Voice runtime: per-session metrics, the voice state machine and the spoken chat.
//!
//! Every operation locks exactly one session for its whole read-modify-write.

pub mod chat;
pub mod prompt;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::protocol::session::{VoiceEvent, VoiceStateMachine};
use crate::service::control_law::{
    compute_alpha, compute_c, compute_kappa, BioReading, SensorReading, SystemState, TtsProfile,
};
use crate::service::relevance::classify;
use crate::shared::constants::{
    DELTA, FIBONACCI, PHI, RADIM_R, THRESHOLD_CRISIS, THRESHOLD_HARMONY,
};
use crate::shared::entities::{SessionId, TurnRole, VoiceState};
use crate::shared::error::runtime::ValidationError;
use crate::shared::lexicon::Lexicon;
use crate::shared::ports::ai::ChatMessage;
use crate::shared::ports::SessionStore;
use crate::shared::utils::{lenient, mask_pii, round_to};

pub use chat::{clean_for_tts, ChatReply, VoiceChat};
pub use prompt::{runtime_prompt, voice_system_prompt};

pub const SERVICE_NAME: &str = "RADIM Voice Runtime";
pub const SERVICE_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MetricsRequest {
    #[serde(deserialize_with = "lenient::option")]
    pub session_id: Option<String>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub sensors: SensorReading,
    #[serde(deserialize_with = "lenient::or_default")]
    pub bio: BioReading,
    #[serde(deserialize_with = "lenient::option")]
    pub user_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsReport {
    #[serde(rename = "C")]
    pub c: f64,
    pub kappa: f64,
    pub alpha: f64,
    pub system_state: &'static str,
    pub relevance: f64,
    pub echo_similarity: f64,
    pub is_echo: bool,
    pub should_respond: bool,
    pub tts_params: TtsProfile,
    pub fibonacci_pause_ms: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TransitionRequest {
    #[serde(deserialize_with = "lenient::option")]
    pub session_id: Option<String>,
    #[serde(deserialize_with = "lenient::option")]
    pub event: Option<String>,
    pub data: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    #[serde(rename = "C")]
    pub c: f64,
    pub kappa: f64,
    pub wake_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionReport {
    pub previous_state: VoiceState,
    pub current_state: VoiceState,
    pub event: String,
    pub session: SessionSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionMetrics {
    #[serde(rename = "C")]
    pub c: f64,
    pub kappa: f64,
    pub alpha: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionInfo {
    pub session_id: String,
    pub state: VoiceState,
    pub metrics: SessionMetrics,
    pub system_state: &'static str,
    pub wake_count: u64,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Constants {
    pub phi: f64,
    pub delta: f64,
    pub radim_r: f64,
}

impl Constants {
    fn current() -> Self {
        Self {
            phi: PHI,
            delta: DELTA,
            radim_r: RADIM_R,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VoiceThresholds {
    pub harmony: f64,
    pub alert: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoiceHealth {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub constants: Constants,
    pub thresholds: VoiceThresholds,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuntimePrompt {
    pub prompt: String,
    pub version: &'static str,
    pub constants: Constants,
}

pub struct VoiceRuntime {
    store: Arc<dyn SessionStore>,
    lexicon: Lexicon,
    strict: bool,
}

impl VoiceRuntime {
    pub fn new(store: Arc<dyn SessionStore>, lexicon: Lexicon, strict: bool) -> Self {
        Self {
            store,
            lexicon,
            strict,
        }
    }

    /// Computes C, band, α, κ and the relevance verdict for one utterance, then stores
    /// C, κ and α on the session. Echo is judged against the session's last spoken text.
    pub async fn compute_metrics(
        &self,
        req: &MetricsRequest,
    ) -> Result<MetricsReport, ValidationError> {
        if self.strict {
            req.sensors.validate()?;
            req.bio.validate()?;
        }
        let id = SessionId::or_default(req.session_id.as_deref());
        let user_text = req.user_text.as_deref().unwrap_or("");

        let handle = self.store.get_or_create(&id);
        let mut session = handle.lock().await;

        let c = compute_c(&req.sensors, &req.bio);
        let state = SystemState::from_load(c);
        let alpha = compute_alpha(state, user_text, &self.lexicon);
        let kappa = compute_kappa(c, alpha, session.kappa);
        let verdict = classify(user_text, &session.last_tts_text, &self.lexicon);

        session.load = c;
        session.kappa = kappa;
        session.alpha = alpha;

        info!(
            "[voice] metrics session_id={} C={:.2} state={} respond={} text={}",
            id,
            c,
            state.czech_label(),
            verdict.should_respond,
            mask_pii(user_text)
        );

        Ok(MetricsReport {
            c: round_to(c, 2),
            kappa: round_to(kappa, 3),
            alpha: round_to(alpha, 2),
            system_state: state.czech_label(),
            relevance: round_to(verdict.relevance, 2),
            echo_similarity: round_to(verdict.echo_similarity, 2),
            is_echo: verdict.is_echo,
            should_respond: verdict.should_respond,
            tts_params: TtsProfile::for_state(state),
            fibonacci_pause_ms: FIBONACCI[5] * 100,
        })
    }

    pub async fn apply_event(&self, req: &TransitionRequest) -> TransitionReport {
        let id = SessionId::or_default(req.session_id.as_deref());
        let event = VoiceEvent::parse(req.event.as_deref().unwrap_or(""), req.data.as_ref());

        let handle = self.store.get_or_create(&id);
        let mut session = handle.lock().await;
        let previous = VoiceStateMachine::step(&mut session, &event);

        if previous == session.state {
            debug!(
                "[voice] event ignored session_id={} state={} event={}",
                id,
                previous.as_str(),
                event.name()
            );
        } else {
            info!(
                "[voice] transition session_id={} {} -> {} event={}",
                id,
                previous.as_str(),
                session.state.as_str(),
                event.name()
            );
        }

        TransitionReport {
            previous_state: previous,
            current_state: session.state,
            event: event.name().to_string(),
            session: SessionSummary {
                c: session.load,
                kappa: session.kappa,
                wake_count: session.wake_count,
            },
        }
    }

    pub async fn session_info(&self, session_id: &str) -> SessionInfo {
        let id = SessionId::or_default(Some(session_id));
        let handle = self.store.get_or_create(&id);
        let session = handle.lock().await;
        SessionInfo {
            session_id: id.to_string(),
            state: session.state,
            metrics: SessionMetrics {
                c: session.load,
                kappa: session.kappa,
                alpha: session.alpha,
            },
            system_state: SystemState::from_load(session.load).czech_label(),
            wake_count: session.wake_count,
            created: session.created,
        }
    }

    /// Stores a finished chat exchange: the reply becomes the echo reference and both
    /// turns are appended to the conversation.
    pub async fn record_exchange(&self, session_id: Option<&str>, user_text: &str, reply: &str) {
        let id = SessionId::or_default(session_id);
        let handle = self.store.get_or_create(&id);
        let mut session = handle.lock().await;
        session.last_tts_text = reply.to_string();
        session.push_turn(TurnRole::User, user_text);
        session.push_turn(TurnRole::Assistant, reply);
    }

    pub fn health(&self) -> VoiceHealth {
        VoiceHealth {
            status: "healthy",
            service: SERVICE_NAME,
            version: SERVICE_VERSION,
            constants: Constants::current(),
            thresholds: VoiceThresholds {
                harmony: THRESHOLD_HARMONY,
                alert: THRESHOLD_CRISIS,
            },
        }
    }

    pub fn voice_prompt(&self) -> RuntimePrompt {
        RuntimePrompt {
            prompt: runtime_prompt(),
            version: SERVICE_VERSION,
            constants: Constants::current(),
        }
    }
}

/// Loose chat message as sent by clients: any role other than `assistant` is the user.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IncomingMessage {
    #[serde(deserialize_with = "lenient::option")]
    pub role: Option<String>,
    #[serde(deserialize_with = "lenient::option")]
    pub content: Option<String>,
}

impl From<&IncomingMessage> for ChatMessage {
    fn from(msg: &IncomingMessage) -> Self {
        let role = match msg.role.as_deref() {
            Some("assistant") => TurnRole::Assistant,
            _ => TurnRole::User,
        };
        ChatMessage {
            role,
            content: msg.content.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChatRequest {
    #[serde(deserialize_with = "lenient::option")]
    pub session_id: Option<String>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub messages: Vec<IncomingMessage>,
}

impl ChatRequest {
    pub fn to_messages(&self) -> Result<Vec<ChatMessage>, ValidationError> {
        if self.messages.is_empty() {
            return Err(ValidationError::Required("messages"));
        }
        Ok(self.messages.iter().map(ChatMessage::from).collect())
    }
}

/// Runs one chat turn and records it on the session.
pub async fn chat_turn(
    runtime: &VoiceRuntime,
    chat: &VoiceChat,
    req: &ChatRequest,
) -> Result<ChatReply, ValidationError> {
    let messages = req.to_messages()?;
    let reply = chat.respond(&messages).await;
    let last_user = messages.last().map(|m| m.content.as_str()).unwrap_or("");
    runtime
        .record_exchange(req.session_id.as_deref(), last_user, &reply.response)
        .await;
    Ok(reply)
}
