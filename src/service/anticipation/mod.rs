//! Anticipation engine: trends, one-step prediction, emotions, speech controls and
//! breakpoints for a single reading. Trend continuity is the caller's job; every
//! reading is computed from the request alone and then appended to the audit history.

pub mod breakpoint;
pub mod emotion;
pub mod instructions;
pub mod predictor;
pub mod speech;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::service::control_law::load::require;
use crate::service::control_law::{ema_trend, SystemState};
use crate::shared::constants::{
    DEFAULT_MEMORY_FACTOR, LAMBDA_ALPHA, LAMBDA_C, PHI, PREDICTION_LOAD_MAX, THRESHOLD_CRISIS,
    THRESHOLD_HARMONY,
};
use crate::shared::error::runtime::ValidationError;
use crate::shared::ports::{HistoryEntry, HistoryPort, SpeechSnapshot};
use crate::shared::utils::{lenient, round_to};

pub use breakpoint::{detect_breakpoints, Boundary, Breakpoint, Direction};
pub use emotion::{emotion_vector, EmotionVector};
pub use instructions::orchestrator_instructions;
pub use predictor::{predict_alpha, predict_c};
pub use speech::{render_ssml, speech_params, SpeechBaseline, SpeechParams, SSML_VOICE};

pub const SERVICE_NAME: &str = "Anticipation Engine";
pub const SERVICE_VERSION: &str = "1.0.0";
pub const DEFAULT_USER_ID: &str = "global";
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

const DEFAULT_C: f64 = 10.0;
const DEFAULT_ALPHA: f64 = 0.3;

/// Body of a prediction request. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PredictionRequest {
    #[serde(rename = "C", deserialize_with = "lenient::option")]
    pub c: Option<f64>,
    #[serde(deserialize_with = "lenient::option")]
    pub alpha: Option<f64>,
    #[serde(rename = "C_prev", deserialize_with = "lenient::option")]
    pub c_prev: Option<f64>,
    #[serde(deserialize_with = "lenient::option")]
    pub alpha_prev: Option<f64>,
    #[serde(rename = "trend_C", deserialize_with = "lenient::option")]
    pub trend_c: Option<f64>,
    #[serde(deserialize_with = "lenient::option")]
    pub trend_alpha: Option<f64>,
    #[serde(deserialize_with = "lenient::option")]
    pub user_id: Option<String>,
    #[serde(deserialize_with = "lenient::option")]
    pub current_speech: Option<SpeechBaseline>,
}

/// Resolved prediction inputs with defaults applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionInput {
    pub c: f64,
    pub alpha: f64,
    pub c_prev: f64,
    pub alpha_prev: f64,
    pub trend_c: f64,
    pub trend_alpha: f64,
}

impl PredictionRequest {
    /// Applies defaults: `C = 10`, `alpha = 0.3`, previous values equal to the current
    /// ones and zero trends. With `strict` set, `C` and `alpha` must be present and every
    /// supplied number finite.
    pub fn resolve(&self, strict: bool) -> Result<PredictionInput, ValidationError> {
        let (c, alpha) = if strict {
            (require("C", self.c)?, require("alpha", self.alpha)?)
        } else {
            (
                self.c.unwrap_or(DEFAULT_C),
                self.alpha.unwrap_or(DEFAULT_ALPHA),
            )
        };
        let input = PredictionInput {
            c,
            alpha,
            c_prev: self.c_prev.unwrap_or(c),
            alpha_prev: self.alpha_prev.unwrap_or(alpha),
            trend_c: self.trend_c.unwrap_or(0.0),
            trend_alpha: self.trend_alpha.unwrap_or(0.0),
        };
        if strict {
            for (field, value) in [
                ("C_prev", input.c_prev),
                ("alpha_prev", input.alpha_prev),
                ("trend_C", input.trend_c),
                ("trend_alpha", input.trend_alpha),
            ] {
                require(field, Some(value))?;
            }
        }
        Ok(input)
    }

    pub fn user_id(&self) -> &str {
        self.user_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or(DEFAULT_USER_ID)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateBlock {
    #[serde(rename = "C")]
    pub c: f64,
    pub alpha: f64,
    pub state: SystemState,
    pub emotions: EmotionVector,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Trends {
    #[serde(rename = "C")]
    pub c: f64,
    pub alpha: f64,
}

/// One prediction cycle, rounded for the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnticipationReading {
    pub current: StateBlock,
    pub predicted: StateBlock,
    pub trends: Trends,
    pub speech_params: SpeechParams,
    pub breakpoints: Vec<Breakpoint>,
    pub orchestrator_instructions: String,
    pub phi: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SpeechAdjustRequest {
    #[serde(deserialize_with = "lenient::option")]
    pub text: Option<String>,
    #[serde(rename = "C", deserialize_with = "lenient::option")]
    pub c: Option<f64>,
    #[serde(deserialize_with = "lenient::option")]
    pub alpha: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeechAdjustment {
    pub ssml: String,
    pub params: SpeechParams,
    pub voice: &'static str,
    pub state: SystemState,
    pub emotions: EmotionVector,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryPage {
    pub history: Vec<HistoryEntry>,
    pub count: usize,
    pub user_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Thresholds {
    pub harmony: f64,
    pub alert: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnticipationHealth {
    pub service: &'static str,
    pub version: &'static str,
    pub phi: f64,
    pub thresholds: Thresholds,
    pub timestamp: DateTime<Utc>,
}

pub struct AnticipationService {
    history: Arc<dyn HistoryPort>,
    strict: bool,
}

impl AnticipationService {
    pub fn new(history: Arc<dyn HistoryPort>, strict: bool) -> Self {
        Self { history, strict }
    }

    pub fn predict(&self, req: &PredictionRequest) -> Result<AnticipationReading, ValidationError> {
        let input = req.resolve(self.strict)?;
        let user_id = req.user_id();

        let trend_c = ema_trend(input.c, input.c_prev, input.trend_c, LAMBDA_C);
        let trend_alpha = ema_trend(input.alpha, input.alpha_prev, input.trend_alpha, LAMBDA_ALPHA);

        let c_pred = predict_c(input.c, trend_c, input.alpha);
        let alpha_pred = predict_alpha(input.alpha, trend_alpha);

        let state_now = SystemState::from_load(input.c);
        let state_pred = SystemState::from_load(c_pred);

        let emotions_now = emotion_vector(input.c, input.alpha, DEFAULT_MEMORY_FACTOR);
        let emotions_pred = emotion_vector(c_pred, alpha_pred, DEFAULT_MEMORY_FACTOR);

        let speech = speech_params(c_pred, &emotions_pred, req.current_speech.as_ref());
        let breakpoints = detect_breakpoints(input.c, c_pred);
        let instructions = orchestrator_instructions(
            input.c,
            c_pred,
            state_now,
            state_pred,
            &emotions_pred,
            &breakpoints,
        );
        let timestamp = Utc::now();

        let entry = HistoryEntry {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            load: input.c,
            alpha: input.alpha,
            trend_load: trend_c,
            trend_alpha,
            predicted_load: c_pred,
            predicted_alpha: alpha_pred,
            state: state_now.label().to_string(),
            predicted_state: state_pred.label().to_string(),
            speech: SpeechSnapshot {
                empathy: speech.empathy,
                rate: speech.rate,
                pitch: speech.pitch,
                pause_ms: speech.pause_ms,
            },
            breakpoints: breakpoints.iter().map(Breakpoint::tag).collect(),
            timestamp,
        };
        if let Err(err) = self.history.append(entry) {
            warn!("[anticipation] history append failed user={}: {}", user_id, err);
        }

        info!(
            "[anticipation] predict user={} C={:.2} -> {:.2} state={} -> {} breakpoints={}",
            user_id,
            input.c,
            c_pred,
            state_now.label(),
            state_pred.label(),
            breakpoints.len()
        );

        Ok(AnticipationReading {
            current: StateBlock {
                c: round_to(input.c, 2),
                alpha: round_to(input.alpha, 3),
                state: state_now,
                emotions: emotions_now.rounded(3),
            },
            predicted: StateBlock {
                c: round_to(c_pred, 2),
                alpha: round_to(alpha_pred, 3),
                state: state_pred,
                emotions: emotions_pred.rounded(3),
            },
            trends: Trends {
                c: round_to(trend_c, 3),
                alpha: round_to(trend_alpha, 4),
            },
            speech_params: speech,
            breakpoints,
            orchestrator_instructions: instructions,
            phi: PHI,
            timestamp,
        })
    }

    /// Quick path used right before speaking: no trend, default speech baseline.
    pub fn speech_adjust(
        &self,
        req: &SpeechAdjustRequest,
    ) -> Result<SpeechAdjustment, ValidationError> {
        let text = req.text.as_deref().unwrap_or("");
        if text.is_empty() {
            return Err(ValidationError::Required("text"));
        }
        let (c, alpha) = if self.strict {
            (require("C", req.c)?, require("alpha", req.alpha)?)
        } else {
            (req.c.unwrap_or(DEFAULT_C), req.alpha.unwrap_or(DEFAULT_ALPHA))
        };

        let c_pred = predict_c(c, 0.0, alpha);
        let emotions = emotion_vector(c_pred, alpha, DEFAULT_MEMORY_FACTOR);
        let params = speech_params(c_pred, &emotions, None);

        Ok(SpeechAdjustment {
            ssml: render_ssml(text, &params),
            params,
            voice: SSML_VOICE,
            state: SystemState::from_load(c_pred),
            emotions: emotions.rounded(2),
            timestamp: Utc::now(),
        })
    }

    pub fn history(&self, user_id: Option<&str>, limit: Option<usize>) -> HistoryPage {
        let user_id = user_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or(DEFAULT_USER_ID);
        let history = self
            .history
            .recent(user_id, limit.unwrap_or(DEFAULT_HISTORY_LIMIT));
        HistoryPage {
            count: history.len(),
            history,
            user_id: user_id.to_string(),
        }
    }

    pub fn health(&self) -> AnticipationHealth {
        AnticipationHealth {
            service: SERVICE_NAME,
            version: SERVICE_VERSION,
            phi: PHI,
            thresholds: Thresholds {
                harmony: THRESHOLD_HARMONY,
                alert: THRESHOLD_CRISIS,
                max: PREDICTION_LOAD_MAX,
            },
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::db::InMemoryHistory;
    use crate::shared::error::runtime::HistoryError;

    fn service() -> (AnticipationService, Arc<InMemoryHistory>) {
        let history = Arc::new(InMemoryHistory::new(100, 100));
        (AnticipationService::new(history.clone(), false), history)
    }

    struct BrokenHistory;

    impl HistoryPort for BrokenHistory {
        fn append(&self, _entry: HistoryEntry) -> Result<(), HistoryError> {
            Err(HistoryError::WriteFailed("disk full".to_string()))
        }

        fn recent(&self, _user_id: &str, _limit: usize) -> Vec<HistoryEntry> {
            Vec::new()
        }
    }

    #[test]
    fn empty_request_uses_defaults() {
        let (svc, _) = service();
        let reading = svc.predict(&PredictionRequest::default()).unwrap();
        assert_eq!(reading.current.c, 10.0);
        assert_eq!(reading.current.alpha, 0.3);
        assert_eq!(reading.trends, Trends { c: 0.0, alpha: 0.0 });
        // 10 + 7.5 * (0.3 - 0.5)
        assert_eq!(reading.predicted.c, 8.5);
        assert_eq!(reading.predicted.state, SystemState::Harmony);
        assert!(reading.breakpoints.is_empty());
        assert_eq!(reading.phi, PHI);
    }

    #[test]
    fn rising_trend_crosses_harmony() {
        let (svc, history) = service();
        let req = PredictionRequest {
            c: Some(11.0),
            alpha: Some(0.6),
            c_prev: Some(8.0),
            user_id: Some("anna".to_string()),
            ..Default::default()
        };
        let reading = svc.predict(&req).unwrap();
        // trend 0.3 * 3 = 0.9, prediction 11 + 0.9 + 0.75
        assert_eq!(reading.trends.c, 0.9);
        assert_eq!(reading.predicted.c, 12.65);
        assert_eq!(reading.predicted.state, SystemState::Alert);
        assert_eq!(reading.breakpoints.len(), 1);
        assert_eq!(reading.breakpoints[0].tag(), "B_12 up");
        assert!(reading
            .orchestrator_instructions
            .contains("Breakpoint: Leaving harmony"));

        let stored = history.recent("anna", 10);
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].breakpoints, vec!["B_12 up".to_string()]);
        assert_eq!(stored[0].predicted_state, "ALERT");
        assert!(history.recent(DEFAULT_USER_ID, 10).is_empty());
    }

    #[test]
    fn prior_speech_is_the_baseline() {
        let (svc, _) = service();
        let req = PredictionRequest {
            c: Some(10.0),
            alpha: Some(0.3),
            current_speech: Some(SpeechBaseline {
                empathy: 0.5,
                rate: 1.0,
                pitch: 1.0,
                pause_ms: 200.0,
            }),
            ..Default::default()
        };
        let reading = svc.predict(&req).unwrap();
        assert_eq!(reading.speech_params.rate, 1.0);
        assert_eq!(reading.speech_params.pitch, 1.0);
        assert_eq!(reading.speech_params.pause_ms, 200);
    }

    #[test]
    fn history_failure_does_not_fail_prediction() {
        let svc = AnticipationService::new(Arc::new(BrokenHistory), false);
        assert!(svc.predict(&PredictionRequest::default()).is_ok());
    }

    #[test]
    fn strict_mode_requires_load_and_alpha() {
        let svc = AnticipationService::new(Arc::new(BrokenHistory), true);
        let err = svc.predict(&PredictionRequest::default()).unwrap_err();
        assert_eq!(err, ValidationError::MissingField("C"));
        let req = PredictionRequest {
            c: Some(10.0),
            alpha: Some(0.3),
            trend_c: Some(f64::NAN),
            ..Default::default()
        };
        assert!(matches!(
            svc.predict(&req),
            Err(ValidationError::NotFinite { field: "trend_C", .. })
        ));
    }

    #[test]
    fn speech_adjust_moderate_load() {
        let (svc, _) = service();
        let req = SpeechAdjustRequest {
            text: Some("Dobrý den".to_string()),
            c: Some(15.0),
            alpha: Some(0.4),
        };
        let out = svc.speech_adjust(&req).unwrap();
        assert_eq!(out.state, SystemState::Alert);
        assert_eq!(out.voice, SSML_VOICE);
        assert!(out.ssml.contains("Dobrý den"));
        assert!(out.ssml.contains("rate='90%'"));
    }

    #[test]
    fn speech_adjust_needs_text() {
        let (svc, _) = service();
        let err = svc
            .speech_adjust(&SpeechAdjustRequest::default())
            .unwrap_err();
        assert_eq!(err, ValidationError::Required("text"));
    }

    #[test]
    fn history_defaults_to_global_user() {
        let (svc, _) = service();
        svc.predict(&PredictionRequest::default()).unwrap();
        svc.predict(&PredictionRequest::default()).unwrap();
        let page = svc.history(None, Some(1));
        assert_eq!(page.user_id, "global");
        assert_eq!(page.count, 1);
        assert_eq!(svc.history(Some("  "), None).count, 2);
    }

    #[test]
    fn health_reports_thresholds() {
        let (svc, _) = service();
        let health = svc.health();
        assert_eq!(health.service, SERVICE_NAME);
        assert_eq!(health.thresholds.harmony, 12.0);
        assert_eq!(health.thresholds.alert, 27.0);
        assert_eq!(health.thresholds.max, 40.0);
    }
}
