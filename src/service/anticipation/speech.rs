use serde::{Deserialize, Serialize};

use crate::service::anticipation::emotion::EmotionVector;
use crate::service::control_law::{clamp, SystemState};
use crate::shared::constants::*;
use crate::shared::utils::round_to;

pub const REASON_CRISIS: &str = "Approaching crisis - maximum empathy and calm";
pub const REASON_FEAR: &str = "Fear detected - slowing down and soothing";
pub const REASON_TENSION: &str = "High tension - gentle approach";
pub const REASON_ATTENTION: &str = "Mildly raised attention";
pub const REASON_JOY: &str = "Joyful mood - keep it positive";
pub const REASON_HARMONY: &str = "Harmonious state - normal pace";

pub const SSML_VOICE: &str = "cs-CZ-AntoninNeural";
pub const SSML_LANG: &str = "cs-CZ";

/// Prior voice settings the controller adjusts from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechBaseline {
    pub empathy: f64,
    pub rate: f64,
    /// semitones
    pub pitch: f64,
    pub pause_ms: f64,
}

impl Default for SpeechBaseline {
    fn default() -> Self {
        Self {
            empathy: 0.7,
            rate: 0.9,
            pitch: 0.0,
            pause_ms: 300.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeechAdjustments {
    #[serde(rename = "delta_C")]
    pub delta_c: f64,
    pub delta_fear: f64,
    pub reason: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeechParams {
    pub empathy: f64,
    pub rate: f64,
    pub pitch: f64,
    pub pause_ms: u32,
    pub adjustments: SpeechAdjustments,
}

/// Derives voice parameters from the predicted load and emotions.
///
/// Above the target load of 18 each unit slows the rate by 2 %, lowers the pitch by
/// half a semitone and lengthens pauses by 15 ms; fear above 0.3 raises empathy.
/// Results are clamped to the speech limits and rounded for the wire
/// (empathy and rate 2 dp, pitch 1 dp, pause truncated to whole ms).
pub fn speech_params(
    c_predicted: f64,
    emotions: &EmotionVector,
    baseline: Option<&SpeechBaseline>,
) -> SpeechParams {
    let prior = baseline.copied().unwrap_or_default();
    let delta_c = (c_predicted - C_TARGET).max(0.0);
    let delta_fear = (emotions.fear - FEAR_BASELINE).max(0.0);

    let empathy = prior.empathy + K_EMP * delta_fear;
    let rate = prior.rate * (1.0 - K_RATE * delta_c);
    let pitch = prior.pitch - K_PITCH * delta_c;
    let pause = prior.pause_ms + K_PAUSE * delta_c;

    SpeechParams {
        empathy: round_to(clamp(empathy, EMPATHY_MIN, EMPATHY_MAX), 2),
        rate: round_to(clamp(rate, RATE_MIN, RATE_MAX), 2),
        pitch: round_to(clamp(pitch, PITCH_MIN, PITCH_MAX), 1),
        pause_ms: clamp(pause, PAUSE_MIN_MS, PAUSE_MAX_MS) as u32,
        adjustments: SpeechAdjustments {
            delta_c: round_to(delta_c, 2),
            delta_fear: round_to(delta_fear, 2),
            reason: adjustment_reason(c_predicted, emotions),
        },
    }
}

/// Fixed priority: crisis, then fear, then tension inside the alert band; joy decides
/// between the two harmony messages.
pub fn adjustment_reason(c_predicted: f64, emotions: &EmotionVector) -> &'static str {
    match SystemState::from_load(c_predicted) {
        SystemState::Crisis => REASON_CRISIS,
        SystemState::Alert if emotions.fear > 0.5 => REASON_FEAR,
        SystemState::Alert if emotions.tension > 0.6 => REASON_TENSION,
        SystemState::Alert => REASON_ATTENTION,
        SystemState::Harmony if emotions.joy > 0.6 => REASON_JOY,
        SystemState::Harmony => REASON_HARMONY,
    }
}

/// Wraps `text` in an Azure-style SSML prosody block.
pub fn render_ssml(text: &str, params: &SpeechParams) -> String {
    let rate_percent = (params.rate * 100.0) as i64;
    let pitch = if params.pitch == 0.0 {
        "+0Hz".to_string()
    } else {
        format!("{:+.0}Hz", params.pitch)
    };
    format!(
        "<speak version='1.0' xml:lang='{lang}'>\n    <voice name='{voice}'>\n        <prosody rate='{rate}%' pitch='{pitch}'>\n            {text}\n        </prosody>\n    </voice>\n</speak>",
        lang = SSML_LANG,
        voice = SSML_VOICE,
        rate = rate_percent,
        pitch = pitch,
        text = escape_xml(text),
    )
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&apos;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
