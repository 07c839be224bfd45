use serde::Serialize;

use crate::service::control_law::{clamp, sigmoid};
use crate::shared::constants::PREDICTION_LOAD_MAX;
use crate::shared::utils::round_to;

/// Six independent scores in [0, 1]. Not a distribution: the sum is unconstrained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EmotionVector {
    pub tension: f64,
    pub fear: f64,
    pub hope: f64,
    pub calm: f64,
    pub joy: f64,
    pub sadness: f64,
}

impl EmotionVector {
    pub fn rounded(&self, decimals: i32) -> Self {
        Self {
            tension: round_to(self.tension, decimals),
            fear: round_to(self.fear, decimals),
            hope: round_to(self.hope, decimals),
            calm: round_to(self.calm, decimals),
            joy: round_to(self.joy, decimals),
            sadness: round_to(self.sadness, decimals),
        }
    }

    pub fn as_array(&self) -> [f64; 6] {
        [
            self.tension,
            self.fear,
            self.hope,
            self.calm,
            self.joy,
            self.sadness,
        ]
    }
}

/// Maps load and regulation to the emotion vector.
///
/// `c` is normalised by 40. `memory_factor` scales each score up (tension, fear,
/// sadness) or down (hope, calm, joy) before the final clamp.
pub fn emotion_vector(c: f64, alpha: f64, memory_factor: f64) -> EmotionVector {
    let c_norm = c / PREDICTION_LOAD_MAX;
    let m = memory_factor;

    let tension = sigmoid(c_norm + alpha, 3.0, 0.5);
    let fear = sigmoid(c_norm * 1.5 + alpha * 0.5, 4.0, 0.7);
    let hope = sigmoid(1.0 - c_norm - alpha * 0.5, 3.0, 0.3);
    let calm = 1.0 - tension;
    let joy = sigmoid(1.0 - c_norm * 1.2 - alpha * 0.8, 4.0, 0.4);
    let sadness = sigmoid(c_norm + (alpha - 0.5).abs(), 2.0, 0.6);

    EmotionVector {
        tension: clamp(tension * (1.0 + m * 0.2), 0.0, 1.0),
        fear: clamp(fear * (1.0 + m * 0.1), 0.0, 1.0),
        hope: clamp(hope * (1.0 - m * 0.1), 0.0, 1.0),
        calm: clamp(calm * (1.0 - m * 0.15), 0.0, 1.0),
        joy: clamp(joy * (1.0 - m * 0.1), 0.0, 1.0),
        sadness: clamp(sadness * (1.0 + m * 0.15), 0.0, 1.0),
    }
}
