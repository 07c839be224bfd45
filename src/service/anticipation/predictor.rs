use crate::service::control_law::clamp;
use crate::shared::constants::{GAMMA, K1, K2, PREDICTION_LOAD_MAX};

/// One-step load forecast: `C + k1·T_C + k2·(α − 0.5)`, clamped to [0, 40].
///
/// Regulation above 0.5 pushes the forecast up, below 0.5 pulls it down.
pub fn predict_c(c: f64, trend_c: f64, alpha: f64) -> f64 {
    clamp(c + K1 * trend_c + K2 * (alpha - 0.5), 0.0, PREDICTION_LOAD_MAX)
}

pub fn predict_alpha(alpha: f64, trend_alpha: f64) -> f64 {
    clamp(alpha + GAMMA * trend_alpha, 0.0, 1.0)
}
