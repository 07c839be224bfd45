use serde::Deserialize;

use crate::service::control_law::math::clamp;
use crate::service::control_law::state::SystemState;
use crate::shared::constants::*;
use crate::shared::error::runtime::ValidationError;
use crate::shared::lexicon::Lexicon;
use crate::shared::utils::lenient;

/// Room sensors. Absent fields read as a calm room.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SensorReading {
    /// dB
    #[serde(deserialize_with = "lenient::option")]
    pub noise: Option<f64>,
    /// Normalised 0-100.
    #[serde(deserialize_with = "lenient::option")]
    pub light: Option<f64>,
    /// °C
    #[serde(deserialize_with = "lenient::option")]
    pub temperature: Option<f64>,
}

impl SensorReading {
    pub const DEFAULT_NOISE_DB: f64 = 30.0;
    pub const DEFAULT_LIGHT: f64 = 50.0;
    pub const DEFAULT_TEMPERATURE_C: f64 = 22.0;

    pub fn noise_db(&self) -> f64 {
        self.noise.unwrap_or(Self::DEFAULT_NOISE_DB)
    }

    pub fn light(&self) -> f64 {
        self.light.unwrap_or(Self::DEFAULT_LIGHT)
    }

    pub fn temperature_c(&self) -> f64 {
        self.temperature.unwrap_or(Self::DEFAULT_TEMPERATURE_C)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require("sensors.noise", self.noise)?;
        require("sensors.light", self.light)?;
        require("sensors.temperature", self.temperature)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BioReading {
    #[serde(deserialize_with = "lenient::option")]
    pub heart_rate: Option<f64>,
    /// 0-1
    #[serde(deserialize_with = "lenient::option")]
    pub stress_indicator: Option<f64>,
}

impl BioReading {
    pub const DEFAULT_HEART_RATE: f64 = 70.0;
    pub const DEFAULT_STRESS: f64 = 0.3;

    pub fn heart_rate(&self) -> f64 {
        self.heart_rate.unwrap_or(Self::DEFAULT_HEART_RATE)
    }

    pub fn stress(&self) -> f64 {
        self.stress_indicator.unwrap_or(Self::DEFAULT_STRESS)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require("bio.heart_rate", self.heart_rate)?;
        require("bio.stress_indicator", self.stress_indicator)?;
        Ok(())
    }
}

/// Checks that a strict-mode field is present and finite.
pub fn require(field: &'static str, value: Option<f64>) -> Result<f64, ValidationError> {
    match value {
        None => Err(ValidationError::MissingField(field)),
        Some(v) if !v.is_finite() => Err(ValidationError::NotFinite { field, value: v }),
        Some(v) => Ok(v),
    }
}

/// Load index C(t) in [0, 50].
///
/// Starts from 5 and adds penalties for a loud room, extreme light, uncomfortable
/// temperature, raised heart rate and the stress indicator.
pub fn compute_c(sensors: &SensorReading, bio: &BioReading) -> f64 {
    let noise = sensors.noise_db();
    let light = sensors.light();
    let temp = sensors.temperature_c();
    let hr = bio.heart_rate();
    let stress = bio.stress();

    let mut c = LOAD_BASE;
    if noise > NOISE_LIMIT_DB {
        c += (noise - NOISE_LIMIT_DB) * NOISE_WEIGHT;
    }
    if light < LIGHT_LOW || light > LIGHT_HIGH {
        c += (LIGHT_CENTER - light).abs() * LIGHT_WEIGHT;
    }
    if temp < TEMP_LOW_C || temp > TEMP_HIGH_C {
        c += (TEMP_CENTER_C - temp).abs() * TEMP_WEIGHT;
    }
    if hr > HEART_RATE_LIMIT {
        c += (hr - HEART_RATE_LIMIT) * HEART_RATE_WEIGHT;
    }
    c += stress * STRESS_WEIGHT;

    clamp(c, 0.0, LOAD_MAX)
}

/// Regulation α(t): base by band, boosted by help / calm-down intent, capped at 1.
pub fn compute_alpha(state: SystemState, intent_text: &str, lexicon: &Lexicon) -> f64 {
    let mut alpha = match state {
        SystemState::Harmony => ALPHA_HARMONY,
        SystemState::Alert => ALPHA_ALERT,
        SystemState::Crisis => ALPHA_CRISIS,
    };
    let lower = intent_text.to_lowercase();
    if lexicon.asks_for_help(&lower) {
        alpha += ALPHA_HELP_BOOST;
    }
    if lexicon.asks_for_calm(&lower) {
        alpha += ALPHA_CALM_BOOST;
    }
    alpha.min(1.0)
}

/// Coherence κ(t+1) = κ(t) + α·φ·0.1 − (C/50)·0.15, clamped to [0, 1].
pub fn compute_kappa(c: f64, alpha: f64, prev_kappa: f64) -> f64 {
    let stabilise = alpha * PHI * KAPPA_GAIN;
    let strain = (c / LOAD_MAX) * KAPPA_LOAD_WEIGHT;
    clamp(prev_kappa + stabilise - strain, 0.0, 1.0)
}
