//! Numeric constants shared by the voice runtime and the anticipation engine.
//! Both computation paths must read thresholds from here only.

/// Golden ratio φ.
pub const PHI: f64 = 1.6180339887498949;
/// 1/φ.
pub const PSI: f64 = 0.6180339887498949;
/// Silver ratio δ. Reported by the health endpoints, not used by the control law.
pub const DELTA: f64 = 2.4142135623730951;
pub const RADIM_R: f64 = 3.906;

/// `C < 12` is harmony.
pub const THRESHOLD_HARMONY: f64 = 12.0;
/// `C >= 27` is crisis.
pub const THRESHOLD_CRISIS: f64 = 27.0;

/// Upper clamp of the measured load index.
pub const LOAD_MAX: f64 = 50.0;
/// Upper clamp of the predicted load index and the emotion normalisation base.
pub const PREDICTION_LOAD_MAX: f64 = 40.0;

// measured load C(t)
pub const LOAD_BASE: f64 = 5.0;
pub const NOISE_LIMIT_DB: f64 = 60.0;
pub const NOISE_WEIGHT: f64 = 0.3;
pub const LIGHT_LOW: f64 = 20.0;
pub const LIGHT_HIGH: f64 = 80.0;
pub const LIGHT_CENTER: f64 = 50.0;
pub const LIGHT_WEIGHT: f64 = 0.1;
pub const TEMP_LOW_C: f64 = 18.0;
pub const TEMP_HIGH_C: f64 = 26.0;
pub const TEMP_CENTER_C: f64 = 22.0;
pub const TEMP_WEIGHT: f64 = 0.5;
pub const HEART_RATE_LIMIT: f64 = 90.0;
pub const HEART_RATE_WEIGHT: f64 = 0.2;
pub const STRESS_WEIGHT: f64 = 15.0;

// regulation α(t)
pub const ALPHA_HARMONY: f64 = 0.1;
pub const ALPHA_ALERT: f64 = 0.5;
pub const ALPHA_CRISIS: f64 = 1.0;
pub const ALPHA_HELP_BOOST: f64 = 0.3;
pub const ALPHA_CALM_BOOST: f64 = 0.2;

// coherence κ(t)
pub const KAPPA_GAIN: f64 = 0.1;
pub const KAPPA_LOAD_WEIGHT: f64 = 0.15;

// prediction
pub const K1: f64 = 1.0;
pub const K2: f64 = 7.5;
pub const LAMBDA_C: f64 = 0.3;
pub const LAMBDA_ALPHA: f64 = 0.3;
pub const GAMMA: f64 = 0.5;
pub const DEFAULT_MEMORY_FACTOR: f64 = 0.5;

// speech controller targets
pub const C_TARGET: f64 = 18.0;
pub const FEAR_BASELINE: f64 = 0.3;

// speech controller gains
pub const K_EMP: f64 = 0.15;
pub const K_RATE: f64 = 0.02;
pub const K_PITCH: f64 = 0.5;
pub const K_PAUSE: f64 = 15.0;

pub const EMPATHY_MIN: f64 = 0.3;
pub const EMPATHY_MAX: f64 = 1.0;
pub const RATE_MIN: f64 = 0.7;
pub const RATE_MAX: f64 = 1.1;
pub const PITCH_MIN: f64 = -4.0;
pub const PITCH_MAX: f64 = 2.0;
pub const PAUSE_MIN_MS: f64 = 100.0;
pub const PAUSE_MAX_MS: f64 = 800.0;

// relevance gate
pub const RELEVANCE_THRESHOLD: f64 = 0.6;
pub const ECHO_THRESHOLD: f64 = 0.75;

pub const FIBONACCI: [u32; 12] = [0, 1, 1, 2, 3, 5, 8, 13, 21, 34, 55, 89];

/// Speaker label used when a conversation is flattened into a prompt.
pub const ASSISTANT_NAME: &str = "Radim";
