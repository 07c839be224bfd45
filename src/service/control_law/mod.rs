//! Closed-form control law of the voice runtime.
//! - `math`: sigmoid / clamp / EMA trend.
//! - `state`: HARMONY / ALERT / CRISIS bands and the TTS profile per band.
//! - `load`: C(t) from room sensors and biometrics, α(t) and κ(t) updates.
//!
//! Nothing here fails or blocks: missing inputs take the calm-room defaults.

pub mod load;
pub mod math;
pub mod state;

pub use load::{compute_alpha, compute_c, compute_kappa, BioReading, SensorReading};
pub use math::{clamp, ema_trend, sigmoid};
pub use state::{SystemState, TtsProfile};
