use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::shared::error::runtime::HistoryError;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SpeechSnapshot {
    pub empathy: f64,
    pub rate: f64,
    pub pitch: f64,
    pub pause_ms: u32,
}

/// Audit record of one anticipation cycle.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub user_id: String,
    #[serde(rename = "C")]
    pub load: f64,
    pub alpha: f64,
    #[serde(rename = "trend_C")]
    pub trend_load: f64,
    pub trend_alpha: f64,
    #[serde(rename = "predicted_C")]
    pub predicted_load: f64,
    pub predicted_alpha: f64,
    pub state: String,
    pub predicted_state: String,
    pub speech: SpeechSnapshot,
    pub breakpoints: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

pub trait HistoryPort: Send + Sync {
    fn append(&self, entry: HistoryEntry) -> Result<(), HistoryError>;

    /// Newest first, at most `limit` entries.
    fn recent(&self, user_id: &str, limit: usize) -> Vec<HistoryEntry>;
}
