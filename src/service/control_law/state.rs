use serde::Serialize;

use crate::shared::constants::{PHI, PSI, THRESHOLD_CRISIS, THRESHOLD_HARMONY};

/// Load band. Intervals are half-open: `[0, 12)`, `[12, 27)`, `[27, ∞)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SystemState {
    Harmony,
    Alert,
    Crisis,
}

impl SystemState {
    pub fn from_load(c: f64) -> Self {
        if c < THRESHOLD_HARMONY {
            Self::Harmony
        } else if c < THRESHOLD_CRISIS {
            Self::Alert
        } else {
            Self::Crisis
        }
    }

    /// Label used by the anticipation engine.
    pub fn label(self) -> &'static str {
        match self {
            Self::Harmony => "HARMONY",
            Self::Alert => "ALERT",
            Self::Crisis => "CRISIS",
        }
    }

    /// Label used by the voice runtime endpoints.
    pub fn czech_label(self) -> &'static str {
        match self {
            Self::Harmony => "HARMONIE",
            Self::Alert => "ALERT",
            Self::Crisis => "KRIZE",
        }
    }
}

/// Voice synthesis hints for one load band.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TtsProfile {
    pub rate: f64,
    pub pitch: &'static str,
    pub style: &'static str,
    pub max_sentences: u8,
    pub pause_ms: u32,
}

impl TtsProfile {
    pub fn for_state(state: SystemState) -> Self {
        match state {
            SystemState::Harmony => Self {
                rate: 1.0,
                pitch: "+0Hz",
                style: "friendly",
                max_sentences: 5,
                pause_ms: (1000.0 * PSI) as u32,
            },
            SystemState::Alert => Self {
                rate: 0.85,
                pitch: "-5Hz",
                style: "calm",
                max_sentences: 3,
                pause_ms: 1000,
            },
            SystemState::Crisis => Self {
                rate: 0.7,
                pitch: "-10Hz",
                style: "soothing",
                max_sentences: 1,
                pause_ms: (1000.0 * PHI) as u32,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_are_half_open() {
        assert_eq!(SystemState::from_load(0.0), SystemState::Harmony);
        assert_eq!(SystemState::from_load(11.999), SystemState::Harmony);
        assert_eq!(SystemState::from_load(12.0), SystemState::Alert);
        assert_eq!(SystemState::from_load(26.999), SystemState::Alert);
        assert_eq!(SystemState::from_load(27.0), SystemState::Crisis);
        assert_eq!(SystemState::from_load(50.0), SystemState::Crisis);
    }

    #[test]
    fn both_label_sets_agree_on_band() {
        let mut c = 0.0;
        while c <= 50.0 {
            let state = SystemState::from_load(c);
            let expected = if c < 12.0 {
                ("HARMONY", "HARMONIE")
            } else if c < 27.0 {
                ("ALERT", "ALERT")
            } else {
                ("CRISIS", "KRIZE")
            };
            assert_eq!((state.label(), state.czech_label()), expected, "C={}", c);
            c += 0.25;
        }
    }

    #[test]
    fn tts_profile_table() {
        let h = TtsProfile::for_state(SystemState::Harmony);
        assert_eq!((h.rate, h.pitch, h.style, h.max_sentences, h.pause_ms), (1.0, "+0Hz", "friendly", 5, 618));
        let a = TtsProfile::for_state(SystemState::Alert);
        assert_eq!((a.rate, a.pitch, a.style, a.max_sentences, a.pause_ms), (0.85, "-5Hz", "calm", 3, 1000));
        let c = TtsProfile::for_state(SystemState::Crisis);
        assert_eq!((c.rate, c.pitch, c.style, c.max_sentences, c.pause_ms), (0.7, "-10Hz", "soothing", 1, 1618));
    }

    #[test]
    fn serializes_english_label() {
        assert_eq!(serde_json::to_string(&SystemState::Crisis).unwrap(), "\"CRISIS\"");
    }
}
