use serde::Serialize;

use crate::shared::constants::{THRESHOLD_CRISIS, THRESHOLD_HARMONY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Boundary {
    #[serde(rename = "B_12")]
    Harmony,
    #[serde(rename = "B_27")]
    Crisis,
}

impl Boundary {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Harmony => "B_12",
            Self::Crisis => "B_27",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

/// A threshold crossing between the current and the predicted load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Breakpoint {
    #[serde(rename = "type")]
    pub boundary: Boundary,
    pub direction: Direction,
    pub message: &'static str,
    pub action: &'static str,
}

impl Breakpoint {
    /// `"B_12 up"` style tag used in audit records.
    pub fn tag(&self) -> String {
        let dir = match self.direction {
            Direction::Up => "up",
            Direction::Down => "down",
        };
        format!("{} {}", self.boundary.as_str(), dir)
    }
}

/// Checks both boundaries in both directions, in the order 12-up, 12-down, 27-up, 27-down.
/// A jump from below 12 to 27 or above yields two events.
pub fn detect_breakpoints(c_current: f64, c_predicted: f64) -> Vec<Breakpoint> {
    let mut out = Vec::new();
    if c_current < THRESHOLD_HARMONY && c_predicted >= THRESHOLD_HARMONY {
        out.push(Breakpoint {
            boundary: Boundary::Harmony,
            direction: Direction::Up,
            message: "Leaving harmony - raise attention",
            action: "increase_empathy",
        });
    }
    if c_current >= THRESHOLD_HARMONY && c_predicted < THRESHOLD_HARMONY {
        out.push(Breakpoint {
            boundary: Boundary::Harmony,
            direction: Direction::Down,
            message: "Entering harmony",
            action: "normalize",
        });
    }
    if c_current < THRESHOLD_CRISIS && c_predicted >= THRESHOLD_CRISIS {
        out.push(Breakpoint {
            boundary: Boundary::Crisis,
            direction: Direction::Up,
            message: "Crisis - activate crisis protocol",
            action: "crisis_protocol",
        });
    }
    if c_current >= THRESHOLD_CRISIS && c_predicted < THRESHOLD_CRISIS {
        out.push(Breakpoint {
            boundary: Boundary::Crisis,
            direction: Direction::Down,
            message: "Leaving crisis - continue de-escalation",
            action: "continue_deescalation",
        });
    }
    out
}
