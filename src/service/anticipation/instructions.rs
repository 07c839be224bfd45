use crate::service::anticipation::breakpoint::Breakpoint;
use crate::service::anticipation::emotion::EmotionVector;
use crate::service::control_law::SystemState;

/// One-line advisory for the response-generating model, fields joined by `" | "`.
pub fn orchestrator_instructions(
    c_current: f64,
    c_predicted: f64,
    state_current: SystemState,
    state_predicted: SystemState,
    emotions: &EmotionVector,
    breakpoints: &[Breakpoint],
) -> String {
    let mut lines = vec![
        format!("Current state: {} (C={:.1})", state_current.label(), c_current),
        format!(
            "Predicted state: {} (C_pred={:.1})",
            state_predicted.label(),
            c_predicted
        ),
    ];
    for bp in breakpoints {
        lines.push(format!("Breakpoint: {}", bp.message));
    }

    if emotions.fear > 0.5 {
        lines.push("High fear - use a soothing tone, offer a breathing exercise".to_string());
    }
    if emotions.sadness > 0.6 {
        lines.push("Sadness detected - show empathy, ask about feelings".to_string());
    }
    if emotions.joy > 0.7 {
        lines.push("Joyful mood - keep it positive, a lighter tone is fine".to_string());
    }
    if emotions.tension > 0.6 {
        lines.push("High tension - speak slowly, offer a pause".to_string());
    }

    lines.push(
        match state_predicted {
            SystemState::Crisis => {
                "CRISIS PROTOCOL: maximum empathy, slow speech, offer to contact the caregiver"
            }
            SystemState::Alert => "ATTENTION: monitor the situation, prepare de-escalation",
            SystemState::Harmony => "HARMONY: normal conversation, playfulness is fine",
        }
        .to_string(),
    );

    lines.join(" | ")
}
