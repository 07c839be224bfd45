pub mod lenient;

pub fn mask_pii(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }
    let len = trimmed.chars().count();
    format!("<redacted len={}>", len)
}

/// Rounds to `decimals` places, exact halves to the even digit. Used for response
/// payloads only.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_pii_hides_content() {
        assert_eq!(mask_pii("  "), "<empty>");
        assert_eq!(mask_pii("Radime, pomoc"), "<redacted len=13>");
    }

    #[test]
    fn round_to_places() {
        assert_eq!(round_to(14.254, 2), 14.25);
        assert_eq!(round_to(0.81234, 3), 0.812);
        assert_eq!(round_to(-2.35, 1), -2.4);
    }

    #[test]
    fn round_to_sends_exact_halves_to_even() {
        // echo similarity of one shared word in eight
        assert_eq!(round_to(1.0 / 8.0, 2), 0.12);
        assert_eq!(round_to(0.375, 2), 0.38);
        assert_eq!(round_to(-2.25, 1), -2.2);
        assert_eq!(round_to(2.5, 0), 2.0);
    }
}
