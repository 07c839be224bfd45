/// Logistic curve `1 / (1 + e^{-k(x - x0)})`.
///
/// When the exponential overflows the result saturates to `0.0` for `x < x0`
/// and `1.0` otherwise, so extreme inputs never produce NaN.
pub fn sigmoid(x: f64, k: f64, x0: f64) -> f64 {
    let e = (-k * (x - x0)).exp();
    if !e.is_finite() {
        return if x < x0 { 0.0 } else { 1.0 };
    }
    1.0 / (1.0 + e)
}

pub fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
    lo.max(hi.min(value))
}

/// `T_t = (1 - λ)·T_{t-1} + λ·(x_t - x_{t-1})`
pub fn ema_trend(current: f64, previous: f64, prev_trend: f64, lambda: f64) -> f64 {
    (1.0 - lambda) * prev_trend + lambda * (current - previous)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigmoid_midpoint_is_half() {
        assert!((sigmoid(0.5, 3.0, 0.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn sigmoid_saturates_on_overflow() {
        assert_eq!(sigmoid(-1e6, 4.0, 0.0), 0.0);
        assert_eq!(sigmoid(1e6, 4.0, 0.0), 1.0);
        assert_eq!(sigmoid(f64::MAX, 2.0, 0.6), 1.0);
        assert!(!sigmoid(-1e308, 4.0, 0.7).is_nan());
    }

    #[test]
    fn clamp_bounds() {
        assert_eq!(clamp(-3.0, 0.0, 1.0), 0.0);
        assert_eq!(clamp(3.0, 0.0, 1.0), 1.0);
        assert_eq!(clamp(0.25, 0.0, 1.0), 0.25);
    }

    #[test]
    fn zero_delta_adds_nothing_to_trend() {
        for &(x, t, lambda) in &[(10.0, 0.7, 0.3), (-4.0, -2.5, 0.9), (0.0, 12.0, 0.0)] {
            assert_eq!(ema_trend(x, x, t, lambda), (1.0 - lambda) * t);
            assert_eq!(ema_trend(x, x, t, lambda), ema_trend(x + 7.0, x + 7.0, t, lambda));
        }
        assert_eq!(ema_trend(3.0, 3.0, 0.0, 0.3), 0.0);
        assert_eq!(ema_trend(3.0, 3.0, 0.8, 0.0), 0.8);
    }

    #[test]
    fn trend_follows_delta() {
        let t = ema_trend(14.0, 12.0, 0.5, 0.3);
        assert!((t - (0.7 * 0.5 + 0.3 * 2.0)).abs() < 1e-12);
    }
}
