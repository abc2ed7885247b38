//! Math primitives: angle normalization and log-odds conversion.

use std::f64::consts::PI;

/// Normalize angle to [-π, π].
#[inline]
pub fn normalize_angle(angle: f64) -> f64 {
    let mut a = angle % (2.0 * PI);
    if a > PI {
        a -= 2.0 * PI;
    } else if a < -PI {
        a += 2.0 * PI;
    }
    a
}

/// Log-odds of a probability: `ln(p / (1 - p))`.
#[inline]
pub fn log_odds(probability: f64) -> f64 {
    (probability / (1.0 - probability)).ln()
}

/// Probability from log-odds (logistic function).
///
/// ```text
/// P(occupied) = 1 / (1 + exp(-log_odds))
/// ```
#[inline]
pub fn probability(log_odds: f64) -> f64 {
    1.0 / (1.0 + (-log_odds).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_normalize_angle() {
        assert_relative_eq!(normalize_angle(0.0), 0.0);
        assert_relative_eq!(normalize_angle(2.0 * PI + 0.25), 0.25, epsilon = 1e-12);
        assert_relative_eq!(normalize_angle(-2.0 * PI - 0.25), -0.25, epsilon = 1e-12);
        assert_relative_eq!(normalize_angle(1.5 * PI), -0.5 * PI, epsilon = 1e-12);
        assert_relative_eq!(normalize_angle(PI / 2.0 + 2.0 * PI), PI / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_log_odds_round_trip() {
        for p in [0.1, 0.25, 0.5, 0.7, 0.99] {
            assert_relative_eq!(probability(log_odds(p)), p, epsilon = 1e-12);
        }
        assert_relative_eq!(log_odds(0.5), 0.0);
        assert_relative_eq!(log_odds(0.8), 4.0f64.ln(), epsilon = 1e-12);
    }
}
