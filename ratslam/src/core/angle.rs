//! Angle and toroidal-coordinate helpers.
//!
//! All angles are radians. Experience-map facings live in `(-π, π]`,
//! pose-cell coordinates live on a torus of a given extent.

use std::f64::consts::{PI, TAU};

/// Wrap an angle into `(-π, π]`.
///
/// # Example
///
/// ```
/// use ratslam::core::wrap180;
/// use std::f64::consts::PI;
///
/// assert!((wrap180(3.0 * PI) - PI).abs() < 1e-12);
/// assert!((wrap180(-PI) - PI).abs() < 1e-12);
/// ```
#[inline]
pub fn wrap180(angle: f64) -> f64 {
    if !angle.is_finite() {
        return angle;
    }
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    // rem_euclid lands -π on -π; the interval is open on that side
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

/// Wrap an angle into `[0, 2π)`.
#[inline]
pub fn wrap360(angle: f64) -> f64 {
    if !angle.is_finite() {
        return angle;
    }
    let wrapped = angle.rem_euclid(TAU);
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Shortest signed rotation taking `from` onto `to`.
///
/// Positive is counter-clockwise. The result is in `[-π, π]`,
/// antisymmetric in its arguments and zero for equal angles.
pub fn signed_delta(from: f64, to: f64) -> f64 {
    let delta = wrap360(to) - wrap360(from);
    if delta == 0.0 {
        return 0.0;
    }

    let magnitude = delta.abs().min(TAU - delta.abs());
    // The direct difference is the short way round unless it exceeds a half turn
    let direction = if delta.abs() <= PI {
        delta.signum()
    } else {
        -delta.signum()
    };

    direction * magnitude
}

/// Distance between two coordinates on a ring of circumference `extent`.
#[inline]
pub fn toroidal_delta(a: f64, b: f64, extent: f64) -> f64 {
    let direct = (a - b).abs();
    direct.min(extent - direct).abs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    const SAMPLES: [f64; 11] = [
        0.0, 0.3, -0.3, 1.0, -2.9, PI, -PI, 3.5, -7.0, 12.25, 100.0,
    ];

    #[test]
    fn test_wrap180_range() {
        for &a in &SAMPLES {
            let w = wrap180(a);
            assert!(w > -PI && w <= PI, "wrap180({}) = {}", a, w);
        }
        assert_relative_eq!(wrap180(-PI), PI);
        assert_relative_eq!(wrap180(PI), PI);
        assert_relative_eq!(wrap180(FRAC_PI_2 + TAU), FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn test_wrap180_idempotent_under_full_turn() {
        for &a in &SAMPLES {
            assert_relative_eq!(wrap180(wrap180(a) + TAU), wrap180(a), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_wrap360_range() {
        for &a in &SAMPLES {
            let w = wrap360(a);
            assert!((0.0..TAU).contains(&w), "wrap360({}) = {}", a, w);
        }
        assert_relative_eq!(wrap360(-FRAC_PI_2), 3.0 * FRAC_PI_2);
    }

    #[test]
    fn test_signed_delta_zero_and_antisymmetric() {
        for &a in &SAMPLES {
            assert_eq!(signed_delta(a, a), 0.0);
            for &b in &SAMPLES {
                assert_relative_eq!(signed_delta(a, b), -signed_delta(b, a), epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_signed_delta_direction() {
        assert_relative_eq!(signed_delta(0.0, FRAC_PI_2), FRAC_PI_2);
        assert_relative_eq!(signed_delta(FRAC_PI_2, 0.0), -FRAC_PI_2);
        // Crossing the ±π seam takes the short way round
        assert_relative_eq!(signed_delta(3.0, -3.0), TAU - 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_toroidal_delta() {
        assert_relative_eq!(toroidal_delta(1.0, 59.0, 61.0), 3.0);
        assert_relative_eq!(toroidal_delta(10.0, 12.5, 61.0), 2.5);
        assert_relative_eq!(toroidal_delta(0.0, 30.5, 61.0), 30.5);
    }
}
