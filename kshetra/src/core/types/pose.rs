//! Robot / sensor pose in the world frame.

use serde::{Deserialize, Serialize};

/// Sensor pose in 2D space.
///
/// Represents position (x, y) in meters and heading (theta) in radians.
/// Theta is normalized to [-π, π].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose2D {
    /// X position in meters
    pub x: f64,
    /// Y position in meters
    pub y: f64,
    /// Heading in radians, normalized to [-π, π]
    pub theta: f64,
}

impl Pose2D {
    /// Create a new pose with theta normalized to [-π, π].
    #[inline]
    pub fn new(x: f64, y: f64, theta: f64) -> Self {
        Self {
            x,
            y,
            theta: crate::core::math::normalize_angle(theta),
        }
    }

    /// Identity pose at origin with zero heading.
    #[inline]
    pub fn identity() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            theta: 0.0,
        }
    }

    /// Same position, heading rotated by `angle`.
    ///
    /// Used to turn a scan's per-beam angle into a beam pose.
    #[inline]
    pub fn rotated(&self, angle: f64) -> Self {
        Self::new(self.x, self.y, self.theta + angle)
    }

    /// Point at `distance` along the heading.
    #[inline]
    pub fn point_at(&self, distance: f64) -> (f64, f64) {
        let (sin_t, cos_t) = self.theta.sin_cos();
        (self.x + distance * cos_t, self.y + distance * sin_t)
    }
}

impl Default for Pose2D {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_pose_normalizes_heading() {
        let pose = Pose2D::new(1.0, 2.0, 2.0 * PI + 0.5);
        assert_relative_eq!(pose.theta, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_point_at() {
        let pose = Pose2D::new(1.0, 1.0, FRAC_PI_2);
        let (x, y) = pose.point_at(2.0);
        assert_relative_eq!(x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(y, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rotated() {
        let pose = Pose2D::identity().rotated(-FRAC_PI_2);
        assert_relative_eq!(pose.theta, -FRAC_PI_2);
    }
}
