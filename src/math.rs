//! Vector math helpers
//!
//! The crate uses glam's `Vec3` as its 3D vector value type. This module adds
//! the few operations the AI code needs on top of it.

pub use glam::Vec3;

/// 3D vector value type used throughout the AI module
pub type Vector3 = Vec3;

/// Lengths at or below this are treated as zero when normalizing.
pub const NORMALIZE_EPSILON: f32 = 1.0e-4;

/// Extra vector operations used by steering and pathfinding
pub trait VectorExt {
    /// Unit vector in the same direction, or zero for near-zero vectors.
    fn normalized(self) -> Self;

    /// Scale down to `max` length if longer, otherwise unchanged.
    fn clamped(self, max: f32) -> Self;
}

impl VectorExt for Vec3 {
    #[inline]
    fn normalized(self) -> Self {
        let len = self.length();
        if len > NORMALIZE_EPSILON {
            self / len
        } else {
            Vec3::ZERO
        }
    }

    #[inline]
    fn clamped(self, max: f32) -> Self {
        if self.length() > max {
            self.normalized() * max
        } else {
            self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized() {
        let v = Vec3::new(3.0, 0.0, 4.0).normalized();
        assert!((v.length() - 1.0).abs() < 0.0001);
        assert!((v.x - 0.6).abs() < 0.0001);
    }

    #[test]
    fn test_normalized_near_zero() {
        assert_eq!(Vec3::new(0.00005, 0.0, 0.0).normalized(), Vec3::ZERO);
        assert_eq!(Vec3::ZERO.normalized(), Vec3::ZERO);
    }

    #[test]
    fn test_clamped() {
        let long = Vec3::new(10.0, 0.0, 0.0).clamped(2.0);
        assert!((long.length() - 2.0).abs() < 0.0001);

        let short = Vec3::new(1.0, 0.0, 0.0);
        assert_eq!(short.clamped(2.0), short);
    }

    #[test]
    fn test_distance() {
        let a = Vector3::new(1.0, 2.0, 3.0);
        let b = Vector3::new(4.0, 6.0, 3.0);
        assert!((a.distance(b) - 5.0).abs() < 0.0001);
    }
}
