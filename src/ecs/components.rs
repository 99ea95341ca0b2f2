//! Components that connect entities to AI resources

use glam::{Quat, Vec3};

use crate::ai::{AgentId, CrowdId, TreeId};

/// Horizontal speeds below this leave the facing unchanged.
const MIN_FACING_SPEED: f32 = 1.0e-4;

/// Transform component for position and facing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Position in world space
    pub position: Vec3,
    /// Rotation as a quaternion
    pub rotation: Quat,
}

impl Transform {
    /// Create a new transform at the origin
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transform with just a position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Get the forward direction (negative Z in local space)
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// Yaw to face `direction` on the XZ plane.
    ///
    /// Returns `false` and keeps the old rotation if `direction` has no
    /// horizontal component.
    pub fn face_direction(&mut self, direction: Vec3) -> bool {
        let flat = Vec3::new(direction.x, 0.0, direction.z);
        if flat.length() <= MIN_FACING_SPEED {
            return false;
        }
        self.rotation = Quat::from_rotation_y((-flat.x).atan2(-flat.z));
        true
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

/// Linear velocity mirrored from the simulation
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Velocity(pub Vec3);

/// Name component for debugging
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name(pub String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

/// Behavior tree that decides for this entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Brain(pub TreeId);

/// Links an entity to an agent in a crowd simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrowdMember {
    pub crowd: CrowdId,
    pub agent: AgentId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_direction() {
        let mut transform = Transform::new();
        assert!(transform.face_direction(Vec3::new(1.0, 5.0, 0.0)));
        assert!((transform.forward() - Vec3::X).length() < 0.0001);

        assert!(transform.face_direction(Vec3::new(0.0, 0.0, 2.0)));
        assert!((transform.forward() - Vec3::Z).length() < 0.0001);
    }

    #[test]
    fn test_face_direction_ignores_vertical() {
        let mut transform = Transform::from_position(Vec3::ONE);
        assert!(!transform.face_direction(Vec3::Y));
        assert_eq!(transform.rotation, Quat::IDENTITY);
        assert_eq!(transform.position, Vec3::ONE);
    }
}
