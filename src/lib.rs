//! Game AI core built in Rust
//!
//! This crate provides:
//! - Behavior trees with shared subtrees
//! - Grid A*, nav mesh A* and flow field pathfinding
//! - Crowd simulation with flocking and avoidance
//! - An id-based framework that owns all of the above
//! - Entity Component System (ECS) glue with hecs

pub mod ai;
pub mod config;
pub mod ecs;
pub mod math;

// Re-exports for convenience
pub use glam;
pub use hecs;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::ai::{
        AgentId, AgentParams, AiFramework, BehaviorNode, BehaviorTree, CrowdConfig, CrowdId,
        CrowdSimulation, FlowField, NavMesh, NavMeshId, NodeRef, PathResult, Pathfinder,
        PathfindingConfig, Status, TreeId,
    };
    pub use crate::config::{AiConfig, ConfigError};
    pub use crate::ecs::{
        Brain, CrowdMember, Name, Transform, Velocity, World, run_brains, sync_crowd_agents,
    };
    pub use crate::math::{Vector3, VectorExt};
    pub use glam::{Quat, Vec3};
}
