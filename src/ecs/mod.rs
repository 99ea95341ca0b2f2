//! Entity Component System glue
//!
//! Built on top of the hecs ECS library. Entities reference AI resources by
//! id; systems copy simulation results back into components.

mod components;
mod systems;
mod world;

pub use components::{Brain, CrowdMember, Name, Transform, Velocity};
pub use systems::{SyncStats, run_brains, sync_crowd_agents};
pub use world::World;
