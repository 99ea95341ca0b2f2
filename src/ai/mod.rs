//! AI and navigation module
//!
//! Provides behavior trees, grid and nav mesh pathfinding, flow fields, crowd
//! steering, and the framework that owns them.

mod behavior;
mod crowd;
mod flow_field;
mod framework;
mod grid;
mod navmesh;
mod pathfinding;
mod proximity;
mod registry;
mod steering;

pub use behavior::{
    ActionFn, BehaviorNode, BehaviorTree, Composite, ConditionFn, NodeRef, Repeater, Status,
};
pub use crowd::{Agent, AgentParams, CrowdConfig, CrowdSimulation};
pub use flow_field::FlowField;
pub use framework::AiFramework;
pub use grid::GridCoord;
pub use navmesh::{NavMesh, NavMeshTriangle, SHARED_VERTEX_TOLERANCE};
pub use pathfinding::{PathNode, PathResult, Pathfinder, PathfindingConfig};
pub use proximity::ProximityGrid;
pub use registry::{AgentId, CrowdId, NavMeshId, Registry, RegistryId, TreeId};
pub use steering::{
    AgentSnapshot, Alignment, Avoidance, Cohesion, Seek, Separation, SteeringBehavior,
};
