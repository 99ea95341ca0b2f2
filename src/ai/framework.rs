//! Top-level owner of AI resources
//!
//! [`AiFramework`] stores behavior trees, nav meshes and crowd simulations
//! behind typed ids. Only crowds are stepped by [`AiFramework::update`];
//! trees and path queries run when the caller asks for them.
//!
//! # Example
//!
//! ```ignore
//! let mut ai = AiFramework::default();
//! let crowd = ai.create_crowd();
//! if let Some(sim) = ai.crowd_mut(crowd) {
//!     sim.add_agent(Vec3::ZERO, 0.5, 5.0);
//! }
//! ai.update(1.0 / 60.0);
//! ```

use super::behavior::{BehaviorTree, NodeRef};
use super::crowd::CrowdSimulation;
use super::navmesh::NavMesh;
use super::pathfinding::Pathfinder;
use super::registry::{CrowdId, NavMeshId, Registry, TreeId};
use crate::config::AiConfig;

/// Registry and dispatcher for every AI resource
#[derive(Debug, Default)]
pub struct AiFramework {
    config: AiConfig,
    pathfinder: Pathfinder,
    trees: Registry<TreeId, BehaviorTree>,
    nav_meshes: Registry<NavMeshId, NavMesh>,
    crowds: Registry<CrowdId, CrowdSimulation>,
}

impl AiFramework {
    /// Create an empty framework
    #[must_use]
    pub fn new(config: AiConfig) -> Self {
        log::debug!("AI framework created: {config:?}");
        Self {
            pathfinder: Pathfinder::new(config.pathfinding.clone()),
            config,
            trees: Registry::new(),
            nav_meshes: Registry::new(),
            crowds: Registry::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    /// Shared path query service
    #[must_use]
    pub fn pathfinder(&self) -> &Pathfinder {
        &self.pathfinder
    }

    // ========================================================================
    // Behavior trees
    // ========================================================================

    /// Create an empty behavior tree
    pub fn create_behavior_tree(&mut self) -> TreeId {
        let id = self.trees.insert(BehaviorTree::new());
        log::debug!("Created {id}");
        id
    }

    /// Create a behavior tree with `root` already attached
    pub fn create_behavior_tree_with_root(&mut self, root: NodeRef) -> TreeId {
        let id = self.trees.insert(BehaviorTree::with_root(root));
        log::debug!("Created {id}");
        id
    }

    #[must_use]
    pub fn behavior_tree(&self, id: TreeId) -> Option<&BehaviorTree> {
        self.trees.get(id)
    }

    pub fn behavior_tree_mut(&mut self, id: TreeId) -> Option<&mut BehaviorTree> {
        self.trees.get_mut(id)
    }

    /// Destroy a tree. Returns `false` if the id was unknown.
    pub fn destroy_behavior_tree(&mut self, id: TreeId) -> bool {
        let removed = self.trees.remove(id).is_some();
        if removed {
            log::debug!("Destroyed {id}");
        }
        removed
    }

    #[must_use]
    pub fn behavior_tree_count(&self) -> usize {
        self.trees.len()
    }

    // ========================================================================
    // Nav meshes
    // ========================================================================

    /// Create an empty nav mesh
    pub fn create_nav_mesh(&mut self) -> NavMeshId {
        let id = self.nav_meshes.insert(NavMesh::new());
        log::debug!("Created {id}");
        id
    }

    #[must_use]
    pub fn nav_mesh(&self, id: NavMeshId) -> Option<&NavMesh> {
        self.nav_meshes.get(id)
    }

    pub fn nav_mesh_mut(&mut self, id: NavMeshId) -> Option<&mut NavMesh> {
        self.nav_meshes.get_mut(id)
    }

    /// Destroy a nav mesh. Returns `false` if the id was unknown.
    pub fn destroy_nav_mesh(&mut self, id: NavMeshId) -> bool {
        let removed = self.nav_meshes.remove(id).is_some();
        if removed {
            log::debug!("Destroyed {id}");
        }
        removed
    }

    #[must_use]
    pub fn nav_mesh_count(&self) -> usize {
        self.nav_meshes.len()
    }

    // ========================================================================
    // Crowds
    // ========================================================================

    /// Create an empty crowd using the framework's steering weights
    pub fn create_crowd(&mut self) -> CrowdId {
        let id = self
            .crowds
            .insert(CrowdSimulation::with_config(self.config.crowd));
        log::debug!("Created {id}");
        id
    }

    #[must_use]
    pub fn crowd(&self, id: CrowdId) -> Option<&CrowdSimulation> {
        self.crowds.get(id)
    }

    pub fn crowd_mut(&mut self, id: CrowdId) -> Option<&mut CrowdSimulation> {
        self.crowds.get_mut(id)
    }

    /// Destroy a crowd and its agents. Returns `false` if the id was unknown.
    pub fn destroy_crowd(&mut self, id: CrowdId) -> bool {
        let removed = self.crowds.remove(id);
        if let Some(crowd) = &removed {
            log::debug!("Destroyed {id} with {} agents", crowd.agent_count());
        }
        removed.is_some()
    }

    #[must_use]
    pub fn crowd_count(&self) -> usize {
        self.crowds.len()
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Step every crowd once
    pub fn update(&mut self, delta_time: f32) {
        debug_assert!(delta_time >= 0.0, "delta time must not be negative");

        for crowd in self.crowds.values_mut() {
            crowd.update(delta_time);
        }
    }

    /// Drop every owned resource. Ids issued before stay invalid.
    pub fn shutdown(&mut self) {
        log::debug!(
            "AI framework shutting down: {} trees, {} nav meshes, {} crowds",
            self.trees.len(),
            self.nav_meshes.len(),
            self.crowds.len()
        );
        self.trees.clear();
        self.nav_meshes.clear();
        self.crowds.clear();
    }
}
