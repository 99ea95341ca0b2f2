//! A* pathfinding on an implicit grid and on a navigation mesh
//!
//! Grid searches never materialize the grid: the caller supplies a
//! walkability predicate and the search queries it on demand.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::collections::hash_map::Entry;

use glam::Vec3;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use super::flow_field::FlowField;
use super::grid::GridCoord;
use super::navmesh::NavMesh;

/// Default search parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathfindingConfig {
    /// Grid spacing in world units
    pub grid_size: f32,
    /// Flow field expansion radius (accumulated cost)
    pub max_distance: f32,
    /// Optional cap on grid A* node expansions. Checked after the goal test,
    /// so a start already at the goal always succeeds.
    pub max_search_nodes: Option<usize>,
}

impl Default for PathfindingConfig {
    fn default() -> Self {
        Self {
            grid_size: 1.0,
            max_distance: 100.0,
            max_search_nodes: None,
        }
    }
}

impl PathfindingConfig {
    /// Set grid spacing
    #[must_use]
    pub fn with_grid_size(mut self, grid_size: f32) -> Self {
        self.grid_size = grid_size;
        self
    }

    /// Set flow field radius
    #[must_use]
    pub fn with_max_distance(mut self, max_distance: f32) -> Self {
        self.max_distance = max_distance;
        self
    }

    /// Cap grid A* expansions
    #[must_use]
    pub fn with_max_search_nodes(mut self, limit: usize) -> Self {
        self.max_search_nodes = Some(limit);
        self
    }
}

/// Result of pathfinding
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathResult {
    /// Waypoints in world coordinates
    pub waypoints: Vec<Vec3>,
    /// Total path length
    pub length: f32,
}

impl PathResult {
    fn from_waypoints(waypoints: Vec<Vec3>) -> Self {
        let length = calculate_path_length(&waypoints);
        Self { waypoints, length }
    }

    /// Check if no path was found
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Number of waypoints
    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// First waypoint
    #[must_use]
    pub fn first(&self) -> Option<Vec3> {
        self.waypoints.first().copied()
    }

    /// Last waypoint
    #[must_use]
    pub fn last(&self) -> Option<Vec3> {
        self.waypoints.last().copied()
    }
}

/// Search record for one grid cell, owned by the search's node table
#[derive(Debug, Clone, Copy)]
pub struct PathNode {
    pub position: Vec3,
    /// Cost from start
    pub g_cost: f32,
    /// Heuristic cost to goal
    pub h_cost: f32,
    pub parent: Option<GridCoord>,
}

impl PathNode {
    #[inline]
    pub fn f_cost(&self) -> f32 {
        self.g_cost + self.h_cost
    }
}

/// Open-set entry for the priority queue
#[derive(Debug, Clone, Copy)]
struct OpenNode<K> {
    key: K,
    f_cost: f32,
    h_cost: f32,
}

impl<K> Ord for OpenNode<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for a min-heap; ties go to the node closer to the goal
        other
            .f_cost
            .total_cmp(&self.f_cost)
            .then_with(|| other.h_cost.total_cmp(&self.h_cost))
    }
}

impl<K> PartialOrd for OpenNode<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K> PartialEq for OpenNode<K> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<K> Eq for OpenNode<K> {}

/// Path queries over grids, nav meshes and flow fields
#[derive(Debug, Clone, Default)]
pub struct Pathfinder {
    config: PathfindingConfig,
}

impl Pathfinder {
    /// Create a pathfinder with the given defaults
    #[must_use]
    pub fn new(config: PathfindingConfig) -> Self {
        Self { config }
    }

    /// Search defaults
    #[must_use]
    pub fn config(&self) -> &PathfindingConfig {
        &self.config
    }

    /// Find a path with A* over an implicit grid.
    ///
    /// The grid is anchored at `start`: nodes sit at `start + offset * grid_size`
    /// and expand to their six axis neighbors. The search stops at the first node
    /// closer than one cell to `goal`; that node ends the path. Returns an empty
    /// result if the reachable space is exhausted first.
    #[must_use]
    pub fn find_path_astar(
        &self,
        start: Vec3,
        goal: Vec3,
        is_walkable: impl Fn(Vec3) -> bool,
        grid_size: f32,
    ) -> PathResult {
        debug_assert!(grid_size > 0.0, "grid size must be positive");

        let position_of = |offset: GridCoord| start + offset.as_vec3() * grid_size;

        let mut open_set = BinaryHeap::new();
        let mut nodes: FxHashMap<GridCoord, PathNode> = FxHashMap::default();
        let mut closed: FxHashSet<GridCoord> = FxHashSet::default();

        let h_start = start.distance(goal);
        nodes.insert(
            GridCoord::ZERO,
            PathNode {
                position: start,
                g_cost: 0.0,
                h_cost: h_start,
                parent: None,
            },
        );
        open_set.push(OpenNode {
            key: GridCoord::ZERO,
            f_cost: h_start,
            h_cost: h_start,
        });

        while let Some(current) = open_set.pop() {
            // Stale duplicates of already expanded nodes
            if !closed.insert(current.key) {
                continue;
            }

            let Some(&node) = nodes.get(&current.key) else {
                continue;
            };

            if node.position.distance(goal) < grid_size {
                let path = reconstruct_grid_path(&nodes, current.key);
                log::trace!(
                    "Grid A* found {} waypoints after {} expansions",
                    path.len(),
                    closed.len()
                );
                return path;
            }

            if let Some(limit) = self.config.max_search_nodes
                && closed.len() > limit
            {
                log::trace!("Grid A* gave up after {limit} expansions");
                return PathResult::default();
            }

            for neighbor in current.key.neighbors() {
                if closed.contains(&neighbor) {
                    continue;
                }

                let neighbor_pos = position_of(neighbor);
                if !is_walkable(neighbor_pos) {
                    continue;
                }

                let tentative_g = node.g_cost + grid_size;

                match nodes.entry(neighbor) {
                    Entry::Vacant(slot) => {
                        let h_cost = neighbor_pos.distance(goal);
                        slot.insert(PathNode {
                            position: neighbor_pos,
                            g_cost: tentative_g,
                            h_cost,
                            parent: Some(current.key),
                        });
                        open_set.push(OpenNode {
                            key: neighbor,
                            f_cost: tentative_g + h_cost,
                            h_cost,
                        });
                    }
                    Entry::Occupied(mut slot) => {
                        let known = slot.get_mut();
                        if tentative_g < known.g_cost {
                            known.g_cost = tentative_g;
                            known.parent = Some(current.key);
                            open_set.push(OpenNode {
                                key: neighbor,
                                f_cost: known.f_cost(),
                                h_cost: known.h_cost,
                            });
                        }
                    }
                }
            }
        }

        log::trace!("Grid A* exhausted {} nodes without reaching goal", closed.len());
        PathResult::default()
    }

    /// Grid A* using the configured grid size
    #[must_use]
    pub fn find_path_astar_default(
        &self,
        start: Vec3,
        goal: Vec3,
        is_walkable: impl Fn(Vec3) -> bool,
    ) -> PathResult {
        self.find_path_astar(start, goal, is_walkable, self.config.grid_size)
    }

    /// Find a path across a nav mesh with A* over triangle adjacency.
    ///
    /// The result is `start`, the centers of the triangles after the start
    /// triangle (through the goal triangle), then `goal`. Start and goal in the
    /// same triangle give `[start, goal]`. Points off the mesh give an empty result.
    #[must_use]
    pub fn find_path_navmesh(&self, start: Vec3, goal: Vec3, nav_mesh: &NavMesh) -> PathResult {
        let (Some(start_tri), Some(goal_tri)) =
            (nav_mesh.find_triangle(start), nav_mesh.find_triangle(goal))
        else {
            return PathResult::default();
        };

        if start_tri == goal_tri {
            return PathResult::from_waypoints(vec![start, goal]);
        }

        if !nav_mesh.is_connected() {
            log::warn!("Searching a nav mesh whose connections are out of date");
        }

        let center = |index: usize| nav_mesh.triangle_center(index).unwrap_or(Vec3::ZERO);

        let mut open_set = BinaryHeap::new();
        let mut g_score: FxHashMap<usize, f32> = FxHashMap::default();
        let mut came_from: FxHashMap<usize, usize> = FxHashMap::default();
        let mut closed: FxHashSet<usize> = FxHashSet::default();

        let h_start = center(start_tri).distance(goal);
        g_score.insert(start_tri, 0.0);
        open_set.push(OpenNode {
            key: start_tri,
            f_cost: h_start,
            h_cost: h_start,
        });

        while let Some(OpenNode { key: current, .. }) = open_set.pop() {
            if !closed.insert(current) {
                continue;
            }

            if current == goal_tri {
                let mut waypoints = vec![goal];
                let mut tri = current;
                while let Some(&prev) = came_from.get(&tri) {
                    waypoints.push(center(tri));
                    tri = prev;
                }
                waypoints.push(start);
                waypoints.reverse();

                log::trace!("NavMesh A* crossed {} triangles", waypoints.len() - 2);
                return PathResult::from_waypoints(waypoints);
            }

            let current_center = center(current);
            let current_g = g_score.get(&current).copied().unwrap_or(f32::MAX);

            for &neighbor in nav_mesh.neighbors(current) {
                if closed.contains(&neighbor) {
                    continue;
                }

                let neighbor_center = center(neighbor);
                let tentative_g = current_g + current_center.distance(neighbor_center);

                if g_score
                    .get(&neighbor)
                    .is_none_or(|&known| tentative_g < known)
                {
                    came_from.insert(neighbor, current);
                    g_score.insert(neighbor, tentative_g);

                    let h_cost = neighbor_center.distance(goal);
                    open_set.push(OpenNode {
                        key: neighbor,
                        f_cost: tentative_g + h_cost,
                        h_cost,
                    });
                }
            }
        }

        PathResult::default()
    }

    /// Build a flow field toward `goal`. See [`FlowField::generate`].
    #[must_use]
    pub fn generate_flow_field(
        &self,
        goal: Vec3,
        is_walkable: impl Fn(Vec3) -> bool,
        grid_size: f32,
        max_distance: f32,
    ) -> FlowField {
        FlowField::generate(goal, is_walkable, grid_size, max_distance)
    }

    /// Flow field using the configured grid size and radius
    #[must_use]
    pub fn generate_flow_field_default(
        &self,
        goal: Vec3,
        is_walkable: impl Fn(Vec3) -> bool,
    ) -> FlowField {
        FlowField::generate(
            goal,
            is_walkable,
            self.config.grid_size,
            self.config.max_distance,
        )
    }

    /// Flow direction at `position`, or zero where the field has no guidance
    #[must_use]
    pub fn flow_direction(&self, field: &FlowField, position: Vec3) -> Vec3 {
        field.direction_at(position)
    }
}

fn reconstruct_grid_path(nodes: &FxHashMap<GridCoord, PathNode>, end: GridCoord) -> PathResult {
    let mut waypoints = Vec::new();
    let mut cursor = Some(end);

    while let Some(key) = cursor {
        let Some(node) = nodes.get(&key) else {
            break;
        };
        waypoints.push(node.position);
        cursor = node.parent;
    }

    waypoints.reverse();
    PathResult::from_waypoints(waypoints)
}

/// Calculate total path length
fn calculate_path_length(waypoints: &[Vec3]) -> f32 {
    waypoints.windows(2).map(|w| w[0].distance(w[1])).sum()
}
