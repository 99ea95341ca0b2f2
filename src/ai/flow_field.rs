//! Goal-directed flow fields
//!
//! A flow field is computed once per goal and then queried by any number of
//! agents. Each visited cell stores the accumulated travel cost to the goal
//! cell and, where one exists, a unit direction toward its cheapest neighbor.
//!
//! # Example
//!
//! ```ignore
//! let field = FlowField::generate(goal, |p| p.y == 0.0, 1.0, 50.0);
//! let heading = field.direction_at(agent_position);
//! ```

use std::collections::VecDeque;

use glam::Vec3;
use rustc_hash::FxHashMap;

use super::grid::GridCoord;
use crate::math::VectorExt;

/// Per-cell guidance toward a single goal
#[derive(Debug, Clone, Default)]
pub struct FlowField {
    goal: Vec3,
    grid_size: f32,
    costs: FxHashMap<GridCoord, f32>,
    directions: FxHashMap<GridCoord, Vec3>,
}

impl FlowField {
    /// Run a breadth-first cost relaxation outward from the goal cell.
    ///
    /// Cells whose cost has reached `max_distance` are kept but never expanded.
    /// Walkability is tested at each neighbor cell's minimum corner. Cells with
    /// no strictly cheaper neighbor get no direction.
    #[must_use]
    pub fn generate(
        goal: Vec3,
        is_walkable: impl Fn(Vec3) -> bool,
        grid_size: f32,
        max_distance: f32,
    ) -> Self {
        debug_assert!(grid_size > 0.0, "grid size must be positive");

        let goal_cell = GridCoord::from_position(goal, grid_size);

        let mut costs = FxHashMap::default();
        let mut queue = VecDeque::new();
        costs.insert(goal_cell, 0.0);
        queue.push_back(goal_cell);

        while let Some(cell) = queue.pop_front() {
            let Some(&cost) = costs.get(&cell) else {
                continue;
            };
            if cost >= max_distance {
                continue;
            }

            for neighbor in cell.neighbors() {
                if !is_walkable(neighbor.to_position(grid_size)) {
                    continue;
                }

                let new_cost = cost + grid_size;
                let improved = costs.get(&neighbor).is_none_or(|&known| new_cost < known);
                if improved {
                    costs.insert(neighbor, new_cost);
                    queue.push_back(neighbor);
                }
            }
        }

        let mut directions = FxHashMap::default();
        for (&cell, &cost) in &costs {
            let mut best_cost = cost;
            let mut best_dir = None;

            for neighbor in cell.neighbors() {
                if let Some(&neighbor_cost) = costs.get(&neighbor)
                    && neighbor_cost < best_cost
                {
                    best_cost = neighbor_cost;
                    best_dir = Some(
                        (neighbor.to_position(grid_size) - cell.to_position(grid_size)).normalized(),
                    );
                }
            }

            if let Some(dir) = best_dir {
                directions.insert(cell, dir);
            }
        }

        log::trace!(
            "Flow field: {} cells, {} with directions",
            costs.len(),
            directions.len()
        );

        Self {
            goal,
            grid_size,
            costs,
            directions,
        }
    }

    /// Unit direction toward the goal, or zero if the position has no guidance
    #[must_use]
    pub fn direction_at(&self, position: Vec3) -> Vec3 {
        self.directions
            .get(&self.cell_of(position))
            .copied()
            .unwrap_or(Vec3::ZERO)
    }

    /// Accumulated cost to the goal, if the cell was visited
    #[must_use]
    pub fn cost_at(&self, position: Vec3) -> Option<f32> {
        self.costs.get(&self.cell_of(position)).copied()
    }

    /// Goal this field leads to
    #[must_use]
    pub fn goal(&self) -> Vec3 {
        self.goal
    }

    /// Cell size the field was computed at
    #[must_use]
    pub fn grid_size(&self) -> f32 {
        self.grid_size
    }

    /// Number of visited cells
    #[must_use]
    pub fn len(&self) -> usize {
        self.costs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }

    /// Visited cells with their cost and stored direction
    pub fn cells(&self) -> impl Iterator<Item = (GridCoord, f32, Option<Vec3>)> + '_ {
        self.costs
            .iter()
            .map(|(&cell, &cost)| (cell, cost, self.directions.get(&cell).copied()))
    }

    fn cell_of(&self, position: Vec3) -> GridCoord {
        if self.grid_size > 0.0 {
            GridCoord::from_position(position, self.grid_size)
        } else {
            GridCoord::ZERO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor(p: Vec3) -> bool {
        p.y == 0.0 && p.x.abs() <= 10.0 && p.z.abs() <= 10.0
    }

    #[test]
    fn test_goal_cell_has_zero_cost() {
        let field = FlowField::generate(Vec3::new(0.5, 0.0, 0.5), floor, 1.0, 100.0);
        assert_eq!(field.cost_at(Vec3::new(0.2, 0.0, 0.9)), Some(0.0));
        assert_eq!(field.direction_at(Vec3::new(0.2, 0.0, 0.9)), Vec3::ZERO);
    }

    #[test]
    fn test_directions_point_downhill() {
        let field = FlowField::generate(Vec3::ZERO, floor, 1.0, 100.0);
        assert!(!field.is_empty());

        for (cell, cost, dir) in field.cells() {
            let Some(dir) = dir else {
                continue;
            };
            assert!((dir.length() - 1.0).abs() < 0.0001);

            let next = cell.to_position(1.0) + dir;
            let next_cost = field.cost_at(next).unwrap();
            assert!(next_cost < cost);
        }
    }

    #[test]
    fn test_direction_toward_goal() {
        let field = FlowField::generate(Vec3::ZERO, floor, 1.0, 100.0);

        let dir = field.direction_at(Vec3::new(5.5, 0.0, 0.5));
        assert!((dir - Vec3::new(-1.0, 0.0, 0.0)).length() < 0.0001);
        assert_eq!(field.cost_at(Vec3::new(5.5, 0.0, 0.5)), Some(5.0));
    }

    #[test]
    fn test_unknown_position_is_zero() {
        let field = FlowField::generate(Vec3::ZERO, floor, 1.0, 100.0);
        assert_eq!(field.direction_at(Vec3::new(0.0, 7.0, 0.0)), Vec3::ZERO);
        assert_eq!(field.cost_at(Vec3::new(50.0, 0.0, 0.0)), None);
    }

    #[test]
    fn test_max_distance_bounds_expansion() {
        let field = FlowField::generate(Vec3::ZERO, floor, 1.0, 3.0);

        assert!(field.cells().all(|(_, cost, _)| cost <= 3.0));
        assert_eq!(field.cost_at(Vec3::new(3.0, 0.0, 0.0)), Some(3.0));
        assert_eq!(field.cost_at(Vec3::new(4.0, 0.0, 0.0)), None);
    }

    #[test]
    fn test_blocked_neighbors() {
        // Only the goal cell itself is walkable
        let field = FlowField::generate(Vec3::ZERO, |_| false, 1.0, 100.0);
        assert_eq!(field.len(), 1);
        assert_eq!(field.direction_at(Vec3::ZERO), Vec3::ZERO);
    }

    #[test]
    fn test_far_goal_stays_on_edge_cells() {
        // 3e9 saturates to the last i32 cell, which has no +X neighbor
        let goal = Vec3::new(3.0e9, 0.0, 0.0);
        let field = FlowField::generate(goal, |p| p.y == 0.0 && p.z == 0.0, 1.0, 3.0);

        assert_eq!(field.cost_at(goal), Some(0.0));
        assert_eq!(field.len(), 4);
        assert!(field.cells().all(|(_, cost, _)| cost <= 3.0));
    }

    #[test]
    fn test_grid_size_scales_costs() {
        let field = FlowField::generate(Vec3::ZERO, floor, 2.0, 100.0);
        assert_eq!(field.grid_size(), 2.0);
        assert_eq!(field.cost_at(Vec3::new(4.5, 0.0, 0.5)), Some(4.0));
        assert_eq!(field.goal(), Vec3::ZERO);
    }
}
