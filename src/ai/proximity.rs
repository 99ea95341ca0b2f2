//! Uniform spatial hash for crowd neighbor queries
//!
//! Rebuilt from the agent snapshot every tick. A query returns every indexed
//! point in the cells overlapping the query sphere's bounding box, so callers
//! still apply their exact distance test.

use glam::Vec3;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use super::grid::GridCoord;

/// Smallest allowed cell size, avoids dividing by zero
const MIN_CELL_SIZE: f32 = 0.1;

/// 3D bucket grid of snapshot indices
#[derive(Debug, Clone)]
pub struct ProximityGrid {
    cell_size: f32,
    cells: FxHashMap<GridCoord, SmallVec<[usize; 8]>>,
}

impl ProximityGrid {
    /// Create an empty grid
    #[must_use]
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: cell_size.max(MIN_CELL_SIZE),
            cells: FxHashMap::default(),
        }
    }

    /// Index `positions`, replacing anything stored before
    pub fn rebuild(&mut self, positions: impl IntoIterator<Item = Vec3>) {
        self.cells.clear();
        for (index, position) in positions.into_iter().enumerate() {
            self.cells
                .entry(GridCoord::from_position(position, self.cell_size))
                .or_default()
                .push(index);
        }
    }

    /// Push candidate indices near `center` into `out`.
    ///
    /// Every point within `radius` is included; some farther points may be too.
    pub fn query(&self, center: Vec3, radius: f32, out: &mut Vec<usize>) {
        let reach = Vec3::splat(radius.max(0.0));
        let min = GridCoord::from_position(center - reach, self.cell_size);
        let max = GridCoord::from_position(center + reach, self.cell_size);

        for x in min.x..=max.x {
            for y in min.y..=max.y {
                for z in min.z..=max.z {
                    if let Some(bucket) = self.cells.get(&GridCoord::new(x, y, z)) {
                        out.extend_from_slice(bucket);
                    }
                }
            }
        }
    }

    #[must_use]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Number of occupied cells
    #[must_use]
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }
}
