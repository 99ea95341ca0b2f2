//! Integer cell coordinates for the implicit search grid

use glam::Vec3;

/// A cell on an implicit 3D grid spanning the full `i32` range per axis.
///
/// Used as the hash key for grid searches and flow fields. Positions beyond
/// that range clamp to the edge cells, and edge cells have no neighbor past
/// the edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GridCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl GridCoord {
    /// The origin cell
    pub const ZERO: Self = Self::new(0, 0, 0);

    /// Unit steps to the six face neighbors, in +X, -X, +Y, -Y, +Z, -Z order.
    pub const AXIS_STEPS: [(i32, i32, i32); 6] = [
        (1, 0, 0),
        (-1, 0, 0),
        (0, 1, 0),
        (0, -1, 0),
        (0, 0, 1),
        (0, 0, -1),
    ];

    /// Create a new coordinate
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The cell containing `position` for the given cell size.
    ///
    /// Float-to-int conversion saturates, so far positions land on edge cells.
    #[must_use]
    pub fn from_position(position: Vec3, grid_size: f32) -> Self {
        debug_assert!(grid_size > 0.0, "grid size must be positive");
        let cell = (position / grid_size).floor();
        Self::new(cell.x as i32, cell.y as i32, cell.z as i32)
    }

    /// World position of the cell's minimum corner
    #[must_use]
    pub fn to_position(self, grid_size: f32) -> Vec3 {
        self.as_vec3() * grid_size
    }

    /// Coordinate as a float vector
    #[must_use]
    pub fn as_vec3(self) -> Vec3 {
        Vec3::new(self.x as f32, self.y as f32, self.z as f32)
    }

    /// Coordinate shifted by whole cells, or `None` past the `i32` range
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Option<Self> {
        match (
            self.x.checked_add(dx),
            self.y.checked_add(dy),
            self.z.checked_add(dz),
        ) {
            (Some(x), Some(y), Some(z)) => Some(Self::new(x, y, z)),
            _ => None,
        }
    }

    /// The face neighbors in `AXIS_STEPS` order, skipping any past the edge
    pub fn neighbors(self) -> impl Iterator<Item = GridCoord> {
        Self::AXIS_STEPS
            .into_iter()
            .filter_map(move |(dx, dy, dz)| self.offset(dx, dy, dz))
    }
}
