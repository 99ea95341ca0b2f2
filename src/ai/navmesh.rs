//! Navigation mesh
//!
//! A static triangulated walkable surface. Triangles are identified by their
//! index in insertion order; adjacency is computed by [`NavMesh::build_connections`].

use glam::Vec3;
use smallvec::SmallVec;

/// Vertices closer than this are treated as the same vertex.
pub const SHARED_VERTEX_TOLERANCE: f32 = 0.1;

/// A single walkable triangle
#[derive(Debug, Clone)]
pub struct NavMeshTriangle {
    /// Corner positions
    pub vertices: [Vec3; 3],
    /// Centroid of the three vertices
    pub center: Vec3,
    /// Indices of triangles sharing an edge with this one
    neighbors: SmallVec<[usize; 3]>,
}

impl NavMeshTriangle {
    /// Create an unconnected triangle
    #[must_use]
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        Self {
            vertices: [v0, v1, v2],
            center: (v0 + v1 + v2) / 3.0,
            neighbors: SmallVec::new(),
        }
    }

    /// Adjacent triangle indices (valid after `NavMesh::build_connections`)
    #[must_use]
    pub fn neighbors(&self) -> &[usize] {
        &self.neighbors
    }

    /// Point-in-triangle test on the XZ plane. Y is ignored.
    ///
    /// Points exactly on an edge count as inside.
    #[must_use]
    pub fn contains(&self, point: Vec3) -> bool {
        let sign = |p1: Vec3, p2: Vec3, p3: Vec3| {
            (p1.x - p3.x) * (p2.z - p3.z) - (p2.x - p3.x) * (p1.z - p3.z)
        };

        let [a, b, c] = self.vertices;
        let d1 = sign(point, a, b);
        let d2 = sign(point, b, c);
        let d3 = sign(point, c, a);

        let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
        let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;

        !(has_neg && has_pos)
    }

    /// Number of vertex pairs between `self` and `other` within tolerance
    fn shared_vertex_count(&self, other: &Self) -> usize {
        self.vertices
            .iter()
            .map(|a| {
                other
                    .vertices
                    .iter()
                    .filter(|b| a.distance(**b) < SHARED_VERTEX_TOLERANCE)
                    .count()
            })
            .sum()
    }

    fn bounds(&self) -> (Vec3, Vec3) {
        let [a, b, c] = self.vertices;
        (a.min(b).min(c), a.max(b).max(c))
    }
}

/// Triangle soup with an edge-adjacency graph
#[derive(Debug, Clone, Default)]
pub struct NavMesh {
    triangles: Vec<NavMeshTriangle>,
    connected: bool,
}

impl NavMesh {
    /// Create an empty nav mesh
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a triangle and return its index.
    ///
    /// Adjacency is not updated; call `build_connections` afterwards.
    pub fn add_triangle(&mut self, v0: Vec3, v1: Vec3, v2: Vec3) -> usize {
        self.triangles.push(NavMeshTriangle::new(v0, v1, v2));
        self.connected = false;
        self.triangles.len() - 1
    }

    /// Recompute adjacency for every triangle.
    ///
    /// Two triangles are neighbors when at least two vertex pairs lie within
    /// [`SHARED_VERTEX_TOLERANCE`] of each other.
    pub fn build_connections(&mut self) {
        for triangle in &mut self.triangles {
            triangle.neighbors.clear();
        }

        let bounds: Vec<(Vec3, Vec3)> = self.triangles.iter().map(NavMeshTriangle::bounds).collect();
        let margin = Vec3::splat(SHARED_VERTEX_TOLERANCE);
        let mut links = 0;

        for i in 0..self.triangles.len() {
            for j in (i + 1)..self.triangles.len() {
                // Boxes must overlap (with tolerance) for any vertex pair to match
                let (min_i, max_i) = bounds[i];
                let (min_j, max_j) = bounds[j];
                if (min_i - margin).cmpgt(max_j).any() || (min_j - margin).cmpgt(max_i).any() {
                    continue;
                }

                if self.triangles[i].shared_vertex_count(&self.triangles[j]) >= 2 {
                    self.triangles[i].neighbors.push(j);
                    self.triangles[j].neighbors.push(i);
                    links += 1;
                }
            }
        }

        self.connected = true;
        log::debug!(
            "Built nav mesh connections: {} triangles, {} shared edges",
            self.triangles.len(),
            links
        );
    }

    /// Index of the first triangle containing `point` (XZ projection)
    #[must_use]
    pub fn find_triangle(&self, point: Vec3) -> Option<usize> {
        self.triangles.iter().position(|t| t.contains(point))
    }

    /// Neighbors of a triangle, empty for an invalid index
    #[must_use]
    pub fn neighbors(&self, index: usize) -> &[usize] {
        match self.triangles.get(index) {
            Some(triangle) => &triangle.neighbors,
            None => &[],
        }
    }

    /// Centroid of a triangle
    #[must_use]
    pub fn triangle_center(&self, index: usize) -> Option<Vec3> {
        self.triangles.get(index).map(|t| t.center)
    }

    /// Get a triangle by index
    #[must_use]
    pub fn triangle(&self, index: usize) -> Option<&NavMeshTriangle> {
        self.triangles.get(index)
    }

    /// All triangles in index order
    #[must_use]
    pub fn triangles(&self) -> &[NavMeshTriangle] {
        &self.triangles
    }

    /// Number of triangles
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Check if the mesh has no triangles
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Whether adjacency reflects every triangle added so far
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Remove all triangles
    pub fn clear(&mut self) {
        self.triangles.clear();
        self.connected = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two triangles forming the unit square on the XZ plane
    fn square() -> NavMesh {
        let mut mesh = NavMesh::new();
        mesh.add_triangle(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
        );
        mesh.add_triangle(
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(0.0, 0.0, 1.0),
        );
        mesh
    }

    #[test]
    fn test_centroid() {
        let tri = NavMeshTriangle::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(3.0, 0.0, 0.0),
            Vec3::new(0.0, 3.0, 3.0),
        );
        assert!((tri.center - Vec3::new(1.0, 1.0, 1.0)).length() < 0.001);
    }

    #[test]
    fn test_shared_edge_connects() {
        let mut mesh = square();
        assert!(mesh.neighbors(0).is_empty());
        assert!(!mesh.is_connected());

        mesh.build_connections();

        assert!(mesh.is_connected());
        assert_eq!(mesh.neighbors(0), &[1]);
        assert_eq!(mesh.neighbors(1), &[0]);
    }

    #[test]
    fn test_rebuild_does_not_duplicate() {
        let mut mesh = square();
        mesh.build_connections();
        mesh.build_connections();
        assert_eq!(mesh.neighbors(0).len(), 1);
    }

    #[test]
    fn test_single_shared_vertex_is_not_neighbor() {
        let mut mesh = NavMesh::new();
        mesh.add_triangle(Vec3::ZERO, Vec3::X, Vec3::Z);
        mesh.add_triangle(Vec3::X, Vec3::new(2.0, 0.0, 0.0), Vec3::new(2.0, 0.0, -1.0));
        mesh.build_connections();
        assert!(mesh.neighbors(0).is_empty());
    }

    #[test]
    fn test_tolerance() {
        let mut mesh = NavMesh::new();
        mesh.add_triangle(Vec3::ZERO, Vec3::X, Vec3::Z);
        mesh.add_triangle(
            Vec3::new(1.05, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(0.0, 0.0, 1.05),
        );
        mesh.build_connections();
        assert_eq!(mesh.neighbors(0), &[1]);
    }

    #[test]
    fn test_added_triangle_unconnected_until_rebuild() {
        let mut mesh = square();
        mesh.build_connections();
        let third = mesh.add_triangle(
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 1.0),
        );

        assert!(!mesh.is_connected());
        assert!(mesh.neighbors(third).is_empty());

        mesh.build_connections();
        assert_eq!(mesh.neighbors(third), &[1]);
    }

    #[test]
    fn test_find_triangle_ignores_y() {
        let mesh = square();
        assert_eq!(mesh.find_triangle(Vec3::new(0.2, 0.0, 0.2)), Some(0));
        assert_eq!(mesh.find_triangle(Vec3::new(0.8, 50.0, 0.8)), Some(1));
        assert_eq!(mesh.find_triangle(Vec3::new(5.0, 0.0, 5.0)), None);
    }

    #[test]
    fn test_invalid_index() {
        let mesh = square();
        assert!(mesh.neighbors(99).is_empty());
        assert!(mesh.triangle_center(99).is_none());
        assert!(mesh.triangle(99).is_none());
        assert_eq!(mesh.triangle_count(), 2);
    }
}
