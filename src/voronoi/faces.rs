use super::Voronoi3D;
use crate::error::BuildError;
use crate::math::determinant3x3;
use crate::primitives::Point3d;

impl Voronoi3D {
    /// Extracts one Voronoi face per Delaunay edge with at least one
    /// real endpoint by walking the ring of tetras around the edge and
    /// collecting their circumcenters.
    pub(super) fn build_faces(&mut self) -> Result<(), BuildError> {
        self.faces_in_cell = vec![vec![]; self.n_org];
        self.points_in_face.clear();
        self.face_neighbors.clear();
        self.areas.clear();
        for t in 0..self.del.tetras.len() {
            if !self.del.empty_tetras.contains(&t) {
                self.calc_tetra_radius_center(t);
            }
        }
        for t in 0..self.del.tetras.len() {
            if self.del.empty_tetras.contains(&t) || self.is_outer_tetra(t) {
                continue;
            }
            let points = self.del.tetras[t].points;
            for j in 0..3 {
                for k in j + 1..4 {
                    let n0 = points[j].min(points[k]);
                    let n1 = points[j].max(points[k]);
                    if !self.should_build_face(n0, n1) {
                        continue;
                    }
                    let ring = self.walk_edge_ring(t, n0, n1)?;
                    let edge_length_squared =
                        self.del.points[n0].distance_squared(self.del.points[n1]);
                    let mut vertex_loop =
                        clean_duplicates(&ring, &self.tetra_centers, edge_length_squared);
                    if vertex_loop.len() < 3 {
                        continue;
                    }
                    self.make_right_handed(&mut vertex_loop, self.del.points[n0]);
                    let face = self.points_in_face.len();
                    self.faces_in_cell[n0].push(face);
                    if n1 < self.n_org {
                        self.faces_in_cell[n1].push(face);
                    }
                    self.face_neighbors.push((n0, n1));
                    self.areas
                        .push(face_area(&vertex_loop, &self.tetra_centers));
                    self.points_in_face.push(vertex_loop);
                }
            }
        }
        Ok(())
    }

    /// No cell is grown for sentinel-touching tetras; their
    /// circumcenters exist only to close the rings of nearby edges.
    fn is_outer_tetra(&self, tetra: usize) -> bool {
        self.del.tetras[tetra]
            .points
            .iter()
            .any(|point| self.is_sentinel(*point))
    }

    fn should_build_face(&self, n0: usize, n1: usize) -> bool {
        if n0 >= self.n_org {
            return false;
        }
        !self.faces_in_cell[n0]
            .iter()
            .any(|face| self.face_neighbors[*face].1 == n1)
    }

    /// Visits the tetras around the Delaunay edge (n0, n1) in ring
    /// order, starting and ending at `start`.
    fn walk_edge_ring(
        &self,
        start: usize,
        n0: usize,
        n1: usize,
    ) -> Result<Vec<usize>, BuildError> {
        let mut ring = vec![start];
        let mut last = start;
        let mut current = self.next_loop_tetra(start, start, n0, n1)?;
        while current != start {
            ring.push(current);
            if ring.len() > self.del.tetras.len() {
                return Err(BuildError::FaceWalkFailure { n0, n1 });
            }
            let next = self.next_loop_tetra(current, last, n0, n1)?;
            last = current;
            current = next;
        }
        Ok(ring)
    }

    /// The neighbor of `current` that shares the edge (n0, n1) and is
    /// not the tetra we just came from.
    fn next_loop_tetra(
        &self,
        current: usize,
        last: usize,
        n0: usize,
        n1: usize,
    ) -> Result<usize, BuildError> {
        let tetra = &self.del.tetras[current];
        for k in 0..4 {
            let point = tetra.points[k];
            if point != n0 && point != n1 && tetra.neighbors[k] != last {
                return Ok(tetra.neighbors[k]);
            }
        }
        Err(BuildError::FaceWalkFailure { n0, n1 })
    }

    fn make_right_handed(&self, vertex_loop: &mut [usize], generator: Point3d) {
        let first = self.tetra_centers[vertex_loop[0]];
        let v1 = self.tetra_centers[vertex_loop[1]] - first;
        let v2 = self.tetra_centers[*vertex_loop.last().unwrap()] - first;
        if v1.cross(v2).dot(generator - first) < 0.0 {
            vertex_loop.reverse();
        }
    }

    /// Circumcenter and circumradius of a tetra via the determinantal
    /// formulation relative to its first vertex.
    pub(super) fn calc_tetra_radius_center(&mut self, index: usize) -> f64 {
        let [p0, p1, p2, p3] = self.del.tetras[index].points.map(|p| self.del.points[p]);
        let v2 = p1 - p0;
        let v3 = p2 - p0;
        let v4 = p3 - p0;
        let a = determinant3x3([
            [v2.x, v2.y, v2.z],
            [v3.x, v3.y, v3.z],
            [v4.x, v4.y, v4.z],
        ]);
        let dx = determinant3x3([
            [v2.length_squared(), v2.y, v2.z],
            [v3.length_squared(), v3.y, v3.z],
            [v4.length_squared(), v4.y, v4.z],
        ]);
        let dy = -determinant3x3([
            [v2.length_squared(), v2.x, v2.z],
            [v3.length_squared(), v3.x, v3.z],
            [v4.length_squared(), v4.x, v4.z],
        ]);
        let dz = determinant3x3([
            [v2.length_squared(), v2.x, v2.y],
            [v3.length_squared(), v3.x, v3.y],
            [v4.length_squared(), v4.x, v4.y],
        ]);
        self.tetra_centers[index] = p0 + Point3d::new(dx, dy, dz) / (2.0 * a);
        let radius = 0.5 * (dx * dx + dy * dy + dz * dz).sqrt() / a.abs();
        self.radii[index] = radius;
        radius
    }

    /// The circumradius of a tetra, computed on first use.
    pub(super) fn radius(&mut self, index: usize) -> f64 {
        if self.radii[index] < 0.0 {
            self.calc_tetra_radius_center(index);
        }
        self.radii[index]
    }
}

/// Removes ring entries whose circumcenters coincide with the last kept
/// one, including the wraparound pair. The threshold is relative to the
/// length of the dual Delaunay edge.
fn clean_duplicates(
    ring: &[usize],
    centers: &[Point3d],
    edge_length_squared: f64,
) -> Vec<usize> {
    let threshold = 1e-14 * edge_length_squared;
    let mut kept = vec![ring[0]];
    for index in &ring[1..] {
        let last = *kept.last().unwrap();
        if centers[*index].distance_squared(centers[last]) > threshold {
            kept.push(*index);
        }
    }
    if kept.len() > 1 {
        let last = *kept.last().unwrap();
        if centers[kept[0]].distance_squared(centers[last]) <= threshold {
            kept.pop();
        }
    }
    kept
}

fn face_area(vertex_loop: &[usize], centers: &[Point3d]) -> f64 {
    let first = centers[vertex_loop[0]];
    let mut sum = Point3d::ZERO;
    for i in 0..vertex_loop.len() - 2 {
        sum += (centers[vertex_loop[i + 2]] - first).cross(centers[vertex_loop[i + 1]] - first);
    }
    0.5 * sum.length()
}
