mod boundary;
mod faces;
mod geometry;
pub mod output;

use log::debug;

use crate::communication::PointExchange;
use crate::communication::Rank;
use crate::delaunay::Delaunay;
use crate::error::BuildError;
use crate::primitives::Point3d;
use crate::primitives::Polygon;
use crate::simulation_box::SimulationBox;

/// The Voronoi tessellation of a set of generator points inside an
/// axis-aligned box.
///
/// Generator indices are classed by position in the point table:
/// `0..num_cells()` are the real generators, the following four are the
/// sentinels owned by the Delaunay layer, and everything after that is
/// a ghost, either mirrored across a box face or received from a peer
/// subdomain. All relations between cells, faces and Voronoi vertices
/// are index-valued; Voronoi vertices are addressed by the index of the
/// Delaunay tetra they are dual to.
pub struct Voronoi3D {
    sim_box: SimulationBox,
    n_org: usize,
    big_tet: Option<usize>,
    del: Delaunay,
    /// For each real generator, the sorted list of incident tetras.
    point_tetras: Vec<Vec<usize>>,
    /// Circumradius per tetra; -1.0 marks "not yet computed".
    radii: Vec<f64>,
    tetra_centers: Vec<Point3d>,
    faces_in_cell: Vec<Vec<usize>>,
    /// Vertex loops, right handed with regard to the first neighbor.
    points_in_face: Vec<Vec<usize>>,
    face_neighbors: Vec<(usize, usize)>,
    cm: Vec<Point3d>,
    volumes: Vec<f64>,
    areas: Vec<f64>,
    duplicated_procs: Vec<Rank>,
    duplicated_points: Vec<Vec<usize>>,
    nghost: Vec<Vec<usize>>,
    sent_procs: Vec<Rank>,
    sent_points: Vec<Vec<usize>>,
    self_index: Vec<usize>,
}

impl Voronoi3D {
    pub fn new(ll: Point3d, ur: Point3d) -> Self {
        Self {
            sim_box: SimulationBox::new(ll, ur),
            n_org: 0,
            big_tet: None,
            del: Delaunay::default(),
            point_tetras: vec![],
            radii: vec![],
            tetra_centers: vec![],
            faces_in_cell: vec![],
            points_in_face: vec![],
            face_neighbors: vec![],
            cm: vec![],
            volumes: vec![],
            areas: vec![],
            duplicated_procs: vec![],
            duplicated_points: vec![],
            nghost: vec![],
            sent_procs: vec![],
            sent_points: vec![],
            self_index: vec![],
        }
    }

    pub fn build(&mut self, points: &[Point3d]) -> Result<(), BuildError> {
        assert!(!points.is_empty());
        self.clear();
        self.n_org = points.len();
        self.del.build(points, self.sim_box.ur, self.sim_box.ll);
        self.reset_derived_tetra_data();

        let ghost_candidates = self.serial_find_intersections()?;
        debug!("Mirroring {} boundary generators", ghost_candidates.len());
        let extra_points = self.create_boundary_points(&ghost_candidates);
        self.del.build_extra(&extra_points);
        self.reset_derived_tetra_data();

        self.finish_build()
    }

    /// The distributed build: `tproc` is the coarse tessellation of the
    /// process subdomains over the same box, with one cell per rank.
    /// Cells near a subdomain boundary obtain ghost generators copied
    /// from peer ranks, so they come out identical to a global build.
    pub fn build_distributed(
        &mut self,
        points: &[Point3d],
        tproc: &Voronoi3D,
        exchange: &mut PointExchange,
    ) -> Result<(), BuildError> {
        assert!(!points.is_empty());
        self.clear();
        let rank = exchange.rank();
        let my_points = self.sort_points_to_subdomain(points, tproc, exchange)?;
        self.n_org = my_points.len();
        let (ll, ur) = tproc.cell_bounding_box(rank as usize);
        self.del.build(&my_points, ur, ll);
        self.reset_derived_tetra_data();

        // Two discovery passes: the second one may reach further
        // subdomain faces through tetras created by the first layer of
        // ghosts, and is allowed to recurse across subdomain faces.
        let mut mirrored: Vec<Vec<usize>> = vec![vec![]; 6];
        for recursive in [false, true] {
            let ghost_candidates = self.find_intersections(tproc, rank, recursive);
            debug!(
                "Ghost discovery (recursive: {}) flagged {} generators",
                recursive,
                ghost_candidates.len()
            );
            let extra_points = self.create_boundary_points_distributed(
                &ghost_candidates,
                tproc,
                rank,
                &mut mirrored,
                exchange,
            );
            self.del.build_extra(&extra_points);
            self.reset_derived_tetra_data();
        }

        self.finish_build()?;

        // Ghost cells owned by peers get their centroid from the rank
        // that computed it.
        let incoming = exchange.exchange(
            &self.duplicated_procs,
            &self.duplicated_points,
            &self.cm,
        );
        for (peer, centroids) in incoming.iter().enumerate() {
            for (k, centroid) in centroids.iter().enumerate() {
                self.cm[self.nghost[peer][k]] = *centroid;
            }
        }
        Ok(())
    }

    fn finish_build(&mut self) -> Result<(), BuildError> {
        self.cm = vec![Point3d::ZERO; self.del.points.len()];
        self.volumes = vec![0.0; self.n_org];
        self.build_faces()?;
        debug!(
            "Built {} faces for {} cells",
            self.face_neighbors.len(),
            self.n_org
        );
        self.accumulate_cell_moments();
        for face in 0..self.face_neighbors.len() {
            if self.boundary_face(face) {
                self.set_mirror_centroid(face);
            }
        }
        Ok(())
    }

    fn clear(&mut self) {
        self.n_org = 0;
        self.big_tet = None;
        self.del.clean();
        self.point_tetras.clear();
        self.radii.clear();
        self.tetra_centers.clear();
        self.faces_in_cell.clear();
        self.points_in_face.clear();
        self.face_neighbors.clear();
        self.cm.clear();
        self.volumes.clear();
        self.areas.clear();
        self.duplicated_procs.clear();
        self.duplicated_points.clear();
        self.nghost.clear();
        self.sent_procs.clear();
        self.sent_points.clear();
        self.self_index.clear();
    }

    /// Invalidates all per-tetra data after the triangulation changed.
    fn reset_derived_tetra_data(&mut self) {
        let num_tetras = self.del.tetras.len();
        self.radii = vec![-1.0; num_tetras];
        self.tetra_centers = vec![Point3d::ZERO; num_tetras];
        self.set_point_tetras();
    }

    pub(crate) fn is_sentinel(&self, point: usize) -> bool {
        point >= self.n_org && point < self.n_org + 4
    }

    // Queries

    /// The number of real generators (and therefore cells).
    pub fn num_cells(&self) -> usize {
        self.n_org
    }

    /// The total number of entries in the point table, including
    /// sentinels and ghosts.
    pub fn total_num_points(&self) -> usize {
        self.del.points.len()
    }

    pub fn total_num_faces(&self) -> usize {
        self.face_neighbors.len()
    }

    pub fn mesh_point(&self, index: usize) -> Point3d {
        self.del.points[index]
    }

    pub fn is_ghost_point(&self, index: usize) -> bool {
        index >= self.n_org
    }

    pub fn cell_faces(&self, cell: usize) -> &[usize] {
        &self.faces_in_cell[cell]
    }

    pub fn face_neighbors(&self, face: usize) -> (usize, usize) {
        self.face_neighbors[face]
    }

    pub fn points_in_face(&self, face: usize) -> &[usize] {
        &self.points_in_face[face]
    }

    /// The Voronoi vertices, indexed by tetra.
    pub fn face_points(&self) -> &[Point3d] {
        &self.tetra_centers
    }

    pub fn volume(&self, cell: usize) -> f64 {
        self.volumes[cell]
    }

    pub fn centroid(&self, index: usize) -> Point3d {
        self.cm[index]
    }

    pub fn all_centroids(&self) -> &[Point3d] {
        &self.cm
    }

    pub fn area(&self, face: usize) -> f64 {
        self.areas[face]
    }

    /// Twice the radius of the sphere of equal volume.
    pub fn width(&self, cell: usize) -> f64 {
        2.0 * (3.0 * self.volumes[cell] / (4.0 * std::f64::consts::PI)).cbrt()
    }

    /// Twice the largest circumradius among the tetras incident to the
    /// generator; an upper bound for the extent of its cell.
    pub fn max_radius(&self, cell: usize) -> f64 {
        2.0 * self.point_tetras[cell]
            .iter()
            .map(|t| self.radii[*t])
            .fold(0.0, f64::max)
    }

    pub fn face_centroid(&self, face: usize) -> Point3d {
        let vertices = &self.points_in_face[face];
        let sum: Point3d = vertices.iter().map(|v| self.tetra_centers[*v]).sum();
        sum / vertices.len() as f64
    }

    /// The (non-normalized) normal of a face, pointing from its first
    /// neighbor towards its second.
    pub fn normal(&self, face: usize) -> Point3d {
        let (n0, n1) = self.face_neighbors[face];
        self.del.points[n1] - self.del.points[n0]
    }

    /// The velocity of a face given the velocities of its two
    /// generators, for moving-mesh callers.
    pub fn face_velocity(&self, face: usize, v0: Point3d, v1: Point3d) -> Point3d {
        let (p0, p1) = self.face_neighbors[face];
        let r0 = self.mesh_point(p0);
        let r1 = self.mesh_point(p1);
        let r_diff = r1 - r0;
        let f = self.face_centroid(face);
        let delta_w = (v0 - v1).dot(f - 0.5 * (r0 + r1)) / r_diff.length_squared() * r_diff;
        0.5 * (v0 + v1) + delta_w
    }

    pub fn neighbors(&self, cell: usize) -> Vec<usize> {
        self.faces_in_cell[cell]
            .iter()
            .map(|face| {
                let (n0, n1) = self.face_neighbors[*face];
                if n0 == cell {
                    n1
                } else {
                    n0
                }
            })
            .collect()
    }

    pub fn neighbor_neighbors(&self, cell: usize) -> Vec<usize> {
        let mut result = self.neighbors(cell);
        for neighbor in self.neighbors(cell) {
            if neighbor < self.n_org {
                result.extend(self.neighbors(neighbor));
            }
        }
        result.sort_unstable();
        result.dedup();
        result
    }

    /// Whether a face separates a cell from a rigid (mirrored) ghost.
    /// Ghosts received from peer subdomains lie inside the box and do
    /// not count as boundary.
    pub fn boundary_face(&self, face: usize) -> bool {
        let (n0, n1) = self.face_neighbors[face];
        let ghost = if n0 >= self.n_org {
            n0
        } else if n1 >= self.n_org {
            n1
        } else {
            return false;
        };
        !self.sim_box.contains(self.del.points[ghost])
    }

    pub fn near_boundary(&self, cell: usize) -> bool {
        self.faces_in_cell[cell]
            .iter()
            .any(|face| self.boundary_face(*face))
    }

    pub fn simulation_box(&self) -> &SimulationBox {
        &self.sim_box
    }

    /// The vertex loop of a face as a polygon.
    pub fn face_polygon(&self, face: usize) -> Polygon {
        Polygon::new(
            self.points_in_face[face]
                .iter()
                .map(|v| self.tetra_centers[*v])
                .collect(),
        )
    }

    /// Whether a point lies inside the (convex) cell of a generator.
    pub fn cell_contains(&self, cell: usize, point: Point3d) -> bool {
        for face in &self.faces_in_cell[cell] {
            let vertices = &self.points_in_face[*face];
            let v_ref = self.tetra_centers[vertices[0]];
            let normal = (self.tetra_centers[vertices[1]] - v_ref)
                .cross(self.tetra_centers[vertices[2]] - self.tetra_centers[vertices[1]]);
            let side_of_generator = (self.mesh_point(cell) - v_ref).dot(normal);
            if (point - v_ref).dot(normal) * side_of_generator < 0.0 {
                return false;
            }
        }
        true
    }

    /// The axis-aligned bounding box of the vertex loops of a cell.
    pub fn cell_bounding_box(&self, cell: usize) -> (Point3d, Point3d) {
        let mut ll = Point3d::splat(f64::INFINITY);
        let mut ur = Point3d::splat(f64::NEG_INFINITY);
        for face in &self.faces_in_cell[cell] {
            for vertex in &self.points_in_face[*face] {
                ll = ll.min(self.tetra_centers[*vertex]);
                ur = ur.max(self.tetra_centers[*vertex]);
            }
        }
        (ll, ur)
    }

    // Distributed bookkeeping

    /// The peers this rank shipped ghost generators to, and receives
    /// ghost data from.
    pub fn duplicated_procs(&self) -> &[Rank] {
        &self.duplicated_procs
    }

    /// Per peer, the local indices of the generators shipped to it, in
    /// shipping order.
    pub fn duplicated_points(&self) -> &[Vec<usize>] {
        &self.duplicated_points
    }

    /// Per peer, the indices in the point table of the ghosts received
    /// from it, in receive order.
    pub fn ghost_indices(&self) -> &[Vec<usize>] {
        &self.nghost
    }

    /// The ranks this rank reassigned input points to during ingest.
    pub fn sent_procs(&self) -> &[Rank] {
        &self.sent_procs
    }

    /// Per entry of `sent_procs`, the input indices of the points
    /// reassigned to that rank.
    pub fn sent_points(&self) -> &[Vec<usize>] {
        &self.sent_points
    }

    /// The input indices of the points this rank kept during ingest.
    pub fn self_index(&self) -> &[usize] {
        &self.self_index
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use ordered_float::OrderedFloat;
    use rand::rngs::StdRng;
    use rand::Rng;
    use rand::SeedableRng;

    use super::output::read_tessellation;
    use super::Voronoi3D;
    use crate::error::BuildError;
    use crate::primitives::Point3d;

    pub fn assert_float_is_close(x: f64, y: f64) {
        assert!((x - y).abs() < 1e-9 * (1.0 + y.abs()), "{} != {}", x, y)
    }

    pub fn assert_point_is_close(p: Point3d, q: Point3d) {
        assert!(p.distance(q) < 1e-9, "{:?} != {:?}", p, q)
    }

    pub fn random_points(num: usize, seed: u64) -> Vec<Point3d> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..num)
            .map(|_| {
                Point3d::new(
                    rng.gen_range(0.0..1.0),
                    rng.gen_range(0.0..1.0),
                    rng.gen_range(0.0..1.0),
                )
            })
            .collect()
    }

    pub fn unit_box() -> Voronoi3D {
        Voronoi3D::new(Point3d::ZERO, Point3d::ONE)
    }

    #[test]
    fn single_point_fills_the_cube() {
        let mut tessellation = unit_box();
        tessellation.build(&[Point3d::splat(0.5)]).unwrap();
        assert_eq!(tessellation.num_cells(), 1);
        assert_eq!(tessellation.cell_faces(0).len(), 6);
        assert_float_is_close(tessellation.volume(0), 1.0);
        assert_point_is_close(tessellation.centroid(0), Point3d::splat(0.5));
        assert_float_is_close(tessellation.width(0), 2.0 * (3.0 / (4.0 * PI)).cbrt());
        assert!(tessellation.near_boundary(0));
        for face in tessellation.cell_faces(0) {
            assert_float_is_close(tessellation.area(*face), 1.0);
            assert!(tessellation.boundary_face(*face));
            // Each face centroid sits at the middle of a box side.
            let centroid = tessellation.face_centroid(*face);
            let on_surface = [centroid.x, centroid.y, centroid.z]
                .iter()
                .filter(|c| c.abs() < 1e-9 || (**c - 1.0).abs() < 1e-9)
                .count();
            let centered = [centroid.x, centroid.y, centroid.z]
                .iter()
                .filter(|c| (**c - 0.5).abs() < 1e-9)
                .count();
            assert_eq!((on_surface, centered), (1, 2));
        }
        // No sentinel may ever show up as a face endpoint.
        for face in 0..tessellation.total_num_faces() {
            let (n0, n1) = tessellation.face_neighbors(face);
            assert!(!tessellation.is_sentinel(n0));
            assert!(!tessellation.is_sentinel(n1));
        }
    }

    #[test]
    fn two_point_split_along_x() {
        let mut tessellation = unit_box();
        let points = [Point3d::new(0.25, 0.5, 0.5), Point3d::new(0.75, 0.5, 0.5)];
        tessellation.build(&points).unwrap();
        assert_eq!(tessellation.num_cells(), 2);
        assert_float_is_close(tessellation.volume(0), 0.5);
        assert_float_is_close(tessellation.volume(1), 0.5);
        assert_point_is_close(tessellation.centroid(0), Point3d::new(0.25, 0.5, 0.5));
        assert_point_is_close(tessellation.centroid(1), Point3d::new(0.75, 0.5, 0.5));
        let internal: Vec<usize> = (0..tessellation.total_num_faces())
            .filter(|face| tessellation.face_neighbors(*face) == (0, 1))
            .collect();
        assert_eq!(internal.len(), 1);
        let face = internal[0];
        assert_float_is_close(tessellation.area(face), 1.0);
        assert!(!tessellation.boundary_face(face));
        assert_point_is_close(tessellation.face_centroid(face), Point3d::new(0.5, 0.5, 0.5));
        assert_point_is_close(tessellation.normal(face), Point3d::new(0.5, 0.0, 0.0));
        assert!(tessellation.neighbors(0).contains(&1));
        assert!(tessellation.neighbors(1).contains(&0));
        assert!(tessellation.neighbor_neighbors(0).contains(&0));
    }

    #[test]
    fn regular_grid_cells() {
        let mut points = vec![];
        for i in 0..4 {
            for j in 0..4 {
                for k in 0..4 {
                    points.push(Point3d::new(
                        (i as f64 + 0.5) / 4.0,
                        (j as f64 + 0.5) / 4.0,
                        (k as f64 + 0.5) / 4.0,
                    ));
                }
            }
        }
        let mut tessellation = unit_box();
        tessellation.build(&points).unwrap();
        let mut total_volume = 0.0;
        for cell in 0..64 {
            assert_float_is_close(tessellation.volume(cell), 1.0 / 64.0);
            assert_point_is_close(tessellation.centroid(cell), points[cell]);
            total_volume += tessellation.volume(cell);
        }
        assert_float_is_close(total_volume, 1.0);
        let is_edge_index = |i: usize| i == 0 || i == 3;
        for i in 0..4 {
            for j in 0..4 {
                for k in 0..4 {
                    let cell = i * 16 + j * 4 + k;
                    let num_boundary = tessellation
                        .cell_faces(cell)
                        .iter()
                        .filter(|face| tessellation.boundary_face(**face))
                        .count();
                    if !is_edge_index(i) && !is_edge_index(j) && !is_edge_index(k) {
                        assert_eq!(tessellation.cell_faces(cell).len(), 6);
                        assert_eq!(num_boundary, 0);
                    }
                    if is_edge_index(i) && is_edge_index(j) && is_edge_index(k) {
                        assert_eq!(num_boundary, 3);
                    }
                }
            }
        }
    }

    #[test]
    fn cell_volumes_sum_to_box_volume() {
        let points = random_points(64, 1338);
        let mut tessellation = unit_box();
        tessellation.build(&points).unwrap();
        let total: f64 = (0..64).map(|cell| tessellation.volume(cell)).sum();
        assert_float_is_close(total, 1.0);
    }

    #[test]
    fn faces_are_symmetric_and_right_handed() {
        let points = random_points(32, 42);
        let mut tessellation = unit_box();
        tessellation.build(&points).unwrap();
        for face in 0..tessellation.total_num_faces() {
            let (n0, n1) = tessellation.face_neighbors(face);
            assert!(n0 < n1);
            assert!(n0 < tessellation.num_cells());
            assert!(!tessellation.is_sentinel(n0) && !tessellation.is_sentinel(n1));
            let count = |cell: usize| {
                tessellation
                    .cell_faces(cell)
                    .iter()
                    .filter(|f| **f == face)
                    .count()
            };
            assert_eq!(count(n0), 1);
            if n1 < tessellation.num_cells() {
                assert_eq!(count(n1), 1);
            }
            // Right handed as seen from the first neighbor, left handed
            // as seen from the second.
            let vertices = tessellation.points_in_face(face);
            assert!(vertices.len() >= 3);
            let centers = tessellation.face_points();
            let first = centers[vertices[0]];
            let handedness = (centers[vertices[1]] - first)
                .cross(centers[*vertices.last().unwrap()] - first);
            assert!(handedness.dot(tessellation.mesh_point(n0) - first) > -1e-12);
            assert!(handedness.dot(tessellation.mesh_point(n1) - first) < 1e-12);
        }
    }

    #[test]
    fn neighbor_relation_is_symmetric() {
        let points = random_points(32, 7);
        let mut tessellation = unit_box();
        tessellation.build(&points).unwrap();
        for cell in 0..tessellation.num_cells() {
            for neighbor in tessellation.neighbors(cell) {
                if neighbor < tessellation.num_cells() {
                    assert!(tessellation.neighbors(neighbor).contains(&cell));
                }
            }
        }
    }

    #[test]
    fn face_loops_have_no_duplicates_and_positive_area() {
        let points = random_points(32, 99);
        let mut tessellation = unit_box();
        tessellation.build(&points).unwrap();
        for face in 0..tessellation.total_num_faces() {
            assert!(tessellation.area(face) > 0.0);
            let vertices = tessellation.points_in_face(face);
            let centers = tessellation.face_points();
            for i in 0..vertices.len() {
                let next = (i + 1) % vertices.len();
                assert!(centers[vertices[i]].distance_squared(centers[vertices[next]]) > 0.0);
            }
        }
    }

    #[test]
    fn mirror_ghost_centroids_are_reflections() {
        let mut tessellation = unit_box();
        let points = [Point3d::new(0.25, 0.5, 0.5), Point3d::new(0.75, 0.5, 0.5)];
        tessellation.build(&points).unwrap();
        for face in 0..tessellation.total_num_faces() {
            if !tessellation.boundary_face(face) {
                continue;
            }
            let (n0, n1) = tessellation.face_neighbors(face);
            let (real, ghost) = if n0 < tessellation.num_cells() {
                (n0, n1)
            } else {
                (n1, n0)
            };
            let reflected = tessellation.face_polygon(face).mirror(tessellation.centroid(real));
            assert!(reflected.distance(tessellation.centroid(ghost)) < 1e-10);
        }
    }

    #[test]
    fn containing_cell_is_nearest_generator() {
        let points = random_points(32, 5);
        let mut tessellation = unit_box();
        tessellation.build(&points).unwrap();
        let mut num_found = 0;
        for lookup in random_points(50, 6) {
            let containing =
                (0..tessellation.num_cells()).find(|cell| tessellation.cell_contains(*cell, lookup));
            let closest = (0..tessellation.num_cells())
                .min_by_key(|cell| OrderedFloat(tessellation.mesh_point(*cell).distance(lookup)))
                .unwrap();
            if let Some(containing) = containing {
                num_found += 1;
                let containing_distance = tessellation.mesh_point(containing).distance(lookup);
                let closest_distance = tessellation.mesh_point(closest).distance(lookup);
                assert!(containing_distance <= closest_distance + 1e-9);
            }
        }
        assert!(num_found != 0);
    }

    #[test]
    fn coplanar_quartet_is_not_silently_corrupted() {
        let points = [
            Point3d::new(0.3, 0.3, 0.5),
            Point3d::new(0.7, 0.3, 0.5),
            Point3d::new(0.3, 0.7, 0.5),
            Point3d::new(0.7, 0.7, 0.5),
        ];
        let mut tessellation = unit_box();
        match tessellation.build(&points) {
            Ok(()) => {
                let total: f64 = (0..4).map(|cell| tessellation.volume(cell)).sum();
                assert_float_is_close(total, 1.0);
                for face in 0..tessellation.total_num_faces() {
                    assert!(tessellation.area(face) > 1e-12);
                    assert!(tessellation.points_in_face(face).len() >= 3);
                }
                for cell in 0..tessellation.num_cells() {
                    for neighbor in tessellation.neighbors(cell) {
                        if neighbor < tessellation.num_cells() {
                            assert!(tessellation.neighbors(neighbor).contains(&cell));
                        }
                    }
                }
            }
            Err(BuildError::FaceWalkFailure { .. }) => {}
            Err(other) => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn output_roundtrip() {
        let mut tessellation = unit_box();
        let points = [Point3d::new(0.25, 0.5, 0.5), Point3d::new(0.75, 0.5, 0.5)];
        tessellation.build(&points).unwrap();
        let path = std::env::temp_dir().join("voronoi3d_output_roundtrip.bin");
        tessellation.output(&path).unwrap();
        let raw = read_tessellation(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(raw.generators.len(), 2);
        for (cell, generator) in raw.generators.iter().enumerate() {
            assert_eq!(*generator, tessellation.mesh_point(cell));
        }
        assert_eq!(raw.voronoi_vertices.len(), tessellation.face_points().len());
        for (vertex, center) in raw.voronoi_vertices.iter().zip(tessellation.face_points()) {
            assert_eq!(vertex, center);
        }
        assert_eq!(raw.face_vertices.len(), tessellation.total_num_faces());
        for cell in 0..2 {
            let expected: Vec<i32> = tessellation
                .cell_faces(cell)
                .iter()
                .map(|f| *f as i32)
                .collect();
            assert_eq!(raw.cell_faces[cell], expected);
        }
        for face in 0..tessellation.total_num_faces() {
            let expected: Vec<i32> = tessellation
                .points_in_face(face)
                .iter()
                .map(|v| *v as i32)
                .collect();
            assert_eq!(raw.face_vertices[face], expected);
        }
    }

    #[test]
    fn face_velocity_interpolates_generator_velocities() {
        let mut tessellation = unit_box();
        let points = [Point3d::new(0.25, 0.5, 0.5), Point3d::new(0.75, 0.5, 0.5)];
        tessellation.build(&points).unwrap();
        let face = (0..tessellation.total_num_faces())
            .find(|face| tessellation.face_neighbors(*face) == (0, 1))
            .unwrap();
        let v = Point3d::new(1.0, 2.0, 3.0);
        assert_point_is_close(tessellation.face_velocity(face, v, v), v);
        let w = tessellation.face_velocity(
            face,
            Point3d::new(1.0, 0.0, 0.0),
            Point3d::new(-1.0, 0.0, 0.0),
        );
        assert_point_is_close(w, Point3d::ZERO);
    }
}
