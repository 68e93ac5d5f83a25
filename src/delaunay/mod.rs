pub mod tetra;

use std::collections::HashMap;
use std::collections::HashSet;

use log::debug;

pub use self::tetra::Tetra;
pub use self::tetra::NO_NEIGHBOR;
use crate::math::determinant4x4_sign;
use crate::math::determinant5x5_sign;
use crate::math::Sign;
use crate::primitives::Point3d;

/// Incremental Delaunay tetrahedralization.
///
/// `build` stores the N input points, appends four sentinel points
/// (indices N..N+4) forming a tetra that encloses the given box by a
/// wide margin, and inserts the input points one by one. `build_extra`
/// appends further points without touching the existing ones, which is
/// how ghost generators enter the triangulation.
///
/// Tetra slots are stable: removing a tetra adds its index to
/// `empty_tetras`, and freed slots are reused by later insertions.
#[derive(Clone, Default)]
pub struct Delaunay {
    pub points: Vec<Point3d>,
    pub tetras: Vec<Tetra>,
    pub empty_tetras: HashSet<usize>,
    last_inserted: usize,
}

struct BoundaryFace {
    vertices: [usize; 3],
    /// Reference vertex of the removed tetra on the cavity side of
    /// this face.
    inner_vertex: usize,
    outer: usize,
}

impl Delaunay {
    pub fn build(&mut self, points: &[Point3d], ur: Point3d, ll: Point3d) {
        self.clean();
        self.points.extend_from_slice(points);
        let n = points.len();
        self.create_sentinel_tetra(n, ll, ur);
        for i in 0..n {
            self.insert(i);
        }
        debug!(
            "Built Delaunay triangulation of {} points ({} tetras)",
            n,
            self.tetras.len() - self.empty_tetras.len()
        );
    }

    /// Append-only extension of the triangulation.
    pub fn build_extra(&mut self, extra_points: &[Point3d]) {
        for point in extra_points {
            let index = self.points.len();
            self.points.push(*point);
            self.insert(index);
        }
        debug!(
            "Extended Delaunay triangulation by {} points",
            extra_points.len()
        );
    }

    pub fn clean(&mut self) {
        self.points.clear();
        self.tetras.clear();
        self.empty_tetras.clear();
        self.last_inserted = 0;
    }

    fn create_sentinel_tetra(&mut self, n: usize, ll: Point3d, ur: Point3d) {
        let center = 0.5 * (ll + ur);
        let scale = 100.0 * (ur - ll).length();
        for corner in [
            Point3d::new(1.0, 1.0, 1.0),
            Point3d::new(1.0, -1.0, -1.0),
            Point3d::new(-1.0, 1.0, -1.0),
            Point3d::new(-1.0, -1.0, 1.0),
        ] {
            self.points.push(center + corner * scale);
        }
        let mut tetra = Tetra {
            points: [n, n + 1, n + 2, n + 3],
            neighbors: [NO_NEIGHBOR; 4],
        };
        if self.orientation(tetra.points) == Sign::Negative {
            tetra.points.swap(0, 1);
        }
        self.tetras.push(tetra);
        self.last_inserted = 0;
    }

    fn insert(&mut self, point_index: usize) {
        let point = self.points[point_index];
        let start = self.locate(point);
        let mut cavity = self.conflict_cavity(start, point);
        let boundary = self.cavity_boundary_with_repair(&mut cavity, point);
        self.retriangulate(cavity, boundary, point_index);
    }

    /// Sign of the orientation of four points given by index.
    fn orientation(&self, points: [usize; 4]) -> Sign {
        let [a, b, c, d] = points.map(|p| self.points[p]);
        orientation_of_positions(a, b, c, d)
    }

    fn face_side(&self, face: [usize; 3], point: Point3d) -> Sign {
        let [a, b, c] = face.map(|p| self.points[p]);
        orientation_of_positions(a, b, c, point)
    }

    /// Walks from the last touched tetra towards the tetra containing
    /// `point`. Falls back to a linear scan if the walk does not settle.
    fn locate(&self, point: Point3d) -> usize {
        let mut current = self.live_start_tetra();
        let max_steps = 4 * (self.tetras.len() + 1);
        for _ in 0..max_steps {
            match self.step_towards(current, point) {
                Some(next) => current = next,
                None => return current,
            }
        }
        self.locate_by_scan(point)
    }

    fn live_start_tetra(&self) -> usize {
        if !self.empty_tetras.contains(&self.last_inserted) {
            return self.last_inserted;
        }
        (0..self.tetras.len())
            .find(|t| !self.empty_tetras.contains(t))
            .expect("no live tetra in triangulation")
    }

    /// The neighbor behind the first face that strictly separates
    /// `point` from the tetra, or None if no face does.
    fn step_towards(&self, current: usize, point: Point3d) -> Option<usize> {
        let tetra = &self.tetras[current];
        for k in 0..4 {
            let face = tetra.face_opposite(k);
            let side_of_point = self.face_side(face, point);
            if side_of_point == Sign::Zero {
                continue;
            }
            let side_of_tetra = self.face_side(face, self.points[tetra.points[k]]);
            if side_of_point != side_of_tetra {
                let neighbor = tetra.neighbors[k];
                assert!(
                    neighbor != NO_NEIGHBOR,
                    "point outside the sentinel tetra"
                );
                return Some(neighbor);
            }
        }
        None
    }

    fn contains(&self, tetra: usize, point: Point3d) -> bool {
        self.step_towards(tetra, point).is_none()
    }

    fn locate_by_scan(&self, point: Point3d) -> usize {
        (0..self.tetras.len())
            .filter(|t| !self.empty_tetras.contains(t))
            .find(|t| self.contains(*t, point))
            .expect("no tetra contains the point")
    }

    /// Whether `point` lies strictly inside the circumsphere. The tetra
    /// is positively oriented by construction, so a negative sign of
    /// the lifted determinant means containment; an exactly cospherical
    /// point does not conflict.
    fn circumsphere_contains(&self, tetra: usize, point: Point3d) -> bool {
        let [a, b, c, d] = self.tetras[tetra].points.map(|p| self.points[p]);
        let row = |p: Point3d| [1.0, p.x, p.y, p.z, p.length_squared()];
        determinant5x5_sign([row(a), row(b), row(c), row(d), row(point)]) == Sign::Negative
    }

    /// All tetras whose circumsphere conflicts with `point`, grown from
    /// the containing tetra. The containing tetra itself is always part
    /// of the cavity.
    fn conflict_cavity(&self, start: usize, point: Point3d) -> HashSet<usize> {
        let mut cavity = HashSet::from([start]);
        let mut stack = vec![start];
        while let Some(t) = stack.pop() {
            for neighbor in self.tetras[t].neighbors {
                if neighbor == NO_NEIGHBOR || cavity.contains(&neighbor) {
                    continue;
                }
                if self.circumsphere_contains(neighbor, point) {
                    cavity.insert(neighbor);
                    stack.push(neighbor);
                }
            }
        }
        cavity
    }

    /// Collects the faces between the cavity and the surviving tetras.
    /// Whenever a boundary face is not strictly visible from the new
    /// point (which happens for exactly cospherical or coplanar
    /// configurations), the tetra behind it is pulled into the cavity
    /// and the boundary recomputed, so that the retriangulation never
    /// produces a degenerate tetra.
    fn cavity_boundary_with_repair(
        &self,
        cavity: &mut HashSet<usize>,
        point: Point3d,
    ) -> Vec<BoundaryFace> {
        loop {
            let boundary = self.cavity_boundary(cavity);
            let blocked = boundary
                .iter()
                .find(|face| {
                    let side_of_point = self.face_side(face.vertices, point);
                    let side_of_inner =
                        self.face_side(face.vertices, self.points[face.inner_vertex]);
                    side_of_point == Sign::Zero || side_of_point != side_of_inner
                })
                .map(|face| face.outer);
            match blocked {
                Some(outer) => {
                    assert!(
                        outer != NO_NEIGHBOR,
                        "cavity repair reached the hull of the sentinel tetra"
                    );
                    cavity.insert(outer);
                }
                None => return boundary,
            }
        }
    }

    fn cavity_boundary(&self, cavity: &HashSet<usize>) -> Vec<BoundaryFace> {
        let mut boundary = vec![];
        let mut sorted: Vec<usize> = cavity.iter().copied().collect();
        sorted.sort_unstable();
        for t in sorted {
            let tetra = &self.tetras[t];
            for k in 0..4 {
                let neighbor = tetra.neighbors[k];
                if neighbor != NO_NEIGHBOR && cavity.contains(&neighbor) {
                    continue;
                }
                boundary.push(BoundaryFace {
                    vertices: tetra.face_opposite(k),
                    inner_vertex: tetra.points[k],
                    outer: neighbor,
                });
            }
        }
        boundary
    }

    fn retriangulate(
        &mut self,
        cavity: HashSet<usize>,
        boundary: Vec<BoundaryFace>,
        point_index: usize,
    ) {
        let point = self.points[point_index];
        let mut free: Vec<usize> = cavity.into_iter().collect();
        free.sort_unstable();
        let mut slots = Vec::with_capacity(boundary.len());
        for face in &boundary {
            let [a, mut b, mut c] = face.vertices;
            let [pa, pb, pc] = [a, b, c].map(|p| self.points[p]);
            if orientation_of_positions(pa, pb, pc, point) == Sign::Negative {
                std::mem::swap(&mut b, &mut c);
            }
            let slot = self.allocate_slot(&mut free);
            self.tetras[slot] = Tetra {
                points: [a, b, c, point_index],
                neighbors: [NO_NEIGHBOR, NO_NEIGHBOR, NO_NEIGHBOR, face.outer],
            };
            slots.push(slot);
        }
        for slot in free {
            self.empty_tetras.insert(slot);
        }
        self.wire_neighbors(&boundary, &slots);
        self.last_inserted = slots[0];
    }

    fn allocate_slot(&mut self, free: &mut Vec<usize>) -> usize {
        if let Some(slot) = free.pop() {
            return slot;
        }
        if let Some(&slot) = self.empty_tetras.iter().min() {
            self.empty_tetras.remove(&slot);
            return slot;
        }
        self.tetras.push(Tetra {
            points: [0; 4],
            neighbors: [NO_NEIGHBOR; 4],
        });
        self.tetras.len() - 1
    }

    fn wire_neighbors(&mut self, boundary: &[BoundaryFace], slots: &[usize]) {
        // Adjacent new tetras share the new point and one edge of their
        // base triangles.
        let mut edge_to_slot: HashMap<(usize, usize), (usize, usize)> = HashMap::new();
        for (face, &slot) in boundary.iter().zip(slots) {
            let [a, b, c, _] = self.tetras[slot].points;
            if face.outer != NO_NEIGHBOR {
                let outer = &mut self.tetras[face.outer];
                let position = (0..4)
                    .find(|&j| {
                        let p = outer.points[j];
                        p != a && p != b && p != c
                    })
                    .expect("outer tetra does not share the boundary face");
                outer.neighbors[position] = slot;
            }
            for (position, edge) in [(0, (b, c)), (1, (a, c)), (2, (a, b))] {
                let key = (edge.0.min(edge.1), edge.0.max(edge.1));
                match edge_to_slot.remove(&key) {
                    Some((other_slot, other_position)) => {
                        self.tetras[slot].neighbors[position] = other_slot;
                        self.tetras[other_slot].neighbors[other_position] = slot;
                    }
                    None => {
                        edge_to_slot.insert(key, (slot, position));
                    }
                }
            }
        }
        debug_assert!(edge_to_slot.is_empty());
    }
}

fn orientation_of_positions(a: Point3d, b: Point3d, c: Point3d, d: Point3d) -> Sign {
    let row = |p: Point3d| [1.0, p.x, p.y, p.z];
    determinant4x4_sign([row(a), row(b), row(c), row(d)])
}

#[cfg(test)]
pub(crate) mod tests {
    use super::Delaunay;
    use super::Sign;
    use super::NO_NEIGHBOR;
    use crate::primitives::Point3d;

    pub fn example_points() -> Vec<Point3d> {
        vec![
            Point3d::new(0.5, 0.5, 0.5),
            Point3d::new(0.25, 0.5, 0.5),
            Point3d::new(0.5, 0.25, 0.5),
            Point3d::new(0.5, 0.5, 0.25),
            Point3d::new(0.125, 0.5, 0.5),
            Point3d::new(0.8, 0.1, 0.9),
            Point3d::new(0.1, 0.8, 0.2),
            Point3d::new(0.9, 0.9, 0.1),
            Point3d::new(0.3, 0.7, 0.6),
        ]
    }

    pub fn perform_check_on_each_level_of_construction(
        check: impl Fn(&Delaunay, usize),
    ) {
        let points = example_points();
        let mut triangulation = Delaunay::default();
        triangulation.build(&[], Point3d::ONE, Point3d::ZERO);
        check(&triangulation, 0);
        for (num_inserted, point) in points.iter().enumerate() {
            triangulation.build_extra(&[*point]);
            check(&triangulation, num_inserted + 1);
        }
    }

    fn live_tetras(triangulation: &Delaunay) -> impl Iterator<Item = usize> + '_ {
        (0..triangulation.tetras.len()).filter(|t| !triangulation.empty_tetras.contains(t))
    }

    #[test]
    fn correct_number_of_points() {
        perform_check_on_each_level_of_construction(|triangulation, num_inserted| {
            assert_eq!(triangulation.points.len(), 4 + num_inserted);
        });
    }

    #[test]
    fn tetras_are_positively_oriented() {
        perform_check_on_each_level_of_construction(|triangulation, _| {
            for t in live_tetras(triangulation) {
                assert_eq!(
                    triangulation.orientation(triangulation.tetras[t].points),
                    Sign::Positive
                );
            }
        });
    }

    #[test]
    fn neighbors_are_symmetric_and_share_a_face() {
        perform_check_on_each_level_of_construction(|triangulation, _| {
            for t in live_tetras(triangulation) {
                let tetra = &triangulation.tetras[t];
                for k in 0..4 {
                    let neighbor = tetra.neighbors[k];
                    if neighbor == NO_NEIGHBOR {
                        continue;
                    }
                    assert!(!triangulation.empty_tetras.contains(&neighbor));
                    let other = &triangulation.tetras[neighbor];
                    let position = (0..4)
                        .find(|&j| other.neighbors[j] == t)
                        .expect("neighbor relation is not symmetric");
                    let mut shared = tetra.face_opposite(k);
                    let mut other_shared = other.face_opposite(position);
                    shared.sort();
                    other_shared.sort();
                    assert_eq!(shared, other_shared);
                }
            }
        });
    }

    #[test]
    fn every_inserted_point_is_a_vertex() {
        perform_check_on_each_level_of_construction(|triangulation, num_inserted| {
            // The four sentinels occupy indices 0..4 here since the
            // points enter via build_extra.
            for point in 4..4 + num_inserted {
                assert!(live_tetras(triangulation)
                    .any(|t| triangulation.tetras[t].contains_point(point)));
            }
        });
    }

    #[test]
    fn circumspheres_contain_no_other_points() {
        perform_check_on_each_level_of_construction(|triangulation, _| {
            for t in live_tetras(triangulation) {
                for (p, point) in triangulation.points.iter().enumerate() {
                    if triangulation.tetras[t].contains_point(p) {
                        continue;
                    }
                    assert!(
                        !triangulation.circumsphere_contains(t, *point),
                        "circumsphere of tetra {} contains point {}",
                        t,
                        p
                    );
                }
            }
        });
    }

    #[test]
    fn regular_grid_insertion_stays_consistent() {
        // Grid points are maximally cospherical; the cavity repair has
        // to keep the triangulation valid anyway.
        let mut points = vec![];
        for i in 0..3 {
            for j in 0..3 {
                for k in 0..3 {
                    points.push(Point3d::new(
                        (1 + 2 * i) as f64 / 6.0,
                        (1 + 2 * j) as f64 / 6.0,
                        (1 + 2 * k) as f64 / 6.0,
                    ));
                }
            }
        }
        let mut triangulation = Delaunay::default();
        triangulation.build(&points, Point3d::ONE, Point3d::ZERO);
        for t in live_tetras(&triangulation) {
            assert_eq!(
                triangulation.orientation(triangulation.tetras[t].points),
                Sign::Positive
            );
            for (p, point) in triangulation.points.iter().enumerate() {
                if !triangulation.tetras[t].contains_point(p) {
                    assert!(!triangulation.circumsphere_contains(t, *point));
                }
            }
        }
    }
}
