use crate::primitives::Point3d;
use crate::primitives::Polygon;

/// The axis-aligned domain of the tessellation. Mirror ghosts are
/// reflections of generators across the planes of its six faces.
#[derive(Clone, Copy, Debug)]
pub struct SimulationBox {
    pub ll: Point3d,
    pub ur: Point3d,
}

impl SimulationBox {
    pub fn new(ll: Point3d, ur: Point3d) -> Self {
        assert!(ll.x < ur.x && ll.y < ur.y && ll.z < ur.z);
        Self { ll, ur }
    }

    pub fn side_lengths(&self) -> Point3d {
        self.ur - self.ll
    }

    pub fn volume(&self) -> f64 {
        let d = self.side_lengths();
        d.x * d.y * d.z
    }

    pub fn contains(&self, point: Point3d) -> bool {
        point.x > self.ll.x
            && point.x < self.ur.x
            && point.y > self.ll.y
            && point.y < self.ur.y
            && point.z > self.ll.z
            && point.z < self.ur.z
    }

    /// The six faces of the box. The index of a face in this list is the
    /// `face_id` used throughout ghost discovery.
    pub fn faces(&self) -> Vec<Polygon> {
        let d = self.side_lengths();
        let p = [
            self.ll,
            self.ll + Point3d::new(d.x, 0.0, 0.0),
            self.ll + Point3d::new(d.x, d.y, 0.0),
            self.ll + Point3d::new(0.0, d.y, 0.0),
            self.ll + Point3d::new(0.0, 0.0, d.z),
            self.ll + Point3d::new(d.x, 0.0, d.z),
            self.ur,
            self.ll + Point3d::new(0.0, d.y, d.z),
        ];
        [
            [0, 1, 2, 3],
            [0, 4, 5, 1],
            [3, 7, 4, 0],
            [2, 6, 7, 3],
            [1, 5, 6, 2],
            [5, 4, 7, 6],
        ]
        .iter()
        .map(|idx| Polygon::new(idx.iter().map(|i| p[*i]).collect()))
        .collect()
    }

    /// Outward normals of `faces()`, in the same order.
    pub fn face_normals(&self) -> Vec<Point3d> {
        self.faces()
            .iter()
            .map(|face| {
                (face.vertices[2] - face.vertices[0]).cross(face.vertices[1] - face.vertices[0])
            })
            .collect()
    }
}

/// The box face whose outward normal is most aligned with `direction`.
pub fn most_aligned_face(normals: &[Point3d], direction: Point3d) -> usize {
    let mut best = 0;
    let mut best_dot = normals[0].dot(direction);
    for (i, normal) in normals.iter().enumerate().skip(1) {
        let dot = normal.dot(direction);
        if dot > best_dot {
            best_dot = dot;
            best = i;
        }
    }
    best
}
