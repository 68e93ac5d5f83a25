use super::Float;
use super::Point3d;

/// A planar convex polygon, given by its vertex loop. Used for the six
/// faces of the simulation box and for the faces of a process
/// tessellation cell.
#[derive(Clone, Debug)]
pub struct Polygon {
    pub vertices: Vec<Point3d>,
}

impl Polygon {
    pub fn new(vertices: Vec<Point3d>) -> Self {
        debug_assert!(vertices.len() >= 3);
        Self { vertices }
    }

    pub fn normal(&self) -> Point3d {
        (self.vertices[1] - self.vertices[0]).cross(self.vertices[2] - self.vertices[0])
    }

    pub fn unit_normal(&self) -> Point3d {
        self.normal().normalize()
    }

    /// Reflects a point across the plane of the polygon.
    pub fn mirror(&self, point: Point3d) -> Point3d {
        let normal = self.unit_normal();
        point - 2.0 * (point - self.vertices[0]).dot(normal) * normal
    }

    /// Signed distance of a point to the plane of the polygon, with
    /// respect to `normal()`.
    pub fn plane_distance(&self, point: Point3d) -> Float {
        (point - self.vertices[0]).dot(self.unit_normal())
    }

    /// Whether the projection of `point` onto the plane of the polygon
    /// lies inside the polygon. Assumes a convex vertex loop.
    pub fn projection_is_inside(&self, point: Point3d) -> bool {
        let normal = self.normal();
        let n = self.vertices.len();
        let mut has_positive = false;
        let mut has_negative = false;
        for i in 0..n {
            let v0 = self.vertices[i];
            let v1 = self.vertices[(i + 1) % n];
            let side = (v1 - v0).cross(point - v0).dot(normal);
            if side > 0.0 {
                has_positive = true;
            }
            if side < 0.0 {
                has_negative = true;
            }
        }
        !(has_positive && has_negative)
    }

    /// Squared distance from a point to the closest point on any edge
    /// of the polygon.
    pub fn edge_distance_squared(&self, point: Point3d) -> Float {
        let n = self.vertices.len();
        let mut min = Float::INFINITY;
        for i in 0..n {
            let v0 = self.vertices[i];
            let v1 = self.vertices[(i + 1) % n];
            min = min.min(segment_distance_squared(v0, v1, point));
        }
        min
    }
}

fn segment_distance_squared(v0: Point3d, v1: Point3d, point: Point3d) -> Float {
    let edge = v1 - v0;
    let t = (point - v0).dot(edge) / edge.length_squared();
    let closest = v0 + edge * t.clamp(0.0, 1.0);
    closest.distance_squared(point)
}

#[cfg(test)]
mod tests {
    use super::Point3d;
    use super::Polygon;

    fn unit_square() -> Polygon {
        Polygon::new(vec![
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(1.0, 0.0, 0.0),
            Point3d::new(1.0, 1.0, 0.0),
            Point3d::new(0.0, 1.0, 0.0),
        ])
    }

    #[test]
    fn mirror_reflects_across_the_plane() {
        let square = unit_square();
        let mirrored = square.mirror(Point3d::new(0.3, 0.4, 0.25));
        assert!(mirrored.abs_diff_eq(Point3d::new(0.3, 0.4, -0.25), 1e-12));
    }

    #[test]
    fn projection_containment() {
        let square = unit_square();
        assert!(square.projection_is_inside(Point3d::new(0.5, 0.5, 3.0)));
        assert!(!square.projection_is_inside(Point3d::new(1.5, 0.5, 3.0)));
    }
}
