use super::polygon::Polygon;
use super::Float;
use super::Point3d;

#[derive(Clone, Copy, Debug)]
pub struct Sphere {
    pub center: Point3d,
    pub radius: Float,
}

impl Sphere {
    pub fn new(center: Point3d, radius: Float) -> Self {
        Self { center, radius }
    }
}

/// Whether a planar convex polygon intersects a sphere, i.e. whether the
/// closest point of the polygon to the sphere center is within the radius.
pub fn face_intersects_sphere(face: &Polygon, sphere: &Sphere) -> bool {
    let plane_distance = face.plane_distance(sphere.center);
    if plane_distance.abs() > sphere.radius {
        return false;
    }
    if face.projection_is_inside(sphere.center) {
        return true;
    }
    face.edge_distance_squared(sphere.center) <= sphere.radius * sphere.radius
}

#[cfg(test)]
mod tests {
    use super::face_intersects_sphere;
    use super::Point3d;
    use super::Polygon;
    use super::Sphere;

    fn unit_square() -> Polygon {
        Polygon::new(vec![
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(1.0, 0.0, 0.0),
            Point3d::new(1.0, 1.0, 0.0),
            Point3d::new(0.0, 1.0, 0.0),
        ])
    }

    #[test]
    fn sphere_above_the_interior() {
        let face = unit_square();
        let hit = Sphere::new(Point3d::new(0.5, 0.5, 0.3), 0.4);
        let miss = Sphere::new(Point3d::new(0.5, 0.5, 0.5), 0.4);
        assert!(face_intersects_sphere(&face, &hit));
        assert!(!face_intersects_sphere(&face, &miss));
    }

    #[test]
    fn sphere_beyond_an_edge() {
        let face = unit_square();
        // Touches only if it reaches the edge x = 1, not just the plane.
        let hit = Sphere::new(Point3d::new(1.3, 0.5, 0.0), 0.4);
        let miss = Sphere::new(Point3d::new(1.3, 0.5, 0.3), 0.4);
        assert!(face_intersects_sphere(&face, &hit));
        assert!(!face_intersects_sphere(&face, &miss));
    }

    #[test]
    fn sphere_beyond_a_corner() {
        let face = unit_square();
        let hit = Sphere::new(Point3d::new(1.2, 1.2, 0.0), 0.3);
        let miss = Sphere::new(Point3d::new(1.25, 1.25, 0.0), 0.3);
        assert!(face_intersects_sphere(&face, &hit));
        assert!(!face_intersects_sphere(&face, &miss));
    }
}
