pub mod polygon;
pub mod sphere;

pub use polygon::Polygon;
pub use sphere::Sphere;

pub type Float = f64;
pub type Point3d = glam::DVec3;
