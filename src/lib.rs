//! # voronoi3d
//!
//! Construction of the three-dimensional Voronoi tessellation of a
//! point set inside an axis-aligned box, with rigid boundaries.
//!
//! Every generator obtains a convex polyhedral cell together with its
//! volume, centroid, face areas, oriented face vertex loops and
//! neighbor relations. Generators near the box boundary are closed off
//! against mirror copies of themselves, so that the cells tile the box
//! exactly.
//!
//! The tessellation can also be built cooperatively by a set of ranks
//! whose subdomains partition the box: each rank builds the cells of
//! its own generators, importing ghost copies of the generators of
//! neighboring subdomains until its cells are identical to the ones a
//! global build would produce. Inter-rank traffic runs over MPI (with
//! the `mpi` feature) or over in-process channels, which is how the
//! multi-rank tests run.
//!
//! ```
//! use voronoi3d::Point3d;
//! use voronoi3d::Voronoi3D;
//!
//! let mut tessellation = Voronoi3D::new(Point3d::ZERO, Point3d::ONE);
//! tessellation.build(&[
//!     Point3d::new(0.25, 0.5, 0.5),
//!     Point3d::new(0.75, 0.5, 0.5),
//! ]).unwrap();
//! assert_eq!(tessellation.num_cells(), 2);
//! ```

pub mod communication;
pub mod delaunay;
pub mod error;
pub mod math;
pub mod primitives;
pub mod simulation_box;
pub mod voronoi;

pub use error::BuildError;
pub use primitives::Point3d;
pub use simulation_box::SimulationBox;
pub use voronoi::Voronoi3D;
