use std::fmt;

use crate::communication::Rank;
use crate::primitives::Point3d;

/// Fatal conditions during a tessellation build. Geometric degeneracies
/// (faces collapsing to fewer than three vertices) are filtered out
/// during face extraction and never surface here.
#[derive(Clone, Debug, PartialEq)]
pub enum BuildError {
    /// A point could not be located in any process subdomain.
    UnassignedPoint { rank: Rank, position: Point3d },
    /// No tetra connecting a sentinel to a real generator exists, so the
    /// boundary walk has nowhere to start.
    NoSeedFound,
    /// The ring walk around a Delaunay edge could not find a next tetra,
    /// which indicates corrupt Delaunay adjacency.
    FaceWalkFailure { n0: usize, n1: usize },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnassignedPoint { rank, position } => write!(
                f,
                "point ({}, {}, {}) is not inside any process subdomain (rank {})",
                position.x, position.y, position.z, rank
            ),
            Self::NoSeedFound => {
                write!(f, "no seed generator found for the boundary walk")
            }
            Self::FaceWalkFailure { n0, n1 } => write!(
                f,
                "no next tetra in the ring walk around the edge ({}, {})",
                n0, n1
            ),
        }
    }
}

impl std::error::Error for BuildError {}
