mod data_by_rank;
mod exchange_communicator;
pub mod local;
#[cfg(feature = "mpi")]
mod mpi_world;
mod sized_communicator;
mod world_communicator;

pub use data_by_rank::DataByRank;
pub use exchange_communicator::rendezvous_peers;
pub use exchange_communicator::ExchangeCommunicator;
pub use local::get_local_communicators;
pub use local::LocalCommunicator;
#[cfg(feature = "mpi")]
pub use mpi_world::MpiWorld;
#[cfg(feature = "mpi")]
pub use mpi_world::MPI_UNIVERSE;
pub use sized_communicator::SizedCommunicator;
pub use world_communicator::RendezvousCommunicator;
pub use world_communicator::WorldCommunicator;

#[cfg(feature = "mpi")]
use mpi::traits::Equivalence;

use crate::primitives::Point3d;

pub type Rank = i32;

#[cfg(feature = "mpi")]
pub type Communicator<T> = MpiWorld<T>;
#[cfg(not(feature = "mpi"))]
pub type Communicator<T> = LocalCommunicator<T>;

#[cfg(feature = "mpi")]
const POINT_TAG: mpi::Tag = 71;
#[cfg(feature = "mpi")]
const RENDEZVOUS_TAG: mpi::Tag = 72;

/// Wire format for generator positions and centroids.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "mpi", derive(Equivalence))]
pub struct PointMsg {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl From<Point3d> for PointMsg {
    fn from(p: Point3d) -> Self {
        Self {
            x: p.x,
            y: p.y,
            z: p.z,
        }
    }
}

impl From<PointMsg> for Point3d {
    fn from(p: PointMsg) -> Self {
        Self::new(p.x, p.y, p.z)
    }
}

/// The transport used by the distributed build: one primitive that
/// ships indexed subsets of a point array to a list of peers and
/// returns the peers' payloads in the same order, plus the symmetric
/// peer handshake.
pub struct PointExchange {
    points: ExchangeCommunicator<Communicator<PointMsg>, PointMsg>,
    rendezvous: Communicator<Rank>,
}

impl PointExchange {
    #[cfg(feature = "mpi")]
    pub fn new() -> Self {
        Self::from_communicators(MpiWorld::new(POINT_TAG), MpiWorld::new(RENDEZVOUS_TAG))
    }

    pub fn from_communicators(
        points: Communicator<PointMsg>,
        rendezvous: Communicator<Rank>,
    ) -> Self {
        Self {
            points: ExchangeCommunicator::new(points),
            rendezvous,
        }
    }

    pub fn rank(&self) -> Rank {
        self.rendezvous.rank()
    }

    pub fn size(&self) -> usize {
        self.rendezvous.size()
    }

    /// Declares the peers this rank wants to talk to and returns the
    /// ranks that declared this one.
    pub fn handshake(&mut self, wanted: &[Rank]) -> Vec<Rank> {
        rendezvous_peers(&mut self.rendezvous, wanted)
    }

    /// The intersection handshake: a peer is kept only if both sides
    /// listed each other.
    pub fn symmetric_peers(&mut self, wanted: &[Rank]) -> Vec<Rank> {
        let talkers = self.handshake(wanted);
        wanted
            .iter()
            .copied()
            .filter(|peer| talkers.contains(peer))
            .collect()
    }

    /// Ships `source[indices[k]]` to `peers[k]` for every k and returns
    /// the payloads received from those peers, aligned with `peers`.
    /// Order within each received payload is preserved.
    pub fn exchange(
        &mut self,
        peers: &[Rank],
        indices: &[Vec<usize>],
        source: &[Point3d],
    ) -> Vec<Vec<Point3d>> {
        debug_assert_eq!(peers.len(), indices.len());
        let mut outgoing = DataByRank::empty();
        for (peer, list) in peers.iter().zip(indices) {
            outgoing.insert(
                *peer,
                list.iter().map(|i| PointMsg::from(source[*i])).collect(),
            );
        }
        let mut received = self.points.exchange_all(outgoing);
        peers
            .iter()
            .map(|peer| {
                received
                    .remove(peer)
                    .unwrap_or_default()
                    .into_iter()
                    .map(Point3d::from)
                    .collect()
            })
            .collect()
    }
}
