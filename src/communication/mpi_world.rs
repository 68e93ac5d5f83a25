use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::Mutex;

use lazy_static::lazy_static;
use mpi::collective::SystemOperation;
use mpi::environment::Universe;
use mpi::topology::SystemCommunicator;
use mpi::traits::Communicator;
use mpi::traits::CommunicatorCollectives;
use mpi::traits::Destination;
use mpi::traits::Equivalence;
use mpi::traits::MatchedReceiveVec;
use mpi::traits::Source;
use mpi::Tag;
use mpi::Threading;

use super::Rank;
use super::RendezvousCommunicator;
use super::SizedCommunicator;
use super::WorldCommunicator;

/// A wrapper around universe which contains the universe in an
/// Option. This allows calling .drop at program completion so that
/// the Universe is dropped which will call MPI_FINALIZE. This is
/// necessary because anything in a lazy_static will never be dropped.
pub struct StaticUniverse(Arc<Mutex<Option<Universe>>>);

impl StaticUniverse {
    pub fn world(&self) -> SystemCommunicator {
        self.0.lock().unwrap().as_ref().unwrap().world()
    }

    pub fn drop(&self) {
        let _ = self.0.lock().unwrap().take();
    }
}

lazy_static! {
    pub static ref MPI_UNIVERSE: StaticUniverse = {
        let threading = Threading::Multiple;
        let (universe, threading_initialized) =
            mpi::initialize_with_threading(threading).unwrap();
        assert_eq!(
            threading, threading_initialized,
            "Could not initialize MPI with multithreading"
        );
        StaticUniverse(Arc::new(Mutex::new(Some(universe))))
    };
}

pub struct MpiWorld<T> {
    world: SystemCommunicator,
    tag: Tag,
    _marker: PhantomData<T>,
}

impl<T> MpiWorld<T> {
    pub fn new(tag: Tag) -> Self {
        Self {
            world: MPI_UNIVERSE.world(),
            tag,
            _marker: PhantomData,
        }
    }
}

impl<T> WorldCommunicator<T> for MpiWorld<T>
where
    T: Equivalence,
{
    fn send_vec(&mut self, rank: Rank, data: Vec<T>) {
        let process = self.world.process_at_rank(rank);
        process.send_with_tag(&data[..], self.tag);
    }

    fn receive_vec(&mut self, rank: Rank) -> Vec<T> {
        let process = self.world.process_at_rank(rank);
        let result = process.matched_probe_with_tag(self.tag);
        let (data, _) = result.matched_receive_vec();
        data
    }
}

impl<T> SizedCommunicator for MpiWorld<T> {
    fn rank(&self) -> Rank {
        self.world.rank()
    }

    fn size(&self) -> usize {
        self.world.size() as usize
    }
}

impl RendezvousCommunicator for MpiWorld<Rank> {
    fn reduce_scatter_sum(&mut self, counts: &[i32]) -> i32 {
        let mut received = 0;
        self.world
            .reduce_scatter_block_into(counts, &mut received, SystemOperation::sum());
        received
    }

    fn send_rendezvous(&mut self, rank: Rank) {
        let data = [self.world.rank()];
        self.world
            .process_at_rank(rank)
            .send_with_tag(&data[..], self.tag);
    }

    fn receive_rendezvous(&mut self) -> Rank {
        let result = self.world.any_process().matched_probe_with_tag(self.tag);
        let (_, status): (Vec<Rank>, _) = result.matched_receive_vec();
        status.source_rank()
    }
}
