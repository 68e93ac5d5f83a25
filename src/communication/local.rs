use std::collections::HashMap;
use std::marker::PhantomData;
use std::mem;
use std::ptr;
use std::slice;
use std::sync::mpsc::channel;
use std::sync::mpsc::Receiver;
use std::sync::mpsc::Sender;
use std::thread;

use super::DataByRank;
use super::Rank;
use super::RendezvousCommunicator;
use super::SizedCommunicator;
use super::WorldCommunicator;

pub(super) struct Payload {
    bytes: Vec<u8>,
}

/// A communicator connecting threads of one process through channels,
/// with the same surface as the MPI communicator. Used by multi-rank
/// tests and by callers that run their "ranks" as threads.
pub struct LocalCommunicator<T> {
    senders: DataByRank<Sender<Payload>>,
    receivers: DataByRank<Receiver<Payload>>,
    rank: Rank,
    size: usize,
    _marker: PhantomData<T>,
}

impl<T> LocalCommunicator<T> {
    pub(super) fn new(
        receivers: DataByRank<Receiver<Payload>>,
        senders: DataByRank<Sender<Payload>>,
        size: usize,
        rank: Rank,
    ) -> Self {
        Self {
            senders,
            receivers,
            rank,
            size,
            _marker: PhantomData,
        }
    }
}

/// Constructs the full channel mesh for `size` ranks. Entry `rank` of
/// the result talks to every other entry.
pub fn get_local_communicators<T>(size: usize) -> HashMap<Rank, LocalCommunicator<T>> {
    let mut senders_by_rank: HashMap<Rank, DataByRank<Sender<Payload>>> = (0..size)
        .map(|rank| (rank as Rank, DataByRank::empty()))
        .collect();
    let mut receivers_by_rank: HashMap<Rank, DataByRank<Receiver<Payload>>> = (0..size)
        .map(|rank| (rank as Rank, DataByRank::empty()))
        .collect();
    for rank1 in 0..size as Rank {
        for rank2 in 0..size as Rank {
            if rank1 == rank2 {
                continue;
            }
            let (sender, receiver) = channel();
            senders_by_rank.get_mut(&rank1).unwrap().insert(rank2, sender);
            receivers_by_rank.get_mut(&rank2).unwrap().insert(rank1, receiver);
        }
    }
    (0..size as Rank)
        .map(|rank| {
            (
                rank,
                LocalCommunicator::new(
                    receivers_by_rank.remove(&rank).unwrap(),
                    senders_by_rank.remove(&rank).unwrap(),
                    size,
                    rank,
                ),
            )
        })
        .collect()
}

impl<T: Sync + Send> WorldCommunicator<T> for LocalCommunicator<T> {
    fn receive_vec(&mut self, rank: Rank) -> Vec<T> {
        let bytes = &self.receivers[rank].recv().unwrap().bytes;
        let size = mem::size_of::<T>();
        debug_assert_eq!(bytes.len().rem_euclid(size), 0);
        bytes
            .chunks_exact(size)
            .map(|chunk| unsafe { ptr::read(chunk.as_ptr().cast()) })
            .collect()
    }

    fn send_vec(&mut self, rank: Rank, data: Vec<T>) {
        let bytes = unsafe {
            slice::from_raw_parts(
                (data.as_slice() as *const [T]) as *const u8,
                data.len() * mem::size_of::<T>(),
            )
        };
        let payload = Payload {
            bytes: bytes.to_vec(),
        };
        self.senders[rank].send(payload).unwrap();
    }
}

impl<T> SizedCommunicator for LocalCommunicator<T> {
    fn rank(&self) -> Rank {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }
}

impl RendezvousCommunicator for LocalCommunicator<Rank> {
    fn reduce_scatter_sum(&mut self, counts: &[i32]) -> i32 {
        debug_assert_eq!(counts.len(), self.size);
        for rank in self.other_ranks() {
            self.send_vec(rank, vec![counts[rank as usize]]);
        }
        let mut sum = counts[self.rank as usize];
        for rank in self.other_ranks() {
            let received = self.receive_vec(rank);
            debug_assert_eq!(received.len(), 1);
            sum += received[0];
        }
        sum
    }

    fn send_rendezvous(&mut self, rank: Rank) {
        self.send_vec(rank, vec![self.rank]);
    }

    fn receive_rendezvous(&mut self) -> Rank {
        loop {
            for (rank, receiver) in self.receivers.iter() {
                if let Ok(payload) = receiver.try_recv() {
                    debug_assert_eq!(payload.bytes.len(), mem::size_of::<Rank>());
                    return *rank;
                }
            }
            thread::yield_now();
        }
    }
}
