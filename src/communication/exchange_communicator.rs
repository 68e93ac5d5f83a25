use std::marker::PhantomData;

use super::DataByRank;
use super::Rank;
use super::RendezvousCommunicator;
use super::SizedCommunicator;
use super::WorldCommunicator;

pub struct ExchangeCommunicator<C, T> {
    pub communicator: C,
    _marker: PhantomData<T>,
}

impl<C, T> ExchangeCommunicator<C, T> {
    pub fn new(communicator: C) -> Self {
        Self {
            communicator,
            _marker: PhantomData,
        }
    }
}

impl<C, T> ExchangeCommunicator<C, T>
where
    C: WorldCommunicator<T>,
    C: SizedCommunicator,
    T: Clone,
{
    /// Sends the listed data to every addressed rank (an empty payload
    /// to everyone else) and receives one payload from every other
    /// rank. Pairs communicate in a fixed order, lower rank first, so
    /// that blocking sends cannot deadlock.
    pub fn exchange_all(&mut self, data: DataByRank<Vec<T>>) -> DataByRank<Vec<T>> {
        let mut received = DataByRank::empty();
        for other in self.communicator.other_ranks() {
            let outgoing = data.get(&other).cloned().unwrap_or_default();
            if self.communicator.rank() < other {
                self.communicator.send_vec(other, outgoing);
                received.insert(other, self.communicator.receive_vec(other));
            } else {
                let incoming = self.communicator.receive_vec(other);
                self.communicator.send_vec(other, outgoing);
                received.insert(other, incoming);
            }
        }
        received
    }
}

impl<C, T> SizedCommunicator for ExchangeCommunicator<C, T>
where
    C: SizedCommunicator,
{
    fn rank(&self) -> Rank {
        self.communicator.rank()
    }

    fn size(&self) -> usize {
        self.communicator.size()
    }
}

/// The reduce-scatter + rendezvous-tag handshake: each rank declares
/// the peers it wants to talk to and learns which ranks declared it.
/// Neither side's list is trusted alone.
pub fn rendezvous_peers<C: RendezvousCommunicator>(
    communicator: &mut C,
    wanted: &[Rank],
) -> Vec<Rank> {
    let mut counts = vec![0; communicator.size()];
    for peer in wanted {
        counts[*peer as usize] = 1;
    }
    let num_senders = communicator.reduce_scatter_sum(&counts);
    for peer in wanted {
        communicator.send_rendezvous(*peer);
    }
    (0..num_senders)
        .map(|_| communicator.receive_rendezvous())
        .collect()
}
