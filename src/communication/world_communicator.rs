use super::Rank;
use super::SizedCommunicator;

pub trait WorldCommunicator<T> {
    fn send_vec(&mut self, rank: Rank, data: Vec<T>);
    fn receive_vec(&mut self, rank: Rank) -> Vec<T>;
}

/// The operations behind the symmetric peer negotiation: a
/// scatter-reduce of intent counts followed by rendezvous messages
/// received from any source.
pub trait RendezvousCommunicator: SizedCommunicator {
    /// Every rank contributes one count per rank; each rank obtains the
    /// sum of the entries addressed to it.
    fn reduce_scatter_sum(&mut self, counts: &[i32]) -> i32;
    fn send_rendezvous(&mut self, rank: Rank);
    /// Blocks until a rendezvous message arrives from any rank and
    /// returns its source.
    fn receive_rendezvous(&mut self) -> Rank;
}
