use tnd_common::Address;

/// A message wrapped with the sender's address, the shape every proposal
/// and vote takes once it leaves a replica's driver and goes out over the
/// bus (the driver's own `Output`/`Input` types carry no transport
/// envelope — that's this crate's concern, not C2's).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Envelope<M> {
    /// Who sent it.
    pub from: Address,
    /// The payload.
    pub body: M,
}

impl<M> Envelope<M> {
    /// Wrap `body` as having been sent by `from`.
    pub fn new(from: Address, body: M) -> Self {
        Self { from, body }
    }
}
