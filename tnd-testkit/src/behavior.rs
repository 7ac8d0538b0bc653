use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use tnd_common::{Address, NilOrVal, ValueId};

use crate::network::WireMessage;

/// How a replica behaves when it is about to put an output on the wire.
///
/// Honest replicas forward a driver's output to every committee member
/// (including themselves) unchanged. These variants stand in for the
/// Byzantine-fault-injection harnesses `spec.md` keeps external to the
/// core: scenarios S5/S6 need a proposer that equivocates and voters that
/// vote randomly, not a core upon-rule.
pub enum Behavior<V> {
    /// Forward every output to all `n` replicas unchanged.
    Honest,
    /// Drop every output; this replica never sends anything.
    Silent,
    /// Send `alternate` to `targets` and the real value to everyone else —
    /// S5's equivocating proposer.
    Equivocating {
        /// The value substituted in for the addresses in `targets`.
        alternate: V,
        /// Which addresses receive `alternate`.
        targets: Vec<Address>,
    },
    /// Cast each vote for a uniformly random id instead of the one the
    /// driver computed — S6's liveness-breaking randomness.
    Random {
        /// Seeded so a scenario run is reproducible.
        rng: StdRng,
    },
}

impl<V> Behavior<V> {
    /// A [`Behavior::Random`] seeded deterministically.
    pub fn random(seed: u64) -> Self {
        Behavior::Random {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<V: Clone> Behavior<V> {
    /// Resolve one broadcast into the concrete (recipient, message) pairs
    /// actually placed on the wire.
    pub fn targets(&mut self, n: u32, message: WireMessage<V>) -> Vec<(Address, WireMessage<V>)> {
        match self {
            Behavior::Honest => all(n, message),
            Behavior::Silent => Vec::new(),
            Behavior::Equivocating { alternate, targets } => all(n, message)
                .into_iter()
                .map(|(to, msg)| {
                    if targets.contains(&to) {
                        (to, substitute_proposal(msg, alternate.clone()))
                    } else {
                        (to, msg)
                    }
                })
                .collect(),
            Behavior::Random { rng } => all(n, message)
                .into_iter()
                .map(|(to, msg)| (to, randomize_vote(msg, rng)))
                .collect(),
        }
    }
}

fn all<V: Clone>(n: u32, message: WireMessage<V>) -> Vec<(Address, WireMessage<V>)> {
    (0..n).map(|i| (Address::new(i), message.clone())).collect()
}

fn substitute_proposal<V>(message: WireMessage<V>, alternate: V) -> WireMessage<V> {
    match message {
        WireMessage::Proposal {
            round, valid_round, ..
        } => WireMessage::Proposal {
            round,
            value: alternate,
            valid_round,
        },
        other => other,
    }
}

fn randomize_vote<V>(message: WireMessage<V>, rng: &mut StdRng) -> WireMessage<V> {
    match message {
        WireMessage::Vote { kind, round, .. } => WireMessage::Vote {
            kind,
            round,
            value_id: if rng.gen_bool(0.5) {
                NilOrVal::Nil
            } else {
                NilOrVal::Val(ValueId::new(rng.gen()))
            },
        },
        other => other,
    }
}
