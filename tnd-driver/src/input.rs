//! Inputs to the replica driver: everything the bus (E1) can hand a replica.

use tnd_common::{Address, Height, NilOrVal, Round, Timeout, ValueId, VoteType};

/// Whether a proposed value passed the external `valid(v)` check (E3). The
/// driver never evaluates this itself — the caller (bus, CLI, or test
/// harness) is expected to call out to the pluggable validity predicate and
/// report the verdict here.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Validity {
    /// The value passed validation.
    Valid,
    /// The value failed validation (empty, malformed, or otherwise rejected
    /// by `valid(v)`).
    Invalid,
}

impl Validity {
    /// Whether this is [`Validity::Valid`].
    pub fn is_valid(self) -> bool {
        matches!(self, Validity::Valid)
    }
}

/// An input to the replica driver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input<V> {
    /// Enter `round` at `height`. If `height` is the height we are already
    /// at, the round simply advances (locked/valid values are carried
    /// over); otherwise a fresh height begins at that round. The caller is
    /// expected to feed this back in immediately after observing an
    /// [`crate::output::Output::NewRound`] output, mirroring the spec's
    /// `StartRound` upon-rule.
    NewRound(Height, Round),
    /// A proposal message addressed to this replica's current height.
    Proposal {
        /// The round the proposal is for.
        round: Round,
        /// Who sent it.
        sender: Address,
        /// The proposed value.
        value: V,
        /// The claimed valid round, `Round::Nil` if none.
        valid_round: Round,
        /// The external validity verdict for `value`.
        validity: Validity,
    },
    /// A PREVOTE or PRECOMMIT message addressed to this replica's current
    /// height.
    Vote {
        /// Prevote or precommit.
        kind: VoteType,
        /// The round the vote is for.
        round: Round,
        /// Who sent it.
        sender: Address,
        /// The value id voted for, or nil.
        value_id: NilOrVal<ValueId>,
    },
    /// A previously scheduled timeout has elapsed.
    TimeoutElapsed(Timeout),
}
