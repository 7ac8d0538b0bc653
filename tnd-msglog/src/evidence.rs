use tnd_common::{Address, Height, NilOrVal, Round, ValueId, VoteType};

/// A record of Byzantine-looking behavior observed in the log: a sender
/// that voted (or proposed) more than once for the same `(height, round)`.
///
/// Recording evidence is never fatal — the honest replica simply rejects
/// the duplicate and keeps going — but a harness or operator may want to
/// know it happened, so the log accumulates these for inspection rather
/// than discarding them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Evidence {
    /// The proposer for `(height, round)` sent a second, different
    /// proposal.
    DuplicateProposal {
        /// The height.
        height: Height,
        /// The round.
        round: Round,
        /// The designated proposer.
        proposer: Address,
    },
    /// `sender` cast a second vote of `kind` at `(height, round)`.
    DuplicateVote {
        /// Which kind of vote was duplicated.
        kind: VoteType,
        /// The height.
        height: Height,
        /// The round.
        round: Round,
        /// The offending sender.
        sender: Address,
        /// What they had already voted.
        first: NilOrVal<ValueId>,
        /// What the duplicate carried.
        second: NilOrVal<ValueId>,
    },
}
