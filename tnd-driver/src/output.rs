//! Outputs emitted by the replica driver: everything it asks the bus (E1)
//! to do on its behalf.

use tnd_common::{Address, Height, NilOrVal, Round, Timeout, ValueId, VoteType};

/// Something for the bus/harness to act on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Output<V> {
    /// Moved to a new round at this height (informational; no message is
    /// sent on the wire for this).
    NewRound(Height, Round),
    /// Broadcast a proposal.
    Proposal {
        /// The height.
        height: Height,
        /// The round.
        round: Round,
        /// The proposed value.
        value: V,
        /// The round at which this value last had a polka, if any.
        valid_round: Round,
    },
    /// Broadcast a vote, signed by this replica's own address.
    Vote {
        /// Prevote or precommit.
        kind: VoteType,
        /// The height.
        height: Height,
        /// The round.
        round: Round,
        /// Our own address.
        from: Address,
        /// The value id voted for, or nil.
        value_id: NilOrVal<ValueId>,
    },
    /// Arm the given timeout at this height.
    ScheduleTimeout(Height, Timeout),
    /// This height has decided `value` at `round`.
    Decision {
        /// The height.
        height: Height,
        /// The round the decision was reached at.
        round: Round,
        /// The decided value.
        value: V,
    },
}
