//! Outputs emitted by the round state machine.

use tnd_common::{Height, NilOrVal, Round, Timeout, TimeoutStep, ValueId, VoteType};

use crate::state::RoundValue;

/// Something for the driver to act on: cast a vote, broadcast a proposal,
/// arm a timeout, or record a decision.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Output<V> {
    /// Move to a new round (no message to send; the driver starts it).
    NewRound(Round),
    /// Broadcast a proposal for `value`, with `valid_round` set if we are
    /// re-proposing our own previously-valid value.
    Proposal {
        /// The height.
        height: Height,
        /// The round.
        round: Round,
        /// The value being proposed.
        value: V,
        /// The round at which this value last had a polka, if any.
        valid_round: Round,
    },
    /// Broadcast a prevote or precommit for `value_id`, `Nil` if voting for
    /// nothing.
    Vote {
        /// Prevote or precommit.
        kind: VoteType,
        /// The round.
        round: Round,
        /// The value id voted for, or nil.
        value_id: NilOrVal<ValueId>,
    },
    /// Arm the given timeout.
    ScheduleTimeout(Timeout),
    /// A value has been decided.
    Decision(RoundValue<V>),
}

impl<V> Output<V> {
    /// A proposal output.
    pub fn proposal(height: Height, round: Round, value: V, valid_round: Round) -> Self {
        Output::Proposal {
            height,
            round,
            value,
            valid_round,
        }
    }

    /// A prevote output.
    pub fn prevote(round: Round, value_id: NilOrVal<ValueId>) -> Self {
        Output::Vote {
            kind: VoteType::Prevote,
            round,
            value_id,
        }
    }

    /// A precommit output.
    pub fn precommit(round: Round, value_id: NilOrVal<ValueId>) -> Self {
        Output::Vote {
            kind: VoteType::Precommit,
            round,
            value_id,
        }
    }

    /// A schedule-timeout output.
    pub fn schedule_timeout(round: Round, step: TimeoutStep) -> Self {
        Output::ScheduleTimeout(Timeout::new(round, step))
    }

    /// A decision output.
    pub fn decision(round: Round, value: V) -> Self {
        Output::Decision(RoundValue::new(value, round))
    }
}
