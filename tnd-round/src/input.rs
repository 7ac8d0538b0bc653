//! Inputs to the round state machine.

use tnd_common::Round;

/// An input to the round state machine, already resolved against the
/// message log by the driver (eg. which of §4.2.2/§4.2.3's competing
/// upon-rules fired, and with which value).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input<V> {
    /// Start a new round, not as proposer. L11/L20.
    NewRound,
    /// Start a new round and propose `value`. L11/L14.
    NewRoundProposer(V),
    /// Receive a well-formed proposal for `value`, with a possible prior
    /// polka round. L22/L28.
    Proposal(V, Round),
    /// Receive an invalid proposal. L22/L25, L28/L31.
    ProposalInvalid,
    /// Receive `2f+1` prevotes for anything. L34.
    PolkaAny,
    /// Receive `2f+1` prevotes for nil. L44.
    PolkaNil,
    /// Receive `2f+1` prevotes for `value`. L36/L37.
    PolkaValue(V),
    /// Receive `2f+1` precommits for anything. L47.
    PrecommitAny,
    /// Receive `2f+1` precommits for `value`. L49.
    PrecommitValue(V),
    /// Receive `f+1` messages of any kind from round `round`, greater than
    /// our current round. L55.
    SkipRound(Round),
    /// Timeout waiting for a proposal. L57.
    TimeoutPropose,
    /// Timeout waiting for prevotes. L61.
    TimeoutPrevote,
    /// Timeout waiting for precommits. L65.
    TimeoutPrecommit,
}
