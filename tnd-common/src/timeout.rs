use crate::Round;

/// Which step's timeout this is.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimeoutStep {
    /// `PROPOSAL_TIMEOUT`.
    Propose,
    /// `PREVOTE_TIMEOUT`.
    Prevote,
    /// `PRECOMMIT_TIMEOUT`.
    Precommit,
}

/// A self-addressed timeout, tagged by the round (and implicitly the
/// replica's current height) it applies to.
///
/// Timeouts are delayed *messages*, not sleeps: the scheduler client (C3)
/// submits them to the bus for later delivery, and the replica treats a
/// delivered timeout exactly like any other inbound message.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timeout {
    /// The round this timeout was scheduled for.
    pub round: Round,
    /// Which step's timeout this is.
    pub step: TimeoutStep,
}

impl Timeout {
    /// Construct a new timeout.
    pub const fn new(round: Round, step: TimeoutStep) -> Self {
        Self { round, step }
    }

    /// Construct a `PROPOSAL_TIMEOUT` for the given round.
    pub const fn propose(round: Round) -> Self {
        Self::new(round, TimeoutStep::Propose)
    }

    /// Construct a `PREVOTE_TIMEOUT` for the given round.
    pub const fn prevote(round: Round) -> Self {
        Self::new(round, TimeoutStep::Prevote)
    }

    /// Construct a `PRECOMMIT_TIMEOUT` for the given round.
    pub const fn precommit(round: Round) -> Self {
        Self::new(round, TimeoutStep::Precommit)
    }
}
