//! The state maintained by the round state machine.

use tnd_common::{Height, Round, Value};

/// A value together with the round in which it became locked or valid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundValue<V> {
    /// The value.
    pub value: V,
    /// The round.
    pub round: Round,
}

impl<V> RoundValue<V> {
    /// Pair a value with a round.
    pub fn new(value: V, round: Round) -> Self {
        Self { value, round }
    }
}

/// The step of consensus within a round.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Step {
    /// The round has just started; `StartRound`'s effects have not run yet.
    NewRound,
    /// Waiting for, or producing, the proposal.
    Propose,
    /// Waiting for, or having cast, a prevote.
    Prevote,
    /// Waiting for, or having cast, a precommit.
    Precommit,
    /// A value has been decided at this height; no further transitions occur.
    Commit,
}

/// The state of the round state machine at a given height and round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct State<V> {
    /// The height this round belongs to.
    pub height: Height,
    /// The round we are at within the height.
    pub round: Round,
    /// The step we are at within the round.
    pub step: Step,
    /// The value we are locked on, ie. for which we received a polka before
    /// we precommitted.
    pub locked: Option<RoundValue<V>>,
    /// The value for which we received a polka after we already
    /// precommitted.
    pub valid: Option<RoundValue<V>>,
}

impl<V> State<V> {
    /// Create a fresh `NewRound` state at the given height and round, with
    /// no locked or valid value.
    pub fn new(height: Height, round: Round) -> Self {
        Self {
            height,
            round,
            step: Step::NewRound,
            locked: None,
            valid: None,
        }
    }
}

impl<V: Clone> State<V> {
    /// Move to a new round, carrying over the locked and valid values
    /// (§4.2.10: advancing the round never clears them).
    pub fn new_round(&self, round: Round) -> Self {
        Self {
            height: self.height,
            round,
            step: Step::NewRound,
            locked: self.locked.clone(),
            valid: self.valid.clone(),
        }
    }

    /// Advance to the next step within the same round.
    pub fn next_step(&self) -> Self {
        let step = match self.step {
            Step::NewRound => Step::Propose,
            Step::Propose => Step::Prevote,
            Step::Prevote => Step::Precommit,
            Step::Precommit | Step::Commit => Step::Commit,
        };

        Self {
            step,
            ..self.clone()
        }
    }

    /// Lock (and mark valid) `value` at the current round.
    pub fn set_locked(&self, value: V) -> Self {
        Self {
            locked: Some(RoundValue::new(value, self.round)),
            ..self.clone()
        }
    }

    /// Mark `value` valid at the current round, without touching `locked`.
    pub fn set_valid(&self, value: V) -> Self {
        Self {
            valid: Some(RoundValue::new(value, self.round)),
            ..self.clone()
        }
    }

    /// Move to the terminal `Commit` step.
    pub fn commit_step(&self) -> Self {
        Self {
            step: Step::Commit,
            ..self.clone()
        }
    }
}

impl<V: Value> Default for State<V> {
    fn default() -> Self {
        Self::new(Height::ZERO, Round::Nil)
    }
}
