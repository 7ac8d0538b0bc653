//! The round state machine's upon-rules (§4.2 of the algorithm).

use tnd_common::{NilOrVal, Round, TimeoutStep, Value};

use crate::input::Input;
use crate::output::Output;
use crate::state::{State, Step};

/// The result of applying an [`Input`] to a [`State`]: the next state, an
/// optional output, and whether the transition was one the state machine
/// actually recognized (an unrecognized `(step, input)` pair is reported as
/// invalid and leaves the state unchanged, rather than panicking — a
/// malformed or stale input is routine, not a programmer error).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition<V> {
    /// The state to move to.
    pub state: State<V>,
    /// The output to act on, if any.
    pub output: Option<Output<V>>,
    /// Whether this was a recognized transition.
    pub valid: bool,
}

impl<V> Transition<V> {
    fn to(state: State<V>) -> Self {
        Self {
            state,
            output: None,
            valid: true,
        }
    }

    fn invalid(state: State<V>) -> Self {
        Self {
            state,
            output: None,
            valid: false,
        }
    }

    fn with_output(mut self, output: Output<V>) -> Self {
        self.output = Some(output);
        self
    }
}

/// A proposal is admissible at the prevote rule either as a fresh proposal
/// with no claimed valid round (§4.2.2, `vr = nil`) or as a re-proposal
/// whose claimed valid round is defined and strictly less than the round we
/// are at (§4.2.3, `vr < roundp`).
fn is_admissible_polka_round<V>(state: &State<V>, vr: Round) -> bool {
    !vr.is_defined() || vr < state.round
}

/// Apply an `input`, addressed at `round`, to `state`.
///
/// Inputs addressed at a round other than `state.round` are rejected unless
/// they are one of the round-independent rules (round-skip, a late
/// precommit quorum for a value, entering `Commit`), mirroring the paper's
/// `roundp = round` guards.
pub fn apply<V: Value>(state: State<V>, round: Round, input: Input<V>) -> Transition<V> {
    let this_round = state.round == round;

    match (state.step, input) {
        (Step::NewRound, Input::NewRoundProposer(value)) if this_round => propose(state, value), // L11/L14
        (Step::NewRound, Input::NewRound) if this_round => schedule_timeout_propose(state), // L11/L20

        (Step::Propose, Input::Proposal(value, valid_round)) // L22/L28
            if this_round && is_admissible_polka_round(&state, valid_round) =>
        {
            prevote(state, valid_round, value)
        }
        (Step::Propose, Input::ProposalInvalid) if this_round => prevote_nil(state), // L22/L25, L28/L31
        (Step::Propose, Input::TimeoutPropose) if this_round => prevote_nil(state),  // L57

        (Step::Prevote, Input::PolkaAny) if this_round => schedule_timeout_prevote(state), // L34
        (Step::Prevote, Input::PolkaNil) if this_round => precommit_nil(state),            // L44
        (Step::Prevote, Input::PolkaValue(value)) if this_round => precommit(state, value), // L36/L37
        (Step::Prevote, Input::TimeoutPrevote) if this_round => precommit_nil(state),       // L61

        (Step::Precommit, Input::PolkaValue(value)) if this_round => set_valid_value(state, value), // L36/L42

        (Step::Commit, _) => Transition::invalid(state),

        (_, Input::PrecommitAny) if this_round => schedule_timeout_precommit(state), // L47
        (_, Input::TimeoutPrecommit) if this_round => round_skip(state, round.increment()), // L65
        (_, Input::SkipRound(target)) if state.round < target => round_skip(state, target), // L55
        (_, Input::PrecommitValue(value)) => commit(state, round, value),            // L49

        _ => Transition::invalid(state),
    }
}

/// We are the proposer; propose the valid value if we have one, otherwise
/// the value we were asked to propose.
///
/// L11/L14.
fn propose<V: Value>(state: State<V>, value: V) -> Transition<V> {
    let (value, valid_round) = match &state.valid {
        Some(round_value) => (round_value.value.clone(), round_value.round),
        None => (value, Round::Nil),
    };

    let output = Output::proposal(state.height, state.round, value, valid_round);
    Transition::to(state.next_step()).with_output(output)
}

/// Received a complete, valid proposal; prevote the value unless we are
/// locked on something else at a higher round.
///
/// L22/L28.
fn prevote<V: Value>(state: State<V>, vr: Round, proposed: V) -> Transition<V> {
    let value_id = match &state.locked {
        Some(locked) if locked.round <= vr => NilOrVal::Val(proposed.id()), // unlock and prevote
        Some(locked) if locked.value == proposed => NilOrVal::Val(proposed.id()), // already locked on it
        Some(_) => NilOrVal::Nil, // locked on a higher round with a different value
        None => NilOrVal::Val(proposed.id()), // not locked
    };

    let output = Output::prevote(state.round, value_id);
    Transition::to(state.next_step()).with_output(output)
}

/// Received an invalid or empty proposal, or timed out waiting for one;
/// prevote nil.
///
/// L22/L25, L28/L31, L57.
fn prevote_nil<V: Value>(state: State<V>) -> Transition<V> {
    let output = Output::prevote(state.round, NilOrVal::Nil);
    Transition::to(state.next_step()).with_output(output)
}

/// Received a polka for `value`; lock and precommit it.
///
/// L36/L37.
fn precommit<V: Value>(state: State<V>, value: V) -> Transition<V> {
    let output = Output::precommit(state.round, NilOrVal::Val(value.id()));
    let next = state.set_locked(value.clone()).set_valid(value).next_step();
    Transition::to(next).with_output(output)
}

/// Received a polka for nil, or timed out of prevote; precommit nil.
///
/// L44, L61.
fn precommit_nil<V: Value>(state: State<V>) -> Transition<V> {
    let output = Output::precommit(state.round, NilOrVal::Nil);
    Transition::to(state.next_step()).with_output(output)
}

/// We're not the proposer; schedule the propose timeout.
///
/// L11, L20.
fn schedule_timeout_propose<V: Value>(state: State<V>) -> Transition<V> {
    let output = Output::schedule_timeout(state.round, TimeoutStep::Propose);
    Transition::to(state.next_step()).with_output(output)
}

/// Received a polka for anything; schedule the prevote timeout. Firing this
/// more than once in a round is harmless (the driver only ever arms the
/// timeout, and the scheduler delivers it once).
///
/// L34.
fn schedule_timeout_prevote<V: Value>(state: State<V>) -> Transition<V> {
    let output = Output::schedule_timeout(state.round, TimeoutStep::Prevote);
    Transition::to(state.next_step()).with_output(output)
}

/// Received `2f+1` precommits for anything; schedule the precommit timeout.
///
/// L47.
fn schedule_timeout_precommit<V: Value>(state: State<V>) -> Transition<V> {
    let output = Output::schedule_timeout(state.round, TimeoutStep::Precommit);
    Transition::to(state.next_step()).with_output(output)
}

/// Received a polka for `value` after we already precommitted; update the
/// valid value without touching `locked` or the step.
///
/// L36/L42.
fn set_valid_value<V: Value>(state: State<V>, value: V) -> Transition<V> {
    Transition::to(state.set_valid(value))
}

/// The precommit timeout fired, or `f+1` messages were seen from a higher
/// round; move there.
///
/// L55, L65.
fn round_skip<V: Value>(state: State<V>, round: Round) -> Transition<V> {
    let output = Output::NewRound(round);
    Transition::to(state.new_round(round)).with_output(output)
}

/// Received `2f+1` precommits for `value`; decide it.
///
/// L49.
fn commit<V: Value>(state: State<V>, round: Round, value: V) -> Transition<V> {
    let output = Output::decision(round, value);
    Transition::to(state.commit_step()).with_output(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tnd_common::{Height, ValueId};

    #[derive(Clone, Debug, PartialEq, Eq)]
    struct V(u32);

    impl Value for V {
        fn id(&self) -> ValueId {
            ValueId::new(self.0)
        }
    }

    fn fresh() -> State<V> {
        State::new(Height::new(1), Round::ZERO)
    }

    #[test]
    fn proposer_proposes_its_value_when_nothing_is_valid() {
        let t = apply(fresh(), Round::ZERO, Input::NewRoundProposer(V(1)));
        assert!(t.valid);
        assert_eq!(t.state.step, Step::Propose);
        assert_eq!(
            t.output,
            Some(Output::proposal(Height::new(1), Round::ZERO, V(1), Round::Nil))
        );
    }

    #[test]
    fn proposer_reproposes_its_valid_value() {
        let state = fresh().set_valid(V(7));
        let t = apply(state, Round::ZERO, Input::NewRoundProposer(V(1)));
        assert_eq!(
            t.output,
            Some(Output::proposal(Height::new(1), Round::ZERO, V(7), Round::ZERO))
        );
    }

    #[test]
    fn unlocked_replica_prevotes_a_fresh_proposal() {
        let state = fresh().next_step(); // Propose
        let t = apply(state, Round::ZERO, Input::Proposal(V(1), Round::Nil));
        assert!(t.valid);
        assert_eq!(
            t.output,
            Some(Output::prevote(Round::ZERO, NilOrVal::Val(ValueId::new(1))))
        );
    }

    #[test]
    fn proposal_claiming_a_later_polka_round_is_rejected() {
        let state = fresh().next_step(); // Propose, round 0
        // vr = 1 is not < state.round (0), so this is neither a fresh
        // proposal nor an admissible re-proposal.
        let t = apply(state, Round::ZERO, Input::Proposal(V(1), Round::new(1)));
        assert!(!t.valid);
    }

    #[test]
    fn locked_on_different_value_at_higher_round_prevotes_nil() {
        let state = fresh().next_step().set_locked(V(9)); // locked at round 0
        let state = State { round: Round::new(1), ..state };
        let t = apply(state, Round::new(1), Input::Proposal(V(1), Round::ZERO));
        assert_eq!(t.output, Some(Output::prevote(Round::new(1), NilOrVal::Nil)));
    }

    #[test]
    fn polka_value_locks_and_precommits() {
        let state = fresh().next_step().next_step(); // Prevote
        let t = apply(state, Round::ZERO, Input::PolkaValue(V(3)));
        assert_eq!(t.state.locked.as_ref().map(|rv| &rv.value), Some(&V(3)));
        assert_eq!(
            t.output,
            Some(Output::precommit(Round::ZERO, NilOrVal::Val(ValueId::new(3))))
        );
    }

    #[test]
    fn precommit_timeout_advances_round() {
        let state = fresh();
        let t = apply(state, Round::ZERO, Input::TimeoutPrecommit);
        assert_eq!(t.state.round, Round::new(1));
        assert_eq!(t.state.step, Step::NewRound);
    }

    #[test]
    fn precommit_value_decides_even_from_a_different_round() {
        let state = fresh();
        let t = apply(state, Round::new(2), Input::PrecommitValue(V(4)));
        assert_eq!(t.state.step, Step::Commit);
        assert_eq!(
            t.output,
            Some(Output::decision(Round::new(2), V(4)))
        );
    }

    #[test]
    fn commit_step_accepts_no_further_transitions() {
        let state = State { step: Step::Commit, ..fresh() };
        let t = apply(state, Round::ZERO, Input::TimeoutPropose);
        assert!(!t.valid);
    }
}
