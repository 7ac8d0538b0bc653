//! Resolves the spec's two competing round-level upon-rules — the
//! first-prevote rule (§4.2.2) and the prevote-QC override rule (§4.2.3) —
//! by re-deriving, on every proposal arrival and every new vote threshold,
//! which round input (if any) currently applies, instead of keying only off
//! the literal `vr == nil` test carried by the inbound message.

use tnd_common::Value;
use tnd_msglog::{Threshold, VoteKeeperOutput};
use tnd_round::{Input as RoundInput, Step};

use crate::driver::Driver;
use crate::input::Validity;

impl<V: Value> Driver<V> {
    /// Resolve an inbound proposal into a round input, recording it in the
    /// message log first. Returns `None` if the proposal was rejected
    /// (duplicate, wrong proposer) or does not yet warrant a round input.
    pub(crate) fn multiplex_proposal(
        &mut self,
        round: tnd_common::Round,
        sender: tnd_common::Address,
        value: V,
        valid_round: tnd_common::Round,
        validity: Validity,
    ) -> Option<RoundInput<V>> {
        if !self.round_state.round.is_defined() {
            return None;
        }

        let expected = self.proposer(round);
        if let Err(err) =
            self.message_log
                .record_proposal(self.height(), round, sender, expected, value.clone(), valid_round)
        {
            tracing::warn!(?err, "rejected proposal");
            return None;
        }

        let polka_for_pol = valid_round.is_defined()
            && self.message_log.tally(self.height(), valid_round).prevotes == Threshold::Value(value.id());
        let polka_previous = polka_for_pol && valid_round < self.round_state.round;

        if !validity.is_valid() {
            return if self.round_state.step == Step::Propose && (!valid_round.is_defined() || polka_previous) {
                Some(RoundInput::ProposalInvalid)
            } else {
                None
            };
        }

        // L49: a precommit quorum already exists for this value, whatever
        // round we're at locally.
        if self.message_log.tally(self.height(), round).precommits == Threshold::Value(value.id()) {
            return Some(RoundInput::PrecommitValue(value));
        }

        if self.round_state.round != round {
            return None;
        }

        // L36: a prevote quorum for this value, at the current round.
        let polka_current = self.message_log.tally(self.height(), round).prevotes == Threshold::Value(value.id())
            && self.round_state.step >= Step::Prevote;

        if polka_current {
            return Some(RoundInput::PolkaValue(value));
        }

        // L22/L28, handled uniformly by the round state machine regardless
        // of whether `valid_round` is nil (fresh proposal) or defined and
        // admissible (re-proposal).
        Some(RoundInput::Proposal(value, valid_round))
    }

    /// Resolve a newly crossed vote threshold into a round input, using the
    /// proposal recorded (if any) at that round to fill in a value.
    pub(crate) fn multiplex_vote_threshold(
        &self,
        round: tnd_common::Round,
        threshold: VoteKeeperOutput,
    ) -> Option<RoundInput<V>> {
        let proposal = self.message_log.proposal(self.height(), round);

        match threshold {
            VoteKeeperOutput::PolkaAny => Some(RoundInput::PolkaAny),
            VoteKeeperOutput::PolkaNil => Some(RoundInput::PolkaNil),
            VoteKeeperOutput::PolkaValue(id) => match proposal {
                Some(p) if p.value.id() == id => Some(RoundInput::PolkaValue(p.value.clone())),
                _ => Some(RoundInput::PolkaAny),
            },
            VoteKeeperOutput::PrecommitAny => Some(RoundInput::PrecommitAny),
            VoteKeeperOutput::PrecommitValue(id) => match proposal {
                Some(p) if p.value.id() == id => Some(RoundInput::PrecommitValue(p.value.clone())),
                _ => Some(RoundInput::PrecommitAny),
            },
        }
    }

    /// When a step change lands us on `Prevote` without an explicit
    /// threshold-crossing event having driven us there (eg. after casting
    /// our own prevote), check whether a threshold was already met and
    /// re-derive the input we would otherwise have missed.
    pub(crate) fn multiplex_step_change(
        &self,
        pending_step: Step,
        round: tnd_common::Round,
    ) -> Option<RoundInput<V>> {
        match pending_step {
            Step::Prevote => {
                let tally = self.message_log.tally(self.height(), round);
                if tally.prevotes == Threshold::Nil {
                    Some(RoundInput::PolkaNil)
                } else if let Threshold::Value(id) = tally.prevotes {
                    match self.message_log.proposal(self.height(), round) {
                        Some(p) if p.value.id() == id => Some(RoundInput::PolkaValue(p.value.clone())),
                        _ => Some(RoundInput::PolkaAny),
                    }
                } else if tally.prevotes == Threshold::Any {
                    Some(RoundInput::PolkaAny)
                } else {
                    None
                }
            }
            Step::NewRound | Step::Propose | Step::Precommit | Step::Commit => None,
        }
    }
}
