use std::collections::{BTreeMap, BTreeSet};

use tnd_common::{Address, Height, NilOrVal, Round, Value, ValueId, VoteType};

use crate::evidence::Evidence;
use crate::keeper::{Output as VoteKeeperOutput, VoteKeeper};
use crate::proposals::{ProposalRecord, Proposals, RecordProposalError};
use crate::threshold::{Threshold, ThresholdParams};
use crate::{RecordVoteError, Weight};

/// The current quorum classification of both vote kinds at a round.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Tally {
    /// The prevote quorum classification.
    pub prevotes: Threshold,
    /// The precommit quorum classification.
    pub precommits: Threshold,
}

/// The unified per-replica message log (component C1): records proposals
/// and votes, tallies them towards quorum, and tracks the round-skip
/// condition (§4.2.10) across *all* message kinds.
///
/// This is a passive ledger: it rejects malformed input (wrong proposer,
/// duplicate sender) and reports what has accumulated, but it never
/// decides what the replica should *do* about it. That belongs to the
/// round state machine and the driver that consults this log.
#[derive(Clone, Debug)]
pub struct MessageLog<V> {
    total_weight: Weight,
    params: ThresholdParams,
    proposals: Proposals<V>,
    votes: VoteKeeper,
    /// Every sender observed at `(height, round)`, across proposals and
    /// both vote kinds, used for the any-kind-message round-skip rule.
    activity: BTreeMap<(Height, Round), BTreeSet<Address>>,
    evidence: Vec<Evidence>,
}

impl<V: Value> MessageLog<V> {
    /// Create an empty message log for a committee of `total_weight`
    /// (equivalently, `n`, since committees are unweighted).
    pub fn new(total_weight: Weight, params: ThresholdParams) -> Self {
        Self {
            total_weight,
            params,
            proposals: Proposals::new(),
            votes: VoteKeeper::new(total_weight, params),
            activity: BTreeMap::new(),
            evidence: Vec::new(),
        }
    }

    /// Record a proposal from `sender`, rejecting it if `sender` is not the
    /// designated proposer or a proposal for `(height, round)` already
    /// exists. On a rejected duplicate, the disposition is also recorded as
    /// [`Evidence::DuplicateProposal`] (it never surfaces as a successful
    /// second proposal).
    pub fn record_proposal(
        &mut self,
        height: Height,
        round: Round,
        sender: Address,
        expected_proposer: Address,
        value: V,
        valid_round: Round,
    ) -> Result<(), RecordProposalError> {
        let result = self
            .proposals
            .record(height, round, sender, expected_proposer, value, valid_round);

        if let Err(RecordProposalError::Duplicate { .. }) = &result {
            self.evidence.push(Evidence::DuplicateProposal {
                height,
                round,
                proposer: expected_proposer,
            });
        }

        if result.is_ok() {
            self.note_activity(height, round, sender);
        }

        result
    }

    /// The proposal recorded at `(height, round)`, if any.
    pub fn proposal(&self, height: Height, round: Round) -> Option<&ProposalRecord<V>> {
        self.proposals.get(height, round)
    }

    /// Record a vote from `sender`, returning the quorum output newly
    /// crossed by it, if any. On a rejected duplicate the disposition is
    /// recorded as [`Evidence::DuplicateVote`].
    pub fn record_vote(
        &mut self,
        kind: VoteType,
        height: Height,
        round: Round,
        sender: Address,
        id_or_nil: NilOrVal<ValueId>,
    ) -> Result<Option<VoteKeeperOutput>, RecordVoteError> {
        let prior = self.votes.current_threshold(kind, height, round);
        let result = self.votes.record_vote(kind, height, round, sender, id_or_nil);

        match &result {
            Ok(_) => self.note_activity(height, round, sender),
            Err(_) => {
                let first = match prior {
                    Threshold::Value(id) => NilOrVal::Val(id),
                    _ => NilOrVal::Nil,
                };
                self.evidence.push(Evidence::DuplicateVote {
                    kind,
                    height,
                    round,
                    sender,
                    first,
                    second: id_or_nil,
                });
            }
        }

        result
    }

    /// The number of votes of `kind` recorded at `(height, round)`.
    pub fn vote_count(&self, kind: VoteType, height: Height, round: Round) -> usize {
        self.votes.vote_count(kind, height, round)
    }

    /// The current prevote/precommit quorum classification at `(height,
    /// round)`.
    pub fn tally(&self, height: Height, round: Round) -> Tally {
        Tally {
            prevotes: self.votes.current_threshold(VoteType::Prevote, height, round),
            precommits: self.votes.current_threshold(VoteType::Precommit, height, round),
        }
    }

    /// The lowest round strictly greater than `current_round`, at `height`,
    /// for which messages (of any kind: proposal, prevote, precommit) have
    /// been seen from enough distinct senders to meet the round-skip
    /// threshold (`f+1` by default, §4.2.10) — "some honest replica is
    /// already ahead of us". `None` if no such round exists yet.
    pub fn skip_round(&self, height: Height, current_round: Round) -> Option<Round> {
        self.activity
            .iter()
            .filter(|((h, r), _)| *h == height && *r > current_round)
            .find(|(_, senders)| {
                self.params
                    .round_skip
                    .is_met(senders.len() as Weight, self.total_weight)
            })
            .map(|((_, r), _)| *r)
    }

    /// Byzantine-looking dispositions observed so far (duplicate proposals
    /// or votes). Never consulted for protocol correctness; exposed for
    /// harnesses and operators.
    pub fn evidence(&self) -> &[Evidence] {
        &self.evidence
    }

    fn note_activity(&mut self, height: Height, round: Round, sender: Address) {
        self.activity.entry((height, round)).or_default().insert(sender);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq)]
    struct V(u32);

    impl Value for V {
        fn id(&self) -> ValueId {
            ValueId::new(self.0)
        }
    }

    #[test]
    fn skip_round_needs_distinct_senders_past_current_round() {
        let mut log = MessageLog::<V>::new(4, ThresholdParams::default());
        let h = Height::new(1);

        assert_eq!(log.skip_round(h, Round::ZERO), None);

        log.record_vote(VoteType::Prevote, h, Round::new(1), Address::new(0), NilOrVal::Nil)
            .unwrap();
        log.record_vote(VoteType::Precommit, h, Round::new(1), Address::new(1), NilOrVal::Nil)
            .unwrap();
        assert_eq!(log.skip_round(h, Round::ZERO), Some(Round::new(1)));
        // Not ahead of round 1 itself.
        assert_eq!(log.skip_round(h, Round::new(1)), None);
    }

    #[test]
    fn duplicate_vote_is_recorded_as_evidence() {
        let mut log = MessageLog::<V>::new(4, ThresholdParams::default());
        let h = Height::new(1);
        log.record_vote(VoteType::Prevote, h, Round::ZERO, Address::new(0), NilOrVal::Nil)
            .unwrap();
        log.record_vote(
            VoteType::Prevote,
            h,
            Round::ZERO,
            Address::new(0),
            NilOrVal::Val(ValueId::new(7)),
        )
        .unwrap_err();

        assert_eq!(log.evidence().len(), 1);
        assert!(matches!(log.evidence()[0], Evidence::DuplicateVote { .. }));
    }
}
