use std::collections::{BTreeMap, BTreeSet};

use tnd_common::{Address, Height, NilOrVal, Round, ValueId, VoteType};

use crate::round_votes::RoundVotes;
use crate::threshold::{Threshold, ThresholdParams};
use crate::{RecordVoteError, Weight};

/// A newly-crossed quorum, emitted at most once per `(kind, height, round,
/// threshold)` combination (fire-once semantics, §4.2.4/§4.2.7/§9).
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Output {
    /// `2f+1` prevotes for anything (any mix of ids and nil).
    PolkaAny,
    /// `2f+1` prevotes for nil.
    PolkaNil,
    /// `2f+1` prevotes for a specific value id.
    PolkaValue(ValueId),
    /// `2f+1` precommits for anything.
    PrecommitAny,
    /// `2f+1` precommits for a specific value id.
    PrecommitValue(ValueId),
}

#[derive(Clone, Debug, Default)]
struct PerRound {
    votes: RoundVotes,
    emitted: BTreeSet<Output>,
}

/// Tallies PREVOTE/PRECOMMIT messages and emits a quorum [`Output`] the
/// first time a threshold is newly crossed, for every `(height, round)`.
#[derive(Clone, Debug)]
pub struct VoteKeeper {
    total_weight: Weight,
    params: ThresholdParams,
    per_round: BTreeMap<(Height, Round), PerRound>,
}

impl VoteKeeper {
    /// Create a vote keeper for a committee of total weight `total_weight`.
    pub fn new(total_weight: Weight, params: ThresholdParams) -> Self {
        Self {
            total_weight,
            params,
            per_round: BTreeMap::new(),
        }
    }

    /// Record a vote, returning the quorum output newly crossed by it, if
    /// any, or an error if `sender` already voted this kind at this round.
    pub fn record_vote(
        &mut self,
        kind: VoteType,
        height: Height,
        round: Round,
        sender: Address,
        id_or_nil: NilOrVal<ValueId>,
    ) -> Result<Option<Output>, RecordVoteError> {
        let per_round = self.per_round.entry((height, round)).or_default();

        if per_round.votes.has_voted(kind, &sender) {
            return Err(RecordVoteError { kind, sender, round });
        }

        per_round.votes.add_vote(kind, sender, id_or_nil, 1);

        let threshold = compute_threshold(kind, &per_round.votes, id_or_nil, self.params.quorum, self.total_weight);
        let output = threshold_to_output(kind, threshold);

        match output {
            Some(output) if !per_round.emitted.contains(&output) => {
                per_round.emitted.insert(output);
                tracing::debug!(?kind, ?height, ?round, ?output, "vote threshold crossed");
                Ok(Some(output))
            }
            _ => Ok(None),
        }
    }

    /// The number of votes of `kind` recorded at `(height, round)`.
    pub fn vote_count(&self, kind: VoteType, height: Height, round: Round) -> usize {
        self.per_round
            .get(&(height, round))
            .map(|pr| pr.votes.sum(kind))
            .unwrap_or(0) as usize
    }

    /// Whether `threshold` is currently met for `kind` at `(height, round)`.
    pub fn is_threshold_met(
        &self,
        kind: VoteType,
        height: Height,
        round: Round,
        threshold: Threshold,
    ) -> bool {
        let Some(per_round) = self.per_round.get(&(height, round)) else {
            return false;
        };

        let value = match threshold {
            Threshold::Value(id) => NilOrVal::Val(id),
            Threshold::Nil => NilOrVal::Nil,
            _ => return false,
        };

        self.params
            .quorum
            .is_met(per_round.votes.get(kind, &value), self.total_weight)
    }

    /// The current quorum classification for `kind` votes at `(height,
    /// round)`, recomputed from the votes recorded so far (unlike
    /// [`VoteKeeper::record_vote`], this does not consult or update the
    /// fire-once `emitted` set).
    pub fn current_threshold(&self, kind: VoteType, height: Height, round: Round) -> Threshold {
        let Some(per_round) = self.per_round.get(&(height, round)) else {
            return Threshold::Unreached;
        };

        let dominant = per_round
            .votes
            .entries(kind)
            .find(|(_, weight)| self.params.quorum.is_met(*weight, self.total_weight));

        match dominant {
            Some((NilOrVal::Val(id), _)) => Threshold::Value(*id),
            Some((NilOrVal::Nil, _)) => Threshold::Nil,
            None if self.params.quorum.is_met(per_round.votes.sum(kind), self.total_weight) => {
                Threshold::Any
            }
            None => Threshold::Unreached,
        }
    }
}

fn compute_threshold(
    kind: VoteType,
    votes: &RoundVotes,
    id_or_nil: NilOrVal<ValueId>,
    quorum: crate::ThresholdParam,
    total_weight: Weight,
) -> Threshold {
    let weight = votes.get(kind, &id_or_nil);

    match id_or_nil {
        NilOrVal::Val(id) if quorum.is_met(weight, total_weight) => Threshold::Value(id),
        NilOrVal::Nil if quorum.is_met(weight, total_weight) => Threshold::Nil,
        _ => {
            if quorum.is_met(votes.sum(kind), total_weight) {
                Threshold::Any
            } else {
                Threshold::Unreached
            }
        }
    }
}

fn threshold_to_output(kind: VoteType, threshold: Threshold) -> Option<Output> {
    match (kind, threshold) {
        (_, Threshold::Unreached | Threshold::Skip) => None,
        (VoteType::Prevote, Threshold::Any) => Some(Output::PolkaAny),
        (VoteType::Prevote, Threshold::Nil) => Some(Output::PolkaNil),
        (VoteType::Prevote, Threshold::Value(id)) => Some(Output::PolkaValue(id)),
        (VoteType::Precommit, Threshold::Any) => Some(Output::PrecommitAny),
        (VoteType::Precommit, Threshold::Nil) => Some(Output::PrecommitAny),
        (VoteType::Precommit, Threshold::Value(id)) => Some(Output::PrecommitValue(id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(i: u32) -> NilOrVal<ValueId> {
        NilOrVal::Val(ValueId::new(i))
    }

    #[test]
    fn polka_value_fires_once_at_2f_plus_1() {
        let mut vk = VoteKeeper::new(4, ThresholdParams::default());
        let h = Height::new(0);
        let r = Round::ZERO;

        assert_eq!(
            vk.record_vote(VoteType::Prevote, h, r, Address::new(0), id(1))
                .unwrap(),
            None
        );
        assert_eq!(
            vk.record_vote(VoteType::Prevote, h, r, Address::new(1), id(1))
                .unwrap(),
            None
        );
        assert_eq!(
            vk.record_vote(VoteType::Prevote, h, r, Address::new(2), id(1))
                .unwrap(),
            Some(Output::PolkaValue(ValueId::new(1)))
        );
        // A fourth vote for the same value must not re-emit.
        assert_eq!(
            vk.record_vote(VoteType::Prevote, h, r, Address::new(3), id(1))
                .unwrap(),
            None
        );
    }

    #[test]
    fn duplicate_vote_is_rejected() {
        let mut vk = VoteKeeper::new(4, ThresholdParams::default());
        let h = Height::new(0);
        let r = Round::ZERO;
        vk.record_vote(VoteType::Prevote, h, r, Address::new(0), id(1))
            .unwrap();
        let err = vk
            .record_vote(VoteType::Prevote, h, r, Address::new(0), id(2))
            .unwrap_err();
        assert_eq!(err.sender, Address::new(0));
    }

    #[test]
    fn split_votes_yield_any_not_value() {
        let mut vk = VoteKeeper::new(4, ThresholdParams::default());
        let h = Height::new(0);
        let r = Round::ZERO;
        vk.record_vote(VoteType::Prevote, h, r, Address::new(0), id(1))
            .unwrap();
        vk.record_vote(VoteType::Prevote, h, r, Address::new(1), NilOrVal::Nil)
            .unwrap();
        let out = vk
            .record_vote(VoteType::Prevote, h, r, Address::new(2), id(2))
            .unwrap();
        assert_eq!(out, Some(Output::PolkaAny));
    }
}
