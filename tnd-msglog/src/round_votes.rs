use tnd_common::{Address, NilOrVal, ValueId, VoteType};

use crate::count::VoteCount;
use crate::Weight;

/// Tracks both prevotes and precommits cast at a single round.
#[derive(Clone, Debug, Default)]
pub struct RoundVotes {
    prevotes: VoteCount,
    precommits: VoteCount,
}

impl RoundVotes {
    /// Create an empty round tally.
    pub fn new() -> Self {
        Self::default()
    }

    fn count_mut(&mut self, kind: VoteType) -> &mut VoteCount {
        match kind {
            VoteType::Prevote => &mut self.prevotes,
            VoteType::Precommit => &mut self.precommits,
        }
    }

    fn count(&self, kind: VoteType) -> &VoteCount {
        match kind {
            VoteType::Prevote => &self.prevotes,
            VoteType::Precommit => &self.precommits,
        }
    }

    /// Record a vote, returning the new weight for `value`, or `None` if
    /// `sender` had already voted this kind at this round.
    pub fn add_vote(
        &mut self,
        kind: VoteType,
        sender: Address,
        value: NilOrVal<ValueId>,
        weight: Weight,
    ) -> Option<Weight> {
        self.count_mut(kind).add(sender, value, weight)
    }

    /// Whether `sender` has already cast a vote of this kind at this round.
    pub fn has_voted(&self, kind: VoteType, sender: &Address) -> bool {
        self.count(kind).has_voted(sender)
    }

    /// The weight accumulated for `value` among votes of this kind.
    pub fn get(&self, kind: VoteType, value: &NilOrVal<ValueId>) -> Weight {
        self.count(kind).get(value)
    }

    /// The total weight of votes of this kind, across all values.
    pub fn sum(&self, kind: VoteType) -> Weight {
        self.count(kind).sum()
    }

    /// Iterate over the weight accumulated for each distinct value voted,
    /// for votes of this kind.
    pub fn entries(&self, kind: VoteType) -> impl Iterator<Item = (&NilOrVal<ValueId>, Weight)> {
        self.count(kind).entries()
    }
}
