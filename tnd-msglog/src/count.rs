use std::collections::{BTreeMap, BTreeSet};

use tnd_common::{Address, NilOrVal, ValueId};

use crate::Weight;

/// Tallies votes of one kind (prevote or precommit) at one round, for
/// distinct values (or nil).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VoteCount {
    weights: BTreeMap<NilOrVal<ValueId>, Weight>,
    voted: BTreeSet<Address>,
}

impl VoteCount {
    /// Create an empty tally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a vote from `sender` for `value`, unless `sender` has already
    /// voted in this tally. Returns the new weight accumulated for `value`.
    ///
    /// Returns `None` if `sender` had already voted (the duplicate is
    /// rejected, not counted again).
    pub fn add(&mut self, sender: Address, value: NilOrVal<ValueId>, weight: Weight) -> Option<Weight> {
        if !self.voted.insert(sender) {
            return None;
        }

        let entry = self.weights.entry(value).or_insert(0);
        *entry += weight;
        Some(*entry)
    }

    /// Whether `sender` has already voted in this tally.
    pub fn has_voted(&self, sender: &Address) -> bool {
        self.voted.contains(sender)
    }

    /// The weight accumulated for `value`.
    pub fn get(&self, value: &NilOrVal<ValueId>) -> Weight {
        self.weights.get(value).copied().unwrap_or(0)
    }

    /// The total weight across all values (including nil).
    pub fn sum(&self) -> Weight {
        self.weights.values().sum()
    }

    /// Iterate over the weight accumulated for each distinct value voted.
    pub fn entries(&self) -> impl Iterator<Item = (&NilOrVal<ValueId>, Weight)> {
        self.weights.iter().map(|(v, w)| (v, *w))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(i: u32) -> Address {
        Address::new(i)
    }

    fn val(i: u32) -> NilOrVal<ValueId> {
        NilOrVal::Val(ValueId::new(i))
    }

    #[test]
    fn duplicate_sender_is_rejected() {
        let mut vc = VoteCount::new();
        assert_eq!(vc.add(addr(1), NilOrVal::Nil, 1), Some(1));
        assert_eq!(vc.add(addr(1), NilOrVal::Nil, 1), None);
        assert_eq!(vc.get(&NilOrVal::Nil), 1);
    }

    #[test]
    fn tallies_distinct_values_independently() {
        let mut vc = VoteCount::new();
        vc.add(addr(1), val(1), 1);
        vc.add(addr(2), val(1), 1);
        vc.add(addr(3), val(2), 1);
        assert_eq!(vc.get(&val(1)), 2);
        assert_eq!(vc.get(&val(2)), 1);
        assert_eq!(vc.sum(), 3);
    }
}
