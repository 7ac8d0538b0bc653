use std::collections::BTreeMap;

use tnd_common::{Address, Height, Round, Value};

/// A proposal recorded at `(height, round)`: the proposed value together
/// with the round in which the proposer last saw a prevote quorum for it
/// (`-1`/`Round::Nil` if none).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProposalRecord<V> {
    /// The proposed value.
    pub value: V,
    /// The proposer-claimed `validRound`.
    pub valid_round: Round,
}

/// Rejected-proposal dispositions (§4.1, §7).
#[derive(Copy, Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum RecordProposalError {
    /// The proposer for `(height, round)` already sent a proposal.
    #[error("duplicate proposal at height {height:?} round {round:?}")]
    Duplicate {
        /// The height.
        height: Height,
        /// The round.
        round: Round,
    },
    /// `sender` is not the designated proposer for `(height, round)`.
    #[error("{sender:?} is not the proposer for height {height:?} round {round:?} (expected {expected:?})")]
    WrongProposer {
        /// The height.
        height: Height,
        /// The round.
        round: Round,
        /// Who actually sent it.
        sender: Address,
        /// Who should have sent it.
        expected: Address,
    },
}

/// At most one proposal per `(height, round)`, from the designated proposer.
#[derive(Clone, Debug)]
pub struct Proposals<V> {
    by_round: BTreeMap<(Height, Round), ProposalRecord<V>>,
}

impl<V: Value> Proposals<V> {
    /// Create an empty proposal log.
    pub fn new() -> Self {
        Self {
            by_round: BTreeMap::new(),
        }
    }

    /// Record a proposal from `sender`, after checking it is the designated
    /// `expected_proposer` and that no proposal has been recorded yet for
    /// `(height, round)`.
    pub fn record(
        &mut self,
        height: Height,
        round: Round,
        sender: Address,
        expected_proposer: Address,
        value: V,
        valid_round: Round,
    ) -> Result<(), RecordProposalError> {
        if sender != expected_proposer {
            return Err(RecordProposalError::WrongProposer {
                height,
                round,
                sender,
                expected: expected_proposer,
            });
        }

        if self.by_round.contains_key(&(height, round)) {
            return Err(RecordProposalError::Duplicate { height, round });
        }

        self.by_round
            .insert((height, round), ProposalRecord { value, valid_round });

        Ok(())
    }

    /// The proposal recorded at `(height, round)`, if any.
    pub fn get(&self, height: Height, round: Round) -> Option<&ProposalRecord<V>> {
        self.by_round.get(&(height, round))
    }
}

impl<V: Value> Default for Proposals<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tnd_common::ValueId;

    #[derive(Clone, Debug, PartialEq, Eq)]
    struct V(u32);

    impl Value for V {
        fn id(&self) -> ValueId {
            ValueId::new(self.0)
        }
    }

    #[test]
    fn rejects_wrong_proposer() {
        let mut p = Proposals::new();
        let err = p
            .record(
                Height::new(1),
                Round::ZERO,
                Address::new(1),
                Address::new(0),
                V(9),
                Round::Nil,
            )
            .unwrap_err();
        assert!(matches!(err, RecordProposalError::WrongProposer { .. }));
    }

    #[test]
    fn rejects_duplicate() {
        let mut p = Proposals::new();
        p.record(
            Height::new(1),
            Round::ZERO,
            Address::new(0),
            Address::new(0),
            V(9),
            Round::Nil,
        )
        .unwrap();

        let err = p
            .record(
                Height::new(1),
                Round::ZERO,
                Address::new(0),
                Address::new(0),
                V(10),
                Round::Nil,
            )
            .unwrap_err();
        assert!(matches!(err, RecordProposalError::Duplicate { .. }));
    }
}
