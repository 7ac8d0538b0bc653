use tnd_common::ValueId;

use crate::Weight;

/// The outcome of tallying votes of one kind at one round, once enough
/// weight has accumulated to classify it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Threshold {
    /// No quorum yet.
    Unreached,
    /// Quorum reached, but votes are split across values (no single id or
    /// nil individually crossed the quorum threshold).
    Any,
    /// Quorum of votes for `nil`.
    Nil,
    /// Quorum of votes for a specific value id.
    Value(ValueId),
    /// `f+1` votes observed from a higher round than the one we're at.
    Skip,
}

/// A quorum threshold expressed as a fraction of the total committee weight.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ThresholdParam {
    numerator: u64,
    denominator: u64,
}

impl ThresholdParam {
    /// `2f+1`, ie. more than two thirds of the total weight.
    pub const TWO_F_PLUS_ONE: Self = Self::new(2, 3);

    /// `f+1`, ie. more than one third of the total weight.
    pub const F_PLUS_ONE: Self = Self::new(1, 3);

    /// Construct a new threshold parameter.
    pub const fn new(numerator: u64, denominator: u64) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Whether `weight` meets this threshold out of `total`.
    pub const fn is_met(&self, weight: Weight, total: Weight) -> bool {
        weight * self.denominator > total * self.numerator
    }
}

/// The two thresholds the replica cares about.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ThresholdParams {
    /// Threshold for a quorum certificate (default `2f+1`).
    pub quorum: ThresholdParam,

    /// Threshold for the round-skip ("someone honest is ahead") rule.
    ///
    /// The spec (§4.2.10) notes the paper states this rule with `2f+1` but
    /// recommends the safer, customary Tendermint formulation of `f+1`;
    /// this implementation uses `f+1` (see `DESIGN.md`).
    pub round_skip: ThresholdParam,
}

impl Default for ThresholdParams {
    fn default() -> Self {
        Self {
            quorum: ThresholdParam::TWO_F_PLUS_ONE,
            round_skip: ThresholdParam::F_PLUS_ONE,
        }
    }
}
