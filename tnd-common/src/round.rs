use core::fmt;

/// A round number within a height.
///
/// Mirrors the paper's convention of using `-1` as the "no round"/"unset"
/// sentinel for `lockedRound`/`validRound`, but keeps that sentinel out of
/// the arithmetic domain of valid round numbers so comparisons stay total.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Round {
    /// No round, ie. the `-1` sentinel.
    Nil,
    /// Round `r`, `r >= 0`.
    Some(i64),
}

impl Round {
    /// The initial round of a height.
    pub const ZERO: Round = Round::Some(0);

    /// Construct a round from a non-negative round number.
    pub const fn new(r: i64) -> Self {
        debug_assert!(r >= 0);
        Round::Some(r)
    }

    /// Whether this is a defined (non-nil) round.
    pub const fn is_defined(&self) -> bool {
        matches!(self, Round::Some(_))
    }

    /// The round number as a signed integer, with `Nil` mapping to `-1`,
    /// mirroring the paper's arithmetic comparisons (`lockedRound <= vr`).
    pub const fn as_i64(&self) -> i64 {
        match self {
            Round::Nil => -1,
            Round::Some(r) => *r,
        }
    }

    /// The next round.
    pub const fn increment(&self) -> Round {
        match self {
            Round::Nil => Round::ZERO,
            Round::Some(r) => Round::Some(r + 1),
        }
    }
}

impl Default for Round {
    fn default() -> Self {
        Round::Nil
    }
}

impl PartialOrd for Round {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Round {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.as_i64().cmp(&other.as_i64())
    }
}

impl fmt::Debug for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Round::Nil => write!(f, "Round::Nil"),
            Round::Some(r) => write!(f, "Round::Some({r})"),
        }
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_matches_sentinel_arithmetic() {
        assert!(Round::Nil < Round::ZERO);
        assert!(Round::new(0) < Round::new(1));
        assert_eq!(Round::Nil.as_i64(), -1);
    }

    #[test]
    fn increment() {
        assert_eq!(Round::Nil.increment(), Round::ZERO);
        assert_eq!(Round::new(3).increment(), Round::new(4));
    }
}
