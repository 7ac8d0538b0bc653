//! Common datatypes shared across the replica, message log and round crates.

#![forbid(unsafe_code)]
#![deny(unused_crate_dependencies, trivial_casts, trivial_numeric_casts)]
#![warn(
    missing_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
    variant_size_differences
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::panic))]

mod address;
mod error;
mod height;
mod nil_or_val;
mod round;
mod timeout;
mod value;

pub use address::Address;
pub use error::ConfigError;
pub use height::Height;
pub use nil_or_val::NilOrVal;
pub use round::Round;
pub use timeout::{Timeout, TimeoutStep};
pub use value::{Value, ValueId};

/// The number of Byzantine replicas a committee of `n` processes tolerates,
/// under the assumption `n = 3f + 1`.
///
/// Returns [`ConfigError::NotThreeFPlusOne`] if `n` is not of that form.
pub fn max_faults(n: u32) -> Result<u32, ConfigError> {
    if n == 0 || (n - 1) % 3 != 0 {
        return Err(ConfigError::NotThreeFPlusOne(n));
    }

    Ok((n - 1) / 3)
}

/// The step of consensus within a round.
///
/// Transitions are monotone within a round: `Propose -> Prevote -> Precommit`.
/// `NewRound` precedes `Propose` and `Commit` follows `Precommit`; neither
/// participates in the within-round monotonicity check.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Step {
    /// The round has just started, `StartRound` has not yet run its effects.
    NewRound,
    /// Waiting for / producing the proposal.
    Propose,
    /// Waiting for / having cast a prevote.
    Prevote,
    /// Waiting for / having cast a precommit.
    Precommit,
    /// A value has been decided at this height; no further transitions occur.
    Commit,
}

/// The kind of vote being tallied or recorded.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VoteType {
    /// A PREVOTE.
    Prevote,
    /// A PRECOMMIT.
    Precommit,
}
