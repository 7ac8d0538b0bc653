//! The per-replica message log and vote tally (component C1).
//!
//! Records PROPOSAL/PREVOTE/PRECOMMIT messages keyed by `(height, round)`
//! and computes quorum (`>= 2f+1`) on identical vote values. This crate owns
//! no protocol control flow — it is a passive ledger the replica driver
//! (`tnd-driver`) consults after recording each inbound message.

#![forbid(unsafe_code)]
#![deny(unused_crate_dependencies, trivial_casts, trivial_numeric_casts)]
#![warn(
    missing_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
    variant_size_differences
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::panic))]

mod count;
mod evidence;
mod keeper;
mod log;
mod proposals;
mod round_votes;
mod threshold;

pub use evidence::Evidence;
pub use keeper::{Output as VoteKeeperOutput, VoteKeeper};
pub use log::{MessageLog, Tally};
pub use proposals::{ProposalRecord, Proposals, RecordProposalError};
pub use round_votes::RoundVotes;
pub use threshold::{Threshold, ThresholdParam, ThresholdParams};

/// Vote weight. Round-robin committees are unweighted (flat), per the
/// spec's non-goal of weighted voting, so every honest vote carries
/// weight `1` and the total is `n`.
pub type Weight = u64;

/// Error returned by [`VoteKeeper::record_vote`] when a sender has already
/// voted in this `(kind, height, round)`.
#[derive(Copy, Clone, Debug, thiserror::Error, PartialEq, Eq)]
#[error("duplicate {kind:?} from {sender:?} at round {round:?}")]
pub struct RecordVoteError {
    /// The vote kind (prevote/precommit).
    pub kind: tnd_common::VoteType,
    /// The offending sender.
    pub sender: tnd_common::Address,
    /// The round the duplicate was recorded for.
    pub round: tnd_common::Round,
}
