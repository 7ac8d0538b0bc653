//! The pure per-round consensus state machine (component C2).
//!
//! This crate knows nothing about the network, the message log, or how
//! quorums are computed — it only encodes the upon-rules of one round: given
//! a [`State`] and an [`Input`], what is the next state and what, if
//! anything, should be emitted. The driver (`tnd-driver`) is responsible for
//! feeding it inputs derived from the message log and for acting on its
//! outputs.

#![forbid(unsafe_code)]
#![deny(unused_crate_dependencies, trivial_casts, trivial_numeric_casts)]
#![warn(
    missing_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
    variant_size_differences
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::panic))]

pub mod input;
pub mod output;
pub mod state;
pub mod state_machine;

pub use input::Input;
pub use output::Output;
pub use state::{RoundValue, State, Step};
pub use state_machine::{apply, Transition};
