//! Concrete value type, deterministic simulated network, and scenario
//! harness for the Tendermint-BFT replica. Nothing here is part of the
//! core: this crate plays the role external collaborators E1–E4 and the
//! author's own fault-injection harness play in the reference
//! implementation.

#![forbid(unsafe_code)]
#![deny(unused_crate_dependencies, trivial_casts, trivial_numeric_casts)]
#![warn(
    missing_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
    variant_size_differences
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::panic))]

mod behavior;
mod network;
mod value;

pub use behavior::Behavior;
pub use network::{Network, SafetyViolation, WireMessage};
pub use value::BlockValue;
