//! Replica orchestration (component C2's driver half, and C3's client
//! half): composes the message log (`tnd-msglog`) with the pure round
//! state machine (`tnd-round`), selects proposers deterministically, and
//! resolves the spec's mux ambiguity between competing upon-rules.

#![forbid(unsafe_code)]
#![deny(unused_crate_dependencies, trivial_casts, trivial_numeric_casts)]
#![warn(
    missing_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
    variant_size_differences
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::panic))]

mod driver;
mod error;
mod input;
mod mux;
mod output;
pub mod proposer;

pub use driver::{Driver, ValueProvider};
pub use error::Error;
pub use input::{Input, Validity};
pub use output::Output;
