//! A deterministic, single-process simulated transport and timeout
//! scheduler (external collaborator E1, and the scheduler half of C3).
//!
//! The teacher's production transport is an async `tokio`/`ractor` actor
//! system; that stack is out of scope here (see `DESIGN.md`) since the spec
//! explicitly scopes out real networking. Instead this crate is grounded in
//! the reference implementation's own simulation harness: a single
//! priority queue, keyed by delivery time, that a run loop drains in order.

#![forbid(unsafe_code)]
#![deny(unused_crate_dependencies, trivial_casts, trivial_numeric_casts)]
#![warn(
    missing_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
    variant_size_differences
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::panic))]

mod bus;
mod clock;
mod envelope;
mod timeout;

pub use bus::Bus;
pub use clock::LogicalTime;
pub use envelope::Envelope;
pub use timeout::{TimeoutConfig, TimeoutScheduler};
