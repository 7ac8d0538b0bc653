/// Construction-time errors. Protocol deviations observed once the replica
/// is running (duplicate vote, wrong proposer, stale timeout) are never
/// represented here — they are recoverable outcomes the driver logs and
/// moves past, per §7's totality requirement.
#[derive(Copy, Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// The committee size given to [`crate::Driver::new`] is not `3f + 1`.
    #[error(transparent)]
    Config(#[from] tnd_common::ConfigError),
}
