use thiserror::Error;

/// Everything that can go wrong setting up or running a simulation, short
/// of a protocol bug (those surface as a failed `safety_check`, not an
/// `Err`).
#[derive(Debug, Error)]
pub enum Error {
    /// The config file couldn't be read or didn't deserialize.
    #[error("failed to load simulation config: {0}")]
    Config(#[from] config::ConfigError),

    /// `n` wasn't of the form `3f + 1`, or another driver construction
    /// precondition was violated.
    #[error(transparent)]
    Driver(#[from] tnd_driver::Error),

    /// A `--log-level`/`RUST_LOG` filter directive didn't parse.
    #[error("invalid log filter: {0}")]
    LogFilter(#[from] tracing_subscriber::filter::ParseError),
}
