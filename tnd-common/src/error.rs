/// Construction-time configuration errors.
///
/// These are the one class of error in this workspace that is fatal rather
/// than recoverable: a committee that doesn't satisfy `n = 3f + 1` cannot
/// run the protocol at all, so it is rejected at construction rather than
/// discovered mid-run.
#[derive(Copy, Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// `n` is not of the form `3f + 1` for any non-negative integer `f`.
    #[error("committee size {0} is not of the form 3f+1")]
    NotThreeFPlusOne(u32),
}
