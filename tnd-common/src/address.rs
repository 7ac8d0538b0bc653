use core::fmt;

/// The identifier of a replica within the fixed-membership committee.
///
/// Round-robin proposer selection treats the committee as flat (unweighted),
/// per the spec's non-goal of weighted voting; an `Address` is simply its
/// index in `0..n`.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Address(u32);

impl Address {
    /// Construct an address from a committee index.
    pub const fn new(index: u32) -> Self {
        Address(index)
    }

    /// The committee index.
    pub const fn index(&self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "replica-{}", self.0)
    }
}
