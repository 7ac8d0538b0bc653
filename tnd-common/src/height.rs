use core::fmt;

/// The height of a consensus instance, ie. the index of a committed value
/// in the replicated log.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Height(u64);

impl Height {
    /// The genesis height.
    pub const ZERO: Height = Height(0);

    /// Construct a height from a raw index.
    pub const fn new(h: u64) -> Self {
        Height(h)
    }

    /// The raw index.
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// The next height.
    pub const fn increment(&self) -> Height {
        Height(self.0 + 1)
    }
}

impl fmt::Debug for Height {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Height({})", self.0)
    }
}

impl fmt::Display for Height {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
