use core::fmt;

/// A collision-resistant, fixed-width identifier for a value, normally a
/// hash of the value. PREVOTE and PRECOMMIT messages carry a `ValueId`
/// (wrapped in [`crate::NilOrVal`]) rather than the full value; only the
/// PROPOSAL message carries the value itself.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValueId(u32);

impl ValueId {
    /// Wrap a raw identifier.
    pub const fn new(id: u32) -> Self {
        ValueId(id)
    }

    /// The raw identifier.
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValueId({:#010x})", self.0)
    }
}

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// A value (block) that can be proposed, voted on, and decided.
///
/// Validation (`valid(v)`, external collaborator E3) and identification
/// (`id(v)`, E4) are kept out of this trait's *contract* — `valid` is a
/// predicate the round state machine is handed the answer to by its caller
/// rather than one it computes itself, since block validation beyond a
/// well-formedness shape is explicitly out of core scope. `id` is this
/// trait's one required method, since every upon-rule needs to compare
/// value identifiers.
pub trait Value: Clone + fmt::Debug + PartialEq + Eq {
    /// The value's collision-resistant short identifier.
    fn id(&self) -> ValueId;
}
