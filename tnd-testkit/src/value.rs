use tnd_common::{Value, ValueId};

/// A block value, the 4-character string payload the seeded scenarios use.
///
/// Concrete stand-in for external collaborators E3/E4: well-formedness
/// (`valid(v)`) is exactly-four-ASCII-bytes, and `id(v)` is the value's
/// crc32, matching `spec.md`'s scenario preamble (`id = crc32, value =
/// 4-char string`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockValue(String);

impl BlockValue {
    /// Wrap an arbitrary string as a block value.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// The well-formedness predicate the scenarios use for `valid(v)`:
    /// exactly four bytes.
    pub fn is_well_formed(&self) -> bool {
        self.0.len() == 4
    }

    /// The underlying string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Value for BlockValue {
    fn id(&self) -> ValueId {
        ValueId::new(crc32fast::hash(self.0.as_bytes()))
    }
}

impl std::fmt::Display for BlockValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_is_exactly_four_bytes() {
        assert!(BlockValue::new("ABCD").is_well_formed());
        assert!(!BlockValue::new("INVALID_BLOCK").is_well_formed());
        assert!(!BlockValue::new("AB").is_well_formed());
    }

    #[test]
    fn id_is_deterministic_and_distinguishes_values() {
        assert_eq!(BlockValue::new("ABCD").id(), BlockValue::new("ABCD").id());
        assert_ne!(BlockValue::new("ABCD").id(), BlockValue::new("WXYZ").id());
    }
}
