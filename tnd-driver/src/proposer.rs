//! Deterministic proposer selection (§4.2.12).

use tnd_common::{Address, Height, Round};

/// The designated proposer for `(height, round)`, among `n` replicas
/// addressed `0..n`.
///
/// The spec allows either `(h + r) mod n` or the reference's `r mod n`; this
/// implementation uses `(h + r) mod n` (see `DESIGN.md`) so that the
/// proposer rotates even across heights that happen to decide in round
/// zero, rather than always starting back at replica 0.
pub fn proposer(height: Height, round: Round, n: u32) -> Address {
    let round = round.as_i64().max(0) as u64;
    let index = (height.as_u64().wrapping_add(round)) % u64::from(n);
    Address::new(index as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotates_with_height_and_round() {
        assert_eq!(proposer(Height::new(0), Round::ZERO, 4), Address::new(0));
        assert_eq!(proposer(Height::new(0), Round::new(1), 4), Address::new(1));
        assert_eq!(proposer(Height::new(1), Round::ZERO, 4), Address::new(1));
        assert_eq!(proposer(Height::new(4), Round::ZERO, 4), Address::new(0));
    }
}
