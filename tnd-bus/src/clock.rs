use core::fmt;
use core::ops::Add;

/// A tick of the bus's logical clock.
///
/// Simulated time, not wall time: the bus never sleeps. `recv` advances the
/// clock to the delivery time of whatever it pops next, so scheduled
/// messages and immediate sends interleave deterministically regardless of
/// how long the harness actually takes to run.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LogicalTime(u64);

impl LogicalTime {
    /// The clock's starting value.
    pub const ZERO: LogicalTime = LogicalTime(0);

    /// Construct a logical time directly from a tick count.
    pub const fn new(ticks: u64) -> Self {
        LogicalTime(ticks)
    }

    /// The raw tick count.
    pub const fn ticks(&self) -> u64 {
        self.0
    }
}

impl Add<u64> for LogicalTime {
    type Output = LogicalTime;

    fn add(self, delay: u64) -> LogicalTime {
        LogicalTime(self.0 + delay)
    }
}

impl fmt::Debug for LogicalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={}", self.0)
    }
}
