use std::collections::HashMap;

use tnd_common::{Address, Timeout, TimeoutStep};

use crate::bus::Bus;

/// Base durations (in bus ticks) for each step's timeout, and the amount
/// each grows by every time it elapses without progress — the same
/// propose/prevote/precommit-plus-delta shape as the teacher's timers
/// actor, adapted from wall-clock `Duration`s to logical ticks since this
/// scheduler never actually sleeps.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TimeoutConfig {
    /// Base `PROPOSAL_TIMEOUT`.
    pub propose: u64,
    /// Base `PREVOTE_TIMEOUT`.
    pub prevote: u64,
    /// Base `PRECOMMIT_TIMEOUT`.
    pub precommit: u64,
    /// Growth added to a step's timeout each time it elapses.
    pub delta: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            propose: 10,
            prevote: 10,
            precommit: 10,
            delta: 5,
        }
    }
}

impl TimeoutConfig {
    fn base_duration(&self, step: TimeoutStep) -> u64 {
        match step {
            TimeoutStep::Propose => self.propose,
            TimeoutStep::Prevote => self.prevote,
            TimeoutStep::Precommit => self.precommit,
        }
    }
}

/// Per-replica timeout scheduling state: how long each step's timeout
/// currently runs, growing every time one elapses so that a replica stuck
/// re-proposing across rounds backs off rather than retrying at a fixed
/// cadence forever.
pub struct TimeoutScheduler {
    config: TimeoutConfig,
    current: HashMap<TimeoutStep, u64>,
}

impl TimeoutScheduler {
    /// A scheduler starting from `config`'s base durations.
    pub fn new(config: TimeoutConfig) -> Self {
        Self {
            config,
            current: HashMap::new(),
        }
    }

    fn duration(&self, step: TimeoutStep) -> u64 {
        self.current
            .get(&step)
            .copied()
            .unwrap_or_else(|| self.config.base_duration(step))
    }

    /// Arm `timeout`, addressed to `to`, on `bus`, using this step's
    /// current (possibly grown) duration.
    pub fn schedule<M>(&self, bus: &mut Bus<M>, to: Address, timeout: Timeout, wrap: impl FnOnce(Timeout) -> M) {
        let delay = self.duration(timeout.step);
        tracing::debug!(?timeout, delay, "arming timeout");
        bus.schedule_after(to, wrap(timeout), delay);
    }

    /// Record that `step`'s timeout elapsed without progress, growing its
    /// duration by `config.delta` for next time.
    pub fn elapsed(&mut self, step: TimeoutStep) {
        let next = self.duration(step) + self.config.delta;
        self.current.insert(step, next);
    }

    /// Reset every step's timeout back to its configured base — used when
    /// a height is decided and a fresh one begins.
    pub fn reset(&mut self) {
        self.current.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tnd_common::Round;

    #[test]
    fn grows_by_delta_each_time_it_elapses() {
        let config = TimeoutConfig {
            propose: 10,
            prevote: 10,
            precommit: 10,
            delta: 3,
        };
        let mut scheduler = TimeoutScheduler::new(config);

        assert_eq!(scheduler.duration(TimeoutStep::Propose), 10);
        scheduler.elapsed(TimeoutStep::Propose);
        assert_eq!(scheduler.duration(TimeoutStep::Propose), 13);
        scheduler.elapsed(TimeoutStep::Propose);
        assert_eq!(scheduler.duration(TimeoutStep::Propose), 16);

        // Other steps are unaffected.
        assert_eq!(scheduler.duration(TimeoutStep::Prevote), 10);
    }

    #[test]
    fn reset_reverts_to_base() {
        let mut scheduler = TimeoutScheduler::new(TimeoutConfig::default());
        scheduler.elapsed(TimeoutStep::Precommit);
        assert_ne!(scheduler.duration(TimeoutStep::Precommit), 10);

        scheduler.reset();
        assert_eq!(scheduler.duration(TimeoutStep::Precommit), TimeoutConfig::default().precommit);
    }

    #[test]
    fn schedule_enqueues_on_the_bus() {
        let scheduler = TimeoutScheduler::new(TimeoutConfig::default());
        let mut bus: Bus<Timeout> = Bus::new();
        let timeout = Timeout::propose(Round::ZERO);

        scheduler.schedule(&mut bus, Address::new(0), timeout, |t| t);

        assert_eq!(bus.recv(), Some((Address::new(0), timeout)));
    }
}
