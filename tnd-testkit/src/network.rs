use tnd_bus::{Bus, Envelope, TimeoutConfig, TimeoutScheduler};
use tnd_common::{Address, Height, NilOrVal, Round, Timeout, Value, ValueId, VoteType};
use tnd_driver::{
    Driver, Error, Input as DriverInput, Output as DriverOutput, ValueProvider, Validity,
};
use tnd_msglog::ThresholdParams;

use crate::behavior::Behavior;

/// Wire shape for a message once it has left a replica's driver and before
/// it reaches another replica's input queue — the envelope this network
/// puts around a driver `Output` in place of a real network stack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WireMessage<V> {
    /// A broadcast proposal.
    Proposal {
        /// The round.
        round: Round,
        /// The proposed value.
        value: V,
        /// The claimed valid round.
        valid_round: Round,
    },
    /// A broadcast vote.
    Vote {
        /// Prevote or precommit.
        kind: VoteType,
        /// The round.
        round: Round,
        /// The value id voted for, or nil.
        value_id: NilOrVal<ValueId>,
    },
    /// A self-addressed timeout.
    Timeout(Timeout),
}

struct ReplicaHandle<V> {
    driver: Driver<V>,
    scheduler: TimeoutScheduler,
    behavior: Behavior<V>,
}

/// A single-process simulation of `n` replicas wired together over
/// [`tnd_bus::Bus`]: the test-only stand-in for the real, out-of-scope
/// transport, playing the role of the reference implementation's
/// `MessageQueue` (`run`/`send_message`/`safety_check`/`liveness_check`).
pub struct Network<V> {
    replicas: Vec<ReplicaHandle<V>>,
    bus: Bus<Envelope<WireMessage<V>>>,
    n: u32,
}

/// Evidence of two honest replicas disagreeing on a height's decision.
#[derive(Debug)]
pub struct SafetyViolation<V> {
    /// The height at which replicas disagreed.
    pub height: Height,
    /// Each disagreeing replica's decision.
    pub decisions: Vec<(Address, V)>,
}

impl<V: Value> Network<V> {
    /// An all-honest network of `n` replicas, each fed values by its own
    /// entry in `providers` (index == `Address` index).
    pub fn new(
        n: u32,
        params: ThresholdParams,
        config: TimeoutConfig,
        providers: Vec<ValueProvider<V>>,
    ) -> Result<Self, Error> {
        assert_eq!(providers.len() as u32, n, "one value provider per replica");

        let replicas = providers
            .into_iter()
            .enumerate()
            .map(|(i, get_value)| {
                Driver::new(n, Address::new(i as u32), params, get_value).map(|driver| {
                    ReplicaHandle {
                        driver,
                        scheduler: TimeoutScheduler::new(config),
                        behavior: Behavior::Honest,
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            replicas,
            bus: Bus::new(),
            n,
        })
    }

    /// Override how `address` behaves when broadcasting, for Byzantine
    /// scenarios.
    pub fn set_behavior(&mut self, address: Address, behavior: Behavior<V>) {
        self.replicas[address.index() as usize].behavior = behavior;
    }

    /// The value decided by `address` at `height`, if any.
    pub fn decision(&self, address: Address, height: Height) -> Option<&V> {
        self.replicas[address.index() as usize].driver.decision(height)
    }

    /// The height `address` is currently working on.
    pub fn height(&self, address: Address) -> Height {
        self.replicas[address.index() as usize].driver.height()
    }

    /// Start every replica at `(height, Round::ZERO)` — the `bootstrap()`
    /// call of the Replica API.
    pub fn bootstrap(&mut self, height: Height) {
        for i in 0..self.n {
            self.dispatch(Address::new(i), DriverInput::NewRound(height, Round::ZERO));
        }
    }

    /// Drain and process one message from the bus. Returns `false` once
    /// nothing remains in flight.
    pub fn step(&mut self, valid: &impl Fn(&V) -> bool) -> bool {
        let Some((to, envelope)) = self.bus.recv() else {
            return false;
        };

        let Envelope { from, body } = envelope;

        let input = match body {
            WireMessage::Proposal {
                round,
                value,
                valid_round,
            } => {
                let validity = if valid(&value) {
                    Validity::Valid
                } else {
                    Validity::Invalid
                };
                DriverInput::Proposal {
                    round,
                    sender: from,
                    value,
                    valid_round,
                    validity,
                }
            }
            WireMessage::Vote { kind, round, value_id } => DriverInput::Vote {
                kind,
                round,
                sender: from,
                value_id,
            },
            WireMessage::Timeout(timeout) => {
                self.replicas[to.index() as usize].scheduler.elapsed(timeout.step);
                DriverInput::TimeoutElapsed(timeout)
            }
        };

        self.dispatch(to, input);
        true
    }

    /// Run until the bus is drained — every honest replica has processed
    /// everything currently in flight and is waiting on its next timeout.
    ///
    /// A replica that keeps deciding never stops producing new work (each
    /// decision immediately starts the next height), so this only
    /// terminates against a network that has genuinely stalled. Use
    /// [`Network::run_for`] instead for any scenario where progress is
    /// expected to continue.
    pub fn run_until_idle(&mut self, valid: &impl Fn(&V) -> bool) {
        while self.step(valid) {}
    }

    /// Run at most `max_steps` bus deliveries. Returns `true` if the bus
    /// was drained before the cap was hit, `false` if the cap cut it off —
    /// the escape hatch for scenarios where liveness is expected to never
    /// converge (a Byzantine minority above `f` can round-skip forever).
    pub fn run_for(&mut self, valid: &impl Fn(&V) -> bool, max_steps: u32) -> bool {
        for _ in 0..max_steps {
            if !self.step(valid) {
                return true;
            }
        }
        false
    }

    fn dispatch(&mut self, to: Address, input: DriverInput<V>) {
        let outputs = self.replicas[to.index() as usize].driver.process(input);
        for output in outputs {
            self.handle_output(to, output);
        }
    }

    fn handle_output(&mut self, from: Address, output: DriverOutput<V>) {
        match output {
            DriverOutput::NewRound(height, round) => {
                self.dispatch(from, DriverInput::NewRound(height, round));
            }
            DriverOutput::Proposal {
                round, value, valid_round, ..
            } => {
                self.broadcast(
                    from,
                    WireMessage::Proposal {
                        round,
                        value,
                        valid_round,
                    },
                );
            }
            DriverOutput::Vote { kind, round, value_id, .. } => {
                self.broadcast(from, WireMessage::Vote { kind, round, value_id });
            }
            DriverOutput::ScheduleTimeout(_, timeout) => {
                let idx = from.index() as usize;
                let Network { replicas, bus, .. } = self;
                replicas[idx]
                    .scheduler
                    .schedule(bus, from, timeout, |t| Envelope::new(from, WireMessage::Timeout(t)));
            }
            DriverOutput::Decision { height, value, .. } => {
                tracing::info!(replica = ?from, ?height, value = ?value, "decided");
                self.replicas[from.index() as usize].scheduler.reset();
            }
        }
    }

    fn broadcast(&mut self, from: Address, message: WireMessage<V>) {
        let n = self.n;
        let targets = self.replicas[from.index() as usize].behavior.targets(n, message);
        for (to, msg) in targets {
            self.bus.send(to, Envelope::new(from, msg));
        }
    }

    /// Compare decisions across every replica at every height reached so
    /// far, mirroring the reference implementation's `safety_check`: more
    /// than one distinct decided value at the same height is Agreement
    /// (P1) violated.
    pub fn safety_check(&self) -> Result<(), SafetyViolation<V>> {
        let max_height = self
            .replicas
            .iter()
            .map(|r| r.driver.height())
            .max()
            .unwrap_or(Height::ZERO);

        let mut h = Height::ZERO;
        while h < max_height {
            let decisions: Vec<(Address, V)> = self
                .replicas
                .iter()
                .enumerate()
                .filter_map(|(i, r)| r.driver.decision(h).map(|v| (Address::new(i as u32), v.clone())))
                .collect();

            if let Some((_, first)) = decisions.first() {
                if decisions.iter().any(|(_, v)| v != first) {
                    return Err(SafetyViolation { height: h, decisions });
                }
            }

            h = h.increment();
        }

        Ok(())
    }
}
