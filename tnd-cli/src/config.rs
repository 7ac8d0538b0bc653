use serde::Deserialize;

use tnd_bus::TimeoutConfig;
use tnd_msglog::{ThresholdParam, ThresholdParams};

/// The round-skip quorum a simulation run should use — a config-level
/// choice between the paper's literal `2f+1` and the safer customary
/// Tendermint `f+1` (see `DESIGN.md`'s resolution of this open question).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundSkipThreshold {
    #[default]
    FPlusOne,
    TwoFPlusOne,
}

impl RoundSkipThreshold {
    fn into_param(self) -> ThresholdParam {
        match self {
            RoundSkipThreshold::FPlusOne => ThresholdParam::F_PLUS_ONE,
            RoundSkipThreshold::TwoFPlusOne => ThresholdParam::TWO_F_PLUS_ONE,
        }
    }
}

/// Timeout configuration mirrored from [`tnd_bus::TimeoutConfig`] so it can
/// derive `Deserialize` without imposing that on the `tnd-bus` crate.
#[derive(Copy, Clone, Debug, Deserialize)]
pub struct TimeoutSettings {
    pub propose: u64,
    pub prevote: u64,
    pub precommit: u64,
    pub delta: u64,
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        let defaults = TimeoutConfig::default();
        Self {
            propose: defaults.propose,
            prevote: defaults.prevote,
            precommit: defaults.precommit,
            delta: defaults.delta,
        }
    }
}

impl From<TimeoutSettings> for TimeoutConfig {
    fn from(s: TimeoutSettings) -> Self {
        TimeoutConfig {
            propose: s.propose,
            prevote: s.prevote,
            precommit: s.precommit,
            delta: s.delta,
        }
    }
}

/// How a Byzantine replica is instructed to misbehave.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ByzantineMode {
    /// Never send anything.
    Silent,
    /// Send `alternate` to `targets`, the real value to everyone else.
    Equivocating { alternate: String, targets: Vec<u32> },
    /// Cast random votes, seeded for reproducibility.
    Random { seed: u64 },
}

/// One entry in `byzantine`: which replica, and how it misbehaves.
#[derive(Clone, Debug, Deserialize)]
pub struct ByzantineReplica {
    pub index: u32,
    #[serde(flatten)]
    pub mode: ByzantineMode,
}

/// The whole of a simulation run's configuration — `SimConfig`, loaded by
/// layering a `toml` file under CLI overrides via the `config` crate,
/// mirroring the teacher's `malachite_config::Config` loading but scoped to
/// what this engine actually needs (no networking/discovery sections).
#[derive(Clone, Debug, Deserialize)]
pub struct SimConfig {
    /// Committee size, must be `3f + 1`.
    pub n: u32,

    /// The height to bootstrap at and run to completion.
    #[serde(default)]
    pub height: u64,

    /// How many bus deliveries to run before giving up (liveness-breaking
    /// scenarios never drain the bus on their own).
    #[serde(default = "default_max_steps")]
    pub max_steps: u32,

    /// Quorum/round-skip thresholds.
    #[serde(default)]
    pub round_skip: RoundSkipThreshold,

    /// Timeout base durations and growth.
    #[serde(default)]
    pub timeouts: TimeoutSettings,

    /// The value every honest replica's provider proposes when it is the
    /// designated proposer, in the absence of a carried-over valid value.
    #[serde(default = "default_value")]
    pub value: String,

    /// Replicas that deviate from honest behavior.
    #[serde(default)]
    pub byzantine: Vec<ByzantineReplica>,
}

fn default_max_steps() -> u32 {
    10_000
}

fn default_value() -> String {
    "ABCD".to_string()
}

impl SimConfig {
    /// The `ThresholdParams` this run's committee should tally votes with.
    pub fn threshold_params(&self) -> ThresholdParams {
        ThresholdParams {
            quorum: ThresholdParam::TWO_F_PLUS_ONE,
            round_skip: self.round_skip.into_param(),
        }
    }
}
