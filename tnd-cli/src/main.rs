//! `tnd-sim`: wires up a committee of simulated replicas over `tnd-bus`,
//! runs them to a target height (or until the step budget runs out), and
//! reports what each replica decided.

#![forbid(unsafe_code)]
#![deny(unused_crate_dependencies, trivial_casts, trivial_numeric_casts)]
#![warn(
    missing_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
    variant_size_differences
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::panic))]

mod args;
mod config;
mod error;

use clap::Parser;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::FmtSubscriber;

use tnd_common::{Address, Height};
use tnd_driver::ValueProvider;
use tnd_testkit::{Behavior, BlockValue, Network};

use crate::args::Args;
use crate::config::{ByzantineMode, SimConfig};
use crate::error::Error;

fn main() -> Result<(), Error> {
    let args = Args::parse();

    init_logging(args.log_level.as_deref())?;

    let sim_config = load_config(&args)?;
    let mut network = build_network(&sim_config)?;

    for replica in &sim_config.byzantine {
        let address = Address::new(replica.index);
        let behavior = match &replica.mode {
            ByzantineMode::Silent => Behavior::Silent,
            ByzantineMode::Equivocating { alternate, targets } => Behavior::Equivocating {
                alternate: BlockValue::new(alternate.clone()),
                targets: targets.iter().map(|&i| Address::new(i)).collect(),
            },
            ByzantineMode::Random { seed } => Behavior::random(*seed),
        };
        tracing::info!(?address, mode = ?replica.mode, "replica configured as byzantine");
        network.set_behavior(address, behavior);
    }

    let height = Height::new(sim_config.height);
    tracing::info!(n = sim_config.n, ?height, "bootstrapping committee");
    network.bootstrap(height);

    let drained = network.run_for(&BlockValue::is_well_formed, sim_config.max_steps);
    if !drained {
        tracing::warn!(
            max_steps = sim_config.max_steps,
            "step budget exhausted before the bus drained; treat remaining decisions as inconclusive"
        );
    }

    for i in 0..sim_config.n {
        let address = Address::new(i);
        match network.decision(address, height) {
            Some(value) => tracing::info!(?address, ?height, %value, "decided"),
            None => tracing::info!(?address, ?height, "no decision reached"),
        }
    }

    match network.safety_check() {
        Ok(()) => {
            tracing::info!("safety check passed: no two replicas disagreed at any height");
            Ok(())
        }
        Err(violation) => {
            tracing::error!(height = ?violation.height, decisions = ?violation.decisions, "safety violated");
            std::process::exit(1);
        }
    }
}

fn load_config(args: &Args) -> Result<SimConfig, Error> {
    let mut builder =
        ::config::Config::builder().add_source(::config::File::from(args.config.clone()));

    if let Some(n) = args.n {
        builder = builder.set_override("n", n as i64)?;
    }

    let sim_config: SimConfig = builder.build()?.try_deserialize()?;
    Ok(sim_config)
}

fn build_network(sim_config: &SimConfig) -> Result<Network<BlockValue>, Error> {
    let value = sim_config.value.clone();
    let providers: Vec<ValueProvider<BlockValue>> = (0..sim_config.n)
        .map(|_| -> ValueProvider<BlockValue> {
            let value = value.clone();
            Box::new(move |_height, _round| BlockValue::new(value.clone()))
        })
        .collect();

    Network::new(
        sim_config.n,
        sim_config.threshold_params(),
        sim_config.timeouts.into(),
        providers,
    )
    .map_err(Error::from)
}

fn init_logging(override_filter: Option<&str>) -> Result<(), Error> {
    let directive = override_filter
        .map(str::to_owned)
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "tnd_sim=info".to_string());

    let filter = EnvFilter::try_new(directive)?;

    let subscriber = FmtSubscriber::builder()
        .with_target(false)
        .with_env_filter(filter)
        .with_writer(std::io::stdout)
        .finish();

    subscriber.init();
    Ok(())
}
