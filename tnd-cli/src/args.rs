use std::path::PathBuf;

use clap::Parser;

/// Run a deterministic, single-process simulation of the replica committee.
#[derive(Parser, Clone, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the `SimConfig` toml file.
    #[arg(long, value_name = "CONFIG_FILE", default_value = "sim.toml")]
    pub config: PathBuf,

    /// Override the committee size from the config file.
    #[arg(long, value_name = "N")]
    pub n: Option<u32>,

    /// Override the log filter directive (defaults to `RUST_LOG`, then
    /// `tnd_sim=info`).
    #[arg(long, value_name = "FILTER")]
    pub log_level: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_sim_toml_in_the_current_directory() {
        let args = Args::parse_from(["tnd-sim"]);
        assert_eq!(args.config, PathBuf::from("sim.toml"));
        assert_eq!(args.n, None);
    }

    #[test]
    fn overrides_parse() {
        let args = Args::parse_from(["tnd-sim", "--config", "four.toml", "--n", "7"]);
        assert_eq!(args.config, PathBuf::from("four.toml"));
        assert_eq!(args.n, Some(7));
    }
}
