use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use toml::Table;

use crate::aim::addr_mapper::OrgConfig;
use crate::sim::config::{Config, MemConfig, SimConfig};
use crate::sim::top::Sim;

#[derive(Parser)]
#[command(version, about)]
pub struct FrontendArgs {
    #[arg(help = "Path to config.toml")]
    pub config_path: PathBuf,
    #[arg(long, help = "Override trace path")]
    pub trace: Option<PathBuf>,
    #[arg(long, help = "Override simulation timeout in cycles")]
    pub timeout: Option<u64>,
    #[arg(long, help = "Override memory cycles per frontend tick")]
    pub clock_ratio: Option<u64>,
    #[arg(long, help = "Override admission buffer capacity")]
    pub queue_capacity: Option<usize>,
    #[arg(long, help = "Write run statistics as JSON to this path")]
    pub stats_json: Option<PathBuf>,
}

pub fn read_toml(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read config file {}", path.display()))
}

/// Make a Sim object from the TOML configuration.
/// If `cli_args` is given, override TOML options with CLI arguments.
pub fn make_sim(toml_string: &str, cli_args: Option<&FrontendArgs>) -> anyhow::Result<Sim> {
    let config_table: Table = toml::from_str(toml_string).context("cannot parse config toml")?;
    let mut sim_config = SimConfig::from_section(config_table.get("sim")).context("[sim]")?;
    let mut mem_config = MemConfig::from_section(config_table.get("mem")).context("[mem]")?;
    let org_config = OrgConfig::from_section(config_table.get("org")).context("[org]")?;

    // override toml configs with CLI args
    if let Some(args) = cli_args {
        sim_config.trace = args.trace.clone().unwrap_or(sim_config.trace);
        sim_config.timeout = args.timeout.unwrap_or(sim_config.timeout);
        sim_config.clock_ratio = args.clock_ratio.unwrap_or(sim_config.clock_ratio);
        mem_config.queue_capacity = args.queue_capacity.unwrap_or(mem_config.queue_capacity);
    }

    Sim::new(sim_config, mem_config, org_config)
}
