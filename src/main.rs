use std::fs;

use anyhow::Context;
use aim_frontend::ui::{make_sim, read_toml, FrontendArgs};
use clap::Parser;

pub fn main() -> anyhow::Result<()> {
    env_logger::init();

    let argv = FrontendArgs::parse();
    let config = read_toml(&argv.config_path)?;

    let mut sim = make_sim(&config, Some(&argv))?;
    let report = sim.simulate()?;

    println!(
        "replayed {} records ({} requests) in {} cycles, {} rejected attempts, {} requests completed",
        report.records,
        report.replay.requests_sent(),
        report.cycles,
        report.replay.rejected(),
        report.memory.completed()
    );

    if let Some(path) = &argv.stats_json {
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    }
    Ok(())
}
