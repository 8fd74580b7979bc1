use std::sync::{Arc, RwLock};

use anyhow::{bail, Context};
use log::info;
use serde::Serialize;

use crate::aim::addr_mapper::{LinearMapper, OrgConfig};
use crate::base::behavior::*;
use crate::frontend::{ReplayStats, TraceReplay};
use crate::memsys::{FifoMemorySystem, MemStats};
use crate::sim::config::{MemConfig, SimConfig};

#[derive(Debug, Clone, Serialize)]
pub struct SimReport {
    pub cycles: u64,
    pub records: usize,
    pub replay: ReplayStats,
    pub memory: MemStats,
}

/// Trace-driven top: a replay frontend feeding the stand-in memory system.
pub struct Sim {
    pub config: SimConfig,
    pub memory: Arc<RwLock<FifoMemorySystem>>,
    pub replay: TraceReplay<FifoMemorySystem, LinearMapper>,
    cycle: u64,
}

impl Sim {
    pub fn new(sim_config: SimConfig, mem_config: MemConfig, org_config: OrgConfig) -> anyhow::Result<Sim> {
        if sim_config.clock_ratio == 0 {
            bail!("sim.clock_ratio must be at least 1");
        }
        mem_config.validate()?;
        let mapper = LinearMapper::new(&org_config)?;
        let memory = Arc::new(RwLock::new(FifoMemorySystem::new(mem_config)));
        let replay = TraceReplay::from_path(&sim_config.trace, mapper, Arc::clone(&memory))
            .with_context(|| format!("failed to load trace {}", sim_config.trace.display()))?;
        Ok(Sim {
            config: sim_config,
            memory,
            replay,
            cycle: 0,
        })
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn finished(&self) -> bool {
        self.replay.is_finished() && self.memory.read().expect("memory lock poisoned").is_idle()
    }

    pub fn report(&self) -> SimReport {
        SimReport {
            cycles: self.cycle,
            records: self.replay.len(),
            replay: *self.replay.stats(),
            memory: *self.memory.read().expect("memory lock poisoned").stats(),
        }
    }

    /// Run until the trace has been replayed and the memory system drained.
    pub fn simulate(&mut self) -> anyhow::Result<SimReport> {
        while !self.finished() {
            if self.cycle >= self.config.timeout {
                bail!(
                    "simulation timed out after {} cycles ({}/{} records sent)",
                    self.cycle,
                    self.replay.sent(),
                    self.replay.len()
                );
            }
            self.tick_one();
        }
        info!("simulation finished in {} cycles", self.cycle);
        Ok(self.report())
    }
}

impl ModuleBehaviors for Sim {
    fn tick_one(&mut self) {
        if self.cycle % self.config.clock_ratio == 0 {
            self.replay.tick_one();
        }
        self.memory.write().expect("memory lock poisoned").tick_one();
        self.cycle += 1;
    }

    fn reset(&mut self) {
        self.memory.write().expect("memory lock poisoned").reset();
        self.replay.reset();
        self.cycle = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn write_trace(name: &str, body: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("aim_frontend_top_{}_{}.trace", name, std::process::id()));
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn replays_trace_to_completion() {
        let path = write_trace("run", "WR_GB 1\nMAC_ABK 1 0 0 0 4 0\nR 128\nRD_MAC 1 0 0 0 0 0 512\n");
        let sim_config = SimConfig {
            trace: path.clone(),
            clock_ratio: 2,
            ..SimConfig::default()
        };
        let mem_config = MemConfig {
            queue_capacity: 16,
            latency: 4,
            issue_width: 4,
        };
        let mut sim = Sim::new(sim_config, mem_config, OrgConfig::default()).unwrap();
        let report = sim.simulate().unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(report.records, 4);
        assert_eq!(report.replay.accepted(), 4);
        assert_eq!(report.replay.requests_sent(), 1 + 16 + 1 + 1);
        assert_eq!(report.memory.completed(), 19);
        assert!(sim.finished());

        sim.reset();
        assert_eq!(sim.cycle(), 0);
        assert!(!sim.finished());
    }

    #[test]
    fn times_out_when_memory_cannot_keep_up() {
        let path = write_trace("timeout", "MAC_ABK 1 0 0 0 4 0\nMAC_ABK 1 0 0 0 5 0\n");
        let sim_config = SimConfig {
            trace: path.clone(),
            timeout: 20,
            ..SimConfig::default()
        };
        let mut sim = Sim::new(sim_config, MemConfig::default(), OrgConfig::default()).unwrap();
        let result = sim.simulate();
        fs::remove_file(&path).ok();
        assert!(result.is_err());
    }

    #[test]
    fn rejects_zero_clock_ratio_and_missing_trace() {
        let zero = SimConfig {
            clock_ratio: 0,
            ..SimConfig::default()
        };
        assert!(Sim::new(zero, MemConfig::default(), OrgConfig::default()).is_err());

        let missing = SimConfig {
            trace: std::env::temp_dir().join("aim_frontend_top_missing.trace"),
            ..SimConfig::default()
        };
        assert!(Sim::new(missing, MemConfig::default(), OrgConfig::default()).is_err());
    }
}
