use std::path::PathBuf;

use anyhow::Context;
use log::warn;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use toml::Value;

use crate::memsys::req_buffer::DEFAULT_CAPACITY;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SimConfig {
    pub trace: PathBuf,
    pub timeout: u64,
    /// memory cycles per frontend tick
    pub clock_ratio: u64,
}

pub trait Config: DeserializeOwned + Default {
    fn from_section(section: Option<&Value>) -> anyhow::Result<Self> {
        match section {
            Some(value) => value
                .clone()
                .try_into()
                .context("cannot deserialize config section"),
            None => {
                warn!("config section not found, using defaults");
                Ok(Self::default())
            }
        }
    }
}

impl Config for SimConfig {}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            trace: PathBuf::new(),
            timeout: 10000000,
            clock_ratio: 1,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct MemConfig {
    pub queue_capacity: usize,
    pub latency: u64,
    pub issue_width: usize,
}

impl Config for MemConfig {}

impl MemConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.queue_capacity == 0 {
            anyhow::bail!("mem.queue_capacity must be at least 1");
        }
        if self.issue_width == 0 {
            anyhow::bail!("mem.issue_width must be at least 1");
        }
        Ok(())
    }
}

impl Default for MemConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_CAPACITY,
            latency: 16,
            issue_width: 1,
        }
    }
}
