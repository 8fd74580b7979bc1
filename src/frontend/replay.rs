use std::path::Path;
use std::sync::{Arc, RwLock};

use log::{debug, info};
use serde::Serialize;

use crate::aim::addr_mapper::AddressTranslator;
use crate::aim::error::ConfigError;
use crate::aim::expand::expand;
use crate::aim::trace::{load_trace, Trace};
use crate::base::behavior::ModuleBehaviors;
use crate::memsys::MemorySystem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayState {
    Active,
    Finished,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ReplayStats {
    attempts: u64,
    accepted: u64,
    rejected: u64,
    requests_sent: u64,
}

impl ReplayStats {
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    pub fn requests_sent(&self) -> u64 {
        self.requests_sent
    }
}

/// Replays a parsed trace into a memory system, one record per tick.
///
/// A record is expanded and offered as a single atomic batch.  The cursor only moves when the
/// batch is accepted; a rejected record is offered again, unchanged, on the next tick.  Once
/// every record has been accepted the driver is finished and stops submitting.
pub struct TraceReplay<M, T> {
    memory: Arc<RwLock<M>>,
    translator: T,
    trace: Vec<Trace>,
    cursor: usize,
    sent: usize,
    state: ReplayState,
    stats: ReplayStats,
}

impl<M: MemorySystem, T: AddressTranslator> TraceReplay<M, T> {
    pub fn new(trace: Vec<Trace>, translator: T, memory: Arc<RwLock<M>>) -> Self {
        let state = if trace.is_empty() {
            ReplayState::Finished
        } else {
            ReplayState::Active
        };
        Self {
            memory,
            translator,
            trace,
            cursor: 0,
            sent: 0,
            state,
            stats: ReplayStats::default(),
        }
    }

    pub fn from_path(path: &Path, translator: T, memory: Arc<RwLock<M>>) -> Result<Self, ConfigError> {
        let trace = load_trace(path)?;
        Ok(Self::new(trace, translator, memory))
    }

    /// Advance one step.  Returns true if a record was accepted downstream on this call.
    pub fn step(&mut self) -> bool {
        if self.state == ReplayState::Finished {
            return false;
        }
        if self.sent >= self.trace.len() {
            info!("trace replay finished: {} records", self.sent);
            self.state = ReplayState::Finished;
            return false;
        }

        let idx = self.cursor % self.trace.len();
        let record = &self.trace[idx];
        let requests = expand(record, &self.translator);
        let count = requests.len();

        self.stats.attempts += 1;
        let accepted = {
            let mut memory = self.memory.write().expect("memory system lock poisoned");
            if count == 1 && !record.is_aim() {
                requests.into_iter().all(|req| memory.send(req))
            } else {
                memory.send_batch(requests)
            }
        };

        if accepted {
            self.cursor = (idx + 1) % self.trace.len();
            self.sent += 1;
            self.stats.accepted += 1;
            self.stats.requests_sent += count as u64;
        } else {
            debug!("record {} ({}) rejected, retrying next tick", idx, record.kind());
            self.stats.rejected += 1;
        }
        accepted
    }

    /// True once every record has been accepted exactly once.
    pub fn is_finished(&self) -> bool {
        self.sent >= self.trace.len()
    }

    pub fn state(&self) -> ReplayState {
        self.state
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn sent(&self) -> usize {
        self.sent
    }

    pub fn len(&self) -> usize {
        self.trace.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trace.is_empty()
    }

    pub fn stats(&self) -> &ReplayStats {
        &self.stats
    }
}

impl<M: MemorySystem, T: AddressTranslator> ModuleBehaviors for TraceReplay<M, T> {
    fn tick_one(&mut self) {
        self.step();
    }

    /// Rewind to the first record.  Cursor and success count are reset together so the driver
    /// replays the whole trace once more.
    fn reset(&mut self) {
        self.cursor = 0;
        self.sent = 0;
        self.state = if self.trace.is_empty() {
            ReplayState::Finished
        } else {
            ReplayState::Active
        };
        self.stats = ReplayStats::default();
    }
}
