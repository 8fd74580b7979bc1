use std::collections::VecDeque;

use log::debug;
use serde::Serialize;

use crate::aim::request::{Clk, Request};
use crate::base::behavior::ModuleBehaviors;
use crate::memsys::req_buffer::ReqBuffer;
use crate::memsys::MemorySystem;
use crate::sim::config::MemConfig;

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct MemStats {
    accepted: u64,
    rejected: u64,
    issued: u64,
    completed: u64,
    completed_aim: u64,
    max_occupancy: u64,
}

impl MemStats {
    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    pub fn issued(&self) -> u64 {
        self.issued
    }

    pub fn completed(&self) -> u64 {
        self.completed
    }

    pub fn completed_aim(&self) -> u64 {
        self.completed_aim
    }

    pub fn max_occupancy(&self) -> u64 {
        self.max_occupancy
    }
}

/// Stand-in memory system: one bounded admission buffer drained in order, `issue_width`
/// requests per cycle, each completing a fixed `latency` after issue.
#[derive(Debug)]
pub struct FifoMemorySystem {
    config: MemConfig,
    clk: Clk,
    pending: ReqBuffer,
    inflight: VecDeque<(Clk, Request)>,
    stats: MemStats,
}

impl FifoMemorySystem {
    pub fn new(config: MemConfig) -> Self {
        Self {
            config,
            clk: 0,
            pending: ReqBuffer::new(config.queue_capacity),
            inflight: VecDeque::new(),
            stats: MemStats::default(),
        }
    }

    pub fn clk(&self) -> Clk {
        self.clk
    }

    pub fn stats(&self) -> &MemStats {
        &self.stats
    }

    pub fn pending(&self) -> &ReqBuffer {
        &self.pending
    }

    pub fn inflight(&self) -> usize {
        self.inflight.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty() && self.inflight.is_empty()
    }

    fn record_submit(&mut self, accepted: bool, count: usize) {
        if accepted {
            self.stats.accepted += count as u64;
            self.stats.max_occupancy = self.stats.max_occupancy.max(self.pending.len() as u64);
        } else {
            self.stats.rejected += count as u64;
        }
    }

    fn retire(&mut self) {
        while let Some((ready_at, _)) = self.inflight.front() {
            if *ready_at > self.clk {
                break;
            }
            let Some((_, mut request)) = self.inflight.pop_front() else {
                break;
            };
            request.depart = Some(self.clk);
            self.stats.completed += 1;
            if request.is_aim() {
                self.stats.completed_aim += 1;
            }
            request.notify_complete();
        }
    }

    fn issue(&mut self) {
        for _ in 0..self.config.issue_width {
            let Some(mut request) = self.pending.dequeue() else {
                break;
            };
            request.issue = Some(self.clk);
            self.stats.issued += 1;
            self.inflight
                .push_back((self.clk + self.config.latency, request));
        }
    }
}

impl MemorySystem for FifoMemorySystem {
    fn send(&mut self, mut request: Request) -> bool {
        request.arrive = Some(self.clk);
        let accepted = self.pending.enqueue(request);
        self.record_submit(accepted, 1);
        accepted
    }

    fn send_batch(&mut self, mut requests: Vec<Request>) -> bool {
        let count = requests.len();
        requests.iter_mut().for_each(|r| r.arrive = Some(self.clk));
        let accepted = self.pending.enqueue_all(requests);
        if !accepted {
            debug!(
                "rejected batch of {} at clk {} ({} free slots)",
                count,
                self.clk,
                self.pending.free_slots()
            );
        }
        self.record_submit(accepted, count);
        accepted
    }
}

impl ModuleBehaviors for FifoMemorySystem {
    fn tick_one(&mut self) {
        self.clk += 1;
        self.retire();
        self.issue();
    }

    fn reset(&mut self) {
        self.clk = 0;
        self.pending.clear();
        self.inflight.clear();
        self.stats = MemStats::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aim::taxonomy::OpKind;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn config(queue_capacity: usize, latency: u64, issue_width: usize) -> MemConfig {
        MemConfig {
            queue_capacity,
            latency,
            issue_width,
        }
    }

    #[test]
    fn stamps_lifecycle_and_fires_callback() {
        let mut mem = FifoMemorySystem::new(config(4, 2, 1));
        let done = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&done);
        let cb: crate::aim::request::Callback = Arc::new(move |req: &Request| {
            assert_eq!(req.arrive, Some(0));
            assert_eq!(req.issue, Some(1));
            assert_eq!(req.depart, Some(3));
            seen.fetch_add(1, Ordering::SeqCst);
        });
        assert!(mem.send(Request::with_callback(64, OpKind::Read, 3, cb)));

        for _ in 0..3 {
            mem.tick_one();
        }
        assert_eq!(done.load(Ordering::SeqCst), 1);
        assert!(mem.is_idle());
        assert_eq!(mem.stats().completed(), 1);
    }

    #[test]
    fn batch_rejected_when_it_does_not_fit() {
        let mut mem = FifoMemorySystem::new(config(4, 1, 1));
        let template = Request::compute(OpKind::Mac4bkIntraBg);
        assert!(mem.send(Request::new(0, OpKind::Write)));
        let batch: Vec<_> = (0..4).map(|a| template.with_addr(a)).collect();
        assert!(!mem.send_batch(batch.clone()));
        assert_eq!(mem.pending().len(), 1);
        assert_eq!(mem.stats().rejected(), 4);

        mem.tick_one();
        assert!(mem.send_batch(batch));
        assert_eq!(mem.pending().len(), 4);
    }

    #[test]
    fn issue_width_bounds_drain_rate() {
        let mut mem = FifoMemorySystem::new(config(8, 10, 2));
        for a in 0..5 {
            assert!(mem.send(Request::new(a, OpKind::Read)));
        }
        mem.tick_one();
        assert_eq!(mem.stats().issued(), 2);
        assert_eq!(mem.inflight(), 2);
        mem.reset();
        assert!(mem.is_idle());
        assert_eq!(mem.clk(), 0);
    }

    #[test]
    fn counts_completed_compute_requests() {
        let mut mem = FifoMemorySystem::new(config(8, 0, 4));
        let template = Request::compute(OpKind::WrGb);
        assert!(mem.send(template.with_addr(0)));
        assert!(mem.send(Request::new(32, OpKind::Read)));
        mem.tick_one();
        mem.tick_one();
        assert_eq!(mem.stats().completed(), 2);
        assert_eq!(mem.stats().completed_aim(), 1);
    }
}
