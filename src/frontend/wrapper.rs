use std::sync::{Arc, RwLock};

use log::{debug, warn};
use serde::Serialize;

use crate::aim::request::Request;
use crate::aim::taxonomy::{Addr, OpKind};
use crate::memsys::MemorySystem;

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct InjectStats {
    plain_accepted: u64,
    compute_accepted: u64,
    rejected: u64,
}

impl InjectStats {
    pub fn plain_accepted(&self) -> u64 {
        self.plain_accepted
    }

    pub fn compute_accepted(&self) -> u64 {
        self.compute_accepted
    }

    pub fn rejected(&self) -> u64 {
        self.rejected
    }
}

/// Entry point for requests that do not come from a trace file, e.g. issued by a co-simulation
/// host.  Each call submits immediately and hands back the memory system's answer; retrying a
/// rejected request is up to the caller.
pub struct ExternalWrapper<M> {
    memory: Arc<RwLock<M>>,
    stats: InjectStats,
}

impl<M: MemorySystem> ExternalWrapper<M> {
    pub fn new(memory: Arc<RwLock<M>>) -> Self {
        Self {
            memory,
            stats: InjectStats::default(),
        }
    }

    fn submit(&mut self, request: Request) -> bool {
        let compute = request.is_aim();
        let accepted = self
            .memory
            .write()
            .expect("memory system lock poisoned")
            .send(request);
        match (accepted, compute) {
            (false, _) => self.stats.rejected += 1,
            (true, false) => self.stats.plain_accepted += 1,
            (true, true) => self.stats.compute_accepted += 1,
        }
        accepted
    }

    /// Submit a plain request without expansion.
    pub fn inject_request<F>(&mut self, kind: OpKind, addr: Addr, source_id: i32, on_complete: F) -> bool
    where
        F: Fn(&Request) + Send + Sync + 'static,
    {
        debug!("external request {} @ {:#x} from source {}", kind, addr, source_id);
        self.submit(Request::with_callback(addr, kind, source_id, Arc::new(on_complete)))
    }

    /// Submit a single compute request tagged with the bank class of `kind`.  Kinds that are not
    /// compute operations go out as plain requests with the non-compute bank hint.
    pub fn inject_compute_request<F>(&mut self, kind: OpKind, addr: Addr, on_complete: F) -> bool
    where
        F: Fn(&Request) + Send + Sync + 'static,
    {
        let request = Request::compute(kind).with_addr(addr);
        debug!("external compute request {} (banks={}) @ {:#x}", kind, request.num_banks(), addr);
        self.submit(request.on_complete(Arc::new(on_complete)))
    }

    /// [`Self::inject_request`] for a numeric operation id.  Ids outside the taxonomy are passed
    /// through unchanged.
    pub fn inject_request_id<F>(&mut self, type_id: i32, addr: Addr, source_id: i32, on_complete: F) -> bool
    where
        F: Fn(&Request) + Send + Sync + 'static,
    {
        if let Some(kind) = OpKind::from_id(type_id) {
            return self.inject_request(kind, addr, source_id, on_complete);
        }
        warn!("external request with unknown operation id {} @ {:#x}", type_id, addr);
        let mut request = Request::raw(addr, type_id);
        request.source_id = source_id;
        self.submit(request.on_complete(Arc::new(on_complete)))
    }

    /// [`Self::inject_compute_request`] for a numeric operation id.  Ids outside the taxonomy are
    /// not compute operations and go out as plain requests with the non-compute bank hint.
    pub fn inject_compute_request_id<F>(&mut self, type_id: i32, addr: Addr, on_complete: F) -> bool
    where
        F: Fn(&Request) + Send + Sync + 'static,
    {
        if let Some(kind) = OpKind::from_id(type_id) {
            return self.inject_compute_request(kind, addr, on_complete);
        }
        warn!("external compute request with unknown operation id {} @ {:#x}", type_id, addr);
        self.submit(Request::raw(addr, type_id).on_complete(Arc::new(on_complete)))
    }

    pub fn stats(&self) -> &InjectStats {
        &self.stats
    }
}
