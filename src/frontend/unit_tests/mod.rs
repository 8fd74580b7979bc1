use std::collections::VecDeque;
use std::sync::{Arc, RwLock};

use crate::aim::request::Request;
use crate::memsys::MemorySystem;


/// One submission seen by [`ScriptedMemory`].
#[derive(Debug, Clone)]
pub struct Attempt {
    pub batch: bool,
    pub requests: Vec<Request>,
    pub accepted: bool,
}

/// Memory system that answers from a script of verdicts (accepting once the script runs out)
/// and records every submission.
#[derive(Debug, Default)]
pub struct ScriptedMemory {
    pub verdicts: VecDeque<bool>,
    pub attempts: Vec<Attempt>,
}

impl ScriptedMemory {
    pub fn shared(verdicts: &[bool]) -> Arc<RwLock<Self>> {
        Arc::new(RwLock::new(Self {
            verdicts: verdicts.iter().copied().collect(),
            attempts: Vec::new(),
        }))
    }

    pub fn accepted(&self) -> impl Iterator<Item = &Attempt> {
        self.attempts.iter().filter(|a| a.accepted)
    }

    fn answer(&mut self, batch: bool, requests: Vec<Request>) -> bool {
        let accepted = self.verdicts.pop_front().unwrap_or(true);
        self.attempts.push(Attempt { batch, requests, accepted });
        accepted
    }
}

impl MemorySystem for ScriptedMemory {
    fn send(&mut self, request: Request) -> bool {
        self.answer(false, vec![request])
    }

    fn send_batch(&mut self, requests: Vec<Request>) -> bool {
        self.answer(true, requests)
    }
}
