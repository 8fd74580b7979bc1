use std::collections::vec_deque;
use std::collections::VecDeque;

use crate::aim::request::Request;

pub const DEFAULT_CAPACITY: usize = 16384;

/// Bounded FIFO of requests owned by the memory system.  Enqueue past capacity is refused; the
/// buffer never grows beyond `max_size`.
#[derive(Debug)]
pub struct ReqBuffer {
    buffer: VecDeque<Request>,
    max_size: usize,
}

impl Default for ReqBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ReqBuffer {
    pub fn new(max_size: usize) -> Self {
        assert!(max_size > 0, "request buffer capacity must be > 0");
        Self {
            buffer: VecDeque::new(),
            max_size,
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max_size
    }

    pub fn free_slots(&self) -> usize {
        self.max_size - self.buffer.len()
    }

    pub fn is_full(&self) -> bool {
        self.free_slots() == 0
    }

    pub fn enqueue(&mut self, request: Request) -> bool {
        if self.is_full() {
            return false;
        }
        self.buffer.push_back(request);
        true
    }

    /// All-or-nothing enqueue: either every request fits and is appended in order, or the
    /// buffer is left untouched.
    pub fn enqueue_all(&mut self, requests: Vec<Request>) -> bool {
        if requests.len() > self.free_slots() {
            return false;
        }
        self.buffer.extend(requests);
        true
    }

    pub fn front(&self) -> Option<&Request> {
        self.buffer.front()
    }

    pub fn dequeue(&mut self) -> Option<Request> {
        self.buffer.pop_front()
    }

    pub fn remove(&mut self, index: usize) -> Option<Request> {
        self.buffer.remove(index)
    }

    pub fn iter(&self) -> vec_deque::Iter<'_, Request> {
        self.buffer.iter()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl<'a> IntoIterator for &'a ReqBuffer {
    type Item = &'a Request;
    type IntoIter = vec_deque::Iter<'a, Request>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
