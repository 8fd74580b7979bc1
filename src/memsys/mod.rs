pub mod fifo_mem;
pub mod req_buffer;

pub use fifo_mem::{FifoMemorySystem, MemStats};
pub use req_buffer::ReqBuffer;

use crate::aim::request::Request;

/// Downstream side of the frontend.  Submission never blocks: the memory system either takes
/// ownership of the request(s) and returns true, or refuses and returns false.
pub trait MemorySystem {
    fn send(&mut self, request: Request) -> bool;

    /// Atomic submission: all requests are accepted, or none are.
    fn send_batch(&mut self, requests: Vec<Request>) -> bool;
}
