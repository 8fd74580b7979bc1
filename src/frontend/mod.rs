pub mod replay;
pub mod wrapper;

#[cfg(test)]
mod unit_tests;

pub use replay::{ReplayState, ReplayStats, TraceReplay};
pub use wrapper::{ExternalWrapper, InjectStats};
