pub mod addr_mapper;
pub mod error;
pub mod expand;
pub mod request;
pub mod taxonomy;
pub mod trace;

#[cfg(test)]
mod unit_tests;

pub use addr_mapper::{AddressTranslator, LinearMapper, OrgConfig};
pub use error::{ConfigError, LineError};
pub use expand::expand;
pub use request::{AddrHierarchy, Callback, Clk, Payload, Request};
pub use taxonomy::{classify, Addr, BankClass, OpKind, UnknownOperation};
pub use trace::{load_trace, parse_line, parse_trace, BankSelect, Trace, TraceFields};
