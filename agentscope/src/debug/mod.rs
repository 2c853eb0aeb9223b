//! Live agent debug queries
//!
//! - `protocol`: selector, request/response sum types and their wire form
//! - `transport`: the request/response channel ([`TcpTransport`])
//! - `client`: typed queries that validate each answer against its request
//! - `process`: process cache records and their one-line rendering

pub mod client;
pub mod process;
pub mod protocol;
pub mod transport;

pub use client::DebugClient;
pub use process::{Process, ProcessRecord};
pub use protocol::{
    AgentLogLevel, DebugRequest, DebugResponse, DumpProcessCacheArgs, ProcessList, Selector,
    WireRequest, WireResponse,
};
pub use transport::{DebugTransport, TcpTransport};
