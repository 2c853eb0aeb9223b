//! Domain model for agentscope
//!
//! Identifier newtypes come from the shared layout crate so the codecs and
//! the dump logic agree on them. Errors live here:
//! - Table access and decoding
//! - Debug protocol and transport
//! - Per-record formatting

pub mod errors;

// Re-export common types for convenience
pub use agentscope_common::{CgroupId, PolicyId, StableId, Tgid};

pub use errors::{BoxError, DebugError, DumpError, RecordError, TableError, TransportError};
