//! # Pinned Table Layouts (agent ↔ inspector)
//!
//! Fixed key/value layouts of the persistent tables a tracing agent pins
//! under bpffs, and the codecs that turn their raw bytes into typed records.
//!
//! Every layout is decoded explicitly from a byte slice with its length
//! checked first. Nothing here overlays a struct onto raw table memory, so a
//! table whose entry size disagrees with the layout yields a [`DecodeError`]
//! instead of garbage.
//!
//! ## Tables
//!
//! - [`execve`] - per-process exec metadata, keyed by [`Tgid`]
//! - [`policyfilter`] - which cgroups each policy applies to (hash of maps)
//! - [`namespace`] - cgroup id to stable id mapping
//!
//! All integers use native byte order: the tables live in the same kernel
//! the inspector runs on.

#![no_std]

use core::fmt;

pub mod execve;
pub mod namespace;
pub mod policyfilter;

// ============================================================================
// Codec Trait
// ============================================================================

/// A record with a fixed, externally defined byte layout.
pub trait FixedLayout: Sized {
    /// Layout name used in decode errors
    const LAYOUT: &'static str;

    /// Exact encoded size in bytes
    const SIZE: usize;

    /// Encoded form, always `[u8; SIZE]`
    type Bytes: AsRef<[u8]>;

    fn encode(&self) -> Self::Bytes;

    /// Decode from a raw buffer of exactly [`Self::SIZE`] bytes.
    ///
    /// # Errors
    /// Returns [`DecodeError::Length`] when `raw` has the wrong size, or
    /// [`DecodeError::InvalidField`] when a field is out of range.
    fn decode(raw: &[u8]) -> Result<Self, DecodeError>;

    /// Reject buffers whose length differs from [`Self::SIZE`].
    ///
    /// # Errors
    /// Returns [`DecodeError::Length`] on mismatch.
    fn check_size(raw: &[u8]) -> Result<(), DecodeError> {
        if raw.len() == Self::SIZE {
            Ok(())
        } else {
            Err(DecodeError::Length { layout: Self::LAYOUT, expected: Self::SIZE, actual: raw.len() })
        }
    }
}

/// Failure to decode a raw table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("{layout}: expected {expected} bytes, got {actual}")]
    Length { layout: &'static str, expected: usize, actual: usize },

    #[error("{layout}: field {field} has invalid value {value}")]
    InvalidField { layout: &'static str, field: &'static str, value: i64 },
}

// ============================================================================
// Identifiers
// ============================================================================

/// Thread-group id (the kernel's view of a process id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tgid(pub u32);

/// Tracing policy identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PolicyId(pub u32);

/// Kernel-assigned control group id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CgroupId(pub u64);

/// Agent-assigned id that survives cgroup churn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StableId(pub u64);

/// Kernel id of a BPF map, as stored in a hash-of-maps value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MapId(pub u32);

macro_rules! scalar_id {
    ($name:ident, $int:ty, $layout:literal) => {
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FixedLayout for $name {
            const LAYOUT: &'static str = $layout;
            const SIZE: usize = core::mem::size_of::<$int>();
            type Bytes = [u8; core::mem::size_of::<$int>()];

            fn encode(&self) -> Self::Bytes {
                self.0.to_ne_bytes()
            }

            fn decode(raw: &[u8]) -> Result<Self, DecodeError> {
                Self::check_size(raw)?;
                let mut bytes = [0u8; core::mem::size_of::<$int>()];
                bytes.copy_from_slice(raw);
                Ok(Self(<$int>::from_ne_bytes(bytes)))
            }
        }
    };
}

scalar_id!(Tgid, u32, "tgid");
scalar_id!(PolicyId, u32, "policy_id");
scalar_id!(CgroupId, u64, "cgroup_id");
scalar_id!(StableId, u64, "stable_id");
scalar_id!(MapId, u32, "map_id");

// ============================================================================
// Byte Helpers
// ============================================================================
//
// Callers check the buffer length before reading, so offsets are in bounds.

pub(crate) fn u32_at(raw: &[u8], at: usize) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&raw[at..at + 4]);
    u32::from_ne_bytes(bytes)
}

pub(crate) fn i32_at(raw: &[u8], at: usize) -> i32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&raw[at..at + 4]);
    i32::from_ne_bytes(bytes)
}

pub(crate) fn u64_at(raw: &[u8], at: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&raw[at..at + 8]);
    u64::from_ne_bytes(bytes)
}

pub(crate) fn put(buf: &mut [u8], at: usize, bytes: &[u8]) {
    buf[at..at + bytes.len()].copy_from_slice(bytes);
}
