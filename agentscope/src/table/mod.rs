//! Pinned table access
//!
//! A [`TableLayout`] names a table and binds its raw key/value byte arrays to
//! the decoded types from `agentscope-common`. A [`NestedTableLayout`] does
//! the same for a hash of maps, whose values are ids of inner tables. A
//! [`TableSource`] walks a table once, decoding every entry through its
//! layout.

use agentscope_common::{
    execve::{self, ExecveValue},
    namespace,
    policyfilter::{self, PolicyFilterValue},
    CgroupId, DecodeError, FixedLayout, PolicyId, StableId, Tgid,
};
use aya::Pod;

use crate::domain::TableError;

pub mod pinned;

#[cfg(test)]
pub(crate) mod memory;

pub use pinned::PinnedTable;

/// Static description of one table's entry layout
pub trait TableLayout {
    /// File name under the agent's pin directory
    const NAME: &'static str;

    type Key: FixedLayout + Ord;
    type Value: FixedLayout;

    /// Raw key bytes as stored in the table
    type RawKey: Pod + AsRef<[u8]>;
    /// Raw value bytes as stored in the table
    type RawValue: Pod + AsRef<[u8]>;
}

/// Execve tracking table: tgid -> process metadata
pub struct ExecveTable;

impl TableLayout for ExecveTable {
    const NAME: &'static str = execve::MAP_NAME;
    type Key = Tgid;
    type Value = ExecveValue;
    type RawKey = [u8; execve::KEY_SIZE];
    type RawValue = [u8; execve::VALUE_SIZE];
}

/// Static description of a hash of maps
///
/// Outer values are always inner map ids; every inner table shares the
/// `Key`/`Value` layout.
pub trait NestedTableLayout {
    /// File name under the agent's pin directory
    const NAME: &'static str;

    type OuterKey: FixedLayout + Ord + Copy;
    type RawOuterKey: Pod + AsRef<[u8]>;

    type Key: FixedLayout + Ord;
    type Value: FixedLayout;
    type RawKey: Pod + AsRef<[u8]>;
    type RawValue: Pod + AsRef<[u8]>;
}

/// Policy filter table: policy id -> inner table of member cgroups
pub struct PolicyFilterTable;

impl NestedTableLayout for PolicyFilterTable {
    const NAME: &'static str = policyfilter::MAP_NAME;
    type OuterKey = PolicyId;
    type RawOuterKey = [u8; policyfilter::OUTER_KEY_SIZE];
    type Key = CgroupId;
    type Value = PolicyFilterValue;
    type RawKey = [u8; policyfilter::INNER_KEY_SIZE];
    type RawValue = [u8; policyfilter::INNER_VALUE_SIZE];
}

/// Namespace table: cgroup id -> stable id
pub struct NamespaceTable;

impl TableLayout for NamespaceTable {
    const NAME: &'static str = namespace::MAP_NAME;
    type Key = CgroupId;
    type Value = StableId;
    type RawKey = [u8; namespace::KEY_SIZE];
    type RawValue = [u8; namespace::VALUE_SIZE];
}

/// A table that can be walked exactly once
///
/// `scan` consumes the source: a second pass needs a fresh open. The order
/// of visited entries is whatever the backend yields.
pub trait TableSource {
    /// Visit every entry, returning how many were visited.
    ///
    /// # Errors
    /// [`TableError::IterationFailed`] if the backend fails mid-scan,
    /// [`TableError::Decode`] for an entry that does not fit `L`. Entries
    /// visited before the failure must be treated as incomplete.
    fn scan<L, F>(self, visit: F) -> Result<usize, TableError>
    where
        L: TableLayout,
        F: FnMut(L::Key, L::Value);

    /// Visit every outer entry of a hash of maps together with the decoded
    /// contents of its inner table, returning how many outer entries were
    /// visited.
    ///
    /// # Errors
    /// As for [`TableSource::scan`]. An inner table that cannot be opened or
    /// walked is [`TableError::IterationFailed`].
    fn scan_nested<L, F>(self, visit: F) -> Result<usize, TableError>
    where
        L: NestedTableLayout,
        F: FnMut(L::OuterKey, Vec<(L::Key, L::Value)>);
}

/// Decode one raw entry through layout `L`
pub(crate) fn decode_entry<L: TableLayout>(
    raw_key: &[u8],
    raw_value: &[u8],
) -> Result<(L::Key, L::Value), DecodeError> {
    Ok((L::Key::decode(raw_key)?, L::Value::decode(raw_value)?))
}

/// Decode one raw inner-table entry through nested layout `L`
pub(crate) fn decode_inner_entry<L: NestedTableLayout>(
    raw_key: &[u8],
    raw_value: &[u8],
) -> Result<(L::Key, L::Value), DecodeError> {
    Ok((L::Key::decode(raw_key)?, L::Value::decode(raw_value)?))
}
