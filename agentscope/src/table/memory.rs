//! In-memory table source for tests
//!
//! Holds raw byte entries and runs them through the real codecs, optionally
//! failing partway through like a backend error mid-scan. Nested tables hold
//! their inner tables directly in place of map ids.

use std::io;
use std::path::PathBuf;

use agentscope_common::FixedLayout;

use crate::domain::TableError;
use crate::table::{decode_entry, decode_inner_entry, NestedTableLayout, TableLayout, TableSource};

#[derive(Default)]
pub(crate) struct MemoryTable {
    entries: Vec<(Vec<u8>, Vec<u8>)>,
    inner: Vec<(Vec<u8>, MemoryTable)>,
    fail_after: Option<usize>,
}

impl MemoryTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Add an encoded entry
    pub(crate) fn with<K: FixedLayout, V: FixedLayout>(mut self, key: &K, value: &V) -> Self {
        self.entries.push((key.encode().as_ref().to_vec(), value.encode().as_ref().to_vec()));
        self
    }

    /// Add an entry from raw bytes
    pub(crate) fn with_raw(mut self, key: &[u8], value: &[u8]) -> Self {
        self.entries.push((key.to_vec(), value.to_vec()));
        self
    }

    /// Add an outer entry pointing at `table`
    pub(crate) fn with_inner<K: FixedLayout>(mut self, key: &K, table: MemoryTable) -> Self {
        self.inner.push((key.encode().as_ref().to_vec(), table));
        self
    }

    /// Fail with a backend error after yielding `n` entries
    pub(crate) fn failing_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }

    fn path() -> PathBuf {
        PathBuf::from("memory")
    }

    fn failure() -> TableError {
        TableError::IterationFailed {
            path: Self::path(),
            source: Box::new(io::Error::from_raw_os_error(libc::EIO)),
        }
    }

    /// Run the injected failure, if any, at position `i` of `len`
    fn check_failure(&self, i: usize, len: usize) -> Result<(), TableError> {
        match self.fail_after {
            Some(n) if n == i || (i == len && n >= len) => Err(Self::failure()),
            _ => Ok(()),
        }
    }
}

impl TableSource for MemoryTable {
    fn scan<L, F>(self, mut visit: F) -> Result<usize, TableError>
    where
        L: TableLayout,
        F: FnMut(L::Key, L::Value),
    {
        let len = self.entries.len();
        for (i, (raw_key, raw_value)) in self.entries.iter().enumerate() {
            self.check_failure(i, len)?;
            let (key, value) = decode_entry::<L>(raw_key, raw_value)
                .map_err(|source| TableError::Decode { path: Self::path(), source })?;
            visit(key, value);
        }
        self.check_failure(len, len)?;
        Ok(len)
    }

    fn scan_nested<L, F>(self, mut visit: F) -> Result<usize, TableError>
    where
        L: NestedTableLayout,
        F: FnMut(L::OuterKey, Vec<(L::Key, L::Value)>),
    {
        let decode_failed = |source| TableError::Decode { path: Self::path(), source };

        let len = self.inner.len();
        for (i, (raw_key, table)) in self.inner.iter().enumerate() {
            self.check_failure(i, len)?;
            let outer_key = L::OuterKey::decode(raw_key).map_err(decode_failed)?;

            let inner_len = table.entries.len();
            let mut entries = Vec::with_capacity(inner_len);
            for (j, (raw_key, raw_value)) in table.entries.iter().enumerate() {
                table.check_failure(j, inner_len)?;
                entries.push(decode_inner_entry::<L>(raw_key, raw_value).map_err(decode_failed)?);
            }
            table.check_failure(inner_len, inner_len)?;

            visit(outer_key, entries);
        }
        self.check_failure(len, len)?;
        Ok(len)
    }
}
