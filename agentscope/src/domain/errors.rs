//! Structured error types for agentscope
//!
//! Using thiserror for automatic Display implementation and error chaining.
//! Only `main` decides whether an error terminates the process.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use agentscope_common::DecodeError;
use thiserror::Error;

use crate::debug::Selector;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure to open or read a pinned table
#[derive(Error, Debug)]
pub enum TableError {
    #[error("Table {} not found", path.display())]
    NotFound { path: PathBuf },

    #[error("Permission denied opening table {}", path.display())]
    Permission {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to open table {}: {source}", path.display())]
    Backend {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    #[error("Error iterating table {}: {source}", path.display())]
    IterationFailed {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    #[error("Malformed entry in table {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },
}

impl TableError {
    /// Classify an `io::Error` raised while opening `path`
    pub fn from_open(path: impl Into<PathBuf>, err: io::Error) -> Self {
        let path = path.into();
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound { path },
            io::ErrorKind::PermissionDenied => Self::Permission { path, source: err },
            _ => Self::Backend { path, source: Box::new(err) },
        }
    }
}

/// Failure to exchange a debug message with the agent
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Failed to connect to {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("Request to {address} timed out after {}s", timeout.as_secs())]
    Timeout { address: String, timeout: Duration },

    #[error("Request cancelled")]
    Cancelled,

    #[error("Agent closed the connection without responding")]
    Closed,

    #[error("Malformed debug message: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Debug query failure
#[derive(Error, Debug)]
pub enum DebugError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Unexpected response flag {actual} (requested {expected})")]
    ProtocolMismatch { expected: Selector, actual: Selector },

    #[error("Response for {selector} carries no payload")]
    MissingPayload { selector: Selector },
}

impl DebugError {
    /// True for responses that disagree with their request
    pub fn is_protocol(&self) -> bool {
        matches!(self, Self::ProtocolMismatch { .. } | Self::MissingPayload { .. })
    }
}

/// A single process record that could not be rendered
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("Failed to decode process record: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Failed to format process record: {0}")]
    Format(#[source] serde_json::Error),
}

/// Failure of a whole dump operation
#[derive(Error, Debug)]
pub enum DumpError {
    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Debug(#[from] DebugError),

    #[error("Failed to write output: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = TableError::NotFound { path: PathBuf::from("/sys/fs/bpf/tetragon/execve_map") };
        assert_eq!(err.to_string(), "Table /sys/fs/bpf/tetragon/execve_map not found");
    }

    #[test]
    fn test_from_open_classifies_errno() {
        let err = TableError::from_open("/x", io::Error::from_raw_os_error(libc::ENOENT));
        assert!(matches!(err, TableError::NotFound { .. }));

        let err = TableError::from_open("/x", io::Error::from_raw_os_error(libc::EACCES));
        assert!(matches!(err, TableError::Permission { .. }));
        assert!(err.to_string().to_lowercase().contains("permission denied"));

        let err = TableError::from_open("/x", io::Error::from_raw_os_error(libc::EINVAL));
        assert!(matches!(err, TableError::Backend { .. }));
    }

    #[test]
    fn test_protocol_mismatch_display() {
        let err = DebugError::ProtocolMismatch {
            expected: Selector::DumpProcessCache,
            actual: Selector::LogLevel,
        };
        assert!(err.is_protocol());
        assert!(err.to_string().contains("LOG_LEVEL"));
        assert!(err.to_string().contains("DUMP_PROCESS_CACHE"));
    }
}
