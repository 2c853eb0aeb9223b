//! Process cache records
//!
//! The agent sends each cache entry as a JSON object. Records are decoded and
//! re-rendered one at a time so a single malformed entry costs only itself.
//! Fields without a typed slot are carried in `extra` and printed back.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::RecordError;

/// Process identity and exec details
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Process {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub exec_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tid: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auid: Option<u32>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cwd: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub binary: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub arguments: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub flags: String,
    /// RFC 3339 timestamp as sent by the agent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub parent_exec_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry of the agent's process cache
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process: Option<Process>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refcnt: Option<u32>,
    /// Per-operation refcount deltas (e.g. `"process++": 2`)
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub refcnt_ops: BTreeMap<String, i32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProcessRecord {
    /// Decode one raw record from a process cache payload
    ///
    /// # Errors
    /// Returns [`RecordError::Decode`] if the value is not a process record.
    pub fn from_value(value: &Value) -> Result<Self, RecordError> {
        Self::deserialize(value).map_err(RecordError::Decode)
    }

    /// Reference count; an absent count is zero
    #[must_use]
    pub fn refcnt(&self) -> u32 {
        self.refcnt.unwrap_or(0)
    }

    /// Render as a single line of JSON
    ///
    /// # Errors
    /// Returns [`RecordError::Format`] if serialization fails.
    pub fn to_line(&self) -> Result<String, RecordError> {
        serde_json::to_string(self).map_err(RecordError::Format)
    }
}
