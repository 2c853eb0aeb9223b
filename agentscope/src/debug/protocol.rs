//! Debug request/response messages
//!
//! On the wire a message is a flag plus at most one payload field, the flag
//! being advisory. In memory both sides are sum types: a [`DebugResponse`]
//! only exists after [`DebugResponse::for_request`] has checked that the
//! agent answered the question that was asked.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::DebugError;

/// Action selector carried by every debug message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Selector {
    LogLevel,
    DumpProcessCache,
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::LogLevel => "LOG_LEVEL",
            Self::DumpProcessCache => "DUMP_PROCESS_CACHE",
        })
    }
}

/// Arguments of [`DebugRequest::DumpProcessCache`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpProcessCacheArgs {
    /// Ask the agent to leave out entries whose refcnt is zero
    #[serde(default)]
    pub skip_zero_refcnt: bool,
}

/// Agent log severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AgentLogLevel {
    Panic,
    Fatal,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl fmt::Display for AgentLogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Panic => "panic",
            Self::Fatal => "fatal",
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        })
    }
}

/// A debug query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugRequest {
    /// Current agent log level
    LogLevel,
    /// Contents of the agent's process cache
    DumpProcessCache(DumpProcessCacheArgs),
}

impl DebugRequest {
    #[must_use]
    pub fn selector(&self) -> Selector {
        match self {
            Self::LogLevel => Selector::LogLevel,
            Self::DumpProcessCache(_) => Selector::DumpProcessCache,
        }
    }

    #[must_use]
    pub fn to_wire(&self) -> WireRequest {
        match self {
            Self::LogLevel => WireRequest { flag: Selector::LogLevel, dump: None },
            Self::DumpProcessCache(args) => {
                WireRequest { flag: Selector::DumpProcessCache, dump: Some(*args) }
            }
        }
    }
}

/// Request as serialized on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireRequest {
    pub flag: Selector,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dump: Option<DumpProcessCacheArgs>,
}

/// Process list payload; records stay raw until rendered one by one
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessList {
    #[serde(default)]
    pub processes: Vec<serde_json::Value>,
}

/// Response as serialized on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireResponse {
    pub flag: Selector,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<AgentLogLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processes: Option<ProcessList>,
}

/// A validated debug answer
#[derive(Debug, Clone, PartialEq)]
pub enum DebugResponse {
    LogLevel(AgentLogLevel),
    ProcessCache(Vec<serde_json::Value>),
}

impl DebugResponse {
    #[must_use]
    pub fn selector(&self) -> Selector {
        match self {
            Self::LogLevel(_) => Selector::LogLevel,
            Self::ProcessCache(_) => Selector::DumpProcessCache,
        }
    }

    /// Validate `wire` as the answer to `request`.
    ///
    /// Only the payload named by the request's selector is ever read; any
    /// other payload the agent attached is ignored.
    ///
    /// # Errors
    /// [`DebugError::ProtocolMismatch`] when the echoed flag differs from the
    /// request's, [`DebugError::MissingPayload`] when the flag matches but
    /// its payload is absent.
    pub fn for_request(request: &DebugRequest, wire: WireResponse) -> Result<Self, DebugError> {
        let expected = request.selector();
        if wire.flag != expected {
            return Err(DebugError::ProtocolMismatch { expected, actual: wire.flag });
        }

        let missing = || DebugError::MissingPayload { selector: expected };
        match expected {
            Selector::LogLevel => wire.level.map(Self::LogLevel).ok_or_else(missing),
            Selector::DumpProcessCache => {
                wire.processes.map(|list| Self::ProcessCache(list.processes)).ok_or_else(missing)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_wire_format() {
        let req = DebugRequest::DumpProcessCache(DumpProcessCacheArgs { skip_zero_refcnt: true });
        let text = serde_json::to_string(&req.to_wire()).unwrap();
        assert_eq!(text, r#"{"flag":"DUMP_PROCESS_CACHE","dump":{"skip_zero_refcnt":true}}"#);

        let text = serde_json::to_string(&DebugRequest::LogLevel.to_wire()).unwrap();
        assert_eq!(text, r#"{"flag":"LOG_LEVEL"}"#);
    }

    #[test]
    fn test_matching_response() {
        let wire: WireResponse = serde_json::from_value(json!({
            "flag": "DUMP_PROCESS_CACHE",
            "processes": { "processes": [{ "refcnt": 1 }] }
        }))
        .unwrap();
        let req = DebugRequest::DumpProcessCache(DumpProcessCacheArgs::default());
        let resp = DebugResponse::for_request(&req, wire).unwrap();
        assert_eq!(resp, DebugResponse::ProcessCache(vec![json!({ "refcnt": 1 })]));
        assert_eq!(resp.selector(), req.selector());
    }

    #[test]
    fn test_mismatched_flag_never_reads_payload() {
        let wire = WireResponse {
            flag: Selector::LogLevel,
            level: Some(AgentLogLevel::Info),
            processes: Some(ProcessList { processes: vec![json!({ "refcnt": 1 })] }),
        };
        let req = DebugRequest::DumpProcessCache(DumpProcessCacheArgs::default());
        let err = DebugResponse::for_request(&req, wire).unwrap_err();
        assert!(matches!(
            err,
            DebugError::ProtocolMismatch {
                expected: Selector::DumpProcessCache,
                actual: Selector::LogLevel
            }
        ));
    }

    #[test]
    fn test_missing_payload() {
        let wire = WireResponse { flag: Selector::LogLevel, level: None, processes: None };
        let err = DebugResponse::for_request(&DebugRequest::LogLevel, wire).unwrap_err();
        assert!(matches!(err, DebugError::MissingPayload { selector: Selector::LogLevel }));
    }

    #[test]
    fn test_log_level_parses_uppercase() {
        let wire: WireResponse =
            serde_json::from_str(r#"{"flag":"LOG_LEVEL","level":"DEBUG"}"#).unwrap();
        let resp = DebugResponse::for_request(&DebugRequest::LogLevel, wire).unwrap();
        assert_eq!(resp, DebugResponse::LogLevel(AgentLogLevel::Debug));
    }
}
