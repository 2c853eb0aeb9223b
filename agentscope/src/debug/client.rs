//! Debug query client

use crate::debug::protocol::{
    AgentLogLevel, DebugRequest, DebugResponse, DumpProcessCacheArgs, Selector,
};
use crate::debug::transport::DebugTransport;
use crate::domain::DebugError;

/// Issues typed debug queries over a [`DebugTransport`]
pub struct DebugClient<T> {
    transport: T,
}

impl<T: DebugTransport> DebugClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// One round trip: send `request`, validate the answer against it.
    ///
    /// # Errors
    /// Transport failures, or a response whose flag or payload does not
    /// correspond to the request.
    pub fn get_debug(&mut self, request: &DebugRequest) -> Result<DebugResponse, DebugError> {
        let wire = self.transport.get_debug(&request.to_wire())?;
        DebugResponse::for_request(request, wire)
    }

    /// Raw process cache records
    ///
    /// # Errors
    /// See [`DebugClient::get_debug`].
    pub fn process_cache(
        &mut self,
        args: DumpProcessCacheArgs,
    ) -> Result<Vec<serde_json::Value>, DebugError> {
        match self.get_debug(&DebugRequest::DumpProcessCache(args))? {
            DebugResponse::ProcessCache(records) => Ok(records),
            other => Err(DebugError::ProtocolMismatch {
                expected: Selector::DumpProcessCache,
                actual: other.selector(),
            }),
        }
    }

    /// The agent's current log level
    ///
    /// # Errors
    /// See [`DebugClient::get_debug`].
    pub fn log_level(&mut self) -> Result<AgentLogLevel, DebugError> {
        match self.get_debug(&DebugRequest::LogLevel)? {
            DebugResponse::LogLevel(level) => Ok(level),
            other => Err(DebugError::ProtocolMismatch {
                expected: Selector::LogLevel,
                actual: other.selector(),
            }),
        }
    }
}
