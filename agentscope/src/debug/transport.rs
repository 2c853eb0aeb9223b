//! Debug transport
//!
//! [`DebugTransport`] is the seam between the query logic and whatever
//! carries the messages. [`TcpTransport`] speaks newline-delimited JSON: one
//! request line out, one response line back, then the connection closes.

use std::time::Duration;

use log::debug;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::runtime::Runtime;

use crate::config::ClientConfig;
use crate::debug::protocol::{WireRequest, WireResponse};
use crate::domain::TransportError;

/// Synchronous request/response channel to a live agent
pub trait DebugTransport {
    /// Send one request and block until its response arrives.
    ///
    /// # Errors
    /// Any failure to deliver the request or read back a well-formed response.
    fn get_debug(&mut self, request: &WireRequest) -> Result<WireResponse, TransportError>;
}

/// JSON-lines transport over TCP
///
/// Owns a current-thread tokio runtime so callers stay synchronous. Every
/// exchange is bounded by the configured timeout and aborted on Ctrl-C.
pub struct TcpTransport {
    address: String,
    timeout: Option<Duration>,
    runtime: Runtime,
}

impl TcpTransport {
    /// # Errors
    /// Returns an error if the runtime cannot be created
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
        Ok(Self { address: config.address.clone(), timeout: config.timeout, runtime })
    }
}

impl DebugTransport for TcpTransport {
    fn get_debug(&mut self, request: &WireRequest) -> Result<WireResponse, TransportError> {
        let mut line = serde_json::to_vec(request)?;
        line.push(b'\n');

        let address = self.address.as_str();
        let timeout = self.timeout;
        debug!("sending {:?} to {address}", request.flag);

        self.runtime.block_on(async {
            let exchange = exchange(address, &line);
            let bounded = async {
                match timeout {
                    Some(limit) => match tokio::time::timeout(limit, exchange).await {
                        Ok(result) => result,
                        Err(_) => {
                            Err(TransportError::Timeout { address: address.to_string(), timeout: limit })
                        }
                    },
                    None => exchange.await,
                }
            };

            tokio::select! {
                result = bounded => result,
                Ok(()) = tokio::signal::ctrl_c() => Err(TransportError::Cancelled),
            }
        })
    }
}

async fn exchange(address: &str, request: &[u8]) -> Result<WireResponse, TransportError> {
    let stream = TcpStream::connect(address)
        .await
        .map_err(|source| TransportError::Connect { address: address.to_string(), source })?;
    let (reader, mut writer) = stream.into_split();

    writer.write_all(request).await?;
    writer.flush().await?;

    let mut response = String::new();
    if BufReader::new(reader).read_line(&mut response).await? == 0 {
        return Err(TransportError::Closed);
    }
    Ok(serde_json::from_str(response.trim_end())?)
}
