//! Line-delimited JSON transport.
//!
//! One JSON-RPC message per line in each direction. EOF on the input closes
//! the transport. A line that is not a valid request is answered with a
//! JSON-RPC error on the spot, unless it looks like a notification, in which
//! case it is logged and skipped.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::io::{
    AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout, stdin,
    stdout,
};
use tracing::{debug, error, warn};

use super::Transport;
use crate::error::TransportError;
use crate::protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};

/// Reads requests from `R`, writes responses to `W`.
///
/// Defaults to the process stdin/stdout. Nothing else may write to stdout
/// while this transport is in use.
pub struct StdioTransport<R = Stdin, W = Stdout> {
    reader: BufReader<R>,
    writer: W,
    closed: Arc<AtomicBool>,
}

impl StdioTransport {
    pub fn new() -> Self {
        Self::with_streams(stdin(), stdout())
    }
}

impl Default for StdioTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, W> StdioTransport<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn with_streams(reader: R, writer: W) -> Self {
        Self {
            reader: BufReader::new(reader),
            writer,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl<R, W> StdioTransport<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn write_response(&mut self, response: &JsonRpcResponse) -> Result<(), TransportError> {
        let mut json = serde_json::to_string(response)
            .map_err(|e| TransportError::InvalidMessage(e.to_string()))?;
        json.push('\n');

        self.writer.write_all(json.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }
}

/// Error response for a line that is not a valid request.
///
/// Invalid JSON gets a parse error with a null id. Valid JSON that carries
/// an id gets an invalid-request error echoing it. Objects without an id are
/// treated as broken notifications and get no answer.
fn reject(line: &str) -> Option<JsonRpcResponse> {
    let value = match serde_json::from_str::<Value>(line) {
        Ok(value) => value,
        Err(e) => {
            return Some(JsonRpcResponse::error(
                None,
                JsonRpcError::parse_error(Some(e.to_string())),
            ));
        }
    };

    match value {
        Value::Object(object) => match object.get("id") {
            Some(id) if !id.is_null() => Some(JsonRpcResponse::invalid_request(
                Some(id.clone()),
                "not a JSON-RPC 2.0 request",
            )),
            _ => None,
        },
        _ => Some(JsonRpcResponse::invalid_request(
            None,
            "expected a JSON object",
        )),
    }
}

#[async_trait]
impl<R, W> Transport for StdioTransport<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn recv(&mut self) -> Option<JsonRpcRequest> {
        let mut line = String::new();

        loop {
            if self.closed.load(Ordering::SeqCst) {
                return None;
            }

            line.clear();
            match self.reader.read_line(&mut line).await {
                Ok(0) => {
                    debug!("input closed");
                    self.closed.store(true, Ordering::SeqCst);
                    return None;
                }
                Ok(_) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    let rejection = match serde_json::from_str::<JsonRpcRequest>(trimmed) {
                        Ok(request) => return Some(request),
                        Err(e) => {
                            warn!(error = %e, line = trimmed, "malformed message");
                            reject(trimmed)
                        }
                    };
                    if let Some(response) = rejection {
                        if let Err(e) = self.write_response(&response).await {
                            error!(error = %e, "failed to answer malformed message");
                            self.closed.store(true, Ordering::SeqCst);
                            return None;
                        }
                    }
                }
                Err(e) => {
                    error!(error = %e, "failed to read from input");
                    self.closed.store(true, Ordering::SeqCst);
                    return None;
                }
            }
        }
    }

    async fn send(&mut self, response: JsonRpcResponse) -> Result<(), TransportError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(TransportError::Closed);
        }

        self.write_response(&response).await
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.closed.store(true, Ordering::SeqCst);
        self.writer.flush().await?;
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
