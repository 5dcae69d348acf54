//! Transports carrying JSON-RPC messages between client and server.
//!
//! - [`StdioTransport`]: line-delimited JSON over stdin/stdout, or over any
//!   pair of async streams
//! - [`MockTransport`]: in-memory queues for tests

pub mod mock;
pub mod stdio;

pub use mock::MockTransport;
pub use stdio::StdioTransport;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::protocol::{JsonRpcRequest, JsonRpcResponse};

/// Bidirectional message channel used by the serve loop.
///
/// After `close()`, `recv()` returns `None` and `send()` fails with
/// [`TransportError::Closed`]. Closing twice is fine.
#[async_trait]
pub trait Transport: Send {
    /// Next request, or `None` once the peer has gone away.
    async fn recv(&mut self) -> Option<JsonRpcRequest>;

    async fn send(&mut self, response: JsonRpcResponse) -> Result<(), TransportError>;

    async fn close(&mut self) -> Result<(), TransportError>;

    fn is_closed(&self) -> bool;
}
