//! In-memory transport for driving the server in tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

use super::Transport;
use crate::error::TransportError;
use crate::protocol::{JsonRpcRequest, JsonRpcResponse};

/// Queued requests in, captured responses out.
///
/// Clones share state, so a test can keep one clone for inspection while the
/// server consumes the other. `recv()` returns `None` once the queue is empty.
///
/// ```rust
/// use caffeinate_mcp::protocol::{JsonRpcRequest, JsonRpcResponse};
/// use caffeinate_mcp::transport::{MockTransport, Transport};
/// use serde_json::json;
///
/// # #[tokio::main]
/// # async fn main() {
/// let mut transport = MockTransport::new();
/// transport.push_request(JsonRpcRequest::new(Some(json!(1)), "ping", None));
///
/// let request = transport.recv().await.unwrap();
/// transport.send(JsonRpcResponse::success(request.id, json!({}))).await.unwrap();
///
/// assert_eq!(transport.responses().len(), 1);
/// # }
/// ```
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockTransportState>>,
}

#[derive(Default)]
struct MockTransportState {
    requests: VecDeque<JsonRpcRequest>,
    responses: Vec<JsonRpcResponse>,
    closed: bool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_request(&self, request: JsonRpcRequest) {
        self.state.lock().requests.push_back(request);
    }

    pub fn responses(&self) -> Vec<JsonRpcResponse> {
        self.state.lock().responses.clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.lock().requests.len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn recv(&mut self) -> Option<JsonRpcRequest> {
        let mut state = self.state.lock();
        if state.closed {
            return None;
        }
        state.requests.pop_front()
    }

    async fn send(&mut self, response: JsonRpcResponse) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(TransportError::Closed);
        }
        state.responses.push(response);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.state.lock().closed = true;
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}
