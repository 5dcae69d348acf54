//! MCP protocol types.
//!
//! The subset of JSON-RPC 2.0 and MCP 2025-03-26 needed by a tools-only
//! server:
//!
//! - [`message`]: request/response envelopes
//! - [`error`]: error objects and codes
//! - [`types`]: `initialize`, `tools/list` and `tools/call` payloads

pub mod error;
pub mod message;
pub mod types;

pub use error::{codes, mcp_codes, JsonRpcError};
pub use message::{JsonRpcRequest, JsonRpcResponse};
pub use types::{
    CallToolParams, Implementation, InitializeParams, InitializeResult, ListToolsResult,
    ServerCapabilities, ToolDefinition, ToolsCapability,
};
