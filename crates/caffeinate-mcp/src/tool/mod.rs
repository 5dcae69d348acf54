//! Tool abstraction for the MCP server.
//!
//! - [`Tool`]: the trait every tool implements
//! - [`ToolRegistry`]: name-indexed set of tools, in registration order
//! - [`ToolResult`]: text segments plus an error flag
//! - [`CallArguments`]: lenient access to call arguments
//!
//! # Defining a Tool
//!
//! ```
//! use caffeinate_mcp::tool::{CallArguments, Tool, ToolContext, ToolResult};
//! use caffeinate_mcp::error::ToolError;
//! use async_trait::async_trait;
//! use serde::Deserialize;
//! use serde_json::{json, Value};
//!
//! #[derive(Deserialize)]
//! struct EchoInput {
//!     message: String,
//! }
//!
//! struct EchoTool;
//!
//! #[async_trait]
//! impl Tool for EchoTool {
//!     fn name(&self) -> &str {
//!         "echo"
//!     }
//!
//!     fn input_schema(&self) -> Value {
//!         json!({"type": "object", "properties": {"message": {"type": "string"}}})
//!     }
//!
//!     async fn execute(
//!         &self,
//!         arguments: CallArguments,
//!         _context: &ToolContext,
//!     ) -> Result<ToolResult, ToolError> {
//!         match arguments.parse::<EchoInput>() {
//!             Ok(input) => Ok(ToolResult::success_text(input.message)),
//!             Err(e) => Ok(ToolResult::error(e.to_string())),
//!         }
//!     }
//! }
//! ```

pub mod arguments;
pub mod registry;
pub mod result;

pub use arguments::CallArguments;
pub use registry::ToolRegistry;
pub use result::{ToolContent, ToolResult};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ToolError;

/// A callable MCP tool.
///
/// Return `Ok(ToolResult::error(..))` for failures the caller should see;
/// `Err` is reserved for faults that must surface as JSON-RPC errors.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> Option<&str> {
        None
    }

    /// JSON Schema of the `arguments` object.
    fn input_schema(&self) -> Value;

    async fn execute(
        &self,
        arguments: CallArguments,
        context: &ToolContext,
    ) -> Result<ToolResult, ToolError>;
}

/// Per-call context handed to [`Tool::execute`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolContext {
    /// JSON-RPC id of the `tools/call` request.
    pub request_id: Option<Value>,
}

impl ToolContext {
    pub fn new(request_id: Option<Value>) -> Self {
        Self { request_id }
    }
}
