//! JSON-RPC 2.0 error objects and the codes this server emits.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Standard JSON-RPC 2.0 error codes.
pub mod codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
}

/// MCP server-range error codes.
pub mod mcp_codes {
    /// Requested tool does not exist.
    pub const TOOL_NOT_FOUND: i32 = -32004;
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    pub fn new(code: i32, message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            code,
            message: message.into(),
            data,
        }
    }

    pub fn parse_error(details: Option<String>) -> Self {
        Self::new(codes::PARSE_ERROR, "Parse error", details.map(Value::String))
    }

    pub fn invalid_request(details: Option<String>) -> Self {
        Self::new(codes::INVALID_REQUEST, "Invalid Request", details.map(Value::String))
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(
            codes::METHOD_NOT_FOUND,
            "Method not found",
            Some(Value::String(method.to_string())),
        )
    }

    pub fn invalid_params(details: &str) -> Self {
        Self::new(
            codes::INVALID_PARAMS,
            "Invalid params",
            Some(Value::String(details.to_string())),
        )
    }

    pub fn internal_error(details: Option<String>) -> Self {
        Self::new(codes::INTERNAL_ERROR, "Internal error", details.map(Value::String))
    }

    pub fn tool_not_found(name: &str) -> Self {
        Self::new(
            mcp_codes::TOOL_NOT_FOUND,
            format!("Tool not found: {}", name),
            None,
        )
    }
}

impl std::fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}
