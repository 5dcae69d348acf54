//! JSON-RPC 2.0 request and response envelopes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::JsonRpcError;

const JSONRPC_VERSION: &str = "2.0";

/// A request or, when `id` is absent, a notification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    pub fn new(id: Option<Value>, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method: method.into(),
            params,
        }
    }

    pub fn notification(method: impl Into<String>, params: Option<Value>) -> Self {
        Self::new(None, method, params)
    }

    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// Response to a request; exactly one of `result` and `error` is set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<Value>, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }

    /// Serialize `result` into a success response, or an internal error if
    /// serialization fails.
    pub fn from_serializable<T: Serialize>(id: Option<Value>, result: &T) -> Self {
        match serde_json::to_value(result) {
            Ok(value) => Self::success(id, value),
            Err(e) => Self::error(
                id,
                JsonRpcError::internal_error(Some(format!("Failed to serialize result: {}", e))),
            ),
        }
    }

    pub fn method_not_found(id: Option<Value>, method: &str) -> Self {
        Self::error(id, JsonRpcError::method_not_found(method))
    }

    pub fn invalid_params(id: Option<Value>, details: &str) -> Self {
        Self::error(id, JsonRpcError::invalid_params(details))
    }

    pub fn invalid_request(id: Option<Value>, details: &str) -> Self {
        Self::error(id, JsonRpcError::invalid_request(Some(details.to_string())))
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.result.is_some()
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
