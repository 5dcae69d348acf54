//! Error types for caffeinate-mcp.
//!
//! # Error Hierarchy
//!
//! ```text
//! CaffeinateError   application errors, rendered as tool results with isError
//! ├── Validation    missing or malformed tool argument
//! ├── NotFound      stop on an id that is not registered
//! ├── Spawn         the OS refused to create the process
//! └── Termination   the OS refused the kill signal
//!
//! ToolError         dispatch faults, rendered as JSON-RPC error objects
//! TransportError    stream failures, fatal for the serve loop
//! ```

use std::io;
use thiserror::Error;

use crate::protocol::JsonRpcError;

/// Result alias for process lifecycle operations.
pub type Result<T, E = CaffeinateError> = std::result::Result<T, E>;

/// Application-level failures of the start/stop/list operations.
///
/// None of these terminate the server; each is reported back to the caller
/// as an error result carrying the `Display` text.
#[derive(Debug, Error)]
pub enum CaffeinateError {
    /// A required argument was missing or had the wrong type.
    #[error("{0}")]
    Validation(String),

    /// No registered process has this id.
    #[error("No caffeinate process found with ID: {0}")]
    NotFound(String),

    /// The external program could not be spawned.
    #[error("Failed to start caffeinate: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The kill signal could not be delivered.
    #[error("Failed to stop caffeinate: {source}")]
    Termination {
        id: String,
        #[source]
        source: io::Error,
    },
}

impl CaffeinateError {
    /// Short machine-friendly name of the error kind, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound(_) => "not_found",
            Self::Spawn { .. } => "spawn_failed",
            Self::Termination { .. } => "termination_failed",
        }
    }
}

/// Faults in tool registration or dispatch.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The requested tool is not registered.
    #[error("Tool not found: {0}")]
    NotFound(String),

    /// A tool with the same name is already registered.
    #[error("Tool already registered: {0}")]
    AlreadyRegistered(String),

    /// The call payload could not be interpreted at all.
    #[error("Invalid tool input: {0}")]
    InvalidInput(String),
}

impl From<ToolError> for JsonRpcError {
    fn from(error: ToolError) -> Self {
        match error {
            ToolError::NotFound(name) => JsonRpcError::tool_not_found(&name),
            ToolError::InvalidInput(details) => JsonRpcError::invalid_params(&details),
            ToolError::AlreadyRegistered(name) => {
                JsonRpcError::internal_error(Some(format!("Tool already registered: {}", name)))
            }
        }
    }
}

/// Transport-layer errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The transport has been closed.
    #[error("Transport closed")]
    Closed,

    /// Reading or writing the underlying stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A message could not be serialized.
    #[error("Invalid message: {0}")]
    InvalidMessage(String),
}
