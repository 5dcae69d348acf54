//! # caffeinate-mcp
//!
//! An MCP (Model Context Protocol) server that keeps the host awake by
//! managing `caffeinate` child processes on behalf of a client.
//!
//! Three tools are exposed over line-delimited JSON-RPC on stdio:
//!
//! - `caffeinate_start` - spawn a process with the requested flags
//! - `caffeinate_stop` - terminate a previously started process by id
//! - `caffeinate_list` - list the processes that are still running
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use caffeinate_mcp::{CaffeinateMcpServer, ServerConfig};
//! use caffeinate_mcp::transport::StdioTransport;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let server = CaffeinateMcpServer::new(ServerConfig::default())?;
//!     server.serve(StdioTransport::new()).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`process`]: process registry, lifecycle coordinator and invoker seam
//! - [`tools`]: the three MCP tools and the flag table
//! - [`tool`]: tool trait, results and registry
//! - [`protocol`]: JSON-RPC and MCP message types
//! - [`transport`]: stdio and in-memory transports
//! - [`server`]: request dispatch and the serve loop
//! - [`config`]: server configuration
//! - [`error`]: error types

#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod process;
pub mod protocol;
pub mod server;
pub mod tool;
pub mod tools;
pub mod transport;

pub use config::{ServerConfig, ServerConfigBuilder};
pub use error::{CaffeinateError, ToolError, TransportError};
pub use process::{LifecycleCoordinator, ProcessId, ProcessRegistry};
pub use server::CaffeinateMcpServer;

/// Server name reported during `initialize` and by `--version`.
pub const SERVER_NAME: &str = "caffeinate-mcp";

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Commit the binary was built from, injected at build time.
pub const COMMIT: &str = match option_env!("CAFFEINATE_MCP_COMMIT") {
    Some(commit) => commit,
    None => "none",
};

/// Build date, injected at build time.
pub const BUILD_DATE: &str = match option_env!("CAFFEINATE_MCP_BUILD_DATE") {
    Some(date) => date,
    None => "unknown",
};

/// MCP protocol revision this server speaks.
pub const PROTOCOL_VERSION: &str = "2025-03-26";

/// The line printed by `--version`.
pub fn version_string() -> String {
    format!(
        "{} version {} (commit: {}, built at: {})",
        SERVER_NAME, VERSION, COMMIT, BUILD_DATE
    )
}
