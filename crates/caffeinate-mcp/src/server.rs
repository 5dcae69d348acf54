//! The MCP server: request dispatch and the serve loop.
//!
//! Supported methods:
//!
//! - `initialize` - handshake, reports server info and the tools capability
//! - `ping` - liveness check, empty result
//! - `tools/list` - the three caffeinate tools with their input schemas
//! - `tools/call` - run a tool by name
//!
//! Notifications (requests without an id) are accepted and never answered.

use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::config::ServerConfig;
use crate::error::{ToolError, TransportError};
use crate::process::{LifecycleCoordinator, ProcessInvoker, SystemInvoker};
use crate::protocol::{
    CallToolParams, Implementation, InitializeParams, InitializeResult, JsonRpcRequest,
    JsonRpcResponse, ListToolsResult, ServerCapabilities,
};
use crate::tool::{CallArguments, ToolContext, ToolRegistry};
use crate::tools::register_caffeinate_tools;
use crate::transport::Transport;

/// MCP server exposing the caffeinate tools.
///
/// # Examples
///
/// ```rust
/// use caffeinate_mcp::{CaffeinateMcpServer, ServerConfig};
/// use caffeinate_mcp::process::MockInvoker;
/// use caffeinate_mcp::protocol::JsonRpcRequest;
/// use serde_json::json;
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let server = CaffeinateMcpServer::with_invoker(
///     ServerConfig::default(),
///     Arc::new(MockInvoker::new()),
/// )?;
///
/// let request = JsonRpcRequest::new(Some(json!(1)), "tools/list", None);
/// let response = server.handle_request(request).await.unwrap();
/// assert!(response.is_success());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct CaffeinateMcpServer {
    config: ServerConfig,
    tools: ToolRegistry,
    coordinator: Arc<LifecycleCoordinator>,
}

impl CaffeinateMcpServer {
    /// Server that spawns the configured program for real.
    pub fn new(config: ServerConfig) -> Result<Self, ToolError> {
        Self::with_invoker(config, Arc::new(SystemInvoker::new()))
    }

    pub fn with_invoker(
        config: ServerConfig,
        invoker: Arc<dyn ProcessInvoker>,
    ) -> Result<Self, ToolError> {
        let coordinator = Arc::new(LifecycleCoordinator::new(config.program(), invoker));

        let mut tools = ToolRegistry::new();
        register_caffeinate_tools(&mut tools, Arc::clone(&coordinator))?;

        Ok(Self {
            config,
            tools,
            coordinator,
        })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn coordinator(&self) -> &Arc<LifecycleCoordinator> {
        &self.coordinator
    }

    /// Handle one message. Returns `None` for notifications.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            debug!(method = %request.method, "notification");
            return None;
        }

        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::invalid_request(
                request.id,
                "jsonrpc must be \"2.0\"",
            ));
        }

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(request),
            "ping" => JsonRpcResponse::success(request.id, json!({})),
            "tools/list" => self.handle_tools_list(request),
            "tools/call" => self.handle_tools_call(request).await,
            method => {
                debug!(method, "unknown method");
                JsonRpcResponse::method_not_found(request.id, method)
            }
        };
        Some(response)
    }

    fn handle_initialize(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let params = match request.params {
            Some(params) => match serde_json::from_value::<InitializeParams>(params) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::invalid_params(
                        request.id,
                        &format!("Invalid initialize params: {}", e),
                    );
                }
            },
            None => {
                return JsonRpcResponse::invalid_params(
                    request.id,
                    "Initialize params are required",
                );
            }
        };

        info!(
            client = %params.client_info.name,
            client_version = %params.client_info.version,
            protocol_version = %params.protocol_version,
            "client connected"
        );

        let result = InitializeResult {
            protocol_version: self.config.protocol_version().to_string(),
            capabilities: ServerCapabilities::tools_only(),
            server_info: Implementation {
                name: self.config.name().to_string(),
                version: self.config.version().to_string(),
            },
        };
        JsonRpcResponse::from_serializable(request.id, &result)
    }

    fn handle_tools_list(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let result = ListToolsResult {
            tools: self.tools.definitions(),
        };
        JsonRpcResponse::from_serializable(request.id, &result)
    }

    #[instrument(skip_all, fields(id = ?request.id))]
    async fn handle_tools_call(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let params = match request.params {
            Some(params) => match serde_json::from_value::<CallToolParams>(params) {
                Ok(params) => params,
                Err(e) => {
                    let error = ToolError::InvalidInput(format!("Invalid tool call params: {}", e));
                    return JsonRpcResponse::error(request.id, error.into());
                }
            },
            None => {
                let error = ToolError::InvalidInput("Tool call params are required".to_string());
                return JsonRpcResponse::error(request.id, error.into());
            }
        };

        let Some(tool) = self.tools.get(&params.name) else {
            warn!(tool = %params.name, "unknown tool");
            return JsonRpcResponse::error(request.id, ToolError::NotFound(params.name).into());
        };

        let arguments = CallArguments::new(params.arguments.unwrap_or_default());
        let context = ToolContext::new(request.id.clone());

        match tool.execute(arguments, &context).await {
            Ok(result) => {
                debug!(tool = %params.name, is_error = result.is_error(), "tool finished");
                JsonRpcResponse::from_serializable(request.id, &result)
            }
            Err(e) => {
                warn!(tool = %params.name, error = %e, "tool failed");
                JsonRpcResponse::error(request.id, e.into())
            }
        }
    }

    /// Serve requests from `transport` until it closes, then terminate every
    /// process still running.
    ///
    /// Requests are handled one at a time, in arrival order.
    pub async fn serve<T: Transport>(&self, mut transport: T) -> Result<(), TransportError> {
        info!(
            name = %self.config.name(),
            version = %self.config.version(),
            program = %self.config.program(),
            "serving"
        );

        let outcome = loop {
            let Some(request) = transport.recv().await else {
                debug!("transport closed");
                break Ok(());
            };

            if let Some(response) = self.handle_request(request).await {
                if let Err(e) = transport.send(response).await {
                    break Err(e);
                }
            }
        };

        self.coordinator
            .shutdown(self.config.shutdown_grace())
            .await;
        if let Err(e) = transport.close().await {
            warn!(error = %e, "failed to close transport");
        }

        info!("server stopped");
        outcome
    }
}
