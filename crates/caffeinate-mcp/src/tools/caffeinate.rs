//! The caffeinate tools:
//! - caffeinate_start
//! - caffeinate_stop
//! - caffeinate_list
//!
//! Each tool is a thin adapter: read arguments, call the
//! [`LifecycleCoordinator`], render text. Failures are returned as error
//! results, never as JSON-RPC errors.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::{debug, warn};

use super::options::StartOptions;
use crate::error::{CaffeinateError, ToolError};
use crate::process::{LifecycleCoordinator, ProcessSnapshot};
use crate::tool::{CallArguments, Tool, ToolContext, ToolResult};

fn schema_of<T: JsonSchema>() -> Value {
    serde_json::to_value(schemars::schema_for!(T))
        .unwrap_or_else(|_| json!({"type": "object", "properties": {}}))
}

fn error_result(error: CaffeinateError) -> ToolResult {
    warn!(kind = error.kind(), "{}", error);
    ToolResult::error(error.to_string())
}

// =============================================================================
// caffeinate_start
// =============================================================================

pub struct CaffeinateStartTool {
    coordinator: Arc<LifecycleCoordinator>,
}

impl CaffeinateStartTool {
    pub fn new(coordinator: Arc<LifecycleCoordinator>) -> Self {
        Self { coordinator }
    }
}

#[async_trait]
impl Tool for CaffeinateStartTool {
    fn name(&self) -> &str {
        "caffeinate_start"
    }

    fn description(&self) -> Option<&str> {
        Some("Start caffeinate to prevent system sleep")
    }

    fn input_schema(&self) -> Value {
        schema_of::<StartOptions>()
    }

    async fn execute(
        &self,
        arguments: CallArguments,
        context: &ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let options = StartOptions::from_arguments(&arguments);
        debug!(request_id = ?context.request_id, ?options, "caffeinate_start");

        match self.coordinator.start(options.to_args()).await {
            Ok(started) => Ok(ToolResult::success_text(format!(
                "Started caffeinate with ID: {} (PID: {})\nFlags: {}",
                started.id,
                started.pid,
                started.args.join(" ")
            ))),
            Err(e) => Ok(error_result(e)),
        }
    }
}

// =============================================================================
// caffeinate_stop
// =============================================================================

pub struct CaffeinateStopTool {
    coordinator: Arc<LifecycleCoordinator>,
}

impl CaffeinateStopTool {
    pub fn new(coordinator: Arc<LifecycleCoordinator>) -> Self {
        Self { coordinator }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
struct StopInput {
    /// ID of the caffeinate process to stop
    id: String,
}

#[async_trait]
impl Tool for CaffeinateStopTool {
    fn name(&self) -> &str {
        "caffeinate_stop"
    }

    fn description(&self) -> Option<&str> {
        Some("Stop a caffeinate process")
    }

    fn input_schema(&self) -> Value {
        schema_of::<StopInput>()
    }

    async fn execute(
        &self,
        arguments: CallArguments,
        context: &ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let StopInput { id } = match arguments.parse() {
            Ok(input) => input,
            Err(e) => {
                debug!(request_id = ?context.request_id, error = %e, "caffeinate_stop without id");
                return Ok(error_result(CaffeinateError::Validation(
                    "ID is required".to_string(),
                )));
            }
        };
        debug!(request_id = ?context.request_id, %id, "caffeinate_stop");

        match self.coordinator.stop(&id).await {
            Ok(()) => Ok(ToolResult::success_text(format!(
                "Stopped caffeinate process with ID: {}",
                id
            ))),
            Err(e) => Ok(error_result(e)),
        }
    }
}

// =============================================================================
// caffeinate_list
// =============================================================================

pub struct CaffeinateListTool {
    coordinator: Arc<LifecycleCoordinator>,
}

impl CaffeinateListTool {
    pub fn new(coordinator: Arc<LifecycleCoordinator>) -> Self {
        Self { coordinator }
    }
}

/// Render a listing; one line per process.
pub fn render_listing(processes: &[ProcessSnapshot]) -> String {
    if processes.is_empty() {
        return "No active caffeinate processes".to_string();
    }

    let mut text = String::from("Active caffeinate processes:\n");
    for process in processes {
        let _ = writeln!(
            text,
            "- ID: {}, PID: {}, Flags: {}, Started: {}",
            process.id,
            process.pid,
            process.flags(),
            process.started_at.to_rfc3339()
        );
    }
    text
}

#[async_trait]
impl Tool for CaffeinateListTool {
    fn name(&self) -> &str {
        "caffeinate_list"
    }

    fn description(&self) -> Option<&str> {
        Some("List active caffeinate processes")
    }

    fn input_schema(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }

    async fn execute(
        &self,
        _arguments: CallArguments,
        _context: &ToolContext,
    ) -> Result<ToolResult, ToolError> {
        Ok(ToolResult::success_text(render_listing(
            &self.coordinator.list(),
        )))
    }
}
