//! MCP tools exposed by the server.
//!
//! [`register_caffeinate_tools`] installs all three on a [`ToolRegistry`],
//! sharing one [`LifecycleCoordinator`].

pub mod caffeinate;
pub mod options;

pub use caffeinate::{CaffeinateListTool, CaffeinateStartTool, CaffeinateStopTool, render_listing};
pub use options::StartOptions;

use std::sync::Arc;

use crate::error::ToolError;
use crate::process::LifecycleCoordinator;
use crate::tool::ToolRegistry;

/// Register `caffeinate_start`, `caffeinate_stop` and `caffeinate_list`.
pub fn register_caffeinate_tools(
    registry: &mut ToolRegistry,
    coordinator: Arc<LifecycleCoordinator>,
) -> Result<(), ToolError> {
    registry.register(CaffeinateStartTool::new(Arc::clone(&coordinator)))?;
    registry.register(CaffeinateStopTool::new(Arc::clone(&coordinator)))?;
    registry.register(CaffeinateListTool::new(coordinator))?;
    Ok(())
}
