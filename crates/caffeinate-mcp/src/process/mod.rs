//! Process management for caffeinate children.
//!
//! This module owns the only runtime state of the server: which processes
//! are running, under which id, and how to terminate them.
//!
//! - [`ProcessRegistry`]: mutex-guarded map from [`ProcessId`] to handle
//! - [`LifecycleCoordinator`]: spawn + register + waiter, kill + unregister
//! - [`ProcessInvoker`]: seam over the OS (see [`SystemInvoker`] and
//!   [`MockInvoker`])
//!
//! # Examples
//!
//! ```rust,no_run
//! use caffeinate_mcp::LifecycleCoordinator;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let coordinator = LifecycleCoordinator::system();
//!
//!     let started = coordinator.start(vec!["-i".to_string()]).await?;
//!     println!("started {} with pid {}", started.id, started.pid);
//!
//!     for process in coordinator.list() {
//!         println!("{} -> {}", process.id, process.pid);
//!     }
//!
//!     coordinator.stop(started.id.as_str()).await?;
//!     coordinator.shutdown(Duration::from_secs(2)).await;
//!     Ok(())
//! }
//! ```

pub mod coordinator;
pub mod id;
pub mod invoker;
pub mod mock;
pub mod registry;

pub use coordinator::{LifecycleCoordinator, StartedProcess};
pub use id::ProcessId;
pub use invoker::{ChildProcess, ProcessInvoker, SystemInvoker};
pub use mock::{MockInvoker, SpawnRecord};
pub use registry::{ProcessEntry, ProcessHandle, ProcessRegistry, ProcessSnapshot};
