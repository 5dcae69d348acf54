//! Lifecycle coordinator: ties spawning and termination to registry
//! bookkeeping.
//!
//! ```text
//! start ──spawn──► register ──► waiter task ──exit──► unregister
//!                                   ▲
//! stop ──lookup──► kill request ────┘          stop ──► unregister
//! ```
//!
//! Every started process gets one waiter task on a [`TaskTracker`]. The
//! waiter owns the child, services kill requests and, once the exit is
//! observed, removes the entry. Explicit stops remove the entry too; the
//! second removal is a no-op.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, instrument, warn};

use super::id::ProcessId;
use super::invoker::{ChildProcess, ProcessInvoker, SystemInvoker};
use super::registry::{KillRequest, ProcessEntry, ProcessHandle, ProcessRegistry, ProcessSnapshot};
use crate::config::DEFAULT_PROGRAM;
use crate::error::{CaffeinateError, Result};

/// Outcome of a successful [`LifecycleCoordinator::start`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartedProcess {
    pub id: ProcessId,
    pub pid: u32,
    pub args: Vec<String>,
}

/// Drives spawn, stop and shutdown for every tracked process.
///
/// # Examples
///
/// ```rust
/// use caffeinate_mcp::LifecycleCoordinator;
/// use caffeinate_mcp::process::MockInvoker;
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let coordinator = LifecycleCoordinator::new("caffeinate", Arc::new(MockInvoker::new()));
///
/// let started = coordinator.start(vec!["-i".to_string()]).await?;
/// assert_eq!(coordinator.list().len(), 1);
///
/// coordinator.stop(started.id.as_str()).await?;
/// assert!(coordinator.list().is_empty());
/// # Ok(())
/// # }
/// ```
pub struct LifecycleCoordinator {
    program: String,
    invoker: Arc<dyn ProcessInvoker>,
    registry: Arc<ProcessRegistry>,
    waiters: TaskTracker,
}

impl std::fmt::Debug for LifecycleCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleCoordinator")
            .field("program", &self.program)
            .field("registry", &self.registry)
            .field("waiters", &self.waiters.len())
            .finish()
    }
}

impl LifecycleCoordinator {
    pub fn new(program: impl Into<String>, invoker: Arc<dyn ProcessInvoker>) -> Self {
        Self {
            program: program.into(),
            invoker,
            registry: Arc::new(ProcessRegistry::new()),
            waiters: TaskTracker::new(),
        }
    }

    /// Coordinator that spawns real `caffeinate` processes.
    pub fn system() -> Self {
        Self::new(DEFAULT_PROGRAM, Arc::new(SystemInvoker::new()))
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn registry(&self) -> &ProcessRegistry {
        &self.registry
    }

    /// Number of waiter tasks that have not finished yet.
    pub fn active_waiters(&self) -> usize {
        self.waiters.len()
    }

    /// Spawn the program with `args` and start tracking it.
    ///
    /// Must be called from within a Tokio runtime. On spawn failure nothing
    /// is registered.
    #[instrument(skip(self), fields(program = %self.program))]
    pub async fn start(&self, args: Vec<String>) -> Result<StartedProcess> {
        let child = self
            .invoker
            .spawn(&self.program, &args)
            .map_err(|source| CaffeinateError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let pid = child.pid();
        let id = ProcessId::generate(pid);
        let (control_tx, control_rx) = mpsc::channel(1);
        let handle = ProcessHandle::new(pid, control_tx);

        self.registry
            .register(ProcessEntry::new(id.clone(), handle.clone(), args.clone()));
        self.waiters.spawn(watch_process(
            id.clone(),
            child,
            handle,
            control_rx,
            Arc::clone(&self.registry),
        ));

        info!(id = %id, pid, "started process");
        Ok(StartedProcess { id, pid, args })
    }

    /// Kill the process registered as `id` and forget it.
    ///
    /// If the kill fails the entry stays registered; its waiter still
    /// removes it should the process exit anyway.
    #[instrument(skip(self))]
    pub async fn stop(&self, id: &str) -> Result<()> {
        let handle = self
            .registry
            .lookup(id)
            .ok_or_else(|| CaffeinateError::NotFound(id.to_string()))?;

        handle
            .kill()
            .await
            .map_err(|source| CaffeinateError::Termination {
                id: id.to_string(),
                source,
            })?;

        self.registry.unregister_if(id, &handle);
        info!(id, pid = handle.pid(), "stopped process");
        Ok(())
    }

    /// Point-in-time view of the running processes.
    ///
    /// Best effort: an entry may exit right after the snapshot is taken.
    pub fn list(&self) -> Vec<ProcessSnapshot> {
        self.registry.snapshot()
    }

    /// Kill every registered process and wait up to `grace` for the waiters.
    ///
    /// The registry is emptied in one critical section; the kills happen
    /// afterwards, outside the lock. Starts or stops racing with the sweep
    /// are not coordinated with it.
    pub async fn shutdown(&self, grace: Duration) {
        let entries = self.registry.drain();
        if !entries.is_empty() {
            info!(count = entries.len(), "terminating remaining processes");
        }

        for entry in entries {
            if let Err(e) = entry.handle.kill().await {
                warn!(id = %entry.id, pid = entry.handle.pid(), error = %e, "failed to kill process during shutdown");
            }
        }

        self.waiters.close();
        if tokio::time::timeout(grace, self.waiters.wait()).await.is_err() {
            warn!(
                pending = self.waiters.len(),
                "waiter tasks still running after shutdown grace period"
            );
        }
    }
}

/// Waiter task body: owns `child` until it exits, then unregisters `id`
/// unless the id has since been taken over by another process.
///
/// Kill requests are answered from here so the child is signalled and reaped
/// by a single owner. Repeated kill requests are acknowledged without
/// signalling again.
async fn watch_process(
    id: ProcessId,
    mut child: Box<dyn ChildProcess>,
    handle: ProcessHandle,
    mut kills: mpsc::Receiver<KillRequest>,
    registry: Arc<ProcessRegistry>,
) {
    let pid = child.pid();
    let mut signalled = false;

    loop {
        tokio::select! {
            status = child.wait() => {
                match status {
                    Ok(()) => debug!(id = %id, pid, "process exited"),
                    Err(e) => warn!(id = %id, pid, error = %e, "waiting for process failed"),
                }
                break;
            }
            Some(reply) = kills.recv() => {
                let outcome = if signalled {
                    Ok(())
                } else {
                    child.start_kill()
                };
                signalled |= outcome.is_ok();
                let _ = reply.send(outcome);
            }
        }
    }

    if registry.unregister_if(id.as_str(), &handle) {
        debug!(id = %id, "removed exited process from registry");
    }
}
