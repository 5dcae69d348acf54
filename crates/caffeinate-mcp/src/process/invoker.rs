//! Seam over the operating system's spawn/signal/wait primitives.
//!
//! The coordinator only talks to [`ProcessInvoker`] and [`ChildProcess`].
//! [`SystemInvoker`] is the real implementation on top of
//! `tokio::process`; tests use [`MockInvoker`](super::MockInvoker).

use async_trait::async_trait;
use std::io;
use std::process::Stdio;
use tokio::process::{Child, Command};
use tracing::debug;

/// Spawns external programs.
pub trait ProcessInvoker: Send + Sync {
    /// Start `program` with `args`.
    ///
    /// Every OS-level failure (missing executable, permission denied,
    /// resource exhaustion) is returned as the underlying [`io::Error`].
    fn spawn(&self, program: &str, args: &[String]) -> io::Result<Box<dyn ChildProcess>>;
}

/// A live child process.
///
/// Each child is owned by exactly one waiter task, which is the only caller
/// of [`wait`](ChildProcess::wait) and [`start_kill`](ChildProcess::start_kill).
#[async_trait]
pub trait ChildProcess: Send {
    /// OS process number captured at spawn time.
    fn pid(&self) -> u32;

    /// Send the termination signal without waiting for the exit.
    ///
    /// Fails if the process has already exited.
    fn start_kill(&mut self) -> io::Result<()>;

    /// Resolve once the process has exited, for any reason.
    async fn wait(&mut self) -> io::Result<()>;
}

/// [`ProcessInvoker`] backed by `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemInvoker;

impl SystemInvoker {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessInvoker for SystemInvoker {
    fn spawn(&self, program: &str, args: &[String]) -> io::Result<Box<dyn ChildProcess>> {
        // stdout carries the protocol stream, so the child must not inherit it.
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        let pid = child.id().ok_or_else(|| {
            io::Error::other(format!("{} exited before its pid could be read", program))
        })?;

        debug!(program, pid, ?args, "spawned child process");
        Ok(Box::new(SystemChild { pid, child }))
    }
}

struct SystemChild {
    pid: u32,
    child: Child,
}

#[async_trait]
impl ChildProcess for SystemChild {
    fn pid(&self) -> u32 {
        self.pid
    }

    fn start_kill(&mut self) -> io::Result<()> {
        self.child.start_kill()
    }

    async fn wait(&mut self) -> io::Result<()> {
        let status = self.child.wait().await?;
        debug!(pid = self.pid, %status, "child process exited");
        Ok(())
    }
}
