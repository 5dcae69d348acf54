//! Scripted [`ProcessInvoker`] for tests.
//!
//! No OS process is created. Pids are handed out sequentially, every spawn is
//! recorded, and a child stays "running" until the test calls
//! [`MockInvoker::exit`] or the coordinator kills it.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use tokio::sync::watch;

use super::invoker::{ChildProcess, ProcessInvoker};

const FIRST_PID: u32 = 10_000;

/// One recorded call to [`ProcessInvoker::spawn`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnRecord {
    pub program: String,
    pub args: Vec<String>,
    pub pid: u32,
}

/// In-memory invoker. Clones share state.
///
/// # Examples
///
/// ```rust
/// use caffeinate_mcp::process::{MockInvoker, ProcessInvoker};
///
/// let invoker = MockInvoker::new();
/// let child = invoker.spawn("caffeinate", &["-d".to_string()]).unwrap();
///
/// assert_eq!(invoker.spawned()[0].args, vec!["-d".to_string()]);
/// assert!(invoker.is_running(child.pid()));
/// ```
#[derive(Clone, Default)]
pub struct MockInvoker {
    state: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    next_pid: u32,
    spawned: Vec<SpawnRecord>,
    exits: HashMap<u32, Arc<watch::Sender<bool>>>,
    kills: Vec<u32>,
    spawn_error: Option<io::ErrorKind>,
    kill_error: Option<io::ErrorKind>,
}

impl MockInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following spawn fail with `kind`.
    pub fn fail_spawns(&self, kind: io::ErrorKind) {
        self.state.lock().spawn_error = Some(kind);
    }

    /// Make every following kill fail with `kind`.
    pub fn fail_kills(&self, kind: io::ErrorKind) {
        self.state.lock().kill_error = Some(kind);
    }

    /// Clear injected failures.
    pub fn heal(&self) {
        let mut state = self.state.lock();
        state.spawn_error = None;
        state.kill_error = None;
    }

    /// Simulate the child with `pid` exiting on its own.
    ///
    /// Returns `false` if no such child was spawned.
    pub fn exit(&self, pid: u32) -> bool {
        let state = self.state.lock();
        match state.exits.get(&pid) {
            Some(exited) => {
                exited.send_replace(true);
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self, pid: u32) -> bool {
        let state = self.state.lock();
        state
            .exits
            .get(&pid)
            .is_some_and(|exited| !*exited.borrow())
    }

    pub fn spawned(&self) -> Vec<SpawnRecord> {
        self.state.lock().spawned.clone()
    }

    /// Pids that received a successful kill, in order.
    pub fn killed(&self) -> Vec<u32> {
        self.state.lock().kills.clone()
    }
}

impl ProcessInvoker for MockInvoker {
    fn spawn(&self, program: &str, args: &[String]) -> io::Result<Box<dyn ChildProcess>> {
        let mut state = self.state.lock();

        if let Some(kind) = state.spawn_error {
            return Err(io::Error::new(kind, format!("mock spawn of {} failed", program)));
        }

        let pid = FIRST_PID + state.next_pid;
        state.next_pid += 1;

        let (exited_tx, exited_rx) = watch::channel(false);
        let exited_tx = Arc::new(exited_tx);
        state.exits.insert(pid, Arc::clone(&exited_tx));
        state.spawned.push(SpawnRecord {
            program: program.to_string(),
            args: args.to_vec(),
            pid,
        });

        Ok(Box::new(MockChild {
            pid,
            exited_tx,
            exited_rx,
            state: Arc::clone(&self.state),
        }))
    }
}

struct MockChild {
    pid: u32,
    exited_tx: Arc<watch::Sender<bool>>,
    exited_rx: watch::Receiver<bool>,
    state: Arc<Mutex<MockState>>,
}

#[async_trait]
impl ChildProcess for MockChild {
    fn pid(&self) -> u32 {
        self.pid
    }

    fn start_kill(&mut self) -> io::Result<()> {
        if *self.exited_rx.borrow() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "can't kill an exited process",
            ));
        }

        let mut state = self.state.lock();
        if let Some(kind) = state.kill_error {
            return Err(io::Error::new(kind, "mock kill failed"));
        }
        state.kills.push(self.pid);
        drop(state);

        self.exited_tx.send_replace(true);
        Ok(())
    }

    async fn wait(&mut self) -> io::Result<()> {
        self.exited_rx
            .wait_for(|exited| *exited)
            .await
            .map(|_| ())
            .map_err(|_| io::Error::other("mock child dropped"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_sequential_pids_and_records() {
        let invoker = MockInvoker::new();
        let a = invoker.spawn("caffeinate", &[]).unwrap();
        let b = invoker.spawn("caffeinate", &["-i".to_string()]).unwrap();

        assert_eq!(a.pid() + 1, b.pid());
        let records = invoker.spawned();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].args, vec!["-i".to_string()]);
        assert_eq!(records[1].program, "caffeinate");
    }

    #[test]
    fn test_injected_spawn_failure() {
        let invoker = MockInvoker::new();
        invoker.fail_spawns(io::ErrorKind::PermissionDenied);

        let error = invoker.spawn("caffeinate", &[]).err().unwrap();
        assert_eq!(error.kind(), io::ErrorKind::PermissionDenied);
        assert!(invoker.spawned().is_empty());

        invoker.heal();
        assert!(invoker.spawn("caffeinate", &[]).is_ok());
    }

    #[tokio::test]
    async fn test_exit_resolves_wait() {
        let invoker = MockInvoker::new();
        let mut child = invoker.spawn("caffeinate", &[]).unwrap();
        let pid = child.pid();

        assert!(invoker.is_running(pid));
        assert!(invoker.exit(pid));
        assert!(!invoker.is_running(pid));

        tokio::time::timeout(Duration::from_secs(1), child.wait())
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_kill_resolves_wait_and_second_kill_fails() {
        let invoker = MockInvoker::new();
        let mut child = invoker.spawn("caffeinate", &[]).unwrap();

        child.start_kill().unwrap();
        child.wait().await.unwrap();
        assert_eq!(invoker.killed(), vec![child.pid()]);
        assert!(child.start_kill().is_err());
    }

    #[test]
    fn test_injected_kill_failure_keeps_running() {
        let invoker = MockInvoker::new();
        let mut child = invoker.spawn("caffeinate", &[]).unwrap();
        invoker.fail_kills(io::ErrorKind::PermissionDenied);

        assert!(child.start_kill().is_err());
        assert!(invoker.is_running(child.pid()));
        assert!(invoker.killed().is_empty());
    }

    #[test]
    fn test_exit_unknown_pid() {
        assert!(!MockInvoker::new().exit(1));
    }
}
