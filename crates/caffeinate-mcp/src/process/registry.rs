//! Process registry: the map from [`ProcessId`] to live process handle.
//!
//! All reads and writes go through a single [`parking_lot::Mutex`] that is
//! held only for the map operation itself. Nothing in this module blocks,
//! signals or waits on a process.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::io;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, trace};

use super::id::ProcessId;

/// Kill request sent to a waiter task; the reply carries the signal outcome.
pub(crate) type KillRequest = oneshot::Sender<io::Result<()>>;

/// Control handle for one running process.
///
/// The OS child object is owned by its waiter task; this handle only carries
/// the pid and a channel to that task. A kill sent after the waiter has
/// observed the exit fails with "process already exited" instead of
/// signalling a pid the OS may have recycled.
#[derive(Debug, Clone)]
pub struct ProcessHandle {
    pid: u32,
    control: mpsc::Sender<KillRequest>,
}

impl ProcessHandle {
    pub(crate) fn new(pid: u32, control: mpsc::Sender<KillRequest>) -> Self {
        Self { pid, control }
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Ask the waiter to deliver the termination signal.
    pub async fn kill(&self) -> io::Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.control
            .send(reply_tx)
            .await
            .map_err(|_| already_exited())?;
        reply_rx.await.map_err(|_| already_exited())?
    }

    /// Whether both handles control the same process.
    pub(crate) fn same_process(&self, other: &ProcessHandle) -> bool {
        self.control.same_channel(&other.control)
    }
}

fn already_exited() -> io::Error {
    io::Error::other("process already exited")
}

/// One tracked process. Presence in the registry means "running".
#[derive(Debug, Clone)]
pub struct ProcessEntry {
    pub id: ProcessId,
    pub handle: ProcessHandle,
    pub args: Vec<String>,
    pub started_at: DateTime<Utc>,
}

impl ProcessEntry {
    pub fn new(id: ProcessId, handle: ProcessHandle, args: Vec<String>) -> Self {
        Self {
            id,
            handle,
            args,
            started_at: Utc::now(),
        }
    }

    pub fn snapshot(&self) -> ProcessSnapshot {
        ProcessSnapshot {
            id: self.id.clone(),
            pid: self.handle.pid(),
            args: self.args.clone(),
            started_at: self.started_at,
        }
    }
}

/// Point-in-time copy of a registry entry, safe to hand to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessSnapshot {
    pub id: ProcessId,
    pub pid: u32,
    pub args: Vec<String>,
    pub started_at: DateTime<Utc>,
}

impl ProcessSnapshot {
    /// The flags joined the way they would appear on a command line.
    pub fn flags(&self) -> String {
        self.args.join(" ")
    }
}

/// Concurrency-safe registry of running processes.
///
/// # Examples
///
/// ```rust
/// use caffeinate_mcp::ProcessRegistry;
///
/// let registry = ProcessRegistry::new();
/// assert!(registry.is_empty());
/// assert!(registry.lookup("1234_1700000000").is_none());
///
/// // Removing an unknown id is not an error.
/// assert!(!registry.unregister("1234_1700000000"));
/// ```
#[derive(Debug, Default)]
pub struct ProcessRegistry {
    entries: Mutex<HashMap<ProcessId, ProcessEntry>>,
}

impl ProcessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new entry.
    ///
    /// Ids are unique by construction; a duplicate is a logic fault. It is
    /// logged and the newer entry replaces the stale one.
    pub fn register(&self, entry: ProcessEntry) {
        let id = entry.id.clone();
        let previous = self.entries.lock().insert(id.clone(), entry);

        if let Some(previous) = previous {
            error!(
                id = %id,
                stale_pid = previous.handle.pid(),
                "process id registered twice, replacing stale entry"
            );
        } else {
            trace!(id = %id, "registered process");
        }
    }

    /// Remove `id` if present. Absent ids are a no-op.
    ///
    /// Returns whether an entry was removed.
    pub fn unregister(&self, id: &str) -> bool {
        let removed = self.entries.lock().remove(id).is_some();
        trace!(id, removed, "unregister");
        removed
    }

    /// Remove `id` only while it still maps to `handle`.
    ///
    /// An entry registered later under the same id is left alone.
    pub(crate) fn unregister_if(&self, id: &str, handle: &ProcessHandle) -> bool {
        let mut entries = self.entries.lock();
        let owned = entries
            .get(id)
            .is_some_and(|entry| entry.handle.same_process(handle));
        if owned {
            entries.remove(id);
        }
        drop(entries);

        trace!(id, removed = owned, "unregister owned entry");
        owned
    }

    /// Handle for `id`, copied out under the lock.
    ///
    /// Use it for the immediate kill only; the entry may be reaped
    /// concurrently right after this returns.
    pub fn lookup(&self, id: &str) -> Option<ProcessHandle> {
        self.entries.lock().get(id).map(|entry| entry.handle.clone())
    }

    /// Copies of all entries, ordered by start time and then id.
    pub fn snapshot(&self) -> Vec<ProcessSnapshot> {
        let mut snapshot: Vec<ProcessSnapshot> = self
            .entries
            .lock()
            .values()
            .map(ProcessEntry::snapshot)
            .collect();

        snapshot.sort_by(|a, b| {
            a.started_at
                .cmp(&b.started_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        snapshot
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.lock().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Remove and return every entry in one critical section.
    pub(crate) fn drain(&self) -> Vec<ProcessEntry> {
        self.entries.lock().drain().map(|(_, entry)| entry).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, pid: u32) -> (ProcessEntry, mpsc::Receiver<KillRequest>) {
        let (tx, rx) = mpsc::channel(1);
        let entry = ProcessEntry::new(
            ProcessId::new(id),
            ProcessHandle::new(pid, tx),
            vec!["-i".to_string()],
        );
        (entry, rx)
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = ProcessRegistry::new();
        let (e, _rx) = entry("10_1", 10);
        registry.register(e);

        let handle = registry.lookup("10_1").expect("entry should be present");
        assert_eq!(handle.pid(), 10);
        assert!(registry.contains("10_1"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unregister_is_idempotent() {
        let registry = ProcessRegistry::new();
        let (e, _rx) = entry("10_1", 10);
        registry.register(e);

        assert!(registry.unregister("10_1"));
        assert!(!registry.unregister("10_1"));
        assert!(registry.lookup("10_1").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unregister_leaves_other_entries() {
        let registry = ProcessRegistry::new();
        let (a, _ra) = entry("10_1", 10);
        let (b, _rb) = entry("11_1", 11);
        registry.register(a);
        registry.register(b);

        assert!(!registry.unregister("12_1"));
        assert_eq!(registry.len(), 2);

        registry.unregister("10_1");
        assert!(registry.contains("11_1"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let registry = ProcessRegistry::new();
        let (e, _rx) = entry("10_1", 10);
        registry.register(e);

        let snapshot = registry.snapshot();
        registry.unregister("10_1");

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id.as_str(), "10_1");
        assert_eq!(snapshot[0].pid, 10);
        assert_eq!(snapshot[0].flags(), "-i");
        assert!(registry.snapshot().is_empty());
    }

    #[test]
    fn test_snapshot_ordering() {
        let registry = ProcessRegistry::new();
        let (mut late, _r1) = entry("20_1", 20);
        let (mut early, _r2) = entry("30_1", 30);
        early.started_at = late.started_at - chrono::Duration::seconds(10);
        late.started_at += chrono::Duration::seconds(10);
        registry.register(late);
        registry.register(early);

        let ids: Vec<String> = registry
            .snapshot()
            .into_iter()
            .map(|s| s.id.into_inner())
            .collect();
        assert_eq!(ids, vec!["30_1".to_string(), "20_1".to_string()]);
    }

    #[test]
    fn test_duplicate_register_keeps_single_entry() {
        let registry = ProcessRegistry::new();
        let (first, _r1) = entry("10_1", 10);
        let (second, _r2) = entry("10_1", 11);
        registry.register(first);
        registry.register(second);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup("10_1").unwrap().pid(), 11);
    }

    #[test]
    fn test_unregister_if_spares_newer_entry() {
        let registry = ProcessRegistry::new();
        let (stale, _r1) = entry("10_1", 10);
        let (fresh, _r2) = entry("10_1", 10);
        let stale_handle = stale.handle.clone();
        let fresh_handle = fresh.handle.clone();
        registry.register(stale);
        registry.register(fresh);

        assert!(!registry.unregister_if("10_1", &stale_handle));
        assert!(registry.contains("10_1"));

        assert!(registry.unregister_if("10_1", &fresh_handle));
        assert!(registry.is_empty());
        assert!(!registry.unregister_if("10_1", &fresh_handle));
    }

    #[test]
    fn test_drain_empties_registry() {
        let registry = ProcessRegistry::new();
        let (a, _ra) = entry("10_1", 10);
        let (b, _rb) = entry("11_1", 11);
        registry.register(a);
        registry.register(b);

        let drained = registry.drain();
        assert_eq!(drained.len(), 2);
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_kill_through_released_handle_fails() {
        let (e, rx) = entry("10_1", 10);
        drop(rx);

        let error = e.handle.kill().await.unwrap_err();
        assert!(error.to_string().contains("already exited"));
    }

    #[tokio::test]
    async fn test_kill_reply_is_forwarded() {
        let (e, mut rx) = entry("10_1", 10);

        let waiter = tokio::spawn(async move {
            let reply = rx.recv().await.unwrap();
            reply.send(Ok(())).unwrap();
        });

        e.handle.kill().await.unwrap();
        waiter.await.unwrap();
    }

    #[test]
    fn test_registry_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ProcessRegistry>();
        assert_send_sync::<ProcessHandle>();
    }
}
