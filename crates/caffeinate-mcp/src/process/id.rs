//! Process identifiers.

use chrono::Utc;
use std::fmt;

/// Opaque identifier handed out for every started process.
///
/// Generated ids have the form `{pid}_{unix_seconds}`. The pid cannot be
/// reused by the OS while the child is unreaped, so two running processes
/// never share an id.
///
/// # Examples
///
/// ```rust
/// use caffeinate_mcp::ProcessId;
///
/// let id = ProcessId::generate(4242);
/// assert!(id.as_str().starts_with("4242_"));
/// assert_eq!(id.pid(), Some(4242));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ProcessId(String);

impl ProcessId {
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Build the id for a freshly spawned process.
    pub fn generate(pid: u32) -> Self {
        Self::from_parts(pid, Utc::now().timestamp())
    }

    pub fn from_parts(pid: u32, unix_seconds: i64) -> Self {
        Self(format!("{}_{}", pid, unix_seconds))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// The pid component, if the id was produced by [`ProcessId::generate`].
    pub fn pid(&self) -> Option<u32> {
        let (pid, _) = self.0.split_once('_')?;
        pid.parse().ok()
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ProcessId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProcessId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for ProcessId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Lets `HashMap<ProcessId, _>` be queried with a plain `&str`.
impl std::borrow::Borrow<str> for ProcessId {
    fn borrow(&self) -> &str {
        &self.0
    }
}
