//! `caffeinate_start` options and their command-line flags.
//!
//! | option    | flag       |
//! |-----------|------------|
//! | `display` | `-d`       |
//! | `idle`    | `-i`       |
//! | `disk`    | `-m`       |
//! | `system`  | `-s`       |
//! | `user`    | `-u`       |
//! | `timeout` | `-t <n>`   |
//! | `pid`     | `-w <n>`   |
//!
//! Numeric flags are only emitted for values greater than zero.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tool::CallArguments;

/// Assertions requested from `caffeinate`.
///
/// # Examples
///
/// ```rust
/// use caffeinate_mcp::tools::StartOptions;
///
/// let options = StartOptions {
///     display: true,
///     idle: true,
///     timeout: Some(300),
///     ..Default::default()
/// };
/// assert_eq!(options.to_args(), vec!["-d", "-i", "-t", "300"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StartOptions {
    /// Prevent display from sleeping (-d flag)
    #[serde(default)]
    pub display: bool,
    /// Prevent system from idle sleeping (-i flag)
    #[serde(default)]
    pub idle: bool,
    /// Prevent disk from idle sleeping (-m flag)
    #[serde(default)]
    pub disk: bool,
    /// Prevent system from sleeping when on AC power (-s flag)
    #[serde(default)]
    pub system: bool,
    /// Declare user is active (-u flag)
    #[serde(default)]
    pub user: bool,
    /// Timeout in seconds (-t flag)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<i64>,
    /// Wait for process with specified PID to exit (-w flag)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<i64>,
}

impl StartOptions {
    /// Read options from call arguments; absent or non-positive numbers are
    /// dropped.
    pub fn from_arguments(arguments: &CallArguments) -> Self {
        let positive = |name: &str| Some(arguments.get_int(name, 0)).filter(|n| *n > 0);

        Self {
            display: arguments.get_bool("display", false),
            idle: arguments.get_bool("idle", false),
            disk: arguments.get_bool("disk", false),
            system: arguments.get_bool("system", false),
            user: arguments.get_bool("user", false),
            timeout: positive("timeout"),
            pid: positive("pid"),
        }
    }

    /// Argument list for the external program.
    pub fn to_args(&self) -> Vec<String> {
        let switches = [
            (self.display, "-d"),
            (self.idle, "-i"),
            (self.disk, "-m"),
            (self.system, "-s"),
            (self.user, "-u"),
        ];

        let mut args: Vec<String> = switches
            .iter()
            .filter(|(enabled, _)| *enabled)
            .map(|(_, flag)| flag.to_string())
            .collect();

        for (value, flag) in [(self.timeout, "-t"), (self.pid, "-w")] {
            if let Some(n) = value.filter(|n| *n > 0) {
                args.push(flag.to_string());
                args.push(n.to_string());
            }
        }

        args
    }
}
