//! Server configuration types.

use std::time::Duration;

use crate::{PROTOCOL_VERSION, SERVER_NAME, VERSION};

/// Program spawned when no override is configured.
pub const DEFAULT_PROGRAM: &str = "caffeinate";

/// How long shutdown waits for waiter tasks after the kill sweep.
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Configuration of a [`CaffeinateMcpServer`](crate::CaffeinateMcpServer).
///
/// # Examples
///
/// ```rust
/// use caffeinate_mcp::ServerConfig;
/// use std::time::Duration;
///
/// let config = ServerConfig::builder()
///     .program("/usr/bin/caffeinate")
///     .shutdown_grace(Duration::from_millis(500))
///     .build();
///
/// assert_eq!(config.name(), "caffeinate-mcp");
/// assert_eq!(config.program(), "/usr/bin/caffeinate");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub(crate) name: String,
    pub(crate) version: String,
    pub(crate) protocol_version: String,
    pub(crate) program: String,
    pub(crate) shutdown_grace: Duration,
}

impl ServerConfig {
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::new()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn protocol_version(&self) -> &str {
        &self.protocol_version
    }

    /// Path or bare name of the sleep-prevention program.
    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn shutdown_grace(&self) -> Duration {
        self.shutdown_grace
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfigBuilder::new().build()
    }
}

/// Builder for [`ServerConfig`]. Every field has a default.
#[derive(Debug, Default)]
pub struct ServerConfigBuilder {
    name: Option<String>,
    version: Option<String>,
    protocol_version: Option<String>,
    program: Option<String>,
    shutdown_grace: Option<Duration>,
}

impl ServerConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn protocol_version(mut self, protocol_version: impl Into<String>) -> Self {
        self.protocol_version = Some(protocol_version.into());
        self
    }

    pub fn program(mut self, program: impl Into<String>) -> Self {
        self.program = Some(program.into());
        self
    }

    pub fn shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = Some(grace);
        self
    }

    pub fn build(self) -> ServerConfig {
        ServerConfig {
            name: self.name.unwrap_or_else(|| SERVER_NAME.to_string()),
            version: self.version.unwrap_or_else(|| VERSION.to_string()),
            protocol_version: self
                .protocol_version
                .unwrap_or_else(|| PROTOCOL_VERSION.to_string()),
            program: self.program.unwrap_or_else(|| DEFAULT_PROGRAM.to_string()),
            shutdown_grace: self.shutdown_grace.unwrap_or(DEFAULT_SHUTDOWN_GRACE),
        }
    }
}
