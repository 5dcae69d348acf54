//! caffeinate-mcp CLI
//!
//! Serves the caffeinate tools over stdio. Logs go to stderr.

use anyhow::{Context, Result};
use caffeinate_mcp::transport::StdioTransport;
use caffeinate_mcp::{CaffeinateMcpServer, ServerConfig, version_string};
use clap::Parser;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "caffeinate-mcp")]
#[command(about = "MCP server for managing caffeinate processes", long_about = None)]
#[command(disable_version_flag = true)]
struct Cli {
    /// Print version information and exit
    #[arg(long)]
    version: bool,

    /// Program spawned by caffeinate_start
    #[arg(long, env = "CAFFEINATE_MCP_PROGRAM", default_value = "caffeinate")]
    program: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// How long to wait for processes to exit on shutdown, in milliseconds
    #[arg(long, default_value_t = 2000)]
    shutdown_grace_ms: u64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.version {
        println!("{}", version_string());
        return Ok(());
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    let outcome = runtime.block_on(run(cli));

    // The stdin reader blocks a runtime thread until the next line arrives.
    runtime.shutdown_timeout(RUNTIME_SHUTDOWN_TIMEOUT);
    outcome
}

const RUNTIME_SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(200);

async fn run(cli: Cli) -> Result<()> {
    let config = ServerConfig::builder()
        .program(cli.program)
        .shutdown_grace(Duration::from_millis(cli.shutdown_grace_ms))
        .build();
    let grace = config.shutdown_grace();

    let server = CaffeinateMcpServer::new(config).context("failed to build server")?;
    let mut signals = ShutdownSignals::install().context("failed to install signal handlers")?;

    tokio::select! {
        outcome = server.serve(StdioTransport::new()) => {
            if let Err(e) = outcome {
                tracing::error!(error = %e, "server error");
                return Err(e).context("stdio transport failed");
            }
        }
        signal = signals.recv() => {
            tracing::info!(signal, "shutting down");
            server.coordinator().shutdown(grace).await;
        }
    }

    Ok(())
}

/// SIGINT and, on unix, SIGTERM.
struct ShutdownSignals {
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
}

impl ShutdownSignals {
    fn install() -> std::io::Result<Self> {
        Ok(Self {
            #[cfg(unix)]
            terminate: tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?,
        })
    }

    /// Name of the first signal received.
    async fn recv(&mut self) -> &'static str {
        #[cfg(unix)]
        {
            tokio::select! {
                _ = interrupted() => "SIGINT",
                _ = self.terminate.recv() => "SIGTERM",
            }
        }
        #[cfg(not(unix))]
        {
            interrupted().await;
            "ctrl-c"
        }
    }
}

async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
