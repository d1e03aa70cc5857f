//! Logging configuration using the tracing ecosystem.
//!
//! Failures inside the client never surface as errors; they are reported
//! here instead. The subscriber writes to stderr so the CLI's stdout stays
//! clean for command output and interactive prompts.

use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Default log level if RUST_LOG is not set.
const DEFAULT_LOG_FILTER: &str = "jiraops=info,warn";

/// Initialize the logging system.
///
/// Log levels are configured via the `RUST_LOG` environment variable,
/// e.g. `RUST_LOG=jiraops=debug` for request-level detail.
pub fn init() -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let subscriber = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(filter);

    tracing::subscriber::set_global_default(subscriber)?;

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "jiraops starting up");

    Ok(())
}
