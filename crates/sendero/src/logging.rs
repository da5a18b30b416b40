//! Tracing subscriber setup for binaries.
//!
//! Library code only emits `tracing` events. A binary calls
//! [`init_tracing`] once; `RUST_LOG` overrides the default level.

use tracing_subscriber::EnvFilter;

use crate::result::{HarnessError, HarnessResult};

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// Filter from `RUST_LOG`, or `default_level` when unset or invalid
#[must_use]
pub fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Install the global subscriber, writing to stderr
pub fn init_tracing(default_level: &str, format: LogFormat, ansi: bool) -> HarnessResult<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_level))
        .with_writer(std::io::stderr)
        .with_target(false);
    let installed = match format {
        LogFormat::Text => builder.with_ansi(ansi).try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| HarnessError::config(format!("cannot install log subscriber: {e}")))
}
