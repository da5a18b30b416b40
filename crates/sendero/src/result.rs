//! Result and error types for Sendero.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for harness operations
pub type HarnessResult<T> = Result<T, HarnessError>;

/// Errors that can abort a journey
#[derive(Debug, Error)]
pub enum HarnessError {
    /// A wait condition never became true within its bound
    #[error("Timed out after {ms}ms waiting for {waited_for}")]
    Timeout {
        /// What was being waited for
        waited_for: String,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// The automation driver itself failed (session crashed, element detached, ...)
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// Navigation failed
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// An explicit post-condition did not hold after all waits
    #[error("Assertion failed: {message}")]
    Assertion {
        /// Error message
        message: String,
    },

    /// Operation called in the wrong journey state
    #[error("Invalid state: {message}")]
    InvalidState {
        /// Error message
        message: String,
    },

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Journey configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl HarnessError {
    /// Create a driver error
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Create an assertion error
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::Assertion {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Classify the error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Driver { .. } | Self::Navigation { .. } | Self::BrowserLaunch { .. } => {
                ErrorKind::Driver
            }
            Self::Assertion { .. } => ErrorKind::Assertion,
            Self::InvalidState { .. } | Self::Config { .. } | Self::Yaml(_) => ErrorKind::Config,
            Self::Io(_) | Self::Json(_) => ErrorKind::Io,
        }
    }

    /// Whether this is a wait timeout
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Coarse error classification carried in failure records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A wait condition timed out
    Timeout,
    /// The driver or the browser failed
    Driver,
    /// A post-condition did not hold
    Assertion,
    /// The journey was misconfigured
    Config,
    /// Local I/O or serialization failed
    Io,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Timeout => "timeout",
            Self::Driver => "driver",
            Self::Assertion => "assertion",
            Self::Config => "config",
            Self::Io => "io",
        };
        f.write_str(name)
    }
}
