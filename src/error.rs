//! Error types for Chocolatey reconciliation.
//!
//! Process failures always carry the full accumulated output of the failed
//! invocation so the operator can diagnose the tool's complaint without
//! re-running it by hand. Dry-run parse mismatches are not errors at all;
//! they are absorbed into state comparison as "not installed".

use thiserror::Error;

/// Errors that can occur while reconciling a package.
#[derive(Debug, Error)]
pub enum Error {
    /// Chocolatey is not installed or not found in PATH
    #[error("choco not found. Install it from https://chocolatey.org/install")]
    ChocoNotFound,

    /// The external process could not be started
    #[error("failed to start process: {message}")]
    Spawn {
        /// Description of what failed to start
        message: String,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// The external process exited with a non-zero code
    #[error("command failed: {message}")]
    CommandFailed {
        /// Description of what command failed
        message: String,
        /// Full combined output captured from the process
        output: String,
    },

    /// The cancellation signal fired while waiting for a process
    #[error("operation cancelled")]
    Cancelled,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error was caused by the caller's cancellation signal.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Result type for Chocolatey reconciliation operations.
pub type Result<T> = std::result::Result<T, Error>;
