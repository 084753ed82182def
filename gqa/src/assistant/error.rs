//! Assistant invocation error types

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while locating or running the assistant
///
/// A non-zero exit code is not an error at this layer; it comes back inside
/// a `ProcessResult`.
#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("{name} CLI executable not found. Searched: {searched}")]
    NotFound { name: String, searched: String },

    #[error("Command timed out after {} seconds", timeout.as_secs())]
    Timeout { timeout: Duration },

    #[error("Failed to launch {}: {source}", path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid search path: {0}")]
    SearchPath(#[from] std::env::JoinPathsError),
}

impl InvokeError {
    /// Check if the executable could not be resolved
    pub fn is_not_found(&self) -> bool {
        matches!(self, InvokeError::NotFound { .. })
    }

    /// Check if the child process ran out of time
    pub fn is_timeout(&self) -> bool {
        matches!(self, InvokeError::Timeout { .. })
    }
}
