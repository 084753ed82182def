//! Tool error types

use thiserror::Error;

use crate::assistant::InvokeError;

/// Errors that can occur during tool execution
///
/// Every variant is rendered into a failure payload by the executor; none of
/// them ends the process.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },

    /// `kind` names what was missing, e.g. "Source file" or "Project path"
    #[error("{kind} not found: {path}")]
    NotFound { kind: &'static str, path: String },

    #[error("Could not read {path} as UTF-8 text")]
    Decode { path: String },

    #[error("Command timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    #[error("{}", exit_message(.code, .stderr))]
    NonZeroExit { code: Option<i32>, stderr: String },

    #[error("{0}")]
    AssistantNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unexpected error: {0}")]
    Unexpected(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

fn exit_message(code: &Option<i32>, stderr: &str) -> String {
    let stderr = stderr.trim();
    match code {
        _ if !stderr.is_empty() => stderr.to_string(),
        Some(_) => "Unknown error".to_string(),
        None => "Assistant terminated by signal".to_string(),
    }
}

impl From<InvokeError> for ToolError {
    fn from(err: InvokeError) -> Self {
        match err {
            InvokeError::NotFound { .. } => ToolError::AssistantNotFound(err.to_string()),
            InvokeError::Timeout { timeout } => ToolError::Timeout {
                timeout_secs: timeout.as_secs(),
            },
            _ => ToolError::Unexpected(err.to_string()),
        }
    }
}
