//! Cloud gateway and credential store error types

use thiserror::Error;

/// Errors raised by the gateway boundary and the credential store
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Command execution failed: {command}: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("CLI not found: {0}")]
    CliNotFound(String),

    #[error("Invalid credential record: {0}")]
    InvalidRecord(String),

    #[error("Credential store error: {0}")]
    StoreError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CloudError {
    /// Convenience constructor for a failed provider command
    pub fn command_failed(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        CloudError::CommandFailed {
            command: command.into(),
            stderr: stderr.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;
