//! Error types for aysa-remote

use thiserror::Error;

/// Result type alias using the remote error type
pub type Result<T> = std::result::Result<T, RemoteError>;

/// Failures raised while running commands on a deployment host
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Deployments as root are refused
    #[error("The user \"root\" is not allowed to run deployments ({stage})")]
    RootUserForbidden { stage: String },

    /// `ssh` binary not found in PATH
    #[error("ssh not found in PATH")]
    SshNotFound,

    /// Remote command exited with a non-zero status
    #[error("Command `{command}` failed with status {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: i32,
        stderr: String,
    },

    /// Service name that is not a plain compose service identifier
    #[error("Invalid service name: \"{name}\"")]
    InvalidService { name: String },

    /// Service filter matching nothing in the compose project
    #[error("No such service in the compose project: {name}")]
    UnknownService { name: String },

    /// Stage configuration problem
    #[error(transparent)]
    Config(#[from] aysa_core::Error),

    /// IO error while spawning the session
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RemoteError {
    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, status: i32, stderr: impl Into<String>) -> Self {
        Self::CommandFailed {
            command: command.into(),
            status,
            stderr: stderr.into(),
        }
    }

    /// Create an invalid service error
    pub fn invalid_service(name: impl Into<String>) -> Self {
        Self::InvalidService { name: name.into() }
    }

    /// Create an unknown service error
    pub fn unknown_service(name: impl Into<String>) -> Self {
        Self::UnknownService { name: name.into() }
    }
}
