//! Remote command session contract

use crate::error::{RemoteError, Result};
use async_trait::async_trait;
use tracing::debug;

/// Captured result of a remote command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit status (-1 when the process was killed by a signal)
    pub status: i32,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == 0
    }

    /// Non-empty stdout lines
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.stdout.lines().filter(|l| !l.trim().is_empty())
    }
}

/// A shell on a deployment host, already positioned in the project directory
#[async_trait]
pub trait RemoteSession: Send + Sync {
    /// Human-readable target (`user@host`)
    fn target(&self) -> String;

    /// Run a command and capture its output, whatever the exit status
    async fn run(&self, command: &str) -> Result<CommandOutput>;

    /// Run a command, failing with `CommandFailed` on a non-zero status
    async fn run_checked(&self, command: &str) -> Result<CommandOutput> {
        let output = self.run(command).await?;
        if !output.success() {
            debug!("{} failed on {}: {}", command, self.target(), output.stderr.trim());
            return Err(RemoteError::command_failed(
                command,
                output.status,
                output.stderr.trim(),
            ));
        }
        Ok(output)
    }
}
