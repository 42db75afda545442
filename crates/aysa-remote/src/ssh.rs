//! SSH-backed remote session

use crate::error::{RemoteError, Result};
use crate::session::{CommandOutput, RemoteSession};
use async_trait::async_trait;
use aysa_core::types::{Stage, StageConfig};
use aysa_core::utils::expand_home;
use camino::Utf8PathBuf;
use std::path::PathBuf;
use tracing::{debug, trace};

/// Runs commands on a stage host through the system `ssh` client
///
/// Every command runs inside the stage's project directory, when one is
/// configured.
#[derive(Debug, Clone)]
pub struct SshSession {
    stage: Stage,
    user: String,
    host: String,
    port: Option<u16>,
    pkey: Option<Utf8PathBuf>,
    path: Option<String>,
    program: Option<PathBuf>,
}

impl SshSession {
    /// Build a session from a stage section; `root` is refused
    pub fn from_stage(stage: Stage, config: &StageConfig) -> Result<Self> {
        if config.host.trim().is_empty() {
            return Err(aysa_core::Error::missing_field(format!("{}.host", stage)).into());
        }
        if config.user.trim().is_empty() {
            return Err(aysa_core::Error::missing_field(format!("{}.user", stage)).into());
        }
        if config.user.trim().eq_ignore_ascii_case("root") {
            return Err(RemoteError::RootUserForbidden {
                stage: stage.to_string(),
            });
        }

        Ok(Self {
            stage,
            user: config.user.trim().to_string(),
            host: config.host.trim().to_string(),
            port: config.port,
            pkey: config.pkey.as_deref().map(expand_home),
            path: config.path.clone().filter(|p| !p.trim().is_empty()),
            program: None,
        })
    }

    /// Use a specific ssh executable instead of looking one up in PATH
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = Some(program.into());
        self
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    fn program(&self) -> Result<PathBuf> {
        match &self.program {
            Some(p) => Ok(p.clone()),
            None => which::which("ssh").map_err(|_| RemoteError::SshNotFound),
        }
    }

    /// Command line as executed by the remote shell
    pub fn remote_command(&self, command: &str) -> String {
        match &self.path {
            Some(path) => format!("cd {} && {}", shell_quote(path), command),
            None => command.to_string(),
        }
    }

    /// Arguments passed to `ssh`
    pub fn ssh_args(&self, command: &str) -> Vec<String> {
        let mut args = vec![
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            "StrictHostKeyChecking=accept-new".to_string(),
        ];
        if let Some(port) = self.port {
            args.push("-p".to_string());
            args.push(port.to_string());
        }
        if let Some(pkey) = &self.pkey {
            args.push("-i".to_string());
            args.push(pkey.to_string());
        }
        args.push(format!("{}@{}", self.user, self.host));
        args.push(self.remote_command(command));
        args
    }
}

#[async_trait]
impl RemoteSession for SshSession {
    fn target(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }

    async fn run(&self, command: &str) -> Result<CommandOutput> {
        let program = self.program()?;
        debug!("[{}] {}", self.stage, command);

        let output = tokio::process::Command::new(&program)
            .args(self.ssh_args(command))
            .output()
            .await?;

        let output = CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            status: output.status.code().unwrap_or(-1),
        };
        trace!("[{}] exit {}: {}", self.stage, output.status, output.stdout);
        Ok(output)
    }
}

/// Single-quote a value for a POSIX shell
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
