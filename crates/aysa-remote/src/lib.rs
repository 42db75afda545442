//! Remote deployment for the AySA CLI
//!
//! This crate provides:
//! - The [`RemoteSession`] contract for running shell commands on a host
//! - [`SshSession`], backed by the system `ssh` client
//! - [`ComposeDeployer`], which drives docker-compose on a stage host

pub mod compose;
pub mod error;
pub mod session;
pub mod ssh;

pub use compose::{CleanupPolicy, ComposeDeployer, DeployReport};
pub use error::{RemoteError, Result};
pub use session::{CommandOutput, RemoteSession};
pub use ssh::SshSession;
