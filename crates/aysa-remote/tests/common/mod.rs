//! Common test helpers for aysa-remote integration tests
//!
//! Provides a recording [`RemoteSession`] that answers commands from
//! canned outputs, so orchestration can be verified without a host.

#![allow(dead_code)]

use async_trait::async_trait;
use aysa_remote::{CommandOutput, RemoteSession, Result};
use std::sync::{Arc, Mutex};

pub const SERVICES_OUTPUT: &str = "web\napi\nworker\n";

pub const IMAGES_OUTPUT: &str = "\
Container          Repository                                Tag    Image Id       Size
stack_api_1        registry.example.com:5000/ns/api          dev    3f1c2a9e8b7d   120 MB
stack_db_1         postgres                                  12     9a8b7c6d5e4f   300 MB
stack_web_1        registry.example.com:5000/ns/web          dev    1a2b3c4d5e6f   80 MB
stack_worker_1     registry.example.com:5000/ns/api          dev    3f1c2a9e8b7d   120 MB
";

/// Session that records every command and replies by command prefix
#[derive(Clone, Default)]
pub struct MockSession {
    calls: Arc<Mutex<Vec<String>>>,
    replies: Arc<Mutex<Vec<(String, CommandOutput)>>>,
}

impl MockSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session answering `ps --services` and `images` like a small stack
    pub fn with_stack() -> Self {
        Self::new()
            .reply("docker-compose ps --services", SERVICES_OUTPUT)
            .reply("docker-compose images", IMAGES_OUTPUT)
    }

    /// Reply with `stdout` and status 0 to commands starting with `prefix`
    pub fn reply(self, prefix: &str, stdout: &str) -> Self {
        self.replies.lock().unwrap().push((
            prefix.to_string(),
            CommandOutput {
                stdout: stdout.to_string(),
                ..CommandOutput::default()
            },
        ));
        self
    }

    /// Fail commands starting with `prefix`
    pub fn fail(self, prefix: &str, status: i32, stderr: &str) -> Self {
        self.replies.lock().unwrap().push((
            prefix.to_string(),
            CommandOutput {
                stderr: stderr.to_string(),
                status,
                ..CommandOutput::default()
            },
        ));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Assert the exact command sequence
    pub fn assert_calls(&self, expected: &[&str]) {
        let calls = self.calls();
        assert_eq!(
            calls, expected,
            "Unexpected command sequence. Actual calls: {:?}",
            calls
        );
    }
}

#[async_trait]
impl RemoteSession for MockSession {
    fn target(&self) -> String {
        "deploy@mock".to_string()
    }

    async fn run(&self, command: &str) -> Result<CommandOutput> {
        self.calls.lock().unwrap().push(command.to_string());
        let replies = self.replies.lock().unwrap();
        Ok(replies
            .iter()
            .find(|(prefix, _)| command.starts_with(prefix.as_str()))
            .map(|(_, output)| output.clone())
            .unwrap_or_default())
    }
}
