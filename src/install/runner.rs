//! External process abstraction
//!
//! The installer only decides what to run; a `CommandRunner` runs it.
//! Tests substitute a recording runner instead of spawning PHP.

use crate::error::{ComposerError, ComposerResult};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::info;

/// One external command, fully described
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program to execute
    pub executable: String,
    /// Working directory
    pub working_dir: PathBuf,
    /// Arguments, not including the program
    pub args: Vec<String>,
    /// Extra environment variables
    pub env: BTreeMap<String, String>,
    /// Mask the final argument when displaying
    pub redact_last: bool,
}

impl Invocation {
    /// Command line for logs, with secrets masked
    pub fn display(&self) -> String {
        let last = self.args.len().saturating_sub(1);
        let args = self.args.iter().enumerate().map(|(i, arg)| {
            if self.redact_last && i == last {
                "[REDACTED]"
            } else {
                arg.as_str()
            }
        });

        std::iter::once(self.executable.as_str())
            .chain(args)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Runs invocations to completion
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run and return the exit code
    async fn run(&self, invocation: &Invocation) -> ComposerResult<i32>;
}

/// Runner that spawns real processes, streaming their output to ours
#[derive(Debug, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    /// Create a new process runner
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, invocation: &Invocation) -> ComposerResult<i32> {
        let command_line = invocation.display();
        info!(
            "Running `{}` from directory '{}'",
            command_line,
            invocation.working_dir.display()
        );

        let status = Command::new(&invocation.executable)
            .args(&invocation.args)
            .envs(&invocation.env)
            .current_dir(&invocation.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| ComposerError::command_failed(command_line.clone(), e))?;

        status
            .code()
            .ok_or(ComposerError::ProcessSignaled {
                command: command_line,
            })
    }
}
