// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spawning and collecting plugin processes.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::io::AsyncWriteExt;

use crate::error::PluginError;
use crate::words::split_command;

/// Result of a probe plugin run. The exit code is the payload, not an
/// error: probes signal health states through it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub exit_code: i32,
    /// Captured stdout + stderr, in that order
    pub output: String,
}

/// An external plugin: a fixed argv run in a fixed working directory.
#[derive(Debug, Clone)]
pub struct Plugin {
    name: String,
    cwd: PathBuf,
    argv: Vec<String>,
}

impl Plugin {
    /// Build a plugin from a command string, splitting it into argv once.
    pub fn from_command(
        name: impl Into<String>,
        cwd: impl Into<PathBuf>,
        command: &str,
    ) -> Result<Self, PluginError> {
        let argv = split_command(command).map_err(|source| PluginError::Parse {
            command: command.to_owned(),
            source,
        })?;
        Ok(Self { name: name.into(), cwd: cwd.into(), argv })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// The command line as it will be spawned.
    pub fn command_line(&self) -> String {
        self.argv.join(" ")
    }

    /// Run as a notifier: write `message` to stdin, wait for exit 0.
    ///
    /// Returns the captured output on success; non-zero exit is an error
    /// carrying the output.
    pub async fn run(&self, message: &str) -> Result<String, PluginError> {
        let outcome = self.spawn_and_wait(Some(message)).await?;
        if outcome.exit_code != 0 {
            return Err(PluginError::NonZeroExit {
                command: self.command_line(),
                code: outcome.exit_code,
                output: outcome.output,
            });
        }
        Ok(outcome.output)
    }

    /// Run as a probe: no stdin, exit code reported as data.
    pub async fn probe(&self) -> Result<ProbeOutcome, PluginError> {
        self.spawn_and_wait(None).await
    }

    async fn spawn_and_wait(&self, stdin: Option<&str>) -> Result<ProbeOutcome, PluginError> {
        let span = tracing::debug_span!(
            "plugin",
            plugin = %self.name,
            cmd = %self.argv[0],
            exit_code = tracing::field::Empty,
        );

        let mut process = tokio::process::Command::new(&self.argv[0]);
        process.args(&self.argv[1..]);
        process.current_dir(&self.cwd);
        process.stdin(if stdin.is_some() { Stdio::piped() } else { Stdio::null() });
        process.stdout(Stdio::piped());
        process.stderr(Stdio::piped());

        let mut child = process.spawn().map_err(|source| PluginError::Spawn {
            command: self.command_line(),
            source,
        })?;

        if let Some(message) = stdin {
            if let Some(mut pipe) = child.stdin.take() {
                let write_result = pipe.write_all(message.as_bytes()).await;
                drop(pipe); // close pipe to signal EOF
                write_result.map_err(|source| PluginError::Spawn {
                    command: self.command_line(),
                    source,
                })?;
            }
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|source| PluginError::Spawn {
                command: self.command_line(),
                source,
            })?;

        let exit_code = output.status.code().unwrap_or(-1);
        span.record("exit_code", exit_code);

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(ProbeOutcome { exit_code, output: combined })
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
