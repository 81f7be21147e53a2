//! Shell command runner used for every package-manager invocation.
//!
//! The [`CommandRunner`] trait decouples reconciliation from process spawning.
//! Tests use scripted runners that record command lines and return canned
//! outputs without touching the system.

use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, instrument, warn};

use crate::io::process::{CommandOutput, DEFAULT_OUTPUT_LIMIT_BYTES, run_command};

/// Runs a complete command line and returns its captured output.
pub trait CommandRunner {
    /// Run `command_line` to completion.
    ///
    /// A command that exits non-zero is `Ok` with `success == false`. `Err` means
    /// the command could not be run at all.
    fn run(&self, command_line: &str) -> Result<CommandOutput>;
}

/// Runner that hands the command line to the platform shell.
#[derive(Debug, Clone)]
pub struct ShellRunner {
    /// Working directory for spawned commands; inherits the current one when `None`.
    pub workdir: Option<PathBuf>,
    pub timeout: Option<Duration>,
    pub output_limit_bytes: usize,
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self {
            workdir: None,
            timeout: None,
            output_limit_bytes: DEFAULT_OUTPUT_LIMIT_BYTES,
        }
    }
}

impl CommandRunner for ShellRunner {
    #[instrument(skip_all, fields(workdir = ?self.workdir))]
    fn run(&self, command_line: &str) -> Result<CommandOutput> {
        info!(command = %command_line, "executing command");

        let mut cmd = shell_command(command_line);
        if let Some(dir) = &self.workdir {
            cmd.current_dir(dir);
        }

        let output = run_command(cmd, self.timeout, self.output_limit_bytes)
            .with_context(|| format!("run `{command_line}`"))?;
        if !output.success {
            warn!(
                command = %command_line,
                exit_code = ?output.exit_code,
                timed_out = output.timed_out,
                "command did not succeed"
            );
        }
        Ok(output)
    }
}

#[cfg(unix)]
fn shell_command(command_line: &str) -> Command {
    let mut cmd = Command::new("/bin/sh");
    cmd.arg("-c").arg(command_line);
    cmd
}

/// `cmd.exe` does its own parsing, so the line must reach it unquoted.
#[cfg(windows)]
fn shell_command(command_line: &str) -> Command {
    use std::os::windows::process::CommandExt;

    let mut cmd = Command::new("cmd.exe");
    cmd.arg("/C").raw_arg(command_line);
    cmd
}
