//! Spawning package-manager processes with bounded output capture.

use std::io::{self, Read};
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, error, instrument, warn};
use wait_timeout::ChildExt;

/// Default cap on captured stdout/stderr per command (5000 KiB).
pub const DEFAULT_OUTPUT_LIMIT_BYTES: usize = 5000 * 1024;

/// Captured child process output.
///
/// A non-zero exit is reported through `success`, never as an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub stdout_truncated: usize,
    pub stderr_truncated: usize,
    pub timed_out: bool,
}

impl CommandOutput {
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }

    /// Short human-readable reason for a failed command.
    pub fn failure_reason(&self) -> String {
        if self.timed_out {
            return "timed out".to_string();
        }
        let stderr = self.stderr_text();
        let last_line = stderr.lines().rev().find(|line| !line.trim().is_empty());
        match (self.exit_code, last_line) {
            (Some(code), Some(line)) => format!("exit code {code}: {}", line.trim()),
            (Some(code), None) => format!("exit code {code}"),
            (None, Some(line)) => format!("terminated by signal: {}", line.trim()),
            (None, None) => "terminated by signal".to_string(),
        }
    }
}

/// Bytes kept from one output stream, plus how many were dropped past the cap.
struct Captured {
    bytes: Vec<u8>,
    dropped: usize,
}

/// Run a command to completion and capture stdout/stderr.
///
/// Both pipes are drained on reader threads while the child runs, so a chatty
/// child never blocks on a full pipe. At most `output_limit_bytes` of each
/// stream is kept. Without a `timeout` the call waits indefinitely; with one,
/// the child and everything it spawned are killed once it elapses.
#[instrument(skip_all, fields(timeout = ?timeout, output_limit_bytes))]
pub fn run_command(
    mut cmd: Command,
    timeout: Option<Duration>,
    output_limit_bytes: usize,
) -> Result<CommandOutput> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if timeout.is_some() {
        isolate_process_group(&mut cmd);
    }

    debug!("spawning child process");
    let mut child = cmd.spawn().map_err(|e| {
        error!(err = %e, "failed to spawn command");
        anyhow::Error::new(e).context("spawn command")
    })?;

    let stdout_reader = spawn_capture(child.stdout.take(), output_limit_bytes)?;
    let stderr_reader = spawn_capture(child.stderr.take(), output_limit_bytes)?;

    let mut timed_out = false;
    let status = match timeout {
        None => child.wait().context("wait for command")?,
        Some(limit) => match child.wait_timeout(limit).context("wait for command")? {
            Some(status) => status,
            None => {
                warn!(timeout_secs = limit.as_secs(), "command timed out, killing");
                timed_out = true;
                kill_process_tree(&mut child)?;
                child.wait().context("wait command after kill")?
            }
        },
    };

    let stdout = finish_capture(stdout_reader, "stdout")?;
    let stderr = finish_capture(stderr_reader, "stderr")?;
    if stdout.dropped > 0 || stderr.dropped > 0 {
        warn!(
            stdout_truncated = stdout.dropped,
            stderr_truncated = stderr.dropped,
            "output truncated"
        );
    }

    debug!(exit_code = ?status.code(), timed_out, "command finished");
    Ok(CommandOutput {
        success: status.success() && !timed_out,
        exit_code: status.code(),
        stdout: stdout.bytes,
        stderr: stderr.bytes,
        stdout_truncated: stdout.dropped,
        stderr_truncated: stderr.dropped,
        timed_out,
    })
}

fn spawn_capture<R: Read + Send + 'static>(
    pipe: Option<R>,
    limit: usize,
) -> Result<JoinHandle<io::Result<Captured>>> {
    let pipe = pipe.ok_or_else(|| anyhow!("child output was not piped"))?;
    Ok(thread::spawn(move || capture(pipe, limit)))
}

fn finish_capture(reader: JoinHandle<io::Result<Captured>>, stream: &str) -> Result<Captured> {
    reader
        .join()
        .map_err(|_| anyhow!("{stream} reader thread panicked"))?
        .with_context(|| format!("read {stream}"))
}

/// Keep the first `limit` bytes of `reader`, then drain and count the rest.
fn capture<R: Read>(mut reader: R, limit: usize) -> io::Result<Captured> {
    let mut bytes = Vec::new();
    reader.by_ref().take(limit as u64).read_to_end(&mut bytes)?;
    let dropped = io::copy(&mut reader, &mut io::sink())?;
    Ok(Captured {
        bytes,
        dropped: usize::try_from(dropped).unwrap_or(usize::MAX),
    })
}

/// Put the child in its own process group so a timeout can kill its descendants.
#[cfg(unix)]
fn isolate_process_group(cmd: &mut Command) {
    use std::os::unix::process::CommandExt;
    cmd.process_group(0);
}

#[cfg(not(unix))]
fn isolate_process_group(_cmd: &mut Command) {}

// Grandchildren (npm under `sh -c`) hold the output pipes open, so killing
// only the shell would leave the reader threads blocked.
#[cfg(unix)]
fn kill_process_tree(child: &mut Child) -> Result<()> {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let pgid = i32::try_from(child.id()).context("child pid out of range")?;
    killpg(Pid::from_raw(pgid), Signal::SIGKILL).context("kill command process group")
}

#[cfg(not(unix))]
fn kill_process_tree(child: &mut Child) -> Result<()> {
    child.kill().context("kill command")
}
