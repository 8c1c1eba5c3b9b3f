//! External process execution with streamed output and cancellation.
//!
//! The [`ProcessRunner`] trait abstracts process execution, enabling:
//! - Real child processes via [`ShellRunner`]
//! - Mock implementations for testing the reconciliation engine
//!
//! This module is the only place in the crate that spawns OS processes.

use std::io::{BufRead, BufReader, Read};
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use crate::error::{Error, Result};

/// How often the wait loop checks the cancellation flag.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Cooperative cancellation flag shared between a caller and a running
/// reconciliation.
///
/// Clones share the same underlying flag. Cancellation does not abort the
/// calling flow directly; the runner notices the flag mid-wait, terminates
/// the child process and surfaces [`Error::Cancelled`].
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a new, unfired token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire the token. All clones observe the signal.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Check whether the token has fired.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Exit status and accumulated combined output of one finished process.
#[derive(Debug, Clone)]
pub struct ProcessResult {
    /// Exit code reported by the OS (-1 if terminated by a signal)
    pub exit_code: i32,
    /// Combined stdout and stderr, in emission order
    pub output: String,
}

impl ProcessResult {
    /// Check if the process exited successfully.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Abstraction over external process execution.
///
/// `arguments` is a single pre-built command line (see [`crate::cmdline`]),
/// not an argument vector; choco is driven through the platform shell's
/// quoting grammar. The callback receives each output line as it arrives,
/// in emission order, before the accumulated buffer is returned.
pub trait ProcessRunner: Send + Sync {
    /// Run a command to completion, streaming its combined output.
    ///
    /// Fails with [`Error::Spawn`] if the process cannot be started and
    /// [`Error::Cancelled`] if the token fires before natural completion.
    /// On cancellation the child is terminated best-effort; a failed
    /// termination never masks the cancellation itself.
    fn run(
        &self,
        command: &str,
        arguments: &str,
        on_line: &mut dyn FnMut(&str),
        cancel: &CancelToken,
    ) -> Result<ProcessResult>;
}

/// Runner that spawns real child processes.
pub struct ShellRunner;

impl ProcessRunner for ShellRunner {
    fn run(
        &self,
        command: &str,
        arguments: &str,
        on_line: &mut dyn FnMut(&str),
        cancel: &CancelToken,
    ) -> Result<ProcessResult> {
        let mut child = build_command(command, arguments)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::Spawn {
                message: format!("failed to start {command}"),
                source: e,
            })?;

        // One reader thread per pipe; lines are funneled through a channel
        // so the caller sees them in arrival order while the main thread
        // keeps polling the cancellation flag.
        let (tx, rx) = mpsc::channel::<String>();
        let mut readers = Vec::new();
        if let Some(stdout) = child.stdout.take() {
            readers.push(spawn_line_reader(stdout, tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(spawn_line_reader(stderr, tx.clone()));
        }
        drop(tx);

        let mut output = String::new();
        loop {
            if cancel.is_cancelled() {
                terminate(&mut child);
                return Err(Error::Cancelled);
            }
            match rx.recv_timeout(POLL_INTERVAL) {
                Ok(line) => {
                    on_line(&line);
                    output.push_str(&line);
                    output.push('\n');
                }
                Err(RecvTimeoutError::Timeout) => {}
                // Both pipes closed; the process is done writing.
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        let status = loop {
            if cancel.is_cancelled() {
                terminate(&mut child);
                return Err(Error::Cancelled);
            }
            match child.try_wait()? {
                Some(status) => break status,
                None => thread::sleep(POLL_INTERVAL),
            }
        };

        for reader in readers {
            let _ = reader.join();
        }

        Ok(ProcessResult {
            exit_code: status.code().unwrap_or(-1),
            output,
        })
    }
}

/// Kill the child and reap it, swallowing any termination error.
fn terminate(child: &mut std::process::Child) {
    let _ = child.kill();
    let _ = child.wait();
}

fn spawn_line_reader<R>(stream: R, tx: mpsc::Sender<String>) -> thread::JoinHandle<()>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let reader = BufReader::new(stream);
        for line in reader.lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    })
}

/// Build the platform command for a program and a pre-built argument string.
///
/// On Windows the argument string is passed through verbatim, matching the
/// escaping grammar used by [`crate::cmdline`]. Elsewhere it goes through
/// `sh -c` so the crate stays exercisable on any host.
#[cfg(windows)]
fn build_command(program: &str, arguments: &str) -> Command {
    use std::os::windows::process::CommandExt;
    let mut cmd = Command::new(program);
    cmd.raw_arg(arguments);
    cmd
}

#[cfg(not(windows))]
fn build_command(program: &str, arguments: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(format!("{program} {arguments}"));
    cmd
}

/// Find the choco executable path.
pub fn find_choco() -> Result<String> {
    // Standard install location, also exported by the installer
    if let Ok(root) = std::env::var("ChocolateyInstall") {
        let candidate = std::path::Path::new(&root).join("bin").join("choco.exe");
        if candidate.exists() {
            return Ok(candidate.to_string_lossy().into_owned());
        }
    }

    let paths = [r"C:\ProgramData\chocolatey\bin\choco.exe"];
    for path in &paths {
        if std::path::Path::new(path).exists() {
            return Ok((*path).to_string());
        }
    }

    // Fall back to PATH lookup
    let finder = if cfg!(windows) { "where" } else { "which" };
    let output = Command::new(finder)
        .arg("choco")
        .output()
        .map_err(|_| Error::ChocoNotFound)?;

    if output.status.success() {
        let path = String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();
        if !path.is_empty() {
            return Ok(path);
        }
    }

    Err(Error::ChocoNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_token_shared_across_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_process_result_success() {
        let ok = ProcessResult {
            exit_code: 0,
            output: String::new(),
        };
        assert!(ok.success());
        let failed = ProcessResult {
            exit_code: 1,
            output: String::new(),
        };
        assert!(!failed.success());
    }

    #[cfg(unix)]
    #[test]
    fn test_shell_runner_streams_lines_in_order() {
        let mut lines = Vec::new();
        let result = ShellRunner
            .run(
                "printf",
                "'one\\ntwo\\n'",
                &mut |line| lines.push(line.to_string()),
                &CancelToken::new(),
            )
            .unwrap();

        assert_eq!(result.exit_code, 0);
        assert_eq!(lines, vec!["one", "two"]);
        assert_eq!(result.output, "one\ntwo\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_shell_runner_reports_exit_code() {
        let result = ShellRunner
            .run("exit", "3", &mut |_| {}, &CancelToken::new())
            .unwrap();
        assert_eq!(result.exit_code, 3);
        assert!(!result.success());
    }

    #[cfg(unix)]
    #[test]
    fn test_shell_runner_cancellation_kills_child() {
        let token = CancelToken::new();
        token.cancel();

        let start = std::time::Instant::now();
        let err = ShellRunner
            .run("sleep", "30", &mut |_| {}, &token)
            .unwrap_err();

        assert!(err.is_cancelled());
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}
