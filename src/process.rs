//! External command execution.
//!
//! Commands are given as a single shell-interpreted string and only their
//! standard output is of interest. The [`CommandRunner`] trait is the seam
//! the rest of the crate talks to, so tests can substitute canned output.

use std::process::{Command, ExitStatus, Output, Stdio};

use tracing::debug;

/// Error type for command execution.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    /// The process could not be started at all.
    #[error("Error executing command: {command}")]
    Spawn {
        /// The command string that failed to start.
        command: String,
        /// Underlying spawn error.
        #[source]
        source: std::io::Error,
    },
    /// The process ran but exited unsuccessfully (strict mode only).
    #[error("Command `{command}` failed with {status}")]
    Failed {
        /// The command string that was run.
        command: String,
        /// Exit status reported by the process.
        status: ExitStatus,
    },
}

/// Something that can run a command line and hand back its stdout.
pub trait CommandRunner {
    /// Run `command` and return its standard output as text.
    fn run(&self, command: &str) -> Result<String, ProcessError>;
}

/// Runs commands through the platform shell.
#[derive(Debug, Clone, Copy)]
pub struct ShellRunner {
    /// Strip a single trailing newline from the captured output.
    pub strip_newline: bool,
    /// Treat a non-zero exit status as an error.
    pub strict: bool,
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self {
            strip_newline: true,
            strict: false,
        }
    }
}

impl ShellRunner {
    /// Create a runner that strips the trailing newline and ignores exit status.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style toggle for strict exit status checking.
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    fn output(command: &str) -> std::io::Result<Output> {
        shell_command(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
    }
}

impl CommandRunner for ShellRunner {
    fn run(&self, command: &str) -> Result<String, ProcessError> {
        debug!(command, "running command");

        let output = Self::output(command).map_err(|source| ProcessError::Spawn {
            command: command.to_string(),
            source,
        })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            debug!(command, stderr = %stderr.trim(), "command wrote to stderr");
        }

        if !output.status.success() {
            debug!(command, status = %output.status, "command exited unsuccessfully");
            if self.strict {
                return Err(ProcessError::Failed {
                    command: command.to_string(),
                    status: output.status,
                });
            }
        }

        let mut stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if self.strip_newline {
            strip_trailing_newline(&mut stdout);
        }
        Ok(stdout)
    }
}

#[cfg(windows)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", command]);
    cmd
}

#[cfg(not(windows))]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.args(["-c", command]);
    cmd
}

/// Remove one trailing line ending (`\n` or `\r\n`), if present.
pub fn strip_trailing_newline(text: &mut String) {
    if text.ends_with('\n') {
        text.pop();
        if text.ends_with('\r') {
            text.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_trailing_newline_single() {
        let mut s = "abc\n".to_string();
        strip_trailing_newline(&mut s);
        assert_eq!(s, "abc");
    }

    #[test]
    fn test_strip_trailing_newline_only_one() {
        let mut s = "abc\n\n".to_string();
        strip_trailing_newline(&mut s);
        assert_eq!(s, "abc\n");
    }

    #[test]
    fn test_strip_trailing_newline_crlf() {
        let mut s = "abc\r\n".to_string();
        strip_trailing_newline(&mut s);
        assert_eq!(s, "abc");
    }

    #[test]
    fn test_strip_trailing_newline_none() {
        let mut s = "abc".to_string();
        strip_trailing_newline(&mut s);
        assert_eq!(s, "abc");

        let mut empty = String::new();
        strip_trailing_newline(&mut empty);
        assert_eq!(empty, "");
    }

    #[test]
    fn test_shell_runner_captures_stdout() {
        let out = ShellRunner::new().run("echo hello").unwrap();
        assert_eq!(out, "hello");
    }

    #[test]
    fn test_shell_runner_keeps_newline_when_asked() {
        let runner = ShellRunner {
            strip_newline: false,
            strict: false,
        };
        let out = runner.run("echo hello").unwrap();
        assert!(out.starts_with("hello"));
        assert!(out.ends_with('\n'));
    }

    #[test]
    fn test_shell_runner_ignores_exit_status_by_default() {
        let out = ShellRunner::new().run("echo partial && exit 3").unwrap();
        assert_eq!(out, "partial");
    }

    #[test]
    fn test_shell_runner_strict_reports_failure() {
        let err = ShellRunner::new().strict(true).run("exit 3").unwrap_err();
        assert!(matches!(err, ProcessError::Failed { .. }));
        assert!(err.to_string().contains("exit 3"));
    }

    #[test]
    fn test_shell_runner_stderr_not_captured_into_output() {
        let out = ShellRunner::new().run("echo oops 1>&2").unwrap();
        assert_eq!(out, "");
    }

    #[test]
    fn test_process_error_display() {
        let err = ProcessError::Spawn {
            command: "git rev-parse HEAD".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no shell"),
        };
        assert_eq!(err.to_string(), "Error executing command: git rev-parse HEAD");
    }
}
