//! External command execution with per-command timeouts.
//!
//! Every git/gh invocation goes through [`run`]. Silent commands capture
//! their output and report a three-way [`CommandOutcome`]; non-silent
//! commands inherit the parent's stdio and propagate failure to the caller.

use std::process::Stdio;
use std::time::Duration;

use log::{debug, warn};
use tokio::process::Command;

use crate::error::{Result, SweeprError};

/// Default timeout applied when the caller doesn't override it.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// How a command is run: captured or inherited stdio, and for how long.
#[derive(Debug, Clone)]
pub struct ExecOptions {
    /// Capture and suppress output instead of streaming it to the terminal
    pub silent: bool,
    /// Kill the command if it runs longer than this
    pub timeout: Duration,
}

impl Default for ExecOptions {
    fn default() -> Self {
        Self {
            silent: false,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

impl ExecOptions {
    /// Silent execution with the default timeout.
    pub fn silent() -> Self {
        Self {
            silent: true,
            ..Self::default()
        }
    }

    /// Silent execution with a custom timeout.
    pub fn silent_with_timeout(timeout: Duration) -> Self {
        Self { silent: true, timeout }
    }
}

/// Result of a silent command.
///
/// Callers branch on all three arms: a timed-out query reads differently to
/// the user than one that plainly failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Command succeeded; trimmed stdout
    Output(String),
    /// Command was killed for exceeding its deadline
    TimedOut,
    /// Command failed for any other reason (non-zero exit, spawn error)
    Failed,
}

impl CommandOutcome {
    /// The captured stdout, if the command succeeded.
    pub fn output(&self) -> Option<&str> {
        match self {
            CommandOutcome::Output(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_timed_out(&self) -> bool {
        matches!(self, CommandOutcome::TimedOut)
    }
}

/// Single-quote `value` for safe interpolation into an `sh -c` string.
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}

/// Run `command` through `sh -c` in `cwd`.
///
/// Silent mode never returns `Err`: failures and timeouts come back as
/// [`CommandOutcome`] variants. Non-silent mode streams the command's stdio
/// to the terminal and fails with [`SweeprError::CommandExecution`] on any
/// non-success, timeout included.
pub async fn run(command: &str, cwd: &std::path::Path, opts: &ExecOptions) -> Result<CommandOutcome> {
    debug!("exec: {} (silent={}, timeout={:?})", command, opts.silent, opts.timeout);

    let (stdin, stdout, stderr) = if opts.silent {
        (Stdio::null(), Stdio::piped(), Stdio::piped())
    } else {
        (Stdio::inherit(), Stdio::inherit(), Stdio::inherit())
    };

    let spawned = Command::new("sh")
        .arg("-c")
        .arg(command)
        .current_dir(cwd)
        .stdin(stdin)
        .stdout(stdout)
        .stderr(stderr)
        .kill_on_drop(true)
        .spawn();

    let child = match spawned {
        Ok(child) => child,
        Err(e) if opts.silent => {
            warn!("failed to spawn '{}': {}", command, e);
            return Ok(CommandOutcome::Failed);
        }
        Err(e) => {
            return Err(SweeprError::CommandExecution(format!("failed to spawn '{}': {}", command, e)));
        }
    };

    // On timeout the wait future is dropped, and kill_on_drop reaps the child.
    match tokio::time::timeout(opts.timeout, child.wait_with_output()).await {
        Ok(Ok(output)) if output.status.success() => {
            let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
            Ok(CommandOutcome::Output(stdout))
        }
        Ok(Ok(output)) => {
            let code = output.status.code().unwrap_or(-1);
            if opts.silent {
                debug!("'{}' exited with code {}", command, code);
                Ok(CommandOutcome::Failed)
            } else {
                Err(SweeprError::CommandExecution(format!(
                    "'{}' exited with code {}",
                    command, code
                )))
            }
        }
        Ok(Err(e)) => {
            if opts.silent {
                warn!("'{}' wait failed: {}", command, e);
                Ok(CommandOutcome::Failed)
            } else {
                Err(SweeprError::CommandExecution(format!("'{}' wait failed: {}", command, e)))
            }
        }
        Err(_) => {
            if opts.silent {
                debug!("'{}' timed out after {:?}", command, opts.timeout);
                Ok(CommandOutcome::TimedOut)
            } else {
                Err(SweeprError::CommandExecution(format!(
                    "'{}' timed out after {:?}",
                    command, opts.timeout
                )))
            }
        }
    }
}
