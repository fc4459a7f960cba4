//! Git subprocess wrapper scoped to a repository root.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, SweeprError};
use crate::exec::{self, CommandOutcome, ExecOptions};

/// Handle to a local git repository.
///
/// All git commands run with the repository root as their working directory
/// and the configured per-command timeout.
#[derive(Debug, Clone)]
pub struct GitRepo {
    root: PathBuf,
    command_timeout: Duration,
}

impl GitRepo {
    pub fn new(root: impl Into<PathBuf>, command_timeout: Duration) -> Self {
        Self {
            root: root.into(),
            command_timeout,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn silent_opts(&self) -> ExecOptions {
        ExecOptions::silent_with_timeout(self.command_timeout)
    }

    /// Whether the root is inside a git work tree.
    pub async fn is_work_tree(&self) -> bool {
        match exec::run("git rev-parse --is-inside-work-tree", &self.root, &self.silent_opts()).await {
            Ok(CommandOutcome::Output(out)) => out == "true",
            _ => false,
        }
    }

    /// Name of the currently checked-out branch.
    ///
    /// Needed before any candidate list can be built, so failure here is a
    /// setup error rather than a fail-soft empty value.
    pub async fn current_branch(&self) -> Result<String> {
        match exec::run("git branch --show-current", &self.root, &self.silent_opts()).await? {
            CommandOutcome::Output(name) if !name.is_empty() => Ok(name),
            CommandOutcome::Output(_) => Err(SweeprError::Setup(
                "could not determine current branch (detached HEAD?)".to_string(),
            )),
            CommandOutcome::TimedOut => Err(SweeprError::Setup("current-branch query timed out".to_string())),
            CommandOutcome::Failed => Err(SweeprError::Setup("current-branch query failed".to_string())),
        }
    }

    /// Raw `name upstream` listing for all local branches, one per line.
    ///
    /// The upstream column is empty for branches with no configured upstream.
    pub async fn branch_upstream_listing(&self) -> CommandOutcome {
        let cmd = "git for-each-ref refs/heads --format='%(refname:short) %(upstream:short)'";
        exec::run(cmd, &self.root, &self.silent_opts())
            .await
            .unwrap_or(CommandOutcome::Failed)
    }

    /// Force-delete a local branch.
    pub async fn delete_branch(&self, name: &str) -> CommandOutcome {
        let cmd = format!("git branch -D {}", exec::shell_quote(name));
        exec::run(&cmd, &self.root, &self.silent_opts())
            .await
            .unwrap_or(CommandOutcome::Failed)
    }
}
