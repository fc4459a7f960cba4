//! Per-branch pull request state lookup.
//!
//! One `gh pr view` query per branch, with a shorter timeout than the
//! default because many run per sweep. A query that times out or fails
//! degrades to a state value instead of an error, so one bad branch never
//! takes down its siblings.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use serde::Deserialize;

use crate::error::Result;
use crate::exec::{self, CommandOutcome, ExecOptions, shell_quote};

/// PR queries run with a tighter deadline than ordinary commands.
pub const PR_QUERY_TIMEOUT_MS: u64 = 10_000;

/// Resolved pull request state for a branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrState {
    Merged,
    Closed,
    Open,
    /// No PR exists, or the query returned nothing usable
    None,
    /// The query exceeded its deadline
    Timeout,
    /// The query itself failed in some other way
    Error,
}

impl PrState {
    /// Map the `state` field of `gh pr view --json state` to a variant.
    pub fn from_api_state(state: &str) -> Self {
        match state {
            "MERGED" => PrState::Merged,
            "CLOSED" => PrState::Closed,
            "OPEN" => PrState::Open,
            _ => PrState::None,
        }
    }

    /// Only merged and closed PRs make their branch safe to delete.
    pub fn is_deletable(&self) -> bool {
        matches!(self, PrState::Merged | PrState::Closed)
    }

    pub fn icon(&self) -> &'static str {
        match self {
            PrState::Merged | PrState::Closed => "✓",
            PrState::Open => "○",
            PrState::None => "–",
            PrState::Timeout => "⏱",
            PrState::Error => "✗",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PrState::Merged => "merged",
            PrState::Closed => "closed",
            PrState::Open => "open",
            PrState::None => "no PR",
            PrState::Timeout => "timed out",
            PrState::Error => "error",
        }
    }
}

#[derive(Debug, Deserialize)]
struct PrView {
    state: String,
}

/// Seam between the batch processor and GitHub.
///
/// The production implementation shells out to `gh`; tests script the
/// responses.
#[async_trait]
pub trait PrStateLookup: Send + Sync {
    async fn pr_state(&self, branch: &str) -> Result<PrState>;
}

/// `gh pr view`-backed lookup.
#[derive(Debug, Clone)]
pub struct GhPrLookup {
    repo_root: PathBuf,
    timeout: Duration,
}

impl GhPrLookup {
    pub fn new(repo_root: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            repo_root: repo_root.into(),
            timeout,
        }
    }
}

#[async_trait]
impl PrStateLookup for GhPrLookup {
    async fn pr_state(&self, branch: &str) -> Result<PrState> {
        let cmd = format!("gh pr view {} --json state", shell_quote(branch));
        let opts = ExecOptions::silent_with_timeout(self.timeout);

        let state = match exec::run(&cmd, &self.repo_root, &opts).await? {
            CommandOutcome::Output(raw) => match serde_json::from_str::<PrView>(&raw) {
                Ok(view) => PrState::from_api_state(&view.state),
                Err(e) => {
                    debug!("unparseable gh payload for {}: {}", branch, e);
                    PrState::None
                }
            },
            CommandOutcome::TimedOut => PrState::Timeout,
            // gh exits non-zero when the branch has no PR
            CommandOutcome::Failed => PrState::None,
        };

        debug!("pr state for {}: {:?}", branch, state);
        Ok(state)
    }
}
