//! Branch listing parse and tracked/untracked classification.
//!
//! The raw listing comes from `git for-each-ref` as `name upstream` pairs,
//! one per line, with an empty upstream column for local-only branches.

use log::warn;

use crate::exec::CommandOutcome;
use crate::git::GitRepo;
use crate::ui::Reporter;

/// Which subset of branches a listing should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchFilter {
    /// Branches with a configured upstream
    Tracked,
    /// Branches with no upstream
    Untracked,
    /// Both
    All,
}

impl BranchFilter {
    fn describe(&self) -> &'static str {
        match self {
            BranchFilter::Tracked => "tracked branches",
            BranchFilter::Untracked => "untracked branches",
            BranchFilter::All => "branches",
        }
    }
}

/// A local branch and its upstream, if one is configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub name: String,
    pub upstream: Option<String>,
}

impl Branch {
    pub fn is_tracked(&self) -> bool {
        self.upstream.is_some()
    }
}

/// Parse a `name upstream` listing into branches, dropping protected ones.
///
/// Protected means `main`, `master`, the current branch, or any name in
/// `protected`. Columns are separated by a whitespace run of any width, so
/// aligned output parses the same as single-space output. Input order is
/// preserved.
pub fn parse_branch_listing(raw: &str, current: &str, protected: &[String]) -> Vec<Branch> {
    raw.lines()
        .filter_map(|line| {
            let mut columns = line.split_whitespace();
            let name = columns.next()?;
            if name == "main" || name == "master" || name == current || protected.iter().any(|p| p == name) {
                return None;
            }
            let upstream = columns.next().map(str::to_string);
            Some(Branch {
                name: name.to_string(),
                upstream,
            })
        })
        .collect()
}

/// List the branches matching `filter`, excluding protected ones.
///
/// Listing failures never propagate: they are reported and yield an empty
/// list, so one bad listing doesn't abort the run.
pub async fn list(repo: &GitRepo, filter: BranchFilter, current: &str, protected: &[String], reporter: &dyn Reporter) -> Vec<Branch> {
    let listing = match repo.branch_upstream_listing().await {
        CommandOutcome::Output(raw) => raw,
        CommandOutcome::TimedOut => {
            warn!("branch listing timed out");
            reporter.error(&format!("Timed out listing {}", filter.describe()));
            return Vec::new();
        }
        CommandOutcome::Failed => {
            warn!("branch listing failed");
            reporter.error(&format!("Failed to list {}", filter.describe()));
            return Vec::new();
        }
    };

    parse_branch_listing(&listing, current, protected)
        .into_iter()
        .filter(|branch| match filter {
            BranchFilter::Tracked => branch.is_tracked(),
            BranchFilter::Untracked => !branch.is_tracked(),
            BranchFilter::All => true,
        })
        .collect()
}
