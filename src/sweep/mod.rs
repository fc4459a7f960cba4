//! Sweep orchestration: find deletable branches, confirm, delete.
//!
//! The status-check batch and the deletion batch never overlap; the check
//! runs to completion, the user confirms, then deletions run.

mod check;
mod delete;

pub use check::{BranchResult, CheckOutcome, DEFAULT_CHECK_CONCURRENCY, check_branches};
pub use delete::{
    BranchDeleter, DEFAULT_DELETE_CONCURRENCY, DeleteOutcome, DeleteReason, DeleteSummary, delete_branches,
};

use std::sync::Arc;
use std::time::Duration;

use colored::*;
use log::info;

use crate::error::Result;
use crate::git::{self, BranchFilter, GitRepo};
use crate::github::{PrState, PrStateLookup};
use crate::ui::{ConfirmPrompt, Reporter};

/// Pause shown in untracked mode before the candidate list appears.
const UNTRACKED_SCAN_DELAY: Duration = Duration::from_millis(400);

/// Knobs for one sweep run.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    pub check_concurrency: usize,
    pub delete_concurrency: usize,
    /// Extra protected branch names on top of main/master/current
    pub protected: Vec<String>,
    pub dry_run: bool,
    pub untracked_delay: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            check_concurrency: DEFAULT_CHECK_CONCURRENCY,
            delete_concurrency: DEFAULT_DELETE_CONCURRENCY,
            protected: Vec::new(),
            dry_run: false,
            untracked_delay: UNTRACKED_SCAN_DELAY,
        }
    }
}

/// Drives a full sweep against one repository.
pub struct Sweeper {
    repo: GitRepo,
    lookup: Arc<dyn PrStateLookup>,
    reporter: Arc<dyn Reporter>,
    prompt: Arc<dyn ConfirmPrompt>,
    config: SweepConfig,
}

impl Sweeper {
    pub fn new(
        repo: GitRepo,
        lookup: Arc<dyn PrStateLookup>,
        reporter: Arc<dyn Reporter>,
        prompt: Arc<dyn ConfirmPrompt>,
        config: SweepConfig,
    ) -> Self {
        Self {
            repo,
            lookup,
            reporter,
            prompt,
            config,
        }
    }

    /// Default mode: delete tracked branches whose PR is merged or closed.
    pub async fn sweep_merged(&self) -> Result<()> {
        let current = self.repo.current_branch().await?;
        let branches = git::list(
            &self.repo,
            BranchFilter::Tracked,
            &current,
            &self.config.protected,
            self.reporter.as_ref(),
        )
        .await;

        if branches.is_empty() {
            self.reporter.success("No branches to check");
            return Ok(());
        }

        let names: Vec<String> = branches.into_iter().map(|b| b.name).collect();
        self.reporter.phase(&format!("Checking {} branches...", names.len()));
        let outcome = check_branches(&names, Arc::clone(&self.lookup), self.config.check_concurrency).await;
        self.reporter.clear();

        self.print_results(&outcome.results);

        if outcome.to_delete.is_empty() {
            self.reporter.success("Nothing to delete");
            return Ok(());
        }

        self.finish_sweep(&outcome.to_delete).await
    }

    /// Untracked mode: delete local-only branches.
    ///
    /// There is no PR to consult for a branch that was never pushed, so
    /// every untracked branch is a candidate. The short scan delay keeps
    /// the phase output from flashing past.
    pub async fn sweep_untracked(&self) -> Result<()> {
        let current = self.repo.current_branch().await?;
        let branches = git::list(
            &self.repo,
            BranchFilter::Untracked,
            &current,
            &self.config.protected,
            self.reporter.as_ref(),
        )
        .await;

        if branches.is_empty() {
            self.reporter.success("No untracked branches");
            return Ok(());
        }

        self.reporter
            .phase(&format!("Scanning {} untracked branches...", branches.len()));
        tokio::time::sleep(self.config.untracked_delay).await;
        self.reporter.clear();

        for branch in &branches {
            println!("  {} {}  {}", "✓".green(), branch.name, "local only".dimmed());
        }

        let names: Vec<String> = branches.into_iter().map(|b| b.name).collect();
        self.finish_sweep(&names).await
    }

    /// Count mode: tallies only, no PR queries and no deletions.
    pub async fn print_counts(&self) -> Result<()> {
        let current = self.repo.current_branch().await?;
        let branches = git::list(
            &self.repo,
            BranchFilter::All,
            &current,
            &self.config.protected,
            self.reporter.as_ref(),
        )
        .await;

        let tracked = branches.iter().filter(|b| b.is_tracked()).count();
        let untracked = branches.len() - tracked;
        println!("tracked: {}", tracked);
        println!("untracked: {}", untracked);
        println!("total: {}", branches.len());
        Ok(())
    }

    /// Shared tail of both modes: dry-run report or confirm-then-delete.
    async fn finish_sweep(&self, candidates: &[String]) -> Result<()> {
        if self.config.dry_run {
            self.reporter
                .warn(&format!("Dry run: would delete {} branches", candidates.len()));
            for name in candidates {
                println!("  {}", name);
            }
            return Ok(());
        }

        let question = format!("Delete {} branches?", candidates.len());
        if !self.prompt.confirm(&question).await {
            info!("deletion declined");
            self.reporter.warn("Aborted, nothing deleted");
            return Ok(());
        }

        self.reporter.phase(&format!("Deleting {} branches...", candidates.len()));
        let summary = delete_branches(
            candidates,
            Arc::new(self.repo.clone()) as Arc<dyn BranchDeleter>,
            self.config.delete_concurrency,
        )
        .await;
        self.reporter.clear();

        self.report_deletions(&summary);
        Ok(())
    }

    fn print_results(&self, results: &[BranchResult]) {
        for result in results {
            let line = format!("{} {}  {}", result.state.icon(), result.name, result.state.label());
            let styled = match result.state {
                PrState::Merged | PrState::Closed => line.green(),
                PrState::Open => line.normal(),
                PrState::None => line.dimmed(),
                PrState::Timeout => line.yellow(),
                PrState::Error => line.red(),
            };
            println!("  {}", styled);
        }
    }

    fn report_deletions(&self, summary: &DeleteSummary) {
        let failures = summary.failures();
        if failures.is_empty() {
            self.reporter
                .success(&format!("Deleted {} branches", summary.succeeded()));
            return;
        }

        self.reporter.warn(&format!(
            "Deleted {} branches, {} failed",
            summary.succeeded(),
            summary.failed()
        ));
        for outcome in failures {
            match outcome.reason {
                DeleteReason::TimedOut => {
                    println!("  {} {}", outcome.name, "(timed out, try again)".yellow());
                }
                _ => {
                    println!("  {} {}", outcome.name, "(failed)".red());
                }
            }
        }
    }
}
