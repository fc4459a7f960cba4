//! Concurrent branch deletion.
//!
//! Same shared-cursor worker pool as the status check, with a lower
//! concurrency limit and a different unit of work. Timeouts and plain
//! failures both count as failed but are worded differently for the user.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::future::join_all;
use log::warn;

use crate::exec::CommandOutcome;
use crate::git::GitRepo;

/// Upper bound on concurrent deletions.
pub const DEFAULT_DELETE_CONCURRENCY: usize = 3;

/// Why a deletion ended the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteReason {
    Deleted,
    TimedOut,
    Failed,
}

/// Per-branch deletion outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub name: String,
    pub reason: DeleteReason,
}

impl DeleteOutcome {
    pub fn succeeded(&self) -> bool {
        self.reason == DeleteReason::Deleted
    }
}

/// Aggregate of one deletion batch, in candidate order.
#[derive(Debug, Default)]
pub struct DeleteSummary {
    pub outcomes: Vec<DeleteOutcome>,
}

impl DeleteSummary {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn failures(&self) -> Vec<&DeleteOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded()).collect()
    }
}

/// Seam between the deletion pool and git, so tests can script outcomes.
#[async_trait]
pub trait BranchDeleter: Send + Sync {
    async fn delete(&self, branch: &str) -> CommandOutcome;
}

#[async_trait]
impl BranchDeleter for GitRepo {
    async fn delete(&self, branch: &str) -> CommandOutcome {
        self.delete_branch(branch).await
    }
}

/// Delete `names` with at most `limit` concurrent `git branch -D` runs.
///
/// Workers claim indices from a shared cursor; each branch yields exactly
/// one outcome regardless of how its delete command ended.
pub async fn delete_branches(names: &[String], deleter: Arc<dyn BranchDeleter>, limit: usize) -> DeleteSummary {
    if names.is_empty() {
        return DeleteSummary::default();
    }

    let worker_count = limit.max(1).min(names.len());
    let names: Arc<Vec<String>> = Arc::new(names.to_vec());
    let cursor = Arc::new(AtomicUsize::new(0));
    let reasons: Arc<Mutex<HashMap<String, DeleteReason>>> = Arc::new(Mutex::new(HashMap::new()));

    let mut workers = Vec::with_capacity(worker_count);
    for _ in 0..worker_count {
        let names = Arc::clone(&names);
        let cursor = Arc::clone(&cursor);
        let reasons = Arc::clone(&reasons);
        let deleter = Arc::clone(&deleter);

        workers.push(tokio::spawn(async move {
            loop {
                let idx = cursor.fetch_add(1, Ordering::SeqCst);
                if idx >= names.len() {
                    break;
                }
                let name = &names[idx];

                let reason = match deleter.delete(name).await {
                    CommandOutcome::Output(_) => DeleteReason::Deleted,
                    CommandOutcome::TimedOut => DeleteReason::TimedOut,
                    CommandOutcome::Failed => DeleteReason::Failed,
                };
                reasons.lock().unwrap().insert(name.clone(), reason);
            }
        }));
    }

    for joined in join_all(workers).await {
        if let Err(e) = joined {
            warn!("delete worker panicked: {}", e);
        }
    }

    let reasons = reasons.lock().unwrap();
    let outcomes = names
        .iter()
        .map(|name| DeleteOutcome {
            name: name.clone(),
            reason: reasons.get(name).copied().unwrap_or(DeleteReason::Failed),
        })
        .collect();

    DeleteSummary { outcomes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::time::Duration;

    /// Deleter with scripted per-branch outcomes and concurrency accounting.
    struct ScriptedDeleter {
        timing_out: HashSet<String>,
        failing: HashSet<String>,
        calls: AtomicUsize,
        active: AtomicUsize,
        max_active: AtomicUsize,
    }

    impl ScriptedDeleter {
        fn new() -> Self {
            Self {
                timing_out: HashSet::new(),
                failing: HashSet::new(),
                calls: AtomicUsize::new(0),
                active: AtomicUsize::new(0),
                max_active: AtomicUsize::new(0),
            }
        }

        fn timing_out_on(mut self, name: &str) -> Self {
            self.timing_out.insert(name.to_string());
            self
        }

        fn failing_on(mut self, name: &str) -> Self {
            self.failing.insert(name.to_string());
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn max_active(&self) -> usize {
            self.max_active.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl BranchDeleter for ScriptedDeleter {
        async fn delete(&self, branch: &str) -> CommandOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_active.fetch_max(now_active, Ordering::SeqCst);

            tokio::time::sleep(Duration::from_millis(10)).await;
            self.active.fetch_sub(1, Ordering::SeqCst);

            if self.timing_out.contains(branch) {
                CommandOutcome::TimedOut
            } else if self.failing.contains(branch) {
                CommandOutcome::Failed
            } else {
                CommandOutcome::Output(format!("Deleted branch {}", branch))
            }
        }
    }

    fn branch_names(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[tokio::test]
    async fn test_all_deleted() {
        let names = branch_names(&["a", "b", "c"]);
        let deleter = Arc::new(ScriptedDeleter::new());

        let summary = delete_branches(&names, Arc::clone(&deleter) as Arc<dyn BranchDeleter>, 3).await;

        assert_eq!(summary.succeeded(), 3);
        assert_eq!(summary.failed(), 0);
        assert!(summary.failures().is_empty());
        assert_eq!(deleter.calls(), 3);
    }

    #[tokio::test]
    async fn test_timeout_counts_as_failed_with_distinct_reason() {
        let names = branch_names(&["ok", "stuck", "broken"]);
        let deleter = Arc::new(ScriptedDeleter::new().timing_out_on("stuck").failing_on("broken"));

        let summary = delete_branches(&names, deleter as Arc<dyn BranchDeleter>, 3).await;

        assert_eq!(summary.succeeded(), 1);
        assert_eq!(summary.failed(), 2);

        let failures = summary.failures();
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].name, "stuck");
        assert_eq!(failures[0].reason, DeleteReason::TimedOut);
        assert_eq!(failures[1].name, "broken");
        assert_eq!(failures[1].reason, DeleteReason::Failed);
    }

    #[tokio::test]
    async fn test_outcomes_in_candidate_order() {
        let names = branch_names(&["z", "a", "m"]);
        let deleter = Arc::new(ScriptedDeleter::new());

        let summary = delete_branches(&names, deleter as Arc<dyn BranchDeleter>, 2).await;

        let ordered: Vec<&str> = summary.outcomes.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(ordered, vec!["z", "a", "m"]);
    }

    #[tokio::test]
    async fn test_concurrency_capped() {
        let names = branch_names(&["a", "b", "c", "d", "e", "f", "g"]);
        let deleter = Arc::new(ScriptedDeleter::new());

        let summary = delete_branches(&names, Arc::clone(&deleter) as Arc<dyn BranchDeleter>, 3).await;

        assert_eq!(summary.outcomes.len(), 7);
        assert!(deleter.max_active() <= 3, "max active was {}", deleter.max_active());
    }

    #[tokio::test]
    async fn test_empty_candidates_issue_no_commands() {
        let deleter = Arc::new(ScriptedDeleter::new());
        let summary = delete_branches(&[], Arc::clone(&deleter) as Arc<dyn BranchDeleter>, 3).await;

        assert!(summary.outcomes.is_empty());
        assert_eq!(deleter.calls(), 0);
    }
}
