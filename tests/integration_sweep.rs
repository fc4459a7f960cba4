//! End-to-end sweep tests against real scratch repositories.
//!
//! Git runs for real (with a local bare remote for tracked branches); the
//! PR lookups and confirmation prompts are scripted.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use sweepr::Result;
use sweepr::git::GitRepo;
use sweepr::github::{PrState, PrStateLookup};
use sweepr::sweep::{SweepConfig, Sweeper};
use sweepr::ui::{NullReporter, ScriptedConfirm};

/// Lookup returning scripted states and counting how often it was asked.
struct ScriptedLookup {
    states: HashMap<String, PrState>,
    calls: AtomicUsize,
}

impl ScriptedLookup {
    fn new(states: &[(&str, PrState)]) -> Self {
        Self {
            states: states.iter().map(|(n, s)| (n.to_string(), *s)).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PrStateLookup for ScriptedLookup {
    async fn pr_state(&self, branch: &str) -> Result<PrState> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.states.get(branch).copied().unwrap_or(PrState::None))
    }
}

fn git(cwd: &Path, args: &[&str]) {
    let output = Command::new("git").args(args).current_dir(cwd).output().unwrap();
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Work repo with a local bare remote, so branches can carry upstreams.
fn setup_repo_with_remote() -> (TempDir, PathBuf) {
    let temp = TempDir::new().unwrap();
    git(temp.path(), &["init", "--bare", "remote.git"]);

    let work = temp.path().join("work");
    std::fs::create_dir(&work).unwrap();
    git(&work, &["init", "-b", "main"]);
    git(&work, &["config", "user.email", "test@test.com"]);
    git(&work, &["config", "user.name", "Test"]);

    std::fs::write(work.join("README.md"), "# Test").unwrap();
    git(&work, &["add", "."]);
    git(&work, &["commit", "-m", "Initial commit"]);

    let remote = temp.path().join("remote.git");
    git(&work, &["remote", "add", "origin", remote.to_str().unwrap()]);
    git(&work, &["push", "-u", "origin", "main"]);

    (temp, work)
}

fn add_tracked_branch(work: &Path, name: &str) {
    git(work, &["branch", name]);
    git(work, &["push", "-u", "origin", name]);
}

fn add_local_branch(work: &Path, name: &str) {
    git(work, &["branch", name]);
}

fn branch_exists(work: &Path, name: &str) -> bool {
    let output = Command::new("git")
        .args(["branch", "--list", name])
        .current_dir(work)
        .output()
        .unwrap();
    !output.stdout.is_empty()
}

fn sweeper(
    work: &Path,
    lookup: Arc<ScriptedLookup>,
    prompt: Arc<ScriptedConfirm>,
    dry_run: bool,
) -> Sweeper {
    let repo = GitRepo::new(work, Duration::from_secs(30));
    Sweeper::new(
        repo,
        lookup,
        Arc::new(NullReporter),
        prompt,
        SweepConfig {
            dry_run,
            untracked_delay: Duration::ZERO,
            ..SweepConfig::default()
        },
    )
}

#[tokio::test]
async fn test_sweep_deletes_merged_and_keeps_open() {
    let (_temp, work) = setup_repo_with_remote();
    add_tracked_branch(&work, "feat-merged");
    add_tracked_branch(&work, "feat-open");

    let lookup = Arc::new(ScriptedLookup::new(&[
        ("feat-merged", PrState::Merged),
        ("feat-open", PrState::Open),
    ]));
    let prompt = Arc::new(ScriptedConfirm::new(true));

    sweeper(&work, Arc::clone(&lookup), Arc::clone(&prompt), false)
        .sweep_merged()
        .await
        .unwrap();

    assert!(!branch_exists(&work, "feat-merged"));
    assert!(branch_exists(&work, "feat-open"));
    assert_eq!(lookup.calls(), 2);
    assert_eq!(prompt.times_asked(), 1);
}

#[tokio::test]
async fn test_declining_confirmation_deletes_nothing() {
    let (_temp, work) = setup_repo_with_remote();
    add_tracked_branch(&work, "feat-merged");

    let lookup = Arc::new(ScriptedLookup::new(&[("feat-merged", PrState::Merged)]));
    let prompt = Arc::new(ScriptedConfirm::new(false));

    sweeper(&work, lookup, Arc::clone(&prompt), false)
        .sweep_merged()
        .await
        .unwrap();

    assert!(branch_exists(&work, "feat-merged"));
    assert_eq!(prompt.times_asked(), 1);
}

#[tokio::test]
async fn test_dry_run_never_prompts_or_deletes() {
    let (_temp, work) = setup_repo_with_remote();
    add_tracked_branch(&work, "feat-merged");

    let lookup = Arc::new(ScriptedLookup::new(&[("feat-merged", PrState::Merged)]));
    let prompt = Arc::new(ScriptedConfirm::new(true));

    sweeper(&work, lookup, Arc::clone(&prompt), true)
        .sweep_merged()
        .await
        .unwrap();

    assert!(branch_exists(&work, "feat-merged"));
    assert_eq!(prompt.times_asked(), 0);
}

#[tokio::test]
async fn test_closed_pr_branch_is_deleted_too() {
    let (_temp, work) = setup_repo_with_remote();
    add_tracked_branch(&work, "feat-closed");
    add_tracked_branch(&work, "feat-no-pr");

    let lookup = Arc::new(ScriptedLookup::new(&[("feat-closed", PrState::Closed)]));
    let prompt = Arc::new(ScriptedConfirm::new(true));

    sweeper(&work, lookup, prompt, false).sweep_merged().await.unwrap();

    assert!(!branch_exists(&work, "feat-closed"));
    assert!(branch_exists(&work, "feat-no-pr"));
}

#[tokio::test]
async fn test_untracked_mode_skips_pr_queries() {
    let (_temp, work) = setup_repo_with_remote();
    add_local_branch(&work, "scratch-1");
    add_local_branch(&work, "scratch-2");
    add_tracked_branch(&work, "feat-tracked");

    let lookup = Arc::new(ScriptedLookup::new(&[]));
    let prompt = Arc::new(ScriptedConfirm::new(true));

    sweeper(&work, Arc::clone(&lookup), prompt, false)
        .sweep_untracked()
        .await
        .unwrap();

    assert!(!branch_exists(&work, "scratch-1"));
    assert!(!branch_exists(&work, "scratch-2"));
    // Tracked branches are out of scope for untracked mode
    assert!(branch_exists(&work, "feat-tracked"));
    assert_eq!(lookup.calls(), 0);
}

#[tokio::test]
async fn test_no_tracked_branches_is_a_clean_noop() {
    let (_temp, work) = setup_repo_with_remote();
    add_local_branch(&work, "local-only");

    let lookup = Arc::new(ScriptedLookup::new(&[]));
    let prompt = Arc::new(ScriptedConfirm::new(true));

    sweeper(&work, Arc::clone(&lookup), Arc::clone(&prompt), false)
        .sweep_merged()
        .await
        .unwrap();

    assert_eq!(lookup.calls(), 0);
    assert_eq!(prompt.times_asked(), 0);
    assert!(branch_exists(&work, "local-only"));
}

#[tokio::test]
async fn test_current_branch_never_a_candidate() {
    let (_temp, work) = setup_repo_with_remote();
    // main is both current and protected; give it a PR state anyway
    let lookup = Arc::new(ScriptedLookup::new(&[("main", PrState::Merged)]));
    let prompt = Arc::new(ScriptedConfirm::new(true));

    sweeper(&work, Arc::clone(&lookup), prompt, false)
        .sweep_merged()
        .await
        .unwrap();

    assert!(branch_exists(&work, "main"));
    assert_eq!(lookup.calls(), 0);
}

#[tokio::test]
async fn test_print_counts() {
    let (_temp, work) = setup_repo_with_remote();
    add_tracked_branch(&work, "feat-tracked");
    add_local_branch(&work, "local-only");

    let lookup = Arc::new(ScriptedLookup::new(&[]));
    let prompt = Arc::new(ScriptedConfirm::new(true));

    sweeper(&work, Arc::clone(&lookup), prompt, false)
        .print_counts()
        .await
        .unwrap();

    assert_eq!(lookup.calls(), 0);
}
