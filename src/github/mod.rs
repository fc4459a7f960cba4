//! GitHub access through the `gh` CLI.

mod pr;

pub use pr::{GhPrLookup, PR_QUERY_TIMEOUT_MS, PrState, PrStateLookup};

use std::path::Path;
use std::time::Duration;

use log::debug;

use crate::error::{Result, SweeprError};
use crate::exec::{self, CommandOutcome, ExecOptions};

/// Verify `gh` is installed and authenticated.
///
/// With `verbose` set, the auth check streams gh's own diagnostics straight
/// to the terminal. Failures here terminate the run; nothing downstream can
/// work without an authenticated `gh`.
pub async fn ensure_gh_ready(cwd: &Path, verbose: bool) -> Result<()> {
    let opts = ExecOptions::silent_with_timeout(Duration::from_secs(10));

    match exec::run("gh --version", cwd, &opts).await? {
        CommandOutcome::Output(version) => debug!("gh available: {}", version.lines().next().unwrap_or("")),
        _ => {
            return Err(SweeprError::Setup(
                "GitHub CLI (gh) not found; install it from https://cli.github.com".to_string(),
            ));
        }
    }

    if verbose {
        let loud = ExecOptions {
            silent: false,
            timeout: Duration::from_secs(10),
        };
        exec::run("gh auth status", cwd, &loud)
            .await
            .map_err(|e| SweeprError::Setup(format!("gh is not authenticated: {}", e)))?;
    } else if !matches!(exec::run("gh auth status", cwd, &opts).await?, CommandOutcome::Output(_)) {
        return Err(SweeprError::Setup(
            "gh is not authenticated; run `gh auth login`".to_string(),
        ));
    }

    Ok(())
}
