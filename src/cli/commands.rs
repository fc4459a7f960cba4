//! CLI definitions using clap.

use clap::Parser;
use std::path::PathBuf;

/// sweepr - delete local branches whose GitHub PRs are merged or closed
#[derive(Parser, Debug)]
#[command(name = "sweepr")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Working directory to operate in
    #[arg(value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Show what would be deleted without deleting anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Delete untracked local branches instead of PR-backed ones
    #[arg(short, long)]
    pub untracked: bool,

    /// Print branch counts and exit
    #[arg(long)]
    pub count: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Optional config file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}
