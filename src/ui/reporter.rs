//! Progress and status reporting.

use std::sync::Mutex;
use std::time::Duration;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};

/// Phase transitions and terminal outcomes.
///
/// Purely presentational: nothing in the sweep pipeline branches on what a
/// reporter does.
pub trait Reporter: Send + Sync {
    /// Announce a long-running phase ("Checking 12 branches...")
    fn phase(&self, message: &str);
    fn success(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
    fn debug(&self, message: &str);
    /// Drop any active phase indicator without printing an outcome
    fn clear(&self);
}

/// Spinner-backed console reporter.
///
/// Each `phase` call replaces the previous spinner; outcome calls stop it
/// and print a colored status line. Everything is mirrored to the log file.
pub struct ConsoleReporter {
    spinner: Mutex<Option<ProgressBar>>,
    verbose: bool,
}

impl ConsoleReporter {
    pub fn new(verbose: bool) -> Self {
        Self {
            spinner: Mutex::new(None),
            verbose,
        }
    }

    fn stop_spinner(&self) {
        if let Some(bar) = self.spinner.lock().unwrap().take() {
            bar.finish_and_clear();
        }
    }
}

impl Reporter for ConsoleReporter {
    fn phase(&self, message: &str) {
        info!("{}", message);
        self.stop_spinner();

        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        *self.spinner.lock().unwrap() = Some(bar);
    }

    fn success(&self, message: &str) {
        info!("{}", message);
        self.stop_spinner();
        println!("{} {}", "✓".green(), message);
    }

    fn warn(&self, message: &str) {
        warn!("{}", message);
        self.stop_spinner();
        println!("{} {}", "!".yellow(), message.yellow());
    }

    fn error(&self, message: &str) {
        error!("{}", message);
        self.stop_spinner();
        eprintln!("{} {}", "✗".red(), message.red());
    }

    fn debug(&self, message: &str) {
        debug!("{}", message);
        if self.verbose {
            println!("{}", message.dimmed());
        }
    }

    fn clear(&self) {
        self.stop_spinner();
    }
}

/// Reporter that does nothing. Used by tests and count-only output.
pub struct NullReporter;

impl Reporter for NullReporter {
    fn phase(&self, _message: &str) {}
    fn success(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
    fn debug(&self, _message: &str) {}
    fn clear(&self) {}
}
