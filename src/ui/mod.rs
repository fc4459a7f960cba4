//! Terminal collaborators: progress reporting and confirmation prompts.
//!
//! Both sit behind traits so the sweep pipeline can run against no-op or
//! scripted implementations in tests.

mod prompt;
mod reporter;

pub use prompt::{CliConfirm, ConfirmPrompt, ScriptedConfirm};
pub use reporter::{ConsoleReporter, NullReporter, Reporter};
