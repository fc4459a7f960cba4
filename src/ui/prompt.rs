//! User confirmation prompts.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dialoguer::Confirm;
use log::warn;

/// Yes/no confirmation. Anything other than an affirmative answer is
/// treated as cancellation by callers.
#[async_trait]
pub trait ConfirmPrompt: Send + Sync {
    async fn confirm(&self, message: &str) -> bool;
}

/// Interactive terminal prompt.
pub struct CliConfirm;

#[async_trait]
impl ConfirmPrompt for CliConfirm {
    async fn confirm(&self, message: &str) -> bool {
        let message = message.to_string();
        // dialoguer blocks on stdin; keep it off the async workers.
        let answer = tokio::task::spawn_blocking(move || {
            Confirm::new().with_prompt(message).default(false).interact()
        })
        .await;

        match answer {
            Ok(Ok(yes)) => yes,
            Ok(Err(e)) => {
                warn!("prompt failed, treating as no: {}", e);
                false
            }
            Err(e) => {
                warn!("prompt task failed, treating as no: {}", e);
                false
            }
        }
    }
}

/// Scripted prompt for tests: always answers `answer` and counts how many
/// times it was asked.
pub struct ScriptedConfirm {
    answer: bool,
    asked: AtomicUsize,
}

impl ScriptedConfirm {
    pub fn new(answer: bool) -> Self {
        Self {
            answer,
            asked: AtomicUsize::new(0),
        }
    }

    pub fn times_asked(&self) -> usize {
        self.asked.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConfirmPrompt for ScriptedConfirm {
    async fn confirm(&self, _message: &str) -> bool {
        self.asked.fetch_add(1, Ordering::SeqCst);
        self.answer
    }
}
