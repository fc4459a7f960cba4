//! Concurrent PR status checking.
//!
//! A bounded pool of workers pulls branch indices from a shared cursor,
//! queries each branch's PR state, and records the result keyed by branch
//! name. The output sequence is rebuilt in input order afterwards, so
//! completion order never leaks into what the user sees.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures::future::join_all;
use log::warn;

use crate::github::{PrState, PrStateLookup};

/// Upper bound on concurrent PR queries.
pub const DEFAULT_CHECK_CONCURRENCY: usize = 5;

/// Per-branch check result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchResult {
    pub name: String,
    pub state: PrState,
}

impl BranchResult {
    pub fn deletable(&self) -> bool {
        self.state.is_deletable()
    }
}

/// Aggregate of one check batch.
///
/// `results` has exactly one entry per input branch, in input order.
/// `to_delete` holds the merged/closed branch names in completion order.
#[derive(Debug, Default)]
pub struct CheckOutcome {
    pub results: Vec<BranchResult>,
    pub to_delete: Vec<String>,
}

/// Check `names` against GitHub with at most `limit` concurrent lookups.
///
/// Workers claim the next unprocessed index from a shared atomic cursor
/// rather than taking a fixed slice, so a slow lookup on one branch doesn't
/// idle the rest of the pool. A lookup error becomes an `Error` result for
/// that branch alone; the batch always completes.
pub async fn check_branches(names: &[String], lookup: Arc<dyn PrStateLookup>, limit: usize) -> CheckOutcome {
    if names.is_empty() {
        return CheckOutcome::default();
    }

    let worker_count = limit.max(1).min(names.len());
    let names: Arc<Vec<String>> = Arc::new(names.to_vec());
    let cursor = Arc::new(AtomicUsize::new(0));
    let states: Arc<Mutex<HashMap<String, PrState>>> = Arc::new(Mutex::new(HashMap::new()));
    let to_delete: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));

    let mut workers = Vec::with_capacity(worker_count);
    for _ in 0..worker_count {
        let names = Arc::clone(&names);
        let cursor = Arc::clone(&cursor);
        let states = Arc::clone(&states);
        let to_delete = Arc::clone(&to_delete);
        let lookup = Arc::clone(&lookup);

        workers.push(tokio::spawn(async move {
            loop {
                let idx = cursor.fetch_add(1, Ordering::SeqCst);
                if idx >= names.len() {
                    break;
                }
                let name = &names[idx];

                let state = match lookup.pr_state(name).await {
                    Ok(state) => state,
                    Err(e) => {
                        warn!("pr lookup for {} failed: {}", name, e);
                        PrState::Error
                    }
                };

                if state.is_deletable() {
                    to_delete.lock().unwrap().push(name.clone());
                }
                states.lock().unwrap().insert(name.clone(), state);
            }
        }));
    }

    for joined in join_all(workers).await {
        if let Err(e) = joined {
            warn!("status worker panicked: {}", e);
        }
    }

    let states = states.lock().unwrap();
    // A worker that died mid-claim leaves a hole; that branch reads as an error.
    let results = names
        .iter()
        .map(|name| BranchResult {
            name: name.clone(),
            state: states.get(name).copied().unwrap_or(PrState::Error),
        })
        .collect();
    let to_delete = to_delete.lock().unwrap().clone();

    CheckOutcome { results, to_delete }
}
