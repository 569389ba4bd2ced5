//! Concurrency coordinator
//!
//! Fans a repository batch out to per-repository sync tasks with a fixed
//! upper bound on simultaneously in-flight operations. The admission slot
//! is an owned semaphore permit acquired before the task is spawned, so
//! admission order follows input order and the permit is released on
//! every exit path when the task drops it.
//!
//! `run` returns only after every task reached a terminal outcome; it
//! never propagates individual failures as a call-level error.

use std::path::Path;
use std::sync::Arc;

use gitmirror_core::{RemoteRepo, SyncOutcome, SyncReport, SyncStage};
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::executor::SyncExecutor;
use crate::hooks::HookInstaller;

/// Default cap on simultaneously in-flight clone/pull operations
pub const DEFAULT_MAX_IN_FLIGHT: usize = 20;

/// Runs a repository batch under a global concurrency cap
pub struct SyncCoordinator {
    executor: Arc<SyncExecutor>,
    hooks: HookInstaller,
    semaphore: Arc<Semaphore>,
}

impl SyncCoordinator {
    /// Creates a coordinator admitting at most `max_in_flight` tasks at once
    pub fn new(executor: SyncExecutor, max_in_flight: usize) -> Self {
        Self {
            executor: Arc::new(executor),
            hooks: HookInstaller::new(),
            semaphore: Arc::new(Semaphore::new(max_in_flight)),
        }
    }

    /// Synchronizes every repository in the batch under `output_root`
    ///
    /// One task per repository; failures are isolated per repository and
    /// recorded in the report, never returned as an error. A panicked
    /// task is recorded as a failure for its repository only.
    pub async fn run(&self, repos: Vec<RemoteRepo>, output_root: &Path) -> SyncReport {
        info!(count = repos.len(), "starting sync batch");

        let mut handles = Vec::with_capacity(repos.len());
        for repo in repos {
            let permit = match Arc::clone(&self.semaphore).acquire_owned().await {
                Ok(permit) => permit,
                // The semaphore is never closed; there is no work to admit
                // without a permit either way.
                Err(_) => break,
            };

            let executor = Arc::clone(&self.executor);
            let hooks = self.hooks.clone();
            let root = output_root.to_path_buf();
            let name = repo.name.clone();

            let handle = tokio::spawn(async move {
                // Slot is held for the whole clone/pull/recover lifetime
                let _permit = permit;

                let outcome = executor.sync_repo(&repo, &root).await;

                // Hooks go in after sync, success or failure alike, but only
                // where a mirror actually exists; installer failures never
                // change the outcome.
                let mirror = root.join(&repo.name);
                if mirror.exists() {
                    if let Err(e) = hooks.install(&mirror) {
                        warn!(repo = %repo.name, error = %e, "hook install failed");
                    }
                }

                outcome
            });
            handles.push((name, handle));
        }

        let mut report = SyncReport::new();
        for (name, handle) in handles {
            match handle.await {
                Ok(outcome) => report.record(name, outcome),
                Err(e) => {
                    warn!(repo = %name, error = %e, "sync task panicked");
                    report.record(
                        name,
                        SyncOutcome::Failed {
                            stage: SyncStage::Task,
                            reason: format!("sync task panicked: {}", e),
                        },
                    );
                }
            }
        }

        info!(
            total = report.total(),
            failed = report.failed(),
            "sync batch complete"
        );
        report
    }
}
