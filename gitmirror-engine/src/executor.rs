//! Sync executor
//!
//! The per-repository state machine: probe the local mirror path, clone
//! when it is missing, pull when it exists, and hand divergence to the
//! recovery policy. Every run ends in exactly one terminal
//! [`SyncOutcome`]; errors are folded into the outcome rather than
//! propagated, so one repository can never abort its siblings.

use std::path::Path;
use std::sync::Arc;

use gitmirror_core::{RemoteRepo, SyncOutcome, SyncStage};
use tracing::{error, info, warn};

use crate::recovery;
use crate::transport::{GitTransport, PullStatus};

/// Remote name pulls are issued against
pub const DEFAULT_REMOTE: &str = "origin";

/// Executes the clone-or-pull decision for single repositories
pub struct SyncExecutor {
    transport: Arc<dyn GitTransport>,
    token: String,
}

impl SyncExecutor {
    /// Creates an executor over the given transport
    ///
    /// # Arguments
    /// * `transport` - The git transport capability
    /// * `token` - Access token passed through to clone/pull operations
    pub fn new(transport: Arc<dyn GitTransport>, token: impl Into<String>) -> Self {
        Self {
            transport,
            token: token.into(),
        }
    }

    /// Synchronizes one repository under `output_root`
    ///
    /// The only pre-state inspected is the existence of
    /// `output_root/<name>`: missing means clone, present means pull. A
    /// path that exists but is not a valid repository still goes down the
    /// pull path and surfaces the open error as a pull failure.
    pub async fn sync_repo(&self, repo: &RemoteRepo, output_root: &Path) -> SyncOutcome {
        let dest = output_root.join(&repo.name);
        if dest.exists() {
            self.pull_existing(repo, &dest).await
        } else {
            self.clone_missing(repo, &dest).await
        }
    }

    async fn clone_missing(&self, repo: &RemoteRepo, dest: &Path) -> SyncOutcome {
        info!(repo = %repo.name, "cloning");
        match self
            .transport
            .clone_repo(&repo.clone_url, dest, &self.token)
            .await
        {
            Ok(()) => {
                info!(repo = %repo.name, "repository cloned");
                SyncOutcome::Cloned
            }
            Err(e) => {
                error!(repo = %repo.name, error = %e, "clone failed");
                SyncOutcome::Failed {
                    stage: SyncStage::Clone,
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn pull_existing(&self, repo: &RemoteRepo, dest: &Path) -> SyncOutcome {
        info!(repo = %repo.name, "pulling");
        match self.transport.pull(dest, DEFAULT_REMOTE, &self.token).await {
            Ok(PullStatus::UpToDate) => {
                info!(repo = %repo.name, "already up to date");
                SyncOutcome::UpToDate
            }
            Ok(PullStatus::FastForwarded) => {
                info!(repo = %repo.name, "repository pulled");
                SyncOutcome::Pulled
            }
            Ok(PullStatus::UnstagedChanges | PullStatus::NonFastForward) => {
                warn!(repo = %repo.name, "mirror diverged from remote, recovering");
                recovery::recover(self.transport.as_ref(), repo, dest, &self.token).await
            }
            Err(e) => {
                error!(repo = %repo.name, error = %e, "pull failed");
                SyncOutcome::Failed {
                    stage: SyncStage::Pull,
                    reason: e.to_string(),
                }
            }
        }
    }
}
