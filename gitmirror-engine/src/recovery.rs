//! Recovery policy for diverged mirrors
//!
//! A mirror that cannot be advanced by fast-forward is not repaired in
//! place: the whole directory is renamed to a dated backup and the
//! repository is cloned fresh into the original path. The backup is a
//! side artifact the engine never reads again.
//!
//! Two deliberate hardenings over the naive rename-then-clone:
//! - a second recovery on the same calendar day gets a time-of-day
//!   suffix instead of colliding with the first backup
//! - a failed rename is terminal for the repository; the clone is
//!   skipped so stale uncommitted data is never buried under a fresh
//!   checkout

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use gitmirror_core::{RemoteRepo, SyncOutcome, SyncStage};
use tracing::{error, info};

use crate::transport::GitTransport;

/// Computes the backup path for a mirror recovered at `now`
///
/// Normally `<path>_YYYYMMDD`; if that already exists (an earlier
/// recovery the same day), `<path>_YYYYMMDD-HHMMSS`.
pub fn backup_destination(path: &Path, now: DateTime<Local>) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let dated = path.with_file_name(format!("{}_{}", name, now.format("%Y%m%d")));
    if !dated.exists() {
        return dated;
    }
    path.with_file_name(format!("{}_{}", name, now.format("%Y%m%d-%H%M%S")))
}

/// Renames the diverged mirror aside and clones it fresh
///
/// Returns `Recovered` with the backup path on success. Both the rename
/// and the re-clone are attempted exactly once; either failing is a
/// terminal `Failed { stage: Recover }` for this repository.
pub async fn recover(
    transport: &dyn GitTransport,
    repo: &RemoteRepo,
    dest: &Path,
    token: &str,
) -> SyncOutcome {
    let backup = backup_destination(dest, Local::now());

    if let Err(e) = tokio::fs::rename(dest, &backup).await {
        error!(repo = %repo.name, backup = %backup.display(), error = %e, "backup rename failed");
        return SyncOutcome::Failed {
            stage: SyncStage::Recover,
            reason: format!("backup rename failed: {}", e),
        };
    }
    info!(repo = %repo.name, backup = %backup.display(), "diverged mirror moved aside");

    match transport.clone_repo(&repo.clone_url, dest, token).await {
        Ok(()) => {
            info!(repo = %repo.name, "repository re-cloned");
            SyncOutcome::Recovered {
                backup: backup.display().to_string(),
            }
        }
        Err(e) => {
            error!(repo = %repo.name, error = %e, "re-clone failed");
            SyncOutcome::Failed {
                stage: SyncStage::Recover,
                reason: format!("re-clone failed: {}", e),
            }
        }
    }
}
