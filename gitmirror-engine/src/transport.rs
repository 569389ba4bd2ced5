//! Git transport capability
//!
//! Defines the clone/pull capability the executor runs against and the
//! production implementation over libgit2. The trait seam exists so the
//! executor and coordinator can be exercised with fakes.
//!
//! Pull never merges: the working tree is checked for local modifications
//! first, then the remote branch is fetched and applied only when the
//! analysis is a fast-forward. Anything that would require a merge is
//! reported as divergence and handled by the recovery policy instead.

use std::path::Path;

use async_trait::async_trait;
use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{Cred, FetchOptions, RemoteCallbacks, Repository, StatusOptions};
use tracing::debug;

use crate::error::GitError;

/// Result of a pull attempt against an existing mirror
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullStatus {
    /// Local head already matches the remote head
    UpToDate,

    /// Local head was fast-forwarded to the remote head
    FastForwarded,

    /// The working tree has local modifications; divergence signal
    UnstagedChanges,

    /// Remote history cannot be applied by fast-forward; divergence signal
    NonFastForward,
}

/// Capability for talking to the remote git transport
///
/// The credential is a personal access token presented as the password
/// half of basic-auth-shaped credentials; the username is a placeholder.
#[async_trait]
pub trait GitTransport: Send + Sync {
    /// Clone `url` into `dest`
    async fn clone_repo(&self, url: &str, dest: &Path, token: &str) -> Result<(), GitError>;

    /// Pull the given remote of an existing repository at `path`
    ///
    /// Divergence (`UnstagedChanges`, `NonFastForward`) is a status, not
    /// an error; `Err` is reserved for operational failures.
    async fn pull(&self, path: &Path, remote: &str, token: &str) -> Result<PullStatus, GitError>;
}

/// Production transport over libgit2
///
/// libgit2 calls are blocking, so each operation runs on the tokio
/// blocking pool and never stalls unrelated sync tasks.
#[derive(Debug, Clone, Default)]
pub struct LibGitTransport;

impl LibGitTransport {
    /// Creates a new libgit2-backed transport
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl GitTransport for LibGitTransport {
    async fn clone_repo(&self, url: &str, dest: &Path, token: &str) -> Result<(), GitError> {
        let url = url.to_string();
        let dest = dest.to_path_buf();
        let token = token.to_string();

        tokio::task::spawn_blocking(move || clone_blocking(&url, &dest, &token))
            .await
            .map_err(|e| GitError::Task(e.to_string()))?
    }

    async fn pull(&self, path: &Path, remote: &str, token: &str) -> Result<PullStatus, GitError> {
        let path = path.to_path_buf();
        let remote = remote.to_string();
        let token = token.to_string();

        tokio::task::spawn_blocking(move || pull_blocking(&path, &remote, &token))
            .await
            .map_err(|e| GitError::Task(e.to_string()))?
    }
}

/// Callbacks presenting the token as userpass-plaintext credentials
///
/// The username is required by the callback shape but ignored by token
/// authentication on the server side.
fn auth_callbacks(token: &str) -> RemoteCallbacks<'_> {
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(move |_url, username_from_url, _allowed| {
        Cred::userpass_plaintext(username_from_url.unwrap_or("git"), token)
    });
    callbacks
}

fn clone_blocking(url: &str, dest: &Path, token: &str) -> Result<(), GitError> {
    let mut fetch_options = FetchOptions::new();
    fetch_options.remote_callbacks(auth_callbacks(token));

    let mut builder = RepoBuilder::new();
    builder.fetch_options(fetch_options);
    builder.clone(url, dest)?;

    debug!(url, dest = %dest.display(), "clone complete");
    Ok(())
}

fn pull_blocking(path: &Path, remote_name: &str, token: &str) -> Result<PullStatus, GitError> {
    let repo = Repository::open(path)?;

    // Local modifications would force a merge; report divergence before
    // touching the network. Untracked and ignored files don't count.
    let mut status_options = StatusOptions::new();
    status_options.include_untracked(false).include_ignored(false);
    let statuses = repo.statuses(Some(&mut status_options))?;
    if !statuses.is_empty() {
        return Ok(PullStatus::UnstagedChanges);
    }

    // A detached head can't be fast-forwarded
    let head = repo.head()?;
    let branch = match head.shorthand() {
        Some(name) if head.is_branch() => name.to_string(),
        _ => return Ok(PullStatus::NonFastForward),
    };

    let mut remote = repo.find_remote(remote_name)?;
    let mut fetch_options = FetchOptions::new();
    fetch_options.remote_callbacks(auth_callbacks(token));
    remote.fetch(&[branch.as_str()], Some(&mut fetch_options), None)?;

    let fetch_head = repo.find_reference("FETCH_HEAD")?;
    let fetch_commit = repo.reference_to_annotated_commit(&fetch_head)?;
    let (analysis, _) = repo.merge_analysis(&[&fetch_commit])?;

    if analysis.is_up_to_date() {
        Ok(PullStatus::UpToDate)
    } else if analysis.is_fast_forward() {
        let refname = format!("refs/heads/{}", branch);
        let mut reference = repo.find_reference(&refname)?;
        reference.set_target(fetch_commit.id(), "gitmirror: fast-forward")?;
        repo.set_head(&refname)?;
        // Working tree is known clean; force checkout moves it to the new head
        repo.checkout_head(Some(CheckoutBuilder::default().force()))?;
        Ok(PullStatus::FastForwarded)
    } else {
        Ok(PullStatus::NonFastForward)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Signature;
    use tempfile::TempDir;

    /// Writes `content` to `name` in the repo's working tree and commits it
    fn commit_file(repo: &Repository, name: &str, content: &str) {
        let workdir = repo.workdir().unwrap();
        std::fs::write(workdir.join(name), content).unwrap();

        let mut index = repo.index().unwrap();
        index.add_path(Path::new(name)).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();

        let sig = Signature::now("gitmirror-test", "test@example.com").unwrap();
        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<_> = parent.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, "test commit", &tree, &parents)
            .unwrap();
    }

    /// Creates an upstream repo with one commit, returns (dir, repo)
    fn upstream_repo() -> (TempDir, Repository) {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        commit_file(&repo, "README.md", "hello");
        (dir, repo)
    }

    #[tokio::test]
    async fn clone_then_pull_is_up_to_date() {
        let (upstream_dir, _upstream) = upstream_repo();
        let mirrors = TempDir::new().unwrap();
        let dest = mirrors.path().join("mirror");

        let transport = LibGitTransport::new();
        transport
            .clone_repo(upstream_dir.path().to_str().unwrap(), &dest, "token")
            .await
            .unwrap();
        assert!(dest.join("README.md").exists());

        let status = transport.pull(&dest, "origin", "token").await.unwrap();
        assert_eq!(status, PullStatus::UpToDate);
    }

    #[tokio::test]
    async fn pull_fast_forwards_new_upstream_commits() {
        let (upstream_dir, upstream) = upstream_repo();
        let mirrors = TempDir::new().unwrap();
        let dest = mirrors.path().join("mirror");

        let transport = LibGitTransport::new();
        transport
            .clone_repo(upstream_dir.path().to_str().unwrap(), &dest, "token")
            .await
            .unwrap();

        commit_file(&upstream, "new.txt", "upstream moved on");

        let status = transport.pull(&dest, "origin", "token").await.unwrap();
        assert_eq!(status, PullStatus::FastForwarded);
        assert!(dest.join("new.txt").exists());
    }

    #[tokio::test]
    async fn dirty_working_tree_reports_unstaged_changes() {
        let (upstream_dir, _upstream) = upstream_repo();
        let mirrors = TempDir::new().unwrap();
        let dest = mirrors.path().join("mirror");

        let transport = LibGitTransport::new();
        transport
            .clone_repo(upstream_dir.path().to_str().unwrap(), &dest, "token")
            .await
            .unwrap();

        std::fs::write(dest.join("README.md"), "local edit").unwrap();

        let status = transport.pull(&dest, "origin", "token").await.unwrap();
        assert_eq!(status, PullStatus::UnstagedChanges);
    }

    #[tokio::test]
    async fn diverged_histories_report_non_fast_forward() {
        let (upstream_dir, upstream) = upstream_repo();
        let mirrors = TempDir::new().unwrap();
        let dest = mirrors.path().join("mirror");

        let transport = LibGitTransport::new();
        transport
            .clone_repo(upstream_dir.path().to_str().unwrap(), &dest, "token")
            .await
            .unwrap();

        // Commit on both sides so neither head is an ancestor of the other
        let mirror = Repository::open(&dest).unwrap();
        commit_file(&mirror, "local.txt", "local commit");
        commit_file(&upstream, "remote.txt", "remote commit");

        let status = transport.pull(&dest, "origin", "token").await.unwrap();
        assert_eq!(status, PullStatus::NonFastForward);
    }

    #[tokio::test]
    async fn pull_on_a_non_repository_path_is_an_error() {
        let dir = TempDir::new().unwrap();
        let not_a_repo = dir.path().join("plain");
        std::fs::create_dir(&not_a_repo).unwrap();

        let transport = LibGitTransport::new();
        let err = transport.pull(&not_a_repo, "origin", "token").await;
        assert!(matches!(err, Err(GitError::Git(_))));
    }
}
