//! Test doubles shared by the engine's unit tests

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::GitError;
use crate::transport::{GitTransport, PullStatus};

/// In-memory transport that records calls instead of touching a remote
///
/// Clones create the destination directory so the filesystem looks like a
/// real clone happened; pulls return a configurable status.
pub struct FakeTransport {
    pull_status: PullStatus,
    fail_clone_pattern: Option<String>,
    panic_clone_pattern: Option<String>,
    fail_pull: bool,
    op_delay: Option<Duration>,
    clones: Mutex<Vec<(String, PathBuf)>>,
    pulls: Mutex<Vec<PathBuf>>,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self {
            pull_status: PullStatus::UpToDate,
            fail_clone_pattern: None,
            panic_clone_pattern: None,
            fail_pull: false,
            op_delay: None,
            clones: Mutex::new(Vec::new()),
            pulls: Mutex::new(Vec::new()),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
        }
    }

    /// Every pull returns this status
    pub fn with_pull_status(mut self, status: PullStatus) -> Self {
        self.pull_status = status;
        self
    }

    /// Clones whose URL contains `pattern` fail
    pub fn fail_clones_matching(mut self, pattern: &str) -> Self {
        self.fail_clone_pattern = Some(pattern.to_string());
        self
    }

    /// Clones whose URL contains `pattern` panic mid-operation
    pub fn panic_clones_matching(mut self, pattern: &str) -> Self {
        self.panic_clone_pattern = Some(pattern.to_string());
        self
    }

    /// Every pull fails with an operational error
    pub fn fail_pulls(mut self) -> Self {
        self.fail_pull = true;
        self
    }

    /// Every operation sleeps this long, to make overlap observable
    pub fn with_op_delay(mut self, delay: Duration) -> Self {
        self.op_delay = Some(delay);
        self
    }

    /// Recorded `(url, dest)` clone calls
    pub fn clones(&self) -> Vec<(String, PathBuf)> {
        self.clones.lock().unwrap().clone()
    }

    /// Recorded pull destinations
    pub fn pulls(&self) -> Vec<PathBuf> {
        self.pulls.lock().unwrap().clone()
    }

    /// Highest number of operations ever in flight at once
    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    async fn enter(&self) {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.op_delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn exit(&self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl GitTransport for FakeTransport {
    async fn clone_repo(&self, url: &str, dest: &Path, _token: &str) -> Result<(), GitError> {
        self.enter().await;
        if let Some(pattern) = &self.panic_clone_pattern {
            if url.contains(pattern) {
                panic!("simulated clone panic: {}", url);
            }
        }
        let result = match &self.fail_clone_pattern {
            Some(pattern) if url.contains(pattern) => {
                Err(GitError::Task(format!("simulated clone failure: {}", url)))
            }
            _ => {
                std::fs::create_dir_all(dest)?;
                self.clones
                    .lock()
                    .unwrap()
                    .push((url.to_string(), dest.to_path_buf()));
                Ok(())
            }
        };
        self.exit();
        result
    }

    async fn pull(&self, path: &Path, _remote: &str, _token: &str) -> Result<PullStatus, GitError> {
        self.enter().await;
        let result = if self.fail_pull {
            Err(GitError::Task("simulated pull failure".to_string()))
        } else {
            self.pulls.lock().unwrap().push(path.to_path_buf());
            Ok(self.pull_status)
        };
        self.exit();
        result
    }
}
