//! Gitmirror Engine
//!
//! The repository synchronization engine.
//!
//! Architecture:
//! - Transport: git clone/pull capability, implemented over libgit2
//! - Executor: the per-repository clone-or-pull state machine
//! - Recovery: backup-and-reclone policy for diverged mirrors
//! - Coordinator: bounded-concurrency fan-out over a repository batch
//! - Hooks: fixed post-sync hook scripts written into each mirror
//!
//! The engine consumes repository descriptors produced by the directory
//! client and reports a terminal [`SyncOutcome`](gitmirror_core::SyncOutcome)
//! per repository; failures are isolated and never cross repository
//! boundaries.

pub mod coordinator;
pub mod error;
pub mod executor;
pub mod hooks;
pub mod recovery;
pub mod transport;

#[cfg(test)]
mod testutil;

pub use coordinator::SyncCoordinator;
pub use error::GitError;
pub use executor::SyncExecutor;
pub use hooks::HookInstaller;
pub use transport::{GitTransport, LibGitTransport, PullStatus};
