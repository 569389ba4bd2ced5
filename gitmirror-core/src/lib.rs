//! Gitmirror Core
//!
//! Core types shared across the gitmirror crates.
//!
//! This crate contains:
//! - Repository descriptors as returned by the directory API
//! - Per-repository sync outcomes and the aggregate batch report

pub mod outcome;
pub mod repo;

pub use outcome::{SyncOutcome, SyncReport, SyncStage};
pub use repo::RemoteRepo;
