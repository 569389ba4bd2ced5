//! Sync outcomes
//!
//! Every repository processed in a batch ends in exactly one terminal
//! outcome. Outcomes are collected by the coordinator rather than only
//! printed, so callers can build an aggregate summary and tests can
//! assert on per-repository results.

use serde::{Deserialize, Serialize};

/// The operation during which a repository sync failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncStage {
    /// Initial clone of a missing mirror
    Clone,

    /// Fast-forward pull of an existing mirror
    Pull,

    /// Backup rename or re-clone after divergence
    Recover,

    /// The sync task itself died before reaching a git operation's
    /// terminal state (e.g., a panic); no particular operation is blamed
    Task,
}

impl std::fmt::Display for SyncStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncStage::Clone => write!(f, "clone"),
            SyncStage::Pull => write!(f, "pull"),
            SyncStage::Recover => write!(f, "recover"),
            SyncStage::Task => write!(f, "task"),
        }
    }
}

/// Terminal outcome of one repository's sync
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncOutcome {
    /// The mirror did not exist locally and was cloned fresh
    Cloned,

    /// The mirror existed and was already at the remote head
    UpToDate,

    /// The mirror existed and was fast-forwarded to the remote head
    Pulled,

    /// The mirror had diverged; it was renamed aside and re-cloned
    Recovered {
        /// Path the old mirror was preserved under
        backup: String,
    },

    /// The sync failed; the stage names the operation that failed
    Failed { stage: SyncStage, reason: String },
}

impl SyncOutcome {
    /// Whether this outcome is a failure
    pub fn is_failure(&self) -> bool {
        matches!(self, SyncOutcome::Failed { .. })
    }
}

/// Aggregate result of one organization's batch run
///
/// Holds the terminal outcome for every repository that was admitted,
/// in admission (input) order.
#[derive(Debug, Default, Clone)]
pub struct SyncReport {
    outcomes: Vec<(String, SyncOutcome)>,
}

impl SyncReport {
    /// Creates an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one repository's terminal outcome
    pub fn record(&mut self, repo_name: impl Into<String>, outcome: SyncOutcome) {
        self.outcomes.push((repo_name.into(), outcome));
    }

    /// All recorded `(name, outcome)` pairs, admission order
    pub fn outcomes(&self) -> &[(String, SyncOutcome)] {
        &self.outcomes
    }

    /// Number of repositories processed
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// Number of repositories that ended in `Failed`
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_failure()).count()
    }

    /// Number of repositories that ended in any non-failure outcome
    pub fn succeeded(&self) -> usize {
        self.total() - self.failed()
    }

    /// The outcome recorded for a given repository, if any
    pub fn outcome_for(&self, repo_name: &str) -> Option<&SyncOutcome> {
        self.outcomes
            .iter()
            .find(|(name, _)| name == repo_name)
            .map(|(_, o)| o)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counters() {
        let mut report = SyncReport::new();
        report.record("a", SyncOutcome::Cloned);
        report.record("b", SyncOutcome::UpToDate);
        report.record(
            "c",
            SyncOutcome::Failed {
                stage: SyncStage::Pull,
                reason: "remote hung up".to_string(),
            },
        );

        assert_eq!(report.total(), 3);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.outcome_for("a"), Some(&SyncOutcome::Cloned));
        assert_eq!(report.outcome_for("missing"), None);
    }

    #[test]
    fn test_failure_stage_display() {
        assert_eq!(SyncStage::Clone.to_string(), "clone");
        assert_eq!(SyncStage::Recover.to_string(), "recover");
        assert_eq!(SyncStage::Task.to_string(), "task");
    }
}
