//! Deployment progress tracking

use serde::{Deserialize, Serialize};

/// Progress of the current publish attempt.
///
/// Drives the failure banner and disables conflicting actions while a
/// deployment is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    /// No attempt started yet
    NotStarted,

    /// Deployment running
    InProgress,

    /// Terminal success
    Success,

    /// Terminal failure, including cancellation
    Fail,
}

impl ProgressStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProgressStatus::Success | ProgressStatus::Fail)
    }
}

/// Transition-guarded progress holder.
///
/// Monotonic except for an explicit restart from a terminal state.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    status: ProgressStatus,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            status: ProgressStatus::NotStarted,
        }
    }

    /// Get current status
    pub fn status(&self) -> ProgressStatus {
        self.status
    }

    /// Advance to the next status
    pub fn advance(&mut self, next: ProgressStatus) -> Result<(), String> {
        let allowed = matches!(
            (self.status, next),
            (ProgressStatus::NotStarted, ProgressStatus::InProgress)
                | (ProgressStatus::InProgress, ProgressStatus::Success)
                | (ProgressStatus::InProgress, ProgressStatus::Fail)
        );

        if !allowed {
            return Err(format!(
                "Invalid transition: {:?} -> {:?}",
                self.status, next
            ));
        }
        self.status = next;
        Ok(())
    }

    /// Reset a terminal attempt so it can be retried
    pub fn restart(&mut self) -> Result<(), String> {
        if self.status == ProgressStatus::InProgress {
            return Err("cannot restart while a deployment is in progress".to_string());
        }
        self.status = ProgressStatus::NotStarted;
        Ok(())
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_success_flow() {
        let mut tracker = ProgressTracker::new();
        assert_eq!(tracker.status(), ProgressStatus::NotStarted);

        tracker.advance(ProgressStatus::InProgress).unwrap();
        tracker.advance(ProgressStatus::Success).unwrap();
        assert!(tracker.status().is_terminal());
    }

    #[test]
    fn test_progress_fail_flow() {
        let mut tracker = ProgressTracker::new();

        tracker.advance(ProgressStatus::InProgress).unwrap();
        tracker.advance(ProgressStatus::Fail).unwrap();
        assert_eq!(tracker.status(), ProgressStatus::Fail);
    }

    #[test]
    fn test_progress_rejects_skipping_in_progress() {
        let mut tracker = ProgressTracker::new();

        let result = tracker.advance(ProgressStatus::Success);
        assert!(result.is_err());
        assert_eq!(tracker.status(), ProgressStatus::NotStarted);
    }

    #[test]
    fn test_restart_only_from_settled_states() {
        let mut tracker = ProgressTracker::new();
        tracker.advance(ProgressStatus::InProgress).unwrap();

        assert!(tracker.restart().is_err());

        tracker.advance(ProgressStatus::Fail).unwrap();
        tracker.restart().unwrap();
        assert_eq!(tracker.status(), ProgressStatus::NotStarted);
    }
}
