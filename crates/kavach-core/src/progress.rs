//! Stage state machine for batch progress.
//!
//! Valid transitions (forward only):
//! - `Idle → Uploading`
//! - `Uploading → Extracting(0)`
//! - `Extracting(i) → Analyzing(i)`
//! - `Analyzing(i) → Extracting(i + 1) | CrossVerifying`
//! - `CrossVerifying → Done`
//! - any non-terminal state `→ Failed`
//!
//! `Done` and `Failed` are terminal.

use std::fmt;
use thiserror::Error;

/// Progress of a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Stage {
    #[default]
    Idle,
    Uploading,
    /// OCR running for the document at this index
    Extracting(usize),
    /// AI analysis running for the document at this index
    Analyzing(usize),
    CrossVerifying,
    Done,
    Failed,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid stage transition from {from} to {to}")]
pub struct StageError {
    pub from: Stage,
    pub to: Stage,
}

impl Stage {
    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Done | Stage::Failed)
    }

    /// Whether `next` may directly follow this stage.
    pub fn can_transition_to(&self, next: Stage) -> bool {
        use Stage::*;

        if self.is_terminal() {
            return false;
        }

        match (*self, next) {
            (_, Failed) => true,
            (Idle, Uploading) => true,
            (Uploading, Extracting(0)) => true,
            (Extracting(i), Analyzing(j)) => i == j,
            (Analyzing(i), Extracting(j)) => j == i + 1,
            (Analyzing(_), CrossVerifying) => true,
            (CrossVerifying, Done) => true,
            _ => false,
        }
    }

    /// Attempt a transition.
    pub fn transition(self, next: Stage) -> Result<Stage, StageError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(StageError {
                from: self,
                to: next,
            })
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Idle => write!(f, "idle"),
            Stage::Uploading => write!(f, "uploading"),
            Stage::Extracting(i) => write!(f, "extracting text from document {}", i + 1),
            Stage::Analyzing(i) => write!(f, "analyzing document {}", i + 1),
            Stage::CrossVerifying => write!(f, "cross-verifying identity"),
            Stage::Done => write!(f, "done"),
            Stage::Failed => write!(f, "failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_two_documents() {
        let path = [
            Stage::Uploading,
            Stage::Extracting(0),
            Stage::Analyzing(0),
            Stage::Extracting(1),
            Stage::Analyzing(1),
            Stage::CrossVerifying,
            Stage::Done,
        ];
        let mut stage = Stage::Idle;
        for next in path {
            stage = stage.transition(next).unwrap();
        }
        assert!(stage.is_terminal());
    }

    #[test]
    fn test_failed_reachable_from_non_terminal() {
        for stage in [
            Stage::Idle,
            Stage::Uploading,
            Stage::Extracting(2),
            Stage::Analyzing(4),
            Stage::CrossVerifying,
        ] {
            assert!(stage.can_transition_to(Stage::Failed), "{:?}", stage);
        }
    }

    #[test]
    fn test_terminal_states_have_no_exits() {
        for stage in [Stage::Done, Stage::Failed] {
            assert!(!stage.can_transition_to(Stage::Failed));
            assert!(!stage.can_transition_to(Stage::Idle));
            assert!(!stage.can_transition_to(Stage::Uploading));
        }
    }

    #[test]
    fn test_no_backward_or_skipping_transitions() {
        assert!(!Stage::Analyzing(0).can_transition_to(Stage::Extracting(0)));
        assert!(!Stage::Analyzing(0).can_transition_to(Stage::Extracting(2)));
        assert!(!Stage::Extracting(1).can_transition_to(Stage::Analyzing(0)));
        assert!(!Stage::Uploading.can_transition_to(Stage::Extracting(1)));
        assert!(!Stage::Uploading.can_transition_to(Stage::CrossVerifying));
        assert!(!Stage::CrossVerifying.can_transition_to(Stage::Analyzing(0)));

        let err = Stage::Done.transition(Stage::Idle).unwrap_err();
        assert_eq!(err.from, Stage::Done);
        assert_eq!(err.to, Stage::Idle);
    }
}
