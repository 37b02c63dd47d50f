//! Progress reporting for batch runs.
//!
//! The orchestrator drives a [`ProgressTracker`], which validates each move
//! against the core [`Stage`] machine and forwards accepted stages to a
//! caller-supplied [`ProgressSink`].

use kavach_core::Stage;
use parking_lot::Mutex;

/// Receives every stage a run enters, in order.
pub trait ProgressSink: Send + Sync {
    fn on_stage(&self, stage: Stage);
}

/// Sink that ignores all stages.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl ProgressSink for NoopSink {
    fn on_stage(&self, _stage: Stage) {}
}

/// Sink that records stages for later inspection.
#[derive(Debug, Default)]
pub struct RecordingSink {
    stages: Mutex<Vec<Stage>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages received so far.
    pub fn stages(&self) -> Vec<Stage> {
        self.stages.lock().clone()
    }
}

impl ProgressSink for RecordingSink {
    fn on_stage(&self, stage: Stage) {
        self.stages.lock().push(stage);
    }
}

/// Tracks the current stage of one run.
pub struct ProgressTracker<'a> {
    current: Mutex<Stage>,
    sink: &'a dyn ProgressSink,
}

impl<'a> ProgressTracker<'a> {
    /// Start a tracker in [`Stage::Idle`].
    pub fn new(sink: &'a dyn ProgressSink) -> Self {
        Self {
            current: Mutex::new(Stage::Idle),
            sink,
        }
    }

    /// Current stage.
    pub fn current(&self) -> Stage {
        *self.current.lock()
    }

    /// Move to `next` and notify the sink.
    ///
    /// An invalid move is logged and ignored; returns whether it was applied.
    pub fn advance(&self, next: Stage) -> bool {
        let mut current = self.current.lock();
        match current.transition(next) {
            Ok(stage) => {
                *current = stage;
                drop(current);
                tracing::debug!(stage = %stage, "Stage changed");
                self.sink.on_stage(stage);
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring invalid stage transition");
                false
            }
        }
    }

    /// Move to [`Stage::Failed`] unless already terminal.
    pub fn fail(&self) -> bool {
        self.advance(Stage::Failed)
    }
}
