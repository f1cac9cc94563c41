use std::time::Instant;

use super::event::{PipelineEvent, Stage};
use super::metrics::{compute_metrics, RunMetrics};

/// Collects the events of a single run. Owned by the run, never shared.
#[derive(Debug, Default)]
pub struct TelemetryRecorder {
    events: Vec<PipelineEvent>,
}

impl TelemetryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: PipelineEvent) {
        self.events.push(event);
    }

    /// Records a `StageCompleted` event for a stage that began at `started`.
    pub fn stage_done(&mut self, stage: Stage, started: Instant) {
        self.record(PipelineEvent::StageCompleted {
            stage,
            elapsed_ms: started.elapsed().as_millis() as u64,
        });
    }

    pub fn events(&self) -> &[PipelineEvent] {
        &self.events
    }

    pub fn snapshot(&self) -> RunMetrics {
        compute_metrics(&self.events)
    }
}
