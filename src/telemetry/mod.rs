//! Per-run pipeline telemetry.
//!
//! # PRIVACY INVARIANT
//! Events carry counts, cluster ids and durations only. They must **NEVER**
//! contain segment text, prompts, model output or embeddings.
//!
//! Telemetry is write-only from the pipeline's point of view: no stage reads
//! it to make a decision.

pub mod event;
pub mod metrics;
pub mod recorder;

pub use event::{CallOutcome, CallPurpose, PipelineEvent, Stage};
pub use metrics::{compute_metrics, RunMetrics};
pub use recorder::TelemetryRecorder;
