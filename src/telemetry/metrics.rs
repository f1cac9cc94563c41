use serde::Serialize;
use std::collections::BTreeMap;

use super::event::{CallOutcome, CallPurpose, PipelineEvent, Stage};
use crate::text::Origin;

/// Aggregate view of one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunMetrics {
    pub source_segments: usize,
    pub transcript_segments: usize,
    pub covered: usize,
    pub missing: usize,
    pub clusters_formed: usize,
    pub empty_clusters: usize,
    pub model_calls: ModelCallStats,
    pub fallback_used: bool,
    pub stage_ms: BTreeMap<Stage, u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModelCallStats {
    pub cluster_ok: usize,
    pub cluster_failed: usize,
    pub structuring_ok: usize,
    pub structuring_failed: usize,
    pub total_latency_ms: u64,
}

impl ModelCallStats {
    pub fn total(&self) -> usize {
        self.cluster_ok + self.cluster_failed + self.structuring_ok + self.structuring_failed
    }
}

pub fn compute_metrics(events: &[PipelineEvent]) -> RunMetrics {
    let mut metrics = RunMetrics::default();

    for event in events {
        match event {
            PipelineEvent::StageCompleted { stage, elapsed_ms } => {
                *metrics.stage_ms.entry(*stage).or_insert(0) += elapsed_ms;
            }
            PipelineEvent::SegmentsProduced { origin, count } => match origin {
                Origin::Source => metrics.source_segments = *count,
                Origin::Transcript => metrics.transcript_segments = *count,
            },
            PipelineEvent::CoverageComputed { covered, missing } => {
                metrics.covered = *covered;
                metrics.missing = *missing;
            }
            PipelineEvent::ClusterFormed { size, .. } => {
                metrics.clusters_formed += 1;
                if *size == 0 {
                    metrics.empty_clusters += 1;
                }
            }
            PipelineEvent::ModelCall { purpose, outcome, latency_ms } => {
                let calls = &mut metrics.model_calls;
                calls.total_latency_ms += latency_ms;
                match (purpose, outcome) {
                    (CallPurpose::ClusterSummary { .. }, CallOutcome::Ok) => calls.cluster_ok += 1,
                    (CallPurpose::ClusterSummary { .. }, _) => calls.cluster_failed += 1,
                    (CallPurpose::Structuring, CallOutcome::Ok) => calls.structuring_ok += 1,
                    (CallPurpose::Structuring, _) => calls.structuring_failed += 1,
                }
            }
            PipelineEvent::ReportFallback => metrics.fallback_used = true,
        }
    }

    metrics
}
