use serde::{Deserialize, Serialize};

use crate::text::Origin;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stage {
    Extraction,
    Segmentation,
    Embedding,
    Matching,
    Clustering,
    Summarization,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    StageCompleted {
        stage: Stage,
        elapsed_ms: u64,
    },

    SegmentsProduced {
        origin: Origin,
        count: usize,
    },

    CoverageComputed {
        covered: usize,
        missing: usize,
    },

    ClusterFormed {
        cluster_id: usize,
        size: usize,
    },

    ModelCall {
        purpose: CallPurpose,
        outcome: CallOutcome,
        latency_ms: u64,
    },

    /// The degraded report replaced the model's structured output.
    ReportFallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallPurpose {
    ClusterSummary { cluster_id: usize },
    Structuring,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallOutcome {
    Ok,
    Failed,
    /// The call returned but its output could not be used.
    Unusable,
}
