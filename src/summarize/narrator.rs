use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{error, info, warn};

use super::prompts::{cluster_header, cluster_prompt, structuring_prompt};
use super::report::{parse_report, Report};
use crate::clustering::Clusters;
use crate::error::AnalysisError;
use crate::llm::{CallPacer, LanguageModel};
use crate::telemetry::{CallOutcome, CallPurpose, PipelineEvent, TelemetryRecorder};

/// What the two-stage summarization produced.
#[derive(Debug, Clone, PartialEq)]
pub struct NarrativeOutcome {
    pub report: Report,
    /// Cluster ids whose stage A call succeeded, in call order.
    pub summarized: Vec<usize>,
    /// Cluster ids skipped because their stage A call failed.
    pub failed: Vec<usize>,
    /// False when the degraded report was substituted.
    pub structured: bool,
}

/// Two-stage language-model summarizer.
///
/// Stage A summarizes each non-empty cluster on its own; stage B restructures
/// the concatenated summaries into a `Report`. All calls go through one pacer,
/// so they are strictly sequential with the configured gap between them.
pub struct Narrator {
    model: Arc<dyn LanguageModel>,
    pacer: CallPacer,
}

impl Narrator {
    pub fn new(model: Arc<dyn LanguageModel>, delay: Duration) -> Self {
        Self {
            model,
            pacer: CallPacer::new(delay),
        }
    }

    /// Never fails: stage A errors drop the cluster, stage B errors yield the degraded report.
    pub async fn summarize(&self, clusters: &Clusters<'_>, telemetry: &mut TelemetryRecorder) -> NarrativeOutcome {
        let mut analysis = String::new();
        let mut summarized = Vec::new();
        let mut failed = Vec::new();

        // 1. Stage A: one call per non-empty cluster
        for (&cluster_id, segments) in clusters {
            if segments.is_empty() {
                continue;
            }

            let prompt = cluster_prompt(segments);
            let (result, latency_ms) = self.timed_call(&prompt).await;

            match result {
                Ok(text) => {
                    analysis.push_str(&cluster_header(cluster_id));
                    analysis.push_str(text.trim());
                    summarized.push(cluster_id);
                    telemetry.record(PipelineEvent::ModelCall {
                        purpose: CallPurpose::ClusterSummary { cluster_id },
                        outcome: CallOutcome::Ok,
                        latency_ms,
                    });
                    info!("Cluster {} summarized ({} segments)", cluster_id + 1, segments.len());
                }
                Err(e) => {
                    let err = AnalysisError::model_call(e);
                    error!("Error analyzing cluster {}: {}", cluster_id + 1, err);
                    failed.push(cluster_id);
                    telemetry.record(PipelineEvent::ModelCall {
                        purpose: CallPurpose::ClusterSummary { cluster_id },
                        outcome: CallOutcome::Failed,
                        latency_ms,
                    });
                }
            }
        }

        // 2. Stage B: global structure over the aggregate
        let report = match self.structure(&analysis, telemetry).await {
            Ok(report) => Some(report),
            Err(err) => {
                error!("Error structuring report: {}", err);
                telemetry.record(PipelineEvent::ReportFallback);
                None
            }
        };

        NarrativeOutcome {
            structured: report.is_some(),
            report: report.unwrap_or_else(Report::unstructured),
            summarized,
            failed,
        }
    }

    /// One paced model call; latency excludes the time spent waiting on the pacer.
    async fn timed_call(&self, prompt: &str) -> (anyhow::Result<String>, u64) {
        self.pacer
            .run(async {
                let started = Instant::now();
                let result = self.model.generate(prompt).await;
                (result, started.elapsed().as_millis() as u64)
            })
            .await
    }

    async fn structure(&self, analysis: &str, telemetry: &mut TelemetryRecorder) -> Result<Report, AnalysisError> {
        if analysis.is_empty() {
            warn!("No cluster summaries available; structuring an empty analysis");
        }

        let prompt = structuring_prompt(analysis);
        let (result, latency_ms) = self.timed_call(&prompt).await;

        let (outcome, parsed) = match result {
            Ok(raw) => match parse_report(&raw) {
                Ok(report) => (CallOutcome::Ok, Ok(report)),
                Err(err) => (CallOutcome::Unusable, Err(err)),
            },
            Err(e) => (CallOutcome::Failed, Err(AnalysisError::Structuring(format!("{:#}", e)))),
        };
        telemetry.record(PipelineEvent::ModelCall {
            purpose: CallPurpose::Structuring,
            outcome,
            latency_ms,
        });
        parsed
    }
}
