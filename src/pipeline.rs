use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::clustering::GapClusterer;
use crate::config::{AnalysisConfig, Settings};
use crate::embedding::{check_shape, shared_embedder, Embedder};
use crate::error::AnalysisError;
use crate::llm::{build_model, LanguageModel};
use crate::matching::{find_matches, Coverage};
use crate::summarize::{Narrator, Report};
use crate::telemetry::{PipelineEvent, RunMetrics, Stage, TelemetryRecorder};
use crate::text::{segment, Origin, Segment, SegmentMode};
use crate::transcript::extract_dialogue;

/// Result of one run with its bookkeeping.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub run_id: Uuid,
    pub report: Report,
    /// Positions of the uncovered source segments, in source order.
    pub missing_positions: Vec<usize>,
    pub metrics: RunMetrics,
}

/// The semantic-diff pipeline: extraction, segmentation, embedding, matching,
/// clustering, summarization. Strictly sequential.
///
/// Holds only read-only handles, so one `Analyzer` can serve concurrent runs;
/// every run owns its segments, embeddings, clusters and pacer.
#[derive(Clone)]
pub struct Analyzer {
    config: AnalysisConfig,
    embedder: Arc<dyn Embedder>,
    model: Arc<dyn LanguageModel>,
}

impl Analyzer {
    pub fn new(config: AnalysisConfig, embedder: Arc<dyn Embedder>, model: Arc<dyn LanguageModel>) -> Self {
        Self { config, embedder, model }
    }

    pub async fn analyze(&self, subtitle_content: &str, source_content: &str) -> Result<Report, AnalysisError> {
        self.analyze_detailed(subtitle_content, source_content)
            .await
            .map(|analysis| analysis.report)
    }

    pub async fn analyze_detailed(&self, subtitle_content: &str, source_content: &str) -> Result<Analysis, AnalysisError> {
        let run_id = Uuid::new_v4();
        let mut telemetry = TelemetryRecorder::new();
        info!("Starting analysis pipeline (run {})", run_id);

        // 1. Transcript extraction
        let started = Instant::now();
        let transcript_text = extract_dialogue(subtitle_content)?;
        telemetry.stage_done(Stage::Extraction, started);

        // 2. Segmentation
        let started = Instant::now();
        let min_words = self.config.min_segment_words;
        let transcript_segments = segment(&transcript_text, SegmentMode::Transcript, min_words);
        let source_segments = segment(source_content, SegmentMode::Source, min_words);
        telemetry.record(PipelineEvent::SegmentsProduced {
            origin: Origin::Transcript,
            count: transcript_segments.len(),
        });
        telemetry.record(PipelineEvent::SegmentsProduced {
            origin: Origin::Source,
            count: source_segments.len(),
        });
        telemetry.stage_done(Stage::Segmentation, started);
        info!(
            "Segmented {} source and {} transcript segments",
            source_segments.len(),
            transcript_segments.len()
        );

        if source_segments.is_empty() || transcript_segments.is_empty() {
            return Err(AnalysisError::Validation(
                "one of the inputs resulted in zero valid text segments".to_string(),
            ));
        }

        // 3. Embedding
        let started = Instant::now();
        let source_embeddings = self.embed(&source_segments).await?;
        let transcript_embeddings = self.embed(&transcript_segments).await?;
        telemetry.stage_done(Stage::Embedding, started);

        // 4. Matching
        let started = Instant::now();
        let (matches, source_embeddings) = find_matches(source_embeddings, transcript_embeddings)?;
        let coverage = Coverage::from_matches(&matches, source_segments.len(), self.config.similarity_threshold);
        let missing_positions = coverage.missing();
        telemetry.record(PipelineEvent::CoverageComputed {
            covered: coverage.covered_count(),
            missing: missing_positions.len(),
        });
        telemetry.stage_done(Stage::Matching, started);
        info!(
            "Coverage: {}/{} source segments matched, {} missing",
            coverage.covered_count(),
            source_segments.len(),
            missing_positions.len()
        );

        if missing_positions.is_empty() {
            return Ok(Analysis {
                run_id,
                report: Report::no_differences(),
                missing_positions,
                metrics: telemetry.snapshot(),
            });
        }

        // 5. Gap clustering
        let started = Instant::now();
        let missing: Vec<&Segment> = missing_positions.iter().map(|&i| &source_segments[i]).collect();
        let missing_embeddings: Vec<Vec<f32>> = missing_positions.iter().map(|&i| source_embeddings[i].clone()).collect();
        let clusterer = GapClusterer::new(self.config.max_clusters, self.config.cluster_seed);
        let clusters = clusterer.cluster(&missing, &missing_embeddings)?;
        for (&cluster_id, members) in &clusters {
            telemetry.record(PipelineEvent::ClusterFormed {
                cluster_id,
                size: members.len(),
            });
        }
        telemetry.stage_done(Stage::Clustering, started);

        // 6. Narrative summarization
        let started = Instant::now();
        let narrator = Narrator::new(Arc::clone(&self.model), self.config.model_call_delay);
        let outcome = narrator.summarize(&clusters, &mut telemetry).await;
        telemetry.stage_done(Stage::Summarization, started);
        if !outcome.failed.is_empty() {
            warn!("{} cluster(s) skipped after model failures", outcome.failed.len());
        }
        info!(
            "Analysis pipeline finished (run {}): {} categories, structured: {}",
            run_id,
            outcome.report.categories.len(),
            outcome.structured
        );

        Ok(Analysis {
            run_id,
            report: outcome.report,
            missing_positions,
            metrics: telemetry.snapshot(),
        })
    }

    async fn embed(&self, segments: &[Segment]) -> Result<Vec<Vec<f32>>, AnalysisError> {
        let texts: Vec<String> = segments.iter().map(|s| s.text().to_string()).collect();
        let vectors = self.embedder.embed(&texts).await?;
        let dim = check_shape(&vectors, texts.len())?;
        debug!("Embedded {} segments with {} (d = {})", texts.len(), self.embedder.model_id(), dim);
        Ok(vectors)
    }
}

/// One-shot entry point: reuses the process-wide embedder, builds the
/// configured language model and runs a single analysis.
pub async fn run_pipeline(subtitle_content: &str, source_content: &str, settings: &Settings) -> Result<Report, AnalysisError> {
    let embedder = shared_embedder(&settings.embedder, settings.request_timeout).await?;
    let model = build_model(&settings.llm, settings.request_timeout).map_err(AnalysisError::dependency)?;
    Analyzer::new(settings.analysis.clone(), embedder, model)
        .analyze(subtitle_content, source_content)
        .await
}
