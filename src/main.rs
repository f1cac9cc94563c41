use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use gapfinder::config::{EmbedderSettings, Settings, DEFAULT_HASHING_DIM};
use gapfinder::embedding::shared_embedder;
use gapfinder::llm::build_model;
use gapfinder::text::{segment, SegmentMode};
use gapfinder::transcript::extract_dialogue;
use gapfinder::Analyzer;

/// Finds what an adaptation cut from its source text.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compare a subtitle track against the source text and print the report as JSON
    Analyze {
        /// SubRip (.srt) subtitle file of the adaptation
        #[arg(long)]
        subtitles: PathBuf,
        /// Plain-text source, one narrative unit per line
        #[arg(long)]
        source: PathBuf,
        /// Use the offline hashing embedder instead of the configured endpoint
        #[arg(long)]
        offline: bool,
        /// Similarity a match must exceed to count as adapted
        #[arg(long)]
        threshold: Option<f32>,
        /// Upper bound on topic clusters
        #[arg(long)]
        max_clusters: Option<usize>,
        /// Seconds to wait between language-model calls
        #[arg(long)]
        delay_secs: Option<f64>,
        /// Log per-run metrics after the report
        #[arg(long)]
        metrics: bool,
    },

    /// Print the segments that survive filtering
    Segments {
        #[arg(long, conflicts_with = "subtitles", required_unless_present = "subtitles")]
        source: Option<PathBuf>,
        #[arg(long)]
        subtitles: Option<PathBuf>,
        #[arg(long, default_value_t = gapfinder::config::DEFAULT_MIN_SEGMENT_WORDS)]
        min_words: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber failed")?;

    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze {
            subtitles,
            source,
            offline,
            threshold,
            max_clusters,
            delay_secs,
            metrics,
        } => {
            let mut settings = Settings::from_env()?;
            if offline {
                settings.embedder = EmbedderSettings::Hashing {
                    dimensions: DEFAULT_HASHING_DIM,
                };
            }
            if let Some(threshold) = threshold {
                if !(-1.0..=1.0).contains(&threshold) {
                    bail!("--threshold must lie in [-1, 1]");
                }
                settings.analysis.similarity_threshold = threshold;
            }
            if let Some(max_clusters) = max_clusters {
                settings.analysis.max_clusters = max_clusters;
            }
            if let Some(secs) = delay_secs {
                settings.analysis.model_call_delay =
                    Duration::try_from_secs_f64(secs).context("--delay-secs must be a non-negative number")?;
            }

            let subtitle_content = read_input(&subtitles).await?;
            let source_content = read_input(&source).await?;

            let embedder = shared_embedder(&settings.embedder, settings.request_timeout).await?;
            let model = build_model(&settings.llm, settings.request_timeout)?;
            let analyzer = Analyzer::new(settings.analysis.clone(), embedder, model);

            let analysis = analyzer.analyze_detailed(&subtitle_content, &source_content).await?;
            println!("{}", serde_json::to_string_pretty(&analysis.report)?);
            if metrics {
                tracing::info!("Run metrics: {}", serde_json::to_string(&analysis.metrics)?);
            }
        }
        Commands::Segments {
            source,
            subtitles,
            min_words,
        } => {
            let segments = match (source, subtitles) {
                (Some(path), _) => segment(&read_input(&path).await?, SegmentMode::Source, min_words),
                (None, Some(path)) => {
                    let dialogue = extract_dialogue(&read_input(&path).await?)?;
                    segment(&dialogue, SegmentMode::Transcript, min_words)
                }
                (None, None) => bail!("either --source or --subtitles is required"),
            };
            for s in &segments {
                println!("{:>5}  {}", s.position(), s.text());
            }
            tracing::info!("{} segments", segments.len());
        }
    }

    Ok(())
}

async fn read_input(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))
}
