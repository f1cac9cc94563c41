pub mod clustering;
pub mod config;
pub mod embedding;
pub mod error;
pub mod llm;
pub mod matching;
pub mod pipeline;
pub mod summarize;
pub mod telemetry;
pub mod text;
pub mod transcript;

// Re-export specific items for convenient access
pub use config::{AnalysisConfig, Settings};
pub use error::AnalysisError;
pub use pipeline::{run_pipeline, Analysis, Analyzer};
pub use summarize::{Category, Report};
