pub mod hashing;
pub mod http;
pub mod shared;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::config::EmbedderSettings;
use crate::error::AnalysisError;

pub use hashing::HashingEmbedder;
pub use http::HttpEmbedder;
pub use shared::shared_embedder;

/// Sentence-embedding provider shared by source and transcript segments.
///
/// Invariant: for a fixed model and input string the output is identical on
/// every call, and every row has the same dimensionality.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AnalysisError>;

    fn model_id(&self) -> &str;
}

/// Builds the configured embedder. Loading happens here, once.
pub fn build_embedder(settings: &EmbedderSettings, timeout: Duration) -> anyhow::Result<Arc<dyn Embedder>> {
    let embedder: Arc<dyn Embedder> = match settings {
        EmbedderSettings::Hashing { dimensions } => Arc::new(HashingEmbedder::new(*dimensions)?),
        EmbedderSettings::Http {
            base_url,
            model,
            api_key,
            dimensions,
        } => Arc::new(HttpEmbedder::new(
            base_url,
            model,
            api_key.as_deref(),
            *dimensions,
            timeout,
        )?),
    };
    tracing::info!("Embedder ready: {}", embedder.model_id());
    Ok(embedder)
}

/// Checks the shape contract of an embedder response.
pub(crate) fn check_shape(vectors: &[Vec<f32>], expected_rows: usize) -> Result<usize, AnalysisError> {
    if vectors.len() != expected_rows {
        return Err(AnalysisError::Dependency(format!(
            "embedder returned {} vectors for {} inputs",
            vectors.len(),
            expected_rows
        )));
    }
    let dim = vectors.first().map(Vec::len).unwrap_or(0);
    if expected_rows > 0 && dim == 0 {
        return Err(AnalysisError::Dependency("embedder returned empty vectors".to_string()));
    }
    if let Some(bad) = vectors.iter().position(|v| v.len() != dim) {
        return Err(AnalysisError::Dependency(format!(
            "embedding {} has dimension {}, expected {}",
            bad,
            vectors[bad].len(),
            dim
        )));
    }
    Ok(dim)
}
