//! Process-wide embedder.
//!
//! Loading an embedding model is expensive, so the first caller builds it and
//! every later run reuses the same read-only instance. There is no teardown.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

use super::{build_embedder, Embedder};
use crate::config::EmbedderSettings;
use crate::error::AnalysisError;

static SHARED: OnceCell<Arc<dyn Embedder>> = OnceCell::const_new();

/// Returns the process embedder, building it from `settings` on first use.
///
/// Settings passed after the first successful initialization are ignored.
/// A failed initialization leaves the cell empty so the next run retries.
pub async fn shared_embedder(settings: &EmbedderSettings, timeout: Duration) -> Result<Arc<dyn Embedder>, AnalysisError> {
    SHARED
        .get_or_try_init(|| async { build_embedder(settings, timeout).map_err(AnalysisError::dependency) })
        .await
        .map(Arc::clone)
}

/// The embedder if one has been initialized already.
pub fn loaded() -> Option<Arc<dyn Embedder>> {
    SHARED.get().map(Arc::clone)
}
