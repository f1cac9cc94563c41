use std::collections::BTreeSet;
use tracing::debug;

use super::index::{normalize_l2, FlatIndex};
use crate::error::AnalysisError;

/// Best source match for one transcript segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchResult {
    pub transcript_index: usize,
    pub source_index: usize,
    /// Cosine similarity, always within `[-1, 1]`.
    pub score: f32,
}

/// Nearest source segment for every transcript segment.
///
/// Both sets are L2-normalized first, so the inner product is the cosine.
/// Returns the matches plus the normalized source embeddings.
pub fn find_matches(
    mut source: Vec<Vec<f32>>,
    mut transcript: Vec<Vec<f32>>,
) -> Result<(Vec<MatchResult>, Vec<Vec<f32>>), AnalysisError> {
    let dim = source
        .first()
        .map(Vec::len)
        .ok_or_else(|| AnalysisError::Dependency("no source embeddings to index".to_string()))?;

    source.iter_mut().for_each(|v| normalize_l2(v));
    transcript.iter_mut().for_each(|v| normalize_l2(v));

    let mut index = FlatIndex::new(dim);
    for row in &source {
        index.add(row.clone())?;
    }

    let mut matches = Vec::with_capacity(transcript.len());
    for (transcript_index, query) in transcript.iter().enumerate() {
        let hit = index
            .search(query, 1)?
            .into_iter()
            .next()
            .ok_or_else(|| AnalysisError::Dependency("index returned no neighbor".to_string()))?;
        matches.push(MatchResult {
            transcript_index,
            source_index: hit.index,
            score: hit.score.clamp(-1.0, 1.0),
        });
    }

    debug!("Matched {} transcript segments against {} source segments", matches.len(), index.len());
    Ok((matches, source))
}

/// Which source segments have at least one sufficiently similar transcript counterpart.
#[derive(Debug, Clone, PartialEq)]
pub struct Coverage {
    source_len: usize,
    covered: BTreeSet<usize>,
}

impl Coverage {
    /// A match covers its source segment only when `score > threshold`.
    pub fn from_matches(matches: &[MatchResult], source_len: usize, threshold: f32) -> Self {
        let covered = matches
            .iter()
            .filter(|m| m.score > threshold && m.source_index < source_len)
            .map(|m| m.source_index)
            .collect();
        Self { source_len, covered }
    }

    pub fn is_covered(&self, source_index: usize) -> bool {
        self.covered.contains(&source_index)
    }

    pub fn covered(&self) -> &BTreeSet<usize> {
        &self.covered
    }

    pub fn covered_count(&self) -> usize {
        self.covered.len()
    }

    /// Uncovered source indices in original order.
    pub fn missing(&self) -> Vec<usize> {
        (0..self.source_len).filter(|i| !self.covered.contains(i)).collect()
    }

    pub fn is_complete(&self) -> bool {
        self.covered.len() == self.source_len
    }
}
