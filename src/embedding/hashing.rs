use anyhow::{ensure, Result};
use async_trait::async_trait;

use super::Embedder;
use crate::error::AnalysisError;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;
const PAIR_WEIGHT: f32 = 0.5;

/// Offline embedder: hashes lower-cased words and adjacent word pairs into a
/// fixed number of signed buckets, then L2-normalizes.
///
/// Texts that share vocabulary land close together; identical texts map to
/// identical vectors. No model download, no randomness.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
    model_id: String,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Result<Self> {
        ensure!(dimensions >= 8, "hashing embedder needs at least 8 dimensions, got {}", dimensions);
        Ok(Self {
            dimensions,
            model_id: format!("hashing-{}", dimensions),
        })
    }

    pub fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        let words: Vec<String> = unicode_segmentation::UnicodeSegmentation::unicode_words(text)
            .map(str::to_lowercase)
            .collect();

        for word in &words {
            self.bump(&mut vector, fnv1a(word.as_bytes()), 1.0);
        }
        for pair in words.windows(2) {
            let key = format!("{} {}", pair[0], pair[1]);
            self.bump(&mut vector, fnv1a(key.as_bytes()), PAIR_WEIGHT);
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        vector
    }

    fn bump(&self, vector: &mut [f32], hash: u64, weight: f32) {
        let bucket = (hash % self.dimensions as u64) as usize;
        // Top bit picks the sign so unrelated collisions tend to cancel.
        let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign * weight;
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AnalysisError> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .fold(FNV_OFFSET, |hash, b| (hash ^ u64::from(*b)).wrapping_mul(FNV_PRIME))
}
