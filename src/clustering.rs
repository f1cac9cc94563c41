use linfa::traits::{Fit, Predict};
use linfa::DatasetBase;
use linfa_clustering::KMeans;
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

use crate::error::AnalysisError;
use crate::text::Segment;

/// Cluster id -> missing segments, in source order. Ids run `0..n_clusters`;
/// a cluster may be empty.
pub type Clusters<'a> = BTreeMap<usize, Vec<&'a Segment>>;

const MAX_ITERATIONS: u64 = 300;
const TOLERANCE: f64 = 1e-4;

/// Groups missing segments into at most `max_clusters` topical clusters.
#[derive(Debug, Clone)]
pub struct GapClusterer {
    max_clusters: usize,
    seed: u64,
}

impl GapClusterer {
    pub fn new(max_clusters: usize, seed: u64) -> Self {
        Self { max_clusters, seed }
    }

    pub fn cluster_count(&self, missing: usize) -> usize {
        self.max_clusters.min(missing)
    }

    /// Every segment lands in exactly one cluster. With one cluster or fewer
    /// no clustering algorithm runs at all.
    pub fn cluster<'a>(&self, missing: &[&'a Segment], embeddings: &[Vec<f32>]) -> Result<Clusters<'a>, AnalysisError> {
        if missing.len() != embeddings.len() {
            return Err(AnalysisError::Dependency(format!(
                "{} missing segments but {} embeddings",
                missing.len(),
                embeddings.len()
            )));
        }

        let n_clusters = self.cluster_count(missing.len());
        if n_clusters <= 1 {
            debug!("Single cluster for {} missing segments", missing.len());
            return Ok(BTreeMap::from([(0, missing.to_vec())]));
        }

        // k-means++ cannot seed more centroids than there are distinct points;
        // the surplus ids stay as empty clusters.
        let distinct = embeddings
            .iter()
            .map(|v| v.iter().map(|x| x.to_bits()).collect::<Vec<_>>())
            .collect::<HashSet<_>>()
            .len();
        let k = n_clusters.min(distinct);

        let mut clusters: Clusters<'a> = (0..n_clusters).map(|id| (id, Vec::new())).collect();
        if k <= 1 {
            clusters.insert(0, missing.to_vec());
            return Ok(clusters);
        }

        let labels = self.kmeans_labels(embeddings, k)?;
        for (segment, label) in missing.iter().zip(labels.iter()) {
            clusters.entry(*label).or_default().push(*segment);
        }

        info!(
            "Clustered {} missing segments into {} groups (sizes {:?})",
            missing.len(),
            n_clusters,
            clusters.values().map(Vec::len).collect::<Vec<_>>()
        );
        Ok(clusters)
    }

    fn kmeans_labels(&self, embeddings: &[Vec<f32>], k: usize) -> Result<Array1<usize>, AnalysisError> {
        let dim = embeddings.first().map(Vec::len).unwrap_or(0);
        if embeddings.iter().any(|v| v.len() != dim) {
            return Err(AnalysisError::Dependency("embeddings have mixed dimensions".to_string()));
        }

        let data = Array2::from_shape_fn((embeddings.len(), dim), |(i, j)| f64::from(embeddings[i][j]));
        let dataset = DatasetBase::from(data);

        let model = KMeans::params_with_rng(k, StdRng::seed_from_u64(self.seed))
            .max_n_iterations(MAX_ITERATIONS)
            .tolerance(TOLERANCE)
            .fit(&dataset)
            .map_err(|e| AnalysisError::Dependency(format!("k-means fit failed: {}", e)))?;

        let labels: Array1<usize> = model.predict(dataset.records());
        Ok(labels)
    }
}
