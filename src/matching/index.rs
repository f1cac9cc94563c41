use crate::error::AnalysisError;

/// Scales `vector` to unit length in place. Zero vectors are left untouched.
pub fn normalize_l2(vector: &mut [f32]) {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        vector.iter_mut().for_each(|v| *v /= norm);
    }
}

pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Exact inner-product index. Equivalent to brute-force argmax over all rows.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    dim: usize,
    rows: Vec<Vec<f32>>,
}

/// One search hit: row index and inner product.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub index: usize,
    pub score: f32,
}

impl FlatIndex {
    pub fn new(dim: usize) -> Self {
        Self { dim, rows: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn add(&mut self, row: Vec<f32>) -> Result<(), AnalysisError> {
        if row.len() != self.dim {
            return Err(AnalysisError::Dependency(format!(
                "index expects dimension {}, got {}",
                self.dim,
                row.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Top `k` rows by inner product, best first. Ties go to the lower row index.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Hit>, AnalysisError> {
        if self.rows.is_empty() {
            return Err(AnalysisError::Dependency("search on an empty index".to_string()));
        }
        if query.len() != self.dim {
            return Err(AnalysisError::Dependency(format!(
                "query has dimension {}, index expects {}",
                query.len(),
                self.dim
            )));
        }

        let mut hits: Vec<Hit> = self
            .rows
            .iter()
            .enumerate()
            .map(|(index, row)| Hit {
                index,
                score: dot(row, query),
            })
            .collect();
        // Stable sort keeps lower indices first among equal scores.
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(k);
        Ok(hits)
    }
}
