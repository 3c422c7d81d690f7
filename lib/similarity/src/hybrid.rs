//! Cosine+Jaccard hybrid scoring
//!
//! Numeric features are compared by cosine similarity with absent values
//! filled as 0; categorical fields become `"field:value"` token sets
//! compared by Jaccard, where two empty sets count as a perfect match.
//! Vectors, norms and token sets are built once per record set and shared
//! read-only by every comparison.

use crate::distance::jaccard_similarity;
use crate::policy::HybridWeights;
use ahash::AHashSet;
use rfqmatch_core::{cosine_with_norms, FeatureVector, Record};

/// Precomputed hybrid features for a record set, indexed by input position
#[derive(Debug, Clone)]
pub struct HybridIndex {
    vectors: Vec<FeatureVector>,
    norms: Vec<f64>,
    tokens: Vec<AHashSet<String>>,
}

impl HybridIndex {
    pub fn build(records: &[Record]) -> Self {
        let vectors: Vec<FeatureVector> = records.iter().map(Record::numeric_features).collect();
        let norms = vectors.iter().map(FeatureVector::norm).collect();
        let tokens = records
            .iter()
            .map(|r| r.categorical_tokens().collect())
            .collect();

        Self {
            vectors,
            norms,
            tokens,
        }
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Cosine similarity between records `i` and `j`
    #[inline]
    pub fn cosine(&self, i: usize, j: usize) -> f64 {
        let dot = self.vectors[i].dot(&self.vectors[j]);
        cosine_with_norms(dot, self.norms[i], self.norms[j])
    }

    /// Jaccard similarity between the categorical token sets of `i` and `j`
    #[inline]
    pub fn jaccard(&self, i: usize, j: usize) -> f64 {
        jaccard_similarity(&self.tokens[i], &self.tokens[j])
    }

    #[inline]
    pub fn score(&self, i: usize, j: usize, weights: &HybridWeights) -> f64 {
        weights.cosine * self.cosine(i, j) + weights.jaccard * self.jaccard(i, j)
    }
}
