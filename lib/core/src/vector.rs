/// Dense numeric feature vector
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    data: Vec<f64>,
}

impl FeatureVector {
    #[inline]
    #[must_use]
    pub fn new(data: Vec<f64>) -> Self {
        Self { data }
    }

    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub fn dot(&self, other: &FeatureVector) -> f64 {
        dot_product(&self.data, &other.data)
    }

    #[inline]
    pub fn norm(&self) -> f64 {
        dot_product(&self.data, &self.data).sqrt()
    }

    /// Cosine similarity, 0 when either vector has zero magnitude
    #[inline]
    pub fn cosine_similarity(&self, other: &FeatureVector) -> f64 {
        if self.dim() != other.dim() {
            return 0.0;
        }
        cosine_with_norms(self.dot(other), self.norm(), other.norm())
    }
}

/// Dot product with two accumulators for better pipelining
#[inline]
pub fn dot_product(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }

    let mut sum1 = 0.0;
    let mut sum2 = 0.0;
    let mut pairs = a.chunks_exact(2).zip(b.chunks_exact(2));
    for (x, y) in &mut pairs {
        sum1 += x[0] * y[0];
        sum2 += x[1] * y[1];
    }
    if a.len() % 2 == 1 {
        let last = a.len() - 1;
        sum1 += a[last] * b[last];
    }
    sum1 + sum2
}

/// Cosine from a precomputed dot product and norms
#[inline]
pub fn cosine_with_norms(dot: f64, norm_a: f64, norm_b: f64) -> f64 {
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
