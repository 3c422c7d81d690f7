//! Per-family similarity functions
//!
//! Each weighted family treats missing data its own way:
//!
//! - dimensions: a dimension either record lacks is left out of the mean
//! - categorical: a missing field counts as disagreement
//! - grade: a missing or all-zero property counts as 0 and stays in the mean
//!
//! These rules are not interchangeable; changing one shifts every ranking.

use ahash::AHashSet;
use rfqmatch_core::{Categorical, Dimension, GradeProperty, Interval, Record};

/// Normalized overlap of two intervals
///
/// `overlap / combined span`, in [0.0, 1.0]. Returns 0.0 when any bound is
/// absent and when the combined span is zero, so two identical point
/// intervals score 0.0 as well.
pub fn interval_overlap(
    min1: Option<f64>,
    max1: Option<f64>,
    min2: Option<f64>,
    max2: Option<f64>,
) -> f64 {
    dimension_overlap(Interval::new(min1, max1), Interval::new(min2, max2)).unwrap_or(0.0)
}

/// Overlap for one dimension, `None` when it cannot be computed
///
/// An inverted interval is malformed data and yields `Some(0.0)`: it is a
/// zero-overlap comparison, not a missing one.
pub fn dimension_overlap(a: Interval, b: Interval) -> Option<f64> {
    let (min1, max1) = a.bounds()?;
    let (min2, max2) = b.bounds()?;

    if a.is_inverted() || b.is_inverted() {
        return Some(0.0);
    }

    let overlap = (max1.min(max2) - min1.max(min2)).max(0.0);
    let span = max1.max(max2) - min1.min(min2);

    Some(if span > 0.0 { overlap / span } else { 0.0 })
}

/// Mean overlap across the fixed dimensions, skipping dimensions that
/// cannot be compared. 0.0 when no dimension is comparable.
pub fn dimension_similarity(a: &Record, b: &Record) -> f64 {
    let (sum, count) = Dimension::ALL
        .iter()
        .filter_map(|&dim| dimension_overlap(a.dimension(dim), b.dimension(dim)))
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// 1.0 when both values are present and equal (case-sensitive), else 0.0
#[inline]
pub fn categorical_match(a: Option<&str>, b: Option<&str>) -> f64 {
    match (a, b) {
        (Some(x), Some(y)) if x == y => 1.0,
        _ => 0.0,
    }
}

/// Fraction of the fixed categorical fields on which both records agree
pub fn categorical_agreement(a: &Record, b: &Record) -> f64 {
    let matches: f64 = Categorical::ALL
        .iter()
        .map(|&field| categorical_match(a.categorical(field), b.categorical(field)))
        .sum();
    matches / Categorical::COUNT as f64
}

/// Relative proximity of two non-negative scalars: `1 - |a - b| / max(a, b)`
///
/// 0.0 when either value is absent or negative, or when both are zero.
#[inline]
pub fn relative_proximity(a: Option<f64>, b: Option<f64>) -> f64 {
    match (a, b) {
        (Some(v1), Some(v2)) if v1 >= 0.0 && v2 >= 0.0 => {
            let max = v1.max(v2);
            if max > 0.0 {
                1.0 - (v1 - v2).abs() / max
            } else {
                0.0
            }
        }
        _ => 0.0,
    }
}

/// Mean proximity over the fixed grade properties, always divided by their count
pub fn grade_similarity(a: &Record, b: &Record) -> f64 {
    let total: f64 = GradeProperty::ALL
        .iter()
        .map(|&property| relative_proximity(a.grade(property), b.grade(property)))
        .sum();
    total / GradeProperty::COUNT as f64
}

/// Jaccard index of two token sets; two empty sets are identical (1.0)
pub fn jaccard_similarity(a: &AHashSet<String>, b: &AHashSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }

    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;

    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}
