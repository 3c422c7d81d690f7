use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::feature::{Categorical, Dimension, GradeProperty, NUMERIC_FEATURE_DIM};
use crate::vector::FeatureVector;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Integer(u64),
    Uuid(Uuid),
    String(String),
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordId::String(s) => write!(f, "{}", s),
            RecordId::Uuid(u) => write!(f, "{}", u),
            RecordId::Integer(i) => write!(f, "{}", i),
        }
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        RecordId::String(s)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId::String(s.to_string())
    }
}

impl From<u64> for RecordId {
    fn from(i: u64) -> Self {
        RecordId::Integer(i)
    }
}

impl From<Uuid> for RecordId {
    fn from(u: Uuid) -> Self {
        RecordId::Uuid(u)
    }
}

/// A `(min, max)` pair where either bound may be unknown.
///
/// Bounds are stored as given; an inverted pair (`min > max`) is kept and
/// left for the scorers to treat as zero overlap.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Interval {
    min: Option<f64>,
    max: Option<f64>,
}

impl Interval {
    #[inline]
    #[must_use]
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self {
            min: min.filter(|v| v.is_finite()),
            max: max.filter(|v| v.is_finite()),
        }
    }

    #[inline]
    #[must_use]
    pub fn closed(min: f64, max: f64) -> Self {
        Self::new(Some(min), Some(max))
    }

    #[inline]
    pub fn min(&self) -> Option<f64> {
        self.min
    }

    #[inline]
    pub fn max(&self) -> Option<f64> {
        self.max
    }

    /// Both bounds, when both are known
    #[inline]
    pub fn bounds(&self) -> Option<(f64, f64)> {
        Some((self.min?, self.max?))
    }

    #[inline]
    pub fn is_inverted(&self) -> bool {
        matches!(self.bounds(), Some((lo, hi)) if lo > hi)
    }
}

/// A parsed min/max range of a reference grade property
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GradeRange {
    min: Option<f64>,
    max: Option<f64>,
}

impl GradeRange {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self {
            min: min.filter(|v| v.is_finite()),
            max: max.filter(|v| v.is_finite()),
        }
    }

    /// Midpoint of the range. A half-open range collapses to its known bound.
    pub fn midpoint(&self) -> Option<f64> {
        match (self.min, self.max) {
            (Some(lo), Some(hi)) => Some((lo + hi) / 2.0),
            (Some(lo), None) => Some(lo),
            (None, Some(hi)) => Some(hi),
            (None, None) => None,
        }
    }
}

/// One enriched RFQ
///
/// Read-only once built; the engine never mutates records.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: RecordId,
    dimensions: [Interval; Dimension::COUNT],
    categorical: [Option<String>; Categorical::COUNT],
    grades: [Option<f64>; GradeProperty::COUNT],
}

impl Record {
    /// Create a record with every feature absent
    #[must_use]
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            dimensions: [Interval::default(); Dimension::COUNT],
            categorical: Default::default(),
            grades: [None; GradeProperty::COUNT],
        }
    }

    #[inline]
    pub fn dimension(&self, dim: Dimension) -> Interval {
        self.dimensions[dim.index()]
    }

    #[inline]
    pub fn categorical(&self, field: Categorical) -> Option<&str> {
        self.categorical[field.index()].as_deref()
    }

    #[inline]
    pub fn grade(&self, property: GradeProperty) -> Option<f64> {
        self.grades[property.index()]
    }

    pub fn set_dimension(&mut self, dim: Dimension, interval: Interval) {
        self.dimensions[dim.index()] = interval;
    }

    /// Empty strings are stored as absent
    pub fn set_categorical(&mut self, field: Categorical, value: Option<String>) {
        self.categorical[field.index()] = value.filter(|v| !v.is_empty());
    }

    pub fn set_grade(&mut self, property: GradeProperty, value: Option<f64>) {
        self.grades[property.index()] = value.filter(|v| v.is_finite());
    }

    #[inline]
    #[must_use]
    pub fn with_dimension(mut self, dim: Dimension, min: f64, max: f64) -> Self {
        self.set_dimension(dim, Interval::closed(min, max));
        self
    }

    #[inline]
    #[must_use]
    pub fn with_interval(mut self, dim: Dimension, interval: Interval) -> Self {
        self.set_dimension(dim, interval);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_categorical(mut self, field: Categorical, value: impl Into<String>) -> Self {
        self.set_categorical(field, Some(value.into()));
        self
    }

    #[inline]
    #[must_use]
    pub fn with_grade(mut self, property: GradeProperty, value: f64) -> Self {
        self.set_grade(property, Some(value));
        self
    }

    #[inline]
    #[must_use]
    pub fn with_grade_range(mut self, property: GradeProperty, range: GradeRange) -> Self {
        self.set_grade(property, range.midpoint());
        self
    }

    /// Numeric feature vector for cosine comparison.
    ///
    /// Layout matches [`crate::feature::numeric_columns`]. Absent values
    /// become 0 here, unlike the interval and grade scorers.
    pub fn numeric_features(&self) -> FeatureVector {
        let mut data = Vec::with_capacity(NUMERIC_FEATURE_DIM);
        for interval in &self.dimensions {
            data.push(interval.min.unwrap_or(0.0));
            data.push(interval.max.unwrap_or(0.0));
        }
        data.extend(self.grades.iter().map(|g| g.unwrap_or(0.0)));
        FeatureVector::new(data)
    }

    /// `"field:value"` tokens for every present categorical field
    pub fn categorical_tokens(&self) -> impl Iterator<Item = String> + '_ {
        Categorical::ALL.into_iter().filter_map(move |field| {
            self.categorical(field)
                .map(|value| format!("{}:{}", field.column(), value))
        })
    }
}
