//! Column vocabulary
//!
//! The engine works over a fixed, known set of columns. Each feature family
//! is an enum whose variants map one-to-one onto column names in the
//! enriched RFQ table:
//!
//! - [`Dimension`]: `<name>_min` / `<name>_max` interval pairs
//! - [`Categorical`]: plain string columns
//! - [`GradeProperty`]: `<name>_mid` scalar midpoints of reference grade ranges

use serde::{Deserialize, Serialize};

/// Dimensional attributes carried as a `(min, max)` interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Thickness,
    Width,
    Length,
    Height,
    Weight,
    InnerDiameter,
    OuterDiameter,
}

impl Dimension {
    pub const COUNT: usize = 7;

    pub const ALL: [Dimension; Self::COUNT] = [
        Dimension::Thickness,
        Dimension::Width,
        Dimension::Length,
        Dimension::Height,
        Dimension::Weight,
        Dimension::InnerDiameter,
        Dimension::OuterDiameter,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Dimension::Thickness => "thickness",
            Dimension::Width => "width",
            Dimension::Length => "length",
            Dimension::Height => "height",
            Dimension::Weight => "weight",
            Dimension::InnerDiameter => "inner_diameter",
            Dimension::OuterDiameter => "outer_diameter",
        }
    }

    pub fn min_column(self) -> String {
        format!("{}_min", self.name())
    }

    pub fn max_column(self) -> String {
        format!("{}_max", self.name())
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// String-valued attributes compared by exact match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Categorical {
    Coating,
    Finish,
    Form,
    SurfaceType,
    SurfaceProtection,
}

impl Categorical {
    pub const COUNT: usize = 5;

    pub const ALL: [Categorical; Self::COUNT] = [
        Categorical::Coating,
        Categorical::Finish,
        Categorical::Form,
        Categorical::SurfaceType,
        Categorical::SurfaceProtection,
    ];

    /// Column name, also used as the token prefix in categorical feature sets
    pub fn column(self) -> &'static str {
        match self {
            Categorical::Coating => "coating",
            Categorical::Finish => "finish",
            Categorical::Form => "form",
            Categorical::SurfaceType => "surface_type",
            Categorical::SurfaceProtection => "surface_protection",
        }
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// Mechanical properties looked up from the grade reference table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradeProperty {
    Tensile,
    Yield,
    Elongation,
    Reduction,
    Hardness,
}

impl GradeProperty {
    pub const COUNT: usize = 5;

    pub const ALL: [GradeProperty; Self::COUNT] = [
        GradeProperty::Tensile,
        GradeProperty::Yield,
        GradeProperty::Elongation,
        GradeProperty::Reduction,
        GradeProperty::Hardness,
    ];

    pub fn name(self) -> &'static str {
        match self {
            GradeProperty::Tensile => "tensile",
            GradeProperty::Yield => "yield",
            GradeProperty::Elongation => "elongation",
            GradeProperty::Reduction => "reduction",
            GradeProperty::Hardness => "hardness",
        }
    }

    pub fn mid_column(self) -> String {
        format!("{}_mid", self.name())
    }

    pub fn min_column(self) -> String {
        format!("{}_min", self.name())
    }

    pub fn max_column(self) -> String {
        format!("{}_max", self.name())
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// Columns that feed the numeric feature vector, in vector order:
/// every dimension's min then max, followed by every grade midpoint.
pub fn numeric_columns() -> Vec<String> {
    let mut columns = Vec::with_capacity(NUMERIC_FEATURE_DIM);
    for dim in Dimension::ALL {
        columns.push(dim.min_column());
        columns.push(dim.max_column());
    }
    for grade in GradeProperty::ALL {
        columns.push(grade.mid_column());
    }
    columns
}

/// Length of the numeric feature vector
pub const NUMERIC_FEATURE_DIM: usize = Dimension::COUNT * 2 + GradeProperty::COUNT;
