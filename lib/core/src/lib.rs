//! # rfqmatch Core
//!
//! Data model for the rfqmatch similarity engine.
//!
//! - [`Record`] - one enriched RFQ: interval dimensions, categorical fields, grade midpoints
//! - [`RecordId`] - stable record identifier (integer, UUID or string)
//! - [`Dimension`], [`Categorical`], [`GradeProperty`] - the fixed column vocabulary
//! - [`RecordTable`] - records loaded from enriched JSON rows, with missing-column tracking
//! - [`FeatureVector`] - dense numeric features for cosine comparison
//!
//! ## Example
//!
//! ```rust
//! use rfqmatch_core::{Record, Dimension, Categorical, GradeProperty};
//!
//! let record = Record::new("RFQ-1")
//!     .with_dimension(Dimension::Thickness, 1.0, 2.0)
//!     .with_categorical(Categorical::Coating, "Z140")
//!     .with_grade(GradeProperty::Tensile, 410.0);
//!
//! assert_eq!(record.dimension(Dimension::Thickness).bounds(), Some((1.0, 2.0)));
//! ```

pub mod error;
pub mod feature;
pub mod record;
pub mod table;
pub mod vector;

pub use error::{Error, Result};
pub use feature::{numeric_columns, Categorical, Dimension, GradeProperty, NUMERIC_FEATURE_DIM};
pub use record::{GradeRange, Interval, Record, RecordId};
pub use table::{ColumnPolicy, RecordTable};
pub use vector::{cosine_with_norms, dot_product, FeatureVector};
