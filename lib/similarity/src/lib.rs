//! # rfqmatch Similarity
//!
//! Pairwise similarity scoring and top-k retrieval for enriched RFQ records.
//!
//! ## Features
//!
//! - **Interval overlap**: normalized overlap of `(min, max)` dimensions
//! - **Categorical agreement**: exact-match agreement across fixed string fields
//! - **Grade proximity**: bounded relative distance between grade midpoints
//! - **Cosine+Jaccard hybrid**: numeric cosine plus categorical token Jaccard
//! - **Scoring policy**: weighted blend, single family, or hybrid
//! - **Top-k selection**: deterministic, stable ranking with self exclusion
//! - **Explainability**: per-family breakdown and run statistics
//!
//! ## Example
//!
//! ```rust
//! use rfqmatch_core::{Record, Dimension, Categorical};
//! use rfqmatch_similarity::{EngineConfig, SimilarityEngine};
//!
//! let records = vec![
//!     Record::new("RFQ-1").with_dimension(Dimension::Thickness, 1.0, 2.0)
//!         .with_categorical(Categorical::Coating, "Z140"),
//!     Record::new("RFQ-2").with_dimension(Dimension::Thickness, 1.5, 2.5)
//!         .with_categorical(Categorical::Coating, "Z140"),
//!     Record::new("RFQ-3").with_dimension(Dimension::Thickness, 8.0, 9.0),
//! ];
//!
//! let engine = SimilarityEngine::new(EngineConfig::default()).unwrap();
//! let table = engine.run(&records);
//!
//! let best = &table.get(&"RFQ-1".into()).unwrap()[0];
//! assert_eq!(best.target_id.to_string(), "RFQ-2");
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌─────────────┐
//! │   Records   │────>│   Scorers    │────>│  Combiner   │
//! │ (features)  │     │ (per family) │     │  (policy)   │
//! └─────────────┘     └──────────────┘     └─────────────┘
//!                                                 │
//!                     ┌──────────────┐     ┌─────────────┐
//!                     │   Explain    │<────│   Top-k     │
//!                     │  (results)   │     │ (per source)│
//!                     └──────────────┘     └─────────────┘
//! ```

pub mod distance;
pub mod engine;
pub mod explain;
pub mod hybrid;
pub mod policy;
pub mod rank;

// Re-export main types for convenience
pub use distance::{
    categorical_agreement, dimension_overlap, dimension_similarity, grade_similarity,
    interval_overlap, jaccard_similarity, relative_proximity,
};
pub use engine::{run_ablation, SimilarityEngine};
pub use explain::{ExplainedMatch, MatchGroup, MatchStats, MatchTable, ScoreBreakdown};
pub use hybrid::HybridIndex;
pub use policy::{
    combine, ConfigError, EngineConfig, Family, FamilyBlend, FamilyScores, FamilyWeights,
    HybridWeights, Mode, ScoringPolicy, DEFAULT_TOP_K,
};
pub use rank::{select_top_k, top_k, top_k_indexed, Candidate, Match};
