//! # rfqmatch
//!
//! Finds, for every request-for-quote (RFQ) record, the k most similar
//! other RFQs.
//!
//! Records arrive already enriched with reference grade properties. Each
//! pair is scored under one of several interchangeable models:
//!
//! - **Weighted** (`all`): `0.4 * dimensions + 0.3 * categorical + 0.3 * grade`
//!   by default, with caller-chosen weights that need not sum to 1
//! - **Single family** (`dimensions`, `categorical`, `grade`): one family alone,
//!   for ablation studies
//! - **Cosine+Jaccard** (`cosine_jaccard`): cosine over numeric features plus
//!   Jaccard over categorical tokens
//!
//! ## Quick Start
//!
//! ### As a Command
//!
//! ```bash
//! rfqmatch --input outputs/rfq_enriched.json --output outputs/top3.json
//! rfqmatch --input outputs/rfq_enriched.json --ablation --output outputs/
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use rfqmatch::prelude::*;
//!
//! let records = vec![
//!     Record::new(1u64).with_dimension(Dimension::Width, 1000.0, 1250.0),
//!     Record::new(2u64).with_dimension(Dimension::Width, 1000.0, 1500.0),
//! ];
//!
//! let engine = SimilarityEngine::new(EngineConfig::default()).unwrap();
//! let table = engine.run(&records);
//! assert_eq!(table.len(), 2);
//! ```
//!
//! ## Crate Structure
//!
//! - `rfqmatch-core` - records, column vocabulary, record tables
//! - `rfqmatch-similarity` - scorers, scoring policy, top-k engine

// Re-export core types
pub use rfqmatch_core::{
    Categorical, ColumnPolicy, Dimension, Error, GradeProperty, GradeRange, Interval, Record,
    RecordId, RecordTable, Result,
};

// Re-export similarity engine
pub use rfqmatch_similarity::{
    run_ablation, ConfigError, EngineConfig, ExplainedMatch, Family, FamilyWeights, HybridWeights,
    Match, MatchStats, MatchTable, Mode, ScoringPolicy, SimilarityEngine,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Categorical, ColumnPolicy, Dimension, EngineConfig, Error, FamilyWeights, GradeProperty,
        HybridWeights, Match, MatchTable, Mode, Record, RecordId, RecordTable, Result,
        ScoringPolicy, SimilarityEngine,
    };
}
