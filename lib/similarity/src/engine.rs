//! Pairwise similarity engine
//!
//! Drives the full O(n²) comparison: prepares whatever the scoring policy
//! needs once per record set, scores every ordered pair of distinct ids,
//! and hands the scores to the top-k selector.

use crate::distance::{
    categorical_agreement, dimension_similarity, grade_similarity, jaccard_similarity,
};
use crate::explain::{ExplainedMatch, MatchTable, ScoreBreakdown};
use crate::hybrid::HybridIndex;
use crate::policy::{
    ConfigError, EngineConfig, FamilyBlend, FamilyScores, HybridWeights, Mode, ScoringPolicy,
};
use crate::rank::top_k_indexed;
use ahash::AHashSet;
use rfqmatch_core::{Record, RecordTable};
use tracing::{debug, info};

impl FamilyScores {
    /// Score all three weighted families for one pair
    pub fn between(a: &Record, b: &Record) -> Self {
        Self {
            dimensions: dimension_similarity(a, b),
            categorical: categorical_agreement(a, b),
            grade: grade_similarity(a, b),
        }
    }
}

/// Per-run scoring state
enum PreparedScorer {
    Families(FamilyBlend),
    Hybrid(HybridIndex, HybridWeights),
}

impl PreparedScorer {
    fn prepare(policy: ScoringPolicy, records: &[Record]) -> Self {
        match policy {
            ScoringPolicy::Weighted(weights) => {
                PreparedScorer::Families(FamilyBlend::Weighted(weights))
            }
            ScoringPolicy::SingleFamily(family) => {
                PreparedScorer::Families(FamilyBlend::Single(family))
            }
            ScoringPolicy::CosineJaccard(weights) => {
                PreparedScorer::Hybrid(HybridIndex::build(records), weights)
            }
        }
    }

    #[inline]
    fn score(&self, records: &[Record], i: usize, j: usize) -> f64 {
        match self {
            PreparedScorer::Families(blend) => {
                blend.combine(&FamilyScores::between(&records[i], &records[j]))
            }
            PreparedScorer::Hybrid(index, weights) => index.score(i, j, weights),
        }
    }

    fn breakdown(&self, records: &[Record], i: usize, j: usize) -> ScoreBreakdown {
        match self {
            PreparedScorer::Families(_) => {
                let scores = FamilyScores::between(&records[i], &records[j]);
                ScoreBreakdown {
                    dimensions: Some(scores.dimensions),
                    categorical: Some(scores.categorical),
                    grade: Some(scores.grade),
                    ..ScoreBreakdown::default()
                }
            }
            PreparedScorer::Hybrid(index, _) => ScoreBreakdown {
                cosine: Some(index.cosine(i, j)),
                jaccard: Some(index.jaccard(i, j)),
                ..ScoreBreakdown::default()
            },
        }
    }
}

/// Top-k similarity engine over a record set
#[derive(Debug, Clone)]
pub struct SimilarityEngine {
    config: EngineConfig,
    policy: ScoringPolicy,
}

impl SimilarityEngine {
    /// Validate the configuration and build an engine
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let policy = config.policy();
        Ok(Self { config, policy })
    }

    /// Build an engine from an explicit policy with default settings otherwise
    pub fn with_policy(policy: ScoringPolicy, k: usize) -> Result<Self, ConfigError> {
        policy.validate()?;
        let mut config = EngineConfig::default().with_k(k).with_mode(policy.mode());
        match policy {
            ScoringPolicy::Weighted(weights) => config.weights = weights,
            ScoringPolicy::CosineJaccard(weights) => config.hybrid_weights = weights,
            ScoringPolicy::SingleFamily(_) => {}
        }
        Ok(Self { config, policy })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn policy(&self) -> ScoringPolicy {
        self.policy
    }

    /// Total similarity of one pair under this engine's policy
    pub fn score_pair(&self, a: &Record, b: &Record) -> f64 {
        match self.policy {
            ScoringPolicy::CosineJaccard(weights) => {
                let cosine = a.numeric_features().cosine_similarity(&b.numeric_features());
                let tokens_a: AHashSet<String> = a.categorical_tokens().collect();
                let tokens_b: AHashSet<String> = b.categorical_tokens().collect();
                weights.cosine * cosine + weights.jaccard * jaccard_similarity(&tokens_a, &tokens_b)
            }
            ScoringPolicy::Weighted(weights) => {
                FamilyBlend::Weighted(weights).combine(&FamilyScores::between(a, b))
            }
            ScoringPolicy::SingleFamily(family) => {
                FamilyBlend::Single(family).combine(&FamilyScores::between(a, b))
            }
        }
    }

    /// Rank every record against all records with a different id
    pub fn run(&self, records: &[Record]) -> MatchTable {
        info!(
            "Ranking {} records (mode={}, k={}, parallel={})",
            records.len(),
            self.policy.mode(),
            self.config.k,
            self.config.parallel
        );

        let scorer = PreparedScorer::prepare(self.policy, records);
        let table = top_k_indexed(records, self.config.k, self.config.parallel, |i, j| {
            scorer.score(records, i, j)
        });

        debug!("Produced {} matches for {} records", table.len(), records.len());
        table
    }

    pub fn run_table(&self, table: &RecordTable) -> MatchTable {
        if !table.missing_columns().is_empty() {
            debug!("Scoring with absent columns: {}", table.missing_columns().join(", "));
        }
        self.run(table.records())
    }

    /// Attach per-family scores to each match of a table produced from `records`
    pub fn explain(&self, records: &[Record], table: &MatchTable) -> Vec<ExplainedMatch> {
        let scorer = PreparedScorer::prepare(self.policy, records);
        table
            .groups()
            .iter()
            .flat_map(|group| {
                let scorer = &scorer;
                group.matches.iter().map(move |m| ExplainedMatch {
                    matched: m.clone(),
                    explain: scorer.breakdown(records, group.source_index, m.target_index),
                })
            })
            .collect()
    }
}

/// Run the same record set under each ablation mode, sharing `config`'s
/// k, weights and parallelism. Each table comes with the engine that
/// produced it, so callers can explain matches without rebuilding.
pub fn run_ablation(
    config: &EngineConfig,
    records: &[Record],
) -> Result<Vec<(SimilarityEngine, MatchTable)>, ConfigError> {
    Mode::ABLATION
        .iter()
        .map(|&mode| {
            let engine = SimilarityEngine::new(config.clone().with_mode(mode))?;
            let table = engine.run(records);
            Ok((engine, table))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{Family, FamilyWeights};
    use rfqmatch_core::{Categorical, Dimension, GradeProperty, RecordId};

    fn steel(id: &str, thickness: (f64, f64)) -> Record {
        Record::new(id)
            .with_dimension(Dimension::Thickness, thickness.0, thickness.1)
            .with_dimension(Dimension::Width, 1000.0, 1500.0)
            .with_categorical(Categorical::Coating, "Z140")
            .with_categorical(Categorical::Finish, "oiled")
            .with_categorical(Categorical::Form, "coil")
            .with_categorical(Categorical::SurfaceType, "MA")
            .with_categorical(Categorical::SurfaceProtection, "none")
            .with_grade(GradeProperty::Tensile, 410.0)
            .with_grade(GradeProperty::Yield, 280.0)
            .with_grade(GradeProperty::Elongation, 22.0)
            .with_grade(GradeProperty::Reduction, 50.0)
            .with_grade(GradeProperty::Hardness, 120.0)
    }

    #[test]
    fn test_engine_rejects_bad_weights() {
        let config = EngineConfig {
            weights: FamilyWeights { dim: f64::NAN, cat: 0.3, grade: 0.3 },
            ..EngineConfig::default()
        };
        assert!(SimilarityEngine::new(config).is_err());
    }

    #[test]
    fn test_weighted_pair_score() {
        let a = steel("a", (1.0, 2.0));
        let b = steel("b", (1.5, 2.5));
        let engine = SimilarityEngine::new(EngineConfig::default()).unwrap();

        // thickness 1/3, width 1.0 -> mean 2/3
        let expected = 0.4 * (2.0 / 3.0) + 0.3 + 0.3;
        assert!((engine.score_pair(&a, &b) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_run_prefers_closest() {
        let records = vec![
            steel("a", (1.0, 2.0)),
            steel("b", (5.0, 6.0)),
            steel("c", (1.0, 2.1)),
        ];
        let engine = SimilarityEngine::new(EngineConfig::default().with_k(1)).unwrap();
        let table = engine.run(&records);

        let a = table.get(&RecordId::from("a")).unwrap();
        assert_eq!(a.len(), 1);
        assert_eq!(a[0].target_id, RecordId::from("c"));
    }

    #[test]
    fn test_single_family_policy() {
        let a = steel("a", (1.0, 2.0)).with_categorical(Categorical::Form, "sheet");
        let b = steel("b", (1.0, 2.0));
        let engine =
            SimilarityEngine::with_policy(ScoringPolicy::SingleFamily(Family::Categorical), 3).unwrap();
        assert!((engine.score_pair(&a, &b) - 0.8).abs() < 1e-12);
        assert_eq!(engine.config().mode, Mode::Categorical);
    }

    #[test]
    fn test_hybrid_run_matches_pair_score() {
        let records = vec![
            steel("a", (1.0, 2.0)),
            steel("b", (1.5, 2.5)),
            Record::new("c").with_categorical(Categorical::Coating, "AZ150"),
        ];
        let engine = SimilarityEngine::new(EngineConfig::default().with_mode(Mode::CosineJaccard)).unwrap();
        let table = engine.run(&records);

        for group in table.groups() {
            for m in &group.matches {
                let expected = engine.score_pair(&records[group.source_index], &records[m.target_index]);
                assert!((m.score - expected).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_explain_weighted() {
        let records = vec![steel("a", (1.0, 2.0)), steel("b", (1.5, 2.5))];
        let engine = SimilarityEngine::new(EngineConfig::default()).unwrap();
        let table = engine.run(&records);
        let explained = engine.explain(&records, &table);

        assert_eq!(explained.len(), 2);
        let first = &explained[0];
        assert_eq!(first.explain.categorical, Some(1.0));
        assert_eq!(first.explain.grade, Some(1.0));
        assert!(first.explain.cosine.is_none());
    }

    #[test]
    fn test_explain_hybrid() {
        let records = vec![steel("a", (1.0, 2.0)), steel("b", (1.0, 2.0))];
        let engine = SimilarityEngine::new(EngineConfig::default().with_mode(Mode::CosineJaccard)).unwrap();
        let table = engine.run(&records);
        let explained = engine.explain(&records, &table);

        assert_eq!(explained[0].explain.jaccard, Some(1.0));
        assert!(explained[0].explain.dimensions.is_none());
    }

    #[test]
    fn test_ablation_runs_every_mode() {
        let records = vec![steel("a", (1.0, 2.0)), steel("b", (1.5, 2.5)), steel("c", (3.0, 4.0))];
        let results = run_ablation(&EngineConfig::default(), &records).unwrap();
        let modes: Vec<Mode> = results.iter().map(|(engine, _)| engine.config().mode).collect();
        assert_eq!(modes, vec![Mode::Dimensions, Mode::Grade, Mode::Categorical, Mode::All]);
        for (engine, table) in &results {
            assert_eq!(engine.policy().mode(), engine.config().mode);
            assert_eq!(table.len(), 6);
            assert_eq!(*table, engine.run(&records));
        }
    }
}
