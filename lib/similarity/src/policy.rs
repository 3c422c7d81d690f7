//! Scoring policy and engine configuration
//!
//! A [`ScoringPolicy`] decides how per-pair family scores become one total.
//! [`EngineConfig`] is the serde-facing form loaded from JSON or assembled
//! from command-line flags; [`EngineConfig::validate`] rejects bad input
//! before any record is scored.

use rfqmatch_core::ColumnPolicy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default number of matches kept per record
pub const DEFAULT_TOP_K: usize = 3;

/// One of the weighted-blend families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    Dimensions,
    Categorical,
    Grade,
}

/// Coefficients of the weighted blend. Not required to sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FamilyWeights {
    #[serde(default = "default_dim_weight")]
    pub dim: f64,
    #[serde(default = "default_cat_weight")]
    pub cat: f64,
    #[serde(default = "default_grade_weight")]
    pub grade: f64,
}

fn default_dim_weight() -> f64 {
    0.4
}

fn default_cat_weight() -> f64 {
    0.3
}

fn default_grade_weight() -> f64 {
    0.3
}

impl Default for FamilyWeights {
    fn default() -> Self {
        Self {
            dim: default_dim_weight(),
            cat: default_cat_weight(),
            grade: default_grade_weight(),
        }
    }
}

impl FamilyWeights {
    pub fn sum(&self) -> f64 {
        self.dim + self.cat + self.grade
    }

    fn validate(&self) -> Result<(), ConfigError> {
        check_weight("dim", self.dim)?;
        check_weight("cat", self.cat)?;
        check_weight("grade", self.grade)
    }
}

/// Coefficients of the cosine+Jaccard hybrid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HybridWeights {
    #[serde(default = "default_cosine_weight")]
    pub cosine: f64,
    #[serde(default = "default_jaccard_weight")]
    pub jaccard: f64,
}

fn default_cosine_weight() -> f64 {
    0.6
}

fn default_jaccard_weight() -> f64 {
    0.4
}

impl Default for HybridWeights {
    fn default() -> Self {
        Self {
            cosine: default_cosine_weight(),
            jaccard: default_jaccard_weight(),
        }
    }
}

impl HybridWeights {
    fn validate(&self) -> Result<(), ConfigError> {
        check_weight("cosine", self.cosine)?;
        check_weight("jaccard", self.jaccard)
    }
}

fn check_weight(name: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NonFiniteWeight(name.to_string()));
    }
    if value < 0.0 {
        return Err(ConfigError::NegativeWeight {
            name: name.to_string(),
            value,
        });
    }
    Ok(())
}

/// Per-pair scores of the three weighted families
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FamilyScores {
    pub dimensions: f64,
    pub categorical: f64,
    pub grade: f64,
}

impl FamilyScores {
    pub fn get(&self, family: Family) -> f64 {
        match family {
            Family::Dimensions => self.dimensions,
            Family::Categorical => self.categorical,
            Family::Grade => self.grade,
        }
    }
}

/// How per-family scores are turned into a total
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoringPolicy {
    /// Linear blend of the three families
    Weighted(FamilyWeights),
    /// Cosine over numeric features plus Jaccard over categorical tokens
    CosineJaccard(HybridWeights),
    /// A single family on its own
    SingleFamily(Family),
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        ScoringPolicy::Weighted(FamilyWeights::default())
    }
}

/// The policies that reduce [`FamilyScores`] to a total
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FamilyBlend {
    Weighted(FamilyWeights),
    Single(Family),
}

impl FamilyBlend {
    pub fn combine(&self, scores: &FamilyScores) -> f64 {
        match self {
            FamilyBlend::Weighted(w) => {
                w.dim * scores.dimensions + w.cat * scores.categorical + w.grade * scores.grade
            }
            FamilyBlend::Single(family) => scores.get(*family),
        }
    }
}

impl ScoringPolicy {
    /// The family blend behind this policy; `None` for the hybrid, which is
    /// scored through [`crate::hybrid::HybridIndex`] instead.
    pub fn family_blend(&self) -> Option<FamilyBlend> {
        match self {
            ScoringPolicy::Weighted(w) => Some(FamilyBlend::Weighted(*w)),
            ScoringPolicy::SingleFamily(family) => Some(FamilyBlend::Single(*family)),
            ScoringPolicy::CosineJaccard(_) => None,
        }
    }

    /// Combine weighted-family scores, `None` for the hybrid policy
    pub fn combine(&self, scores: &FamilyScores) -> Option<f64> {
        self.family_blend().map(|blend| blend.combine(scores))
    }

    pub fn mode(&self) -> Mode {
        match self {
            ScoringPolicy::Weighted(_) => Mode::All,
            ScoringPolicy::CosineJaccard(_) => Mode::CosineJaccard,
            ScoringPolicy::SingleFamily(Family::Dimensions) => Mode::Dimensions,
            ScoringPolicy::SingleFamily(Family::Categorical) => Mode::Categorical,
            ScoringPolicy::SingleFamily(Family::Grade) => Mode::Grade,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            ScoringPolicy::Weighted(w) => w.validate(),
            ScoringPolicy::CosineJaccard(w) => w.validate(),
            ScoringPolicy::SingleFamily(_) => Ok(()),
        }
    }
}

/// Blend weighted-family scores under a named mode.
///
/// Only `all`, `dimensions`, `categorical` and `grade` blend family scores;
/// `cosine_jaccard` is rejected.
pub fn combine(
    dim_sim: f64,
    cat_sim: f64,
    grade_sim: f64,
    mode: Mode,
    weights: FamilyWeights,
) -> Result<f64, ConfigError> {
    let scores = FamilyScores {
        dimensions: dim_sim,
        categorical: cat_sim,
        grade: grade_sim,
    };
    mode.policy(weights, HybridWeights::default())
        .combine(&scores)
        .ok_or_else(|| ConfigError::NotFamilyMode(mode.to_string()))
}

/// Similarity mode as named in configuration files and on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Mode {
    #[default]
    All,
    Dimensions,
    Categorical,
    Grade,
    CosineJaccard,
}

impl Mode {
    /// Modes compared by an ablation run, in output order
    pub const ABLATION: [Mode; 4] = [Mode::Dimensions, Mode::Grade, Mode::Categorical, Mode::All];

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::All => "all",
            Mode::Dimensions => "dimensions",
            Mode::Categorical => "categorical",
            Mode::Grade => "grade",
            Mode::CosineJaccard => "cosine_jaccard",
        }
    }

    pub fn policy(self, weights: FamilyWeights, hybrid: HybridWeights) -> ScoringPolicy {
        match self {
            Mode::All => ScoringPolicy::Weighted(weights),
            Mode::Dimensions => ScoringPolicy::SingleFamily(Family::Dimensions),
            Mode::Categorical => ScoringPolicy::SingleFamily(Family::Categorical),
            Mode::Grade => ScoringPolicy::SingleFamily(Family::Grade),
            Mode::CosineJaccard => ScoringPolicy::CosineJaccard(hybrid),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" | "weighted" => Ok(Mode::All),
            "dimensions" | "dimension" => Ok(Mode::Dimensions),
            "categorical" => Ok(Mode::Categorical),
            "grade" => Ok(Mode::Grade),
            "cosine_jaccard" | "cosine-jaccard" | "hybrid" => Ok(Mode::CosineJaccard),
            _ => Err(ConfigError::UnknownMode(s.to_string())),
        }
    }
}

impl TryFrom<String> for Mode {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Mode> for String {
    fn from(mode: Mode) -> Self {
        mode.as_str().to_string()
    }
}

/// Engine configuration
///
/// Every field has a default, so `{}` is a valid configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Matches kept per record
    #[serde(default = "default_k")]
    pub k: usize,

    #[serde(default)]
    pub mode: Mode,

    /// Weights for `all` mode
    #[serde(default)]
    pub weights: FamilyWeights,

    /// Weights for `cosine_jaccard` mode
    #[serde(default)]
    pub hybrid_weights: HybridWeights,

    /// Treatment of feature columns missing from the whole input table
    #[serde(default)]
    pub column_policy: ColumnPolicy,

    /// Shard the outer loop across threads
    #[serde(default)]
    pub parallel: bool,
}

fn default_k() -> usize {
    DEFAULT_TOP_K
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            k: DEFAULT_TOP_K,
            mode: Mode::default(),
            weights: FamilyWeights::default(),
            hybrid_weights: HybridWeights::default(),
            column_policy: ColumnPolicy::default(),
            parallel: false,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn policy(&self) -> ScoringPolicy {
        self.mode.policy(self.weights, self.hybrid_weights)
    }

    /// Check every weight, including those the selected mode ignores
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;
        self.hybrid_weights.validate()
    }

    #[must_use]
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }
}

/// Configuration rejected before scoring
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Unknown similarity mode '{0}' (expected all, dimensions, categorical, grade or cosine_jaccard)")]
    UnknownMode(String),

    #[error("Weight '{name}' is negative: {value}")]
    NegativeWeight { name: String, value: f64 },

    #[error("Mode '{0}' does not combine family scores")]
    NotFamilyMode(String),

    #[error("Weight '{0}' is not a finite number")]
    NonFiniteWeight(String),

    #[error("Invalid engine configuration: {0}")]
    Parse(String),
}

impl From<ConfigError> for rfqmatch_core::Error {
    fn from(err: ConfigError) -> Self {
        rfqmatch_core::Error::InvalidConfig(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weighted_all_ones_equals_weight_sum() {
        let weights = FamilyWeights { dim: 0.7, cat: 0.5, grade: 0.9 };
        let total = combine(1.0, 1.0, 1.0, Mode::All, weights).unwrap();
        assert!((total - weights.sum()).abs() < 1e-12);
        assert!((total - 2.1).abs() < 1e-12);
    }

    #[test]
    fn test_default_weights() {
        let total = combine(0.5, 1.0, 0.0, Mode::All, FamilyWeights::default()).unwrap();
        assert!((total - (0.4 * 0.5 + 0.3)).abs() < 1e-12);
    }

    #[test]
    fn test_single_family_modes() {
        let w = FamilyWeights::default();
        assert_eq!(combine(0.1, 0.2, 0.3, Mode::Dimensions, w), Ok(0.1));
        assert_eq!(combine(0.1, 0.2, 0.3, Mode::Categorical, w), Ok(0.2));
        assert_eq!(combine(0.1, 0.2, 0.3, Mode::Grade, w), Ok(0.3));
    }

    #[test]
    fn test_combine_rejects_hybrid_mode() {
        let result = combine(1.0, 1.0, 1.0, Mode::CosineJaccard, FamilyWeights::default());
        assert!(matches!(result, Err(ConfigError::NotFamilyMode(ref m)) if m == "cosine_jaccard"));

        let hybrid = ScoringPolicy::CosineJaccard(HybridWeights::default());
        assert_eq!(hybrid.family_blend(), None);
        assert_eq!(hybrid.combine(&FamilyScores::default()), None);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("all".parse::<Mode>().unwrap(), Mode::All);
        assert_eq!("Weighted".parse::<Mode>().unwrap(), Mode::All);
        assert_eq!("hybrid".parse::<Mode>().unwrap(), Mode::CosineJaccard);
        assert!(matches!("fuzzy".parse::<Mode>(), Err(ConfigError::UnknownMode(_))));
    }

    #[test]
    fn test_policy_mode_roundtrip() {
        for mode in [Mode::All, Mode::Dimensions, Mode::Categorical, Mode::Grade, Mode::CosineJaccard] {
            let policy = mode.policy(FamilyWeights::default(), HybridWeights::default());
            assert_eq!(policy.mode(), mode);
        }
    }

    #[test]
    fn test_negative_weight_rejected() {
        let config = EngineConfig {
            weights: FamilyWeights { dim: -0.1, cat: 0.3, grade: 0.3 },
            ..EngineConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::NegativeWeight { .. })));
    }

    #[test]
    fn test_nan_weight_rejected() {
        let config = EngineConfig {
            hybrid_weights: HybridWeights { cosine: f64::NAN, jaccard: 0.4 },
            ..EngineConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::NonFiniteWeight(_))));
    }

    #[test]
    fn test_unnormalized_weights_accepted() {
        let config = EngineConfig {
            weights: FamilyWeights { dim: 2.0, cat: 2.0, grade: 2.0 },
            ..EngineConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_defaults_from_empty_json() {
        let config = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.k, 3);
        assert_eq!(config.policy(), ScoringPolicy::Weighted(FamilyWeights::default()));
    }

    #[test]
    fn test_config_from_json() {
        let config = EngineConfig::from_json_str(
            r#"{"k": 5, "mode": "cosine_jaccard", "hybrid_weights": {"cosine": 0.5},
                "column_policy": "strict", "parallel": true}"#,
        )
        .unwrap();
        assert_eq!(config.k, 5);
        assert_eq!(config.mode, Mode::CosineJaccard);
        assert_eq!(config.hybrid_weights, HybridWeights { cosine: 0.5, jaccard: 0.4 });
        assert_eq!(config.column_policy, ColumnPolicy::Strict);
        assert!(config.parallel);
    }

    #[test]
    fn test_config_unknown_mode_in_json() {
        let result = EngineConfig::from_json_str(r#"{"mode": "nearest"}"#);
        assert!(matches!(result, Err(ConfigError::Parse(ref msg)) if msg.contains("nearest")));
    }

    #[test]
    fn test_mode_serializes_as_string() {
        assert_eq!(serde_json::to_string(&Mode::CosineJaccard).unwrap(), "\"cosine_jaccard\"");
    }
}
