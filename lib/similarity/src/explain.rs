//! Output structures for match results
//!
//! [`MatchTable`] groups retained matches by source record in input order
//! and serializes as flat `(rfq_id, match_id, similarity_score)` rows.
//! [`ExplainedMatch`] adds the per-family scores behind a match, and
//! [`MatchStats`] summarizes a whole run.

use crate::rank::Match;
use rfqmatch_core::{RecordId, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Retained matches of one source record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchGroup {
    pub source_id: RecordId,
    #[serde(skip)]
    pub source_index: usize,
    pub matches: Vec<Match>,
}

/// Every source record's matches, in input order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchTable {
    groups: Vec<MatchGroup>,
}

impl MatchTable {
    pub fn new(groups: Vec<MatchGroup>) -> Self {
        Self { groups }
    }

    pub fn groups(&self) -> &[MatchGroup] {
        &self.groups
    }

    /// Matches of the first source carrying `id`
    pub fn get(&self, id: &RecordId) -> Option<&[Match]> {
        self.groups
            .iter()
            .find(|g| &g.source_id == id)
            .map(|g| g.matches.as_slice())
    }

    /// Output rows, grouped by source and ordered by descending score
    pub fn rows(&self) -> impl Iterator<Item = &Match> {
        self.groups.iter().flat_map(|g| g.matches.iter())
    }

    /// Number of output rows
    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.matches.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        let rows: Vec<&Match> = self.rows().collect();
        serde_json::to_writer_pretty(writer, &rows)?;
        Ok(())
    }

    pub fn to_json_string(&self) -> Result<String> {
        let rows: Vec<&Match> = self.rows().collect();
        Ok(serde_json::to_string_pretty(&rows)?)
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.to_writer(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

/// Family scores behind one match. Families the policy does not use are omitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categorical: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cosine: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jaccard: Option<f64>,
}

/// A match with its score breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplainedMatch {
    #[serde(flatten)]
    pub matched: Match,
    pub explain: ScoreBreakdown,
}

/// Summary of one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchStats {
    /// Records that were ranked
    pub sources: usize,
    /// Output rows
    pub matches: usize,
    /// Sources left with no match at all
    pub unmatched_sources: usize,
    pub avg_score: f64,
    pub best_score: f64,
}

impl MatchStats {
    pub fn compute(table: &MatchTable) -> Self {
        let sources = table.groups().len();
        let unmatched_sources = table.groups().iter().filter(|g| g.matches.is_empty()).count();
        let matches = table.len();

        if matches == 0 {
            return Self {
                sources,
                matches: 0,
                unmatched_sources,
                avg_score: 0.0,
                best_score: 0.0,
            };
        }

        let total: f64 = table.rows().map(|m| m.score).sum();
        let best_score = table.rows().map(|m| m.score).fold(f64::NEG_INFINITY, f64::max);

        Self {
            sources,
            matches,
            unmatched_sources,
            avg_score: total / matches as f64,
            best_score,
        }
    }
}
