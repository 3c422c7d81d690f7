//! Top-k selection over the full pairwise comparison
//!
//! Every record is scored against every other record whose id differs
//! from its own. Candidates are ordered by descending score with a stable
//! sort, so equal scores keep input order; the first `k` are kept.

use crate::explain::{MatchGroup, MatchTable};
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use rfqmatch_core::{Record, RecordId};
use serde::Serialize;
use std::cmp::Reverse;

/// One retained match, serialized as an output row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    #[serde(rename = "rfq_id")]
    pub source_id: RecordId,
    #[serde(rename = "match_id")]
    pub target_id: RecordId,
    #[serde(rename = "similarity_score")]
    pub score: f64,
    /// Input position of the matched record
    #[serde(skip)]
    pub target_index: usize,
}

/// A scored comparison target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub index: usize,
    pub score: f64,
}

/// Keep the `k` highest-scoring candidates.
///
/// Relies on a stable sort: candidates with equal scores stay in the order
/// they were given.
pub fn select_top_k(mut candidates: Vec<Candidate>, k: usize) -> Vec<Candidate> {
    candidates.sort_by_key(|c| Reverse(OrderedFloat(c.score)));
    candidates.truncate(k);
    candidates
}

/// Ranked matches for the record at `source`
pub fn rank_source<F>(records: &[Record], source: usize, k: usize, score_fn: &F) -> MatchGroup
where
    F: Fn(usize, usize) -> f64,
{
    let source_record = &records[source];

    let candidates: Vec<Candidate> = records
        .iter()
        .enumerate()
        .filter(|(_, target)| target.id != source_record.id)
        .map(|(index, _)| Candidate {
            index,
            score: score_fn(source, index),
        })
        .collect();

    let matches = select_top_k(candidates, k)
        .into_iter()
        .map(|c| Match {
            source_id: source_record.id.clone(),
            target_id: records[c.index].id.clone(),
            score: c.score,
            target_index: c.index,
        })
        .collect();

    MatchGroup {
        source_id: source_record.id.clone(),
        source_index: source,
        matches,
    }
}

/// Top-k matches for every record, scoring pairs by input position.
///
/// With `parallel` set, sources are sharded across the rayon pool; the
/// result is identical to the sequential path.
pub fn top_k_indexed<F>(records: &[Record], k: usize, parallel: bool, score_fn: F) -> MatchTable
where
    F: Fn(usize, usize) -> f64 + Sync,
{
    let groups: Vec<MatchGroup> = if parallel {
        (0..records.len())
            .into_par_iter()
            .map(|source| rank_source(records, source, k, &score_fn))
            .collect()
    } else {
        (0..records.len())
            .map(|source| rank_source(records, source, k, &score_fn))
            .collect()
    };

    MatchTable::new(groups)
}

/// Top-k matches for every record under an arbitrary pair score
pub fn top_k<F>(records: &[Record], k: usize, score_fn: F) -> MatchTable
where
    F: Fn(&Record, &Record) -> f64 + Sync,
{
    top_k_indexed(records, k, false, |i, j| score_fn(&records[i], &records[j]))
}
