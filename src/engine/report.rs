//! Report records handed to the persistence collaborator
//!
//! A `Similarity` is created once per compared pair per run and never
//! mutated; rescoring produces a new `Report` rather than editing an old one.

use super::highlight::HighlightData;
use super::pairs::{PairKey, SubmissionId};
use crate::scoring::SimilarityResult;
use crate::TwinscanResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether a stored score is exact or an early-exit upper bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScorePrecision {
    Exact,
    /// Fast-compare stopped early; `lcs` and `combined` are upper bounds
    /// known to be below the report threshold
    UpperBound,
}

/// Result for one compared pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Similarity {
    pub pair: PairKey,
    /// SHA-256 of the first submission's source at scoring time
    pub first_sha256: String,
    /// SHA-256 of the second submission's source at scoring time
    pub second_sha256: String,
    pub result: SimilarityResult,
    pub precision: ScorePrecision,
    /// Empty when the pair scored below the threshold
    pub highlights: HighlightData,
}

/// Why a pair was not compared
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// The pair exceeded the alignment ceiling
    InputTooLarge {
        first_tokens: usize,
        second_tokens: usize,
        limit: u64,
    },
    /// The pair references an id that was not in the submission set
    UnknownSubmission(SubmissionId),
    /// The run was cancelled before this pair started
    Cancelled,
    /// Any other scoring failure
    Failed(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InputTooLarge {
                first_tokens,
                second_tokens,
                limit,
            } => write!(
                f,
                "submission too large ({} × {} tokens, limit {} cells)",
                first_tokens, second_tokens, limit
            ),
            Self::UnknownSubmission(id) => write!(f, "unknown submission '{}'", id),
            Self::Cancelled => write!(f, "run cancelled"),
            Self::Failed(msg) => write!(f, "comparison failed: {}", msg),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedPair {
    pub pair: PairKey,
    pub reason: SkipReason,
}

/// Counters for one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Distinct pairs after canonicalization
    pub pairs_requested: usize,
    /// Pairs with exact scores
    pub pairs_scored: usize,
    /// Pairs that took the fast-compare early exit
    pub pairs_bounded: usize,
    pub pairs_skipped: usize,
    /// Pairs at or above the threshold
    pub pairs_flagged: usize,
    pub submissions_tokenized: usize,
    pub duration_ms: u64,
}

/// All pair results of one report run, in canonical pair order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub threshold: f32,
    pub fast_compare: bool,
    pub similarities: Vec<Similarity>,
    pub skipped: Vec<SkippedPair>,
    pub stats: RunStats,
}

impl Report {
    /// Pairs whose exact combined score is at or above the threshold
    pub fn high_similarity(&self) -> impl Iterator<Item = &Similarity> + '_ {
        let threshold = self.threshold;
        self.similarities
            .iter()
            .filter(move |s| s.precision == ScorePrecision::Exact && s.result.meets(threshold))
    }

    /// Look up the record for a pair
    pub fn get(&self, pair: &PairKey) -> Option<&Similarity> {
        self.similarities
            .binary_search_by(|s| s.pair.cmp(pair))
            .ok()
            .map(|idx| &self.similarities[idx])
    }

    /// All records involving `id`
    pub fn involving<'a>(&'a self, id: &'a SubmissionId) -> impl Iterator<Item = &'a Similarity> + 'a {
        self.similarities.iter().filter(move |s| s.pair.contains(id))
    }

    pub fn to_json(&self) -> TwinscanResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
