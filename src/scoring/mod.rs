//! Similarity scorer: Jaccard + LCS fusion
//!
//! Two complementary channels over token texts:
//!
//! 1. **Jaccard**: overlap of the distinct token vocabularies. Order-blind,
//!    so it still registers code whose statements were shuffled around.
//!
//! 2. **LCS**: longest common subsequence over the full token streams,
//!    normalized by the longer stream. Order-sensitive, captures control-flow
//!    shape and statement sequencing.
//!
//! The combined score weights LCS higher: `0.4·jaccard + 0.6·lcs`.
//!
//! All scores are percentages in `[0, 100]`. They are computed in `f64`
//! and stored as `f32`; no rounding happens here.

pub mod jaccard;
pub mod lcs;

use crate::tokenizer::Token;
use crate::{TwinscanError, TwinscanResult};
use serde::{Deserialize, Serialize};

/// Weight of the Jaccard channel in the combined score
pub const JACCARD_WEIGHT: f64 = 0.4;
/// Weight of the LCS channel in the combined score
pub const LCS_WEIGHT: f64 = 0.6;

/// Default ceiling on `len_a · len_b` before a pair is refused
pub const DEFAULT_MAX_ALIGNMENT_CELLS: u64 = 25_000_000;

// ─── Types ─────────────────────────────────────────────────────────

/// Scores for one compared pair, each in `[0, 100]`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SimilarityResult {
    pub jaccard: f32,
    pub lcs: f32,
    pub combined: f32,
}

impl SimilarityResult {
    /// All-zero result for degenerate input
    pub fn zero() -> Self {
        Self::default()
    }

    /// Fuse the two channel percentages into a result.
    pub fn from_channels(jaccard: f64, lcs: f64) -> Self {
        let combined = JACCARD_WEIGHT * jaccard + LCS_WEIGHT * lcs;
        Self {
            jaccard: clamp_percent(jaccard),
            lcs: clamp_percent(lcs),
            combined: clamp_percent(combined),
        }
    }

    /// Whether the combined score reaches `threshold` (inclusive)
    pub fn meets(&self, threshold: f32) -> bool {
        self.combined >= threshold
    }
}

/// Outcome of a fast-compare scoring call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FastScore {
    /// Exact scores, identical to [`score`]
    Exact(SimilarityResult),
    /// The pair provably cannot reach the threshold. `jaccard` is exact;
    /// `lcs` and `combined` are upper bounds, both below the threshold.
    BelowThreshold(SimilarityResult),
}

impl FastScore {
    pub fn result(&self) -> &SimilarityResult {
        match self {
            Self::Exact(r) | Self::BelowThreshold(r) => r,
        }
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, Self::Exact(_))
    }
}

// ─── Core Functions ────────────────────────────────────────────────

/// Score two token sequences.
///
/// Pure and deterministic. Symmetric in its arguments. Returns all zeros if
/// either side is empty. Has no size ceiling; use [`Scorer::try_score`] when
/// inputs are untrusted.
pub fn score(tokens_a: &[Token], tokens_b: &[Token]) -> SimilarityResult {
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return SimilarityResult::zero();
    }

    let jaccard = jaccard_percent(tokens_a, tokens_b);

    let texts_a: Vec<&str> = tokens_a.iter().map(|t| t.text.as_str()).collect();
    let texts_b: Vec<&str> = tokens_b.iter().map(|t| t.text.as_str()).collect();
    let common = lcs::lcs_length(&texts_a, &texts_b);
    let lcs = percent(common, tokens_a.len().max(tokens_b.len()));

    SimilarityResult::from_channels(jaccard, lcs)
}

fn jaccard_percent(a: &[Token], b: &[Token]) -> f64 {
    let (intersection, union) = jaccard::text_set_overlap(a, b);
    percent(intersection, union)
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    100.0 * part as f64 / whole as f64
}

fn clamp_percent(value: f64) -> f32 {
    value.clamp(0.0, 100.0) as f32
}

// ─── Guarded Scorer ────────────────────────────────────────────────

/// Scorer with an explicit size ceiling and optional early exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scorer {
    max_cells: u64,
}

impl Scorer {
    pub fn new(max_cells: u64) -> Self {
        Self { max_cells }
    }

    pub fn max_cells(&self) -> u64 {
        self.max_cells
    }

    /// Refuse pairs whose DP table would exceed the ceiling.
    pub fn check_size(&self, len_a: usize, len_b: usize) -> TwinscanResult<()> {
        let cells = (len_a as u64).saturating_mul(len_b as u64);
        if cells > self.max_cells {
            return Err(TwinscanError::InputTooLarge {
                left_tokens: len_a,
                right_tokens: len_b,
                cells,
                limit: self.max_cells,
            });
        }
        Ok(())
    }

    /// [`score`] with the size ceiling applied.
    pub fn try_score(&self, tokens_a: &[Token], tokens_b: &[Token]) -> TwinscanResult<SimilarityResult> {
        self.check_size(tokens_a.len(), tokens_b.len())?;
        Ok(score(tokens_a, tokens_b))
    }

    /// Score with early exit below `min_threshold`.
    ///
    /// Bounds the LCS by the multiset overlap of token texts. When the bounded
    /// combined score is already below `min_threshold` the DP is skipped and
    /// [`FastScore::BelowThreshold`] is returned. Otherwise the exact scores
    /// are computed, so any pair that reaches the threshold reports exactly
    /// what [`score`] would.
    pub fn score_fast(
        &self,
        tokens_a: &[Token],
        tokens_b: &[Token],
        min_threshold: f32,
    ) -> TwinscanResult<FastScore> {
        if tokens_a.is_empty() || tokens_b.is_empty() {
            return Ok(FastScore::Exact(SimilarityResult::zero()));
        }

        let jaccard = jaccard_percent(tokens_a, tokens_b);
        let lcs_bound = percent(
            jaccard::multiset_overlap(tokens_a, tokens_b),
            tokens_a.len().max(tokens_b.len()),
        );
        let bounded = SimilarityResult::from_channels(jaccard, lcs_bound);
        if bounded.combined < min_threshold {
            return Ok(FastScore::BelowThreshold(bounded));
        }

        self.try_score(tokens_a, tokens_b).map(FastScore::Exact)
    }
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ALIGNMENT_CELLS)
    }
}

// ─── Tests ─────────────────────────────────────────────────────────
