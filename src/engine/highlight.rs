//! Match regions for side-by-side highlighting
//!
//! Walks an LCS alignment of two token streams and projects contiguous runs
//! of matched tokens back onto source line ranges.
//!
//! - A run where every token of both sides is matched verbatim is `Exact`.
//! - Neighbouring runs separated by gaps of the same length whose tokens
//!   agree kind-for-kind (renamed identifiers, for instance) are merged into
//!   one `Structural` region.
//!
//! Regions with fewer than `min_tokens` matched tokens are dropped so that
//! stray shared punctuation does not light up the whole file.

use crate::scoring::lcs::lcs_alignment;
use crate::tokenizer::Token;
use serde::{Deserialize, Serialize};

// ─── Types ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchType {
    /// Token-for-token identical run
    Exact,
    /// Same token shape, some identifiers or literals differ
    Structural,
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact => write!(f, "Exact"),
            Self::Structural => write!(f, "Structural"),
        }
    }
}

/// Line ranges (1-based, inclusive) of one matched region on both sides
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRegion {
    pub a_line_start: u32,
    pub a_line_end: u32,
    pub b_line_start: u32,
    pub b_line_end: u32,
    pub match_type: MatchType,
    /// Number of verbatim-matched tokens inside the region
    pub matched_tokens: usize,
}

/// Regions ordered by ascending position in the first submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightData {
    pub matches: Vec<MatchRegion>,
}

impl HighlightData {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }
}

/// Inclusive token-index span on both sides
struct Run {
    a_start: usize,
    a_end: usize,
    b_start: usize,
    b_end: usize,
    matched: usize,
    structural: bool,
}

// ─── Computation ───────────────────────────────────────────────────

/// Compute highlight regions between `a` and `b`.
///
/// Allocates a dense `(len_a+1)×(len_b+1)` table; callers size-check first.
pub fn compute_highlights(a: &[Token], b: &[Token], min_tokens: usize) -> HighlightData {
    let texts_a: Vec<&str> = a.iter().map(|t| t.text.as_str()).collect();
    let texts_b: Vec<&str> = b.iter().map(|t| t.text.as_str()).collect();
    let alignment = lcs_alignment(&texts_a, &texts_b);

    let mut runs: Vec<Run> = Vec::new();
    for (i, j) in alignment {
        if let Some(run) = runs.last_mut() {
            if i == run.a_end + 1 && j == run.b_end + 1 {
                run.a_end = i;
                run.b_end = j;
                run.matched += 1;
                continue;
            }
            if same_shape_gap(&a[run.a_end + 1..i], &b[run.b_end + 1..j]) {
                run.a_end = i;
                run.b_end = j;
                run.matched += 1;
                run.structural = true;
                continue;
            }
        }
        runs.push(Run {
            a_start: i,
            a_end: i,
            b_start: j,
            b_end: j,
            matched: 1,
            structural: false,
        });
    }

    let matches = runs
        .into_iter()
        .filter(|r| r.matched >= min_tokens.max(1))
        .map(|r| MatchRegion {
            a_line_start: a[r.a_start].line,
            a_line_end: a[r.a_end].line,
            b_line_start: b[r.b_start].line,
            b_line_end: b[r.b_end].line,
            match_type: if r.structural {
                MatchType::Structural
            } else {
                MatchType::Exact
            },
            matched_tokens: r.matched,
        })
        .collect();

    HighlightData { matches }
}

/// Unmatched stretches that line up kind-for-kind
fn same_shape_gap(gap_a: &[Token], gap_b: &[Token]) -> bool {
    !gap_a.is_empty()
        && gap_a.len() == gap_b.len()
        && gap_a.iter().zip(gap_b).all(|(x, y)| x.kind == y.kind)
}
