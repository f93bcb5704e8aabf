//! # twinscan: Near-Duplicate Detection for Programming Submissions
//!
//! Lexical similarity engine for student code. Compares every requested
//! pair of submissions, scores how much of one is a copy of the other, and
//! reports the matched line ranges for side-by-side review.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                     PairwiseEngine                        │
//! │  ┌──────────┐   ┌────────────┐   ┌─────────────────────┐  │
//! │  │PairScope │──▶│ TokenCache │──▶│ Scorer (rayon pool) │  │
//! │  │(planning)│   │(fill-once) │   │ Jaccard │ LCS       │  │
//! │  └──────────┘   └─────┬──────┘   └──────────┬──────────┘  │
//! │                       │                     │             │
//! │                 ┌─────▼──────┐      ┌───────▼─────────┐   │
//! │                 │ Tokenizer  │      │ Highlights      │   │
//! │                 │ scrub→scan │      │ (LCS backtrace) │   │
//! │                 └────────────┘      └───────┬─────────┘   │
//! │                                             │             │
//! │              Report { Similarity + HighlightData }        │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Scoring
//!
//! - **Jaccard**: overlap of distinct token texts (order-blind)
//! - **LCS**: longest common subsequence over token texts (order-aware)
//! - **Combined**: `0.4·jaccard + 0.6·lcs`, percentages in `[0, 100]`
//!
//! Literals are canonicalized and comments stripped before comparison, so
//! changing values or comments does not change the score. Renaming
//! identifiers lowers Jaccard but keeps the keyword/operator skeleton that
//! LCS aligns on.
//!
//! Not a semantic or AST-level detector: token streams only, one language
//! family at a time.

pub mod config;
pub mod engine;
pub mod scoring;
pub mod tokenizer;

// Re-exports for convenience
pub use config::EngineConfig;
pub use engine::highlight::{HighlightData, MatchRegion, MatchType};
pub use engine::pairs::{plan_pairs, PairKey, PairScope, Submission, SubmissionId};
pub use engine::report::{Report, RunStats, ScorePrecision, Similarity, SkipReason, SkippedPair};
pub use engine::{PairwiseEngine, RunControl};
pub use scoring::{score, FastScore, Scorer, SimilarityResult};
pub use tokenizer::{tokenize, Token, TokenKind};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TwinscanError {
    #[error("Input too large: {left_tokens} × {right_tokens} tokens needs {cells} cells (limit {limit})")]
    InputTooLarge {
        left_tokens: usize,
        right_tokens: usize,
        cells: u64,
        limit: u64,
    },

    #[error("Unknown submission: {0}")]
    UnknownSubmission(String),

    #[error("Duplicate submission id: {0}")]
    DuplicateSubmission(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type TwinscanResult<T> = Result<T, TwinscanError>;
