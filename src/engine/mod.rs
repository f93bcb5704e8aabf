//! # Pairwise Comparison Engine
//!
//! Orchestrates tokenizer and scorer over an explicit list of submission
//! pairs:
//!
//! - `pairs`: submission ids, canonical pair keys, scope planning
//! - `cache`: fill-once per-run token cache shared by all workers
//! - `highlight`: LCS backtrace → matched line regions
//! - `report`: immutable `Similarity` records and the run `Report`
//!
//! Every pair is independent, so pairs are scored in parallel on a bounded
//! rayon pool. Results come back in canonical pair order regardless of
//! scheduling, so re-running over the same inputs yields the same records
//! in the same order.

pub mod cache;
pub mod highlight;
pub mod pairs;
pub mod report;

use crate::config::EngineConfig;
use crate::scoring::{FastScore, Scorer};
use crate::{TwinscanError, TwinscanResult};
use cache::TokenCache;
use pairs::{PairKey, PairScope, Submission};
use rayon::prelude::*;
use report::{Report, RunStats, ScorePrecision, Similarity, SkipReason, SkippedPair};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

// ─── Run Control ───────────────────────────────────────────────────

/// Cooperative cancellation for a report run.
///
/// Checked between pairs only; a pair that has started always finishes.
#[derive(Debug, Clone, Default)]
pub struct RunControl {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl RunControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop starting new pairs once `deadline` has passed
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Shared flag; setting it to `true` cancels the run
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
            || self.deadline.map_or(false, |d| Instant::now() >= d)
    }
}

// ─── Engine ────────────────────────────────────────────────────────

enum PairOutcome {
    Compared(Similarity),
    Skipped(SkippedPair),
}

/// Scores submission pairs and assembles reports
pub struct PairwiseEngine {
    config: EngineConfig,
    scorer: Scorer,
    pool: Option<rayon::ThreadPool>,
}

impl PairwiseEngine {
    /// Validate `config` and build the worker pool.
    pub fn new(config: EngineConfig) -> TwinscanResult<Self> {
        config.validate()?;

        let pool = match config.worker_threads {
            Some(workers) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(workers)
                    .thread_name(|i| format!("twinscan-worker-{}", i))
                    .build()
                    .map_err(|e| {
                        TwinscanError::ConfigError(format!("Failed to build worker pool: {}", e))
                    })?,
            ),
            None => None,
        };

        Ok(Self {
            scorer: Scorer::new(config.max_alignment_cells),
            config,
            pool,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Plan pairs for `scope` and run them.
    pub fn run_scope(&self, submissions: &[Submission], scope: &PairScope) -> TwinscanResult<Report> {
        let pairs = pairs::plan_pairs(submissions, scope)?;
        self.run(submissions, &pairs)
    }

    /// Score every pair in `pairs`.
    pub fn run(&self, submissions: &[Submission], pairs: &[PairKey]) -> TwinscanResult<Report> {
        self.run_with_control(submissions, pairs, &RunControl::new())
    }

    /// Score every pair in `pairs`, stopping early if `control` is cancelled.
    ///
    /// Only structurally invalid input (duplicate submission ids) fails the
    /// run. Per-pair problems become `SkippedPair` entries.
    pub fn run_with_control(
        &self,
        submissions: &[Submission],
        pairs: &[PairKey],
        control: &RunControl,
    ) -> TwinscanResult<Report> {
        let start = Instant::now();
        let cache = TokenCache::new(submissions)?;

        // Canonical order: sorted and deduplicated
        let ordered: Vec<PairKey> = pairs.iter().cloned().collect::<BTreeSet<_>>().into_iter().collect();

        tracing::info!(
            "Comparing {} pairs across {} submissions (threshold={:.1}, fast_compare={})",
            ordered.len(),
            submissions.len(),
            self.config.similarity_threshold,
            self.config.fast_compare
        );

        let outcomes: Vec<PairOutcome> = self.install(|| {
            ordered
                .par_iter()
                .map(|pair| self.compare_pair(&cache, pair, control))
                .collect()
        });

        let mut stats = RunStats {
            pairs_requested: ordered.len(),
            ..Default::default()
        };
        let mut similarities = Vec::with_capacity(outcomes.len());
        let mut skipped = Vec::new();
        for outcome in outcomes {
            match outcome {
                PairOutcome::Compared(sim) => {
                    match sim.precision {
                        ScorePrecision::Exact => stats.pairs_scored += 1,
                        ScorePrecision::UpperBound => stats.pairs_bounded += 1,
                    }
                    if sim.precision == ScorePrecision::Exact
                        && sim.result.meets(self.config.similarity_threshold)
                    {
                        stats.pairs_flagged += 1;
                    }
                    similarities.push(sim);
                }
                PairOutcome::Skipped(skip) => skipped.push(skip),
            }
        }
        stats.pairs_skipped = skipped.len();
        stats.submissions_tokenized = cache.tokenized_count();
        stats.duration_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            "Comparison complete: {} scored, {} bounded, {} skipped, {} flagged ({}ms)",
            stats.pairs_scored,
            stats.pairs_bounded,
            stats.pairs_skipped,
            stats.pairs_flagged,
            stats.duration_ms
        );

        Ok(Report {
            id: uuid::Uuid::new_v4(),
            generated_at: chrono::Utc::now(),
            threshold: self.config.similarity_threshold,
            fast_compare: self.config.fast_compare,
            similarities,
            skipped,
            stats,
        })
    }

    fn install<R, F>(&self, op: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }

    fn compare_pair(&self, cache: &TokenCache<'_>, pair: &PairKey, control: &RunControl) -> PairOutcome {
        if control.is_cancelled() {
            return skip(pair, SkipReason::Cancelled);
        }

        let (first, second) = match (cache.get(&pair.first), cache.get(&pair.second)) {
            (Some(a), Some(b)) => (a, b),
            (None, _) => return skip(pair, SkipReason::UnknownSubmission(pair.first.clone())),
            (_, None) => return skip(pair, SkipReason::UnknownSubmission(pair.second.clone())),
        };

        let threshold = self.config.similarity_threshold;
        let scored = if self.config.fast_compare {
            self.scorer.score_fast(&first.tokens, &second.tokens, threshold)
        } else {
            self.scorer
                .try_score(&first.tokens, &second.tokens)
                .map(FastScore::Exact)
        };

        let scored = match scored {
            Ok(s) => s,
            Err(TwinscanError::InputTooLarge {
                left_tokens,
                right_tokens,
                limit,
                ..
            }) => {
                return skip(
                    pair,
                    SkipReason::InputTooLarge {
                        first_tokens: left_tokens,
                        second_tokens: right_tokens,
                        limit,
                    },
                )
            }
            Err(e) => return skip(pair, SkipReason::Failed(e.to_string())),
        };

        let (result, precision) = match scored {
            FastScore::Exact(r) => (r, ScorePrecision::Exact),
            FastScore::BelowThreshold(r) => (r, ScorePrecision::UpperBound),
        };

        // Highlights only for flagged pairs; bounded pairs are below threshold
        let highlights = if precision == ScorePrecision::Exact && result.meets(threshold) {
            highlight::compute_highlights(
                &first.tokens,
                &second.tokens,
                self.config.min_highlight_tokens,
            )
        } else {
            highlight::HighlightData::default()
        };

        tracing::debug!(
            "{}: jaccard={:.2} lcs={:.2} combined={:.2} ({:?}, {} regions)",
            pair,
            result.jaccard,
            result.lcs,
            result.combined,
            precision,
            highlights.len()
        );

        PairOutcome::Compared(Similarity {
            pair: pair.clone(),
            first_sha256: first.sha256.clone(),
            second_sha256: second.sha256.clone(),
            result,
            precision,
            highlights,
        })
    }
}

fn skip(pair: &PairKey, reason: SkipReason) -> PairOutcome {
    tracing::warn!("Skipping {}: {}", pair, reason);
    PairOutcome::Skipped(SkippedPair {
        pair: pair.clone(),
        reason,
    })
}

impl Default for PairwiseEngine {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
            scorer: Scorer::default(),
            pool: None,
        }
    }
}

// ─── Tests ─────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pairs::SubmissionId;

    const ORIGINAL: &str = "def mean(values):\n    total = 0\n    for v in values:\n        total += v\n    return total / len(values)\n";
    const RENAMED: &str = "def average(nums):\n    s = 0\n    for n in nums:\n        s += n\n    return s / len(nums)\n";
    const UNRELATED: &str = "class Stack:\n    def __init__(self):\n        self.items = []\n\n    def push(self, item):\n        self.items.append(item)\n";

    fn subs() -> Vec<Submission> {
        vec![
            Submission::new("s1", "alice", Utc::now(), ORIGINAL),
            Submission::new("s2", "bob", Utc::now(), RENAMED),
            Submission::new("s3", "carol", Utc::now(), UNRELATED),
        ]
    }

    fn key(a: &str, b: &str) -> PairKey {
        PairKey::new(a, b).unwrap()
    }

    #[test]
    fn test_one_record_per_pair_in_canonical_order() {
        let engine = PairwiseEngine::default();
        let pairs = vec![key("s3", "s2"), key("s1", "s2"), key("s2", "s1"), key("s1", "s3")];
        let report = engine.run(&subs(), &pairs).unwrap();
        let keys: Vec<PairKey> = report.similarities.iter().map(|s| s.pair.clone()).collect();
        assert_eq!(keys, vec![key("s1", "s2"), key("s1", "s3"), key("s2", "s3")]);
        assert_eq!(report.stats.pairs_requested, 3);
        assert_eq!(report.stats.submissions_tokenized, 3);
    }

    #[test]
    fn test_highlights_only_above_threshold() {
        let engine = PairwiseEngine::new(EngineConfig::default().with_threshold(50.0)).unwrap();
        let report = engine
            .run_scope(&subs(), &pairs::PairScope::AllHistorical)
            .unwrap();
        let copied = report.get(&key("s1", "s2")).unwrap();
        let distinct = report.get(&key("s1", "s3")).unwrap();
        assert!(copied.result.combined >= 50.0, "{:?}", copied.result);
        assert!(!copied.highlights.is_empty());
        assert!(distinct.result.combined < 50.0, "{:?}", distinct.result);
        assert!(distinct.highlights.is_empty());
        assert_eq!(report.high_similarity().count(), report.stats.pairs_flagged);
    }

    #[test]
    fn test_unknown_submission_is_skipped_not_fatal() {
        let engine = PairwiseEngine::default();
        let report = engine
            .run(&subs(), &[key("s1", "s2"), key("s1", "ghost")])
            .unwrap();
        assert_eq!(report.similarities.len(), 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(
            report.skipped[0].reason,
            SkipReason::UnknownSubmission(SubmissionId::new("ghost"))
        );
    }

    #[test]
    fn test_oversized_pair_is_skipped() {
        let config = EngineConfig {
            max_alignment_cells: 100,
            ..Default::default()
        };
        let engine = PairwiseEngine::new(config).unwrap();
        let report = engine.run(&subs(), &[key("s1", "s2")]).unwrap();
        assert!(report.similarities.is_empty());
        assert!(matches!(
            report.skipped[0].reason,
            SkipReason::InputTooLarge { limit: 100, .. }
        ));
    }

    #[test]
    fn test_cancelled_run_skips_everything() {
        let engine = PairwiseEngine::default();
        let control = RunControl::new();
        control.cancel();
        let report = engine
            .run_with_control(&subs(), &[key("s1", "s2"), key("s2", "s3")], &control)
            .unwrap();
        assert!(report.similarities.is_empty());
        assert_eq!(report.stats.pairs_skipped, 2);
        assert!(report.skipped.iter().all(|s| s.reason == SkipReason::Cancelled));
    }

    #[test]
    fn test_expired_deadline_cancels() {
        let control = RunControl::new().with_deadline(Instant::now());
        assert!(control.is_cancelled());
        assert!(!RunControl::new().is_cancelled());
    }

    #[test]
    fn test_fast_compare_marks_bounded_pairs() {
        let config = EngineConfig::default().with_threshold(90.0).with_fast_compare(true);
        let engine = PairwiseEngine::new(config).unwrap();
        let report = engine.run(&subs(), &[key("s1", "s3")]).unwrap();
        let sim = &report.similarities[0];
        assert_eq!(sim.precision, ScorePrecision::UpperBound);
        assert!(sim.result.combined < 90.0);
        assert_eq!(report.stats.pairs_bounded, 1);
    }

    #[test]
    fn test_dedicated_pool_matches_default() {
        let pairs = vec![key("s1", "s2"), key("s1", "s3"), key("s2", "s3")];
        let a = PairwiseEngine::default().run(&subs(), &pairs).unwrap();
        let b = PairwiseEngine::new(EngineConfig::default().with_worker_threads(2))
            .unwrap()
            .run(&subs(), &pairs)
            .unwrap();
        assert_eq!(a.similarities, b.similarities);
    }

    #[test]
    fn test_duplicate_ids_fail_the_run() {
        let mut s = subs();
        s.push(Submission::new("s1", "dave", Utc::now(), "x = 1"));
        assert!(matches!(
            PairwiseEngine::default().run(&s, &[key("s1", "s2")]),
            Err(TwinscanError::DuplicateSubmission(_))
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EngineConfig::default().with_threshold(150.0);
        assert!(PairwiseEngine::new(config).is_err());
    }
}
