//! End-to-end report runs over a small assignment
//!
//! Plans pairs for each scope, runs the engine and checks the report:
//! canonical ordering, inclusive threshold, repeatability, highlights and
//! the JSON hand-off.

use chrono::{TimeZone, Utc};
use twinscan::{
    plan_pairs, EngineConfig, MatchType, PairKey, PairScope, PairwiseEngine, Report,
    ScorePrecision, Submission, SubmissionId,
};

const ORIGINAL: &str = r#"
def bubble_sort(items):
    n = len(items)
    for i in range(n):
        for j in range(0, n - i - 1):
            if items[j] > items[j + 1]:
                items[j], items[j + 1] = items[j + 1], items[j]
    return items
"#;

const COPIED: &str = r#"
# totally original
def sort_list(arr):
    length = len(arr)
    for a in range(length):
        for b in range(0, length - a - 1):
            if arr[b] > arr[b + 1]:
                arr[b], arr[b + 1] = arr[b + 1], arr[b]
    return arr
"#;

const UNRELATED: &str = r#"
import sys
counts = {}
with open(sys.argv[1]) as fh:
    for line in fh:
        for word in line.split():
            counts[word] = counts.get(word, 0) + 1
print(sorted(counts.items(), key=lambda kv: -kv[1])[:10])
"#;

fn submission(id: &str, student: &str, minute: u32, source: &str) -> Submission {
    let at = Utc.with_ymd_and_hms(2026, 4, 2, 9, minute, 0).unwrap();
    Submission::new(id, student, at, source)
}

/// alice resubmits, bob copies alice's first attempt, carol writes her own
fn assignment() -> Vec<Submission> {
    vec![
        submission("a1", "alice", 0, ORIGINAL),
        submission("a2", "alice", 40, UNRELATED),
        submission("b1", "bob", 20, COPIED),
        submission("c1", "carol", 30, UNRELATED),
    ]
}

fn key(a: &str, b: &str) -> PairKey {
    PairKey::new(a, b).unwrap()
}

fn pairs_of(report: &Report) -> Vec<PairKey> {
    report.similarities.iter().map(|s| s.pair.clone()).collect()
}

#[test]
fn all_historical_compares_across_students_only() {
    let engine = PairwiseEngine::new(EngineConfig::default().with_threshold(60.0)).unwrap();
    let report = engine.run_scope(&assignment(), &PairScope::AllHistorical).unwrap();

    assert_eq!(
        pairs_of(&report),
        vec![
            key("a1", "b1"),
            key("a1", "c1"),
            key("a2", "b1"),
            key("a2", "c1"),
            key("b1", "c1"),
        ]
    );
    assert!(report.skipped.is_empty());
    assert_eq!(report.stats.pairs_scored, 5);
    assert_eq!(report.stats.submissions_tokenized, 4);

    let copied = report.get(&key("a1", "b1")).unwrap();
    assert!(copied.result.combined >= 60.0, "{:?}", copied.result);
    assert_ne!(copied.first_sha256, copied.second_sha256);

    let identical = report.get(&key("a2", "c1")).unwrap();
    assert_eq!(identical.result.combined, 100.0);
    assert_eq!(identical.first_sha256, identical.second_sha256);
}

#[test]
fn latest_per_student_ignores_older_attempts() {
    let pairs = plan_pairs(&assignment(), &PairScope::LatestPerStudent).unwrap();
    assert_eq!(pairs, vec![key("a2", "b1"), key("a2", "c1"), key("b1", "c1")]);
    assert!(pairs.iter().all(|p| !p.contains(&SubmissionId::new("a1"))));
}

#[test]
fn one_against_all_targets_a_single_submission() {
    let scope = PairScope::OneAgainstAll(SubmissionId::new("b1"));
    let report = PairwiseEngine::default().run_scope(&assignment(), &scope).unwrap();
    assert_eq!(
        pairs_of(&report),
        vec![key("a1", "b1"), key("a2", "b1"), key("b1", "c1")]
    );
    assert_eq!(report.involving(&SubmissionId::new("b1")).count(), 3);
}

#[test]
fn threshold_is_inclusive() {
    let subs = assignment();
    let pair = [key("a1", "b1")];

    let probe = PairwiseEngine::new(EngineConfig::default().with_threshold(0.0))
        .unwrap()
        .run(&subs, &pair)
        .unwrap();
    let exact = probe.similarities[0].result.combined;
    assert!(exact > 0.0 && exact < 100.0);

    let at = PairwiseEngine::new(EngineConfig::default().with_threshold(exact))
        .unwrap()
        .run(&subs, &pair)
        .unwrap();
    assert_eq!(at.high_similarity().count(), 1);
    assert_eq!(at.stats.pairs_flagged, 1);

    let above = PairwiseEngine::new(EngineConfig::default().with_threshold(exact + 0.01))
        .unwrap()
        .run(&subs, &pair)
        .unwrap();
    assert_eq!(above.high_similarity().count(), 0);
    assert!(above.similarities[0].highlights.is_empty());
}

#[test]
fn repeated_runs_produce_identical_records() {
    let subs = assignment();
    let engine = PairwiseEngine::new(EngineConfig::default().with_worker_threads(3)).unwrap();
    let first = engine.run_scope(&subs, &PairScope::AllHistorical).unwrap();
    for _ in 0..3 {
        let again = engine.run_scope(&subs, &PairScope::AllHistorical).unwrap();
        assert_eq!(again.similarities, first.similarities);
        assert_ne!(again.id, first.id);
    }
}

#[test]
fn flagged_pair_carries_highlights() {
    let engine = PairwiseEngine::new(EngineConfig::default().with_threshold(60.0)).unwrap();
    let report = engine.run(&assignment(), &[key("a1", "b1")]).unwrap();
    let sim = report.high_similarity().next().unwrap();

    assert!(!sim.highlights.is_empty());
    for region in &sim.highlights.matches {
        assert!(region.a_line_start <= region.a_line_end);
        assert!(region.b_line_start <= region.b_line_end);
        assert!(region.matched_tokens >= engine.config().min_highlight_tokens);
    }

    // Every identifier was renamed, so the whole body is one structural region
    assert_eq!(sim.highlights.len(), 1);
    let region = &sim.highlights.matches[0];
    assert_eq!(region.match_type, MatchType::Structural);
    assert_eq!(region.matched_tokens, 50);
    assert_eq!((region.a_line_start, region.a_line_end), (2, 8));
    assert_eq!((region.b_line_start, region.b_line_end), (3, 9));
}

#[test]
fn fast_compare_only_bounds_pairs_below_threshold() {
    let subs = assignment();
    let exact = PairwiseEngine::new(EngineConfig::default().with_threshold(60.0))
        .unwrap()
        .run_scope(&subs, &PairScope::AllHistorical)
        .unwrap();
    let fast = PairwiseEngine::new(
        EngineConfig::default()
            .with_threshold(60.0)
            .with_fast_compare(true),
    )
    .unwrap()
    .run_scope(&subs, &PairScope::AllHistorical)
    .unwrap();

    assert_eq!(pairs_of(&fast), pairs_of(&exact));
    for (f, e) in fast.similarities.iter().zip(&exact.similarities) {
        match f.precision {
            ScorePrecision::Exact => assert_eq!(f.result, e.result),
            ScorePrecision::UpperBound => {
                assert!(e.result.combined < 60.0);
                assert!(f.result.combined < 60.0);
            }
        }
    }

    let flagged = |r: &Report| r.high_similarity().map(|s| s.pair.clone()).collect::<Vec<_>>();
    assert_eq!(flagged(&fast), flagged(&exact));
}

#[test]
fn report_serializes_for_persistence() {
    let report = PairwiseEngine::default()
        .run_scope(&assignment(), &PairScope::LatestPerStudent)
        .unwrap();
    let json = report.to_json().unwrap();
    assert!(json.contains("\"similarities\""));
    assert!(json.contains("\"first\": \"a2\""));

    let back: Report = serde_json::from_str(&json).unwrap();
    assert_eq!(back.similarities, report.similarities);
    assert_eq!(back.stats, report.stats);
}
