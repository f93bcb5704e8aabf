//! Submissions, canonical pair keys and pair planning
//!
//! The engine itself is scope-agnostic and only evaluates an explicit pair
//! list. [`plan_pairs`] builds that list for the three report scopes the
//! orchestration layer asks for.

use crate::{TwinscanError, TwinscanResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

// ─── Identifiers ───────────────────────────────────────────────────

/// Opaque external submission identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionId(String);

impl SubmissionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SubmissionId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for SubmissionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// One student's submission for an assignment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    /// Opaque student identifier; pairs from the same student are never planned
    pub student: String,
    pub submitted_at: DateTime<Utc>,
    pub source: String,
}

impl Submission {
    pub fn new(
        id: impl Into<SubmissionId>,
        student: impl Into<String>,
        submitted_at: DateTime<Utc>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            student: student.into(),
            submitted_at,
            source: source.into(),
        }
    }
}

/// Unordered pair of submissions, stored with `first < second`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairKey {
    pub first: SubmissionId,
    pub second: SubmissionId,
}

impl PairKey {
    /// Canonical key for `a` and `b`; `None` when both are the same id.
    pub fn new(a: impl Into<SubmissionId>, b: impl Into<SubmissionId>) -> Option<Self> {
        let (a, b) = (a.into(), b.into());
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self { first: a, second: b }),
            std::cmp::Ordering::Greater => Some(Self { first: b, second: a }),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn contains(&self, id: &SubmissionId) -> bool {
        &self.first == id || &self.second == id
    }
}

impl std::fmt::Display for PairKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ↔ {}", self.first, self.second)
    }
}

// ─── Scope ─────────────────────────────────────────────────────────

/// Which submissions a report run compares
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PairScope {
    /// Each student's most recent submission against every other student's
    LatestPerStudent,
    /// Every submission against every other student's submissions
    AllHistorical,
    /// One submission against every submission of the other students
    OneAgainstAll(SubmissionId),
}

/// Build the sorted, deduplicated pair list for `scope`.
pub fn plan_pairs(submissions: &[Submission], scope: &PairScope) -> TwinscanResult<Vec<PairKey>> {
    ensure_unique_ids(submissions)?;

    let mut pairs = BTreeSet::new();
    match scope {
        PairScope::AllHistorical => {
            let all: Vec<&Submission> = submissions.iter().collect();
            cross_students(&all, &mut pairs);
        }
        PairScope::LatestPerStudent => {
            let latest = latest_per_student(submissions);
            cross_students(&latest, &mut pairs);
        }
        PairScope::OneAgainstAll(target_id) => {
            let target = submissions
                .iter()
                .find(|s| &s.id == target_id)
                .ok_or_else(|| TwinscanError::UnknownSubmission(target_id.to_string()))?;
            for other in submissions.iter().filter(|s| s.student != target.student) {
                pairs.extend(PairKey::new(target.id.clone(), other.id.clone()));
            }
        }
    }

    Ok(pairs.into_iter().collect())
}

pub(crate) fn ensure_unique_ids(submissions: &[Submission]) -> TwinscanResult<()> {
    let mut seen = HashSet::with_capacity(submissions.len());
    for s in submissions {
        if !seen.insert(&s.id) {
            return Err(TwinscanError::DuplicateSubmission(s.id.to_string()));
        }
    }
    Ok(())
}

/// Latest submission per student; ties on timestamp go to the larger id.
fn latest_per_student(submissions: &[Submission]) -> Vec<&Submission> {
    let mut latest: BTreeMap<&str, &Submission> = BTreeMap::new();
    for s in submissions {
        latest
            .entry(s.student.as_str())
            .and_modify(|current| {
                if (s.submitted_at, &s.id) > (current.submitted_at, &current.id) {
                    *current = s;
                }
            })
            .or_insert(s);
    }
    latest.into_values().collect()
}

fn cross_students(subs: &[&Submission], pairs: &mut BTreeSet<PairKey>) {
    for (i, a) in subs.iter().enumerate() {
        for b in &subs[i + 1..] {
            if a.student != b.student {
                pairs.extend(PairKey::new(a.id.clone(), b.id.clone()));
            }
        }
    }
}
