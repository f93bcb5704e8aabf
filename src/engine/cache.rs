//! Fill-once token cache for one report run
//!
//! A submission that appears in many pairs is tokenized exactly once. Each
//! slot is a `OnceCell`: the first worker that needs a submission tokenizes
//! it and publishes the result, every later reader gets the shared `Arc`
//! without locking. Token sequences are immutable, so sharing is safe.

use super::pairs::{ensure_unique_ids, Submission, SubmissionId};
use crate::tokenizer::{tokenize, Token};
use crate::TwinscanResult;
use once_cell::sync::OnceCell;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Tokens and content digest of one submission
#[derive(Debug)]
pub struct Tokenized {
    pub tokens: Vec<Token>,
    /// SHA-256 of the source text, hex encoded
    pub sha256: String,
}

/// Per-run token cache over a fixed submission set
pub struct TokenCache<'a> {
    submissions: &'a [Submission],
    index: HashMap<&'a SubmissionId, usize>,
    slots: Vec<OnceCell<Arc<Tokenized>>>,
    tokenized: AtomicUsize,
}

impl<'a> TokenCache<'a> {
    /// Build an empty cache. Fails on duplicate submission ids.
    pub fn new(submissions: &'a [Submission]) -> TwinscanResult<Self> {
        ensure_unique_ids(submissions)?;
        let index = submissions
            .iter()
            .enumerate()
            .map(|(i, s)| (&s.id, i))
            .collect();
        let slots = (0..submissions.len()).map(|_| OnceCell::new()).collect();

        Ok(Self {
            submissions,
            index,
            slots,
            tokenized: AtomicUsize::new(0),
        })
    }

    /// Tokens for `id`, tokenizing on first use. `None` for unknown ids.
    pub fn get(&self, id: &SubmissionId) -> Option<Arc<Tokenized>> {
        let idx = *self.index.get(id)?;
        let entry = self.slots[idx].get_or_init(|| {
            let source = &self.submissions[idx].source;
            let tokens = tokenize(source);
            tracing::debug!("Tokenized {} ({} tokens)", id, tokens.len());
            self.tokenized.fetch_add(1, Ordering::Relaxed);
            Arc::new(Tokenized {
                tokens,
                sha256: hex::encode(Sha256::digest(source.as_bytes())),
            })
        });
        Some(Arc::clone(entry))
    }

    pub fn contains(&self, id: &SubmissionId) -> bool {
        self.index.contains_key(id)
    }

    /// Number of submissions tokenized so far
    pub fn tokenized_count(&self) -> usize {
        self.tokenized.load(Ordering::Relaxed)
    }
}
