//! Vocabulary overlap between token sequences

use crate::tokenizer::Token;
use std::collections::{HashMap, HashSet};

/// Sizes of the intersection and union of the distinct token texts.
pub fn text_set_overlap(a: &[Token], b: &[Token]) -> (usize, usize) {
    let set_a: HashSet<&str> = a.iter().map(|t| t.text.as_str()).collect();
    let set_b: HashSet<&str> = b.iter().map(|t| t.text.as_str()).collect();
    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.len() + set_b.len() - intersection;
    (intersection, union)
}

/// Size of the multiset intersection of token texts.
///
/// Every common subsequence is also a sub-multiset of both sides, so this is
/// an upper bound on the LCS length that costs O(n + m).
pub fn multiset_overlap(a: &[Token], b: &[Token]) -> usize {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for t in a {
        *counts.entry(t.text.as_str()).or_default() += 1;
    }

    let mut shared = 0;
    for t in b {
        if let Some(remaining) = counts.get_mut(t.text.as_str()) {
            if *remaining > 0 {
                *remaining -= 1;
                shared += 1;
            }
        }
    }
    shared
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    #[test]
    fn test_set_overlap_ignores_repetition() {
        let a = tokenize("x x x y");
        let b = tokenize("x y y z");
        assert_eq!(text_set_overlap(&a, &b), (2, 3));
    }

    #[test]
    fn test_set_overlap_empty() {
        assert_eq!(text_set_overlap(&[], &[]), (0, 0));
    }

    #[test]
    fn test_multiset_overlap_counts_duplicates() {
        let a = tokenize("x x x y");
        let b = tokenize("x x y y");
        assert_eq!(multiset_overlap(&a, &b), 3);
        assert_eq!(multiset_overlap(&b, &a), 3);
    }
}
