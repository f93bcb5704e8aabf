//! Longest common subsequence
//!
//! Two forms of the same O(n·m) recurrence:
//!
//! - [`lcs_length`] keeps only two rows, sized to the shorter input, so
//!   memory stays O(min(n, m)) while many pairs are scored concurrently.
//! - [`lcs_alignment`] fills the dense `(n+1)×(m+1)` table and walks the
//!   backtrace to recover which positions were matched. Only used for
//!   highlighting, where the matched positions are needed.

/// Length of the longest common subsequence of `a` and `b`.
pub fn lcs_length<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    if short.is_empty() {
        return 0;
    }

    let mut prev = vec![0u32; short.len() + 1];
    let mut curr = vec![0u32; short.len() + 1];

    for x in long {
        for (j, y) in short.iter().enumerate() {
            curr[j + 1] = if x == y {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[short.len()] as usize
}

/// Matched index pairs `(i, j)` of one longest common subsequence,
/// ascending in both `i` and `j`.
///
/// Ties prefer skipping an element of `a` over skipping one of `b`, which
/// keeps the result deterministic.
pub fn lcs_alignment<T: PartialEq>(a: &[T], b: &[T]) -> Vec<(usize, usize)> {
    let (n, m) = (a.len(), b.len());
    if n == 0 || m == 0 {
        return Vec::new();
    }

    let width = m + 1;
    let mut table = vec![0u32; (n + 1) * width];
    for i in 1..=n {
        for j in 1..=m {
            table[i * width + j] = if a[i - 1] == b[j - 1] {
                table[(i - 1) * width + (j - 1)] + 1
            } else {
                table[(i - 1) * width + j].max(table[i * width + (j - 1)])
            };
        }
    }

    let mut pairs = Vec::with_capacity(table[n * width + m] as usize);
    let (mut i, mut j) = (n, m);
    while i > 0 && j > 0 {
        if a[i - 1] == b[j - 1] {
            pairs.push((i - 1, j - 1));
            i -= 1;
            j -= 1;
        } else if table[(i - 1) * width + j] >= table[i * width + (j - 1)] {
            i -= 1;
        } else {
            j -= 1;
        }
    }

    pairs.reverse();
    pairs
}
