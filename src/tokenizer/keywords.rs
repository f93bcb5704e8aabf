//! Keyword and built-in type vocabulary
//!
//! Words in this set are classified as [`TokenKind::Keyword`] instead of
//! [`TokenKind::Identifier`]. Renaming identifiers is the cheapest way to
//! disguise copied code, so keeping these words distinct lets the structural
//! skeleton survive a rename.
//!
//! [`TokenKind::Keyword`]: super::TokenKind::Keyword
//! [`TokenKind::Identifier`]: super::TokenKind::Identifier

use once_cell::sync::Lazy;
use std::collections::HashSet;

const LANGUAGE_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break",
    "case", "class", "continue", "def", "del", "elif", "else", "except",
    "finally", "for", "from", "global", "if", "import", "in", "is", "lambda",
    "match", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield",
];

const BUILTIN_TYPES: &[&str] = &[
    "bool", "bytearray", "bytes", "complex", "dict", "float", "frozenset",
    "int", "list", "object", "range", "set", "str", "tuple", "type",
];

static KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    LANGUAGE_KEYWORDS
        .iter()
        .chain(BUILTIN_TYPES.iter())
        .copied()
        .collect()
});

/// Whether `word` is a language keyword or built-in type name
pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(word)
}
