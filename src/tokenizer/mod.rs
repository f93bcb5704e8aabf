//! Source tokenizer: lexical token streams for similarity scoring
//!
//! Turns raw submission text into an ordered sequence of classified tokens.
//! Two passes:
//!
//! 1. **Scrub** (`scrub`): line-by-line pre-pass that blanks comments,
//!    triple-quoted blocks, string bodies and escapes while keeping every
//!    line the same width.
//! 2. **Scan**: single left-to-right cursor over the scrubbed text that
//!    emits one token per lexeme.
//!
//! Literals are canonicalized: every string becomes `STRING_LITERAL` and
//! every number becomes `NUMBER`, so the values a student picks never
//! influence similarity. Keywords stay distinct from identifiers so that
//! renamed code still shares its keyword/operator skeleton.
//!
//! Malformed input is never an error. Unterminated strings consume the rest
//! of their line, unterminated triple quotes consume the rest of the source.

pub mod keywords;
pub mod scrub;

use serde::{Deserialize, Serialize};

/// Canonical text of every string literal
pub const STRING_LITERAL: &str = "STRING_LITERAL";
/// Canonical text of every numeric literal
pub const NUMBER_LITERAL: &str = "NUMBER";

const THREE_CHAR_OPERATORS: &[&str] = &["**=", "//=", "<<=", ">>="];

const TWO_CHAR_OPERATORS: &[&str] = &[
    "**", "//", "==", "!=", ">=", "<=", "<<", ">>", "+=", "-=", "*=", "/=", "%=", "&=", "|=",
    "^=", "->", ":=",
];

const DELIMITERS: &[char] = &['(', ')', '[', ']', '{', '}', ':', '.', ',', ';', '@'];

// ─── Types ─────────────────────────────────────────────────────────

/// Lexical class of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    Identifier,
    Keyword,
    Operator,
    Delimiter,
    Literal,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Identifier => write!(f, "identifier"),
            Self::Keyword => write!(f, "keyword"),
            Self::Operator => write!(f, "operator"),
            Self::Delimiter => write!(f, "delimiter"),
            Self::Literal => write!(f, "literal"),
        }
    }
}

/// A single classified token
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    /// Token text; canonical placeholder for literals
    pub text: String,
    /// Index of this token in its sequence (not a byte offset)
    pub position: u32,
    /// 1-based source line the token starts on
    pub line: u32,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, position: u32, line: u32) -> Self {
        Self {
            kind,
            text: text.into(),
            position,
            line,
        }
    }
}

// ─── Entry Point ───────────────────────────────────────────────────

/// Tokenize `source` into a fresh token sequence.
///
/// Comments never produce tokens. Never panics on malformed input.
pub fn tokenize(source: &str) -> Vec<Token> {
    let scrubbed = scrub::scrub(source);
    Scanner::new(&scrubbed).scan()
}

// ─── Scanner ───────────────────────────────────────────────────────

struct Scanner {
    chars: Vec<char>,
    cursor: usize,
    line: u32,
    tokens: Vec<Token>,
}

impl Scanner {
    fn new(scrubbed: &str) -> Self {
        Self {
            chars: scrubbed.chars().collect(),
            cursor: 0,
            line: 1,
            tokens: Vec::new(),
        }
    }

    fn scan(mut self) -> Vec<Token> {
        while let Some(c) = self.peek() {
            if c == '\n' {
                self.line += 1;
                self.cursor += 1;
            } else if c.is_whitespace() {
                self.cursor += 1;
            } else if c == '#' {
                self.skip_to_line_end();
            } else if c == '"' || c == '\'' {
                self.string_literal(c);
            } else if c.is_ascii_digit() {
                self.number_literal();
            } else if is_identifier_start(c) {
                self.word();
            } else {
                self.operator_or_delimiter(c);
            }
        }
        self.tokens
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.cursor).copied()
    }

    fn push(&mut self, kind: TokenKind, text: impl Into<String>) {
        let position = self.tokens.len() as u32;
        self.tokens.push(Token::new(kind, text, position, self.line));
    }

    fn skip_to_line_end(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.cursor += 1;
        }
    }

    fn string_literal(&mut self, quote: char) {
        self.push(TokenKind::Literal, STRING_LITERAL);
        self.cursor += 1;
        while let Some(c) = self.peek() {
            match c {
                // Unterminated: the newline is left for the main loop
                '\n' => return,
                '\\' if self.chars.get(self.cursor + 1) != Some(&'\n') => self.cursor += 2,
                _ if c == quote => {
                    self.cursor += 1;
                    return;
                }
                _ => self.cursor += 1,
            }
        }
    }

    fn number_literal(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-') {
                self.cursor += 1;
            } else {
                break;
            }
        }
        self.push(TokenKind::Literal, NUMBER_LITERAL);
    }

    fn word(&mut self) {
        let start = self.cursor;
        while let Some(c) = self.peek() {
            if is_identifier_continue(c) {
                self.cursor += 1;
            } else {
                break;
            }
        }
        let text: String = self.chars[start..self.cursor].iter().collect();
        let kind = if keywords::is_keyword(&text) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        self.push(kind, text);
    }

    fn operator_or_delimiter(&mut self, c: char) {
        for width in [3usize, 2] {
            let candidates = if width == 3 {
                THREE_CHAR_OPERATORS
            } else {
                TWO_CHAR_OPERATORS
            };
            if let Some(op) = self.match_any(width, candidates) {
                self.cursor += width;
                self.push(TokenKind::Operator, op);
                return;
            }
        }

        self.cursor += 1;
        let kind = if DELIMITERS.contains(&c) {
            TokenKind::Delimiter
        } else {
            TokenKind::Operator
        };
        self.push(kind, c.to_string());
    }

    fn match_any(&self, width: usize, candidates: &[&'static str]) -> Option<&'static str> {
        let end = self.cursor + width;
        if end > self.chars.len() {
            return None;
        }
        let window: String = self.chars[self.cursor..end].iter().collect();
        candidates.iter().copied().find(|op| *op == window)
    }
}

fn is_identifier_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_identifier_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

// ─── Tests ─────────────────────────────────────────────────────────
