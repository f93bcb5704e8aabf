//! Comment and quote pre-pass
//!
//! Produces a copy of the source where comments, triple-quoted blocks,
//! string bodies and escape sequences are replaced by spaces. Every line
//! keeps its original character count and the line structure is preserved,
//! so positions in the scrubbed text map one-to-one onto the source.
//!
//! Single and double quote characters survive the pass (only their bodies
//! are blanked) so the scanner can still emit one string literal per string.

/// Which quote run the scanner is currently inside on a given line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quote {
    None,
    Single,
    Double,
}

/// Scrub comments and string contents from `source`.
pub fn scrub(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    // Only an unterminated triple quote is carried from one line to the next.
    let mut open_triple: Option<char> = None;

    for (idx, line) in source.split('\n').enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        scrub_line(line, &mut open_triple, &mut out);
    }

    out
}

fn scrub_line(line: &str, open_triple: &mut Option<char>, out: &mut String) {
    let chars: Vec<char> = line.chars().collect();
    let len = chars.len();
    let mut quote = Quote::None;
    let mut i = 0;

    while i < len {
        if let Some(delim) = *open_triple {
            match find_triple(&chars, i, delim) {
                Some(close) => {
                    blank(out, close + 3 - i);
                    i = close + 3;
                    *open_triple = None;
                }
                None => {
                    blank(out, len - i);
                    i = len;
                }
            }
            continue;
        }

        let c = chars[i];

        if quote != Quote::None {
            if c == '\\' {
                // Escape and escaped char both become blanks
                let width = if i + 1 < len { 2 } else { 1 };
                blank(out, width);
                i += width;
                continue;
            }
            let closes = matches!((quote, c), (Quote::Single, '\'') | (Quote::Double, '"'));
            if closes {
                quote = Quote::None;
                out.push(c);
            } else {
                out.push(' ');
            }
            i += 1;
            continue;
        }

        match c {
            '#' => {
                blank(out, len - i);
                i = len;
            }
            '"' | '\'' if is_triple_at(&chars, i, c) => match find_triple(&chars, i + 3, c) {
                Some(close) => {
                    blank(out, close + 3 - i);
                    i = close + 3;
                }
                None => {
                    *open_triple = Some(c);
                    blank(out, len - i);
                    i = len;
                }
            },
            '"' => {
                quote = Quote::Double;
                out.push(c);
                i += 1;
            }
            '\'' => {
                quote = Quote::Single;
                out.push(c);
                i += 1;
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }
}

fn is_triple_at(chars: &[char], at: usize, delim: char) -> bool {
    at + 3 <= chars.len() && chars[at..at + 3].iter().all(|&c| c == delim)
}

/// Index of the first closing triple delimiter at or after `from`
fn find_triple(chars: &[char], from: usize, delim: char) -> Option<usize> {
    (from..chars.len()).find(|&at| is_triple_at(chars, at, delim))
}

fn blank(out: &mut String, width: usize) {
    out.extend(std::iter::repeat(' ').take(width));
}
