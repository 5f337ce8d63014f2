//! Text normalization for diacritic-, case-, and separator-insensitive matching.
//!
//! Every value that goes into a search index and every incoming query pass
//! through [`normalize`], so matching is insensitive by construction rather
//! than by per-call fixups. Normalization is deterministic and idempotent:
//! `normalize(normalize(s, m), m) == normalize(s, m)` for both modes.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// How aggressively to canonicalize a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Lowercased, diacritics folded to base Latin letters, whitespace runs
    /// collapsed to a single space, trimmed. For person/operator/station names.
    Text,
    /// [`Mode::Text`] plus removal of separators (whitespace, hyphens, dots),
    /// so `"98H-07480"`, `"98H 07480"` and `"98H07480"` compare equal.
    /// For plate numbers, badge numbers and route codes.
    Code,
}

/// Canonicalize `input` for comparison under `mode`.
///
/// Total on any input: empty strings, digits, punctuation and symbols all
/// come back unharmed (or dropped, for separators in [`Mode::Code`]).
pub fn normalize(input: &str, mode: Mode) -> String {
    // NFD first so precomposed accented letters split into base + combining
    // mark; the mark is then dropped. đ/Đ carry no canonical decomposition
    // and are folded by hand.
    let mut folded = String::with_capacity(input.len());
    for c in input.nfd() {
        if is_combining_mark(c) {
            continue;
        }
        match c {
            'đ' | 'Đ' => folded.push('d'),
            _ => folded.extend(c.to_lowercase()),
        }
    }

    match mode {
        Mode::Text => collapse_whitespace(&folded),
        Mode::Code => folded
            .chars()
            .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '.'))
            .collect(),
    }
}

/// Split an already-normalized [`Mode::Text`] value into word tokens.
pub fn words(normalized: &str) -> impl Iterator<Item = &str> {
    normalized.split_whitespace()
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_space = true; // leading whitespace is dropped
    for c in text.chars() {
        if c.is_whitespace() {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else {
            out.push(c);
            prev_space = false;
        }
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out
}
