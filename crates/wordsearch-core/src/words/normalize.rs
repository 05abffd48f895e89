//! Text-to-word-list normalization shared by manual entry, paste and file import.

use std::collections::HashSet;

/// Number of words shown in a paste preview before the rest are summarized.
pub const PASTE_PREVIEW_LIMIT: usize = 20;

/// Characters that always separate words, alone or in runs.
fn is_delimiter(c: char) -> bool {
    matches!(c, '\n' | '\r' | ',' | ';' | '\t')
}

/// Check that a normalized candidate only holds uppercase letters and spaces.
pub fn is_valid_word(candidate: &str) -> bool {
    !candidate.is_empty()
        && candidate
            .chars()
            .all(|c| c.is_ascii_uppercase() || c == ' ')
}

/// Trim and uppercase a single entry.
pub fn normalize_entry(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Split raw text into candidate tokens.
///
/// Delimiters are runs of newline, carriage return, comma, semicolon or tab,
/// and any run of two or more whitespace characters. A single space stays
/// inside the token so multi-word entries like "ICE CREAM" survive.
fn split_candidates(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if is_delimiter(c) {
            tokens.push(std::mem::take(&mut current));
            i += 1;
            continue;
        }
        if c.is_whitespace() {
            let run_end = chars[i..]
                .iter()
                .position(|ch| !ch.is_whitespace())
                .map(|offset| i + offset)
                .unwrap_or(chars.len());
            if run_end - i >= 2 {
                tokens.push(std::mem::take(&mut current));
            } else {
                current.push(c);
            }
            i = run_end;
            continue;
        }
        current.push(c);
        i += 1;
    }
    tokens.push(current);
    tokens
}

/// Turn raw text from any source into an ordered list of unique, valid words.
///
/// Never fails: malformed input simply yields fewer words.
pub fn normalize_words(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    split_candidates(text)
        .into_iter()
        .map(|token| normalize_entry(&token))
        .filter(|word| is_valid_word(word))
        .filter(|word| seen.insert(word.clone()))
        .collect()
}

/// Live summary of pasted text before it is committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PastePreview {
    /// Total number of valid, unique words found.
    pub count: usize,
    /// The first words, up to [`PASTE_PREVIEW_LIMIT`].
    pub shown: Vec<String>,
    /// How many words were left out of `shown`.
    pub remaining: usize,
}

impl PastePreview {
    /// Whether the pasted text contains anything that could be added.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Build the paste dialog preview for `text`.
pub fn preview_paste(text: &str) -> PastePreview {
    let words = normalize_words(text);
    let count = words.len();
    let shown: Vec<String> = words.into_iter().take(PASTE_PREVIEW_LIMIT).collect();
    PastePreview {
        count,
        remaining: count - shown.len(),
        shown,
    }
}
