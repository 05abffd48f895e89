//! The authoritative ordered, duplicate-free word set of a session.

use super::import::{ImportFormat, decode_text};
use super::normalize::{is_valid_word, normalize_entry, normalize_words};
use super::WordError;
use rand::Rng;
use rand::seq::SliceRandom;

/// Demonstration words for a quick start.
pub const SAMPLE_WORDS: [&str; 6] = ["PUZZLE", "SEARCH", "WORDS", "FIND", "GAME", "FUN"];

/// Outcome of adding many words at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkAddReport {
    /// Words appended to the collection.
    pub added: usize,
    /// Valid words skipped because they were already present.
    pub skipped_duplicates: usize,
}

impl BulkAddReport {
    /// Whether the collection changed.
    pub fn changed(&self) -> bool {
        self.added > 0
    }

    /// Human-readable summary, e.g. "3 words added (1 duplicate skipped)".
    pub fn message(&self) -> String {
        if self.added == 0 {
            return "All words already exist in the list".to_string();
        }
        let mut message = format!("{} word{} added", self.added, plural(self.added));
        if self.skipped_duplicates > 0 {
            message.push_str(&format!(
                " ({} duplicate{} skipped)",
                self.skipped_duplicates,
                plural(self.skipped_duplicates)
            ));
        }
        message
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}

/// Ordered sequence of unique words.
///
/// Insertion order drives display order and is what [`randomize`](Self::randomize)
/// permutes. Only normalized words ever enter the collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordCollection {
    words: Vec<String>,
}

impl WordCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Check whether a word (in any case) is present.
    pub fn contains(&self, word: &str) -> bool {
        let word = normalize_entry(word);
        self.words.iter().any(|w| *w == word)
    }

    /// Iterate words in display order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

    /// Words in display order.
    pub fn as_slice(&self) -> &[String] {
        &self.words
    }

    /// Newline-joined form sent to the generation engine.
    pub fn joined(&self) -> String {
        self.words.join("\n")
    }

    /// Label for the word counter, e.g. "1 word" or "4 words".
    pub fn count_label(&self) -> String {
        format!("{} word{}", self.len(), plural(self.len()))
    }

    /// Add a single manually entered word. Returns the normalized word.
    pub fn add(&mut self, raw: &str) -> Result<String, WordError> {
        let word = normalize_entry(raw);
        if !is_valid_word(&word) {
            return Err(WordError::InvalidWord);
        }
        if self.words.contains(&word) {
            return Err(WordError::DuplicateWord(word));
        }
        self.words.push(word.clone());
        Ok(word)
    }

    /// Normalize pasted text and append the words not already present.
    pub fn bulk_add(&mut self, raw: &str) -> Result<BulkAddReport, WordError> {
        let parsed = normalize_words(raw);
        if parsed.is_empty() {
            return Err(WordError::NoValidWords);
        }
        Ok(self.extend_unique(parsed))
    }

    /// Import words from decoded file content.
    ///
    /// Binary office formats are rejected from the file name alone, before
    /// the content is looked at.
    pub fn import_from_file(&mut self, file_name: &str, bytes: &[u8]) -> Result<BulkAddReport, WordError> {
        ImportFormat::from_file_name(file_name).ensure_supported()?;
        let text = decode_text(bytes)?;
        self.bulk_add(text)
    }

    fn extend_unique(&mut self, parsed: Vec<String>) -> BulkAddReport {
        let mut report = BulkAddReport::default();
        for word in parsed {
            if self.words.contains(&word) {
                report.skipped_duplicates += 1;
            } else {
                self.words.push(word);
                report.added += 1;
            }
        }
        report
    }

    /// Remove a word. Absent words are a no-op and return `false`.
    pub fn remove(&mut self, word: &str) -> bool {
        let word = normalize_entry(word);
        let before = self.words.len();
        self.words.retain(|w| *w != word);
        self.words.len() != before
    }

    /// Shuffle into a uniformly random order.
    pub fn randomize(&mut self) -> Result<(), WordError> {
        self.randomize_with(&mut rand::thread_rng())
    }

    /// Shuffle with a caller-supplied RNG (Fisher-Yates).
    pub fn randomize_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), WordError> {
        if self.words.is_empty() {
            return Err(WordError::Empty);
        }
        self.words.shuffle(rng);
        Ok(())
    }

    /// Remove every word. Returns `true` if anything was removed.
    pub fn clear(&mut self) -> bool {
        let changed = !self.words.is_empty();
        self.words.clear();
        changed
    }

    /// Replace the content with [`SAMPLE_WORDS`].
    pub fn load_samples(&mut self) {
        self.words = SAMPLE_WORDS.iter().map(|w| w.to_string()).collect();
    }
}
