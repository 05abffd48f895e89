//! Word list management: normalization, the active collection and file import.

mod collection;
mod import;
mod normalize;

pub use collection::{BulkAddReport, SAMPLE_WORDS, WordCollection};
pub use import::{ImportFormat, decode_text};
pub use normalize::{
    PASTE_PREVIEW_LIMIT, PastePreview, is_valid_word, normalize_entry, normalize_words,
    preview_paste,
};

use thiserror::Error;

/// Validation failures for word list edits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WordError {
    #[error("Please enter a valid word")]
    InvalidWord,
    #[error("Word already exists in the list")]
    DuplicateWord(String),
    #[error("No valid words found")]
    NoValidWords,
    #[error("No words to randomize")]
    Empty,
    #[error("{0}")]
    UnsupportedFormat(String),
    #[error("File is not valid UTF-8 text")]
    InvalidEncoding,
}
