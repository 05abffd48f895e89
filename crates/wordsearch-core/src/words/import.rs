//! Word list file import.
//!
//! Only plain delimited text is accepted. The check looks at the file
//! extension alone; content sniffing is limited to requiring valid UTF-8.

use super::WordError;

/// Kind of word list file, detected from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    /// `.txt`, `.csv` or any extension not known to be binary.
    PlainText,
    /// `.xlsx` / `.xls` spreadsheets.
    Spreadsheet,
    /// `.docx` / `.doc` word processor documents.
    Document,
}

impl ImportFormat {
    /// Detect format from a file name.
    pub fn from_file_name(file_name: &str) -> Self {
        let lower = file_name.to_lowercase();
        let ext = lower.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");
        match ext {
            "xlsx" | "xls" => ImportFormat::Spreadsheet,
            "docx" | "doc" => ImportFormat::Document,
            _ => ImportFormat::PlainText,
        }
    }

    /// Reject binary office formats before any content is read.
    pub fn ensure_supported(self) -> Result<(), WordError> {
        match self {
            ImportFormat::PlainText => Ok(()),
            ImportFormat::Spreadsheet => Err(WordError::UnsupportedFormat(
                "Excel files not yet supported. Please use .txt or .csv files.".to_string(),
            )),
            ImportFormat::Document => Err(WordError::UnsupportedFormat(
                "Word documents not yet supported. Please use .txt or .csv files.".to_string(),
            )),
        }
    }
}

/// Decode file content as text.
pub fn decode_text(bytes: &[u8]) -> Result<&str, WordError> {
    let text = std::str::from_utf8(bytes).map_err(|_| WordError::InvalidEncoding)?;
    Ok(text.strip_prefix('\u{feff}').unwrap_or(text))
}
