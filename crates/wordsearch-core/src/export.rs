//! Final puzzle export.

use crate::preview::DirectionFlags;
use crate::remote::{GeneratedDocument, PuzzleEngine, RemoteError, RemoteResult};
use crate::shapes::ShapeId;
use crate::words::WordCollection;
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Title used when the user leaves it blank.
pub const DEFAULT_TITLE: &str = "Word Search Puzzle";
/// Font used when none is chosen.
pub const DEFAULT_FONT: &str = "Arial";

/// Export errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    #[error("Please add some words first")]
    NoWords,
    #[error("A puzzle is already being generated")]
    Busy,
    #[error("Error generating puzzle: {0}")]
    Remote(#[from] RemoteError),
}

/// Document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Pdf,
    Word,
}

impl ExportFormat {
    /// Wire name.
    pub fn name(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Word => "word",
        }
    }

    /// File extension of the produced document.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Word => "docx",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pdf" => Some(ExportFormat::Pdf),
            "word" | "docx" => Some(ExportFormat::Word),
            _ => None,
        }
    }

    /// Filename used when the server does not suggest one.
    pub fn default_file_name(self) -> String {
        format!("puzzle.{}", self.extension())
    }
}

/// Visual theme of the exported document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Modern,
    Cozy,
    Playful,
}

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::Modern, Theme::Cozy, Theme::Playful];

    pub fn name(self) -> &'static str {
        match self {
            Theme::Modern => "modern",
            Theme::Cozy => "cozy",
            Theme::Playful => "playful",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == s.to_ascii_lowercase())
    }
}

/// User-supplied export settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub title: String,
    pub subject: String,
    pub font: String,
    pub theme: Theme,
    pub format: ExportFormat,
    pub directions: DirectionFlags,
}

impl Default for ExportMetadata {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            subject: String::new(),
            font: DEFAULT_FONT.to_string(),
            theme: Theme::default(),
            format: ExportFormat::default(),
            directions: DirectionFlags::default(),
        }
    }
}

impl ExportMetadata {
    /// Replace blank title and font with their defaults.
    pub fn normalized(mut self) -> Self {
        if self.title.trim().is_empty() {
            self.title = DEFAULT_TITLE.to_string();
        }
        if self.font.trim().is_empty() {
            self.font = DEFAULT_FONT.to_string();
        }
        self
    }
}

/// Snapshot sent to the engine for the final document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    pub words: Vec<String>,
    pub shape: ShapeId,
    pub metadata: ExportMetadata,
}

/// Document ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Extract the suggested filename from a `Content-Disposition` header.
///
/// Directory components are stripped.
pub fn filename_from_disposition(header: &str) -> Option<String> {
    let mut plain = None;
    let mut extended = None;
    for param in header.split(';').map(str::trim) {
        let Some((key, value)) = param.split_once('=') else {
            continue;
        };
        match key.trim().to_ascii_lowercase().as_str() {
            "filename" => plain = Some(value.trim().trim_matches('"').to_string()),
            "filename*" => {
                let value = value.trim();
                let encoded = value.split_once("''").map_or(value, |(_, rest)| rest);
                extended = Some(percent_decode_str(encoded).decode_utf8_lossy().into_owned());
            }
            _ => {}
        }
    }
    let name = extended.or(plain)?;
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default().trim().to_string();
    if base.is_empty() || base == "." || base == ".." { None } else { Some(base) }
}

/// One-at-a-time export gate.
#[derive(Debug, Default)]
pub struct ExportCoordinator {
    in_flight: Option<ExportFormat>,
}

impl ExportCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Validate and mark an export as in flight.
    ///
    /// Rejected without side effects when the collection is empty or an
    /// export is already running.
    pub fn begin(
        &mut self,
        words: &WordCollection,
        shape: &ShapeId,
        metadata: ExportMetadata,
    ) -> Result<GenerateRequest, ExportError> {
        if words.is_empty() {
            log::warn!("Export rejected: no words");
            return Err(ExportError::NoWords);
        }
        if self.is_busy() {
            log::warn!("Export rejected: already generating");
            return Err(ExportError::Busy);
        }
        let metadata = metadata.normalized();
        self.in_flight = Some(metadata.format);
        log::debug!("Export started: '{}' as {}", metadata.title, metadata.format.name());
        Ok(GenerateRequest {
            words: words.as_slice().to_vec(),
            shape: shape.clone(),
            metadata,
        })
    }

    /// Complete the in-flight export and clear the busy flag.
    pub fn finish(&mut self, result: RemoteResult<GeneratedDocument>) -> Result<ExportedDocument, ExportError> {
        let format = self.in_flight.take().unwrap_or_default();
        match result {
            Ok(document) => {
                let file_name = document
                    .content_disposition
                    .as_deref()
                    .and_then(filename_from_disposition)
                    .unwrap_or_else(|| format.default_file_name());
                log::info!("Puzzle generated: {} ({} bytes)", file_name, document.bytes.len());
                Ok(ExportedDocument {
                    file_name,
                    bytes: document.bytes,
                })
            }
            Err(e) => {
                log::error!("Puzzle generation failed: {}", e);
                Err(ExportError::Remote(e))
            }
        }
    }

    /// Run a whole export against `engine`.
    pub async fn generate<E: PuzzleEngine + ?Sized>(
        &mut self,
        engine: &E,
        words: &WordCollection,
        shape: &ShapeId,
        metadata: ExportMetadata,
    ) -> Result<ExportedDocument, ExportError> {
        let request = self.begin(words, shape, metadata)?;
        let result = engine.generate(&request).await;
        self.finish(result)
    }
}
