//! In-memory backend for offline use and testing.

use super::{
    BoxFuture, ClearReport, GeneratedDocument, PuzzleEngine, PuzzlePreview, RemoteError, RemoteResult,
    ShapePayload, ShapeStore,
};
use crate::export::{ExportFormat, GenerateRequest};
use crate::preview::{DirectionFlags, PreviewRequest};
use crate::shapes::ShapeId;
use std::collections::VecDeque;
use std::sync::{RwLock, RwLockWriteGuard};

/// Number of calls received per operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub preview: usize,
    pub generate: usize,
    pub create: usize,
    pub list: usize,
    pub delete_one: usize,
    pub delete_all: usize,
}

impl CallCounts {
    /// Total number of remote calls.
    pub fn total(&self) -> usize {
        self.preview + self.generate + self.create + self.list + self.delete_one + self.delete_all
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    shapes: Vec<String>,
    failures: VecDeque<RemoteError>,
    calls: CallCounts,
}

impl MemoryState {
    /// Pop an injected failure, if any.
    fn take_failure(&mut self) -> RemoteResult<()> {
        match self.failures.pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Backend that keeps custom shapes in memory and lays out a simple
/// deterministic grid instead of a real puzzle.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: RwLock<MemoryState>,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a custom shape directly, bypassing the call counters.
    pub fn insert_shape(&self, name: &str) {
        if let Ok(mut state) = self.state.write() {
            if !state.shapes.iter().any(|s| s == name) {
                state.shapes.push(name.to_string());
            }
        }
    }

    /// Make the next call fail with `err`. Failures queue up in order.
    pub fn fail_next(&self, err: RemoteError) {
        if let Ok(mut state) = self.state.write() {
            state.failures.push_back(err);
        }
    }

    /// Snapshot of the call counters.
    pub fn calls(&self) -> CallCounts {
        self.state.read().map(|s| s.calls).unwrap_or_default()
    }

    /// Names currently stored.
    pub fn shape_names(&self) -> Vec<String> {
        self.state.read().map(|s| s.shapes.clone()).unwrap_or_default()
    }

    fn lock(&self) -> RemoteResult<RwLockWriteGuard<'_, MemoryState>> {
        self.state
            .write()
            .map_err(|e| RemoteError::Transport(format!("Lock error: {}", e)))
    }
}

/// Filler letter for cells no word occupies.
fn filler(row: usize, col: usize) -> char {
    (b'A' + ((row * 7 + col * 3) % 26) as u8) as char
}

/// Place words one per row (or column, or along the diagonal) of a square grid.
fn layout(words: &[String], directions: DirectionFlags) -> PuzzlePreview {
    let letters: Vec<Vec<char>> = words
        .iter()
        .map(|w| w.chars().filter(|c| *c != ' ').collect())
        .collect();
    let longest = letters.iter().map(Vec::len).max().unwrap_or(0);
    let size = longest.max(letters.len());

    let mut grid: Vec<Vec<Option<char>>> = (0..size)
        .map(|r| (0..size).map(|c| Some(filler(r, c))).collect())
        .collect();
    let mut placed = Vec::new();

    if directions.horizontal || directions.vertical {
        for (i, word) in letters.iter().enumerate() {
            for (j, ch) in word.iter().enumerate() {
                let (r, c) = if directions.horizontal { (i, j) } else { (j, i) };
                grid[r][c] = Some(*ch);
            }
            placed.push(words[i].clone());
        }
    } else if directions.diagonal {
        if let Some(word) = letters.first() {
            for (k, ch) in word.iter().enumerate() {
                grid[k][k] = Some(*ch);
            }
            placed.push(words[0].clone());
        }
    }

    PuzzlePreview { grid, placed_words: placed }
}

impl PuzzleEngine for MemoryBackend {
    fn preview(&self, request: &PreviewRequest) -> BoxFuture<'_, RemoteResult<PuzzlePreview>> {
        let request = request.clone();
        Box::pin(async move {
            let mut state = self.lock()?;
            state.calls.preview += 1;
            state.take_failure()?;
            if request.words.is_empty() {
                return Err(RemoteError::Server("No words provided".to_string()));
            }
            if let ShapeId::Custom(name) = &request.shape {
                if !state.shapes.contains(name) {
                    return Err(RemoteError::Server(format!("Unknown shape: {}", name)));
                }
            }
            Ok(layout(&request.words, request.directions))
        })
    }

    fn generate(&self, request: &GenerateRequest) -> BoxFuture<'_, RemoteResult<GeneratedDocument>> {
        let request = request.clone();
        Box::pin(async move {
            let mut state = self.lock()?;
            state.calls.generate += 1;
            state.take_failure()?;
            if request.words.is_empty() {
                return Err(RemoteError::Server("No words provided".to_string()));
            }
            let metadata = &request.metadata;
            let safe_title: String = metadata
                .title
                .chars()
                .map(|c| if matches!(c, ' ' | '/' | '\\') { '_' } else { c })
                .collect();
            let magic: &[u8] = match metadata.format {
                ExportFormat::Pdf => b"%PDF-1.4\n",
                ExportFormat::Word => b"PK\x03\x04",
            };
            let mut bytes = magic.to_vec();
            bytes.extend_from_slice(request.words.join("\n").as_bytes());
            Ok(GeneratedDocument {
                bytes,
                content_disposition: Some(format!(
                    "attachment; filename={}.{}",
                    safe_title,
                    metadata.format.extension()
                )),
            })
        })
    }
}

impl ShapeStore for MemoryBackend {
    fn create(&self, name: &str, payload: &ShapePayload) -> BoxFuture<'_, RemoteResult<String>> {
        let name = name.to_string();
        let payload = payload.clone();
        Box::pin(async move {
            let mut state = self.lock()?;
            state.calls.create += 1;
            state.take_failure()?;
            let message = match &payload {
                ShapePayload::Drawing(data) if data.is_empty() => {
                    return Err(RemoteError::Server("No canvas data provided".to_string()));
                }
                ShapePayload::Upload { file_name, .. } if file_name.is_empty() => {
                    return Err(RemoteError::Server("No file selected".to_string()));
                }
                ShapePayload::Drawing(_) => "Drawing saved as custom shape!",
                ShapePayload::Upload { .. } => "Image uploaded and processed as custom shape!",
            };
            if !state.shapes.contains(&name) {
                state.shapes.push(name);
            }
            Ok(message.to_string())
        })
    }

    fn list(&self) -> BoxFuture<'_, RemoteResult<Vec<String>>> {
        Box::pin(async move {
            let mut state = self.lock()?;
            state.calls.list += 1;
            state.take_failure()?;
            Ok(state.shapes.clone())
        })
    }

    fn delete_one(&self, name: &str) -> BoxFuture<'_, RemoteResult<String>> {
        let name = name.to_string();
        Box::pin(async move {
            let mut state = self.lock()?;
            state.calls.delete_one += 1;
            state.take_failure()?;
            let before = state.shapes.len();
            state.shapes.retain(|s| *s != name);
            if state.shapes.len() == before {
                return Err(RemoteError::Server(format!("Custom shape \"{}\" not found", name)));
            }
            Ok(format!("Custom shape \"{}\" deleted successfully", name))
        })
    }

    fn delete_all(&self) -> BoxFuture<'_, RemoteResult<ClearReport>> {
        Box::pin(async move {
            let mut state = self.lock()?;
            state.calls.delete_all += 1;
            state.take_failure()?;
            let count = state.shapes.len();
            state.shapes.clear();
            Ok(ClearReport {
                message: format!("Cleared {} custom shapes", count),
                count,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ExportMetadata;
    use crate::test_util::block_on;

    fn request(words: &[&str], shape: &str) -> PreviewRequest {
        PreviewRequest {
            seq: 1,
            words: words.iter().map(|w| w.to_string()).collect(),
            shape: ShapeId::parse(shape),
            directions: DirectionFlags::default(),
        }
    }

    #[test]
    fn test_create_list_delete() {
        let backend = MemoryBackend::new();
        let message = block_on(backend.create("blob", &ShapePayload::Drawing("data:x".to_string()))).unwrap();
        assert_eq!(message, "Drawing saved as custom shape!");
        assert_eq!(block_on(backend.list()).unwrap(), vec!["blob"]);

        let message = block_on(backend.delete_one("blob")).unwrap();
        assert_eq!(message, "Custom shape \"blob\" deleted successfully");
        assert!(block_on(backend.list()).unwrap().is_empty());
        assert_eq!(backend.calls().create, 1);
        assert_eq!(backend.calls().list, 2);
    }

    #[test]
    fn test_delete_missing_reports_server_message() {
        let backend = MemoryBackend::new();
        let result = block_on(backend.delete_one("ghost"));
        assert_eq!(result, Err(RemoteError::Server("Custom shape \"ghost\" not found".to_string())));
    }

    #[test]
    fn test_delete_all_counts() {
        let backend = MemoryBackend::new();
        backend.insert_shape("a");
        backend.insert_shape("b");
        let report = block_on(backend.delete_all()).unwrap();
        assert_eq!(report.count, 2);
        assert_eq!(report.message, "Cleared 2 custom shapes");
        assert!(backend.shape_names().is_empty());
    }

    #[test]
    fn test_fail_next_is_consumed_once() {
        let backend = MemoryBackend::new();
        backend.fail_next(RemoteError::Status(500));
        assert_eq!(block_on(backend.list()), Err(RemoteError::Status(500)));
        assert!(block_on(backend.list()).is_ok());
        assert_eq!(backend.calls().list, 2);
    }

    #[test]
    fn test_preview_layout() {
        let backend = MemoryBackend::new();
        let preview = block_on(backend.preview(&request(&["CAT", "ICE CREAM"], "square"))).unwrap();
        assert_eq!(preview.rows(), 8);
        assert_eq!(preview.grid[0][..3], [Some('C'), Some('A'), Some('T')]);
        assert_eq!(preview.grid[1][..3], [Some('I'), Some('C'), Some('E')]);
        assert_eq!(preview.placed_words, vec!["CAT", "ICE CREAM"]);
    }

    #[test]
    fn test_preview_vertical_and_diagonal_only() {
        let backend = MemoryBackend::new();
        let mut req = request(&["AB", "CD"], "square");
        req.directions = DirectionFlags { horizontal: false, vertical: true, diagonal: false };
        let preview = block_on(backend.preview(&req)).unwrap();
        assert_eq!(preview.grid[1][0], Some('B'));

        req.directions = DirectionFlags { horizontal: false, vertical: false, diagonal: true };
        let preview = block_on(backend.preview(&req)).unwrap();
        assert_eq!(preview.placed_words, vec!["AB"]);

        req.directions = DirectionFlags { horizontal: false, vertical: false, diagonal: false };
        let preview = block_on(backend.preview(&req)).unwrap();
        assert!(preview.placed_words.is_empty());
    }

    #[test]
    fn test_preview_unknown_custom_shape() {
        let backend = MemoryBackend::new();
        let result = block_on(backend.preview(&request(&["CAT"], "ghost")));
        assert_eq!(result, Err(RemoteError::Server("Unknown shape: ghost".to_string())));

        backend.insert_shape("ghost");
        assert!(block_on(backend.preview(&request(&["CAT"], "ghost"))).is_ok());
    }

    #[test]
    fn test_generate_names_file_after_title() {
        let backend = MemoryBackend::new();
        let request = GenerateRequest {
            words: vec!["CAT".to_string()],
            shape: ShapeId::default(),
            metadata: ExportMetadata {
                title: "Zoo Trip/2".to_string(),
                format: ExportFormat::Word,
                ..ExportMetadata::default()
            },
        };
        let document = block_on(backend.generate(&request)).unwrap();
        assert_eq!(
            document.content_disposition.as_deref(),
            Some("attachment; filename=Zoo_Trip_2.docx")
        );
        assert!(document.bytes.starts_with(b"PK"));
    }
}
