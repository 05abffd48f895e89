//! Remote collaborators: the puzzle generation engine and the custom shape store.

mod memory;

#[cfg(all(feature = "http", not(target_arch = "wasm32")))]
mod http;

pub use memory::{CallCounts, MemoryBackend};

#[cfg(all(feature = "http", not(target_arch = "wasm32")))]
pub use http::HttpBackend;

use crate::export::GenerateRequest;
use crate::preview::PreviewRequest;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Remote call errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("Network error: {0}")]
    Transport(String),
    #[error("Server returned HTTP {0}")]
    Status(u16),
    /// Failure reported by the server, surfaced verbatim.
    #[error("{0}")]
    Server(String),
    #[error("Invalid response: {0}")]
    Decode(String),
}

/// Result type for remote operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Generated preview grid and the words the engine managed to place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PuzzlePreview {
    /// Rows of cells; `None` marks a cell outside the shape.
    pub grid: Vec<Vec<Option<char>>>,
    /// Placed words, possibly fewer than requested.
    pub placed_words: Vec<String>,
}

impl PuzzlePreview {
    /// Build from the wire grid, where an empty string is an empty cell.
    pub fn from_wire(grid: Vec<Vec<String>>, placed_words: Vec<String>) -> Self {
        let grid = grid
            .into_iter()
            .map(|row| row.into_iter().map(|cell| cell.chars().next()).collect())
            .collect();
        Self { grid, placed_words }
    }

    pub fn rows(&self) -> usize {
        self.grid.len()
    }

    pub fn columns(&self) -> usize {
        self.grid.iter().map(Vec::len).max().unwrap_or(0)
    }
}

/// Finished document as returned by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDocument {
    pub bytes: Vec<u8>,
    /// Raw `Content-Disposition` header, if the server sent one.
    pub content_disposition: Option<String>,
}

/// Image source of a new custom shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapePayload {
    /// PNG data URI captured from the drawing surface.
    Drawing(String),
    /// Image file chosen by the user.
    Upload { file_name: String, bytes: Vec<u8> },
}

/// Result of clearing every custom shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearReport {
    pub message: String,
    pub count: usize,
}

/// Puzzle generation engine.
///
/// Note: On native platforms, implementations must be Send + Sync.
/// On WASM, these bounds are relaxed since it's single-threaded.
#[cfg(not(target_arch = "wasm32"))]
pub trait PuzzleEngine: Send + Sync {
    /// Lay out a preview grid.
    fn preview(&self, request: &PreviewRequest) -> BoxFuture<'_, RemoteResult<PuzzlePreview>>;

    /// Render the final document.
    fn generate(&self, request: &GenerateRequest) -> BoxFuture<'_, RemoteResult<GeneratedDocument>>;
}

/// Puzzle generation engine (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait PuzzleEngine {
    /// Lay out a preview grid.
    fn preview(&self, request: &PreviewRequest) -> BoxFuture<'_, RemoteResult<PuzzlePreview>>;

    /// Render the final document.
    fn generate(&self, request: &GenerateRequest) -> BoxFuture<'_, RemoteResult<GeneratedDocument>>;
}

/// Store of user-defined shapes.
///
/// Mutating calls return the server's success message.
#[cfg(not(target_arch = "wasm32"))]
pub trait ShapeStore: Send + Sync {
    /// Create (or replace) a custom shape.
    fn create(&self, name: &str, payload: &ShapePayload) -> BoxFuture<'_, RemoteResult<String>>;

    /// List custom shape names.
    fn list(&self) -> BoxFuture<'_, RemoteResult<Vec<String>>>;

    /// Delete one custom shape.
    fn delete_one(&self, name: &str) -> BoxFuture<'_, RemoteResult<String>>;

    /// Delete every custom shape.
    fn delete_all(&self) -> BoxFuture<'_, RemoteResult<ClearReport>>;
}

/// Store of user-defined shapes (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait ShapeStore {
    /// Create (or replace) a custom shape.
    fn create(&self, name: &str, payload: &ShapePayload) -> BoxFuture<'_, RemoteResult<String>>;

    /// List custom shape names.
    fn list(&self) -> BoxFuture<'_, RemoteResult<Vec<String>>>;

    /// Delete one custom shape.
    fn delete_one(&self, name: &str) -> BoxFuture<'_, RemoteResult<String>>;

    /// Delete every custom shape.
    fn delete_all(&self) -> BoxFuture<'_, RemoteResult<ClearReport>>;
}

/// Both remote collaborators behind one handle.
pub trait Backend: PuzzleEngine + ShapeStore {}

impl<T: PuzzleEngine + ShapeStore + ?Sized> Backend for T {}
