//! Word Search Core Library
//!
//! Platform-agnostic state controller for the word search puzzle builder:
//! word list management, shape selection, custom shape drawing, and the
//! preview/export flows against a remote generation service.

pub mod config;
pub mod drawing;
pub mod export;
pub mod input;
pub mod preview;
pub mod remote;
pub mod shapes;
pub mod words;
pub mod workspace;

#[cfg(test)]
mod test_util;

pub use config::{ClientConfig, ConfigError};
pub use drawing::{DrawingCapture, DrawingError};
pub use export::{ExportCoordinator, ExportError, ExportFormat, ExportMetadata, ExportedDocument, Theme};
pub use input::{InputState, PointerEvent, TouchEvent};
pub use preview::{Direction, DirectionFlags, PreviewOrchestrator, PreviewOutcome, PreviewRequest, PreviewState};
pub use remote::{Backend, MemoryBackend, PuzzleEngine, RemoteError, RemoteResult, ShapeStore};
pub use shapes::{BuiltinShape, ShapeId, ShapeRegistry};
pub use words::{WordCollection, WordError};
pub use workspace::{
    ConfirmationGate, Notice, NoticeLevel, ShapeJob, ShapeJobResult, Workspace, WorkspaceError, clear_all_prompt,
    delete_prompt,
};

#[cfg(all(feature = "http", not(target_arch = "wasm32")))]
pub use remote::HttpBackend;
