//! Session state controller.
//!
//! [`Workspace`] owns everything a puzzle-authoring session holds in memory
//! and is the only thing UI adapters talk to. Local mutations are
//! synchronous and return a [`Notice`]. Remote work comes in two forms:
//! `async` convenience methods, and `begin_*`/`finish_*` pairs that let a
//! shell await the backend without keeping the workspace borrowed.

use crate::config::ClientConfig;
use crate::drawing::{DrawingCapture, DrawingError};
use crate::export::{ExportCoordinator, ExportError, ExportMetadata, ExportedDocument, GenerateRequest};
use crate::preview::{Direction, DirectionFlags, PreviewOrchestrator, PreviewOutcome, PreviewRequest};
use crate::remote::{Backend, GeneratedDocument, PuzzlePreview, RemoteError, RemoteResult, ShapePayload, ShapeStore};
use crate::shapes::{ShapeId, ShapeRegistry};
use crate::words::{PastePreview, WordCollection, WordError, preview_paste};
use std::sync::Arc;
use thiserror::Error;

/// Severity of a user-visible outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// User-visible outcome of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, message: message.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Warning, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }

    pub fn is_success(&self) -> bool {
        self.level == NoticeLevel::Success
    }
}

/// Workspace errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkspaceError {
    #[error(transparent)]
    Words(#[from] WordError),
    #[error(transparent)]
    Drawing(#[from] DrawingError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("{0}")]
    Validation(String),
    #[error("Another shape operation is in progress")]
    Busy,
    #[error("Cancelled")]
    Cancelled,
    #[error("{context}: {source}")]
    Remote {
        context: &'static str,
        #[source]
        source: RemoteError,
    },
}

impl WorkspaceError {
    /// Remote failures are errors; everything else is a warning.
    pub fn level(&self) -> NoticeLevel {
        match self {
            WorkspaceError::Remote { .. } | WorkspaceError::Export(ExportError::Remote(_)) => NoticeLevel::Error,
            _ => NoticeLevel::Warning,
        }
    }

    pub fn notice(&self) -> Notice {
        Notice { level: self.level(), message: self.to_string() }
    }
}

impl From<WorkspaceError> for Notice {
    fn from(err: WorkspaceError) -> Self {
        err.notice()
    }
}

/// Blocking yes/no prompt shown before destructive operations.
pub trait ConfirmationGate {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> ConfirmationGate for F {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// A mutating custom shape operation, validated and ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeJob {
    Create { name: String, payload: ShapePayload },
    DeleteOne { name: String },
    DeleteAll { count: usize },
}

/// Store responses for a [`ShapeJob`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeJobResult {
    /// The operation's own result (the server's message on success).
    pub outcome: RemoteResult<String>,
    /// Listing fetched after the operation, whatever its outcome.
    pub listing: RemoteResult<Vec<String>>,
}

impl ShapeJob {
    fn context(&self) -> &'static str {
        match self {
            ShapeJob::Create { payload: ShapePayload::Drawing(_), .. } => "Error saving drawing",
            ShapeJob::Create { payload: ShapePayload::Upload { .. }, .. } => "Error uploading shape",
            ShapeJob::DeleteOne { .. } => "Error deleting shape",
            ShapeJob::DeleteAll { .. } => "Error clearing custom shapes",
        }
    }

    /// Send the operation, then re-fetch the listing.
    ///
    /// The listing is fetched even when the operation fails, since a failed
    /// delete may still mean the store no longer has the shape.
    pub async fn run<S: ShapeStore + ?Sized>(&self, store: &S) -> ShapeJobResult {
        let outcome = match self {
            ShapeJob::Create { name, payload } => store.create(name, payload).await,
            ShapeJob::DeleteOne { name } => store.delete_one(name).await,
            ShapeJob::DeleteAll { .. } => store.delete_all().await.map(|report| report.message),
        };
        let listing = store.list().await;
        ShapeJobResult { outcome, listing }
    }
}

/// Confirmation prompt for deleting one custom shape.
pub fn delete_prompt(name: &str) -> String {
    format!("Are you sure you want to delete the custom shape \"{}\"?", name)
}

/// Confirmation prompt for deleting every custom shape.
pub fn clear_all_prompt(count: usize) -> String {
    format!(
        "Are you sure you want to delete all {} custom shapes? This action cannot be undone.",
        count
    )
}

fn required_name(name: &str) -> Result<String, WorkspaceError> {
    let name = name.trim();
    if name.is_empty() {
        log::warn!("Shape name missing");
        return Err(WorkspaceError::Validation("Shape name is required".to_string()));
    }
    Ok(name.to_string())
}

/// All state of one authoring session.
pub struct Workspace<B: Backend + ?Sized> {
    backend: Arc<B>,
    words: WordCollection,
    shapes: ShapeRegistry,
    directions: DirectionFlags,
    drawing: DrawingCapture,
    preview: PreviewOrchestrator,
    export: ExportCoordinator,
    shape_busy: bool,
}

impl<B: Backend + ?Sized> Workspace<B> {
    /// Create an empty workspace over `backend`.
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            words: WordCollection::new(),
            shapes: ShapeRegistry::new(),
            directions: DirectionFlags::default(),
            drawing: DrawingCapture::default(),
            preview: PreviewOrchestrator::new(),
            export: ExportCoordinator::new(),
            shape_busy: false,
        }
    }

    /// Create a workspace with the drawing surface sized from `config`.
    pub fn with_config(backend: Arc<B>, config: &ClientConfig) -> Self {
        let mut workspace = Self::new(backend);
        workspace.drawing = DrawingCapture::new(config.canvas_width, config.canvas_height);
        workspace.drawing.set_brush_width(config.brush_width);
        workspace
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    pub fn words(&self) -> &WordCollection {
        &self.words
    }

    pub fn shapes(&self) -> &ShapeRegistry {
        &self.shapes
    }

    pub fn selected_shape(&self) -> &ShapeId {
        self.shapes.selected()
    }

    pub fn directions(&self) -> DirectionFlags {
        self.directions
    }

    pub fn drawing(&self) -> &DrawingCapture {
        &self.drawing
    }

    /// Drawing surface, for pointer input and brush settings.
    pub fn drawing_mut(&mut self) -> &mut DrawingCapture {
        &mut self.drawing
    }

    pub fn preview(&self) -> &PreviewOrchestrator {
        &self.preview
    }

    pub fn is_exporting(&self) -> bool {
        self.export.is_busy()
    }

    pub fn is_shape_busy(&self) -> bool {
        self.shape_busy
    }

    fn invalidate_preview(&mut self) -> Option<u64> {
        self.preview.invalidate(&self.words, self.shapes.selected(), self.directions)
    }

    // --- Words ---

    /// Add one manually entered word.
    pub fn add_word(&mut self, raw: &str) -> Notice {
        match self.words.add(raw) {
            Ok(word) => {
                self.invalidate_preview();
                Notice::success(format!("\"{}\" added to word list", word))
            }
            Err(e) => {
                log::warn!("Word rejected: {}", e);
                WorkspaceError::from(e).into()
            }
        }
    }

    /// Add every valid word of pasted text.
    pub fn bulk_add(&mut self, text: &str) -> Notice {
        match self.words.bulk_add(text) {
            Ok(report) if report.changed() => {
                self.invalidate_preview();
                Notice::success(report.message())
            }
            Ok(report) => Notice::warning(report.message()),
            Err(e) => {
                log::warn!("Paste rejected: {}", e);
                WorkspaceError::from(e).into()
            }
        }
    }

    /// Live preview of what a paste would add.
    pub fn preview_paste(&self, text: &str) -> PastePreview {
        preview_paste(text)
    }

    /// Import words from an uploaded file.
    pub fn import_file(&mut self, file_name: &str, bytes: &[u8]) -> Notice {
        match self.words.import_from_file(file_name, bytes) {
            Ok(report) if report.changed() => {
                self.invalidate_preview();
                Notice::success(format!("{} loaded from {}", report.message(), file_name))
            }
            Ok(report) => Notice::warning(report.message()),
            Err(e) => {
                log::warn!("Import of {} rejected: {}", file_name, e);
                WorkspaceError::from(e).into()
            }
        }
    }

    pub fn remove_word(&mut self, word: &str) -> Notice {
        if self.words.remove(word) {
            self.invalidate_preview();
            Notice::success(format!("\"{}\" removed from word list", word.trim().to_uppercase()))
        } else {
            Notice::warning(format!("\"{}\" is not in the word list", word.trim().to_uppercase()))
        }
    }

    pub fn randomize_words(&mut self) -> Notice {
        match self.words.randomize() {
            Ok(()) => {
                if self.words.len() > 1 {
                    self.invalidate_preview();
                }
                Notice::success("Words randomized!")
            }
            Err(e) => WorkspaceError::from(e).into(),
        }
    }

    pub fn clear_words(&mut self) -> Notice {
        if self.words.clear() {
            self.invalidate_preview();
            Notice::success("Word list cleared")
        } else {
            Notice::warning("Word list is already empty")
        }
    }

    pub fn load_samples(&mut self) -> Notice {
        self.words.load_samples();
        self.invalidate_preview();
        Notice::success(format!("Loaded {}", self.words.count_label()))
    }

    // --- Shapes and directions ---

    /// Select a shape by wire name and refresh the preview.
    pub fn select_shape(&mut self, id: ShapeId) -> Notice {
        let message = format!("Shape: {}", id);
        self.shapes.select(id);
        self.invalidate_preview();
        Notice::success(message)
    }

    /// Select a custom shape from the cached listing.
    pub fn use_custom_shape(&mut self, name: &str) -> Notice {
        if !self.shapes.has_custom(name) {
            return Notice::warning(format!("Unknown custom shape: {}", name));
        }
        self.shapes.select(ShapeId::Custom(name.to_string()));
        self.invalidate_preview();
        Notice::success(format!("Using custom shape: {}", name))
    }

    pub fn set_direction(&mut self, direction: Direction, enabled: bool) -> Notice {
        let state = if enabled { "enabled" } else { "disabled" };
        if self.directions.set(direction, enabled) {
            self.invalidate_preview();
            Notice::success(format!("{} placement {}", direction, state))
        } else {
            Notice::warning(format!("{} placement already {}", direction, state))
        }
    }

    // --- Preview ---

    /// Queue a preview of the current state.
    pub fn refresh_preview(&mut self) -> Option<u64> {
        self.invalidate_preview()
    }

    /// Drain every queued preview request.
    pub fn take_preview_requests(&mut self) -> Vec<PreviewRequest> {
        self.preview.take_requests()
    }

    /// Drain the queue, keeping only the newest request.
    pub fn take_latest_preview_request(&mut self) -> Option<PreviewRequest> {
        self.preview.take_requests().pop()
    }

    pub fn is_latest_preview(&self, seq: u64) -> bool {
        self.preview.is_latest(seq)
    }

    pub fn apply_preview(&mut self, seq: u64, result: RemoteResult<PuzzlePreview>) -> PreviewOutcome {
        self.preview.apply(seq, result)
    }

    /// Dispatch queued previews one after another and apply the responses.
    pub async fn run_previews(&mut self) -> Vec<PreviewOutcome> {
        let backend = Arc::clone(&self.backend);
        self.preview.run_pending(&*backend).await
    }

    // --- Custom shapes ---

    fn claim_shape_gate(&mut self) -> Result<(), WorkspaceError> {
        if self.shape_busy {
            log::warn!("Shape operation rejected: another is in progress");
            return Err(WorkspaceError::Busy);
        }
        self.shape_busy = true;
        Ok(())
    }

    /// Validate the drawing and claim the shape gate.
    pub fn begin_save_drawing(&mut self, name: &str) -> Result<ShapeJob, WorkspaceError> {
        if self.shape_busy {
            return Err(WorkspaceError::Busy);
        }
        let data_uri = self.drawing.encode_for_submission().inspect_err(|e| log::warn!("Drawing rejected: {}", e))?;
        let name = required_name(name)?;
        self.claim_shape_gate()?;
        Ok(ShapeJob::Create { name, payload: ShapePayload::Drawing(data_uri) })
    }

    /// Validate an image upload and claim the shape gate.
    pub fn begin_upload_shape(&mut self, name: &str, file_name: &str, bytes: Vec<u8>) -> Result<ShapeJob, WorkspaceError> {
        if self.shape_busy {
            return Err(WorkspaceError::Busy);
        }
        if file_name.trim().is_empty() || bytes.is_empty() {
            return Err(WorkspaceError::Validation("No file selected".to_string()));
        }
        let name = required_name(name)?;
        self.claim_shape_gate()?;
        Ok(ShapeJob::Create {
            name,
            payload: ShapePayload::Upload { file_name: file_name.to_string(), bytes },
        })
    }

    /// Confirm and claim the shape gate for deleting one shape.
    pub fn begin_delete_shape(&mut self, name: &str, gate: &mut dyn ConfirmationGate) -> Result<ShapeJob, WorkspaceError> {
        if self.shape_busy {
            return Err(WorkspaceError::Busy);
        }
        if !gate.confirm(&delete_prompt(name)) {
            log::debug!("Deletion of '{}' declined", name);
            return Err(WorkspaceError::Cancelled);
        }
        self.claim_shape_gate()?;
        Ok(ShapeJob::DeleteOne { name: name.to_string() })
    }

    /// Confirm and claim the shape gate for deleting every custom shape.
    ///
    /// Rejected before prompting when the cached listing is empty.
    pub fn begin_clear_shapes(&mut self, gate: &mut dyn ConfirmationGate) -> Result<ShapeJob, WorkspaceError> {
        if self.shape_busy {
            return Err(WorkspaceError::Busy);
        }
        let count = self.shapes.custom_names().len();
        if count == 0 {
            log::warn!("Clear rejected: no custom shapes");
            return Err(WorkspaceError::Validation("No custom shapes to clear".to_string()));
        }
        if !gate.confirm(&clear_all_prompt(count)) {
            return Err(WorkspaceError::Cancelled);
        }
        self.claim_shape_gate()?;
        Ok(ShapeJob::DeleteAll { count })
    }

    /// Apply the store's responses and release the shape gate.
    ///
    /// A successful operation is mirrored in the cache first, so a failed
    /// refresh cannot leave deleted names behind. A fetched listing then
    /// replaces the cache. A failed refresh after a successful operation
    /// turns the result into a warning.
    pub fn finish_shape_job(&mut self, job: &ShapeJob, result: ShapeJobResult) -> Result<Notice, WorkspaceError> {
        self.shape_busy = false;
        let ShapeJobResult { outcome, listing } = result;

        let mut reselected = false;
        if outcome.is_ok() {
            reselected = match job {
                ShapeJob::Create { name, payload } => {
                    log::info!("Custom shape '{}' created", name);
                    if matches!(payload, ShapePayload::Drawing(_)) {
                        self.drawing.clear();
                    }
                    self.shapes.add_custom(name);
                    self.shapes.select(ShapeId::Custom(name.clone()));
                    true
                }
                ShapeJob::DeleteOne { name } => {
                    log::info!("Custom shape '{}' deleted", name);
                    self.shapes.remove_custom(name);
                    self.shapes.fall_back_if_selected(name)
                }
                ShapeJob::DeleteAll { count } => {
                    log::info!("Cleared {} custom shapes", count);
                    self.shapes.set_custom_names(Vec::new());
                    self.shapes.fall_back_if_custom()
                }
            };
        }

        let refresh_error = match listing {
            Ok(names) => {
                self.shapes.set_custom_names(names);
                reselected |= self.shapes.fall_back_if_unlisted();
                None
            }
            Err(e) => {
                log::warn!("Failed to refresh custom shapes, keeping cached listing: {}", e);
                Some(e)
            }
        };
        if reselected {
            self.invalidate_preview();
        }

        match (outcome, refresh_error) {
            (Err(source), _) => {
                log::error!("{}: {}", job.context(), source);
                Err(WorkspaceError::Remote { context: job.context(), source })
            }
            (Ok(message), None) => Ok(Notice::success(message)),
            (Ok(message), Some(e)) => Ok(Notice::warning(format!(
                "{} (Error loading custom shapes: {})",
                message, e
            ))),
        }
    }

    async fn run_shape_job(&mut self, job: ShapeJob) -> Result<Notice, WorkspaceError> {
        let backend = Arc::clone(&self.backend);
        let result = job.run(&*backend).await;
        self.finish_shape_job(&job, result)
    }

    /// Replace the cached listing with a fetched one; failures keep the cache.
    pub fn apply_custom_listing(&mut self, result: RemoteResult<Vec<String>>) -> Result<Notice, WorkspaceError> {
        match result {
            Ok(names) => {
                let notice = Notice::success(format!("{} custom shapes", names.len()));
                self.shapes.set_custom_names(names);
                Ok(notice)
            }
            Err(source) => {
                log::warn!("Failed to refresh custom shapes, keeping cached listing: {}", source);
                Err(WorkspaceError::Remote { context: "Error loading custom shapes", source })
            }
        }
    }

    /// Re-fetch the custom shape listing.
    pub async fn refresh_custom_shapes(&mut self) -> Result<Notice, WorkspaceError> {
        let backend = Arc::clone(&self.backend);
        match self.shapes.refresh_custom_list(&*backend).await {
            Ok(names) => Ok(Notice::success(format!("{} custom shapes", names.len()))),
            Err(source) => Err(WorkspaceError::Remote { context: "Error loading custom shapes", source }),
        }
    }

    /// Save the current drawing as a custom shape.
    pub async fn save_drawing(&mut self, name: &str) -> Result<Notice, WorkspaceError> {
        let job = self.begin_save_drawing(name)?;
        self.run_shape_job(job).await
    }

    /// Upload an image file as a custom shape.
    pub async fn upload_shape(&mut self, name: &str, file_name: &str, bytes: Vec<u8>) -> Result<Notice, WorkspaceError> {
        let job = self.begin_upload_shape(name, file_name, bytes)?;
        self.run_shape_job(job).await
    }

    /// Delete one custom shape after confirmation.
    pub async fn delete_custom_shape(&mut self, name: &str, gate: &mut dyn ConfirmationGate) -> Result<Notice, WorkspaceError> {
        let job = self.begin_delete_shape(name, gate)?;
        self.run_shape_job(job).await
    }

    /// Delete every custom shape after confirmation.
    pub async fn clear_custom_shapes(&mut self, gate: &mut dyn ConfirmationGate) -> Result<Notice, WorkspaceError> {
        let job = self.begin_clear_shapes(gate)?;
        self.run_shape_job(job).await
    }

    // --- Export ---

    /// Validate and claim the export gate. Direction flags come from the workspace.
    pub fn begin_export(&mut self, mut metadata: ExportMetadata) -> Result<GenerateRequest, WorkspaceError> {
        metadata.directions = self.directions;
        Ok(self.export.begin(&self.words, self.shapes.selected(), metadata)?)
    }

    pub fn finish_export(&mut self, result: RemoteResult<GeneratedDocument>) -> Result<ExportedDocument, WorkspaceError> {
        Ok(self.export.finish(result)?)
    }

    /// Generate the final document.
    pub async fn generate(&mut self, metadata: ExportMetadata) -> Result<ExportedDocument, WorkspaceError> {
        let request = self.begin_export(metadata)?;
        let backend = Arc::clone(&self.backend);
        let result = backend.generate(&request).await;
        self.finish_export(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::{PreviewState, PreviewView};
    use crate::remote::{MemoryBackend, PuzzleEngine};
    use crate::test_util::block_on;
    use kurbo::Point;

    fn workspace() -> (Arc<MemoryBackend>, Workspace<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::new());
        let workspace = Workspace::new(Arc::clone(&backend));
        (backend, workspace)
    }

    fn yes() -> impl FnMut(&str) -> bool {
        |_: &str| true
    }

    fn scribble(workspace: &mut Workspace<MemoryBackend>) {
        let drawing = workspace.drawing_mut();
        drawing.begin_stroke(Point::new(10.0, 10.0));
        drawing.continue_stroke(Point::new(100.0, 100.0));
        drawing.end_stroke();
    }

    #[test]
    fn test_word_mutations_queue_previews() {
        let (_, mut ws) = workspace();
        assert!(ws.add_word("cat").is_success());
        assert_eq!(ws.add_word("CAT").level, NoticeLevel::Warning);
        assert!(ws.bulk_add("dog, fish").is_success());
        assert!(ws.remove_word("dog").is_success());

        let requests = ws.take_preview_requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[2].words, vec!["CAT", "FISH"]);
    }

    #[test]
    fn test_noop_mutations_do_not_queue() {
        let (_, mut ws) = workspace();
        ws.add_word("cat");
        ws.take_preview_requests();

        assert_eq!(ws.remove_word("dog").level, NoticeLevel::Warning);
        assert_eq!(ws.bulk_add("cat").level, NoticeLevel::Warning);
        assert_eq!(ws.set_direction(Direction::Horizontal, true).level, NoticeLevel::Warning);
        assert!(ws.take_preview_requests().is_empty());
    }

    #[test]
    fn test_empty_collection_shows_placeholder_without_call() {
        let (backend, mut ws) = workspace();
        ws.add_word("cat");
        ws.clear_words();
        assert_eq!(ws.preview().view(), &PreviewView::Empty);
        assert!(ws.take_latest_preview_request().is_none());
        block_on(ws.run_previews());
        assert_eq!(backend.calls().preview, 0);
    }

    #[test]
    fn test_stale_preview_does_not_change_display() {
        let (backend, mut ws) = workspace();
        ws.add_word("cat");
        ws.add_word("dog");
        let requests = ws.take_preview_requests();
        let (r1, r2) = (&requests[0], &requests[1]);

        let p1 = block_on(backend.preview(r1));
        let p2 = block_on(backend.preview(r2));
        assert_eq!(ws.apply_preview(r2.seq, p2), PreviewOutcome::Applied);
        let shown = ws.preview().view().clone();
        assert_eq!(ws.apply_preview(r1.seq, p1), PreviewOutcome::Stale);
        assert_eq!(ws.preview().view(), &shown);
        assert_eq!(ws.preview().placed_words(), &["CAT", "DOG"]);
    }

    #[test]
    fn test_preview_failure_sets_error() {
        let (backend, mut ws) = workspace();
        backend.fail_next(RemoteError::Transport("connection refused".to_string()));
        ws.add_word("cat");
        block_on(ws.run_previews());
        assert_eq!(ws.preview().state(), PreviewState::Error);

        ws.add_word("dog");
        block_on(ws.run_previews());
        assert_eq!(ws.preview().state(), PreviewState::Idle);
    }

    #[test]
    fn test_delete_selected_shape_falls_back_with_one_preview() {
        let (backend, mut ws) = workspace();
        backend.insert_shape("blob");
        block_on(ws.refresh_custom_shapes()).unwrap();
        ws.add_word("cat");
        assert!(ws.use_custom_shape("blob").is_success());
        ws.take_preview_requests();

        let notice = block_on(ws.delete_custom_shape("blob", &mut yes())).unwrap();
        assert_eq!(notice.message, "Custom shape \"blob\" deleted successfully");
        assert_eq!(ws.selected_shape(), &ShapeId::default());
        assert!(ws.shapes().custom_names().is_empty());

        let requests = ws.take_preview_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].shape, ShapeId::default());
        assert!(!ws.is_shape_busy());
    }

    #[test]
    fn test_delete_unselected_shape_keeps_selection() {
        let (backend, mut ws) = workspace();
        backend.insert_shape("a");
        backend.insert_shape("b");
        block_on(ws.refresh_custom_shapes()).unwrap();
        ws.add_word("cat");
        ws.use_custom_shape("a");
        ws.take_preview_requests();

        block_on(ws.delete_custom_shape("b", &mut yes())).unwrap();
        assert_eq!(ws.selected_shape().as_str(), "a");
        assert!(ws.take_preview_requests().is_empty());
        assert_eq!(ws.shapes().custom_names(), &["a"]);
    }

    #[test]
    fn test_delete_declined_makes_no_call() {
        let (backend, mut ws) = workspace();
        backend.insert_shape("blob");
        let mut prompts = Vec::new();
        let mut gate = |p: &str| {
            prompts.push(p.to_string());
            false
        };
        let result = block_on(ws.delete_custom_shape("blob", &mut gate));
        assert_eq!(result, Err(WorkspaceError::Cancelled));
        assert_eq!(prompts, vec!["Are you sure you want to delete the custom shape \"blob\"?"]);
        assert_eq!(backend.calls().delete_one, 0);
        assert!(!ws.is_shape_busy());
    }

    #[test]
    fn test_delete_missing_surfaces_server_message() {
        let (backend, mut ws) = workspace();
        let err = block_on(ws.delete_custom_shape("ghost", &mut yes())).unwrap_err();
        assert_eq!(err.level(), NoticeLevel::Error);
        assert_eq!(err.to_string(), "Error deleting shape: Custom shape \"ghost\" not found");
        assert_eq!(backend.calls().list, 1);
        assert!(!ws.is_shape_busy());
    }

    #[test]
    fn test_clear_all_with_empty_cache_rejected() {
        let (backend, mut ws) = workspace();
        backend.insert_shape("on_server_only");
        let mut asked = false;
        let mut gate = |_: &str| {
            asked = true;
            true
        };
        let err = block_on(ws.clear_custom_shapes(&mut gate)).unwrap_err();
        assert_eq!(err, WorkspaceError::Validation("No custom shapes to clear".to_string()));
        assert!(!asked);
        assert_eq!(backend.calls().total(), 0);
    }

    #[test]
    fn test_clear_all_names_count_and_falls_back() {
        let (backend, mut ws) = workspace();
        backend.insert_shape("a");
        backend.insert_shape("b");
        block_on(ws.refresh_custom_shapes()).unwrap();
        ws.add_word("cat");
        ws.use_custom_shape("b");
        ws.take_preview_requests();

        let mut prompt = String::new();
        let mut gate = |p: &str| {
            prompt = p.to_string();
            true
        };
        let notice = block_on(ws.clear_custom_shapes(&mut gate)).unwrap();
        assert_eq!(
            prompt,
            "Are you sure you want to delete all 2 custom shapes? This action cannot be undone."
        );
        assert_eq!(notice.message, "Cleared 2 custom shapes");
        assert!(ws.selected_shape().is_built_in());
        assert_eq!(ws.take_preview_requests().len(), 1);
        assert!(backend.shape_names().is_empty());
    }

    #[test]
    fn test_busy_gate_rejects_overlapping_shape_ops() {
        let (backend, mut ws) = workspace();
        backend.insert_shape("a");
        let job = ws.begin_delete_shape("a", &mut yes()).unwrap();
        assert!(ws.is_shape_busy());
        assert_eq!(ws.begin_delete_shape("a", &mut yes()), Err(WorkspaceError::Busy));

        let result = block_on(job.run(&*backend));
        ws.finish_shape_job(&job, result).unwrap();
        assert!(!ws.is_shape_busy());
        assert_eq!(backend.calls().delete_one, 1);
    }

    #[test]
    fn test_blank_drawing_rejected_client_side() {
        let (backend, mut ws) = workspace();
        let err = block_on(ws.save_drawing("shape")).unwrap_err();
        assert_eq!(err, WorkspaceError::Drawing(DrawingError::Blank));
        assert_eq!(err.notice().message, "Please draw something first!");
        assert_eq!(backend.calls().create, 0);
    }

    #[test]
    fn test_shape_name_required() {
        let (backend, mut ws) = workspace();
        scribble(&mut ws);
        let err = block_on(ws.save_drawing("   ")).unwrap_err();
        assert_eq!(err.to_string(), "Shape name is required");
        assert_eq!(backend.calls().create, 0);
        assert!(!ws.is_shape_busy());
    }

    #[test]
    fn test_save_drawing_refreshes_and_selects() {
        let (backend, mut ws) = workspace();
        scribble(&mut ws);
        let notice = block_on(ws.save_drawing(" zigzag ")).unwrap();
        assert_eq!(notice.message, "Drawing saved as custom shape!");
        assert_eq!(ws.shapes().custom_names(), &["zigzag"]);
        assert_eq!(ws.selected_shape(), &ShapeId::Custom("zigzag".to_string()));
        assert!(ws.drawing().is_blank());
        assert_eq!(backend.calls().list, 1);
    }

    #[test]
    fn test_upload_shape() {
        let (backend, mut ws) = workspace();
        let notice = block_on(ws.upload_shape("logo", "logo.png", vec![0x89, b'P', b'N', b'G'])).unwrap();
        assert_eq!(notice.message, "Image uploaded and processed as custom shape!");
        assert_eq!(backend.shape_names(), vec!["logo"]);

        let err = block_on(ws.upload_shape("logo", "", Vec::new())).unwrap_err();
        assert_eq!(err.to_string(), "No file selected");
    }

    #[test]
    fn test_failed_refresh_after_clear_is_reported() {
        let (backend, mut ws) = workspace();
        backend.insert_shape("a");
        backend.insert_shape("b");
        block_on(ws.refresh_custom_shapes()).unwrap();
        ws.add_word("cat");
        ws.use_custom_shape("a");
        ws.take_preview_requests();

        let job = ws.begin_clear_shapes(&mut yes()).unwrap();
        let outcome = block_on(backend.delete_all()).map(|report| report.message);
        let result = ShapeJobResult { outcome, listing: Err(RemoteError::Status(503)) };
        let notice = ws.finish_shape_job(&job, result).unwrap();

        assert_eq!(notice.level, NoticeLevel::Warning);
        assert_eq!(
            notice.message,
            "Cleared 2 custom shapes (Error loading custom shapes: Server returned HTTP 503)"
        );
        assert!(ws.shapes().custom_names().is_empty());
        assert!(ws.selected_shape().is_built_in());
        assert_eq!(ws.take_preview_requests().len(), 1);
        assert_eq!(
            ws.begin_clear_shapes(&mut yes()),
            Err(WorkspaceError::Validation("No custom shapes to clear".to_string()))
        );
    }

    #[test]
    fn test_failed_refresh_after_create_keeps_new_name() {
        let (_, mut ws) = workspace();
        ws.shapes.set_custom_names(vec!["old".to_string()]);
        let job = ws.begin_upload_shape("new", "new.png", vec![1]).unwrap();
        let result = ShapeJobResult {
            outcome: Ok("Image uploaded and processed as custom shape!".to_string()),
            listing: Err(RemoteError::Status(503)),
        };
        let notice = ws.finish_shape_job(&job, result).unwrap();
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert_eq!(ws.shapes().custom_names(), &["old", "new"]);
        assert_eq!(ws.selected_shape().as_str(), "new");
    }

    #[test]
    fn test_failed_delete_resyncs_listing() {
        let (backend, mut ws) = workspace();
        backend.insert_shape("ghost");
        block_on(ws.refresh_custom_shapes()).unwrap();
        ws.add_word("cat");
        ws.use_custom_shape("ghost");
        ws.take_preview_requests();
        block_on(backend.delete_one("ghost")).unwrap();

        let err = block_on(ws.delete_custom_shape("ghost", &mut yes())).unwrap_err();
        assert_eq!(err.to_string(), "Error deleting shape: Custom shape \"ghost\" not found");
        assert!(ws.shapes().custom_names().is_empty());
        assert_eq!(ws.selected_shape(), &ShapeId::default());
        assert_eq!(ws.take_preview_requests().len(), 1);
        assert_eq!(backend.calls().list, 2);
        assert!(!ws.is_shape_busy());
    }

    #[test]
    fn test_generate_rejected_when_empty() {
        let (backend, mut ws) = workspace();
        let err = block_on(ws.generate(ExportMetadata::default())).unwrap_err();
        assert_eq!(err, WorkspaceError::Export(ExportError::NoWords));
        assert_eq!(err.level(), NoticeLevel::Warning);
        assert_eq!(backend.calls().generate, 0);
    }

    #[test]
    fn test_generate_uses_workspace_state() {
        let (_, mut ws) = workspace();
        ws.load_samples();
        ws.set_direction(Direction::Diagonal, false);
        let request = ws.begin_export(ExportMetadata::default()).unwrap();
        assert_eq!(request.words.len(), 6);
        assert!(!request.metadata.directions.diagonal);
        assert!(ws.is_exporting());
        assert!(matches!(ws.begin_export(ExportMetadata::default()), Err(WorkspaceError::Export(ExportError::Busy))));

        let err = ws.finish_export(Err(RemoteError::Server("boom".to_string()))).unwrap_err();
        assert_eq!(err.level(), NoticeLevel::Error);
        assert!(!ws.is_exporting());
    }

    #[test]
    fn test_generate_document() {
        let (_, mut ws) = workspace();
        ws.add_word("cat");
        let document = block_on(ws.generate(ExportMetadata::default())).unwrap();
        assert_eq!(document.file_name, "Word_Search_Puzzle.pdf");
    }

    #[test]
    fn test_apply_custom_listing() {
        let (_, mut ws) = workspace();
        ws.apply_custom_listing(Ok(vec!["a".to_string()])).unwrap();
        let err = ws.apply_custom_listing(Err(RemoteError::Transport("down".to_string()))).unwrap_err();
        assert_eq!(err.to_string(), "Error loading custom shapes: Network error: down");
        assert_eq!(ws.shapes().custom_names(), &["a"]);
    }

    #[test]
    fn test_use_unknown_custom_shape() {
        let (_, mut ws) = workspace();
        assert_eq!(ws.use_custom_shape("ghost").level, NoticeLevel::Warning);
        assert!(ws.selected_shape().is_built_in());
    }

    #[test]
    fn test_with_config() {
        let backend = Arc::new(MemoryBackend::new());
        let config = ClientConfig { canvas_width: 64, canvas_height: 32, brush_width: 12.0, ..ClientConfig::default() };
        let ws = Workspace::with_config(backend, &config);
        assert_eq!((ws.drawing().width(), ws.drawing().height()), (64, 32));
        assert_eq!(ws.drawing().brush_width(), 12.0);
    }
}
