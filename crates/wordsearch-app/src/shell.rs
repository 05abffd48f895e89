//! Line-oriented shell driving a [`Workspace`].
//!
//! Runs on a single-threaded runtime inside a `LocalSet`. Preview requests
//! are spawned as local tasks and may complete in any order; the workspace
//! is shared through `Rc<RefCell<_>>` and never borrowed across an await.

use crate::commands::{Command, DrawAction, Line, parse_line};
use clap::CommandFactory;
use kurbo::Point;
use std::cell::RefCell;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use wordsearch_core::drawing::parse_hex_color;
use wordsearch_core::{
    Backend, BuiltinShape, ClientConfig, ConfigError, ExportMetadata, ExportedDocument, MemoryBackend, Notice,
    NoticeLevel, PointerEvent, PreviewOutcome, PreviewState, RemoteError, ShapeId, ShapeJob, Workspace,
    WorkspaceError, clear_all_prompt, delete_prompt,
};

/// Shell errors.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SharedWorkspace = Rc<RefCell<Workspace<dyn Backend>>>;

/// Pick the backend: in-memory when offline, the HTTP service otherwise.
pub fn connect(offline: bool, config: &ClientConfig) -> Result<Arc<dyn Backend>, ShellError> {
    if offline {
        log::info!("Offline mode: using in-memory backend");
        return Ok(Arc::new(MemoryBackend::new()));
    }
    connect_service(config)
}

#[cfg(feature = "http")]
fn connect_service(config: &ClientConfig) -> Result<Arc<dyn Backend>, ShellError> {
    let backend = wordsearch_core::HttpBackend::new(&config.server_url, config.request_timeout())?;
    log::info!("Using generation service at {}", backend.base_url());
    Ok(Arc::new(backend))
}

#[cfg(not(feature = "http"))]
fn connect_service(config: &ClientConfig) -> Result<Arc<dyn Backend>, ShellError> {
    log::warn!("Built without HTTP support, using in-memory backend instead of {}", config.server_url);
    Ok(Arc::new(MemoryBackend::new()))
}

/// Render a notice for the terminal.
pub fn format_notice(notice: &Notice) -> String {
    let tag = match notice.level {
        NoticeLevel::Success => "ok",
        NoticeLevel::Warning => "warning",
        NoticeLevel::Error => "error",
    };
    format!("[{}] {}", tag, notice.message)
}

fn print_notice(notice: &Notice) {
    match notice.level {
        NoticeLevel::Error => eprintln!("{}", format_notice(notice)),
        _ => println!("{}", format_notice(notice)),
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Write an exported document into `dir`.
pub async fn save_document(dir: &Path, document: &ExportedDocument) -> std::io::Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(&document.file_name);
    tokio::fs::write(&path, &document.bytes).await?;
    Ok(path)
}

/// Interactive shell over stdin lines.
pub struct Shell {
    workspace: SharedWorkspace,
    backend: Arc<dyn Backend>,
    config: ClientConfig,
    input: mpsc::Receiver<String>,
}

impl Shell {
    pub fn new(backend: Arc<dyn Backend>, config: ClientConfig, input: mpsc::Receiver<String>) -> Self {
        let workspace = Workspace::with_config(Arc::clone(&backend), &config);
        Self {
            workspace: Rc::new(RefCell::new(workspace)),
            backend,
            config,
            input,
        }
    }

    /// Forward stdin lines from a dedicated thread.
    pub fn spawn_stdin_reader() -> mpsc::Receiver<String> {
        let (tx, rx) = mpsc::channel(16);
        std::thread::spawn(move || {
            for line in std::io::stdin().lines() {
                let Ok(line) = line else { break };
                if tx.blocking_send(line).is_err() {
                    break;
                }
            }
        });
        rx
    }

    pub fn workspace(&self) -> &SharedWorkspace {
        &self.workspace
    }

    /// Run until `quit` or end of input.
    pub async fn run(mut self) -> Result<(), ShellError> {
        println!("Word search builder. Type 'help' for commands.");
        self.refresh_shapes().await;

        loop {
            print!("> ");
            std::io::stdout().flush()?;
            let Some(line) = self.input.recv().await else {
                break;
            };
            match parse_line(&line) {
                Ok(None) => continue,
                Ok(Some(Command::Quit)) => break,
                Ok(Some(command)) => self.execute(command).await?,
                Err(message) => eprintln!("{}", message.trim_end()),
            }
            self.schedule_preview();
        }
        log::info!("Shell closed");
        Ok(())
    }

    async fn confirm(&mut self, prompt: &str) -> bool {
        print!("{} [y/N] ", prompt);
        if std::io::stdout().flush().is_err() {
            return false;
        }
        match self.input.recv().await {
            Some(answer) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            None => false,
        }
    }

    /// Send the newest queued preview after the debounce delay.
    fn schedule_preview(&self) {
        let Some(request) = self.workspace.borrow_mut().take_latest_preview_request() else {
            return;
        };
        let workspace = Rc::clone(&self.workspace);
        let backend = Arc::clone(&self.backend);
        let debounce = self.config.preview_debounce();

        tokio::task::spawn_local(async move {
            tokio::time::sleep(debounce).await;
            if !workspace.borrow().is_latest_preview(request.seq) {
                log::debug!("Preview #{} superseded before dispatch", request.seq);
                return;
            }
            let result = backend.preview(&request).await;
            let mut ws = workspace.borrow_mut();
            if ws.apply_preview(request.seq, result) == PreviewOutcome::Applied {
                println!();
                print!("{}", ws.preview().render_grid());
                if ws.preview().state() == PreviewState::Error {
                    print_notice(&Notice::error("Error generating preview"));
                }
            }
        });
    }

    async fn refresh_shapes(&self) {
        let result = self.backend.list().await;
        match self.workspace.borrow_mut().apply_custom_listing(result) {
            Ok(notice) => log::info!("{}", notice.message),
            Err(e) => print_notice(&e.notice()),
        }
    }

    async fn run_shape_job(&self, begun: Result<ShapeJob, WorkspaceError>) {
        let job = match begun {
            Ok(job) => job,
            Err(e) => return print_notice(&e.notice()),
        };
        let result = job.run(&*self.backend).await;
        let finished = self.workspace.borrow_mut().finish_shape_job(&job, result);
        print_notice(&finished.unwrap_or_else(|e| e.notice()));
    }

    async fn read_paste(&mut self) -> String {
        println!("Paste words (comma, tab, semicolon or newline separated). End with an empty line:");
        let mut lines = Vec::new();
        while let Some(line) = self.input.recv().await {
            if line.trim().is_empty() {
                break;
            }
            lines.push(line);
        }
        lines.join("\n")
    }

    async fn execute(&mut self, command: Command) -> Result<(), ShellError> {
        match command {
            Command::Add { word } => {
                let notice = self.workspace.borrow_mut().add_word(&word.join(" "));
                print_notice(&notice);
            }
            Command::Paste => {
                let text = self.read_paste().await;
                let preview = self.workspace.borrow().preview_paste(&text);
                if !preview.is_empty() {
                    let mut line = format!("Found {} words: {}", preview.count, preview.shown.join(", "));
                    if preview.remaining > 0 {
                        line.push_str(&format!(" ... and {} more", preview.remaining));
                    }
                    println!("{}", line);
                }
                let notice = self.workspace.borrow_mut().bulk_add(&text);
                print_notice(&notice);
            }
            Command::Import { path } => match tokio::fs::read(&path).await {
                Ok(bytes) => {
                    let notice = self.workspace.borrow_mut().import_file(&file_name_of(&path), &bytes);
                    print_notice(&notice);
                }
                Err(e) => print_notice(&Notice::error(format!("Error reading {}: {}", path.display(), e))),
            },
            Command::Remove { word } => {
                let notice = self.workspace.borrow_mut().remove_word(&word.join(" "));
                print_notice(&notice);
            }
            Command::Shuffle => {
                let notice = self.workspace.borrow_mut().randomize_words();
                print_notice(&notice);
            }
            Command::Clear => {
                let notice = self.workspace.borrow_mut().clear_words();
                print_notice(&notice);
            }
            Command::Samples => {
                let notice = self.workspace.borrow_mut().load_samples();
                print_notice(&notice);
            }
            Command::Words => {
                let ws = self.workspace.borrow();
                println!("{}", ws.words().count_label());
                for (i, word) in ws.words().iter().enumerate() {
                    println!("{:>3}. {}", i + 1, word);
                }
            }
            Command::Shape { name } => {
                let notice = self.workspace.borrow_mut().select_shape(ShapeId::parse(&name));
                print_notice(&notice);
            }
            Command::Shapes => {
                self.refresh_shapes().await;
                let ws = self.workspace.borrow();
                let selected = ws.selected_shape();
                let mark = |name: &str| if selected.as_str() == name { "*" } else { " " };
                println!("Built-in:");
                for shape in BuiltinShape::ALL {
                    println!(" {} {}", mark(shape.name()), shape.name());
                }
                println!("Custom:");
                if ws.shapes().custom_names().is_empty() {
                    println!("   (none)");
                }
                for name in ws.shapes().custom_names() {
                    println!(" {} {}", mark(name.as_str()), name);
                }
            }
            Command::Use { name } => {
                let notice = self.workspace.borrow_mut().use_custom_shape(&name);
                print_notice(&notice);
            }
            Command::Upload { path, name } => match tokio::fs::read(&path).await {
                Ok(bytes) => {
                    let begun = self.workspace.borrow_mut().begin_upload_shape(&name, &file_name_of(&path), bytes);
                    self.run_shape_job(begun).await;
                }
                Err(e) => print_notice(&Notice::error(format!("Error reading {}: {}", path.display(), e))),
            },
            Command::Draw { action } => self.draw(action).await,
            Command::Delete { name } => {
                let confirmed = self.confirm(&delete_prompt(&name)).await;
                let begun = self
                    .workspace
                    .borrow_mut()
                    .begin_delete_shape(&name, &mut |_: &str| confirmed);
                self.run_shape_job(begun).await;
            }
            Command::ClearShapes => {
                let count = self.workspace.borrow().shapes().custom_names().len();
                let confirmed = count > 0 && self.confirm(&clear_all_prompt(count)).await;
                let begun = self.workspace.borrow_mut().begin_clear_shapes(&mut |_: &str| confirmed);
                self.run_shape_job(begun).await;
            }
            Command::Dir { direction, state } => {
                let notice = self.workspace.borrow_mut().set_direction(direction, state.enabled());
                print_notice(&notice);
            }
            Command::Preview => {
                print!("{}", self.workspace.borrow().preview().render_grid());
            }
            Command::Export { title, subject, font, theme, format } => {
                let defaults = ExportMetadata::default();
                let metadata = ExportMetadata {
                    title: title.unwrap_or(defaults.title),
                    subject: subject.unwrap_or(defaults.subject),
                    font: font.unwrap_or(defaults.font),
                    theme: theme.unwrap_or(defaults.theme),
                    format: format.unwrap_or(defaults.format),
                    directions: defaults.directions,
                };
                self.export(metadata).await?;
            }
            Command::Help => {
                let help = Line::command().render_long_help();
                println!("{}", help);
            }
            Command::Quit => {}
        }
        Ok(())
    }

    async fn draw(&mut self, action: DrawAction) {
        let notice = match action {
            DrawAction::Down { x, y } => {
                let event = PointerEvent::Down { position: Point::new(x, y) };
                self.workspace.borrow_mut().drawing_mut().handle_pointer_event(event);
                None
            }
            DrawAction::Move { x, y } => {
                let event = PointerEvent::Move { position: Point::new(x, y) };
                self.workspace.borrow_mut().drawing_mut().handle_pointer_event(event);
                None
            }
            DrawAction::Up => {
                self.workspace.borrow_mut().drawing_mut().handle_pointer_event(PointerEvent::Up);
                None
            }
            DrawAction::Brush { width } => {
                let mut ws = self.workspace.borrow_mut();
                ws.drawing_mut().set_brush_width(width);
                Some(Notice::success(format!("Brush width {}px", ws.drawing().brush_width())))
            }
            DrawAction::Color { hex } => match parse_hex_color(&hex) {
                Some(color) => {
                    self.workspace.borrow_mut().drawing_mut().set_brush_color(color);
                    Some(Notice::success(format!("Brush colour {}", hex)))
                }
                None => Some(Notice::warning(format!("Invalid colour '{}', expected #rrggbb", hex))),
            },
            DrawAction::Clear => {
                self.workspace.borrow_mut().drawing_mut().clear();
                Some(Notice::success("Drawing cleared"))
            }
            DrawAction::Save { name } => {
                let begun = self.workspace.borrow_mut().begin_save_drawing(&name);
                self.run_shape_job(begun).await;
                None
            }
        };
        if let Some(notice) = notice {
            print_notice(&notice);
        }
    }

    async fn export(&self, metadata: ExportMetadata) -> Result<(), ShellError> {
        let begun = self.workspace.borrow_mut().begin_export(metadata);
        let request = match begun {
            Ok(request) => request,
            Err(e) => {
                print_notice(&e.notice());
                return Ok(());
            }
        };
        println!("Generating...");
        let result = self.backend.generate(&request).await;
        let finished = self.workspace.borrow_mut().finish_export(result);
        match finished {
            Ok(document) => {
                let path = save_document(&self.config.download_dir(), &document).await?;
                print_notice(&Notice::success(format!(
                    "Puzzle generated successfully! Saved to {}",
                    path.display()
                )));
            }
            Err(e) => print_notice(&e.notice()),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;
    use wordsearch_core::export::GenerateRequest;
    use wordsearch_core::remote::{BoxFuture, ClearReport, GeneratedDocument, PuzzlePreview, RemoteResult, ShapePayload};
    use wordsearch_core::{PreviewRequest, PuzzleEngine, ShapeStore};

    /// Memory backend whose previews of a single word take much longer.
    #[derive(Default)]
    struct SlowPreviews {
        inner: MemoryBackend,
        completed: Mutex<Vec<usize>>,
    }

    impl PuzzleEngine for SlowPreviews {
        fn preview(&self, request: &PreviewRequest) -> BoxFuture<'_, RemoteResult<PuzzlePreview>> {
            let word_count = request.words.len();
            let delay = if word_count == 1 { 500 } else { 10 };
            let inner = self.inner.preview(request);
            Box::pin(async move {
                tokio::time::sleep(Duration::from_millis(delay)).await;
                let result = inner.await;
                self.completed.lock().unwrap().push(word_count);
                result
            })
        }

        fn generate(&self, request: &GenerateRequest) -> BoxFuture<'_, RemoteResult<GeneratedDocument>> {
            self.inner.generate(request)
        }
    }

    impl ShapeStore for SlowPreviews {
        fn create(&self, name: &str, payload: &ShapePayload) -> BoxFuture<'_, RemoteResult<String>> {
            self.inner.create(name, payload)
        }

        fn list(&self) -> BoxFuture<'_, RemoteResult<Vec<String>>> {
            self.inner.list()
        }

        fn delete_one(&self, name: &str) -> BoxFuture<'_, RemoteResult<String>> {
            self.inner.delete_one(name)
        }

        fn delete_all(&self) -> BoxFuture<'_, RemoteResult<ClearReport>> {
            self.inner.delete_all()
        }
    }

    fn slow_shell() -> (Arc<SlowPreviews>, Shell) {
        let backend = Arc::new(SlowPreviews::default());
        let config = ClientConfig { preview_debounce_ms: 100, ..ClientConfig::default() };
        let (_tx, rx) = mpsc::channel(1);
        let shell = Shell::new(Arc::clone(&backend) as Arc<dyn Backend>, config, rx);
        (backend, shell)
    }

    fn paused_runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .start_paused(true)
            .build()
            .unwrap()
    }

    #[test]
    fn test_late_preview_response_is_discarded() {
        let local = tokio::task::LocalSet::new();
        local.block_on(&paused_runtime(), async {
            let (backend, shell) = slow_shell();
            shell.workspace().borrow_mut().add_word("cat");
            shell.schedule_preview();
            // First request is dispatched after the debounce and is still in flight.
            tokio::time::sleep(Duration::from_millis(200)).await;

            shell.workspace().borrow_mut().add_word("dog");
            shell.schedule_preview();
            tokio::time::sleep(Duration::from_millis(1000)).await;

            assert_eq!(*backend.completed.lock().unwrap(), vec![2, 1]);
            let ws = shell.workspace().borrow();
            assert_eq!(ws.preview().state(), PreviewState::Idle);
            assert_eq!(ws.preview().placed_words(), &["CAT", "DOG"]);
        });
    }

    #[test]
    fn test_debounce_drops_superseded_request() {
        let local = tokio::task::LocalSet::new();
        local.block_on(&paused_runtime(), async {
            let (backend, shell) = slow_shell();
            shell.workspace().borrow_mut().add_word("cat");
            shell.schedule_preview();
            shell.workspace().borrow_mut().add_word("dog");
            shell.schedule_preview();
            tokio::time::sleep(Duration::from_millis(1000)).await;

            assert_eq!(backend.inner.calls().preview, 1);
            assert_eq!(*backend.completed.lock().unwrap(), vec![2]);
            assert_eq!(shell.workspace().borrow().preview().placed_words(), &["CAT", "DOG"]);
        });
    }

    #[test]
    fn test_format_notice() {
        assert_eq!(format_notice(&Notice::success("Words randomized!")), "[ok] Words randomized!");
        assert_eq!(format_notice(&Notice::warning("No words to randomize")), "[warning] No words to randomize");
        assert_eq!(format_notice(&Notice::error("boom")), "[error] boom");
    }

    #[test]
    fn test_file_name_of() {
        assert_eq!(file_name_of(Path::new("/tmp/words.csv")), "words.csv");
        assert_eq!(file_name_of(Path::new("/")), "");
    }

    #[test]
    fn test_save_document() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out");
        let document = ExportedDocument {
            file_name: "puzzle.pdf".to_string(),
            bytes: b"%PDF".to_vec(),
        };
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let path = runtime.block_on(save_document(&target, &document)).unwrap();
        assert_eq!(path, target.join("puzzle.pdf"));
        assert_eq!(std::fs::read(path).unwrap(), b"%PDF");
    }

    #[test]
    fn test_offline_backend_round_trip() {
        let backend = connect(true, &ClientConfig::default()).unwrap();
        let (_tx, rx) = mpsc::channel(1);
        let shell = Shell::new(backend, ClientConfig::default(), rx);
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        runtime.block_on(shell.refresh_shapes());
        assert!(shell.workspace().borrow().shapes().custom_names().is_empty());
    }
}
