//! Live preview orchestration.
//!
//! Every trigger snapshots the current words, shape and direction flags into
//! a [`PreviewRequest`] carrying a fresh sequence number. Requests may be in
//! flight concurrently and complete in any order; only the response whose
//! number matches the latest dispatched request is applied.

use crate::remote::{PuzzleEngine, PuzzlePreview, RemoteResult};
use crate::shapes::ShapeId;
use crate::words::WordCollection;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placement directions the engine may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionFlags {
    pub horizontal: bool,
    pub vertical: bool,
    pub diagonal: bool,
}

impl Default for DirectionFlags {
    fn default() -> Self {
        Self {
            horizontal: true,
            vertical: true,
            diagonal: true,
        }
    }
}

/// One placement direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Horizontal,
    Vertical,
    Diagonal,
}

impl Direction {
    /// Parse `h`/`horizontal`, `v`/`vertical` or `d`/`diagonal`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "h" | "horizontal" => Some(Direction::Horizontal),
            "v" | "vertical" => Some(Direction::Vertical),
            "d" | "diagonal" => Some(Direction::Diagonal),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Horizontal => "Horizontal",
            Direction::Vertical => "Vertical",
            Direction::Diagonal => "Diagonal",
        })
    }
}

impl DirectionFlags {
    pub fn get(&self, direction: Direction) -> bool {
        match direction {
            Direction::Horizontal => self.horizontal,
            Direction::Vertical => self.vertical,
            Direction::Diagonal => self.diagonal,
        }
    }

    /// Set one flag. Returns `true` if it changed.
    pub fn set(&mut self, direction: Direction, enabled: bool) -> bool {
        let flag = match direction {
            Direction::Horizontal => &mut self.horizontal,
            Direction::Vertical => &mut self.vertical,
            Direction::Diagonal => &mut self.diagonal,
        };
        let changed = *flag != enabled;
        *flag = enabled;
        changed
    }
}

/// Immutable snapshot sent to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewRequest {
    pub seq: u64,
    pub words: Vec<String>,
    pub shape: ShapeId,
    pub directions: DirectionFlags,
}

/// Lifecycle of the preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreviewState {
    #[default]
    Idle,
    Requesting,
    Error,
}

/// What the preview area shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PreviewView {
    /// Placeholder shown while the collection is empty.
    #[default]
    Empty,
    Grid(PuzzlePreview),
    /// Inline error replacing the previous grid.
    Error(String),
}

/// Whether a response was applied or dropped as superseded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewOutcome {
    Applied,
    Stale,
}

/// Issues preview requests and applies their responses in latest-wins order.
#[derive(Debug, Default)]
pub struct PreviewOrchestrator {
    latest_seq: u64,
    state: PreviewState,
    view: PreviewView,
    outbox: Vec<PreviewRequest>,
}

impl PreviewOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PreviewState {
        self.state
    }

    pub fn view(&self) -> &PreviewView {
        &self.view
    }

    /// Sequence number of the latest request (0 before the first one).
    pub fn latest_seq(&self) -> u64 {
        self.latest_seq
    }

    /// Whether `seq` is still the latest request.
    pub fn is_latest(&self, seq: u64) -> bool {
        seq == self.latest_seq
    }

    /// Requests queued for dispatch.
    pub fn pending(&self) -> &[PreviewRequest] {
        &self.outbox
    }

    /// Snapshot the inputs and queue a request.
    ///
    /// An empty collection shows the placeholder without queueing anything;
    /// responses still in flight become stale either way.
    pub fn invalidate(&mut self, words: &WordCollection, shape: &ShapeId, directions: DirectionFlags) -> Option<u64> {
        self.latest_seq += 1;
        if words.is_empty() {
            log::debug!("Preview #{} skipped: no words", self.latest_seq);
            self.outbox.clear();
            self.state = PreviewState::Idle;
            self.view = PreviewView::Empty;
            return None;
        }

        log::debug!("Preview #{} queued ({} words, shape {})", self.latest_seq, words.len(), shape);
        self.state = PreviewState::Requesting;
        self.outbox.push(PreviewRequest {
            seq: self.latest_seq,
            words: words.as_slice().to_vec(),
            shape: shape.clone(),
            directions,
        });
        Some(self.latest_seq)
    }

    /// Drain queued requests for dispatch.
    pub fn take_requests(&mut self) -> Vec<PreviewRequest> {
        std::mem::take(&mut self.outbox)
    }

    /// Apply a response if it belongs to the latest request.
    pub fn apply(&mut self, seq: u64, result: RemoteResult<PuzzlePreview>) -> PreviewOutcome {
        if !self.is_latest(seq) {
            log::debug!("Discarding stale preview #{} (latest is #{})", seq, self.latest_seq);
            return PreviewOutcome::Stale;
        }
        match result {
            Ok(preview) => {
                log::debug!("Preview #{} applied: {} words placed", seq, preview.placed_words.len());
                self.state = PreviewState::Idle;
                self.view = PreviewView::Grid(preview);
            }
            Err(e) => {
                log::error!("Preview #{} failed: {}", seq, e);
                self.state = PreviewState::Error;
                self.view = PreviewView::Error(e.to_string());
            }
        }
        PreviewOutcome::Applied
    }

    /// Dispatch queued requests in order and apply the responses.
    ///
    /// Requests superseded before dispatch are reported as stale without
    /// reaching the engine.
    pub async fn run_pending<E: PuzzleEngine + ?Sized>(&mut self, engine: &E) -> Vec<PreviewOutcome> {
        let mut outcomes = Vec::new();
        for request in self.take_requests() {
            if !self.is_latest(request.seq) {
                log::debug!("Preview #{} superseded before dispatch", request.seq);
                outcomes.push(PreviewOutcome::Stale);
                continue;
            }
            let result = engine.preview(&request).await;
            outcomes.push(self.apply(request.seq, result));
        }
        outcomes
    }

    /// Words placed in the displayed grid.
    pub fn placed_words(&self) -> &[String] {
        match &self.view {
            PreviewView::Grid(preview) => &preview.placed_words,
            _ => &[],
        }
    }

    /// Plain-text rendering of the preview area.
    pub fn render_grid(&self) -> String {
        let mut out = String::new();
        if self.state == PreviewState::Requesting {
            out.push_str("Generating preview...\n");
        }
        match &self.view {
            PreviewView::Empty => out.push_str("Add words to see preview\n"),
            PreviewView::Error(message) => {
                out.push_str("Error generating preview\n");
                out.push_str(message);
                out.push('\n');
            }
            PreviewView::Grid(preview) => {
                for row in &preview.grid {
                    let line: Vec<String> = row.iter().map(|cell| cell.unwrap_or(' ').to_string()).collect();
                    out.push_str(line.join(" ").trim_end());
                    out.push('\n');
                }
                if preview.placed_words.is_empty() {
                    out.push_str("No words could be placed\n");
                } else {
                    out.push_str(&format!("Words to find: {}\n", preview.placed_words.join(", ")));
                }
            }
        }
        out
    }
}
