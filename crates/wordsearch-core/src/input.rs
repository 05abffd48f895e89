//! Input state management for mouse/touch drawing events.
//!
//! Platform input is translated once at the boundary into [`PointerEvent`];
//! touch input goes through [`TouchEvent::to_pointer`] so the drawing code
//! has a single event model.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Pointer event type for unified mouse/touch handling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    /// Primary button pressed or finger placed.
    Down { position: Point },
    /// Pointer moved, pressed or not.
    Move { position: Point },
    /// Primary button released or finger lifted.
    Up,
    /// Pointer left the surface.
    Leave,
}

/// Raw touch input, as delivered by touch screens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TouchEvent {
    Start { touches: Vec<Point> },
    Move { touches: Vec<Point> },
    End,
    Cancel,
}

impl TouchEvent {
    /// Translate to the pointer model using the first active touch.
    ///
    /// Returns `None` for start/move events without any touch point.
    pub fn to_pointer(&self) -> Option<PointerEvent> {
        match self {
            TouchEvent::Start { touches } => touches
                .first()
                .map(|&position| PointerEvent::Down { position }),
            TouchEvent::Move { touches } => touches
                .first()
                .map(|&position| PointerEvent::Move { position }),
            TouchEvent::End => Some(PointerEvent::Up),
            TouchEvent::Cancel => Some(PointerEvent::Leave),
        }
    }
}

/// Tracks pointer state between events.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Current pointer position in surface coordinates.
    pub pointer_position: Point,
    /// Previous pointer position for segment interpolation.
    pub previous_pointer_position: Point,
    /// Whether the primary button / finger is down.
    pub is_dragging: bool,
}

impl InputState {
    /// Create a new input state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a pointer event.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down { position } => {
                self.previous_pointer_position = position;
                self.pointer_position = position;
                self.is_dragging = true;
            }
            PointerEvent::Move { position } => {
                self.previous_pointer_position = self.pointer_position;
                self.pointer_position = position;
            }
            PointerEvent::Up | PointerEvent::Leave => {
                self.is_dragging = false;
            }
        }
    }
}
