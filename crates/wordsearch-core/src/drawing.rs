//! Free-hand drawing surface used to create custom shapes.

use crate::input::{InputState, PointerEvent, TouchEvent};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use kurbo::{Line, ParamCurveNearest, Point};
use peniko::Color;
use thiserror::Error;

/// Default surface size in pixels.
pub const DEFAULT_CANVAS_SIZE: u32 = 400;
/// Default brush width in pixels.
pub const DEFAULT_BRUSH_WIDTH: f64 = 5.0;
/// Smallest brush width.
pub const MIN_BRUSH_WIDTH: f64 = 1.0;
/// Largest brush width.
pub const MAX_BRUSH_WIDTH: f64 = 50.0;

const DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Drawing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DrawingError {
    #[error("Please draw something first!")]
    Blank,
    #[error("PNG encoding failed: {0}")]
    Encode(String),
}

/// Parse a `#rrggbb` or `#rrggbbaa` colour.
pub fn parse_hex_color(hex: &str) -> Option<Color> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if !(digits.len() == 6 || digits.len() == 8) || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    let alpha = if digits.len() == 8 { channel(6)? } else { 255 };
    Some(Color::from_rgba8(channel(0)?, channel(2)?, channel(4)?, alpha))
}

/// Raster surface that records free-hand strokes.
///
/// Strokes are drawn as interpolated line segments with a round brush.
/// The surface starts out, and is reset to, a solid white background.
#[derive(Debug, Clone)]
pub struct DrawingCapture {
    width: u32,
    height: u32,
    /// RGBA8 pixels, row-major.
    pixels: Vec<u8>,
    brush_width: f64,
    brush_color: Color,
    input: InputState,
    /// Number of segments drawn since the last clear.
    segments: usize,
}

impl Default for DrawingCapture {
    fn default() -> Self {
        Self::new(DEFAULT_CANVAS_SIZE, DEFAULT_CANVAS_SIZE)
    }
}

impl DrawingCapture {
    /// Background colour of a blank surface.
    pub const BACKGROUND: Color = Color::WHITE;

    /// Create a blank surface.
    pub fn new(width: u32, height: u32) -> Self {
        let mut capture = Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
            brush_width: DEFAULT_BRUSH_WIDTH,
            brush_color: Color::BLACK,
            input: InputState::new(),
            segments: 0,
        };
        capture.clear();
        capture
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn brush_width(&self) -> f64 {
        self.brush_width
    }

    /// Set the brush width, clamped to the supported range.
    pub fn set_brush_width(&mut self, width: f64) {
        self.brush_width = width.clamp(MIN_BRUSH_WIDTH, MAX_BRUSH_WIDTH);
    }

    pub fn brush_color(&self) -> Color {
        self.brush_color
    }

    pub fn set_brush_color(&mut self, color: Color) {
        self.brush_color = color;
    }

    /// Whether a stroke is in progress.
    pub fn is_drawing(&self) -> bool {
        self.input.is_dragging
    }

    /// Segments drawn since the last clear.
    pub fn segment_count(&self) -> usize {
        self.segments
    }

    /// RGBA value of one pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.index(x, y);
        Some([self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3]])
    }

    /// Process a pointer event.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down { position } => self.begin_stroke(position),
            PointerEvent::Move { position } => self.continue_stroke(position),
            PointerEvent::Up | PointerEvent::Leave => self.end_stroke(),
        }
    }

    /// Process a touch event through the pointer model.
    pub fn handle_touch_event(&mut self, event: &TouchEvent) {
        if let Some(pointer) = event.to_pointer() {
            self.handle_pointer_event(pointer);
        }
    }

    /// Start a stroke at `position`. Nothing is painted until the pointer moves.
    pub fn begin_stroke(&mut self, position: Point) {
        self.input.handle_pointer_event(PointerEvent::Down { position });
    }

    /// Extend the current stroke with a segment to `position`.
    ///
    /// Ignored when no stroke is in progress.
    pub fn continue_stroke(&mut self, position: Point) {
        if !self.input.is_dragging {
            return;
        }
        self.input.handle_pointer_event(PointerEvent::Move { position });
        let segment = Line::new(self.input.previous_pointer_position, self.input.pointer_position);
        self.paint_segment(segment);
        self.segments += 1;
    }

    /// Finish the current stroke.
    pub fn end_stroke(&mut self) {
        self.input.handle_pointer_event(PointerEvent::Up);
    }

    /// Reset to a blank white surface.
    pub fn clear(&mut self) {
        let rgba = Self::BACKGROUND.to_rgba8();
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&[rgba.r, rgba.g, rgba.b, rgba.a]);
        }
        self.input = InputState::new();
        self.segments = 0;
    }

    /// Whether the encoded image equals a fresh blank surface of the same size.
    pub fn is_blank(&self) -> bool {
        let blank = Self::new(self.width, self.height);
        match (self.encode(), blank.encode()) {
            (Ok(current), Ok(empty)) => current == empty,
            _ => false,
        }
    }

    /// Encode as a PNG data URI.
    pub fn encode(&self) -> Result<String, DrawingError> {
        let png = self.encode_png()?;
        Ok(format!("{}{}", DATA_URI_PREFIX, STANDARD.encode(png)))
    }

    /// Encode as a data URI, refusing blank surfaces.
    pub fn encode_for_submission(&self) -> Result<String, DrawingError> {
        if self.is_blank() {
            return Err(DrawingError::Blank);
        }
        self.encode()
    }

    /// Encode the raw PNG bytes.
    pub fn encode_png(&self) -> Result<Vec<u8>, DrawingError> {
        let mut png_data = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut png_data, self.width, self.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder
                .write_header()
                .map_err(|e| DrawingError::Encode(e.to_string()))?;
            writer
                .write_image_data(&self.pixels)
                .map_err(|e| DrawingError::Encode(e.to_string()))?;
        }
        Ok(png_data)
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Fill every pixel whose centre lies within half the brush width of the segment.
    fn paint_segment(&mut self, segment: Line) {
        let radius = self.brush_width / 2.0;
        let min_x = (segment.p0.x.min(segment.p1.x) - radius).floor().max(0.0);
        let min_y = (segment.p0.y.min(segment.p1.y) - radius).floor().max(0.0);
        let max_x = (segment.p0.x.max(segment.p1.x) + radius).ceil().min(self.width as f64 - 1.0);
        let max_y = (segment.p0.y.max(segment.p1.y) + radius).ceil().min(self.height as f64 - 1.0);
        if max_x < min_x || max_y < min_y {
            return;
        }

        let rgba = self.brush_color.to_rgba8();
        let radius_sq = radius * radius;
        for y in min_y as u32..=max_y as u32 {
            for x in min_x as u32..=max_x as u32 {
                let centre = Point::new(x as f64 + 0.5, y as f64 + 0.5);
                if segment.nearest(centre, 1e-6).distance_sq <= radius_sq {
                    let i = self.index(x, y);
                    self.pixels[i..i + 4].copy_from_slice(&[rgba.r, rgba.g, rgba.b, rgba.a]);
                }
            }
        }
    }
}
