//! Canvas-style drawing surface
//!
//! The grid renderer only issues these primitive calls. Paths are built with
//! `begin_path`/`move_to`/`line_to`/`rect` and consumed by `fill`/`stroke`,
//! with the current transform applied the way a 2D canvas context applies it.

use super::style::Color;

pub trait DrawSurface {
    /// Surface width in pixels
    fn width(&self) -> f32;
    /// Surface height in pixels
    fn height(&self) -> f32;

    fn reset_transform(&mut self);
    fn translate(&mut self, x: f32, y: f32);
    fn scale(&mut self, x: f32, y: f32);

    fn begin_path(&mut self);
    fn move_to(&mut self, x: f32, y: f32);
    fn line_to(&mut self, x: f32, y: f32);
    fn rect(&mut self, x: f32, y: f32, w: f32, h: f32);
    fn fill(&mut self);
    fn stroke(&mut self);
    /// Fill a rectangle directly, leaving the current path alone
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32);

    fn set_stroke_color(&mut self, color: Color);
    fn set_fill_color(&mut self, color: Color);
    fn set_line_width(&mut self, width: f32);
    /// Alternating on/off lengths in user space; empty means solid
    fn set_line_dash(&mut self, dash: &[f32]);
}

/// A single recorded surface call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    ResetTransform,
    Translate(f32, f32),
    Scale(f32, f32),
    BeginPath,
    MoveTo(f32, f32),
    LineTo(f32, f32),
    Rect(f32, f32, f32, f32),
    Fill,
    Stroke,
    FillRect(f32, f32, f32, f32),
    StrokeColor(Color),
    FillColor(Color),
    LineWidth(f32),
    LineDash(Vec<f32>),
}

/// Surface that records every call, for tests and debugging
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    pub width: f32,
    pub height: f32,
    pub calls: Vec<DrawCall>,
}

impl Recorder {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            calls: Vec::new(),
        }
    }

    /// Number of calls matching a predicate
    pub fn count(&self, pred: impl Fn(&DrawCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }
}

impl DrawSurface for Recorder {
    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn reset_transform(&mut self) {
        self.calls.push(DrawCall::ResetTransform);
    }

    fn translate(&mut self, x: f32, y: f32) {
        self.calls.push(DrawCall::Translate(x, y));
    }

    fn scale(&mut self, x: f32, y: f32) {
        self.calls.push(DrawCall::Scale(x, y));
    }

    fn begin_path(&mut self) {
        self.calls.push(DrawCall::BeginPath);
    }

    fn move_to(&mut self, x: f32, y: f32) {
        self.calls.push(DrawCall::MoveTo(x, y));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.calls.push(DrawCall::LineTo(x, y));
    }

    fn rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.calls.push(DrawCall::Rect(x, y, w, h));
    }

    fn fill(&mut self) {
        self.calls.push(DrawCall::Fill);
    }

    fn stroke(&mut self) {
        self.calls.push(DrawCall::Stroke);
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.calls.push(DrawCall::FillRect(x, y, w, h));
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.calls.push(DrawCall::StrokeColor(color));
    }

    fn set_fill_color(&mut self, color: Color) {
        self.calls.push(DrawCall::FillColor(color));
    }

    fn set_line_width(&mut self, width: f32) {
        self.calls.push(DrawCall::LineWidth(width));
    }

    fn set_line_dash(&mut self, dash: &[f32]) {
        self.calls.push(DrawCall::LineDash(dash.to_vec()));
    }
}
