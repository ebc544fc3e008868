//! Viewport transform (pan + zoom)
//!
//! Maps between screen space (pointer coordinates) and content space, the
//! unscaled surface the grid is laid out on. The translation is always clamped
//! so content covers the whole surface: with `scale >= 1` there is never a gap
//! at any edge.

use glam::Vec2;

use crate::consts::MIN_SCALE;

/// Scale and translation applied to the content before it hits the surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportTransform {
    scale: Vec2,
    translate: Vec2,
    /// Drawing surface size in pixels
    surface_size: Vec2,
}

impl ViewportTransform {
    pub fn new(surface_width: f32, surface_height: f32) -> Self {
        Self {
            scale: Vec2::ONE,
            translate: Vec2::ZERO,
            surface_size: Vec2::new(surface_width.max(0.0), surface_height.max(0.0)),
        }
    }

    #[inline]
    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    #[inline]
    pub fn translate(&self) -> Vec2 {
        self.translate
    }

    #[inline]
    pub fn surface_size(&self) -> Vec2 {
        self.surface_size
    }

    /// Update the surface size (canvas resize) and re-clamp the translation
    pub fn set_surface_size(&mut self, width: f32, height: f32) {
        let size = Vec2::new(width, height);
        if !size.is_finite() {
            return;
        }
        self.surface_size = size.max(Vec2::ZERO);
        self.pan_to(self.translate);
    }

    /// Pointer position to content coordinates.
    ///
    /// `origin` is the top-left of the surface's bounding rectangle in the
    /// same space as `screen`.
    pub fn screen_to_logical(&self, screen: Vec2, origin: Vec2) -> Vec2 {
        (screen - origin - self.translate) / self.scale
    }

    /// Content coordinates to a surface-relative screen position
    pub fn logical_to_screen(&self, logical: Vec2) -> Vec2 {
        logical * self.scale + self.translate
    }

    /// Move the content origin to `target`, clamped to keep the surface covered
    pub fn pan_to(&mut self, target: Vec2) {
        if !target.is_finite() {
            return;
        }
        let size = self.surface_size;
        let mut t = target;

        if t.x > 0.0 {
            t.x = 0.0;
        }
        if t.x + size.x * self.scale.x < size.x {
            t.x = size.x - size.x * self.scale.x;
        }
        if t.y > 0.0 {
            t.y = 0.0;
        }
        if t.y + size.y * self.scale.y < size.y {
            t.y = size.y - size.y * self.scale.y;
        }

        self.translate = t;
    }

    /// Pan relative to a translation captured at the start of a drag
    pub fn pan_by(&mut self, anchor: Vec2, delta: Vec2) {
        self.pan_to(anchor + delta);
    }

    /// Set the scale (floored at 1 per axis) and re-clamp the translation
    pub fn zoom_to(&mut self, scale: Vec2) {
        if !scale.is_finite() {
            return;
        }
        self.scale = scale.max(Vec2::splat(MIN_SCALE));
        self.pan_to(self.translate);
    }

    /// Zoom while keeping the content point under `screen` fixed on screen
    pub fn zoom_anchored(&mut self, screen: Vec2, origin: Vec2, scale: Vec2) {
        let surface_point = screen - origin;
        let logical = self.screen_to_logical(screen, origin);
        self.zoom_to(scale);
        self.pan_to(surface_point - logical * self.scale);
    }

    /// Content-space rectangle currently visible, as (min, max)
    pub fn visible_logical(&self) -> (Vec2, Vec2) {
        let min = -self.translate / self.scale;
        let max = (self.surface_size - self.translate) / self.scale;
        (min, max)
    }
}
