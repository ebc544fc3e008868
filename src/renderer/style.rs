//! Stroke styles, lane palette and dash table

use super::surface::DrawSurface;

/// RGBA color, sRGB-encoded, components in 0..=1
pub type Color = [f32; 4];

/// Named colors (CSS values)
pub mod colors {
    use super::Color;

    pub const WHITE: Color = [1.0, 1.0, 1.0, 1.0];
    pub const BLACK: Color = [0.0, 0.0, 0.0, 1.0];
    pub const LIGHT_GREY: Color = [0.827, 0.827, 0.827, 1.0];
    pub const GREY: Color = [0.502, 0.502, 0.502, 1.0];
    pub const DARK_CYAN: Color = [0.0, 0.545, 0.545, 1.0];

    pub const RED: Color = [1.0, 0.0, 0.0, 1.0];
    pub const ORANGE: Color = [1.0, 0.647, 0.0, 1.0];
    pub const GOLD: Color = [1.0, 0.843, 0.0, 1.0];
    pub const LIME: Color = [0.0, 1.0, 0.0, 1.0];
    pub const GREEN: Color = [0.0, 0.502, 0.0, 1.0];
    pub const CYAN: Color = [0.0, 1.0, 1.0, 1.0];
    pub const BLUE: Color = [0.0, 0.0, 1.0, 1.0];
    pub const INDIGO: Color = [0.294, 0.0, 0.510, 1.0];
    pub const VIOLET: Color = [0.933, 0.510, 0.933, 1.0];
    pub const DEEP_PINK: Color = [1.0, 0.078, 0.576, 1.0];

    pub const BACKGROUND: Color = WHITE;
    /// Flat fill used when there are too many grid lines to draw
    pub const GRID_FALLBACK: Color = LIGHT_GREY;
    pub const GRID_LINE: Color = BLACK;
    pub const REFLECTOR: Color = DARK_CYAN;
}

/// Lane colors, cycled by lane index
pub const LANE_PALETTE: [Color; 12] = [
    colors::RED,
    colors::ORANGE,
    colors::GOLD,
    colors::LIME,
    colors::GREEN,
    colors::CYAN,
    colors::BLUE,
    colors::INDIGO,
    colors::VIOLET,
    colors::DEEP_PINK,
    colors::BLACK,
    colors::GREY,
];

/// Dash patterns, advanced once per full trip through the palette
pub const LANE_DASHES: [&[f32]; 9] = [
    &[],
    &[5.0, 5.0],
    &[15.0, 10.0, 5.0, 10.0],
    &[15.0, 5.0],
    &[15.0, 5.0, 5.0],
    &[15.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0],
    &[5.0, 15.0, 15.0],
    &[15.0, 5.0, 5.0, 15.0],
    &[10.0, 5.0, 10.0, 5.0, 10.0, 15.0],
];

/// Dash lengths never shrink below this (content units)
const MIN_DASH: f32 = 0.5;

/// Stroke parameters at native zoom
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub color: Color,
    /// Width at scale 1
    pub width: f32,
    /// Width approached as vertical zoom grows
    pub min_width: f32,
    pub dash: &'static [f32],
}

pub const GRID_STROKE: StrokeStyle = StrokeStyle {
    color: colors::GRID_LINE,
    width: 0.25,
    min_width: 0.05,
    dash: &[],
};

pub const LANE_STROKE_WIDTH: f32 = 1.0;
pub const LANE_STROKE_MIN_WIDTH: f32 = 0.25;

pub const REFLECTOR_STROKE: StrokeStyle = StrokeStyle {
    color: colors::REFLECTOR,
    width: 5.0,
    min_width: 1.0,
    dash: &[],
};

impl StrokeStyle {
    /// Style for a lane (1-indexed)
    pub fn lane(lane_index: usize) -> Self {
        let i = lane_index.saturating_sub(1);
        Self {
            color: LANE_PALETTE[i % LANE_PALETTE.len()],
            width: LANE_STROKE_WIDTH,
            min_width: LANE_STROKE_MIN_WIDTH,
            dash: LANE_DASHES[(i / LANE_PALETTE.len()) % LANE_DASHES.len()],
        }
    }

    /// Line width in content units for vertical scale `sy`
    pub fn width_at(&self, sy: f32) -> f32 {
        self.min_width + (self.width - self.min_width) / sy.max(1.0)
    }

    /// Dash pattern in content units for vertical scale `sy`
    pub fn dash_at(&self, sy: f32) -> Vec<f32> {
        let sy = sy.max(1.0);
        self.dash.iter().map(|d| (d / sy).max(MIN_DASH)).collect()
    }

    /// Push this style onto a surface
    pub fn apply(&self, surface: &mut dyn DrawSurface, sy: f32, dashes: bool) {
        surface.set_stroke_color(self.color);
        surface.set_line_width(self.width_at(sy));
        if dashes {
            surface.set_line_dash(&self.dash_at(sy));
        } else {
            surface.set_line_dash(&[]);
        }
    }
}
