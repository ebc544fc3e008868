//! Grid renderer
//!
//! Draws one frame in three passes: background and grid lines, lane
//! trajectories, then reflector marks on top. Everything is drawn in content
//! space with the viewport transform set on the surface, so grid units are
//! multiplied by the cell size here and the surface does the rest.

use glam::Vec2;

use super::style::{GRID_STROKE, REFLECTOR_STROKE, StrokeStyle, colors};
use super::surface::DrawSurface;
use crate::settings::Settings;
use crate::sim::{Lane, ReflectorField};
use crate::viewport::ViewportTransform;

/// How the grid pass was drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridMode {
    /// Individual lines were drawn
    Lines(i64),
    /// Too many lines; the visible area was filled flat instead
    Flat(i64),
}

/// What the last frame contained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    pub grid: GridMode,
    pub lanes: usize,
    pub segments: usize,
    pub reflectors: usize,
}

/// Cell layout: the surface is split into `N x N` cells
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    pub dimension: usize,
    /// Cell size in content pixels
    pub cell: Vec2,
}

impl GridGeometry {
    pub fn new(surface_size: Vec2, dimension: usize) -> Self {
        let n = dimension.max(1) as f32;
        Self {
            dimension,
            cell: surface_size / n,
        }
    }

    /// Grid units to content pixels
    #[inline]
    pub fn to_content(&self, grid: Vec2) -> Vec2 {
        grid * self.cell
    }

    /// Reflector cell nearest a content point: the column containing it and
    /// the closest row boundary
    pub fn cell_at(&self, content: Vec2) -> (i64, i64) {
        let col = (content.x / self.cell.x).floor() as i64 + 1;
        let row = (content.y / self.cell.y).round() as i64 + 1;
        (row, col)
    }
}

/// Visible cell range `[start, end)` on each axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleCells {
    pub start_x: i64,
    pub end_x: i64,
    pub start_y: i64,
    pub end_y: i64,
}

impl VisibleCells {
    pub fn new(view: &ViewportTransform, geometry: &GridGeometry) -> Self {
        let (min, max) = view.visible_logical();
        let start = (min / geometry.cell).floor();
        let end = (max / geometry.cell).ceil();
        Self {
            start_x: start.x as i64,
            end_x: end.x as i64,
            start_y: start.y as i64,
            end_y: end.y as i64,
        }
    }

    /// Grid lines needed to cover the visible range
    pub fn line_count(&self) -> i64 {
        (self.end_x - self.start_x) + (self.end_y - self.start_y)
    }
}

/// Draws the grid, lanes and reflectors onto a [`DrawSurface`]
#[derive(Debug, Clone)]
pub struct GridRenderer {
    line_budget: i64,
    dashes: bool,
}

impl Default for GridRenderer {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}

impl GridRenderer {
    pub fn new(settings: &Settings) -> Self {
        Self {
            line_budget: settings.grid_line_budget,
            dashes: settings.quality.dashes_enabled(),
        }
    }

    /// Render a full frame
    pub fn render(
        &self,
        surface: &mut dyn DrawSurface,
        view: &ViewportTransform,
        field: &ReflectorField,
        lanes: &[Lane],
    ) -> FrameReport {
        let geometry = GridGeometry::new(view.surface_size(), field.dimension());
        let sy = view.scale().y;

        let grid = self.draw_grid(surface, view, &geometry);
        let segments = self.draw_lanes(surface, &geometry, lanes, sy);
        let reflectors = self.draw_reflectors(surface, &geometry, field, sy);

        FrameReport {
            grid,
            lanes: lanes.len(),
            segments,
            reflectors,
        }
    }

    fn apply_transform(surface: &mut dyn DrawSurface, view: &ViewportTransform) {
        let t = view.translate();
        let s = view.scale();
        surface.reset_transform();
        surface.translate(t.x, t.y);
        surface.scale(s.x, s.y);
    }

    fn draw_grid(
        &self,
        surface: &mut dyn DrawSurface,
        view: &ViewportTransform,
        geometry: &GridGeometry,
    ) -> GridMode {
        Self::apply_transform(surface, view);
        surface.begin_path();

        let width = surface.width();
        let height = surface.height();
        let visible = VisibleCells::new(view, geometry);
        let lines = visible.line_count();
        let cell = geometry.cell;

        let mode = if lines > self.line_budget {
            surface.rect(0.0, 0.0, width, height);
            surface.set_fill_color(colors::GRID_FALLBACK);
            surface.fill();
            GridMode::Flat(lines)
        } else {
            surface.set_fill_color(colors::BACKGROUND);
            surface.fill_rect(0.0, 0.0, width, height);

            let top = visible.start_y as f32 * cell.y;
            let bottom = visible.end_y as f32 * cell.y;
            for x in visible.start_x..visible.end_x {
                surface.move_to(x as f32 * cell.x, top);
                surface.line_to(x as f32 * cell.x, bottom);
            }
            let left = visible.start_x as f32 * cell.x;
            let right = visible.end_x as f32 * cell.x;
            for y in visible.start_y..visible.end_y {
                surface.move_to(left, y as f32 * cell.y);
                surface.line_to(right, y as f32 * cell.y);
            }
            GridMode::Lines(lines)
        };

        GRID_STROKE.apply(surface, view.scale().y, false);
        surface.stroke();
        mode
    }

    fn draw_lanes(
        &self,
        surface: &mut dyn DrawSurface,
        geometry: &GridGeometry,
        lanes: &[Lane],
        sy: f32,
    ) -> usize {
        let mut segments = 0;
        for lane in lanes {
            let Some(first) = lane.segments.first() else {
                continue;
            };
            StrokeStyle::lane(lane.start_row as usize).apply(surface, sy, self.dashes);

            surface.begin_path();
            let start = geometry.to_content(first.start);
            surface.move_to(start.x, start.y);
            let mut cursor = first.start;
            for segment in &lane.segments {
                if segment.start != cursor {
                    let p = geometry.to_content(segment.start);
                    surface.move_to(p.x, p.y);
                }
                let p = geometry.to_content(segment.end);
                surface.line_to(p.x, p.y);
                cursor = segment.end;
            }
            surface.stroke();
            segments += lane.segments.len();
        }
        segments
    }

    fn draw_reflectors(
        &self,
        surface: &mut dyn DrawSurface,
        geometry: &GridGeometry,
        field: &ReflectorField,
        sy: f32,
    ) -> usize {
        REFLECTOR_STROKE.apply(surface, sy, false);
        surface.begin_path();
        let mut count = 0;
        for (row, col) in field.reflectors() {
            let y = (row - 1) as f32;
            let a = geometry.to_content(Vec2::new((col - 1) as f32, y));
            let b = geometry.to_content(Vec2::new(col as f32, y));
            surface.move_to(a.x, a.y);
            surface.line_to(b.x, b.y);
            count += 1;
        }
        if count > 0 {
            surface.stroke();
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::surface::{DrawCall, Recorder};
    use crate::sim::{Cell, simulate};

    fn frame(
        view: &ViewportTransform,
        field: &ReflectorField,
    ) -> (Recorder, FrameReport) {
        let size = view.surface_size();
        let mut rec = Recorder::new(size.x, size.y);
        let lanes = simulate(field, field.dimension());
        let report = GridRenderer::default().render(&mut rec, view, field, &lanes);
        (rec, report)
    }

    #[test]
    fn test_geometry_cell_lookup() {
        let g = GridGeometry::new(Vec2::new(400.0, 400.0), 4);
        assert_eq!(g.cell, Vec2::new(100.0, 100.0));
        // Column from floor, row from the nearest boundary
        assert_eq!(g.cell_at(Vec2::new(150.0, 40.0)), (1, 2));
        assert_eq!(g.cell_at(Vec2::new(150.0, 60.0)), (2, 2));
        assert_eq!(g.cell_at(Vec2::new(399.0, 399.0)), (5, 4));
    }

    #[test]
    fn test_visible_cells_follow_viewport() {
        let mut view = ViewportTransform::new(800.0, 800.0);
        view.zoom_to(Vec2::splat(2.0));
        view.pan_to(Vec2::new(-300.0, -100.0));
        let geometry = GridGeometry::new(view.surface_size(), 8);

        // Content (150, 50)..(550, 450) in 100px cells
        let visible = VisibleCells::new(&view, &geometry);
        assert_eq!(
            visible,
            VisibleCells {
                start_x: 1,
                end_x: 6,
                start_y: 0,
                end_y: 5,
            }
        );
        assert_eq!(visible.line_count(), 10);
    }

    #[test]
    fn test_small_grid_draws_lines() {
        let view = ViewportTransform::new(400.0, 400.0);
        let field = ReflectorField::new(4);
        let (rec, report) = frame(&view, &field);

        assert_eq!(report.grid, GridMode::Lines(8));
        assert_eq!(report.lanes, 4);
        assert_eq!(report.segments, 4);
        assert_eq!(report.reflectors, 0);
        assert_eq!(rec.count(|c| matches!(c, DrawCall::FillRect(..))), 1);
        // 8 grid lines plus one move per lane
        assert_eq!(rec.count(|c| matches!(c, DrawCall::MoveTo(..))), 8 + 4);
        // Grid + 4 lanes, no reflector stroke
        assert_eq!(rec.count(|c| *c == DrawCall::Stroke), 5);
        assert_eq!(rec.calls[0], DrawCall::ResetTransform);
    }

    #[test]
    fn test_line_budget_switches_to_flat_fill() {
        // 500 + 500 lines is exactly at the budget
        let view = ViewportTransform::new(1000.0, 1000.0);
        let field = ReflectorField::new(500);
        let (_, report) = frame(&view, &field);
        assert_eq!(report.grid, GridMode::Lines(1000));

        let view = ViewportTransform::new(1024.0, 1024.0);
        let field = ReflectorField::new(512);
        let (rec, report) = frame(&view, &field);
        assert_eq!(report.grid, GridMode::Flat(1024));
        assert_eq!(rec.count(|c| matches!(c, DrawCall::FillRect(..))), 0);
        assert!(rec.calls.contains(&DrawCall::Rect(0.0, 0.0, 1024.0, 1024.0)));
        assert!(rec.calls.contains(&DrawCall::FillColor(colors::GRID_FALLBACK)));
    }

    #[test]
    fn test_zoom_shrinks_visible_range() {
        let mut view = ViewportTransform::new(800.0, 800.0);
        let field = ReflectorField::new(800);
        let (_, report) = frame(&view, &field);
        assert_eq!(report.grid, GridMode::Flat(1600));

        view.zoom_to(Vec2::splat(4.0));
        let (_, report) = frame(&view, &field);
        // 200 columns + 200 rows visible
        assert_eq!(report.grid, GridMode::Lines(400));
    }

    #[test]
    fn test_reflector_marks_follow_boundaries() {
        let view = ViewportTransform::new(300.0, 300.0);
        let mut field = ReflectorField::new(3);
        field.set(4, 2, Cell::Reflective);
        let (rec, report) = frame(&view, &field);

        assert_eq!(report.reflectors, 1);
        let n = rec.calls.len();
        assert_eq!(
            &rec.calls[n - 4..],
            &[
                DrawCall::BeginPath,
                DrawCall::MoveTo(100.0, 300.0),
                DrawCall::LineTo(200.0, 300.0),
                DrawCall::Stroke,
            ]
        );
        assert!(rec.calls.contains(&DrawCall::LineWidth(5.0)));
    }

    #[test]
    fn test_line_width_tracks_vertical_zoom() {
        let mut view = ViewportTransform::new(300.0, 300.0);
        view.zoom_to(Vec2::new(1.0, 2.0));
        let mut field = ReflectorField::new(3);
        field.set(1, 1, Cell::Reflective);
        let (rec, _) = frame(&view, &field);
        assert!(rec.calls.contains(&DrawCall::LineWidth(REFLECTOR_STROKE.width_at(2.0))));
        assert!(!rec.calls.contains(&DrawCall::LineWidth(5.0)));
    }

    #[test]
    fn test_lane_path_is_polyline() {
        let view = ViewportTransform::new(300.0, 300.0);
        let mut field = ReflectorField::new(3);
        field.set(1, 2, Cell::Reflective);
        let (rec, report) = frame(&view, &field);
        assert_eq!(report.segments, 4);

        // Lane 2: (0, 1.5) -> (1.5, 0) -> (3, 1.5) in 100px cells
        let start = rec
            .calls
            .iter()
            .position(|c| *c == DrawCall::StrokeColor(StrokeStyle::lane(2).color))
            .unwrap();
        let path: Vec<_> = rec.calls[start..]
            .iter()
            .filter(|c| matches!(c, DrawCall::MoveTo(..) | DrawCall::LineTo(..)))
            .take(3)
            .cloned()
            .collect();
        assert_eq!(
            path,
            vec![
                DrawCall::MoveTo(0.0, 150.0),
                DrawCall::LineTo(150.0, 0.0),
                DrawCall::LineTo(300.0, 150.0),
            ]
        );
    }
}
