//! Path tessellation for the GPU backend
//!
//! Implements [`DrawSurface`] on the CPU by turning canvas-style paths into a
//! triangle list. Strokes are expanded into quads in user space and only then
//! pushed through the current transform, so a non-uniform scale stretches line
//! width the same way a 2D canvas does. Output positions are in NDC.

use glam::Vec2;

use super::style::{Color, colors};
use super::surface::DrawSurface;
use super::vertex::Vertex;

#[derive(Debug, Clone, Default)]
struct SubPath {
    points: Vec<Vec2>,
    closed: bool,
}

/// CPU tessellator targeting a `width x height` pixel surface
#[derive(Debug, Clone)]
pub struct Tessellator {
    size: Vec2,
    translate: Vec2,
    scale: Vec2,
    path: Vec<SubPath>,
    stroke_color: Color,
    fill_color: Color,
    line_width: f32,
    dash: Vec<f32>,
    vertices: Vec<Vertex>,
    max_vertices: usize,
    /// Triangles skipped this frame because of the vertex cap
    dropped: usize,
}

impl Tessellator {
    pub fn new(width: f32, height: f32, max_vertices: usize) -> Self {
        Self {
            size: Vec2::new(width, height),
            translate: Vec2::ZERO,
            scale: Vec2::ONE,
            path: Vec::new(),
            stroke_color: colors::BLACK,
            fill_color: colors::BLACK,
            line_width: 1.0,
            dash: Vec::new(),
            vertices: Vec::new(),
            max_vertices,
            dropped: 0,
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.size = Vec2::new(width, height);
    }

    /// Take this frame's vertices, leaving the tessellator ready for the next
    pub fn finish(&mut self) -> Vec<Vertex> {
        if self.dropped > 0 {
            log::warn!(
                "Vertex cap {} reached, dropped {} triangles",
                self.max_vertices,
                self.dropped
            );
            self.dropped = 0;
        }
        self.path.clear();
        std::mem::take(&mut self.vertices)
    }

    /// Vertices produced so far this frame
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// User space to surface pixels
    #[inline]
    fn to_device(&self, p: Vec2) -> Vec2 {
        p * self.scale + self.translate
    }

    /// Surface pixels to normalized device coordinates (y up)
    #[inline]
    fn to_ndc(&self, p: Vec2) -> Vec2 {
        Vec2::new(p.x / self.size.x * 2.0 - 1.0, 1.0 - p.y / self.size.y * 2.0)
    }

    fn push_triangle(&mut self, a: Vec2, b: Vec2, c: Vec2, color: Color) {
        if self.vertices.len() + 3 > self.max_vertices {
            self.dropped += 1;
            return;
        }
        for p in [a, b, c] {
            let ndc = self.to_ndc(self.to_device(p));
            self.vertices.push(Vertex::new(ndc.x, ndc.y, color));
        }
    }

    /// Quad covering the line from `a` to `b` with the current width
    fn push_line(&mut self, a: Vec2, b: Vec2) {
        let dir = (b - a).normalize_or_zero();
        if dir == Vec2::ZERO {
            return;
        }
        let perp = Vec2::new(-dir.y, dir.x) * (self.line_width / 2.0);
        let color = self.stroke_color;

        let a1 = a + perp;
        let a2 = a - perp;
        let b1 = b + perp;
        let b2 = b - perp;
        self.push_triangle(a1, a2, b1, color);
        self.push_triangle(b1, a2, b2, color);
    }

    /// Canvas dash semantics: odd patterns repeat twice, invalid ones mean solid
    fn effective_dash(&self) -> Option<Vec<f32>> {
        if self.dash.is_empty()
            || self.dash.iter().any(|d| !d.is_finite() || *d < 0.0)
            || self.dash.iter().sum::<f32>() <= 0.0
        {
            return None;
        }
        let mut pattern = self.dash.clone();
        if pattern.len() % 2 == 1 {
            pattern.extend_from_within(..);
        }
        Some(pattern)
    }

    fn stroke_edges(&mut self, edges: &[(Vec2, Vec2)]) {
        let Some(pattern) = self.effective_dash() else {
            for &(a, b) in edges {
                self.push_line(a, b);
            }
            return;
        };

        let mut index = 0;
        let mut remaining = pattern[0];
        let mut on = true;
        for &(a, b) in edges {
            let length = a.distance(b);
            if length <= 0.0 {
                continue;
            }
            let dir = (b - a) / length;
            let mut pos = 0.0;
            while pos < length {
                if self.vertices.len() + 6 > self.max_vertices {
                    self.dropped += 1;
                    return;
                }
                let step = remaining.min(length - pos);
                if on && step > 0.0 {
                    self.push_line(a + dir * pos, a + dir * (pos + step));
                }
                pos += step;
                remaining -= step;
                if remaining <= 0.0 {
                    index = (index + 1) % pattern.len();
                    remaining = pattern[index];
                    on = !on;
                }
            }
        }
    }
}

impl DrawSurface for Tessellator {
    fn width(&self) -> f32 {
        self.size.x
    }

    fn height(&self) -> f32 {
        self.size.y
    }

    fn reset_transform(&mut self) {
        self.translate = Vec2::ZERO;
        self.scale = Vec2::ONE;
    }

    fn translate(&mut self, x: f32, y: f32) {
        self.translate += self.scale * Vec2::new(x, y);
    }

    fn scale(&mut self, x: f32, y: f32) {
        self.scale *= Vec2::new(x, y);
    }

    fn begin_path(&mut self) {
        self.path.clear();
    }

    fn move_to(&mut self, x: f32, y: f32) {
        self.path.push(SubPath {
            points: vec![Vec2::new(x, y)],
            closed: false,
        });
    }

    fn line_to(&mut self, x: f32, y: f32) {
        match self.path.last_mut() {
            Some(sub) if !sub.closed => sub.points.push(Vec2::new(x, y)),
            _ => self.move_to(x, y),
        }
    }

    fn rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.path.push(SubPath {
            points: vec![
                Vec2::new(x, y),
                Vec2::new(x + w, y),
                Vec2::new(x + w, y + h),
                Vec2::new(x, y + h),
            ],
            closed: true,
        });
    }

    fn fill(&mut self) {
        let color = self.fill_color;
        let subpaths = std::mem::take(&mut self.path);
        for sub in &subpaths {
            // Fan triangulation; paths here are convex
            if let Some((&first, rest)) = sub.points.split_first() {
                for pair in rest.windows(2) {
                    self.push_triangle(first, pair[0], pair[1], color);
                }
            }
        }
        self.path = subpaths;
    }

    fn stroke(&mut self) {
        let subpaths = std::mem::take(&mut self.path);
        for sub in &subpaths {
            let mut edges: Vec<(Vec2, Vec2)> =
                sub.points.windows(2).map(|w| (w[0], w[1])).collect();
            if sub.closed && sub.points.len() > 2 {
                edges.push((sub.points[sub.points.len() - 1], sub.points[0]));
            }
            self.stroke_edges(&edges);
        }
        self.path = subpaths;
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        let color = self.fill_color;
        let a = Vec2::new(x, y);
        let b = Vec2::new(x + w, y);
        let c = Vec2::new(x + w, y + h);
        let d = Vec2::new(x, y + h);
        self.push_triangle(a, b, c, color);
        self.push_triangle(a, c, d, color);
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.stroke_color = color;
    }

    fn set_fill_color(&mut self, color: Color) {
        self.fill_color = color;
    }

    fn set_line_width(&mut self, width: f32) {
        if width.is_finite() && width > 0.0 {
            self.line_width = width;
        }
    }

    fn set_line_dash(&mut self, dash: &[f32]) {
        self.dash = dash.to_vec();
    }
}
