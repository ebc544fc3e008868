//! Railgun trajectory tracing
//!
//! Each lane fires from the left edge at its starting row heading upward and
//! advances one row per column. When the row boundary it is about to cross
//! holds a reflector, the rail bounces instead of advancing.
//!
//! Coordinates are in grid units: x is the column boundary (0..=N), y is the
//! row boundary shifted by half a cell so lane centers sit between reflector
//! lines.

use glam::Vec2;

use super::field::ReflectorField;

/// A straight piece of a lane's polyline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Vec2,
    pub end: Vec2,
}

impl Segment {
    pub fn new(start: Vec2, end: Vec2) -> Self {
        Self { start, end }
    }
}

/// Trajectory of one railgun
#[derive(Debug, Clone, PartialEq)]
pub struct Lane {
    /// Starting row (1-indexed), also the lane's identity
    pub start_row: i64,
    /// Polyline pieces, left to right
    pub segments: Vec<Segment>,
    /// Rail row after the last column
    pub exit_row: i64,
    /// Number of bounces along the way
    pub reflections: usize,
}

/// Trace every lane `1..=dimension` through the field
pub fn simulate(field: &ReflectorField, dimension: usize) -> Vec<Lane> {
    (1..=dimension as i64)
        .map(|start_row| trace_lane(field, dimension, start_row))
        .collect()
}

/// Trace a single lane starting at `start_row`
pub fn trace_lane(field: &ReflectorField, dimension: usize, start_row: i64) -> Lane {
    let n = dimension as i64;
    let mut segments = Vec::new();
    let mut reflections = 0;

    let mut rail_row = start_row;
    let mut direction: i64 = -1;
    let mut previous = Vec2::new(0.0, start_row as f32);

    for column in 1..=n {
        let half_row = rail_row as f32 + direction as f32 / 2.0;
        let reflector_row = if direction == 1 { rail_row + 1 } else { rail_row };

        if (1..=n + 1).contains(&reflector_row) && field.get(reflector_row, column).is_reflective() {
            direction = -direction;
            reflections += 1;

            let bend = Vec2::new(column as f32 - 0.5, half_row);
            segments.push(Segment::new(
                Vec2::new(previous.x, previous.y - 0.5),
                Vec2::new(bend.x, bend.y - 0.5),
            ));
            previous = bend;
        } else {
            rail_row += direction;
        }

        if column == n {
            segments.push(Segment::new(
                Vec2::new(previous.x, previous.y - 0.5),
                Vec2::new(column as f32, rail_row as f32 - 0.5),
            ));
        }
    }

    Lane {
        start_row,
        segments,
        exit_row: rail_row,
        reflections,
    }
}

/// Aggregate numbers for the stats display
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LaneStats {
    pub lanes: usize,
    pub reflections: usize,
    /// Exit row per lane, in lane order
    pub exits: Vec<i64>,
}

impl LaneStats {
    pub fn from_lanes(lanes: &[Lane]) -> Self {
        Self {
            lanes: lanes.len(),
            reflections: lanes.iter().map(|l| l.reflections).sum(),
            exits: lanes.iter().map(|l| l.exit_row).collect(),
        }
    }

    /// One-line summary for the page
    pub fn summary(&self) -> String {
        format!(
            "{} lanes, {} reflections",
            self.lanes, self.reflections
        )
    }
}
