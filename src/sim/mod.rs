//! Deterministic simulation module
//!
//! The reflector grid and the railgun tracer. This module must be pure and deterministic:
//! - No randomness except through a caller-supplied seeded RNG
//! - No state carried between `simulate` calls
//! - No rendering or platform dependencies

pub mod field;
pub mod trajectory;

pub use field::{Cell, FillTarget, ReflectorField};
pub use trajectory::{Lane, LaneStats, Segment, simulate, trace_lane};
