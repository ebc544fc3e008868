//! Rendering module
//!
//! The grid renderer draws through the canvas-style [`DrawSurface`] trait.
//! On the web, frames are tessellated on the CPU and presented with WebGPU.

pub mod grid;
pub mod pipeline;
pub mod style;
pub mod surface;
pub mod tessellator;
pub mod vertex;

pub use grid::{FrameReport, GridGeometry, GridMode, GridRenderer};
pub use pipeline::RenderState;
pub use style::{Color, StrokeStyle};
pub use surface::{DrawCall, DrawSurface, Recorder};
pub use tessellator::Tessellator;
pub use vertex::Vertex;
