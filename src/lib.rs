//! Railgun Reflectors - interactive railgun/reflector trajectory grid
//!
//! Core modules:
//! - `sim`: Reflector field and deterministic trajectory tracing
//! - `viewport`: Pan/zoom transform between screen and grid space
//! - `renderer`: Grid drawing over a canvas-style surface, WebGPU backend
//! - `session`: Input handling that ties the pieces together
//! - `debounce`: Trailing-edge coalescing for secondary display updates

pub mod debounce;
pub mod renderer;
pub mod session;
pub mod settings;
pub mod sim;
pub mod viewport;

pub use session::{DimensionError, Refresh, Session, Update, parse_dimension};
pub use settings::{QualityPreset, Settings};
pub use viewport::ViewportTransform;

/// Application configuration constants
pub mod consts {
    /// Lane count at startup
    pub const DEFAULT_DIMENSION: usize = 10;
    /// Largest accepted lane count
    pub const MAX_DIMENSION: usize = 4096;
    /// Above this many lanes the textual pattern dump is debounced
    pub const SOFT_DIMENSION_CEILING: usize = 532;
    /// Quiet window for debounced display updates (ms)
    pub const DEBOUNCE_MS: f64 = 250.0;
    /// Scale change per unit of wheel delta
    pub const WHEEL_ZOOM_SENSITIVITY: f32 = 0.03;
    /// Visible grid line count above which the grid collapses to a flat fill
    pub const GRID_LINE_BUDGET: i64 = 1000;
    /// Minimum scale on either axis
    pub const MIN_SCALE: f32 = 1.0;
    /// Reflective share of cells for the scatter button
    pub const SCATTER_DENSITY: f64 = 0.15;
}
