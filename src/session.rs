//! Interactive session
//!
//! Owns the reflector field and the viewport and turns raw input (pointer,
//! wheel, text fields, buttons) into state changes. Every entry point applies
//! its change immediately and returns an [`Update`] telling the host what to
//! refresh: the canvas always right away, the pattern dump and stats text
//! either right away or through the debouncer.

use std::fmt;
use std::num::IntErrorKind;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::consts::MAX_DIMENSION;
use crate::debounce::{Debouncer, Ticket};
use crate::renderer::{DrawSurface, FrameReport, GridGeometry, GridRenderer};
use crate::settings::Settings;
use crate::sim::{FillTarget, Lane, LaneStats, ReflectorField, simulate};
use crate::viewport::ViewportTransform;

/// Secondary displays that can be refreshed lazily
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Deferred {
    /// Serialized pattern text
    PatternDump,
    /// Lane/reflection summary
    Stats,
}

/// When a secondary display should be refreshed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Refresh {
    None,
    Now,
    /// Arm a timer for `ticket.delay_ms`, then call [`Session::fire`]
    Deferred(Ticket<Deferred>),
}

/// What the host should do after an input
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Update {
    pub redraw: bool,
    /// New lane count, when it changed
    pub dimension: Option<usize>,
    pub dump: Refresh,
    pub stats: Refresh,
}

impl Update {
    pub fn none() -> Self {
        Self {
            redraw: false,
            dimension: None,
            dump: Refresh::None,
            stats: Refresh::None,
        }
    }

    fn redraw_only() -> Self {
        Self {
            redraw: true,
            ..Self::none()
        }
    }
}

/// Rejected lane-count text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DimensionError {
    Empty,
    NotANumber(String),
    NotPositive,
    /// Past [`MAX_DIMENSION`]
    TooLarge,
}

impl fmt::Display for DimensionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DimensionError::Empty => write!(f, "lane count is empty"),
            DimensionError::NotANumber(text) => write!(f, "lane count {:?} is not a whole number", text),
            DimensionError::NotPositive => write!(f, "lane count must be at least 1"),
            DimensionError::TooLarge => write!(f, "lane count must be at most {}", MAX_DIMENSION),
        }
    }
}

impl std::error::Error for DimensionError {}

/// Parse a lane count typed by the user
pub fn parse_dimension(text: &str) -> Result<usize, DimensionError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(DimensionError::Empty);
    }
    match text.parse::<usize>() {
        Ok(0) => Err(DimensionError::NotPositive),
        Ok(n) if n > MAX_DIMENSION => Err(DimensionError::TooLarge),
        Ok(n) => Ok(n),
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Err(DimensionError::TooLarge),
        Err(_) if text.starts_with('-') && text[1..].parse::<u64>().is_ok() => {
            Err(DimensionError::NotPositive)
        }
        Err(_) => Err(DimensionError::NotANumber(text.to_string())),
    }
}

/// Pointer gesture in progress
#[derive(Debug, Clone, Copy)]
struct Drag {
    /// Translation when the pointer went down
    anchor: Vec2,
    start: Vec2,
    dragging: bool,
}

/// One user session: field, viewport and input state
#[derive(Debug)]
pub struct Session {
    settings: Settings,
    field: ReflectorField,
    view: ViewportTransform,
    renderer: GridRenderer,
    debouncer: Debouncer<Deferred>,
    drag: Option<Drag>,
}

impl Session {
    pub fn new(settings: Settings, surface_width: f32, surface_height: f32) -> Self {
        let field = ReflectorField::new(settings.default_dimension);
        log::info!(
            "Session created: {} lanes on a {}x{} surface",
            field.dimension(),
            surface_width,
            surface_height
        );
        Self {
            renderer: GridRenderer::new(&settings),
            debouncer: Debouncer::new(settings.debounce_ms),
            view: ViewportTransform::new(surface_width, surface_height),
            field,
            settings,
            drag: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn field(&self) -> &ReflectorField {
        &self.field
    }

    pub fn view(&self) -> &ViewportTransform {
        &self.view
    }

    pub fn dimension(&self) -> usize {
        self.field.dimension()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some_and(|d| d.dragging)
    }

    /// Current trajectories
    pub fn lanes(&self) -> Vec<Lane> {
        simulate(&self.field, self.field.dimension())
    }

    /// Serialized pattern for the dump display
    pub fn pattern_text(&self) -> String {
        self.field.serialize()
    }

    /// Summary for the stats display
    pub fn stats_text(&self) -> String {
        let stats = LaneStats::from_lanes(&self.lanes());
        format!("{}, {} reflectors", stats.summary(), self.field.reflector_count())
    }

    /// Draw the current state
    pub fn render(&self, surface: &mut dyn DrawSurface) -> FrameReport {
        let lanes = self.lanes();
        self.renderer.render(surface, &self.view, &self.field, &lanes)
    }

    /// The drawing surface changed size
    pub fn resize_surface(&mut self, width: f32, height: f32) -> Update {
        self.view.set_surface_size(width, height);
        Update::redraw_only()
    }

    // --- Deferred work -------------------------------------------------

    /// A host timer elapsed; true if the display should be refreshed now
    pub fn fire(&mut self, ticket: Ticket<Deferred>) -> bool {
        self.debouncer.fire(ticket)
    }

    /// Frame-loop alternative to [`Session::fire`]
    pub fn poll(&mut self, now_ms: f64) -> Vec<Deferred> {
        self.debouncer.poll(now_ms)
    }

    /// Whether a deferred refresh is still waiting
    pub fn is_pending(&self, key: Deferred) -> bool {
        self.debouncer.is_pending(key)
    }

    fn dump_refresh(&mut self, now_ms: f64) -> Refresh {
        if self.field.dimension() > self.settings.soft_dimension_ceiling {
            Refresh::Deferred(self.debouncer.schedule(Deferred::PatternDump, now_ms))
        } else {
            self.debouncer.cancel(Deferred::PatternDump);
            Refresh::Now
        }
    }

    /// Redraw now, refresh the dump (maybe lazily) and the stats lazily
    fn field_changed(&mut self, now_ms: f64) -> Update {
        Update {
            redraw: true,
            dimension: None,
            dump: self.dump_refresh(now_ms),
            stats: Refresh::Deferred(self.debouncer.schedule(Deferred::Stats, now_ms)),
        }
    }

    // --- Pointer --------------------------------------------------------

    pub fn on_pointer_down(&mut self, screen: Vec2) {
        if !self.settings.drag_enabled {
            return;
        }
        self.drag = Some(Drag {
            anchor: self.view.translate(),
            start: screen,
            dragging: false,
        });
    }

    pub fn on_pointer_move(&mut self, screen: Vec2) -> Update {
        let Some(mut drag) = self.drag else {
            return Update::none();
        };
        self.view.pan_by(drag.anchor, screen - drag.start);
        if self.view.translate() != drag.anchor {
            drag.dragging = true;
        }
        self.drag = Some(drag);
        Update::redraw_only()
    }

    /// Pointer released over the surface: ends any drag, clicks otherwise
    pub fn on_pointer_up(&mut self, screen: Vec2, origin: Vec2, now_ms: f64) -> Update {
        let was_drag = self.drag.take().is_some_and(|d| d.dragging);
        if was_drag && self.settings.drag_enabled {
            return Update::none();
        }
        self.click(screen, origin, now_ms)
    }

    /// Pointer released away from the surface
    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    /// Toggle the reflector nearest a screen point
    pub fn click(&mut self, screen: Vec2, origin: Vec2, now_ms: f64) -> Update {
        let logical = self.view.screen_to_logical(screen, origin);
        let geometry = GridGeometry::new(self.view.surface_size(), self.field.dimension());
        let (row, col) = geometry.cell_at(logical);
        match self.field.toggle(row, col) {
            Some(cell) => {
                log::debug!("Toggled ({}, {}) -> {:?}", row, col, cell);
                self.field_changed(now_ms)
            }
            None => Update::none(),
        }
    }

    pub fn on_wheel(&mut self, delta_y: f32, screen: Vec2, origin: Vec2) -> Update {
        if !self.settings.zoom_enabled || !delta_y.is_finite() {
            return Update::none();
        }
        let zoom = -delta_y * self.settings.wheel_zoom_sensitivity;
        let target = self.view.scale() + Vec2::splat(zoom);
        self.view.zoom_anchored(screen, origin, target);
        log::debug!("Zoom -> {:?}", self.view.scale());
        Update::redraw_only()
    }

    // --- Text inputs and buttons ---------------------------------------

    /// Lane-count text field changed
    pub fn set_dimension(&mut self, text: &str, now_ms: f64) -> Result<Update, DimensionError> {
        match parse_dimension(text) {
            Ok(n) => Ok(self.request_dimension(n, now_ms)),
            Err(e) => {
                log::warn!("Ignoring lane count: {}", e);
                Err(e)
            }
        }
    }

    /// Resize and refresh every display immediately
    pub fn apply_dimension(&mut self, dimension: usize) -> Update {
        if !self.resize(dimension) {
            return Update::none();
        }
        self.debouncer.cancel(Deferred::PatternDump);
        self.debouncer.cancel(Deferred::Stats);
        Update {
            redraw: true,
            dimension: Some(dimension),
            dump: Refresh::Now,
            stats: Refresh::Now,
        }
    }

    /// Resize now; past the soft ceiling the dump waits for input to settle
    pub fn request_dimension(&mut self, dimension: usize, now_ms: f64) -> Update {
        if !self.resize(dimension) {
            return Update::none();
        }
        Update {
            dimension: Some(dimension),
            ..self.field_changed(now_ms)
        }
    }

    fn resize(&mut self, dimension: usize) -> bool {
        let previous = self.field.dimension();
        if !self.field.resize(dimension) {
            log::warn!("Rejected lane count {}", dimension);
            return false;
        }
        if previous != dimension {
            log::info!("Lane count {} -> {}", previous, dimension);
        }
        true
    }

    /// Pattern text area committed
    pub fn load_pattern(&mut self, text: &str, now_ms: f64) -> Update {
        if !self.field.deserialize(text) {
            log::warn!("Ignoring pattern: empty or wider than {} lanes", MAX_DIMENSION);
            return Update::none();
        }
        log::info!(
            "Loaded pattern: {} lanes, {} reflectors",
            self.field.dimension(),
            self.field.reflector_count()
        );
        Update {
            dimension: Some(self.field.dimension()),
            ..self.field_changed(now_ms)
        }
    }

    pub fn fill_row(&mut self, target: FillTarget, now_ms: f64) -> Update {
        self.field.fill_row(target);
        log::info!("Filled {:?} row", target);
        self.field_changed(now_ms)
    }

    pub fn clear(&mut self, now_ms: f64) -> Update {
        self.field.clear();
        log::info!("Cleared reflectors");
        self.field_changed(now_ms)
    }

    /// Replace the pattern with a seeded random one
    pub fn scatter(&mut self, seed: u64, density: f64, now_ms: f64) -> Update {
        let mut rng = Pcg32::seed_from_u64(seed);
        self.field.scatter(&mut rng, density);
        log::info!(
            "Scattered {} reflectors (seed {}, density {})",
            self.field.reflector_count(),
            seed,
            density
        );
        self.field_changed(now_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Cell;

    fn session(n: usize) -> Session {
        let settings = Settings {
            default_dimension: n,
            ..Settings::default()
        };
        Session::new(settings, 400.0, 400.0)
    }

    #[test]
    fn test_parse_dimension() {
        assert_eq!(parse_dimension(" 12 "), Ok(12));
        assert_eq!(parse_dimension(""), Err(DimensionError::Empty));
        assert_eq!(parse_dimension("0"), Err(DimensionError::NotPositive));
        assert_eq!(parse_dimension("-4"), Err(DimensionError::NotPositive));
        assert_eq!(
            parse_dimension("12.0"),
            Err(DimensionError::NotANumber("12.0".into()))
        );
        assert!(matches!(parse_dimension("abc"), Err(DimensionError::NotANumber(_))));
        assert_eq!(parse_dimension(&MAX_DIMENSION.to_string()), Ok(MAX_DIMENSION));
        assert_eq!(
            parse_dimension(&(MAX_DIMENSION + 1).to_string()),
            Err(DimensionError::TooLarge)
        );
        assert_eq!(parse_dimension("18446744073709551615"), Err(DimensionError::TooLarge));
        assert_eq!(parse_dimension("99999999999999999999999"), Err(DimensionError::TooLarge));
    }

    #[test]
    fn test_click_toggles_nearest_reflector() {
        let mut s = session(4);
        // 100px cells: x=150 -> column 2, y=95 -> nearest boundary row 2
        let update = s.on_pointer_up(Vec2::new(150.0, 95.0), Vec2::ZERO, 0.0);
        assert!(update.redraw);
        assert_eq!(update.dump, Refresh::Now);
        assert!(matches!(update.stats, Refresh::Deferred(_)));
        assert_eq!(s.field().get(2, 2), Cell::Reflective);

        s.on_pointer_up(Vec2::new(150.0, 95.0), Vec2::ZERO, 1.0);
        assert_eq!(s.field().get(2, 2), Cell::Empty);
    }

    #[test]
    fn test_click_respects_viewport() {
        let mut s = session(4);
        s.on_wheel(-100.0, Vec2::ZERO, Vec2::ZERO);
        // Scale 4 anchored at the origin: screen (150, 0) is content (37.5, 0)
        assert_eq!(s.view().scale(), Vec2::splat(4.0));
        s.on_pointer_up(Vec2::new(150.0, 0.0), Vec2::ZERO, 0.0);
        assert_eq!(s.field().get(1, 1), Cell::Reflective);
    }

    #[test]
    fn test_drag_pans_without_toggling() {
        let mut s = session(4);
        s.on_wheel(-100.0, Vec2::ZERO, Vec2::ZERO);

        s.on_pointer_down(Vec2::new(200.0, 200.0));
        let update = s.on_pointer_move(Vec2::new(150.0, 180.0));
        assert!(update.redraw);
        assert!(s.is_dragging());
        assert_eq!(s.view().translate(), Vec2::new(-50.0, -20.0));

        let update = s.on_pointer_up(Vec2::new(150.0, 180.0), Vec2::ZERO, 0.0);
        assert!(!update.redraw);
        assert_eq!(s.field().reflector_count(), 0);
    }

    #[test]
    fn test_clamped_drag_still_clicks() {
        let mut s = session(4);
        // At scale 1 nothing can pan, so the gesture stays a click
        s.on_pointer_down(Vec2::new(50.0, 0.0));
        s.on_pointer_move(Vec2::new(80.0, 30.0));
        assert!(!s.is_dragging());
        s.on_pointer_up(Vec2::new(80.0, 30.0), Vec2::ZERO, 0.0);
        assert_eq!(s.field().get(1, 1), Cell::Reflective);
    }

    #[test]
    fn test_wheel_disabled() {
        let settings = Settings {
            zoom_enabled: false,
            ..Settings::default()
        };
        let mut s = Session::new(settings, 400.0, 400.0);
        assert_eq!(s.on_wheel(-100.0, Vec2::ZERO, Vec2::ZERO), Update::none());
        assert_eq!(s.view().scale(), Vec2::ONE);
    }

    #[test]
    fn test_wheel_zoom_out_floors_at_one() {
        let mut s = session(4);
        s.on_wheel(500.0, Vec2::new(10.0, 10.0), Vec2::ZERO);
        assert_eq!(s.view().scale(), Vec2::ONE);
    }

    #[test]
    fn test_dimension_over_soft_ceiling_defers_dump() {
        let mut s = session(4);
        let update = s.set_dimension("10", 0.0).unwrap();
        assert_eq!(update.dimension, Some(10));
        assert_eq!(update.dump, Refresh::Now);

        let update = s.set_dimension("600", 10.0).unwrap();
        assert_eq!(s.dimension(), 600);
        assert!(update.redraw);
        let Refresh::Deferred(first) = update.dump else {
            panic!("expected deferred dump, got {:?}", update.dump);
        };

        let Refresh::Deferred(second) = s.set_dimension("601", 20.0).unwrap().dump else {
            panic!("expected deferred dump");
        };
        // Only the latest keystroke refreshes the dump
        assert!(!s.fire(first));
        assert!(s.fire(second));
    }

    #[test]
    fn test_apply_dimension_is_immediate() {
        let mut s = session(4);
        s.fill_row(FillTarget::Top, 0.0);
        assert!(s.is_pending(Deferred::Stats));

        let update = s.apply_dimension(700);
        assert_eq!(update.dump, Refresh::Now);
        assert_eq!(update.stats, Refresh::Now);
        assert!(!s.is_pending(Deferred::Stats));
        assert!(s.poll(f64::MAX).is_empty());
    }

    #[test]
    fn test_huge_dimension_is_rejected_without_panicking() {
        let mut s = session(4);
        assert_eq!(
            s.set_dimension("18446744073709551615", 0.0),
            Err(DimensionError::TooLarge)
        );
        assert_eq!(s.apply_dimension(usize::MAX), Update::none());
        assert_eq!(s.request_dimension(MAX_DIMENSION + 1, 0.0), Update::none());
        assert_eq!(s.dimension(), 4);
    }

    #[test]
    fn test_invalid_dimension_is_rejected() {
        let mut s = session(4);
        assert!(s.set_dimension("nope", 0.0).is_err());
        assert!(s.set_dimension("0", 0.0).is_err());
        assert_eq!(s.dimension(), 4);
    }

    #[test]
    fn test_stats_are_debounced() {
        let mut s = session(3);
        s.fill_row(FillTarget::Top, 0.0);
        s.fill_row(FillTarget::Bottom, 100.0);
        assert!(s.poll(300.0).is_empty());
        assert_eq!(s.poll(350.0), vec![Deferred::Stats]);
        assert_eq!(s.stats_text(), "3 lanes, 3 reflections, 6 reflectors");
    }

    #[test]
    fn test_load_pattern_and_dump() {
        let mut s = session(4);
        let update = s.load_pattern("110\n001\n000\n000", 0.0);
        assert_eq!(update.dimension, Some(3));
        assert_eq!(s.pattern_text(), "110\n001\n000\n000");
        assert_eq!(s.load_pattern("", 0.0), Update::none());
    }

    #[test]
    fn test_scatter_is_reproducible() {
        let mut a = session(6);
        let mut b = session(6);
        a.scatter(7, 0.4, 0.0);
        b.scatter(7, 0.4, 0.0);
        assert_eq!(a.pattern_text(), b.pattern_text());
        a.clear(0.0);
        assert_eq!(a.field().reflector_count(), 0);
    }
}
