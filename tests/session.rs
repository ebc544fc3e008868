//! End-to-end session behavior over a recording surface

use glam::Vec2;

use railgun_reflectors::debounce::Ticket;
use railgun_reflectors::renderer::style::colors;
use railgun_reflectors::renderer::{DrawCall, GridMode, Recorder, Tessellator};
use railgun_reflectors::session::Deferred;
use railgun_reflectors::sim::{Cell, FillTarget};
use railgun_reflectors::{QualityPreset, Refresh, Session, Settings};

const SIZE: f32 = 600.0;

fn session_with(settings: Settings) -> Session {
    Session::new(settings, SIZE, SIZE)
}

fn session(n: usize) -> Session {
    session_with(Settings {
        default_dimension: n,
        ..Settings::default()
    })
}

fn frame(session: &Session) -> (Recorder, railgun_reflectors::renderer::FrameReport) {
    let mut rec = Recorder::new(SIZE, SIZE);
    let report = session.render(&mut rec);
    (rec, report)
}

fn deferred(refresh: Refresh) -> Ticket<Deferred> {
    match refresh {
        Refresh::Deferred(ticket) => ticket,
        other => panic!("expected a deferred refresh, got {:?}", other),
    }
}

#[test]
fn startup_draws_default_grid() {
    let s = session_with(Settings::default());
    let (rec, report) = frame(&s);
    assert_eq!(s.dimension(), 10);
    assert_eq!(report.grid, GridMode::Lines(20));
    assert_eq!(report.lanes, 10);
    assert_eq!(report.reflectors, 0);
    assert_eq!(rec.calls[0], DrawCall::ResetTransform);
}

#[test]
fn pattern_load_render_and_dump() {
    let mut s = session(4);
    let update = s.load_pattern("010\n000\n000\n000\n", 0.0);
    assert!(update.redraw);
    assert_eq!(update.dimension, Some(3));
    assert_eq!(update.dump, Refresh::Now);

    let (rec, report) = frame(&s);
    assert_eq!(report.reflectors, 1);
    // Lane 2 bounces off (1, 2), the others run straight
    assert_eq!(report.segments, 4);
    assert!(rec.calls.contains(&DrawCall::StrokeColor(colors::REFLECTOR)));
    assert_eq!(s.pattern_text(), "010\n000\n000\n000");
}

#[test]
fn clicks_toggle_cells_and_refresh_displays() {
    let mut s = session(3);
    // 200px cells; (450, 390) is column 3, nearest boundary row 3
    let update = s.on_pointer_up(Vec2::new(450.0, 390.0), Vec2::ZERO, 0.0);
    assert!(update.redraw);
    assert_eq!(s.field().get(3, 3), Cell::Reflective);
    assert_eq!(s.pattern_text(), "000\n000\n001\n000");

    // Same point through a page offset
    let origin = Vec2::new(30.0, 70.0);
    s.on_pointer_up(Vec2::new(480.0, 460.0), origin, 10.0);
    assert_eq!(s.field().get(3, 3), Cell::Empty);
}

#[test]
fn drag_then_click_lands_in_panned_content() {
    let mut s = session(3);
    s.on_wheel(-100.0, Vec2::ZERO, Vec2::ZERO);
    assert_eq!(s.view().scale(), Vec2::splat(4.0));

    s.on_pointer_down(Vec2::new(300.0, 300.0));
    s.on_pointer_move(Vec2::new(100.0, 100.0));
    let update = s.on_pointer_up(Vec2::new(100.0, 100.0), Vec2::ZERO, 0.0);
    assert_eq!(update.dump, Refresh::None);
    assert_eq!(s.view().translate(), Vec2::new(-200.0, -200.0));
    assert_eq!(s.field().reflector_count(), 0);

    // Screen (0, 0) now shows content (50, 50): column 1, row 1
    s.on_pointer_up(Vec2::ZERO, Vec2::ZERO, 0.0);
    assert_eq!(s.field().get(1, 1), Cell::Reflective);
}

#[test]
fn drag_disabled_always_clicks() {
    let mut s = session_with(Settings {
        default_dimension: 3,
        drag_enabled: false,
        ..Settings::default()
    });
    s.on_wheel(-100.0, Vec2::ZERO, Vec2::ZERO);
    s.on_pointer_down(Vec2::new(300.0, 300.0));
    assert!(!s.on_pointer_move(Vec2::new(100.0, 100.0)).redraw);
    assert_eq!(s.view().translate(), Vec2::ZERO);
    s.on_pointer_up(Vec2::new(100.0, 100.0), Vec2::ZERO, 0.0);
    assert_eq!(s.field().reflector_count(), 1);
}

#[test]
fn large_grid_defers_dump_and_falls_back_to_flat_fill() {
    let mut s = session(10);
    let update = s.set_dimension("600", 0.0).unwrap();
    assert_eq!(update.dimension, Some(600));
    let dump = deferred(update.dump);
    let stats = deferred(update.stats);
    assert_eq!(dump.delay_ms, 250.0);

    let (rec, report) = frame(&s);
    assert_eq!(report.grid, GridMode::Flat(1200));
    assert!(rec.calls.contains(&DrawCall::FillColor(colors::GRID_FALLBACK)));

    // A second keystroke inside the window supersedes both tickets
    let update = s.set_dimension("601", 100.0).unwrap();
    assert!(!s.fire(dump));
    assert!(!s.fire(stats));
    assert!(s.fire(deferred(update.dump)));
    assert!(s.fire(deferred(update.stats)));
}

#[test]
fn poll_drains_due_refreshes() {
    let mut s = session(600);
    s.fill_row(FillTarget::Top, 0.0);
    assert!(s.poll(249.0).is_empty());
    let mut due = s.poll(250.0);
    due.sort_by_key(|k| *k == Deferred::Stats);
    assert_eq!(due, vec![Deferred::PatternDump, Deferred::Stats]);
    assert!(s.poll(1000.0).is_empty());
}

#[test]
fn rejected_dimension_leaves_state_alone() {
    let mut s = session(5);
    s.fill_row(FillTarget::Bottom, 0.0);
    for bad in ["", "  ", "zero", "0", "-3", "2.5"] {
        assert!(s.set_dimension(bad, 0.0).is_err(), "{:?} accepted", bad);
    }
    assert_eq!(s.dimension(), 5);
    assert_eq!(s.field().reflector_count(), 5);
}

#[test]
fn resize_keeps_overlapping_reflectors() {
    let mut s = session(3);
    s.load_pattern("100\n010\n001\n111", 0.0);
    s.apply_dimension(2);
    assert_eq!(s.pattern_text(), "10\n01\n00");
    s.apply_dimension(4);
    assert_eq!(s.pattern_text(), "1000\n0100\n0000\n0000\n0000");
}

#[test]
fn thirteenth_lane_switches_dash_pattern() {
    let mut s = session(13);
    let (rec, _) = frame(&s);
    assert!(rec.calls.contains(&DrawCall::LineDash(vec![5.0, 5.0])));

    s = session_with(Settings {
        default_dimension: 13,
        quality: QualityPreset::Low,
        ..Settings::default()
    });
    let (rec, _) = frame(&s);
    assert!(!rec.calls.contains(&DrawCall::LineDash(vec![5.0, 5.0])));
}

#[test]
fn tessellated_frame_starts_with_background() {
    let mut s = session(4);
    s.fill_row(FillTarget::Top, 0.0);
    let mut t = Tessellator::new(SIZE, SIZE, QualityPreset::Medium.max_vertices());
    s.render(&mut t);
    let vertices = t.finish();
    assert!(!vertices.is_empty());
    assert_eq!(vertices.len() % 3, 0);
    assert!(vertices[..6].iter().all(|v| v.color == colors::BACKGROUND));
    assert!(vertices.iter().any(|v| v.color == colors::REFLECTOR));
}

#[test]
fn scatter_is_seeded() {
    let mut a = session(8);
    let mut b = session(8);
    a.scatter(1234, 0.5, 0.0);
    b.scatter(1234, 0.5, 0.0);
    assert_eq!(a.pattern_text(), b.pattern_text());
    assert!(a.field().reflector_count() > 0);
    b.scatter(1234, 0.0, 0.0);
    assert_eq!(b.field().reflector_count(), 0);
}
