//! Railgun Reflectors entry point
//!
//! Wires the page (canvas, inputs, buttons) to a [`Session`] on the web and
//! runs a small headless demo natively.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod web_app {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        Document, HtmlCanvasElement, HtmlInputElement, HtmlTextAreaElement, MouseEvent, WheelEvent,
        Window,
    };

    use railgun_reflectors::consts::SCATTER_DENSITY;
    use railgun_reflectors::debounce::Ticket;
    use railgun_reflectors::renderer::{RenderState, Tessellator};
    use railgun_reflectors::session::{Deferred, Refresh, parse_dimension};
    use railgun_reflectors::sim::FillTarget;
    use railgun_reflectors::{Session, Settings, Update};

    const CANVAS_ID: &str = "railgun-canvas";
    const COUNT_INPUT_ID: &str = "input-railgun-count";
    const PATTERN_INPUT_ID: &str = "input-reflectors";
    const COUNT_DISPLAY_ID: &str = "railgun-count-display";
    const PATTERN_DISPLAY_ID: &str = "reflectors-display";
    const STATS_DISPLAY_ID: &str = "railgun-stats";

    /// Page state shared by every handler
    struct App {
        session: Session,
        canvas: HtmlCanvasElement,
        render_state: Option<RenderState>,
        tessellator: Tessellator,
        frame_requested: bool,
    }

    impl App {
        /// Top-left of the canvas in client coordinates
        fn origin(&self) -> Vec2 {
            let rect = self.canvas.get_bounding_client_rect();
            Vec2::new(rect.left() as f32, rect.top() as f32)
        }

        /// Match the backing store to the canvas' CSS size
        fn fit_canvas(&mut self) {
            let Some(window) = web_sys::window() else {
                return;
            };
            let (css_w, css_h) = css_size(&self.canvas);
            let dpr = window.device_pixel_ratio();
            let width = (css_w as f64 * dpr) as u32;
            let height = (css_h as f64 * dpr) as u32;
            self.canvas.set_width(width);
            self.canvas.set_height(height);

            self.tessellator.resize(css_w, css_h);
            if let Some(ref mut render_state) = self.render_state {
                render_state.resize(width, height);
            }
        }

        fn draw(&mut self) {
            let report = self.session.render(&mut self.tessellator);
            let vertices = self.tessellator.finish();
            log::debug!("Frame: {:?}, {} vertices", report, vertices.len());

            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&vertices) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }
    }

    fn css_size(canvas: &HtmlCanvasElement) -> (f32, f32) {
        (
            canvas.client_width().max(1) as f32,
            canvas.client_height().max(1) as f32,
        )
    }

    fn now_ms() -> f64 {
        js_sys::Date::now()
    }

    fn set_text(id: &str, text: &str) {
        if let Some(el) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id))
        {
            el.set_text_content(Some(text));
        }
    }

    /// Current value of an `<input>` or `<textarea>`
    fn field_value(target: &web_sys::EventTarget) -> Option<String> {
        if let Some(input) = target.dyn_ref::<HtmlInputElement>() {
            return Some(input.value());
        }
        target.dyn_ref::<HtmlTextAreaElement>().map(|t| t.value())
    }

    /// Carry out what an input asked for
    fn apply(app: &Rc<RefCell<App>>, update: Update) {
        if let Some(n) = update.dimension {
            set_text(COUNT_DISPLAY_ID, &n.to_string());
        }
        for (key, refresh) in [(Deferred::PatternDump, update.dump), (Deferred::Stats, update.stats)] {
            match refresh {
                Refresh::Now => show(app, key),
                Refresh::Deferred(ticket) => arm(app, ticket),
                Refresh::None => {}
            }
        }
        if update.redraw {
            request_redraw(app);
        }
    }

    fn show(app: &Rc<RefCell<App>>, key: Deferred) {
        let app = app.borrow();
        match key {
            Deferred::PatternDump => set_text(PATTERN_DISPLAY_ID, &app.session.pattern_text()),
            Deferred::Stats => set_text(STATS_DISPLAY_ID, &app.session.stats_text()),
        }
    }

    /// Start a host timer for a deferred refresh
    fn arm(app: &Rc<RefCell<App>>, ticket: Ticket<Deferred>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let app = app.clone();
        let closure = Closure::once(move || {
            let current = app.borrow_mut().session.fire(ticket);
            if current {
                show(&app, ticket.key);
            }
        });
        let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            ticket.delay_ms as i32,
        );
        closure.forget();
    }

    /// Draw on the next animation frame, coalescing repeated requests
    fn request_redraw(app: &Rc<RefCell<App>>) {
        {
            let mut a = app.borrow_mut();
            if a.frame_requested {
                return;
            }
            a.frame_requested = true;
        }
        let Some(window) = web_sys::window() else {
            return;
        };
        let app = app.clone();
        let closure = Closure::once(move |_time: f64| {
            let mut a = app.borrow_mut();
            a.frame_requested = false;
            a.draw();
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    async fn init_gpu(canvas: &HtmlCanvasElement) -> Option<RenderState> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = match instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone())) {
            Ok(surface) => surface,
            Err(e) => {
                log::error!("Failed to create surface: {}", e);
                return None;
            }
        };

        let adapter = match instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
        {
            Ok(adapter) => adapter,
            Err(e) => {
                log::error!("Failed to get adapter: {}", e);
                return None;
            }
        };
        log::info!("Using adapter: {:?}", adapter.get_info().name);

        match RenderState::new(surface, &adapter, canvas.width(), canvas.height()).await {
            Ok(state) => Some(state),
            Err(e) => {
                log::error!("Failed to create device: {}", e);
                None
            }
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Railgun Reflectors starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id(CANVAS_ID)
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let settings = Settings::load();
        let (css_w, css_h) = css_size(&canvas);
        let tessellator = Tessellator::new(css_w, css_h, settings.quality.max_vertices());
        let app = Rc::new(RefCell::new(App {
            session: Session::new(settings, css_w, css_h),
            canvas: canvas.clone(),
            render_state: None,
            tessellator,
            frame_requested: false,
        }));
        app.borrow_mut().fit_canvas();

        let render_state = init_gpu(&canvas).await;
        if render_state.is_none() {
            log::warn!("WebGPU unavailable, the grid will not be drawn");
        }
        app.borrow_mut().render_state = render_state;

        setup_pointer_handlers(&canvas, &document, app.clone());
        setup_inputs(&document, app.clone());
        setup_buttons(&document, app.clone());
        setup_resize(&window, app.clone());

        // Initial lane count comes from the input's markup value
        let initial = document
            .get_element_by_id(COUNT_INPUT_ID)
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            .and_then(|input| parse_dimension(&input.value()).ok());
        let dimension = initial.unwrap_or_else(|| app.borrow().session.dimension());
        let update = app.borrow_mut().session.apply_dimension(dimension);
        apply(&app, update);

        log::info!("Railgun Reflectors running!");
    }

    fn setup_pointer_handlers(
        canvas: &HtmlCanvasElement,
        document: &Document,
        app: Rc<RefCell<App>>,
    ) {
        // Press on the canvas starts a gesture
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let screen = Vec2::new(event.client_x() as f32, event.client_y() as f32);
                app.borrow_mut().session.on_pointer_down(screen);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Moves are tracked page-wide so a drag can leave the canvas
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let screen = Vec2::new(event.client_x() as f32, event.client_y() as f32);
                let update = app.borrow_mut().session.on_pointer_move(screen);
                apply(&app, update);
            });
            let _ = document
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Release over the canvas: click unless it was a drag
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let screen = Vec2::new(event.client_x() as f32, event.client_y() as f32);
                let update = {
                    let mut a = app.borrow_mut();
                    let origin = a.origin();
                    a.session.on_pointer_up(screen, origin, now_ms())
                };
                apply(&app, update);
            });
            let _ = canvas
                .add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Release anywhere else just ends the gesture
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                app.borrow_mut().session.end_drag();
            });
            let _ = document
                .add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Wheel zoom; not passive so the page doesn't scroll
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: WheelEvent| {
                let update = {
                    let mut a = app.borrow_mut();
                    if !a.session.settings().zoom_enabled {
                        return;
                    }
                    event.prevent_default();
                    let screen = Vec2::new(event.client_x() as f32, event.client_y() as f32);
                    let origin = a.origin();
                    a.session.on_wheel(event.delta_y() as f32, screen, origin)
                };
                apply(&app, update);
            });
            let options = web_sys::AddEventListenerOptions::new();
            options.set_passive(false);
            let _ = canvas.add_event_listener_with_callback_and_add_event_listener_options(
                "wheel",
                closure.as_ref().unchecked_ref(),
                &options,
            );
            closure.forget();
        }
    }

    fn setup_inputs(document: &Document, app: Rc<RefCell<App>>) {
        if let Some(input) = document.get_element_by_id(COUNT_INPUT_ID) {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
                let Some(text) = event.target().as_ref().and_then(field_value) else {
                    return;
                };
                let result = app.borrow_mut().session.set_dimension(&text, now_ms());
                if let Ok(update) = result {
                    apply(&app, update);
                }
            });
            let _ = input.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(input) = document.get_element_by_id(PATTERN_INPUT_ID) {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
                let Some(text) = event.target().as_ref().and_then(field_value) else {
                    return;
                };
                let update = app.borrow_mut().session.load_pattern(&text, now_ms());
                apply(&app, update);
            });
            let _ = input.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(document: &Document, app: Rc<RefCell<App>>) {
        let actions: [(&str, fn(&mut Session) -> Update); 4] = [
            ("fill-top-row", |s| s.fill_row(FillTarget::Top, now_ms())),
            ("fill-bottom-row", |s| s.fill_row(FillTarget::Bottom, now_ms())),
            ("clear-reflectors", |s| s.clear(now_ms())),
            ("scatter-reflectors", |s| {
                let seed = js_sys::Date::now() as u64;
                s.scatter(seed, SCATTER_DENSITY, now_ms())
            }),
        ];

        for (id, action) in actions {
            let Some(btn) = document.get_element_by_id(id) else {
                continue;
            };
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let update = action(&mut app.borrow_mut().session);
                apply(&app, update);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(window: &Window, app: Rc<RefCell<App>>) {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let update = {
                let mut a = app.borrow_mut();
                a.fit_canvas();
                let (css_w, css_h) = css_size(&a.canvas);
                a.session.resize_surface(css_w, css_h)
            };
            apply(&app, update);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    web_app::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use railgun_reflectors::renderer::{Recorder, Tessellator};
    use railgun_reflectors::sim::FillTarget;
    use railgun_reflectors::{QualityPreset, Session, Settings};

    env_logger::init();
    log::info!("Railgun Reflectors (native) starting...");
    log::info!("The interactive grid runs in the browser - build for wasm32 to use it");

    let mut settings = Settings::load();
    // Optional first argument: quality preset name
    if let Some(arg) = std::env::args().nth(1) {
        match QualityPreset::from_str(&arg) {
            Some(quality) => settings.quality = quality,
            None => log::warn!("Unknown quality preset {:?}", arg),
        }
    }
    let max_vertices = settings.quality.max_vertices();
    let mut session = Session::new(settings, 600.0, 600.0);
    session.apply_dimension(6);
    session.fill_row(FillTarget::Bottom, 0.0);
    session.scatter(42, 0.2, 0.0);

    println!("{}\n", session.pattern_text());
    println!("{}", session.stats_text());
    for lane in session.lanes() {
        println!(
            "  lane {:>2}: exits at row {:>3} after {} reflections",
            lane.start_row, lane.exit_row, lane.reflections
        );
    }

    let mut recorder = Recorder::new(600.0, 600.0);
    let report = session.render(&mut recorder);
    let mut tessellator = Tessellator::new(600.0, 600.0, max_vertices);
    session.render(&mut tessellator);
    println!(
        "\nFrame: {:?} ({} draw calls, {} vertices)",
        report,
        recorder.calls.len(),
        tessellator.finish().len()
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
