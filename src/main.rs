//! Battery Dash entry point
//!
//! In the browser this wires the DOM, canvas, timers and animation frames to
//! a [`Session`](battery_dash::Session). Natively it plays one autopiloted
//! run on a virtual clock and logs how it went.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::{Rc, Weak};

    use wasm_bindgen::prelude::*;
    use web_sys::{
        CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement, HtmlImageElement,
        HtmlInputElement, KeyboardEvent,
    };

    use battery_dash::assets::{AssetTracker, LoadEvent, Sprite};
    use battery_dash::hud::{self, HudSnapshot, Screen};
    use battery_dash::renderer::canvas::CanvasSurface;
    use battery_dash::renderer::draw_frame;
    use battery_dash::schedule::{ScheduleError, Scheduler, Timer, TimerId};
    use battery_dash::session::SessionError;
    use battery_dash::sim::RunPhase;
    use battery_dash::{Session, Settings};

    fn document() -> Document {
        web_sys::window()
            .and_then(|w| w.document())
            .expect("no document")
    }

    fn now_ms() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }

    fn set_hidden(document: &Document, id: &str, hidden: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.class_list().toggle_with_force("hidden", hidden);
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    /// `setInterval` / `requestAnimationFrame` bridge back into the app
    struct BrowserScheduler {
        app: Weak<RefCell<App>>,
        intervals: HashMap<TimerId, Closure<dyn FnMut()>>,
        // Stopped from inside their own callback; dropped on the next start
        retired: Vec<Closure<dyn FnMut()>>,
        frame_requested: bool,
    }

    impl BrowserScheduler {
        fn new(app: Weak<RefCell<App>>) -> Self {
            Self {
                app,
                intervals: HashMap::new(),
                retired: Vec::new(),
                frame_requested: false,
            }
        }
    }

    impl Scheduler for BrowserScheduler {
        fn start_timer(&mut self, timer: Timer, period_ms: u32) -> Result<TimerId, ScheduleError> {
            self.retired.clear();
            let window = web_sys::window().ok_or_else(|| ScheduleError::Unavailable {
                timer,
                reason: "no window".into(),
            })?;

            let app = self.app.clone();
            let closure = Closure::<dyn FnMut()>::new(move || {
                if let Some(app) = app.upgrade() {
                    app.borrow_mut().on_timer(timer);
                }
            });
            let period = i32::try_from(period_ms).map_err(|_| ScheduleError::Unavailable {
                timer,
                reason: format!("period {}ms out of range", period_ms),
            })?;
            let handle = window
                .set_interval_with_callback_and_timeout_and_arguments_0(
                    closure.as_ref().unchecked_ref(),
                    period,
                )
                .map_err(|e| ScheduleError::Unavailable {
                    timer,
                    reason: format!("{:?}", e),
                })?;

            let id = TimerId(handle);
            self.intervals.insert(id, closure);
            log::debug!("Started {:?} every {}ms ({:?})", timer, period_ms, id);
            Ok(id)
        }

        fn stop_timer(&mut self, id: TimerId) {
            if let Some(window) = web_sys::window() {
                window.clear_interval_with_handle(id.0);
            }
            if let Some(closure) = self.intervals.remove(&id) {
                self.retired.push(closure);
            }
        }

        fn request_frame(&mut self) {
            if self.frame_requested {
                return;
            }
            let Some(window) = web_sys::window() else {
                return;
            };
            let app = self.app.clone();
            let closure = Closure::once(move |_time: f64| {
                if let Some(app) = app.upgrade() {
                    app.borrow_mut().on_frame();
                }
            });
            match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
                Ok(_) => {
                    self.frame_requested = true;
                    closure.forget();
                }
                Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
            }
        }
    }

    /// Everything the page callbacks share
    struct App {
        session: Session,
        scheduler: BrowserScheduler,
        surface: Option<CanvasSurface>,
        assets: AssetTracker,
        settings: Settings,
    }

    impl App {
        fn on_frame(&mut self) {
            self.scheduler.frame_requested = false;
            self.session.on_frame(&mut self.scheduler);
            self.render();
            self.update_hud();
        }

        fn on_timer(&mut self, timer: Timer) {
            self.session.on_timer(timer, &mut self.scheduler);
            // Input samples only move the player, which the next frame draws
            if timer == Timer::PowerClock {
                self.update_hud();
            }
        }

        fn start(&mut self, name: &str) {
            if !self.assets.is_ready() {
                log::warn!("Start ignored: images still loading");
                return;
            }
            match self.session.start(name, &mut self.scheduler) {
                Ok(()) => {}
                Err(SessionError::EmptyName) => log::warn!("Enter a name to start"),
                Err(e) => log::error!("Could not start run: {}", e),
            }
            self.update_hud();
        }

        fn restart(&mut self) {
            if let Err(e) = self.session.restart(&mut self.scheduler) {
                log::error!("Could not restart run: {}", e);
            }
            self.update_hud();
        }

        fn render(&mut self) {
            if let Some(surface) = self.surface.as_mut() {
                draw_frame(self.session.state(), surface);
            }
        }

        fn on_load_event(&mut self, event: Option<LoadEvent>) {
            let document = document();
            match event {
                Some(LoadEvent::Ready) => {
                    log::info!("Images loaded");
                    self.refresh_start_button();
                    self.render();
                }
                Some(LoadEvent::Failed(e)) => {
                    log::error!("{}", e);
                    set_text(&document, "load-error", &e.to_string());
                    set_hidden(&document, "load-error", false);
                }
                None => {}
            }
        }

        fn refresh_start_button(&self) {
            let name = document_input_value("player-name");
            let enabled = hud::can_start(self.assets.is_ready(), &name);
            if let Some(btn) = document().get_element_by_id("start-btn") {
                let _ = btn.toggle_attribute_with_force("disabled", !enabled);
            }
        }

        fn update_hud(&self) {
            let document = document();
            let state = self.session.state();
            let screen = Screen::for_state(state);

            set_hidden(&document, "welcome-screen", screen != Screen::Start);
            set_hidden(&document, "result-screen", screen != Screen::Result);
            set_hidden(&document, "lose-screen", screen != Screen::Loss);

            let snapshot = HudSnapshot::from_state(state);
            set_text(&document, "name", &snapshot.name_label);
            set_text(&document, "time", &snapshot.time_label);

            if let Some(bar) = document
                .get_element_by_id("power-level")
                .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            {
                let style = bar.style();
                let _ = style.set_property("width", &format!("{}%", snapshot.power_percent));
                let _ = style.set_property("background-color", snapshot.power_color);
            }

            if let Some(outcome) = self.session.outcome() {
                let text = hud::outcome_lines(outcome).join("\n");
                let id = match screen {
                    Screen::Loss => "lose-result",
                    _ => "result-text",
                };
                set_text(&document, id, &text);
            }
        }
    }

    fn load_images(app: &Rc<RefCell<App>>) -> HashMap<Sprite, HtmlImageElement> {
        let mut images = HashMap::new();
        for sprite in Sprite::ALL {
            let url = app.borrow().settings.assets.url(sprite).to_string();
            let image = HtmlImageElement::new().expect("cannot create image element");

            let onload = {
                let app = app.clone();
                Closure::<dyn FnMut()>::new(move || {
                    let mut a = app.borrow_mut();
                    let event = a.assets.mark_loaded(sprite);
                    a.on_load_event(event);
                })
            };
            let onerror = {
                let app = app.clone();
                let url = url.clone();
                Closure::<dyn FnMut()>::new(move || {
                    let mut a = app.borrow_mut();
                    let event = a.assets.mark_failed(sprite, &url);
                    a.on_load_event(event);
                })
            };
            image.set_onload(Some(onload.as_ref().unchecked_ref()));
            image.set_onerror(Some(onerror.as_ref().unchecked_ref()));
            onload.forget();
            onerror.forget();

            image.set_src(&url);
            images.insert(sprite, image);
        }

        let timeout_ms = app.borrow().settings.asset_timeout_ms();
        let app = app.clone();
        let timeout = Closure::once(move || {
            let mut a = app.borrow_mut();
            let event = a.assets.poll(now_ms());
            a.on_load_event(event);
        });
        if let Some(window) = web_sys::window() {
            let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                timeout.as_ref().unchecked_ref(),
                timeout_ms as i32,
            );
        }
        timeout.forget();

        images
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Battery Dash starting...");

        let settings = Settings::load();
        let seed = settings.seed.unwrap_or_else(|| js_sys::Date::now() as u64);
        let document = document();

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("game-canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");
        canvas.set_width(settings.tuning.surface_width as u32);
        canvas.set_height(settings.tuning.surface_height as u32);
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .expect("no 2d context")
            .dyn_into()
            .expect("not a 2d context");


        let app = Rc::new_cyclic(|weak: &Weak<RefCell<App>>| {
            RefCell::new(App {
                session: Session::new(&settings, seed),
                scheduler: BrowserScheduler::new(weak.clone()),
                surface: None,
                assets: AssetTracker::new(&Sprite::ALL, now_ms(), settings.asset_timeout_ms()),
                settings: settings.clone(),
            })
        });
        log::info!("Game initialized with seed: {}", seed);

        let images = load_images(&app);
        app.borrow_mut().surface = Some(CanvasSurface::new(ctx, images));

        setup_buttons(&document, app.clone());
        setup_name_field(&document, app.clone());
        app.borrow().refresh_start_button();
        setup_input_handlers(app.clone());
        app.borrow().update_hud();

        log::info!("Battery Dash ready");
    }

    fn on_click(document: &Document, id: &str, mut f: impl FnMut() + 'static) {
        let Some(btn) = document.get_element_by_id(id) else {
            log::warn!("Missing #{}", id);
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| f());
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_buttons(document: &Document, app: Rc<RefCell<App>>) {
        {
            let app = app.clone();
            on_click(document, "start-btn", move || {
                let name = document_input_value("player-name");
                app.borrow_mut().start(&name);
            });
        }
        for id in ["restart-btn", "restart-btn-lose"] {
            let app = app.clone();
            on_click(document, id, move || app.borrow_mut().restart());
        }
    }

    fn setup_name_field(document: &Document, app: Rc<RefCell<App>>) {
        let Some(field) = document.get_element_by_id("player-name") else {
            log::warn!("Missing #player-name");
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            app.borrow().refresh_start_button();
        });
        let _ = field.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn document_input_value(id: &str) -> String {
        document()
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            .map(|input| input.value())
            .unwrap_or_default()
    }

    fn setup_input_handlers(app: Rc<RefCell<App>>) {
        let window = web_sys::window().expect("no window");

        // Key down
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let key = event.key().to_lowercase();
                let mut a = app.borrow_mut();
                if key == "i" && !event.repeat() && a.session.phase() == RunPhase::Running {
                    let on = !a.session.autopilot();
                    a.session.set_autopilot(on);
                    log::info!("Autopilot: {}", on);
                    return;
                }
                a.session.key_down(&key);
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Key up
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                app.borrow_mut().session.key_up(&event.key().to_lowercase());
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Window blur: keyup never arrives for keys held while focus leaves
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                app.borrow_mut().session.release_keys();
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

/// Length of the native headless run
#[cfg(not(target_arch = "wasm32"))]
const HEADLESS_RUN_MS: f64 = 120_000.0;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use battery_dash::renderer::{DrawList, draw_frame};
    use battery_dash::schedule::VirtualScheduler;
    use battery_dash::{Session, Settings, hud};

    env_logger::init();
    log::info!("Battery Dash (native) starting...");
    log::info!("Browser build: target wasm32; running a headless autopilot run instead");

    let settings = Settings::load();
    let seed = settings.seed.unwrap_or_else(|| {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    });
    log::info!("Seed: {}", seed);

    let mut session = Session::new(&settings, seed);
    session.set_autopilot(true);
    let mut sched = VirtualScheduler::new(1000.0 / 60.0);
    if let Err(e) = session.start("autopilot", &mut sched) {
        log::error!("Could not start run: {}", e);
        std::process::exit(1);
    }
    session.run_until(&mut sched, HEADLESS_RUN_MS);

    let mut frame = DrawList::default();
    draw_frame(session.state(), &mut frame);
    log::debug!("Last frame: {} draw commands", frame.commands.len());

    match session.outcome() {
        Some(outcome) => {
            for line in hud::outcome_lines(outcome) {
                println!("{}", line);
            }
            println!("Ended: {:?}", outcome.reason);
        }
        None => {
            let state = session.state();
            println!(
                "Still running after {}: power {}%, {} frames",
                hud::format_clock(state.elapsed_seconds),
                state.power,
                state.frame
            );
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
