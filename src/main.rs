//! Sketch Runner entry point
//!
//! On the web this binds the page canvas, preloads assets and drives the
//! selected game from `requestAnimationFrame`. Natively it plays a short
//! headless round of each game against the recording surface.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, PointerEvent};

    use sketch_runner::platform::{self, AssetManifest, CanvasSurface, GameMode, SessionConfig, WebMedia};
    use sketch_runner::renderer::compositor::env_media_key;
    use sketch_runner::renderer::{AssetCatalog, PlaybackGate};
    use sketch_runner::sim::{Environment, InputEvent, RunnerGame, SketchGame};
    use sketch_runner::{FrameOutcome, FrameScheduler, Game, RoundSummary, Settings, Viewport};

    /// Everything the frame callback touches
    struct App<G: Game> {
        scheduler: FrameScheduler<G>,
        surface: CanvasSurface,
        assets: AssetCatalog<WebMedia>,
        gate: PlaybackGate,
        canvas: HtmlCanvasElement,
        env: Environment,
        cancelled: Rc<Cell<bool>>,
    }

    impl<G: Game> App<G> {
        fn viewport(&self) -> Viewport {
            let dpr = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio());
            Viewport::new(self.canvas.client_width() as f32, self.canvas.client_height() as f32)
                .with_pixel_ratio(dpr as f32)
        }

        /// Keep background and hero videos playing, throttled by the gate
        fn poll_playback(&mut self, now: f64) {
            for key in [env_media_key("video", self.env), "hero_video".to_string()] {
                if let Some(video) = self.assets.get(&key) {
                    self.gate.poll(video, now);
                }
            }
        }
    }

    fn set_text(id: &str, text: &str) {
        if let Some(el) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id))
        {
            el.set_text_content(Some(text));
        }
    }

    fn report_summary(summary: RoundSummary) {
        match serde_json::to_string(&summary) {
            Ok(json) => {
                log::info!("Round summary: {}", json);
                set_text("summary", &json);
            }
            Err(err) => log::error!("Could not serialize round summary: {}", err),
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if let Err(err) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Failed to init logger: {}", err).into());
        }

        log::info!("Sketch Runner starting...");

        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            log::error!("No document");
            return;
        };
        let Some(canvas) = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("No #canvas element on the page");
            return;
        };

        let query = window.location().search().unwrap_or_default();
        let config = SessionConfig::from_query(&query);
        let manifest = canvas
            .get_attribute("data-assets")
            .map(|json| {
                AssetManifest::from_json(&json).unwrap_or_else(|err| {
                    log::warn!("Ignoring malformed asset manifest: {}", err);
                    AssetManifest::default()
                })
            })
            .unwrap_or_default();

        log::info!("Session: {:?} on '{}'", config.mode, config.env.key());

        let cancelled = Rc::new(Cell::new(false));
        {
            let cancelled = cancelled.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                cancelled.set(true);
            });
            let _ = window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        let Some(assets) = platform::preload(&manifest, cancelled.clone()).await else {
            return;
        };

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let surface = match CanvasSurface::new(canvas.clone()) {
            Ok(surface) => surface,
            Err(err) => {
                log::error!("Canvas unavailable: {}", err);
                return;
            }
        };

        let settings = Settings::load();
        let seed = config.seed_or(platform::clock_seed());
        log::info!("Round seed: {}", seed);

        match config.mode {
            GameMode::Sketch => launch(SketchGame::new(config.env, settings, seed), surface, assets, canvas, config.env, cancelled),
            GameMode::Runner => launch(RunnerGame::new(config.env, settings, seed), surface, assets, canvas, config.env, cancelled),
        }

        log::info!("Sketch Runner running!");
    }

    fn launch<G: Game + 'static>(
        game: G,
        surface: CanvasSurface,
        assets: AssetCatalog<WebMedia>,
        canvas: HtmlCanvasElement,
        env: Environment,
        cancelled: Rc<Cell<bool>>,
    ) {
        let scheduler = FrameScheduler::new(game)
            .on_score(|score| set_text("score", &score.to_string()))
            .on_summary(report_summary);
        let app = Rc::new(RefCell::new(App {
            scheduler,
            surface,
            assets,
            gate: PlaybackGate::new(),
            canvas: canvas.clone(),
            env,
            cancelled,
        }));
        {
            let mut a = app.borrow_mut();
            let view = a.viewport();
            let now = platform::now_ms();
            a.scheduler.start(now, view);
            a.poll_playback(now);
        }

        setup_input_handlers(&canvas, app.clone());
        request_animation_frame(app);
    }

    fn point(event: &PointerEvent) -> Vec2 {
        Vec2::new(event.offset_x() as f32, event.offset_y() as f32)
    }

    fn setup_input_handlers<G: Game + 'static>(canvas: &HtmlCanvasElement, app: Rc<RefCell<App<G>>>) {
        // Press: a tap for click-to-damage/jump, then the stroke start
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                event.prevent_default();
                let p = point(&event);
                let mut a = app.borrow_mut();
                a.gate.unlock();
                a.scheduler.push_input(InputEvent::Tap(p));
                a.scheduler.push_input(InputEvent::PointerDown(p));
            });
            let _ = canvas.add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                app.borrow_mut().scheduler.push_input(InputEvent::PointerMove(point(&event)));
            });
            let _ = canvas.add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        for name in ["pointerup", "pointercancel", "pointerleave"] {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: PointerEvent| {
                app.borrow_mut().scheduler.push_input(InputEvent::PointerUp);
            });
            let _ = canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Jump keys
        if let Some(window) = web_sys::window() {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if matches!(event.code().as_str(), "Space" | "ArrowUp" | "KeyW") {
                    event.prevent_default();
                    let mut a = app.borrow_mut();
                    a.gate.unlock();
                    if !event.repeat() {
                        a.scheduler.push_input(InputEvent::Jump);
                    }
                }
            });
            let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame<G: Game + 'static>(app: Rc<RefCell<App<G>>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop<G: Game + 'static>(app: Rc<RefCell<App<G>>>, time: f64) {
        let outcome = {
            let mut guard = app.borrow_mut();
            let a = &mut *guard;
            if a.cancelled.get() {
                a.scheduler.stop();
                return;
            }

            let view = a.viewport();
            if let Err(err) = a.surface.begin_frame(&view) {
                log::warn!("Canvas reset failed: {}", err);
            }
            a.poll_playback(time);
            a.scheduler.tick(time, view, &mut a.surface, &a.assets)
        };

        match outcome {
            FrameOutcome::Continue => request_animation_frame(app),
            FrameOutcome::Terminated => log::info!("Frame loop finished"),
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use sketch_runner::platform::clock_seed;
    use sketch_runner::sim::Environment;

    env_logger::init();
    log::info!("Sketch Runner (native) starting...");
    log::info!("Native mode runs headless rounds - serve the wasm build for the playable version");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(clock_seed);
    let env = std::env::args()
        .nth(2)
        .map(|key| Environment::from_key_or_default(&key))
        .unwrap_or_default();

    headless::run_sketch(env, seed);
    headless::run_runner(env, seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use sketch_runner::renderer::{AssetCatalog, RecordingSurface, StaticMedia};
    use sketch_runner::sim::{Environment, InputEvent, RunnerGame, SketchGame};
    use sketch_runner::{FrameOutcome, FrameScheduler, Game, RoundSummary, Settings, Viewport};

    /// Frames at 60 Hz before a headless round is cut off
    const MAX_FRAMES: u32 = 60 * 90;
    const FRAME_MS: f64 = 1000.0 / 60.0;

    fn view() -> Viewport {
        Viewport::new(960.0, 540.0)
    }

    /// Drive `game` until it ends or the frame budget runs out
    fn drive<G: Game>(game: G, mut script: impl FnMut(u32, &mut FrameScheduler<G>)) -> Option<RoundSummary> {
        let summary = Rc::new(RefCell::new(None));
        let sink = summary.clone();
        let mut scheduler = FrameScheduler::new(game).on_summary(move |s| *sink.borrow_mut() = Some(s));
        let mut surface = RecordingSurface::new();
        let assets: AssetCatalog<StaticMedia> = AssetCatalog::new();

        scheduler.start(0.0, view());
        for frame in 1..=MAX_FRAMES {
            script(frame, &mut scheduler);
            surface.clear();
            if scheduler.tick(frame as f64 * FRAME_MS, view(), &mut surface, &assets) == FrameOutcome::Terminated {
                log::info!("Round ended after {} frames", frame);
                break;
            }
        }
        if scheduler.frame_errors() > 0 {
            log::warn!("{} frames reported errors", scheduler.frame_errors());
        }
        summary.borrow_mut().take()
    }

    /// Sketch round with a horizontal shield drawn over the hero every few seconds
    pub fn run_sketch(env: Environment, seed: u64) {
        let game = SketchGame::new(env, Settings::default(), seed);
        let summary = drive(game, |frame, scheduler| {
            let y = view().height * 0.55;
            match frame % 240 {
                0 => scheduler.push_input(InputEvent::PointerDown(Vec2::new(340.0, y))),
                1..=10 => scheduler.push_input(InputEvent::PointerMove(Vec2::new(340.0 + frame as f32 % 240.0 * 28.0, y))),
                11 => scheduler.push_input(InputEvent::PointerUp),
                _ => {}
            }
        });
        match summary {
            Some(s) => log::info!("Sketch round: {:?}", s),
            None => log::info!("Sketch round still running when the frame budget ran out"),
        }
    }

    /// Runner round that jumps at a fixed cadence
    pub fn run_runner(env: Environment, seed: u64) {
        let game = RunnerGame::new(env, Settings::default(), seed);
        let summary = drive(game, |frame, scheduler| {
            if frame % 45 == 0 {
                scheduler.push_input(InputEvent::Jump);
            }
        });
        match summary {
            Some(s) => log::info!("Runner round: {:?}", s),
            None => log::info!("Runner round still running when the frame budget ran out"),
        }
    }
}
