//! BOING! entry point
//!
//! The browser build runs the full game: WebGPU board, DOM text overlay,
//! keyboard and gamepad input. The native build is a headless AI-vs-AI runner.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod web_game {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, KeyboardEvent, MouseEvent};

    use boing::KeyCode;
    use boing::audio::AudioManager;
    use boing::consts::FPS;
    use boing::input::InputEvent;
    use boing::persistence::LocalStorageStore;
    use boing::platform::{self, gamepad};
    use boing::renderer::{RenderState, scene};
    use boing::ui::{App, MenuItem, Screen, View, view};

    /// Shortest gap between processed frames (ms)
    const MIN_FRAME_MS: f64 = 1000.0 / FPS as f64;

    /// Keys whose browser default (scrolling, focus moves) is suppressed
    const CAPTURED_KEYS: [&str; 6] = ["ArrowUp", "ArrowDown", "ArrowLeft", "ArrowRight", "Space", "Tab"];

    /// Frontend state shared with event closures
    struct Game {
        app: App,
        render_state: Option<RenderState>,
        /// Input gathered by closures since the last frame
        pending: VecDeque<InputEvent>,
        pause_requested: bool,
        last_time: f64,
        last_view: Option<View>,
    }

    impl Game {
        fn new(app: App) -> Self {
            Self {
                app,
                render_state: None,
                pending: VecDeque::new(),
                pause_requested: false,
                last_time: 0.0,
                last_view: None,
            }
        }

        /// One processed frame: input, simulation, draw, overlay
        fn frame(&mut self, time: f64) {
            let interval = if self.last_time > 0.0 {
                ((time - self.last_time) / 1000.0) as f32
            } else {
                1.0 / FPS
            };
            self.last_time = time;
            let frame_start = platform::now_ms();

            if std::mem::take(&mut self.pause_requested) {
                self.app.pause();
            }
            self.app.set_pads(gamepad::poll());
            while let Some(event) = self.pending.pop_front() {
                self.app.handle_event(event);
            }

            let update_start = platform::now_ms();
            self.app.update(interval);
            let update_ms = (platform::now_ms() - update_start) as f32;

            let draw_start = platform::now_ms();
            self.render();
            let draw_ms = (platform::now_ms() - draw_start) as f32;

            self.sync_overlay();

            let frame_ms = (platform::now_ms() - frame_start) as f32;
            if let Some(game) = self.app.game_mut() {
                game.stats.record(interval, frame_ms, update_ms, draw_ms);
            }
        }

        fn render(&mut self) {
            let playing = self.app.screen() == Screen::Playing;
            let vertices = match self.app.game_mut() {
                Some(game) if playing => {
                    let offset = game.shake_offset();
                    scene::build(game, offset)
                }
                _ => Vec::new(),
            };
            let Some(render_state) = self.render_state.as_mut() else {
                return;
            };
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

        /// Push the current view into the DOM when it changed
        fn sync_overlay(&mut self) {
            let view = self.app.view();
            if self.last_view.as_ref() == Some(&view) {
                return;
            }
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                render_overlay(&document, &view);
            }
            self.last_view = Some(view);
        }
    }

    fn show(document: &Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.class_list().toggle_with_force("hidden", !visible);
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    /// Replace the children of `id` with one element per line
    fn fill_list(document: &Document, id: &str, tag: &str, lines: &[String]) {
        let Some(list) = document.get_element_by_id(id) else {
            return;
        };
        list.set_text_content(None);
        for text in lines {
            let Ok(el) = document.create_element(tag) else {
                continue;
            };
            el.set_text_content(Some(text));
            let _ = list.append_child(&el);
        }
    }

    /// Menu rows: label in the row color, value in its own span
    fn fill_menu_items(document: &Document, items: &[MenuItem]) {
        let Some(list) = document.get_element_by_id("menu-items") else {
            return;
        };
        list.set_text_content(None);
        for item in items {
            let Ok(row) = document.create_element("li") else {
                continue;
            };
            let label = match item.value {
                Some(_) => format!("{}: ", item.label),
                None => item.label.clone(),
            };
            row.set_text_content(Some(&label));
            let style = format!("color: {}", view::css_color(view::item_color(item)));
            let _ = row.set_attribute("style", &style);
            if let Some(value) = &item.value {
                if let Ok(span) = document.create_element("span") {
                    span.set_text_content(Some(value));
                    let style = format!("color: {}", view::css_color(view::value_color(item)));
                    let _ = span.set_attribute("style", &style);
                    let _ = row.append_child(&span);
                }
            }
            let _ = list.append_child(&row);
        }
    }

    fn render_overlay(document: &Document, v: &View) {
        let in_menu = v.hud.is_none();
        show(document, "menu", in_menu);
        set_text(document, "menu-title", &v.title);
        set_text(document, "menu-hint", &v.hint);
        fill_menu_items(document, &v.items);
        fill_list(document, "menu-lines", "p", &v.lines);

        show(document, "popup", v.popup.is_some());
        if let Some(popup) = &v.popup {
            set_text(document, "popup-title", &popup.title);
            if let Some(el) = document.get_element_by_id("popup-title") {
                let style = format!("background: {}", view::css_color(popup.title_color));
                let _ = el.set_attribute("style", &style);
            }
            set_text(document, "popup-message", &popup.message);
            set_text(document, "popup-yes", &popup.yes);
            set_text(document, "popup-no", &popup.no);
            let choice = |yes: bool| if yes { "choice selected" } else { "choice" };
            if let Some(el) = document.get_element_by_id("popup-yes") {
                let _ = el.set_attribute("class", choice(popup.yes_selected));
            }
            if let Some(el) = document.get_element_by_id("popup-no") {
                let _ = el.set_attribute("class", choice(!popup.yes_selected));
            }
        }

        show(document, "hud", v.hud.is_some());
        let banner = v.hud.as_ref().and_then(|h| h.banner.clone());
        show(document, "banner", banner.is_some());
        if let Some(hud) = &v.hud {
            set_text(document, "score-left", &hud.scores[0].to_string());
            set_text(document, "score-right", &hud.scores[1].to_string());
            set_text(document, "hud-help", &hud.help);
            set_text(document, "banner", banner.as_deref().unwrap_or_default());
            show(document, "paused", hud.paused);
        }

        show(document, "debug", !v.debug.is_empty());
        fill_list(document, "debug", "div", &v.debug);
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("BOING! starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        show(&document, "loading", false);

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let seed = platform::session_seed();
        let app = App::new(Box::new(LocalStorageStore::new()), AudioManager::default(), seed);
        let game = Rc::new(RefCell::new(Game::new(app)));
        log::info!("Session seed: {}", seed);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .expect("Failed to create surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to get adapter");

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = RenderState::new(surface, &adapter, width, height).await;
        game.borrow_mut().render_state = Some(render_state);

        setup_input_handlers(game.clone());
        setup_auto_pause(game.clone());
        setup_unload_save(game.clone());

        request_animation_frame(game);

        log::info!("BOING! running!");
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");

        // Keyboard (physical key codes)
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let code = event.code();
                if CAPTURED_KEYS.contains(&code.as_str()) {
                    event.prevent_default();
                }
                if event.repeat() {
                    return;
                }
                let mut g = game.borrow_mut();
                // Browsers only allow audio after a gesture
                g.app.audio().resume();
                g.pending.push_back(InputEvent::KeyDown(KeyCode::new(code)));
            });
            let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                game.borrow_mut()
                    .pending
                    .push_back(InputEvent::KeyUp(KeyCode::new(event.code())));
            });
            let _ = window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                g.app.audio().resume();
                g.pending.push_back(InputEvent::MouseDown);
            });
            let _ = window.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    game.borrow_mut().pause_requested = true;
                    log::info!("Tab hidden");
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().pause_requested = true;
                log::info!("Window lost focus");
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Closing the tab counts as quitting
    fn setup_unload_save(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if let Ok(mut g) = game.try_borrow_mut() {
                g.app.handle_event(InputEvent::Quit);
            }
        });
        let _ = window.add_event_listener_with_callback("beforeunload", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            // Cap at FPS on high refresh displays
            if g.last_time > 0.0 && time - g.last_time < MIN_FRAME_MS - 0.5 {
                drop(g);
                request_animation_frame(game);
                return;
            }
            g.frame(time);

            if g.app.is_finished() {
                if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                    for id in ["menu", "hud", "popup", "banner", "debug"] {
                        show(&document, id, false);
                    }
                    show(&document, "goodbye", true);
                }
                log::info!("BOING! stopped");
                return;
            }
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    web_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;

    use clap::Parser;

    use boing::consts::{FPS, SCORE_TO_WIN};
    use boing::persistence::FileStore;
    use boing::platform;
    use boing::sim::{GameEvent, GameState, Mode, Side, TickInput, ai_velocity, tick};
    use boing::{Difficulty, Settings};

    #[derive(Parser, Debug)]
    #[command(name = "boing")]
    #[command(about = "Run a headless AI-vs-AI BOING! match and log the outcome")]
    pub struct Args {
        /// Simulated seconds to play
        #[arg(long, default_value_t = 60.0)]
        pub seconds: f32,

        /// AI difficulty for both paddles (defaults to the saved setting)
        #[arg(long, value_parser = parse_difficulty)]
        pub difficulty: Option<Difficulty>,

        /// Points needed to win a match (0 = endless)
        #[arg(long, default_value_t = SCORE_TO_WIN)]
        pub score_to_win: u32,

        /// RNG seed (defaults to the clock)
        #[arg(long)]
        pub seed: Option<u64>,

        /// Settings file (defaults to the per-user config location)
        #[arg(long)]
        pub config: Option<PathBuf>,
    }

    fn parse_difficulty(s: &str) -> Result<Difficulty, String> {
        Difficulty::from_str(s).ok_or_else(|| format!("unknown difficulty '{s}' (easy, normal, hard)"))
    }

    /// Totals gathered over a run
    #[derive(Debug, Default, PartialEq)]
    pub struct Outcome {
        pub scores: [u32; 2],
        pub hits: [u32; 2],
        pub matches_won: [u32; 2],
    }

    /// Play `steps` fixed frames with the AI on both paddles
    pub fn simulate(settings: &Settings, difficulty: Difficulty, score_to_win: u32, seed: u64, steps: u64) -> Outcome {
        let mut game = GameState::new(Mode::SinglePlayer, settings, seed);
        game.difficulty = difficulty;
        game.score_to_win = score_to_win;

        let dt = 1.0 / FPS;
        let mut outcome = Outcome::default();
        for _ in 0..steps {
            let input = TickInput {
                left: ai_velocity(game.left.rect().center_y(), game.ball.rect().center_y(), difficulty),
                right: 0.0,
            };
            tick(&mut game, &input, dt);
            for event in game.drain_events() {
                match event {
                    GameEvent::PaddleHit { side, .. } => outcome.hits[side.index()] += 1,
                    GameEvent::Scored { scorer, scores } => {
                        log::debug!("{} scores ({}-{})", scorer.name(), scores[0], scores[1]);
                    }
                    GameEvent::MatchWon { winner } => {
                        outcome.matches_won[winner.index()] += 1;
                        log::info!("Match won by {}", winner.name());
                    }
                }
            }
        }
        outcome.scores = game.scores;
        outcome
    }

    pub fn run(args: &Args) {
        let mut store = match &args.config {
            Some(path) => FileStore::new(path),
            None => FileStore::user_default(),
        };
        let settings = Settings::load(&store);
        let difficulty = args.difficulty.unwrap_or(settings.ai_difficulty);
        let seed = args.seed.unwrap_or_else(platform::session_seed);
        let steps = (args.seconds.max(0.0) * FPS).round() as u64;

        log::info!(
            "Headless match: {:.1}s, {} AI, first to {}, seed {}",
            args.seconds,
            difficulty.as_str(),
            args.score_to_win,
            seed
        );
        let outcome = simulate(&settings, difficulty, args.score_to_win, seed, steps);
        log::info!(
            "Final score {}-{}, hits {}/{}, matches won {}/{}",
            outcome.scores[Side::Left.index()],
            outcome.scores[Side::Right.index()],
            outcome.hits[0],
            outcome.hits[1],
            outcome.matches_won[0],
            outcome.matches_won[1]
        );

        if let Err(e) = settings.save(&mut store) {
            log::error!("Failed to save settings to {}: {}", store.path().display(), e);
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_args_parse() {
            let args = Args::try_parse_from(["boing", "--seconds", "5", "--difficulty", "HARD", "--seed", "7"]).unwrap();
            assert_eq!(args.seconds, 5.0);
            assert_eq!(args.difficulty, Some(Difficulty::Hard));
            assert_eq!(args.score_to_win, SCORE_TO_WIN);
            assert_eq!(args.seed, Some(7));
            assert!(Args::try_parse_from(["boing", "--difficulty", "extreme"]).is_err());
        }

        #[test]
        fn test_simulation_is_deterministic() {
            let settings = Settings::default();
            let a = simulate(&settings, Difficulty::Normal, 5, 42, 2000);
            let b = simulate(&settings, Difficulty::Normal, 5, 42, 2000);
            assert_eq!(a, b);
        }

        #[test]
        fn test_run_saves_settings() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("settings.json");
            let args = Args::try_parse_from([
                "boing",
                "--seconds",
                "1",
                "--seed",
                "3",
                "--config",
                path.to_str().unwrap(),
            ])
            .unwrap();
            run(&args);
            let store = FileStore::new(&path);
            assert_eq!(Settings::load(&store), Settings::default());
            assert!(path.exists());
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use clap::Parser;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("BOING! (native, headless) starting...");

    let args = headless::Args::parse();
    headless::run(&args);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
