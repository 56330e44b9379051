//! Astro Blitz entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, HtmlInputElement, MouseEvent, TouchEvent};

    use astro_blitz::audio::{AudioManager, SoundCue};
    use astro_blitz::consts::*;
    use astro_blitz::debrief::{mission_debrief, RunSummary};
    use astro_blitz::renderer::{scene_vertices, RenderState};
    use astro_blitz::sim::{tick, GameEvent, GamePhase, GameState, TickInput, Viewport};
    use astro_blitz::{screen_to_ndc, HighScores, QualityPreset, Settings};

    /// Game instance holding all state
    struct Game {
        state: GameState,
        render_state: Option<RenderState>,
        settings: Settings,
        audio: AudioManager,
        highscores: HighScores,
        input: TickInput,
        /// Highest combo streak seen this run (the leaderboard wants it)
        best_combo: u32,
        canvas_size: (f32, f32),
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            let settings = Settings::load();
            let mut audio = AudioManager::new();
            audio.set_master_volume(settings.master_volume);
            audio.set_sfx_volume(settings.sfx_volume);

            Self {
                state: GameState::new(seed),
                render_state: None,
                settings,
                audio,
                highscores: HighScores::load(),
                input: TickInput::default(),
                best_combo: 0,
                canvas_size: (1.0, 1.0),
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
            }
        }

        fn set_canvas_size(&mut self, w: f32, h: f32) {
            self.canvas_size = (w.max(1.0), h.max(1.0));
        }

        fn aspect(&self) -> f32 {
            self.canvas_size.0 / self.canvas_size.1
        }

        /// One simulation tick per animation frame
        fn update(&mut self, now_ms: f64) {
            let viewport = Viewport::from_camera(CAMERA_FOV_DEG, self.aspect(), CAMERA_Z);
            tick(&mut self.state, &self.input, &viewport, now_ms);

            // Clear one-shot inputs after processing
            self.input.fire = false;

            self.best_combo = self.best_combo.max(self.state.combo);

            let events = self.state.drain_events();
            for event in &events {
                if let Some(cue) = SoundCue::for_event(event) {
                    self.audio.play(cue);
                }
                if let GameEvent::GameOver { score, level, .. } = *event {
                    self.on_game_over(score, level);
                }
            }

            // Track frame times for FPS
            self.frame_times[self.frame_index] = now_ms;
            self.frame_index = (self.frame_index + 1) % 60;

            // Calculate FPS from oldest to newest frame
            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = now_ms - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }
        }

        /// Leaderboard entry, fanfare, and the async debrief request
        fn on_game_over(&mut self, score: u64, level: u32) {
            let best_combo = self.best_combo;
            let rank = self
                .highscores
                .add_score(score, level, best_combo, js_sys::Date::now());
            if let Some(rank) = rank {
                self.highscores.save();
                self.audio.play(SoundCue::HighScore);
                log::info!("New high score, rank {}", rank);
                set_text("final-rank", &format!("#{rank}"));
            } else {
                set_text("final-rank", "-");
            }

            // Dated leaderboard on the game-over panel
            if self.highscores.is_empty() {
                set_text("leaderboard", "No flights logged yet.");
            } else {
                set_text("leaderboard", &self.highscores.leaderboard_lines().join("\n"));
            }

            set_text("debrief-text", "Contacting command...");
            wasm_bindgen_futures::spawn_local(async move {
                let text = mission_debrief(RunSummary {
                    score,
                    level,
                    best_combo,
                })
                .await;
                set_text("debrief-text", &text);
            });
        }

        /// Render the current frame
        fn render(&mut self) {
            let Some(ref mut render_state) = self.render_state else {
                return;
            };
            let vertices = scene_vertices(&self.state, &self.settings, render_state.aspect());
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

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let window = web_sys::window().unwrap();
            let document = window.document().unwrap();

            set_text("hud-score", &self.state.score.to_string());
            set_text("hud-lives", &self.state.lives.to_string());
            set_text("hud-level", &self.state.level.to_string());
            if self.settings.show_fps {
                set_text("hud-fps", &self.fps.to_string());
            }

            // Combo counter only shows mid-streak
            if let Some(el) = document.get_element_by_id("hud-combo") {
                if self.state.combo > 1 {
                    let _ = el.set_attribute("class", "hud-item");
                    set_text("hud-combo-value", &format!("x{}", self.state.combo));
                } else {
                    let _ = el.set_attribute("class", "hud-item hidden");
                }
            }

            // Power-up bar tracks the countdown
            if let Some(el) = document.get_element_by_id("powerup-bar") {
                let fraction = (self.state.powerup / POWERUP_DURATION).clamp(0.0, 1.0);
                let _ = el.set_attribute("style", &format!("width: {}%", fraction * 100.0));
            }

            // Show/hide game over panel
            if let Some(el) = document.get_element_by_id("game-over") {
                if self.state.phase == GamePhase::GameOver {
                    let _ = el.set_attribute("class", "");
                    set_text("final-score", &self.state.score.to_string());
                    set_text("final-level", &self.state.level.to_string());
                } else {
                    let _ = el.set_attribute("class", "hidden");
                }
            }
        }

        /// Reset game state for restart
        fn restart(&mut self, seed: u64) {
            self.state = GameState::new(seed);
            self.input = TickInput::default();
            self.best_combo = 0;
            set_text("debrief-text", "");
        }
    }

    /// Set the text content of a DOM element, ignoring a missing one
    fn set_text(id: &str, text: &str) {
        if let Some(el) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id))
        {
            el.set_text_content(Some(text));
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Astro Blitz starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        // Set canvas size
        let dpr = window.device_pixel_ratio();
        let client_w = canvas.client_width();
        let client_h = canvas.client_height();
        let width = (client_w as f64 * dpr) as u32;
        let height = (client_h as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        // Initialize game
        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));
        game.borrow_mut()
            .set_canvas_size(client_w as f32, client_h as f32);

        log::info!("Game initialized with seed: {}", seed);

        // Initialize WebGPU
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

        let render_state = RenderState::new(surface, &adapter, width, height)
            .await
            .expect("Failed to create device");
        game.borrow_mut().render_state = Some(render_state);

        // Set up input handlers and buttons
        setup_input_handlers(&canvas, game.clone());
        setup_restart_button(game.clone());
        setup_settings_controls(game.clone());
        setup_blur_mute(game.clone());

        // Show HUD
        if let Some(hud) = document.get_element_by_id("hud") {
            let _ = hud.set_attribute("class", "");
        }

        // Start game loop
        request_animation_frame(game);

        log::info!("Astro Blitz running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Mouse move - aim follows the pointer
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                let w = canvas_clone.client_width() as f32;
                let h = canvas_clone.client_height() as f32;
                g.set_canvas_size(w, h);
                g.input.aim = Some(screen_to_ndc(
                    event.offset_x() as f32,
                    event.offset_y() as f32,
                    w,
                    h,
                ));
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse down - fire (and unlock the audio context on first gesture)
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                g.input.fire = true;
                g.audio.resume();
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch move - aim
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let mut g = game.borrow_mut();
                    let w = canvas_clone.client_width() as f32;
                    let h = canvas_clone.client_height() as f32;
                    g.set_canvas_size(w, h);
                    let rect = canvas_clone.get_bounding_client_rect();
                    let x = touch.client_x() as f32 - rect.left() as f32;
                    let y = touch.client_y() as f32 - rect.top() as f32;
                    g.input.aim = Some(screen_to_ndc(x, y, w, h));
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start - aim and fire
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut g = game.borrow_mut();
                g.input.fire = true;
                g.audio.resume();
                if let Some(touch) = event.touches().get(0) {
                    let w = canvas_clone.client_width() as f32;
                    let h = canvas_clone.client_height() as f32;
                    g.set_canvas_size(w, h);
                    let rect = canvas_clone.get_bounding_client_rect();
                    let x = touch.client_x() as f32 - rect.left() as f32;
                    let y = touch.client_y() as f32 - rect.top() as f32;
                    g.input.aim = Some(screen_to_ndc(x, y, w, h));
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        {
            let game = game.clone();
            let window = web_sys::window().unwrap();
            let muted = Rc::new(RefCell::new(false));
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    " " | "Enter" => {
                        g.input.fire = true;
                        g.audio.resume();
                    }
                    "m" | "M" => {
                        let mut m = muted.borrow_mut();
                        *m = !*m;
                        g.audio.set_muted(*m);
                        log::info!("Audio muted: {}", *m);
                    }
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, _time: f64) {
        {
            let mut g = game.borrow_mut();
            // Combo decay runs on the wall clock, not rAF's monotonic time
            let now = js_sys::Date::now();

            g.update(now);
            g.render();
            g.update_hud();
        }

        request_animation_frame(game);
    }

    fn setup_restart_button(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        if let Some(btn) = document.get_element_by_id("restart-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let seed = js_sys::Date::now() as u64;
                game.borrow_mut().restart(seed);
                log::info!("Game restarted with seed: {}", seed);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Look up an `<input>` by id
    fn input_element(id: &str) -> Option<HtmlInputElement> {
        web_sys::window()?
            .document()?
            .get_element_by_id(id)?
            .dyn_into()
            .ok()
    }

    /// Settings panel: quality preset, master volume, reduced motion.
    /// Every change is persisted immediately.
    fn setup_settings_controls(game: Rc<RefCell<Game>>) {
        // Reflect the loaded settings into the controls
        {
            let g = game.borrow();
            if let Some(input) = input_element("quality-input") {
                input.set_value(g.settings.quality.as_str());
            }
            if let Some(input) = input_element("volume-slider") {
                input.set_value(&format!("{}", (g.settings.master_volume * 100.0).round()));
            }
            if let Some(input) = input_element("reduced-motion") {
                input.set_checked(g.settings.reduced_motion);
            }
        }

        // Quality preset text field, accepts low/medium/high
        if let Some(input) = input_element("quality-input") {
            let game = game.clone();
            let field = input.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if let Some(preset) = QualityPreset::from_str(&field.value()) {
                    let mut g = game.borrow_mut();
                    g.settings.quality = preset;
                    g.settings.save();
                    field.set_value(preset.as_str());
                    log::info!("Quality preset: {}", preset.as_str());
                }
            });
            let _ =
                input.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Master volume slider, 0-100
        if let Some(input) = input_element("volume-slider") {
            let game = game.clone();
            let slider = input.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let volume = (slider.value().parse::<f32>().unwrap_or(80.0) / 100.0)
                    .clamp(0.0, 1.0);
                let mut g = game.borrow_mut();
                g.settings.master_volume = volume;
                g.audio.set_master_volume(volume);
                g.settings.save();
            });
            let _ =
                input.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Reduced motion checkbox
        if let Some(input) = input_element("reduced-motion") {
            let checkbox = input.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                g.settings.reduced_motion = checkbox.checked();
                g.settings.save();
            });
            let _ =
                input.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_blur_mute(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();

        // Mute on blur, restore on focus
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.settings.mute_on_blur {
                    g.audio.set_muted(true);
                }
            });
            let _ =
                window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().audio.set_muted(false);
            });
            let _ =
                window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
            closure.forget();
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
    env_logger::init();
    log::info!("Astro Blitz (native) starting...");
    log::info!("Native mode is headless - run with `trunk serve` for the web version");

    // Headless smoke run: scripted input against a seeded session
    headless_run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn headless_run() {
    use astro_blitz::consts::{CAMERA_FOV_DEG, CAMERA_Z};
    use astro_blitz::sim::{tick, GameState, TickInput, Viewport};
    use glam::Vec2;

    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(42);
    let mut state = GameState::new(seed);
    let viewport = Viewport::from_camera(CAMERA_FOV_DEG, 16.0 / 9.0, CAMERA_Z);

    let mut now_ms = 0.0;
    for step in 0..10_000u32 {
        let input = TickInput {
            aim: Some(Vec2::new(
                (step as f32 * 0.02).sin(),
                (step as f32 * 0.013).cos(),
            )),
            fire: step % 4 == 0,
        };
        tick(&mut state, &input, &viewport, now_ms);
        now_ms += 1000.0 / 60.0;

        if !state.is_active() {
            break;
        }
    }

    log::info!(
        "Run over: score {} level {} after {} ticks ({} asteroids live)",
        state.score,
        state.level,
        state.time_ticks,
        state.asteroids.len()
    );
    println!(
        "seed {seed}: score {} level {} ticks {}",
        state.score, state.level, state.time_ticks
    );
}
