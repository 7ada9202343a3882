//! Asteroid Range entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use serde::Serialize;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, KeyboardEvent, MouseEvent};

    use asteroid_range::audio::AudioManager;
    use asteroid_range::highscores::LocalStorage;
    use asteroid_range::sim::{GameEvent, GameState, TickInput, WeaponKind};
    use asteroid_range::{Session, Settings, Tuning};

    // JS bindings for pointer lock and the external scene renderer
    #[wasm_bindgen(inline_js = "
        export function request_pointer_lock() {
            const canvas = document.getElementById('canvas');
            if (canvas) {
                const result = canvas.requestPointerLock();
                if (result && result.catch) {
                    result.catch(e => console.error('Pointer lock failed:', e));
                }
            }
        }

        export function render_frame(json) {
            if (typeof window.renderAsteroidRange === 'function') {
                window.renderAsteroidRange(JSON.parse(json));
            }
        }

        export function visual_effect(json) {
            if (typeof window.asteroidRangeEffect === 'function') {
                window.asteroidRangeEffect(JSON.parse(json));
            }
        }
    ")]
    extern "C" {
        fn request_pointer_lock();
        fn render_frame(json: &str);
        fn visual_effect(json: &str);
    }

    /// What the renderer needs each frame
    #[derive(Serialize)]
    struct FrameView<'a> {
        eye: [f32; 3],
        yaw: f32,
        pitch: f32,
        targets: Vec<TargetView<'a>>,
        pickups: Vec<([f32; 3], &'static str)>,
    }

    #[derive(Serialize)]
    struct TargetView<'a> {
        id: &'a str,
        pos: [f32; 3],
        size: f32,
        color: &'static str,
        is_hit: bool,
    }

    impl<'a> FrameView<'a> {
        fn of(state: &'a GameState) -> Self {
            Self {
                eye: state.player.pos.to_array(),
                yaw: state.player.yaw,
                pitch: state.player.pitch,
                targets: state
                    .targets
                    .iter()
                    .map(|t| TargetView {
                        id: t.id.as_str(),
                        pos: t.pos.to_array(),
                        size: t.size,
                        color: t.color().hex(),
                        is_hit: t.is_hit,
                    })
                    .collect(),
                pickups: state
                    .pickups
                    .iter()
                    .map(|p| (p.pos.to_array(), p.kind.flash_color().css()))
                    .collect(),
            }
        }
    }

    /// Game instance holding all state
    struct Game {
        session: Session<LocalStorage>,
        settings: Settings,
        audio: AudioManager,
        input: TickInput,
        last_time: f64,
        pointer_locked: bool,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            let settings = Settings::load();
            let mut audio = AudioManager::new();
            audio.apply_settings(&settings);
            Self {
                session: Session::new(Tuning::for_mode(settings.mode), seed, LocalStorage),
                settings,
                audio,
                input: TickInput::default(),
                last_time: 0.0,
                pointer_locked: false,
            }
        }

        /// Run simulation ticks and dispatch what they produced
        fn update(&mut self, dt: f32) {
            self.session.advance(dt, &mut self.input);
            for event in self.session.drain_events() {
                self.dispatch(&event);
            }
        }

        fn dispatch(&mut self, event: &GameEvent) {
            self.audio.handle(event);
            match event {
                GameEvent::Flash { color, duration_ms } if !self.settings.reduced_flashes => {
                    show_flash(color.css(), *duration_ms);
                }
                GameEvent::Beam { .. } | GameEvent::Explosion { .. } => {
                    if let Ok(json) = serde_json::to_string(event) {
                        visual_effect(&json);
                    }
                }
                GameEvent::ReleasePointerLock => {
                    if let Some(document) = document() {
                        document.exit_pointer_lock();
                    }
                }
                GameEvent::GameOver(reason) => log::info!("Game over: {:?}", reason),
                _ => {}
            }
        }

        /// Hand the scene to the renderer
        fn render(&self) {
            match serde_json::to_string(&FrameView::of(&self.session.state)) {
                Ok(json) => render_frame(&json),
                Err(e) => log::warn!("Frame encode failed: {}", e),
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = document() else { return };
            let state = &self.session.state;
            let set = |selector: &str, text: &str| {
                if let Some(el) = document.query_selector(selector).ok().flatten() {
                    el.set_text_content(Some(text));
                }
            };

            set("#hud-score .hud-value", &state.stats.score.to_string());
            set("#hud-health .hud-value", &format!("{:.0}", state.player.health));
            set("#hud-accuracy .hud-value", &format!("{:.1}%", state.stats.accuracy()));
            set("#hud-high-score .hud-value", &state.records.high_score.to_string());

            let weapon = state.armory.selected;
            let slot = state.armory.slot(weapon);
            set("#hud-weapon .hud-value", weapon.name());
            set("#hud-ammo .hud-value", &format!("{}/{}", slot.ammo, slot.max_ammo));

            if let Some(el) = document.get_element_by_id("hud-shield") {
                let class = if state.player.shield { "hud-item" } else { "hud-item hidden" };
                let _ = el.set_attribute("class", class);
            }

            // Show/hide game over
            if let Some(el) = document.get_element_by_id("game-over") {
                if state.is_over() {
                    let _ = el.set_attribute("class", "");
                    set("#final-score", &state.stats.score.to_string());
                    set("#final-accuracy", &format!("{:.1}%", state.stats.accuracy()));
                } else {
                    let _ = el.set_attribute("class", "hidden");
                }
            }
        }

        fn restart(&mut self, seed: u64) {
            self.session.restart(seed);
            self.input = TickInput::default();
        }
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    /// Tint the overlay for a moment
    fn show_flash(css: &str, duration_ms: u32) {
        let Some(window) = web_sys::window() else { return };
        let Some(overlay) = window.document().and_then(|d| d.get_element_by_id("flash-overlay")) else {
            return;
        };
        let _ = overlay.set_attribute("style", &format!("background-color: {}", css));

        let clear = Closure::once(move || {
            let _ = overlay.set_attribute("style", "background-color: transparent");
        });
        let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            clear.as_ref().unchecked_ref(),
            duration_ms as i32,
        );
        clear.forget();
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialised".into());
        }

        log::info!("Asteroid Range starting...");

        let Some(document) = document() else {
            log::error!("No document; cannot start");
            return;
        };

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let Some(canvas) = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("No #canvas element; cannot start");
            return;
        };

        // Initialize game
        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));
        log::info!("Game initialized with seed: {}", seed);

        // Set up input handlers
        setup_input_handlers(&canvas, game.clone());

        // Set up restart button
        setup_restart_button(game.clone());

        // Set up mute on blur
        setup_focus_handlers(game.clone());

        // Show HUD
        if let Some(hud) = document.get_element_by_id("hud") {
            let _ = hud.set_attribute("class", "");
        }

        // Start game loop
        request_animation_frame(game);

        log::info!("Asteroid Range running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let Some(doc) = window.document() else { return };

        // Pointer lock change handler
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let locked = document().is_some_and(|d| d.pointer_lock_element().is_some());
                if locked {
                    log::info!("Pointer lock acquired");
                } else {
                    log::info!("Pointer lock released");
                }
                let mut g = game.borrow_mut();
                g.pointer_locked = locked;
                if !locked {
                    // Keys held while unlocking never see their keyup
                    g.input = TickInput::default();
                }
            });
            let _ = doc.add_event_listener_with_callback(
                "pointerlockchange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Pointer lock error handler
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                log::error!("Pointer lock error!");
            });
            let _ = doc.add_event_listener_with_callback(
                "pointerlockerror",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Mouse move - look around while locked
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                if g.pointer_locked {
                    let delta = g
                        .settings
                        .look_delta(event.movement_x() as f32, event.movement_y() as f32);
                    g.input.look_delta += delta;
                }
            });
            let _ = doc
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse click - fire when locked, otherwise grab the pointer
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                g.audio.resume();
                if g.pointer_locked {
                    if !g.session.state.is_over() {
                        g.input.fire = true;
                    }
                } else if !g.session.state.is_over() {
                    drop(g); // Release borrow before calling into JS
                    request_pointer_lock();
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        for (kind, pressed) in [("keydown", true), ("keyup", false)] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                let input = &mut g.input;
                match event.code().as_str() {
                    "KeyW" => input.forward = pressed,
                    "KeyS" => input.back = pressed,
                    "KeyA" => input.left = pressed,
                    "KeyD" => input.right = pressed,
                    "Space" => input.up = pressed,
                    "ShiftLeft" | "ShiftRight" => input.down = pressed,
                    "Digit1" if pressed => input.select = WeaponKind::from_slot(1),
                    "Digit2" if pressed => input.select = WeaponKind::from_slot(2),
                    "Digit3" if pressed => input.select = WeaponKind::from_slot(3),
                    "KeyR" if pressed => input.reload = true,
                    _ => {}
                }
            });
            let _ = window.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                asteroid_range::consts::SIM_DT
            };
            g.last_time = time;

            g.update(dt);
            g.render();
            g.update_hud();
        }

        request_animation_frame(game);
    }

    fn setup_restart_button(game: Rc<RefCell<Game>>) {
        let Some(btn) = document().and_then(|d| d.get_element_by_id("restart-btn")) else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            let seed = js_sys::Date::now() as u64;
            game.borrow_mut().restart(seed);
            log::info!("Game restarted with seed: {}", seed);
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_focus_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };

        for (kind, focused) in [("blur", false), ("focus", true)] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.settings.mute_on_blur {
                    g.audio.set_muted(!focused);
                }
                if !focused {
                    g.input = TickInput::default();
                }
            });
            let _ = window.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Asteroid Range (native) starting...");
    log::info!("Native mode runs a headless autoplay; use `trunk serve` for the web version");

    let mode = std::env::args()
        .nth(1)
        .and_then(|arg| asteroid_range::GameMode::from_str(&arg))
        .unwrap_or_default();
    headless::run(mode, 0xA57E_401D);
}

/// Scripted player for exercising the simulation without a browser
#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use glam::Vec2;

    use asteroid_range::consts::SIM_DT;
    use asteroid_range::sim::{GameEvent, TickInput, WeaponKind, WeaponStatus};
    use asteroid_range::{GameMode, MemoryStorage, Session, Tuning};

    /// Simulated seconds before giving up
    const TIME_LIMIT: f32 = 180.0;

    pub fn run(mode: GameMode, seed: u64) {
        let mut session = Session::new(Tuning::for_mode(mode), seed, MemoryStorage::new());
        let mut input = TickInput::default();
        let mut events = 0usize;
        let mut frame = 0u32;

        while !session.state.is_over() && session.state.time < TIME_LIMIT {
            aim_at_nearest(&session.state, &mut input);

            let armory = &session.state.armory;
            if armory.status(armory.selected) == WeaponStatus::Empty {
                let next = WeaponKind::ALL
                    .into_iter()
                    .find(|k| armory.status(*k) != WeaponStatus::Empty);
                match next {
                    Some(kind) => input.select = Some(kind),
                    None => input.reload = true,
                }
            }
            input.fire = frame % 20 == 0;

            session.advance(SIM_DT, &mut input);
            for event in session.drain_events() {
                if let GameEvent::GameOver(reason) = event {
                    log::info!("Session ended: {:?}", reason);
                }
                events += 1;
            }
            frame += 1;
        }

        let state = &session.state;
        println!(
            "{} range: {:.1}s, score {}, hits {}, misses {}, accuracy {:.1}%, health {:.0}, {} events",
            mode.as_str(),
            state.time,
            state.stats.score,
            state.stats.hits,
            state.stats.misses,
            state.stats.accuracy(),
            state.player.health,
            events
        );
    }

    /// Turn toward the closest live target
    fn aim_at_nearest(state: &asteroid_range::sim::GameState, input: &mut TickInput) {
        let eye = state.player.pos;
        let Some(target) = state.live_targets().min_by(|a, b| {
            eye.distance_squared(a.pos).total_cmp(&eye.distance_squared(b.pos))
        }) else {
            return;
        };

        let dir = (target.pos - eye).normalize_or_zero();
        if dir == glam::Vec3::ZERO {
            return;
        }
        let yaw = (-dir.x).atan2(-dir.z);
        let pitch = dir.y.clamp(-1.0, 1.0).asin();
        input.look_delta = Vec2::new(state.player.yaw - yaw, state.player.pitch - pitch);
    }
}
