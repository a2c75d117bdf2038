//! Escape Room entry point
//!
//! On the web: boots the level page, wires DOM/scene events into the game and
//! performs its effects. Natively: plays all four rooms headless and prints the
//! effect transcript.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::{Rc, Weak};

    use glam::Vec3;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlElement, HtmlInputElement, KeyboardEvent, Window};

    use escape_room::audio::{AudioManager, BackgroundMusic, MusicPlayer};
    use escape_room::consts::*;
    use escape_room::effect::{Effect, Message, PointLight};
    use escape_room::levels::ultraviolet::clue_id;
    use escape_room::platform::{Host, LocalStore, Page};
    use escape_room::puzzle::{RayHit, Symbol};
    use escape_room::timer::TimerDisplay;
    use escape_room::{Game, LevelConfig, Progress};

    // Scene queries A-Frame only exposes to JS
    #[wasm_bindgen(inline_js = "
        export function pointer_hit() {
            const cursor = document.querySelector('a-cursor') || document.querySelector('[cursor]');
            const ray = cursor && cursor.components && cursor.components.raycaster;
            if (!ray || !ray.intersections || ray.intersections.length === 0) return null;
            const hit = ray.intersections[0];
            let el = hit.object && hit.object.el;
            let interactable = false;
            while (el) {
                if (el.classList && el.classList.contains('interactable')) { interactable = true; break; }
                el = el.parentElement;
            }
            return new Float32Array([hit.point.x, hit.point.y, hit.point.z, interactable ? 1 : 0]);
        }

        export function world_position(id) {
            const el = document.getElementById(id);
            if (!el || !el.object3D || typeof THREE === 'undefined') return null;
            const v = new THREE.Vector3();
            el.object3D.getWorldPosition(v);
            return new Float32Array([v.x, v.y, v.z]);
        }

        export function set_scene_running(running) {
            const scene = document.querySelector('a-scene');
            if (!scene) return;
            if (running) scene.play(); else scene.pause();
        }

        export function on_scene_loaded(cb) {
            const scene = document.querySelector('a-scene');
            if (!scene || scene.hasLoaded) { cb(); return; }
            scene.addEventListener('loaded', () => cb(), { once: true });
        }
    ")]
    extern "C" {
        fn pointer_hit() -> JsValue;
        fn world_position(id: &str) -> JsValue;
        fn set_scene_running(running: bool);
        fn on_scene_loaded(cb: &js_sys::Function);
    }

    fn floats(value: JsValue) -> Option<Vec<f32>> {
        value.dyn_into::<js_sys::Float32Array>().ok().map(|a| a.to_vec())
    }

    fn now() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }

    /// Game plus the DOM host it performs effects on
    struct App {
        game: Game<LocalStore>,
        host: DomHost,
    }

    type Shared = Rc<RefCell<App>>;

    /// Executes effects against the page and the A-Frame scene
    struct DomHost {
        window: Window,
        document: Document,
        audio: AudioManager,
        music: Option<BackgroundMusic>,
        app: Weak<RefCell<App>>,
    }

    impl DomHost {
        fn new(window: Window, document: Document, app: Weak<RefCell<App>>) -> Self {
            let music = BackgroundMusic::find();
            if music.is_none() {
                log::info!("No background music on this page");
            }
            Self {
                window,
                document,
                audio: AudioManager::new(),
                music,
                app,
            }
        }

        fn element(&self, id: &str) -> Option<Element> {
            self.document.get_element_by_id(id)
        }

        fn html(&self, id: &str) -> Option<HtmlElement> {
            self.element(id)?.dyn_into::<HtmlElement>().ok()
        }

        fn set_display(&self, id: &str, shown: bool) {
            let Some(el) = self.html(id) else { return };
            // Overlays laid out with flexbox say so in `data-display`
            let value = if shown {
                el.get_attribute("data-display").unwrap_or_else(|| "block".to_string())
            } else {
                "none".to_string()
            };
            let _ = el.style().set_property("display", &value);
        }

        fn say(&self, msg: &Message) {
            let Some(el) = self.html(MESSAGE_ID) else { return };
            el.set_text_content(Some(&msg.text));
            let style = el.style();
            let _ = style.set_property("color", msg.tone.css());
            match msg.font_px {
                Some(px) => {
                    let _ = style.set_property("font-size", &format!("{}px", px));
                }
                None => {
                    let _ = style.remove_property("font-size");
                }
            }
        }

        fn set_text(&self, id: &str, text: &str) {
            let Some(el) = self.element(id) else { return };
            // A-Frame text entities take their text as an attribute
            if el.tag_name().eq_ignore_ascii_case("a-text") || el.has_attribute("text") {
                let _ = el.set_attribute("value", text);
            } else {
                el.set_text_content(Some(text));
            }
        }

        fn spawn_light(&self, id: &str, parent: &str, light: &PointLight) {
            let Some(parent) = self.element(parent) else { return };
            if self.element(id).is_some() {
                return;
            }
            let Ok(entity) = self.document.create_element("a-entity") else {
                return;
            };
            entity.set_id(id);
            let _ = entity.set_attribute(
                "light",
                &format!(
                    "type: point; color: {}; intensity: {}; distance: {}",
                    light.color, light.intensity, light.distance
                ),
            );
            let _ = entity.set_attribute("position", "0 0.6 0");
            let _ = parent.append_child(&entity);
        }

        fn render_timer(&self, display: &TimerDisplay) {
            let Some(el) = self.element(TIMER_ID) else { return };
            el.set_text_content(Some(&display.text));
            let classes = el.class_list();
            let _ = if display.warning {
                classes.add_1("warning")
            } else {
                classes.remove_1("warning")
            };
        }

        fn navigate(&self, page: Page) {
            log::info!("Navigating to {}", page.path());
            let _ = self.window.location().set_href(&page.path());
        }
    }

    impl Host for DomHost {
        fn perform(&mut self, effect: Effect) {
            match effect {
                Effect::Say(msg) => self.say(&msg),
                Effect::SetVisible { id, visible } => {
                    if let Some(el) = self.element(&id) {
                        let _ = el.set_attribute("visible", if visible { "true" } else { "false" });
                    }
                }
                Effect::SetAttribute { id, name, value } => {
                    if let Some(el) = self.element(&id) {
                        let _ = el.set_attribute(&name, &value);
                    }
                }
                Effect::SetClass { id, class, on } => {
                    if let Some(el) = self.element(&id) {
                        let list = el.class_list();
                        let _ = if on { list.add_1(&class) } else { list.remove_1(&class) };
                    }
                }
                Effect::SetText { id, text } => self.set_text(&id, &text),
                Effect::Display { id, shown } => self.set_display(&id, shown),
                Effect::Animate { id, animation } => {
                    if let Some(el) = self.element(&id) {
                        let _ = el.set_attribute(&animation.name, &animation.to_attribute());
                    }
                }
                Effect::SpawnLight { id, parent, light } => self.spawn_light(&id, &parent, &light),
                Effect::Remove { id } => {
                    if let Some(el) = self.element(&id) {
                        el.remove();
                    }
                }
                Effect::PlaySfx { sfx, volume } => self.audio.play(sfx, volume),
                Effect::ClearInputs { ids } => {
                    for id in ids {
                        if let Some(input) = self
                            .element(&id)
                            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
                        {
                            input.set_value("");
                        }
                    }
                }
                Effect::Focus { id } => {
                    if let Some(el) = self.html(&id) {
                        let _ = el.focus();
                    }
                }
                Effect::RenderTimer(display) => self.render_timer(&display),
                Effect::PauseMenu { shown } => self.set_display(PAUSE_MENU_ID, shown),
                Effect::SceneRunning { running } => set_scene_running(running),
                Effect::Navigate(page) => self.navigate(page),
                Effect::Reload => {
                    let _ = self.window.location().reload();
                }
                Effect::After { delay_ms, effects } => self.schedule(delay_ms, effects),
                other => log::warn!("Runtime effect reached the page: {:?}", other),
            }
        }

        fn schedule(&mut self, delay_ms: u32, effects: Vec<Effect>) {
            let app = self.app.clone();
            let closure = Closure::once(move || {
                let Some(app) = app.upgrade() else { return };
                let mut app = app.borrow_mut();
                let App { game, host } = &mut *app;
                game.apply(host, effects, now());
            });
            let _ = self.window.set_timeout_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                delay_ms as i32,
            );
            closure.forget();
        }

        fn has_element(&self, id: &str) -> bool {
            self.element(id).is_some()
        }

        fn music(&mut self) -> Option<&mut dyn MusicPlayer> {
            self.music.as_mut().map(|m| m as &mut dyn MusicPlayer)
        }
    }

    /// Level number from `<body data-level="N">`, else from `levelN.html`
    fn page_level(window: &Window, document: &Document) -> Option<u8> {
        if let Some(n) = document
            .body()
            .and_then(|b| b.get_attribute("data-level"))
            .and_then(|v| v.trim().parse().ok())
        {
            return Some(n);
        }
        let path = window.location().pathname().ok()?;
        let file = path.rsplit('/').next()?;
        file.strip_prefix("level")?.strip_suffix(".html")?.parse().ok()
    }

    fn read_config(document: &Document) -> LevelConfig {
        document
            .get_element_by_id(LEVEL_CONFIG_ID)
            .and_then(|el| el.text_content())
            .map(|json| LevelConfig::from_json(&json))
            .unwrap_or_default()
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let Some(level) = page_level(&window, &document) else {
            log::error!("Could not tell which level this page is");
            return;
        };
        log::info!("Escape Room level {} loading...", level);

        let store = LocalStore::new();
        if let Some(page) = Progress::guard(&store, level) {
            let _ = window.location().set_href(&page.path());
            return;
        }

        let config = read_config(&document);
        let seed = js_sys::Date::now() as u64;
        let Some(game) = Game::for_level(level, config, store, seed) else {
            log::error!("No room for level {}", level);
            return;
        };
        log::info!("Level {} initialized with seed: {}", level, seed);

        let app: Shared = Rc::new_cyclic(|weak| {
            RefCell::new(App {
                game,
                host: DomHost::new(window.clone(), document.clone(), weak.clone()),
            })
        });

        expose_globals(&window, app.clone());

        let start = {
            let app = app.clone();
            Closure::once_into_js(move || {
                {
                    let mut app = app.borrow_mut();
                    let App { game, host } = &mut *app;
                    game.start(host, now());
                }
                setup_scene_handlers(app.clone());
                setup_input_handlers(app.clone());
                setup_code_inputs(app.clone());
                setup_timer_poll(app.clone());
                request_animation_frame(app);
                log::info!("Escape Room running!");
            })
        };
        on_scene_loaded(start.unchecked_ref());
    }

    /// Click handlers on every object the room reacts to
    fn setup_scene_handlers(app: Shared) {
        let (ids, document) = {
            let a = app.borrow();
            let ids: Vec<String> = a.game.level().bound_ids().iter().map(|s| s.to_string()).collect();
            (ids, a.host.document.clone())
        };
        for id in ids {
            let Some(el) = document.get_element_by_id(&id) else {
                log::warn!("Scene object {} missing", id);
                continue;
            };
            let _ = el.class_list().add_1("interactable");
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut app = app.borrow_mut();
                let App { game, host } = &mut *app;
                game.activate(host, &id, now());
            });
            let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_input_handlers(app: Shared) {
        let window = app.borrow().host.window.clone();

        // First gesture ends the intro; capture so it runs before anything else
        for event in ["pointerdown", "touchstart"] {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut app = app.borrow_mut();
                let App { game, host } = &mut *app;
                game.pointer_down(host, now());
            });
            let _ = window.add_event_listener_with_callback_and_bool(
                event,
                closure.as_ref().unchecked_ref(),
                true,
            );
            closure.forget();
        }

        // Keyboard
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                // Typing in the code inputs is not a shortcut
                let typing = event
                    .target()
                    .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
                    .is_some();
                let key = event.key();
                if typing && key != "Escape" {
                    return;
                }
                let mut app = app.borrow_mut();
                let App { game, host } = &mut *app;
                game.key_down(host, &key, now());
            });
            let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Read the code inputs and submit them
    fn submit(app: &Shared) {
        let mut app = app.borrow_mut();
        let entries: Vec<String> = app
            .game
            .level()
            .code_inputs()
            .iter()
            .map(|id| {
                app.host
                    .element(id)
                    .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
                    .map(|input| input.value())
                    .unwrap_or_default()
            })
            .collect();
        let App { game, host } = &mut *app;
        game.submit_code(host, &entries, now());
    }

    fn close_overlay(app: &Shared) {
        let mut app = app.borrow_mut();
        let App { game, host } = &mut *app;
        game.close_overlay(host, now());
    }

    /// Enter submits; single-digit slots advance focus as they fill
    fn setup_code_inputs(app: Shared) {
        let (ids, document) = {
            let a = app.borrow();
            (a.game.level().code_inputs(), a.host.document.clone())
        };
        let slots = ids.len() > 1;

        for (idx, id) in ids.iter().enumerate() {
            let Some(input) = document
                .get_element_by_id(id)
                .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            else {
                continue;
            };

            {
                let app = app.clone();
                let document = document.clone();
                let prev = if idx > 0 { ids.get(idx - 1).cloned() } else { None };
                let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                    match event.key().as_str() {
                        "Enter" => submit(&app),
                        "Backspace" => {
                            let empty = event
                                .target()
                                .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
                                .map(|i| i.value().is_empty())
                                .unwrap_or(false);
                            if let (true, Some(prev)) = (empty, &prev) {
                                if let Some(el) = document
                                    .get_element_by_id(prev)
                                    .and_then(|el| el.dyn_into::<HtmlElement>().ok())
                                {
                                    let _ = el.focus();
                                }
                            }
                        }
                        _ => {}
                    }
                });
                let _ = input.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
                closure.forget();
            }

            if slots {
                let document = document.clone();
                let next = ids.get(idx + 1).cloned();
                let field = input.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                    let digit: String = field.value().chars().filter(|c| c.is_ascii_digit()).take(1).collect();
                    field.set_value(&digit);
                    if digit.is_empty() {
                        return;
                    }
                    if let Some(el) = next
                        .as_deref()
                        .and_then(|id| document.get_element_by_id(id))
                        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
                    {
                        let _ = el.focus();
                    }
                });
                let _ = input.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }

        // Overlay buttons
        for (button, close) in [("code-confirm", false), ("code-close", true)] {
            let Some(btn) = document.get_element_by_id(button) else { continue };
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                if close {
                    close_overlay(&app);
                } else {
                    submit(&app);
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_timer_poll(app: Shared) {
        let window = app.borrow().host.window.clone();
        let closure = Closure::<dyn FnMut()>::new(move || {
            let mut app = app.borrow_mut();
            let App { game, host } = &mut *app;
            game.tick(host, now());
        });
        let _ = window.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            TIMER_POLL_MS as i32,
        );
        closure.forget();
    }

    fn request_animation_frame(app: Shared) {
        let window = app.borrow().host.window.clone();
        let closure = Closure::once(move |time: f64| {
            frame_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn frame_loop(app: Shared, time: f64) {
        {
            let mut app = app.borrow_mut();
            let hit = floats(pointer_hit()).and_then(|v| match v.as_slice() {
                [x, y, z, flag] => Some(RayHit {
                    point: Vec3::new(*x, *y, *z),
                    interactable: *flag > 0.5,
                }),
                _ => None,
            });
            let anchor = |symbol: Symbol| {
                floats(world_position(&clue_id(symbol))).and_then(|v| match v.as_slice() {
                    [x, y, z] => Some(Vec3::new(*x, *y, *z)),
                    _ => None,
                })
            };
            let App { game, host } = &mut *app;
            game.frame(host, time, hit, anchor);
        }
        request_animation_frame(app);
    }

    /// Install a `window.<name>` function for the page's buttons
    fn expose(window: &Window, name: &str, f: impl FnMut(JsValue) -> JsValue + 'static) {
        let closure = Closure::<dyn FnMut(JsValue) -> JsValue>::new(f);
        if js_sys::Reflect::set(window, &JsValue::from_str(name), closure.as_ref()).is_err() {
            log::warn!("Could not expose {}", name);
        }
        closure.forget();
    }

    /// `startLevelTimer(seconds)` or `startLevelTimer({ seconds })`
    fn seconds_arg(value: &JsValue) -> Option<f64> {
        value.as_f64().or_else(|| {
            js_sys::Reflect::get(value, &JsValue::from_str("seconds"))
                .ok()
                .and_then(|v| v.as_f64())
        })
    }

    fn expose_globals(window: &Window, app: Shared) {
        macro_rules! with_app {
            ($app:ident, |$game:ident, $host:ident| $body:expr) => {{
                let mut app = $app.borrow_mut();
                let App { game: $game, host: $host } = &mut *app;
                $body
            }};
        }

        let a = app.clone();
        expose(window, "resumeGame", move |_| {
            with_app!(a, |game, host| game.resume(host));
            JsValue::UNDEFINED
        });
        let a = app.clone();
        expose(window, "togglePauseMusic", move |_| {
            with_app!(a, |game, host| game.toggle_music(host));
            JsValue::UNDEFINED
        });
        let a = app.clone();
        expose(window, "toggleMusic", move |_| {
            with_app!(a, |game, host| game.toggle_music(host));
            JsValue::UNDEFINED
        });
        let a = app.clone();
        expose(window, "updatePauseVolume", move |value| {
            let raw = value
                .as_string()
                .or_else(|| value.as_f64().map(|v| (v as i64).to_string()))
                .unwrap_or_default();
            with_app!(a, |game, host| game.set_volume(host, &raw));
            JsValue::UNDEFINED
        });
        let a = app.clone();
        expose(window, "startLevelTimer", move |value| {
            let started = with_app!(a, |game, host| game.start_timer(host, now(), seconds_arg(&value)));
            JsValue::from_bool(started)
        });
        let a = app.clone();
        expose(window, "stopLevelTimer", move |_| {
            a.borrow_mut().game.stop_timer();
            JsValue::UNDEFINED
        });
        let a = app.clone();
        expose(window, "checkCode", move |_| {
            submit(&a);
            JsValue::UNDEFINED
        });
        let a = app.clone();
        expose(window, "closeCodeOverlay", move |_| {
            close_overlay(&a);
            JsValue::UNDEFINED
        });
        let a = app.clone();
        expose(window, "getUnlockedLevel", move |_| {
            JsValue::from_f64(a.borrow().game.unlocked_level() as f64)
        });
        let a = app.clone();
        expose(window, "unlockLevel", move |value| {
            let level = value.as_f64().map(|v| v as u8).unwrap_or(0);
            JsValue::from_f64(a.borrow_mut().game.unlock_level(level) as f64)
        });
        expose(window, "resetProgress", move |_| {
            app.borrow_mut().game.reset_progress();
            JsValue::UNDEFINED
        });
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
mod walkthrough {
    use clap::Parser;
    use glam::Vec3;
    use serde::Serialize;

    use escape_room::effect::Effect;
    use escape_room::game::{Intro, run_for};
    use escape_room::levels::LEVEL_COUNT;
    use escape_room::levels::candles::candle_id;
    use escape_room::platform::{MemoryStore, Page, RecordingHost};
    use escape_room::puzzle::{Label, RayHit, Symbol};
    use escape_room::{Game, LevelConfig, LevelController};

    /// Play all four rooms headless and print what the page would see
    #[derive(Parser)]
    #[command(name = "escape-room")]
    #[command(about = "Headless walkthrough of the four escape rooms")]
    pub struct Cli {
        /// Seed for the secret codes
        #[arg(default_value_t = 1)]
        seed: u64,
        /// Print effects as JSON lines
        #[arg(long)]
        json: bool,
    }

    #[derive(Serialize)]
    struct Record<'a> {
        level: u8,
        effect: &'a Effect,
    }

    /// Where the UV clues hang in the headless scene
    fn clue_anchor(symbol: Symbol) -> Option<Vec3> {
        Some(match symbol {
            Symbol::Tri => Vec3::new(-2.0, 1.5, -4.0),
            Symbol::Cir => Vec3::new(2.0, 1.5, -4.0),
            Symbol::Sqr => Vec3::new(4.0, 1.5, 0.0),
            Symbol::X => Vec3::new(-4.0, 1.5, 0.0),
        })
    }

    fn click(game: &mut Game<MemoryStore>, host: &mut RecordingHost, ids: &[&str]) {
        for id in ids {
            let now = host.now();
            game.activate(host, id, now);
            run_for(game, host, 300.0);
        }
    }

    fn code(digits: &[u8]) -> Vec<String> {
        digits.iter().map(|d| d.to_string()).collect()
    }

    /// Solve the current room the way a player would
    fn solve(game: &mut Game<MemoryStore>, host: &mut RecordingHost) {
        if game.intro() == Intro::Waiting {
            let now = host.now();
            game.pointer_down(host, now);
            run_for(game, host, 2_700.0);
        }

        match game.level().clone() {
            LevelController::Keys(_) => {
                click(game, host, &["drawer1", "key1", "boxLid", "key2", "picture1", "key3"]);
            }
            LevelController::Candles(room) => {
                click(game, host, &["lighter", "order-board"]);
                for n in room.order() {
                    let id = candle_id(*n);
                    click(game, host, &[id.as_str()]);
                }
            }
            LevelController::Terminal(_) => {
                click(game, host, &["clue-1", "clue-2", "clue-3", "clue-4"]);
                run_for(game, host, 600.0);
                click(game, host, &["terminal"]);
                // A wrong first try reshuffles the order
                let LevelController::Terminal(room) = game.level() else { return };
                let mut wrong = room.expected_code();
                wrong.rotate_left(1);
                let wrong = code(&wrong).concat();
                let now = host.now();
                game.submit_code(host, &[wrong], now);
                let LevelController::Terminal(room) = game.level() else { return };
                let entry = code(&room.expected_code()).concat();
                let now = host.now();
                game.submit_code(host, &[entry], now);
            }
            LevelController::Ultraviolet(room) => {
                click(game, host, &["uv-drawer", "uv-flashlight"]);
                let now = host.now();
                game.key_down(host, "u", now);
                for symbol in Symbol::ALL {
                    let hit = clue_anchor(*symbol).map(|point| RayHit {
                        point,
                        interactable: false,
                    });
                    for _ in 0..4 {
                        run_for(game, host, 50.0);
                        let now = host.now();
                        game.frame(host, now, hit, clue_anchor);
                    }
                    log::debug!("{} revealed", symbol.name());
                }
                click(game, host, &["terminal"]);
                let now = host.now();
                game.submit_code(host, &code(&room.expected_code()), now);
            }
        }
        run_for(game, host, 700.0);
        click(game, host, &["door"]);
        run_for(game, host, 3_000.0);
    }

    fn print(level: u8, host: &RecordingHost, json: bool) -> Result<(), serde_json::Error> {
        for effect in &host.performed {
            // The clock re-renders four times a second
            if matches!(effect, Effect::RenderTimer(_)) {
                continue;
            }
            if json {
                let record = Record { level, effect };
                println!("{}", serde_json::to_string(&record)?);
            } else {
                println!("[level {}] {:?}", level, effect);
            }
        }
        Ok(())
    }

    pub fn run(cli: Cli) -> Result<(), serde_json::Error> {
        let mut store = MemoryStore::new();
        let mut level = 1;

        while level <= LEVEL_COUNT {
            let Some(mut game) = Game::for_level(level, LevelConfig::default(), store, cli.seed) else {
                break;
            };
            let mut host = RecordingHost::new();
            game.start(&mut host, 0.0);
            solve(&mut game, &mut host);
            print(level, &host, cli.json)?;

            let next = host.performed.iter().find_map(|e| match e {
                Effect::Navigate(page) => Some(*page),
                _ => None,
            });
            log::info!(
                "Level {} done in {:.1}s, unlocked: {}",
                level,
                host.now() / 1000.0,
                game.unlocked_level()
            );
            store = game.into_store();
            match next {
                Some(Page::Level(n)) => level = n,
                Some(Page::Hub) => {
                    log::info!("Back at the hub - game complete");
                    break;
                }
                None => {
                    log::warn!("Level {} did not finish", level);
                    break;
                }
            }
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), serde_json::Error> {
    use clap::Parser;

    env_logger::init();
    log::info!("Escape Room (native) starting...");
    walkthrough::run(walkthrough::Cli::parse())
}
