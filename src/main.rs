//! Skydrive entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, HtmlInputElement, HtmlSelectElement, KeyboardEvent, TouchEvent};

    use skydrive::platform::{self, LocalStorage};
    use skydrive::renderer::{RenderState, scene};
    use skydrive::shop::{self, CatalogKind};
    use skydrive::sim::{Direction, Viewport};
    use skydrive::{Engine, Settings, Tuning};

    /// Game instance holding all state
    struct Game {
        engine: Engine<LocalStorage>,
        render_state: Option<RenderState>,
        settings: Settings,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
        /// Shop lists need redrawing after a purchase
        shop_dirty: bool,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            let settings = Settings::load(&LocalStorage::open());
            Self {
                engine: Engine::new(LocalStorage::open(), Tuning::default(), seed),
                render_state: None,
                settings,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
                shop_dirty: true,
            }
        }

        fn update(&mut self, time: f64) {
            self.engine.frame(time);

            // Track frame times for FPS
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;
            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }
        }

        /// Render the current frame
        fn render(&mut self) {
            let Some(ref mut render_state) = self.render_state else {
                return;
            };
            let grid_size = self.engine.tuning().world.grid_size;
            let vertices = scene::build(&self.engine.state, &self.settings, grid_size);
            match render_state.render(&vertices, &self.engine.state.camera) {
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
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let hud = self.engine.hud();

            let set_text = |id: &str, text: &str| {
                if let Some(el) = document.get_element_by_id(id) {
                    el.set_text_content(Some(text));
                }
            };
            set_text("speed-val", &hud.speed.to_string());
            set_text("time-val", &hud.playtime);
            set_text("points-val", &hud.currency.to_string());
            set_text("mode-text", hud.mode_label());

            if let Some(el) = document.get_element_by_id("mode-indicator") {
                let class = format!("mode-tag {}", hud.mode_label().to_lowercase());
                let _ = el.set_attribute("class", &class);
            }

            if let Some(el) = document.get_element_by_id("hud-fps") {
                if self.settings.show_fps {
                    let _ = el.set_attribute("class", "");
                    el.set_text_content(Some(&format!("{} FPS", self.fps)));
                } else {
                    let _ = el.set_attribute("class", "hidden");
                }
            }
        }

        /// Redraw both catalog lists with owned/active markers
        fn render_shop(&mut self) {
            if !self.shop_dirty {
                return;
            }
            self.shop_dirty = false;
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            let progression = &self.engine.progression;
            for (list_id, kind) in [("car-list", CatalogKind::Car), ("plane-list", CatalogKind::Plane)] {
                let Some(list) = document.get_element_by_id(list_id) else {
                    continue;
                };
                let html: String = shop::catalog(kind)
                    .iter()
                    .map(|item| {
                        let owned = progression.is_owned(item.id);
                        let active = progression.active().id == item.id;
                        let label = if owned {
                            "OWNED".to_string()
                        } else {
                            format!("{} PTS", item.cost)
                        };
                        format!(
                            r#"<button class="skin-btn{}{}" data-item="{}"><div class="swatch" style="background:{}"></div><div class="cost">{}</div></button>"#,
                            if owned { " owned" } else { "" },
                            if active { " active" } else { "" },
                            item.id,
                            item.color,
                            label
                        )
                    })
                    .collect();
                list.set_inner_html(&html);
            }

            if let Some(btn) = document.get_element_by_id("buy-upgrade") {
                if progression.map_expanded() {
                    let _ = btn.set_attribute("disabled", "");
                } else {
                    let _ = btn.remove_attribute("disabled");
                }
            }
        }

        fn buy_or_equip(&mut self, item_id: &str) {
            match self.engine.buy_or_equip(item_id) {
                Ok(()) => self.shop_dirty = true,
                Err(e) => log::info!("Shop: {}", e),
            }
        }

        fn buy_expansion(&mut self) {
            match self.engine.apply_map_expansion() {
                Ok(()) => self.shop_dirty = true,
                Err(e) => log::info!("Upgrade: {}", e),
            }
        }

        fn save_settings(&self) {
            self.settings.save(&mut LocalStorage::open());
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Skydrive starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("gameCanvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let seed = platform::now_ms() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));
        let (width, height) = fit_canvas(&canvas, &mut game.borrow_mut());
        log::info!("Game initialized with seed: {}", seed);

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .expect("Failed to create surface");

        match instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
        {
            Ok(adapter) => {
                log::info!("Using adapter: {:?}", adapter.get_info().name);
                match RenderState::new(surface, &adapter, width, height).await {
                    Ok(render_state) => game.borrow_mut().render_state = Some(render_state),
                    Err(e) => log::error!("Failed to create device: {}", e),
                }
            }
            Err(e) => log::error!("No graphics adapter: {}", e),
        }

        if platform::is_touch_device() {
            if let Some(el) = document.get_element_by_id("mobile-controls") {
                let _ = el.class_list().remove_1("hidden");
            }
        }

        setup_keyboard(game.clone());
        setup_touch_controls(game.clone());
        setup_shop(game.clone());
        setup_settings(game.clone());
        setup_lifecycle(&canvas, game.clone());

        // Start game loop
        request_animation_frame(game);

        log::info!("Skydrive running!");
    }

    /// Size the canvas to the window; returns the physical pixel size
    fn fit_canvas(canvas: &HtmlCanvasElement, game: &mut Game) -> (u32, u32) {
        let Some(window) = web_sys::window() else {
            return (canvas.width(), canvas.height());
        };
        let dpr = window.device_pixel_ratio();
        let css_w = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(800.0);
        let css_h = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(600.0);
        let width = ((css_w * dpr) as u32).max(1);
        let height = ((css_h * dpr) as u32).max(1);
        canvas.set_width(width);
        canvas.set_height(height);

        // One world unit per CSS pixel
        game.engine.set_viewport(Viewport::new(css_w as f32, css_h as f32));
        if let Some(ref mut render_state) = game.render_state {
            render_state.resize(width, height);
        }
        (width, height)
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let key = event.key();
                let mut g = game.borrow_mut();
                if key == " " {
                    event.prevent_default();
                    if !event.repeat() {
                        g.engine.commands.toggle_pressed();
                    }
                } else if let Some(dir) = Direction::from_key(&key) {
                    event.prevent_default();
                    g.engine.input.set(dir, true);
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let key = event.key();
                let mut g = game.borrow_mut();
                if key == " " {
                    g.engine.commands.toggle_released();
                } else if let Some(dir) = Direction::from_key(&key) {
                    g.engine.input.set(dir, false);
                }
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_touch_controls(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        let bindings = [
            ("btn-left", Direction::Left),
            ("btn-right", Direction::Right),
            ("btn-gas", Direction::Up),
            ("btn-brake", Direction::Down),
        ];
        for (id, dir) in bindings {
            let Some(btn) = document.get_element_by_id(id) else {
                continue;
            };
            for (event_name, pressed) in [("touchstart", true), ("touchend", false), ("touchcancel", false)] {
                let game = game.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                    event.prevent_default();
                    game.borrow_mut().engine.input.set(dir, pressed);
                });
                let _ = btn.add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }

        if let Some(btn) = document.get_element_by_id("mode-swap") {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                game.borrow_mut().engine.commands.toggle_tapped();
            });
            let _ = btn.add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_shop(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        // Open / close
        for (id, show) in [("shop-btn", true), ("close-shop", false)] {
            let Some(btn) = document.get_element_by_id(id) else {
                continue;
            };
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let Some(overlay) = web_sys::window()
                    .and_then(|w| w.document())
                    .and_then(|d| d.get_element_by_id("shop-overlay"))
                else {
                    return;
                };
                if show {
                    let mut g = game.borrow_mut();
                    g.shop_dirty = true;
                    g.render_shop();
                    let _ = overlay.class_list().remove_1("hidden");
                } else {
                    let _ = overlay.class_list().add_1("hidden");
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Item buttons are regenerated, so listen on the lists
        for list_id in ["car-list", "plane-list"] {
            let Some(list) = document.get_element_by_id(list_id) else {
                continue;
            };
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::MouseEvent| {
                let item_id = event
                    .target()
                    .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
                    .and_then(|el| el.closest("[data-item]").ok().flatten())
                    .and_then(|el| el.get_attribute("data-item"));
                if let Some(item_id) = item_id {
                    let mut g = game.borrow_mut();
                    g.buy_or_equip(&item_id);
                    g.render_shop();
                }
            });
            let _ = list.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("buy-upgrade") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let mut g = game.borrow_mut();
                g.buy_expansion();
                g.render_shop();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_settings(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        let checkboxes: [(&str, fn(&mut Settings) -> &mut bool); 3] = [
            ("opt-grid", |s| &mut s.show_grid),
            ("opt-shadows", |s| &mut s.shadows),
            ("opt-fps", |s| &mut s.show_fps),
        ];
        for (id, field) in checkboxes {
            let Some(input) = document
                .get_element_by_id(id)
                .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            else {
                continue;
            };
            input.set_checked(*field(&mut game.borrow_mut().settings));

            let game = game.clone();
            let input_clone = input.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                *field(&mut g.settings) = input_clone.checked();
                g.save_settings();
            });
            let _ = input.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(select) = document.get_element_by_id("opt-quality") {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
                let value = event
                    .target()
                    .and_then(|t| t.dyn_into::<HtmlSelectElement>().ok())
                    .map(|el| el.value());
                if let Some(preset) = value.as_deref().and_then(skydrive::QualityPreset::parse) {
                    let mut g = game.borrow_mut();
                    g.settings.apply_preset(preset);
                    g.save_settings();
                    log::info!("Quality set to {}", preset.as_str());
                }
            });
            let _ = select.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_lifecycle(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Resize
        {
            let game = game.clone();
            let canvas = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                fit_canvas(&canvas, &mut game.borrow_mut());
            });
            let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Tab hidden: drop held keys and save
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut g = game.borrow_mut();
                    g.engine.release_input();
                    g.engine.save();
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur: keyup never arrives for keys held while leaving
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().engine.release_input();
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().engine.save();
            });
            let _ = window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
            closure.forget();
        }
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
            g.update(time);
            g.render();
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use skydrive::platform::{self, LocalStorage};
    use skydrive::sim::{Direction, Viewport};
    use skydrive::{Engine, Tuning};

    env_logger::init();
    log::info!("Skydrive (native) starting...");
    log::info!("Native mode runs headless - use `trunk serve` for the web version");

    // Optional tuning override: `skydrive tuning.json`
    let tuning = match std::env::args().nth(1) {
        Some(path) => match std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|json| Tuning::from_json(&json).map_err(|e| e.to_string()))
        {
            Ok(tuning) => tuning,
            Err(e) => {
                log::error!("Bad tuning file {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => Tuning::default(),
    };

    let seed = platform::now_ms() as u64;
    let mut engine = Engine::new(LocalStorage::open(), tuning, seed);
    engine.set_viewport(Viewport::new(1280.0, 720.0));

    // Drive forward for a few seconds, take off, then turn
    let frame_ms = 1000.0 / 60.0;
    let mut now = 0.0;
    let mut hits = 0;
    for frame in 0..600 {
        match frame {
            0 => engine.input.set(Direction::Up, true),
            180 => engine.commands.toggle_pressed(),
            181 => engine.commands.toggle_released(),
            300 => engine.input.set(Direction::Right, true),
            _ => {}
        }
        if engine.frame(now).hit_obstacle {
            hits += 1;
        }
        now += frame_ms;
    }
    engine.save();

    let hud = engine.hud();
    log::info!(
        "After 10s: pos ({:.0}, {:.0}), speed {}, mode {}, altitude {:.2}, obstacle hits {}, playtime {}",
        engine.state.vehicle.pos.x,
        engine.state.vehicle.pos.y,
        hud.speed,
        hud.mode_label(),
        engine.state.vehicle.altitude,
        hits,
        hud.playtime
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
