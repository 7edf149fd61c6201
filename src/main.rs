//! Blockhop entry point
//!
//! On web: wires the page's buttons, editor canvas, touch controls and
//! keyboard into a `Session` and renders one view per animation frame.
//! Natively: a headless runner that plays a level from a scripted input
//! sequence and reports what happened.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlSelectElement, KeyboardEvent, MouseEvent};

    use blockhop::platform::{KeyState, TouchButton};
    use blockhop::sim::{Game, TileMap};
    use blockhop::{EditorClick, MapEditor, Screen, Session, Settings};

    #[wasm_bindgen]
    extern "C" {
        /// Page-provided renderer; receives the current view as JSON
        #[wasm_bindgen(js_namespace = window, js_name = renderFrame)]
        fn render_frame(view: &str);
    }

    type App = Rc<RefCell<Session>>;

    /// The editor's saved level if there is one, else the built-in level
    fn initial_map() -> TileMap {
        let mut editor = MapEditor::new();
        match editor.restore() {
            Ok(true) => editor.into_map(),
            Ok(false) => TileMap::default_level(),
            Err(e) => {
                log::warn!("Stored map unusable, using default level: {e}");
                TileMap::default_level()
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Blockhop starting...");

        let settings = Settings::load();
        let map = initial_map();
        let game = match Game::with_settings(map.clone(), &settings) {
            Ok(game) => game,
            Err(e) => {
                log::warn!("Bad settings, using defaults: {e}");
                Game::new(map)
            }
        };

        let app = Rc::new(RefCell::new(Session::new(game)));

        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::error!("No document");
            return;
        };

        setup_input_handlers(app.clone());
        setup_touch_controls(&document, &app);
        setup_menu_buttons(&document, &app);
        setup_editor(&document, &app);

        // Pages without a menu go straight to play
        if document.get_element_by_id("btn-play").is_none() {
            app.borrow_mut().play();
        }
        show_screen(&document, app.borrow().screen());

        request_animation_frame(app);

        log::info!("Blockhop running!");
    }

    fn show_screen(document: &Document, screen: Screen) {
        for s in Screen::ALL {
            if let Some(el) = document.get_element_by_id(s.element_id()) {
                let _ = el.class_list().toggle_with_force("active", s == screen);
            }
        }
    }

    fn alert(message: &str) {
        if let Some(window) = web_sys::window() {
            let _ = window.alert_with_message(message);
        }
    }

    fn confirm(message: &str) -> bool {
        web_sys::window()
            .and_then(|w| w.confirm_with_message(message).ok())
            .unwrap_or(false)
    }

    /// Attach a click handler to `#id` if the page has it
    fn on_click(document: &Document, id: &str, mut handler: impl FnMut() + 'static) {
        let Some(btn) = document.get_element_by_id(id) else {
            log::debug!("No #{id} on this page");
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| handler());
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Run a session command from a button, then sync the visible screen
    fn on_command(document: &Document, app: &App, id: &str, command: fn(&mut Session)) {
        let app = app.clone();
        let doc = document.clone();
        on_click(document, id, move || {
            command(&mut app.borrow_mut());
            show_screen(&doc, app.borrow().screen());
        });
    }

    fn setup_menu_buttons(document: &Document, app: &App) {
        on_command(document, app, "btn-play", Session::play);
        on_command(document, app, "btn-editor", Session::open_editor);
        on_command(document, app, "btn-menu", Session::to_menu);
        on_command(document, app, "btn-editor-menu", Session::to_menu);

        {
            let app = app.clone();
            on_click(document, "btn-save-map", move || {
                let result = app.borrow().save_map();
                match result {
                    Ok(_) => alert("Map saved!"),
                    Err(e) => alert(&format!("Could not save map: {e}")),
                }
            });
        }

        {
            let app = app.clone();
            on_click(document, "btn-load-map", move || {
                let result = app.borrow_mut().load_saved_map();
                match result {
                    Ok(true) => alert("Map loaded!"),
                    Ok(false) => alert("No saved map found!"),
                    Err(e) => alert(&format!("Saved map unusable: {e}")),
                }
            });
        }

        {
            let app = app.clone();
            on_click(document, "btn-clear-map", move || {
                if confirm("Clear entire map?") {
                    app.borrow_mut().clear_map();
                }
            });
        }

        {
            let app = app.clone();
            let doc = document.clone();
            on_click(document, "btn-test-map", move || {
                let result = app.borrow_mut().test_map();
                match result {
                    Ok(()) => show_screen(&doc, app.borrow().screen()),
                    Err(e) => alert(&format!("Map cannot be played: {e}")),
                }
            });
        }
    }

    fn setup_editor(document: &Document, app: &App) {
        if let Some(select) = document.get_element_by_id("block-type") {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
                if let Some(select) = event
                    .target()
                    .and_then(|t| t.dyn_into::<HtmlSelectElement>().ok())
                {
                    app.borrow_mut().set_brush(&select.value());
                }
            });
            let _ =
                select.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        let Some(canvas) = document.get_element_by_id("editor-canvas") else {
            return;
        };

        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let click = EditorClick::from_mouse(event.button(), event.shift_key(), event.alt_key());
                app.borrow_mut()
                    .pointer_down(event.offset_x() as f32, event.offset_y() as f32, click);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                app.borrow_mut()
                    .pointer_move(event.offset_x() as f32, event.offset_y() as f32);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Right click erases on mousedown; keep the context menu away
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                event.prevent_default();
            });
            let _ = canvas
                .add_event_listener_with_callback("contextmenu", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Released anywhere, not just over the canvas
        if let Some(window) = web_sys::window() {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                app.borrow_mut().pointer_up();
            });
            let _ =
                window.add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_touch_controls(document: &Document, app: &App) {
        for button in TouchButton::ALL {
            let Some(el) = document.get_element_by_id(button.element_id()) else {
                continue;
            };
            for (event_name, held) in [("touchstart", true), ("touchend", false), ("touchcancel", false)] {
                let app = app.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
                    event.prevent_default();
                    app.borrow_mut().keys_mut().set_touch(button, held);
                });
                let _ = el.add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }
    }

    fn setup_input_handlers(app: App) {
        let Some(window) = web_sys::window() else {
            return;
        };

        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if KeyState::is_game_code(&event.code()) {
                    event.prevent_default();
                }
                app.borrow_mut()
                    .keys_mut()
                    .key_down(&event.key(), &event.code());
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                app.borrow_mut().keys_mut().key_up(&event.key(), &event.code());
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keys released while unfocused never report keyup
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut session = app.borrow_mut();
                session.keys_mut().reset();
                session.pointer_up();
            });
            let _ =
                window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn frame(app: &App) {
        match app.borrow_mut().frame_json() {
            Ok(Some(json)) => render_frame(&json),
            Ok(None) => {}
            Err(e) => log::warn!("Snapshot failed: {e}"),
        }
    }

    fn request_animation_frame(app: App) {
        let f: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
        let g = f.clone();

        *g.borrow_mut() = Some(Closure::new(move || {
            frame(&app);
            if let Some(callback) = f.borrow().as_ref() {
                schedule(callback);
            }
        }));

        if let Some(callback) = g.borrow().as_ref() {
            schedule(callback);
        }
    }

    fn schedule(callback: &Closure<dyn FnMut()>) {
        if let Some(window) = web_sys::window() {
            let _ = window.request_animation_frame(callback.as_ref().unchecked_ref());
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
fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = headless::Args::parse(std::env::args().skip(1))?;
    headless::run(&args)
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;

    use anyhow::{Context, bail};

    use blockhop::Settings;
    use blockhop::persistence;
    use blockhop::sim::{Game, GameEvent, TickInput, TileMap};

    const USAGE: &str =
        "usage: blockhop [MAP.json] [--ticks N] [--script R,RJ,.] [--settings SETTINGS.json]";

    #[derive(Debug)]
    pub struct Args {
        map: Option<PathBuf>,
        settings: Option<PathBuf>,
        ticks: u64,
        /// Per-tick intents, replayed cyclically
        script: Vec<TickInput>,
    }

    impl Args {
        pub fn parse(mut args: impl Iterator<Item = String>) -> anyhow::Result<Self> {
            let mut parsed = Args {
                map: None,
                settings: None,
                ticks: 600,
                script: vec![TickInput::right()],
            };

            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "--ticks" => {
                        let value = args.next().context("--ticks needs a value")?;
                        parsed.ticks = value
                            .parse()
                            .with_context(|| format!("bad tick count {value:?}"))?;
                    }
                    "--script" => {
                        let value = args.next().context("--script needs a value")?;
                        parsed.script = value
                            .split(',')
                            .map(|token| {
                                TickInput::parse(token)
                                    .with_context(|| format!("bad script token {token:?}"))
                            })
                            .collect::<anyhow::Result<_>>()?;
                    }
                    "--settings" => {
                        let value = args.next().context("--settings needs a path")?;
                        parsed.settings = Some(value.into());
                    }
                    "-h" | "--help" => {
                        println!("{USAGE}");
                        std::process::exit(0);
                    }
                    flag if flag.starts_with("--") => bail!("unknown flag {flag}\n{USAGE}"),
                    path => {
                        if parsed.map.replace(path.into()).is_some() {
                            bail!("more than one map given\n{USAGE}");
                        }
                    }
                }
            }

            if parsed.script.is_empty() {
                bail!("empty script");
            }
            Ok(parsed)
        }
    }

    pub fn run(args: &Args) -> anyhow::Result<()> {
        let settings = match &args.settings {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                Settings::from_json(&json).with_context(|| format!("loading {}", path.display()))?
            }
            None => Settings::default(),
        };

        let map = match &args.map {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                persistence::decode_map(&json)
                    .with_context(|| format!("loading {}", path.display()))?
            }
            None => TileMap::default_level(),
        };

        log::info!("Blockhop (native) starting...");
        let mut game = Game::with_settings(map, &settings)?;
        game.start();

        for input in args.script.iter().cycle().take(args.ticks as usize) {
            game.update(input);
            for event in game.drain_events() {
                match event {
                    GameEvent::Won { tick } => println!("won at tick {tick}"),
                    GameEvent::Respawned { tick } => println!("respawned at tick {tick}"),
                    _ => {}
                }
            }
            if game.has_won() {
                break;
            }
        }

        let pose = game.body().pose();
        println!(
            "{:?} after {} ticks at ({:.1}, {:.1}), {:?}",
            game.phase(),
            game.time_ticks(),
            pose.x,
            pose.y,
            pose.state
        );
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn args(list: &[&str]) -> anyhow::Result<Args> {
            Args::parse(list.iter().map(|s| s.to_string()))
        }

        #[test]
        fn test_defaults() {
            let parsed = args(&[]).unwrap();
            assert_eq!(parsed.ticks, 600);
            assert_eq!(parsed.script, vec![TickInput::right()]);
            assert!(parsed.map.is_none());
        }

        #[test]
        fn test_script_and_map() {
            let parsed = args(&["level.json", "--ticks", "10", "--script", "R,RJ,."]).unwrap();
            assert_eq!(parsed.map, Some(PathBuf::from("level.json")));
            assert_eq!(parsed.ticks, 10);
            assert_eq!(parsed.script.len(), 3);
            assert!(parsed.script[1].jump);
        }

        #[test]
        fn test_rejects_bad_input() {
            assert!(args(&["--ticks", "many"]).is_err());
            assert!(args(&["--script", "RX"]).is_err());
            assert!(args(&["--frobnicate"]).is_err());
            assert!(args(&["a.json", "b.json"]).is_err());
        }
    }
}
