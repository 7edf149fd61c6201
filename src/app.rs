//! Page session: menu, play and editor screens
//!
//! The browser glue forwards button clicks, editor canvas pointer events and
//! keys here, then asks for one rendered view per animation frame. Nothing in
//! this module touches the DOM, so every page flow runs natively in tests.

use serde::Serialize;

use crate::editor::{Brush, MapEditor};
use crate::persistence::MapFormatError;
use crate::platform::KeyState;
use crate::sim::{Game, TileMap, WorldSnapshot};

/// Which page section is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Screen {
    #[default]
    Menu,
    Game,
    Editor,
}

impl Screen {
    pub const ALL: [Screen; 3] = [Screen::Menu, Screen::Game, Screen::Editor];

    /// DOM id of the screen's container
    pub fn element_id(self) -> &'static str {
        match self {
            Screen::Menu => "menu",
            Screen::Game => "game",
            Screen::Editor => "editor",
        }
    }
}

/// What a press on the editor canvas does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorClick {
    Paint,
    Erase,
    PlaceStart,
    PlaceEnd,
}

impl EditorClick {
    /// Map `MouseEvent.button` and modifiers: right button erases,
    /// shift moves the start marker, alt moves the end marker
    pub fn from_mouse(button: i16, shift: bool, alt: bool) -> Self {
        match (button, shift, alt) {
            (2, _, _) => EditorClick::Erase,
            (_, true, _) => EditorClick::PlaceStart,
            (_, _, true) => EditorClick::PlaceEnd,
            _ => EditorClick::Paint,
        }
    }

    /// Whether holding the button and dragging keeps applying it
    fn drags(self) -> bool {
        matches!(self, EditorClick::Paint | EditorClick::Erase)
    }
}

/// Editor state handed to the page's renderer
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorView<'a> {
    pub map: &'a TileMap,
    pub brush: Brush,
}

/// One frame of output, tagged with the screen it belongs to
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "screen", rename_all = "lowercase")]
pub enum FrameView<'a> {
    Game(WorldSnapshot<'a>),
    Editor(EditorView<'a>),
}

/// Game, editor and input for one page
#[derive(Debug)]
pub struct Session {
    game: Game,
    editor: MapEditor,
    keys: KeyState,
    screen: Screen,
    /// Held editor action while the mouse button is down
    stroke: Option<EditorClick>,
}

impl Session {
    /// Start on the menu with an empty editor map
    pub fn new(game: Game) -> Self {
        Self {
            game,
            editor: MapEditor::new(),
            keys: KeyState::new(),
            screen: Screen::Menu,
            stroke: None,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn editor(&self) -> &MapEditor {
        &self.editor
    }

    pub fn keys_mut(&mut self) -> &mut KeyState {
        &mut self.keys
    }

    /// Menu "play": fresh run on the current level
    pub fn play(&mut self) {
        self.screen = Screen::Game;
        self.game.start();
    }

    pub fn open_editor(&mut self) {
        self.game.stop();
        self.screen = Screen::Editor;
    }

    /// Back to the menu from either screen
    pub fn to_menu(&mut self) {
        self.game.stop();
        self.keys.reset();
        self.stroke = None;
        self.screen = Screen::Menu;
    }

    pub fn set_brush(&mut self, name: &str) {
        self.editor.set_brush_by_name(name);
        log::debug!("Brush: {:?}", self.editor.brush());
    }

    pub fn pointer_down(&mut self, x: f32, y: f32, click: EditorClick) {
        if self.screen != Screen::Editor {
            return;
        }
        self.apply(click, x, y);
        self.stroke = click.drags().then_some(click);
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        if self.screen != Screen::Editor {
            return;
        }
        if let Some(click) = self.stroke {
            self.apply(click, x, y);
        }
    }

    pub fn pointer_up(&mut self) {
        self.stroke = None;
    }

    fn apply(&mut self, click: EditorClick, x: f32, y: f32) {
        match click {
            EditorClick::Paint => self.editor.paint(x, y),
            EditorClick::Erase => self.editor.erase(x, y),
            EditorClick::PlaceStart => {
                if !self.editor.place_start(x, y) {
                    log::debug!("Start marker off the grid at ({x}, {y})");
                }
            }
            EditorClick::PlaceEnd => {
                if !self.editor.place_end(x, y) {
                    log::debug!("End marker off the grid at ({x}, {y})");
                }
            }
        }
    }

    /// Persist the editor map; returns the JSON written
    pub fn save_map(&self) -> Result<String, MapFormatError> {
        self.editor.store()
    }

    /// Reload the editor map from storage; `Ok(false)` when none is saved
    pub fn load_saved_map(&mut self) -> Result<bool, MapFormatError> {
        self.editor.restore()
    }

    pub fn clear_map(&mut self) {
        self.editor.clear();
    }

    /// Play the editor's map right away. The running level is kept when the
    /// editor map is refused.
    pub fn test_map(&mut self) -> Result<(), MapFormatError> {
        self.game.load_map(self.editor.map().to_data())?;
        self.play();
        Ok(())
    }

    /// Tick the game (play screen only) and build the view to draw.
    /// `None` while the menu is up.
    pub fn frame(&mut self) -> Option<FrameView<'_>> {
        match self.screen {
            Screen::Menu => None,
            Screen::Game => {
                self.game.update(&self.keys);
                for event in self.game.drain_events() {
                    log::debug!("{event:?}");
                }
                Some(FrameView::Game(self.game.snapshot()))
            }
            Screen::Editor => Some(FrameView::Editor(EditorView {
                map: self.editor.map(),
                brush: self.editor.brush(),
            })),
        }
    }

    /// [`Self::frame`] serialized for the page
    pub fn frame_json(&mut self) -> serde_json::Result<Option<String>> {
        self.frame().map(|view| serde_json::to_string(&view)).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::TouchButton;
    use crate::sim::{GamePhase, GridPos};

    fn session() -> Session {
        Session::new(Game::new(TileMap::default_level()))
    }

    #[test]
    fn test_starts_on_menu() {
        let mut s = session();
        assert_eq!(s.screen(), Screen::Menu);
        assert_eq!(s.game().phase(), GamePhase::Idle);
        assert!(s.frame().is_none());
    }

    #[test]
    fn test_play_then_menu_stops() {
        let mut s = session();
        s.play();
        assert_eq!(s.screen(), Screen::Game);
        s.keys_mut().set_touch(TouchButton::Right, true);
        for _ in 0..10 {
            s.frame();
        }
        assert_eq!(s.game().time_ticks(), 10);

        s.to_menu();
        assert_eq!(s.game().phase(), GamePhase::Idle);
        assert!(s.frame().is_none());
        assert_eq!(s.game().time_ticks(), 10);
    }

    #[test]
    fn test_editor_strokes() {
        let mut s = session();
        // Ignored outside the editor
        s.pointer_down(16.0, 16.0, EditorClick::Paint);
        assert_eq!(s.editor().map().get_tile(0, 0), 0);

        s.open_editor();
        s.set_brush("dirt");
        s.pointer_down(16.0, 16.0, EditorClick::Paint);
        s.pointer_move(48.0, 16.0);
        s.pointer_up();
        s.pointer_move(80.0, 16.0);
        assert_eq!(s.editor().map().get_tile(0, 0), 2);
        assert_eq!(s.editor().map().get_tile(1, 0), 2);
        assert_eq!(s.editor().map().get_tile(2, 0), 0);

        s.pointer_down(16.0, 16.0, EditorClick::from_mouse(2, false, false));
        assert_eq!(s.editor().map().get_tile(0, 0), 0);
        s.pointer_up();

        s.pointer_down(48.0, 48.0, EditorClick::from_mouse(0, true, false));
        s.pointer_move(300.0, 300.0);
        assert_eq!(s.editor().map().start_pos(), GridPos::new(1, 1));
        s.pointer_down(80.0, 48.0, EditorClick::from_mouse(0, false, true));
        assert_eq!(s.editor().map().end_pos(), GridPos::new(2, 1));

        s.clear_map();
        assert_eq!(s.editor().map().solid_cells().count(), 0);
    }

    #[test]
    fn test_mouse_mapping() {
        assert_eq!(EditorClick::from_mouse(0, false, false), EditorClick::Paint);
        assert_eq!(EditorClick::from_mouse(2, true, false), EditorClick::Erase);
        assert_eq!(EditorClick::from_mouse(0, true, true), EditorClick::PlaceStart);
        assert_eq!(EditorClick::from_mouse(1, false, true), EditorClick::PlaceEnd);
    }

    #[test]
    fn test_test_map_plays_editor_level() {
        let mut s = session();
        s.open_editor();
        s.set_brush("stone");
        for col in 0..25 {
            s.pointer_down(col as f32 * 32.0 + 16.0, 17.0 * 32.0 + 16.0, EditorClick::Paint);
        }
        s.pointer_up();

        s.test_map().unwrap();
        assert_eq!(s.screen(), Screen::Game);
        assert_eq!(s.game().phase(), GamePhase::Running);
        assert_eq!(s.game().map(), s.editor().map());
    }

    #[test]
    fn test_frame_json_is_tagged_by_screen() {
        let mut s = session();
        assert_eq!(s.frame_json().unwrap(), None);

        s.play();
        let json = s.frame_json().unwrap().unwrap();
        assert!(json.starts_with("{\"screen\":\"game\""));
        assert!(json.contains("\"phase\":\"running\""));

        s.open_editor();
        s.set_brush("erase");
        let json = s.frame_json().unwrap().unwrap();
        assert!(json.starts_with("{\"screen\":\"editor\""));
        assert!(json.contains("\"brush\":\"erase\""));
    }

    #[test]
    fn test_storage_unavailable_natively() {
        let mut s = session();
        assert!(s.save_map().is_ok());
        assert!(!s.load_saved_map().unwrap());
    }
}
