//! Platform abstraction layer
//!
//! Keyboard and on-screen button state as reported by the browser. The page
//! (or `main.rs` on web) forwards `keydown`/`keyup` and touch events here;
//! the simulation only sees the `InputState` view.

use std::collections::HashSet;

use crate::sim::InputState;

/// Keys that steer the player; the page should suppress their default
/// scrolling behaviour
pub const GAME_CODES: [&str; 5] = ["ArrowUp", "ArrowDown", "ArrowLeft", "ArrowRight", "Space"];

/// On-screen controls for touch devices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TouchButton {
    Left,
    Right,
    Jump,
}

impl TouchButton {
    pub const ALL: [TouchButton; 3] = [TouchButton::Left, TouchButton::Right, TouchButton::Jump];

    /// DOM id of the page button
    pub fn element_id(self) -> &'static str {
        match self {
            TouchButton::Left => "btn-left",
            TouchButton::Right => "btn-right",
            TouchButton::Jump => "btn-jump",
        }
    }
}

/// Currently held keys, tracked by both `KeyboardEvent.key` (lowercased)
/// and `KeyboardEvent.code`, plus held touch buttons
#[derive(Debug, Clone, Default)]
pub struct KeyState {
    held: HashSet<String>,
    touched: HashSet<TouchButton>,
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, key: &str, code: &str) {
        self.held.insert(key.to_lowercase());
        self.held.insert(code.to_string());
    }

    pub fn key_up(&mut self, key: &str, code: &str) {
        self.held.remove(&key.to_lowercase());
        self.held.remove(code);
    }

    /// Press (`touchstart`) or release (`touchend`) an on-screen button
    pub fn set_touch(&mut self, button: TouchButton, held: bool) {
        if held {
            self.touched.insert(button);
        } else {
            self.touched.remove(&button);
        }
    }

    pub fn is_touched(&self, button: TouchButton) -> bool {
        self.touched.contains(&button)
    }

    /// Forget everything (e.g. on window blur)
    pub fn reset(&mut self) {
        self.held.clear();
        self.touched.clear();
    }

    pub fn is_pressed(&self, key: &str) -> bool {
        self.held.contains(key)
    }

    /// Whether a key event's default action should be prevented
    pub fn is_game_code(code: &str) -> bool {
        GAME_CODES.contains(&code)
    }
}

impl InputState for KeyState {
    fn is_left(&self) -> bool {
        self.is_pressed("a") || self.is_pressed("ArrowLeft") || self.is_touched(TouchButton::Left)
    }

    fn is_right(&self) -> bool {
        self.is_pressed("d") || self.is_pressed("ArrowRight") || self.is_touched(TouchButton::Right)
    }

    fn is_jump(&self) -> bool {
        self.is_touched(TouchButton::Jump)
            || self.is_pressed(" ")
            || self.is_pressed("Space")
            || self.is_pressed("w")
            || self.is_pressed("ArrowUp")
    }
}
