//! Blockhop - A tile-based side-scrolling platformer
//!
//! Core modules:
//! - `app`: Page session (menu/play/editor screens and their commands)
//! - `sim`: Deterministic simulation (tile map, body physics, game loop)
//! - `editor`: Level editor model (paint/erase tiles, place markers)
//! - `persistence`: Versioned map documents
//! - `platform`: Browser/native platform abstraction
//! - `settings`: Data-driven tuning

pub mod app;
pub mod editor;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;

pub use app::{EditorClick, Screen, Session};
pub use editor::{Brush, MapEditor};
pub use settings::{Settings, SettingsError, Tuning};

/// Game configuration constants
pub mod consts {
    /// Default map size in pixels (matches the play canvas)
    pub const MAP_WIDTH: u32 = 800;
    pub const MAP_HEIGHT: u32 = 600;
    /// Pixels per tile
    pub const BLOCK_SIZE: u32 = 32;

    /// Default marker cells for a fresh map
    pub const START_COL: i32 = 2;
    pub const START_ROW: i32 = 10;
    /// End column is measured from the right edge
    pub const END_COL_FROM_RIGHT: i32 = 3;
    pub const END_ROW: i32 = 10;

    /// Player box
    pub const PLAYER_WIDTH: f32 = 32.0;
    pub const PLAYER_HEIGHT: f32 = 32.0;

    /// Horizontal speed (pixels/tick)
    pub const PLAYER_SPEED: f32 = 4.0;
    /// Upward impulse on jump (pixels/tick)
    pub const JUMP_POWER: f32 = 12.0;
    /// Downward acceleration (pixels/tick²)
    pub const GRAVITY: f32 = 0.5;

    /// Ticks per animation frame
    pub const ANIMATION_CADENCE: u32 = 8;
    /// Frames in a walk/jump cycle
    pub const ANIMATION_FRAMES: u32 = 4;
}
