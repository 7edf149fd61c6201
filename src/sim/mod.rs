//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One tick per `Game::update` call, fixed per-tick constants
//! - Input sampled once per tick through `InputState`
//! - Stable iteration order (row-major tile sweeps)
//! - No rendering or platform dependencies

pub mod body;
pub mod game;
pub mod input;
pub mod tilemap;

pub use body::{Animation, Body, BodyPose, Facing, MotionState};
pub use game::{Game, GameEvent, GamePhase, WorldSnapshot};
pub use input::{InputState, TickInput};
pub use tilemap::{EMPTY, GridPos, TileMap, TileType};
