//! Player body: kinematics and tile collision
//!
//! Each tick integrates velocity and resolves collisions one axis at a time
//! (X, then Y) against full-cell solid tiles.

use std::ops::RangeInclusive;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::input::InputState;
use super::tilemap::TileMap;
use crate::consts::ANIMATION_FRAMES;
use crate::settings::{SettingsError, Tuning};

/// Which way the body faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }
}

/// Visual movement state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotionState {
    #[default]
    Idle,
    Walk,
    Jump,
}

impl MotionState {
    /// Airborne overrides walk/idle
    pub fn derive(on_ground: bool, walking: bool) -> Self {
        if !on_ground {
            MotionState::Jump
        } else if walking {
            MotionState::Walk
        } else {
            MotionState::Idle
        }
    }
}

/// Sprite frame counter. Cosmetic only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Animation {
    pub frame: u32,
    pub timer: u32,
}

impl Animation {
    fn advance(&mut self, active: bool, cadence: u32) {
        if !active {
            self.frame = 0;
            return;
        }
        self.timer += 1;
        if self.timer >= cadence {
            self.frame = (self.frame + 1) % ANIMATION_FRAMES;
            self.timer = 0;
        }
    }
}

/// What a renderer needs to place and pick the player sprite
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyPose {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub direction: Facing,
    pub state: MotionState,
    pub animation_frame: u32,
}

/// The player's axis-aligned box
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    /// Top-left corner (pixels)
    pub pos: Vec2,
    /// Pixels per tick
    pub vel: Vec2,
    pub on_ground: bool,
    size: Vec2,
    tuning: Tuning,
    direction: Facing,
    state: MotionState,
    animation: Animation,
}

impl Body {
    /// Body with the default tuning
    pub fn new(pos: Vec2) -> Self {
        Self::build(pos, Tuning::default())
    }

    /// Body with custom tuning; degenerate values are refused up front
    pub fn with_tuning(pos: Vec2, tuning: Tuning) -> Result<Self, SettingsError> {
        tuning.validate()?;
        Ok(Self::build(pos, tuning))
    }

    fn build(pos: Vec2, tuning: Tuning) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            on_ground: false,
            size: Vec2::new(tuning.body_width, tuning.body_height),
            tuning,
            direction: Facing::default(),
            state: MotionState::default(),
            animation: Animation::default(),
        }
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn width(&self) -> f32 {
        self.size.x
    }

    pub fn height(&self) -> f32 {
        self.size.y
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn direction(&self) -> Facing {
        self.direction
    }

    /// Derived once per tick from ground contact and horizontal intent
    pub fn state(&self) -> MotionState {
        self.state
    }

    pub fn animation(&self) -> Animation {
        self.animation
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Teleport with zero velocity, airborne
    pub fn reset(&mut self, pos: Vec2) {
        self.pos = pos;
        self.vel = Vec2::ZERO;
        self.on_ground = false;
    }

    /// Advance one tick
    pub fn update(&mut self, input: &dyn InputState, map: &TileMap) {
        // Left is checked first, so holding both walks left
        let intent = if input.is_left() {
            Some(Facing::Left)
        } else if input.is_right() {
            Some(Facing::Right)
        } else {
            None
        };
        self.vel.x = intent.map_or(0.0, |facing| facing.sign() * self.tuning.speed);
        if let Some(facing) = intent {
            self.direction = facing;
        }

        // Level-triggered: holding jump re-jumps on every grounded tick
        if input.is_jump() && self.on_ground {
            self.vel.y = -self.tuning.jump_power;
            self.on_ground = false;
            log::trace!("jump at ({:.1}, {:.1})", self.pos.x, self.pos.y);
        }

        self.vel.y += self.tuning.gravity;

        self.pos.x += self.vel.x;
        self.resolve_x(map);

        self.pos.y += self.vel.y;
        self.resolve_y(map);

        let moving = self.vel.x != 0.0 || !self.on_ground;
        self.animation.advance(moving, self.tuning.animation_cadence);
        self.state = MotionState::derive(self.on_ground, intent.is_some());
    }

    fn resolve_x(&mut self, map: &TileMap) {
        let bs = map.block_px();
        let cols = tile_span(self.pos.x, self.size.x, bs);
        for row in tile_span(self.pos.y, self.size.y, bs) {
            for col in cols.clone() {
                if !map.is_solid(col, row) {
                    continue;
                }
                if self.vel.x > 0.0 {
                    self.pos.x = col as f32 * bs - self.size.x;
                } else if self.vel.x < 0.0 {
                    self.pos.x = (col + 1) as f32 * bs;
                }
                self.vel.x = 0.0;
            }
        }
    }

    fn resolve_y(&mut self, map: &TileMap) {
        let bs = map.block_px();
        let cols = tile_span(self.pos.x, self.size.x, bs);
        self.on_ground = false;
        for row in tile_span(self.pos.y, self.size.y, bs) {
            for col in cols.clone() {
                if !map.is_solid(col, row) {
                    continue;
                }
                if self.vel.y > 0.0 {
                    self.pos.y = row as f32 * bs - self.size.y;
                    self.on_ground = true;
                } else if self.vel.y < 0.0 {
                    self.pos.y = (row + 1) as f32 * bs;
                }
                self.vel.y = 0.0;
            }
        }
    }

    pub fn pose(&self) -> BodyPose {
        BodyPose {
            x: self.pos.x,
            y: self.pos.y,
            width: self.size.x,
            height: self.size.y,
            direction: self.direction,
            state: self.state,
            animation_frame: self.animation.frame,
        }
    }
}

/// Tiles covered by `[start, start + extent)` along one axis.
///
/// The upper bound is the tile holding the last covered pixel, so a box
/// flush against a tile edge does not claim the neighbouring tile.
fn tile_span(start: f32, extent: f32, bs: f32) -> RangeInclusive<i32> {
    let first = (start / bs).floor() as i32;
    let last = ((start + extent) / bs).ceil() as i32 - 1;
    first..=last
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::TickInput;

    /// 25x18 map with a floor on the bottom row
    fn floor_map() -> TileMap {
        let mut map = TileMap::new(800, 600, 32);
        for col in 0..25 {
            map.set_tile(col, 17, 1);
        }
        map
    }

    #[test]
    fn test_tile_span_ignores_touching_edge() {
        assert_eq!(tile_span(64.0, 32.0, 32.0), 2..=2);
        assert_eq!(tile_span(64.5, 32.0, 32.0), 2..=3);
        assert_eq!(tile_span(-1.0, 32.0, 32.0), -1..=0);
    }

    #[test]
    fn test_moves_right_and_faces_right() {
        let map = floor_map();
        let mut body = Body::new(Vec2::new(100.0, 100.0));
        body.update(&TickInput::right(), &map);
        assert_eq!(body.pos.x, 104.0);
        assert_eq!(body.direction(), Facing::Right);
    }

    #[test]
    fn test_moves_left_and_faces_left() {
        let map = floor_map();
        let mut body = Body::new(Vec2::new(100.0, 100.0));
        body.update(&TickInput::left(), &map);
        assert_eq!(body.pos.x, 96.0);
        assert_eq!(body.direction(), Facing::Left);
    }

    #[test]
    fn test_left_wins_when_both_held() {
        let map = floor_map();
        let mut body = Body::new(Vec2::new(100.0, 512.0));
        let both = TickInput {
            left: true,
            right: true,
            jump: false,
        };
        body.update(&both, &map);
        assert_eq!(body.vel.x, -4.0);
        assert_eq!(body.pos.x, 96.0);
        assert_eq!(body.direction(), Facing::Left);
    }

    #[test]
    fn test_facing_persists_when_idle() {
        let map = floor_map();
        let mut body = Body::new(Vec2::new(100.0, 512.0));
        body.update(&TickInput::left(), &map);
        body.update(&TickInput::NONE, &map);
        assert_eq!(body.direction(), Facing::Left);
        assert_eq!(body.state(), MotionState::Idle);
    }

    #[test]
    fn test_gravity_accumulates_in_free_fall() {
        let map = floor_map();
        let mut body = Body::new(Vec2::new(100.0, 100.0));
        let mut last_drop = 0.0;
        for _ in 0..20 {
            let before = body.pos.y;
            body.update(&TickInput::NONE, &map);
            let drop = body.pos.y - before;
            assert!(drop > last_drop, "drop {drop} did not exceed {last_drop}");
            assert!(!body.on_ground);
            last_drop = drop;
        }
    }

    #[test]
    fn test_lands_on_floor() {
        let map = floor_map();
        let mut body = Body::new(Vec2::new(100.0, 100.0));
        let mut ticks = 0;
        while !body.on_ground {
            body.update(&TickInput::NONE, &map);
            ticks += 1;
            assert!(ticks < 200, "never landed");
        }
        assert_eq!(body.vel.y, 0.0);
        assert_eq!(body.pos.y, 17.0 * 32.0 - 32.0);

        // Resting contact holds every tick
        for _ in 0..50 {
            body.update(&TickInput::NONE, &map);
            assert!(body.on_ground);
            assert_eq!(body.pos.y, 512.0);
            assert_eq!(body.state(), MotionState::Idle);
        }
    }

    #[test]
    fn test_stops_flush_against_wall_on_right() {
        let mut map = floor_map();
        for row in 0..17 {
            map.set_tile(10, row, 3);
        }
        let mut body = Body::new(Vec2::new(200.0, 512.0));
        let wall_x = 10.0 * 32.0 - 32.0;
        for tick in 0..100 {
            body.update(&TickInput::right(), &map);
            assert!(body.pos.x <= wall_x);
            if tick >= 30 {
                assert_eq!(body.pos.x, wall_x);
                assert_eq!(body.vel.x, 0.0);
            }
        }
        // Still walking, even though the wall cancels the motion
        assert_eq!(body.state(), MotionState::Walk);
        assert_eq!(body.animation().frame, 0);
    }

    #[test]
    fn test_stops_flush_against_wall_on_left() {
        let mut map = floor_map();
        for row in 0..17 {
            map.set_tile(2, row, 3);
        }
        let mut body = Body::new(Vec2::new(150.0, 512.0));
        for _ in 0..60 {
            body.update(&TickInput::left(), &map);
        }
        assert_eq!(body.pos.x, 96.0);
        assert_eq!(body.vel.x, 0.0);
    }

    #[test]
    fn test_world_edge_is_a_wall() {
        let map = floor_map();
        let mut body = Body::new(Vec2::new(10.0, 512.0));
        for _ in 0..10 {
            body.update(&TickInput::left(), &map);
        }
        assert_eq!(body.pos.x, 0.0);
    }

    #[test]
    fn test_jump_needs_ground() {
        let map = floor_map();
        let mut body = Body::new(Vec2::new(100.0, 100.0));
        body.update(&TickInput::jump(), &map);
        assert_eq!(body.vel.y, 0.5);

        let mut grounded = Body::new(Vec2::new(100.0, 512.0));
        grounded.update(&TickInput::NONE, &map);
        assert!(grounded.on_ground);
        grounded.update(&TickInput::jump(), &map);
        assert_eq!(grounded.vel.y, -11.5);
        assert_eq!(grounded.pos.y, 500.5);
        assert!(!grounded.on_ground);
        assert_eq!(grounded.state(), MotionState::Jump);
    }

    #[test]
    fn test_held_jump_retriggers_after_landing() {
        let map = floor_map();
        let mut body = Body::new(Vec2::new(100.0, 512.0));
        body.update(&TickInput::NONE, &map);

        let mut takeoffs = 0;
        let mut was_grounded = body.on_ground;
        for _ in 0..200 {
            body.update(&TickInput::jump(), &map);
            if was_grounded && body.vel.y < 0.0 {
                takeoffs += 1;
            }
            was_grounded = body.on_ground;
        }
        assert!(takeoffs >= 3, "only {takeoffs} takeoffs");
    }

    #[test]
    fn test_head_bump_snaps_below_ceiling() {
        let mut map = floor_map();
        for col in 0..25 {
            map.set_tile(col, 14, 2);
        }
        let mut body = Body::new(Vec2::new(100.0, 512.0));
        body.update(&TickInput::NONE, &map);
        body.update(&TickInput::jump(), &map);
        let mut hit_ceiling = false;
        for _ in 0..10 {
            body.update(&TickInput::NONE, &map);
            if body.pos.y == 15.0 * 32.0 {
                hit_ceiling = true;
                assert_eq!(body.vel.y, 0.0);
                assert!(!body.on_ground);
                break;
            }
        }
        assert!(hit_ceiling);
    }

    #[test]
    fn test_animation_cycles_while_walking() {
        let map = floor_map();
        let mut body = Body::new(Vec2::new(32.0, 512.0));
        body.update(&TickInput::NONE, &map);
        for _ in 0..8 {
            body.update(&TickInput::right(), &map);
        }
        assert_eq!(body.animation().frame, 1);
        assert_eq!(body.state(), MotionState::Walk);

        for _ in 0..24 {
            body.update(&TickInput::right(), &map);
        }
        assert_eq!(body.animation().frame, 0);
        for _ in 0..8 {
            body.update(&TickInput::right(), &map);
        }
        assert_eq!(body.animation().frame, 1);

        body.update(&TickInput::NONE, &map);
        assert_eq!(body.animation().frame, 0);
    }

    #[test]
    fn test_state_derivation() {
        assert_eq!(MotionState::derive(false, false), MotionState::Jump);
        assert_eq!(MotionState::derive(false, true), MotionState::Jump);
        assert_eq!(MotionState::derive(true, true), MotionState::Walk);
        assert_eq!(MotionState::derive(true, false), MotionState::Idle);
    }

    #[test]
    fn test_reset() {
        let map = floor_map();
        let mut body = Body::new(Vec2::new(100.0, 512.0));
        body.update(&TickInput::right(), &map);
        body.reset(Vec2::new(64.0, 288.0));
        assert_eq!(body.pos, Vec2::new(64.0, 288.0));
        assert_eq!(body.vel, Vec2::ZERO);
        assert!(!body.on_ground);
    }

    #[test]
    fn test_rejects_degenerate_tuning() {
        let tuning = Tuning {
            jump_power: f32::INFINITY,
            ..Default::default()
        };
        assert!(Body::with_tuning(Vec2::ZERO, tuning).is_err());
        assert!(Body::with_tuning(Vec2::ZERO, Tuning::default()).is_ok());
    }

    #[test]
    fn test_pose_reflects_body() {
        let body = Body::new(Vec2::new(3.0, 4.0));
        let pose = body.pose();
        assert_eq!((pose.x, pose.y, pose.width, pose.height), (3.0, 4.0, 32.0, 32.0));
        assert_eq!(pose.direction, Facing::Right);
        assert_eq!(pose.animation_frame, 0);
    }
}
