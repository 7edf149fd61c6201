//! Game loop state machine
//!
//! `Idle -> Running -> Won`, with `stop()` returning to `Idle` from anywhere.
//! One `update()` is one simulation tick; the caller decides the cadence
//! (normally once per display frame).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::{Body, BodyPose};
use super::input::InputState;
use super::tilemap::TileMap;
use crate::persistence::{MapData, MapFormatError};
use crate::settings::{Settings, SettingsError, Tuning};

/// Current phase of play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    /// Not ticking
    #[default]
    Idle,
    /// Active gameplay
    Running,
    /// End cell reached; the body is frozen until the next start
    Won,
}

/// State transitions observable by a frontend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GameEvent {
    Started,
    Stopped,
    Won { tick: u64 },
    /// Fell out of the world and was put back at the spawn point
    Respawned { tick: u64 },
    MapLoaded,
}

/// Read-only view handed to renderers after each tick
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldSnapshot<'a> {
    pub map: &'a TileMap,
    pub player: BodyPose,
    pub phase: GamePhase,
    pub tick: u64,
}

impl WorldSnapshot<'_> {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// A level, its player and the run state
#[derive(Debug, Clone)]
pub struct Game {
    map: TileMap,
    body: Body,
    phase: GamePhase,
    /// Fall-off bound override (pixels)
    world_height: Option<f32>,
    /// Physics ticks since the last start
    time_ticks: u64,
    events: Vec<GameEvent>,
}

impl Game {
    /// Game with default settings, player placed at the map's spawn point
    pub fn new(map: TileMap) -> Self {
        let body = Body::new(spawn_point(&map, Tuning::default().body_height));
        Self::assemble(map, body, None)
    }

    pub fn with_settings(map: TileMap, settings: &Settings) -> Result<Self, SettingsError> {
        settings.validate()?;
        let spawn = spawn_point(&map, settings.tuning.body_height);
        let body = Body::with_tuning(spawn, settings.tuning)?;
        Ok(Self::assemble(map, body, settings.world_height))
    }

    fn assemble(map: TileMap, body: Body, world_height: Option<f32>) -> Self {
        Self {
            map,
            body,
            phase: GamePhase::Idle,
            world_height,
            time_ticks: 0,
            events: Vec::new(),
        }
    }

    pub fn map(&self) -> &TileMap {
        &self.map
    }

    /// Edit tiles between ticks
    pub fn map_mut(&mut self) -> &mut TileMap {
        &mut self.map
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase != GamePhase::Idle
    }

    pub fn has_won(&self) -> bool {
        self.phase == GamePhase::Won
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    /// Respawn threshold: the body's top edge below this y falls out
    pub fn world_height(&self) -> f32 {
        self.world_height.unwrap_or(self.map.height() as f32)
    }

    /// Top-left of the body when standing on the start cell
    pub fn spawn_point(&self) -> Vec2 {
        spawn_point(&self.map, self.body.height())
    }

    /// Begin a fresh run: player back at spawn, win cleared
    pub fn start(&mut self) {
        self.body.reset(self.spawn_point());
        self.time_ticks = 0;
        self.phase = GamePhase::Running;
        self.events.push(GameEvent::Started);
        log::info!(
            "Run started at ({:.0}, {:.0})",
            self.body.pos.x,
            self.body.pos.y
        );
    }

    /// Halt ticking; a later `start()` begins over
    pub fn stop(&mut self) {
        if self.phase == GamePhase::Idle {
            return;
        }
        self.phase = GamePhase::Idle;
        self.events.push(GameEvent::Stopped);
        log::info!("Run stopped after {} ticks", self.time_ticks);
    }

    /// Advance one tick. No-op unless running and not yet won.
    pub fn update(&mut self, input: &dyn InputState) {
        if self.phase != GamePhase::Running {
            return;
        }

        self.time_ticks += 1;
        self.body.update(input, &self.map);

        if self.reached_goal() {
            self.phase = GamePhase::Won;
            self.events.push(GameEvent::Won {
                tick: self.time_ticks,
            });
            log::info!("Level complete in {} ticks", self.time_ticks);
        }

        if self.body.pos.y > self.world_height() {
            let spawn = self.spawn_point();
            self.body.reset(spawn);
            self.events.push(GameEvent::Respawned {
                tick: self.time_ticks,
            });
            log::info!("Fell out of the world, respawned at tick {}", self.time_ticks);
        }
    }

    /// Body center strictly inside the end cell
    fn reached_goal(&self) -> bool {
        let bs = self.map.block_px();
        let end = self.map.end_pos();
        let min = Vec2::new(end.x as f32 * bs, end.y as f32 * bs);
        let max = min + Vec2::splat(bs);
        let center = self.body.center();
        center.x > min.x && center.x < max.x && center.y > min.y && center.y < max.y
    }

    /// Swap in an edited level and put the player at its spawn point.
    ///
    /// A malformed record is refused and the current level stays.
    pub fn load_map(&mut self, data: MapData) -> Result<(), MapFormatError> {
        if let Err(e) = self.map.load(data) {
            log::warn!("Rejected map: {e}");
            return Err(e);
        }
        self.body.reset(self.spawn_point());
        self.events.push(GameEvent::MapLoaded);
        log::info!("Loaded {}x{} map", self.map.cols(), self.map.rows());
        Ok(())
    }

    pub fn snapshot(&self) -> WorldSnapshot<'_> {
        WorldSnapshot {
            map: &self.map,
            player: self.body.pose(),
            phase: self.phase,
            tick: self.time_ticks,
        }
    }

    /// Take the events raised since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

fn spawn_point(map: &TileMap, body_height: f32) -> Vec2 {
    let bs = map.block_px();
    let start = map.start_pos();
    Vec2::new(start.x as f32 * bs, start.y as f32 * bs - body_height)
}
