//! Level editor model
//!
//! Canvas pointer positions come in as pixels; the editor turns them into
//! cell edits on its own map. Drawing the grid and wiring pointer events are
//! left to the page.

use serde::Serialize;

use crate::persistence::{self, MapFormatError};
use crate::sim::{EMPTY, TileMap, TileType};

/// What a left click paints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Brush {
    #[default]
    Grass,
    Dirt,
    Stone,
    Erase,
}

impl Brush {
    /// Unknown names fall back to grass
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "grass" => Brush::Grass,
            "dirt" => Brush::Dirt,
            "stone" => Brush::Stone,
            "erase" => Brush::Erase,
            _ => Brush::Grass,
        }
    }

    /// Tile code written by this brush
    pub fn code(self) -> u8 {
        match self {
            Brush::Grass => TileType::Grass.code(),
            Brush::Dirt => TileType::Dirt.code(),
            Brush::Stone => TileType::Stone.code(),
            Brush::Erase => EMPTY,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MapEditor {
    map: TileMap,
    brush: Brush,
}

impl MapEditor {
    /// LocalStorage key for the saved level
    pub const STORAGE_KEY: &'static str = "custom_map";

    /// Empty default-sized map, grass brush
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_map(map: TileMap) -> Self {
        Self {
            map,
            brush: Brush::default(),
        }
    }

    pub fn map(&self) -> &TileMap {
        &self.map
    }

    pub fn into_map(self) -> TileMap {
        self.map
    }

    pub fn brush(&self) -> Brush {
        self.brush
    }

    pub fn set_brush(&mut self, brush: Brush) {
        self.brush = brush;
    }

    pub fn set_brush_by_name(&mut self, name: &str) {
        self.brush = Brush::from_name(name);
    }

    /// Apply the current brush at a canvas pixel
    pub fn paint(&mut self, x: f32, y: f32) {
        let cell = self.map.pixel_to_cell(x, y);
        self.map.set_tile(cell.x, cell.y, self.brush.code());
    }

    /// Clear the cell at a canvas pixel regardless of brush
    pub fn erase(&mut self, x: f32, y: f32) {
        let cell = self.map.pixel_to_cell(x, y);
        self.map.set_tile(cell.x, cell.y, EMPTY);
    }

    /// Move the start marker to the cell under a pixel; false if off the grid
    pub fn place_start(&mut self, x: f32, y: f32) -> bool {
        let cell = self.map.pixel_to_cell(x, y);
        self.map.set_start_pos(cell)
    }

    /// Move the end marker to the cell under a pixel; false if off the grid
    pub fn place_end(&mut self, x: f32, y: f32) -> bool {
        let cell = self.map.pixel_to_cell(x, y);
        self.map.set_end_pos(cell)
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Versioned JSON for the current map
    pub fn save(&self) -> Result<String, MapFormatError> {
        persistence::encode(&self.map)
    }

    /// Replace the map from JSON; the current map stays on error
    pub fn load(&mut self, json: &str) -> Result<(), MapFormatError> {
        let data = persistence::decode(json)?;
        self.map.load(data)
    }

    /// Save to LocalStorage; returns the JSON written
    pub fn store(&self) -> Result<String, MapFormatError> {
        let json = self.save()?;
        if persistence::store_item(Self::STORAGE_KEY, &json) {
            log::info!("Map saved ({} tiles)", self.map.solid_cells().count());
        }
        Ok(json)
    }

    /// Load from LocalStorage; `Ok(false)` when nothing is stored
    pub fn restore(&mut self) -> Result<bool, MapFormatError> {
        match persistence::load_item(Self::STORAGE_KEY) {
            Some(json) => {
                self.load(&json)?;
                log::info!("Map restored from LocalStorage");
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
