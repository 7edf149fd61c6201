//! Tile grid, markers and occupancy queries
//!
//! The grid is addressed as `(col, row)` with `row` growing downward. Anything
//! outside the grid reads as empty but counts as solid, so the play area is
//! walled in without explicit border tiles.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::persistence::{MapData, MapFormatError};

/// Code of an empty cell
pub const EMPTY: u8 = 0;

/// A cell coordinate on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Tile materials
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileType {
    Grass = 1,
    Dirt = 2,
    Stone = 3,
}

impl TileType {
    pub const ALL: [TileType; 3] = [TileType::Grass, TileType::Dirt, TileType::Stone];

    /// Material for a stored code; `None` for empty or unknown codes
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(TileType::Grass),
            2 => Some(TileType::Dirt),
            3 => Some(TileType::Stone),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TileType::Grass => "grass",
            TileType::Dirt => "dirt",
            TileType::Stone => "stone",
        }
    }
}

/// The level grid plus its start and end markers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "MapData")]
pub struct TileMap {
    width: u32,
    height: u32,
    block_size: u32,
    cols: usize,
    rows: usize,
    /// Row-major, `rows * cols` codes
    tiles: Vec<u8>,
    start_pos: GridPos,
    end_pos: GridPos,
}

impl Default for TileMap {
    fn default() -> Self {
        Self::new(MAP_WIDTH, MAP_HEIGHT, BLOCK_SIZE)
    }
}

impl TileMap {
    /// Create an empty map covering `width x height` pixels.
    ///
    /// Partial tiles at the right/bottom edge are dropped. The default
    /// markers are pulled onto the grid when it is too small for them.
    ///
    /// # Panics
    ///
    /// Panics if `block_size` is zero. Untrusted sizes should go through
    /// [`MapData::validate`] instead.
    pub fn new(width: u32, height: u32, block_size: u32) -> Self {
        assert!(block_size > 0, "block size must be positive");
        let cols = (width / block_size) as usize;
        let rows = (height / block_size) as usize;
        Self {
            width,
            height,
            block_size,
            cols,
            rows,
            tiles: vec![EMPTY; cols * rows],
            start_pos: clamp_to_grid(GridPos::new(START_COL, START_ROW), cols, rows),
            end_pos: clamp_to_grid(
                GridPos::new(cols as i32 - END_COL_FROM_RIGHT, END_ROW),
                cols,
                rows,
            ),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    /// Block size as a pixel distance
    pub fn block_px(&self) -> f32 {
        self.block_size as f32
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn start_pos(&self) -> GridPos {
        self.start_pos
    }

    pub fn end_pos(&self) -> GridPos {
        self.end_pos
    }

    pub fn in_bounds(&self, col: i32, row: i32) -> bool {
        col >= 0 && row >= 0 && (col as usize) < self.cols && (row as usize) < self.rows
    }

    fn index(&self, col: i32, row: i32) -> Option<usize> {
        self.in_bounds(col, row)
            .then(|| row as usize * self.cols + col as usize)
    }

    /// Out-of-bounds cells are solid
    pub fn is_solid(&self, col: i32, row: i32) -> bool {
        match self.index(col, row) {
            Some(i) => self.tiles[i] != EMPTY,
            None => true,
        }
    }

    /// Stored code, or `EMPTY` outside the grid
    pub fn get_tile(&self, col: i32, row: i32) -> u8 {
        self.index(col, row).map_or(EMPTY, |i| self.tiles[i])
    }

    /// Overwrite a cell. Writes outside the grid are ignored and codes are
    /// not checked against the known materials.
    pub fn set_tile(&mut self, col: i32, row: i32, code: u8) {
        if let Some(i) = self.index(col, row) {
            self.tiles[i] = code;
        }
    }

    pub fn tile_type(code: u8) -> Option<TileType> {
        TileType::from_code(code)
    }

    /// Move the start marker; returns false (and keeps the old one) outside the grid
    pub fn set_start_pos(&mut self, pos: GridPos) -> bool {
        if !self.in_bounds(pos.x, pos.y) {
            return false;
        }
        self.start_pos = pos;
        true
    }

    /// Move the end marker; returns false (and keeps the old one) outside the grid
    pub fn set_end_pos(&mut self, pos: GridPos) -> bool {
        if !self.in_bounds(pos.x, pos.y) {
            return false;
        }
        self.end_pos = pos;
        true
    }

    /// Cell containing a pixel position
    pub fn pixel_to_cell(&self, x: f32, y: f32) -> GridPos {
        let bs = self.block_px();
        GridPos::new((x / bs).floor() as i32, (y / bs).floor() as i32)
    }

    /// Reset every cell to empty, keeping dimensions and markers
    pub fn clear(&mut self) {
        self.tiles.fill(EMPTY);
    }

    /// Stamp the built-in demonstration level onto the grid.
    ///
    /// Ground strip, three staggered platforms, a stone wall and a final
    /// platform under the end marker. On grids smaller than 25x18 the
    /// pieces are clipped.
    pub fn load_default(&mut self) {
        let cols = self.cols as i32;
        let rows = self.rows as i32;
        let grass = TileType::Grass.code();

        for col in 0..cols {
            self.set_tile(col, rows - 1, grass);
            self.set_tile(col, rows - 2, TileType::Dirt.code());
        }

        for col in 5..10 {
            self.set_tile(col, 12, grass);
        }
        for col in 12..18 {
            self.set_tile(col, 10, grass);
        }
        for col in 20..25 {
            self.set_tile(col, 8, grass);
        }

        for row in 11..15 {
            self.set_tile(15, row, TileType::Stone.code());
        }

        for col in cols - 6..cols - 1 {
            self.set_tile(col, 11, grass);
        }
    }

    /// Demonstration level on a default-sized map
    pub fn default_level() -> Self {
        let mut map = Self::default();
        map.load_default();
        map
    }

    /// Export as the persisted record
    pub fn to_data(&self) -> MapData {
        MapData {
            width: self.width,
            height: self.height,
            block_size: self.block_size,
            tiles: self.tiles.chunks(self.cols.max(1)).map(<[u8]>::to_vec).collect(),
            start_pos: self.start_pos,
            end_pos: self.end_pos,
        }
    }

    /// Replace the whole map with a persisted record.
    ///
    /// The record is validated first; on error the map is left untouched.
    pub fn load(&mut self, data: MapData) -> Result<(), MapFormatError> {
        *self = Self::try_from(data)?;
        Ok(())
    }

    /// Iterate `(col, row, code)` over non-empty cells
    pub fn solid_cells(&self) -> impl Iterator<Item = (i32, i32, u8)> + '_ {
        let cols = self.cols.max(1);
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, code)| **code != EMPTY)
            .map(move |(i, code)| ((i % cols) as i32, (i / cols) as i32, *code))
    }
}

/// Nearest cell to `pos` on a `cols x rows` grid
fn clamp_to_grid(pos: GridPos, cols: usize, rows: usize) -> GridPos {
    let max_col = (cols as i32 - 1).max(0);
    let max_row = (rows as i32 - 1).max(0);
    GridPos::new(pos.x.clamp(0, max_col), pos.y.clamp(0, max_row))
}

impl From<TileMap> for MapData {
    fn from(map: TileMap) -> Self {
        map.to_data()
    }
}

impl TryFrom<MapData> for TileMap {
    type Error = MapFormatError;

    fn try_from(data: MapData) -> Result<Self, Self::Error> {
        let (cols, rows) = data.validate()?;
        Ok(Self {
            width: data.width,
            height: data.height,
            block_size: data.block_size,
            cols,
            rows,
            tiles: data.tiles.into_iter().flatten().collect(),
            start_pos: data.start_pos,
            end_pos: data.end_pos,
        })
    }
}
