//! Map save/load
//!
//! Features:
//! - Versioned JSON envelope around the editor's map record
//! - Grid/dimension consistency checks before anything is loaded
//! - LocalStorage access on web (no-op natively)

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::{GridPos, TileMap};

/// Current map document version
pub const MAP_FORMAT_VERSION: u32 = 1;

/// Persisted shape of a map: `{width, height, blockSize, tiles, startPos, endPos}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapData {
    pub width: u32,
    pub height: u32,
    pub block_size: u32,
    /// `tiles[row][col]`
    pub tiles: Vec<Vec<u8>>,
    pub start_pos: GridPos,
    pub end_pos: GridPos,
}

/// Why a map document was refused
#[derive(Debug, Error)]
pub enum MapFormatError {
    #[error("malformed map document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported map format version {found} (this build reads {})", MAP_FORMAT_VERSION)]
    UnsupportedVersion { found: u32 },

    #[error("map {field} must be positive")]
    NonPositiveDimension { field: &'static str },

    #[error("a {width}x{height} map with {block_size}px blocks holds no whole tile")]
    EmptyGrid {
        width: u32,
        height: u32,
        block_size: u32,
    },

    #[error("expected {expected} tile rows, found {found}")]
    RowCount { expected: usize, found: usize },

    #[error("tile row {row} has {found} columns, expected {expected}")]
    RowLength {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("{marker} marker ({x}, {y}) lies outside the {cols}x{rows} grid")]
    MarkerOutOfBounds {
        marker: &'static str,
        x: i32,
        y: i32,
        cols: usize,
        rows: usize,
    },
}

impl MapData {
    /// Check the record against its declared size.
    ///
    /// Returns the `(cols, rows)` the grid must have.
    pub fn validate(&self) -> Result<(usize, usize), MapFormatError> {
        for (field, value) in [
            ("width", self.width),
            ("height", self.height),
            ("blockSize", self.block_size),
        ] {
            if value == 0 {
                return Err(MapFormatError::NonPositiveDimension { field });
            }
        }

        let cols = (self.width / self.block_size) as usize;
        let rows = (self.height / self.block_size) as usize;
        if cols == 0 || rows == 0 {
            return Err(MapFormatError::EmptyGrid {
                width: self.width,
                height: self.height,
                block_size: self.block_size,
            });
        }

        if self.tiles.len() != rows {
            return Err(MapFormatError::RowCount {
                expected: rows,
                found: self.tiles.len(),
            });
        }
        if let Some((row, found)) = self
            .tiles
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|(_, len)| *len != cols)
        {
            return Err(MapFormatError::RowLength {
                row,
                expected: cols,
                found,
            });
        }

        for (marker, pos) in [("start", self.start_pos), ("end", self.end_pos)] {
            let inside =
                pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < cols && (pos.y as usize) < rows;
            if !inside {
                return Err(MapFormatError::MarkerOutOfBounds {
                    marker,
                    x: pos.x,
                    y: pos.y,
                    cols,
                    rows,
                });
            }
        }

        Ok((cols, rows))
    }
}

/// On-disk/LocalStorage wrapper. Documents saved before versioning carry no
/// `version` field and are read as version 1.
#[derive(Debug, Serialize, Deserialize)]
struct MapDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<u32>,
    #[serde(flatten)]
    map: MapData,
}

/// Serialize a map as a versioned JSON document
pub fn encode(map: &TileMap) -> Result<String, MapFormatError> {
    let doc = MapDocument {
        version: Some(MAP_FORMAT_VERSION),
        map: map.to_data(),
    };
    Ok(serde_json::to_string(&doc)?)
}

/// Parse and validate a JSON document into a map record
pub fn decode(json: &str) -> Result<MapData, MapFormatError> {
    let doc: MapDocument = serde_json::from_str(json)?;
    match doc.version {
        Some(MAP_FORMAT_VERSION) => {}
        Some(found) => return Err(MapFormatError::UnsupportedVersion { found }),
        None => log::warn!("Map document has no version tag, reading as v{MAP_FORMAT_VERSION}"),
    }
    doc.map.validate()?;
    Ok(doc.map)
}

/// Parse a JSON document straight into a map
pub fn decode_map(json: &str) -> Result<TileMap, MapFormatError> {
    TileMap::try_from(decode(json)?)
}

/// Read a LocalStorage item (WASM only)
#[cfg(target_arch = "wasm32")]
pub fn load_item(key: &str) -> Option<String> {
    let storage = web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten()?;
    storage.get_item(key).ok().flatten()
}

/// Write a LocalStorage item (WASM only); returns false if storage is unavailable
#[cfg(target_arch = "wasm32")]
pub fn store_item(key: &str, value: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten()
        .map(|storage| storage.set_item(key, value).is_ok())
        .unwrap_or(false)
}

/// Native stubs
#[cfg(not(target_arch = "wasm32"))]
pub fn load_item(_key: &str) -> Option<String> {
    None
}

#[cfg(not(target_arch = "wasm32"))]
pub fn store_item(_key: &str, _value: &str) -> bool {
    false
}
