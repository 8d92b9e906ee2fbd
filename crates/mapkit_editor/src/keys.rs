//! Property store keys shared by the editing session and its layers

use mapkit_core::{ElementKind, LayerId, PropertyKey, TileIndex, TilePos};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::tools::EditorTool;

/// Tile atlas metadata supplied by the tileset loader
///
/// The editor only needs the per-tile pixel size; the rest is carried for
/// hosts that display it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TilesetInfo {
    pub name: String,
    pub tile_width: u32,
    pub tile_height: u32,
    pub tile_count: u32,
}

impl TilesetInfo {
    pub fn new(name: impl Into<String>, tile_width: u32, tile_height: u32, tile_count: u32) -> Self {
        Self {
            name: name.into(),
            tile_width,
            tile_height,
            tile_count,
        }
    }
}

/// Currently selected editing tool
pub const ACTIVE_TOOL: PropertyKey<EditorTool> = PropertyKey::new("ActiveTool");

/// Layer receiving paint and fill edits
pub const ACTIVE_LAYER: PropertyKey<LayerId> = PropertyKey::new("ActiveLayer");

/// Pool of tiles to paint with; one is drawn at random per cell
pub const SELECTED_TILES: PropertyKey<Vec<TileIndex>> = PropertyKey::new("SelectedTiles");

/// Active tileset, absent until one is loaded
pub const TILESET: PropertyKey<Option<TilesetInfo>> = PropertyKey::new("Tileset");

/// Whether the grid overlay is drawn
pub const SHOW_GRID: PropertyKey<bool> = PropertyKey::new("ShowGrid");

/// Per-layer visibility, use `LAYER_VISIBLE.indexed(layer.index() as i32)`
pub const LAYER_VISIBLE: PropertyKey<bool> = PropertyKey::new("LayerVisible");

/// Kind of element the element tool places
pub const PLACEMENT_KIND: PropertyKey<ElementKind> = PropertyKey::new("PlacementKind");

/// Elements currently selected by the element tool
pub const SELECTED_ELEMENTS: PropertyKey<Vec<Uuid>> = PropertyKey::new("SelectedElements");

/// Tile under the pointer, for status displays
pub const HOVERED_TILE: PropertyKey<Option<TilePos>> = PropertyKey::new("HoveredTile");

/// Visibility key for one map layer
pub fn layer_visible(layer: LayerId) -> PropertyKey<bool> {
    LAYER_VISIBLE.indexed(layer.index() as i32)
}
