//! Core data structures for the mapkit tile editor
//!
//! This crate provides the editing model without any UI concepts:
//! - `PropertyStore` - Typed, observable key/value store for shared editor state
//! - `TileGrid` - Fixed-capacity three-layer grid with dirty-region tracking
//! - `Level` - A grid plus the interactive elements placed on it
//! - `EditCommand` - Reversible change descriptions
//! - `CommandHistory` - Undo/redo stacks with grouping
//! - `flood_fill` - Scanline fill with random tile variants

mod command;
mod element;
mod fill;
mod grid;
mod history;
mod layer;
mod level;
mod property;

pub use command::EditCommand;
pub use element::{Element, ElementKind};
pub use fill::{flood_fill, FILL_LABEL};
pub use grid::{
    DirtyListenerId, DirtyRect, GridError, MapSection, TileGrid, TilePos, MAX_MAP_SIZE,
};
pub use history::{CommandHistory, HistoryListenerId, HistoryStatus, DEFAULT_HISTORY_LIMIT};
pub use layer::{
    is_empty_tile, tile_from_code, tile_to_code, LayerId, TileIndex, EMPTY_TILE,
    EMPTY_TILE_CODE, LAYER_COUNT,
};
pub use level::Level;
pub use property::{KeyId, Listener, PropertyKey, PropertyStore, StoreError};
