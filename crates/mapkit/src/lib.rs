//! # mapkit
//!
//! Editing core for 2D tile maps.
//!
//! This crate bundles the data model and the editor layer of mapkit so a
//! host UI only needs one dependency.
//!
//! ## Quick Start
//!
//! ```
//! use mapkit::prelude::*;
//!
//! let config = EditorConfig::new()
//!     .with_map_size(32, 32)
//!     .with_tileset(TilesetInfo::new("dungeon", 16, 16, 128));
//! let mut session = EditorSession::new(&config).unwrap();
//!
//! // Select the fill tool and fill the base layer with tile 7
//! session.perform(EditorAction::SelectTool(EditorTool::Fill));
//! session.document.set_selected_tiles(vec![7]);
//! let mods = Modifiers::NONE;
//! session.pointer(PointerEvent::Pressed { x: 5, y: 5, mods });
//! session.pointer(PointerEvent::Released { x: 5, y: 5, mods });
//!
//! assert_eq!(session.document.level.grid.get(LayerId::Base, 31, 31), Some(7));
//! ```
//!
//! ## Features
//!
//! - `bevy` - Adds `MapEditorInputPlugin`, forwarding Bevy input into a session
//!
//! ## Crate Structure
//!
//! - [`core`] - Property store, tile grid, level, commands, history, flood fill
//! - [`editor`] - Document, layer pipeline, input router, tools, configuration

// =============================================================================
// Core module - data model
// =============================================================================

/// Map data model and editing primitives.
///
/// This module provides the fundamental types:
/// - [`PropertyStore`] - Typed, observable key/value store
/// - [`TileGrid`] - Three-layer grid with dirty-region tracking
/// - [`Level`] - Grid plus interactive elements
/// - [`EditCommand`] / [`CommandHistory`] - Undo and redo
pub mod core {
    pub use mapkit_core::*;
}

pub use mapkit_core::{
    flood_fill, CommandHistory, DirtyRect, EditCommand, Element, ElementKind, GridError, LayerId,
    Level, MapSection, PropertyKey, PropertyStore, StoreError, TileGrid, TileIndex, TilePos,
    EMPTY_TILE, MAX_MAP_SIZE,
};

// =============================================================================
// Editor module - session, layers and input
// =============================================================================

/// Editing session, layer pipeline and input routing.
///
/// Provides:
/// - [`EditorSession`] - Document, default layers and router in one value
/// - [`LayerPipeline`] / [`MapLayer`] - Banded layer stack
/// - [`InputRouter`] - Pixel to tile mapping and click/drag recognition
/// - [`EditorConfig`] - Startup configuration and config file
pub mod editor {
    pub use mapkit_editor::*;
}

pub use mapkit_editor::{
    default_pipeline, shortcut_action, Band, ConfigError, CursorIcon, Document, DocumentError,
    DragTracker, EditorAction, EditorConfig, EditorSession, EditorTool, InputRouter,
    LayerPipeline, MapLayer, Modifiers, PointerEvent, SelectionLayer, TilesetInfo,
};

#[cfg(feature = "bevy")]
pub use mapkit_editor::{EditorCursor, MapEditorInputPlugin};

// =============================================================================
// Prelude - import everything commonly needed
// =============================================================================

/// Commonly used types and traits.
///
/// Import with:
/// ```rust
/// use mapkit::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use crate::{
        CommandHistory, DirtyRect, EditCommand, ElementKind, LayerId, Level, PropertyKey,
        PropertyStore, TileGrid, TilePos, EMPTY_TILE,
    };

    // Editor
    pub use crate::{
        CursorIcon, Document, EditorAction, EditorConfig, EditorSession, EditorTool, MapLayer,
        Modifiers, PointerEvent, TilesetInfo,
    };

    pub use mapkit_editor::render::Canvas;

    #[cfg(feature = "bevy")]
    pub use crate::MapEditorInputPlugin;
}
