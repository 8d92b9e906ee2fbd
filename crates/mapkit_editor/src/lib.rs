//! mapkit_editor - Editing session and layer pipeline for the mapkit tile editor
//!
//! This crate provides everything between a host UI shell and the map data:
//! - An editing session ([`Document`]) owning the property store, the level
//!   and the undo history
//! - A layer pipeline in three bands (display, overlay, editor)
//! - A pointer input router turning pixels into tile clicks and drags
//! - Paint, erase, fill and element tools
//! - Host-neutral keyboard shortcuts
//! - Editor configuration with a JSON config file
//!
//! The host draws by implementing [`render::Canvas`] and feeds input as
//! [`PointerEvent`]s. With the `bevy` feature, [`MapEditorInputPlugin`]
//! does the input half for a Bevy app.
//!
//! # Usage
//!
//! ```
//! use mapkit_editor::{EditorConfig, EditorSession, Modifiers, PointerEvent, TilesetInfo};
//!
//! let config = EditorConfig::new().with_tileset(TilesetInfo::new("overworld", 16, 16, 64));
//! let mut session = EditorSession::new(&config).unwrap();
//!
//! session.document.set_selected_tiles(vec![3]);
//!
//! let mods = Modifiers::NONE;
//! session.pointer(PointerEvent::Pressed { x: 20, y: 4, mods });
//! session.pointer(PointerEvent::Released { x: 20, y: 4, mods });
//! assert!(session.document.history.can_undo());
//! ```

pub mod commands;
pub mod config;
pub mod document;
pub mod input;
pub mod keys;
pub mod pipeline;
pub mod render;
pub mod session;
pub mod tools;

#[cfg(feature = "bevy")]
pub mod bevy_input;

// Re-export the data model
pub use mapkit_core;

pub use commands::{shortcut_action, EditorAction};
pub use config::{ConfigError, EditorConfig};
pub use document::{Document, DocumentError};
pub use input::{pixel_to_tile, InputRouter, PointerEvent};
pub use keys::TilesetInfo;
pub use pipeline::{
    Band, CursorIcon, DragState, DragTracker, LayerPipeline, MapLayer, Modifiers, SelectionLayer,
};
pub use session::{default_pipeline, EditorSession};
pub use tools::EditorTool;

#[cfg(feature = "bevy")]
pub use bevy_input::{EditorCursor, MapEditorInputPlugin};
