//! Editor actions and keyboard shortcuts
//!
//! Actions are what the host's menus, toolbars and key bindings trigger.
//! Shortcut mapping is host-neutral: the host supplies the key character
//! and modifier state and gets back an [`EditorAction`].

mod shortcuts;

pub use shortcuts::*;

use mapkit_core::LayerId;

use crate::document::Document;
use crate::tools::EditorTool;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    Undo,
    Redo,
    SelectTool(EditorTool),
    ToggleGrid,
    /// Make the next map layer the active one (Base, Middle, Top, Base, ...)
    CycleLayer,
    SelectLayer(LayerId),
}

impl EditorAction {
    /// Run the action. Returns `false` when it had no effect.
    pub fn perform(self, doc: &mut Document) -> bool {
        tracing::debug!("Performing {:?}", self);
        match self {
            EditorAction::Undo => doc.undo(),
            EditorAction::Redo => doc.redo(),
            EditorAction::SelectTool(tool) => doc.set_tool(tool),
            EditorAction::ToggleGrid => doc.set_show_grid(!doc.show_grid()),
            EditorAction::CycleLayer => doc.set_active_layer(doc.active_layer().next()),
            EditorAction::SelectLayer(layer) => doc.set_active_layer(layer),
        }
    }
}
