//! A ready-to-use editor: document, default layer stack and input router

use mapkit_core::{LayerId, MapSection};

use crate::commands::{shortcut_action, EditorAction};
use crate::config::EditorConfig;
use crate::document::{Document, DocumentError};
use crate::input::{InputRouter, PointerEvent};
use crate::keys;
use crate::pipeline::{Band, CursorIcon, LayerPipeline, SelectionLayer};
use crate::render::{Canvas, ElementMarkerLayer, GridLinesLayer, HoverLayer, TileDisplayLayer};
use crate::tools::{BrushLayer, EditorTool, ElementLayer, FillLayer};

/// Build the standard layer stack for a document
///
/// - display: one tile layer per map layer, base first
/// - overlay: grid lines, element markers, hover highlight
/// - editor: the tool selection keyed on the active tool
pub fn default_pipeline(doc: &Document) -> LayerPipeline {
    let mut pipeline = LayerPipeline::new();
    for layer in LayerId::ALL {
        pipeline.add(Band::Display, TileDisplayLayer::new(layer));
    }
    pipeline.add(Band::Overlay, GridLinesLayer::new());
    pipeline.add(Band::Overlay, ElementMarkerLayer::new());
    pipeline.add(Band::Overlay, HoverLayer::new());

    let tools = SelectionLayer::new("Tools", doc, keys::ACTIVE_TOOL)
        .with_layer(EditorTool::Paint, BrushLayer::painter())
        .with_layer(EditorTool::Erase, BrushLayer::eraser())
        .with_layer(EditorTool::Fill, FillLayer::new())
        .with_layer(EditorTool::Element, ElementLayer::new());
    pipeline.add(Band::Editor, tools);
    pipeline
}

/// One open map with everything needed to edit it
#[derive(Debug)]
pub struct EditorSession {
    pub document: Document,
    pub pipeline: LayerPipeline,
    pub router: InputRouter,
}

impl EditorSession {
    pub fn new(config: &EditorConfig) -> Result<Self, DocumentError> {
        Ok(Self::with_document(Document::new(config)?))
    }

    pub fn from_section(
        name: impl Into<String>,
        section: &MapSection,
        config: &EditorConfig,
    ) -> Result<Self, DocumentError> {
        Ok(Self::with_document(Document::from_section(
            name, section, config,
        )?))
    }

    pub fn with_document(document: Document) -> Self {
        let pipeline = default_pipeline(&document);
        Self {
            document,
            pipeline,
            router: InputRouter::new(),
        }
    }

    /// Route a pointer event, returning the cursor to show
    pub fn pointer(&mut self, event: PointerEvent) -> CursorIcon {
        self.router.handle(&mut self.document, &mut self.pipeline, event)
    }

    /// Run an action and publish the grid changes it caused
    pub fn perform(&mut self, action: EditorAction) -> bool {
        let changed = action.perform(&mut self.document);
        self.pipeline.flush_dirty(&mut self.document);
        changed
    }

    /// Handle a key press. Returns the action run, if the key is bound.
    pub fn key(&mut self, key: char, ctrl: bool, shift: bool) -> Option<EditorAction> {
        let action = shortcut_action(key, ctrl, shift)?;
        self.perform(action);
        Some(action)
    }

    pub fn paint(&mut self, canvas: &mut dyn Canvas) {
        self.pipeline.paint(&self.document, canvas);
    }
}
