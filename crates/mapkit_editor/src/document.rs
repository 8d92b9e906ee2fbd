//! The editing session for one open map
//!
//! A [`Document`] owns everything an open map needs: the property store,
//! the level (grid and elements), the undo history, the random source for
//! variant painting, and the queue of dirty regions waiting to be pushed to
//! the view. Layers receive it by reference on every callback; nothing is
//! global.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use mapkit_core::{
    flood_fill, is_empty_tile, CommandHistory, DirtyRect, EditCommand, ElementKind, GridError,
    LayerId, Level, Listener, MapSection, PropertyKey, PropertyStore, StoreError, TileIndex,
    TilePos, MAX_MAP_SIZE,
};
use uuid::Uuid;

use crate::config::EditorConfig;
use crate::keys::{self, TilesetInfo};
use crate::tools::EditorTool;

/// Errors creating a [`Document`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// The map data was rejected
    Grid(GridError),
    /// The editor properties could not be registered
    Store(StoreError),
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentError::Grid(e) => write!(f, "Invalid map: {}", e),
            DocumentError::Store(e) => write!(f, "Editor property setup failed: {}", e),
        }
    }
}

impl std::error::Error for DocumentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DocumentError::Grid(e) => Some(e),
            DocumentError::Store(e) => Some(e),
        }
    }
}

impl From<GridError> for DocumentError {
    fn from(e: GridError) -> Self {
        DocumentError::Grid(e)
    }
}

impl From<StoreError> for DocumentError {
    fn from(e: StoreError) -> Self {
        DocumentError::Store(e)
    }
}

pub struct Document {
    pub store: PropertyStore,
    pub level: Level,
    pub history: CommandHistory,
    pub rng: fastrand::Rng,
    dirty_regions: Rc<RefCell<Vec<DirtyRect>>>,
}

impl Document {
    /// Create a session with a default map sized from the config
    pub fn new(config: &EditorConfig) -> Result<Self, DocumentError> {
        let level = Level::new("Untitled".to_string(), config.map_width, config.map_height)?;
        Ok(Self::with_level(level, config)?)
    }

    /// Create a session from a parsed map section
    pub fn from_section(
        name: impl Into<String>,
        section: &MapSection,
        config: &EditorConfig,
    ) -> Result<Self, DocumentError> {
        let level = Level::from_section(name.into(), section)?;
        Ok(Self::with_level(level, config)?)
    }

    /// Wrap an existing level
    pub fn with_level(mut level: Level, config: &EditorConfig) -> Result<Self, StoreError> {
        let dirty_regions = Rc::new(RefCell::new(Vec::new()));
        let sink = dirty_regions.clone();
        level.grid.on_dirty(move |rect| sink.borrow_mut().push(rect));

        let document = Self {
            store: PropertyStore::new(),
            level,
            history: CommandHistory::with_limit(config.history_limit),
            rng: config.rng(),
            dirty_regions,
        };
        document.populate_store(config)?;
        document.watch_view_state()?;
        Ok(document)
    }

    fn populate_store(&self, config: &EditorConfig) -> Result<(), StoreError> {
        self.store.add(keys::ACTIVE_TOOL, config.initial_tool)?;
        self.store.add(keys::ACTIVE_LAYER, LayerId::Base)?;
        self.store.add(keys::SELECTED_TILES, vec![0])?;
        self.store.add(keys::TILESET, config.tileset.clone())?;
        self.store.add(keys::SHOW_GRID, config.show_grid)?;
        self.store.add(keys::PLACEMENT_KIND, ElementKind::Npc)?;
        self.store.add(keys::SELECTED_ELEMENTS, Vec::new())?;
        self.store.add(keys::HOVERED_TILE, None)?;
        for layer in LayerId::ALL {
            self.store.add(keys::layer_visible(layer), true)?;
        }
        Ok(())
    }

    /// Queue repaints when store values the view draws change
    fn watch_view_state(&self) -> Result<(), StoreError> {
        let sink = self.dirty_regions.clone();
        let repaint_all: Listener = Rc::new(move |_: &PropertyStore| {
            sink.borrow_mut().push(DirtyRect::new(0, 0, MAX_MAP_SIZE, MAX_MAP_SIZE));
        });
        self.store.add_listener(keys::SHOW_GRID, repaint_all.clone());
        self.store.add_listener(keys::TILESET, repaint_all.clone());
        self.store.add_listener(keys::SELECTED_ELEMENTS, repaint_all.clone());
        for layer in LayerId::ALL {
            self.store.add_listener(keys::layer_visible(layer), repaint_all.clone());
        }

        // Hover moves repaint the cell left and the cell entered
        let sink = self.dirty_regions.clone();
        let previous = Cell::new(self.store.get(keys::HOVERED_TILE)?);
        let hover: Listener = Rc::new(move |store: &PropertyStore| {
            let hovered = store
                .get(keys::HOVERED_TILE)
                .unwrap_or_else(|e| panic!("editor property {}: {}", keys::HOVERED_TILE.id(), e));
            let mut regions = sink.borrow_mut();
            for pos in [previous.replace(hovered), hovered].into_iter().flatten() {
                regions.push(DirtyRect::cell(pos.row, pos.col));
            }
        });
        self.store.add_listener(keys::HOVERED_TILE, hover);
        Ok(())
    }

    /// Export the map for the file serializer
    pub fn to_section(&self) -> Result<MapSection, GridError> {
        self.level.grid.to_section()
    }

    // ------------------------------------------------------------------
    // Store access. Every key is registered at construction; a failure
    // here is a wiring bug and panics.
    // ------------------------------------------------------------------

    fn property<T: Clone + 'static>(&self, key: PropertyKey<T>) -> T {
        self.store
            .get(key)
            .unwrap_or_else(|e| panic!("editor property {}: {}", key.id(), e))
    }

    fn update<T: PartialEq + 'static>(&self, key: PropertyKey<T>, value: T) -> bool {
        self.store
            .set(key, value)
            .unwrap_or_else(|e| panic!("editor property {}: {}", key.id(), e))
    }

    pub fn active_tool(&self) -> EditorTool {
        self.property(keys::ACTIVE_TOOL)
    }

    pub fn active_layer(&self) -> LayerId {
        self.property(keys::ACTIVE_LAYER)
    }

    pub fn tileset(&self) -> Option<TilesetInfo> {
        self.property(keys::TILESET)
    }

    /// Per-tile pixel size of the active tileset
    pub fn tile_size(&self) -> Option<(u32, u32)> {
        self.tileset()
            .filter(|t| t.tile_width > 0 && t.tile_height > 0)
            .map(|t| (t.tile_width, t.tile_height))
    }

    pub fn show_grid(&self) -> bool {
        self.property(keys::SHOW_GRID)
    }

    pub fn layer_visible(&self, layer: LayerId) -> bool {
        self.property(keys::layer_visible(layer))
    }

    pub fn selected_tiles(&self) -> Vec<TileIndex> {
        self.property(keys::SELECTED_TILES)
    }

    pub fn selected_elements(&self) -> Vec<Uuid> {
        self.property(keys::SELECTED_ELEMENTS)
    }

    pub fn placement_kind(&self) -> ElementKind {
        self.property(keys::PLACEMENT_KIND)
    }

    pub fn hovered_tile(&self) -> Option<TilePos> {
        self.property(keys::HOVERED_TILE)
    }

    // Setters return whether the value changed

    pub fn set_tool(&self, tool: EditorTool) -> bool {
        self.update(keys::ACTIVE_TOOL, tool)
    }

    pub fn set_active_layer(&self, layer: LayerId) -> bool {
        self.update(keys::ACTIVE_LAYER, layer)
    }

    pub fn set_tileset(&self, tileset: Option<TilesetInfo>) -> bool {
        self.update(keys::TILESET, tileset)
    }

    pub fn set_show_grid(&self, shown: bool) -> bool {
        self.update(keys::SHOW_GRID, shown)
    }

    pub fn set_layer_visible(&self, layer: LayerId, visible: bool) -> bool {
        self.update(keys::layer_visible(layer), visible)
    }

    pub fn set_selected_tiles(&self, pool: Vec<TileIndex>) -> bool {
        self.update(keys::SELECTED_TILES, pool)
    }

    pub fn set_selected_elements(&self, ids: Vec<Uuid>) -> bool {
        self.update(keys::SELECTED_ELEMENTS, ids)
    }

    pub fn set_placement_kind(&self, kind: ElementKind) -> bool {
        self.update(keys::PLACEMENT_KIND, kind)
    }

    pub fn set_hovered_tile(&self, hovered: Option<TilePos>) -> bool {
        self.update(keys::HOVERED_TILE, hovered)
    }

    /// Draw one tile from the selected pool that `layer` can hold
    ///
    /// The empty sentinel is skipped for layers that must always hold a tile.
    pub fn pick_tile(&mut self, layer: LayerId) -> Option<TileIndex> {
        let pool = self.paintable_pool(layer, &self.selected_tiles());
        if pool.is_empty() {
            return None;
        }
        Some(pool[self.rng.usize(..pool.len())])
    }

    fn paintable_pool(&self, layer: LayerId, pool: &[TileIndex]) -> Vec<TileIndex> {
        pool.iter()
            .copied()
            .filter(|tile| layer.allows_empty() || !is_empty_tile(*tile))
            .collect()
    }

    // ------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------

    /// Write one cell and record the change
    ///
    /// With `coalesce` the dirty notification is deferred until
    /// [`Document::flush_grid`]. The empty sentinel is refused on layers
    /// that must always hold a tile.
    pub fn paint_cell(
        &mut self,
        layer: LayerId,
        pos: TilePos,
        value: TileIndex,
        coalesce: bool,
    ) -> bool {
        if is_empty_tile(value) && !layer.allows_empty() {
            tracing::debug!("{} layer cannot hold empty cells", layer.display_name());
            return false;
        }
        match self.level.grid.set(layer, pos.row, pos.col, value, coalesce) {
            Some(command) => {
                self.history.push(command);
                true
            }
            None => false,
        }
    }

    /// Flood fill from `pos` on `layer` with `pool` and record one command
    ///
    /// Pool entries the layer cannot hold are dropped; nothing happens when
    /// none are left.
    pub fn fill(&mut self, layer: LayerId, pos: TilePos, pool: &[TileIndex]) -> bool {
        let pool = self.paintable_pool(layer, pool);
        if pool.is_empty() {
            tracing::debug!("Nothing to fill the {} layer with", layer.display_name());
            return false;
        }
        match flood_fill(
            &mut self.level.grid,
            layer,
            pos.row,
            pos.col,
            &pool,
            &mut self.rng,
        ) {
            Some(command) => {
                self.history.push(command);
                true
            }
            None => false,
        }
    }

    /// Change the logical map size and record it for undo
    pub fn resize(&mut self, width: u32, height: u32) -> Result<bool, GridError> {
        match self.level.grid.resize(width, height)? {
            Some(command) => {
                self.history.push(command);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Apply a command built elsewhere and record it
    pub fn execute(&mut self, command: EditCommand) {
        command.apply(&mut self.level);
        self.level.grid.flush_dirty();
        self.history.push(command);
    }

    /// Record an already-applied command
    pub fn record(&mut self, command: EditCommand) {
        self.history.push(command);
    }

    pub fn undo(&mut self) -> bool {
        let undone = self.history.undo(&mut self.level);
        if undone {
            self.prune_selection();
        }
        undone
    }

    pub fn redo(&mut self) -> bool {
        let redone = self.history.redo(&mut self.level);
        if redone {
            self.prune_selection();
        }
        redone
    }

    /// Publish any coalesced grid writes
    pub fn flush_grid(&mut self) -> Option<DirtyRect> {
        self.level.grid.flush_dirty()
    }

    /// Drain the dirty regions queued since the last call
    pub fn take_dirty_regions(&self) -> Vec<DirtyRect> {
        std::mem::take(&mut *self.dirty_regions.borrow_mut())
    }

    /// Drop selected ids whose elements no longer exist
    fn prune_selection(&self) {
        let selected = self.selected_elements();
        let kept: Vec<Uuid> = selected
            .iter()
            .copied()
            .filter(|id| self.level.get_element(*id).is_some())
            .collect();
        if kept.len() != selected.len() {
            self.set_selected_elements(kept);
        }
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("store", &self.store)
            .field("level", &self.level)
            .field("history", &self.history)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapkit_core::EMPTY_TILE;

    fn document() -> Document {
        Document::new(&EditorConfig::new().with_map_size(8, 8).with_seed(3)).unwrap()
    }

    #[test]
    fn test_store_is_populated() {
        let doc = document();
        assert_eq!(doc.active_tool(), EditorTool::Paint);
        assert_eq!(doc.active_layer(), LayerId::Base);
        assert!(doc.tileset().is_none());
        assert!(doc.tile_size().is_none());
        assert!(doc.show_grid());
        for layer in LayerId::ALL {
            assert!(doc.layer_visible(layer));
        }
        assert_eq!(doc.selected_tiles(), vec![0]);
        assert_eq!(doc.hovered_tile(), None);
    }

    #[test]
    #[should_panic(expected = "ActiveTool")]
    fn test_missing_property_fails_fast() {
        let doc = document();
        doc.store.remove(keys::ACTIVE_TOOL);
        doc.active_tool();
    }

    #[test]
    fn test_construction_errors() {
        let config = EditorConfig::new().with_map_size(0, 4);
        assert_eq!(
            Document::new(&config).unwrap_err(),
            DocumentError::Grid(GridError::EmptyDimensions)
        );

        let short = MapSection {
            width: 2,
            height: 2,
            tiles: vec![0; 3],
        };
        let err = Document::from_section("Short", &short, &EditorConfig::default()).unwrap_err();
        assert!(matches!(err, DocumentError::Grid(GridError::SectionLength { .. })));
    }

    #[test]
    fn test_paint_and_undo() {
        let mut doc = document();
        assert!(doc.paint_cell(LayerId::Top, TilePos::new(2, 2), 4, false));
        assert!(!doc.paint_cell(LayerId::Top, TilePos::new(2, 2), 4, false));
        assert!(!doc.paint_cell(LayerId::Top, TilePos::new(9, 2), 4, false));
        assert_eq!(doc.take_dirty_regions(), vec![DirtyRect::cell(2, 2)]);

        assert!(doc.undo());
        assert_eq!(doc.level.grid.get(LayerId::Top, 2, 2), Some(EMPTY_TILE));
        assert_eq!(doc.take_dirty_regions(), vec![DirtyRect::cell(2, 2)]);
        assert!(doc.redo());
        assert_eq!(doc.level.grid.get(LayerId::Top, 2, 2), Some(4));
    }

    #[test]
    fn test_base_layer_never_holds_empty() {
        let mut doc = document();
        assert!(!doc.paint_cell(LayerId::Base, TilePos::new(0, 0), EMPTY_TILE, false));
        assert!(!doc.fill(LayerId::Base, TilePos::new(0, 0), &[EMPTY_TILE]));
        assert_eq!(doc.level.grid.get(LayerId::Base, 0, 0), Some(0));
        assert!(!doc.history.can_undo());

        // Mixed pools fill the base with the real tiles only
        assert!(doc.fill(LayerId::Base, TilePos::new(0, 0), &[EMPTY_TILE, 6]));
        for row in 0..8 {
            for col in 0..8 {
                assert_eq!(doc.level.grid.get(LayerId::Base, row, col), Some(6));
            }
        }

        // Upper layers accept the sentinel
        doc.paint_cell(LayerId::Middle, TilePos::new(1, 1), 2, false);
        assert!(doc.paint_cell(LayerId::Middle, TilePos::new(1, 1), EMPTY_TILE, false));
    }

    #[test]
    fn test_pick_tile_from_pool() {
        let mut doc = document();
        doc.set_selected_tiles(vec![3, 4]);
        for _ in 0..20 {
            let tile = doc.pick_tile(LayerId::Base).unwrap();
            assert!(tile == 3 || tile == 4);
        }
        doc.set_selected_tiles(Vec::new());
        assert_eq!(doc.pick_tile(LayerId::Base), None);

        doc.set_selected_tiles(vec![EMPTY_TILE]);
        assert_eq!(doc.pick_tile(LayerId::Base), None);
        assert_eq!(doc.pick_tile(LayerId::Top), Some(EMPTY_TILE));
    }

    #[test]
    fn test_tile_size_requires_positive_dimensions() {
        let doc = document();
        doc.set_tileset(Some(TilesetInfo::new("bad", 0, 16, 1)));
        assert!(doc.tile_size().is_none());
        doc.set_tileset(Some(TilesetInfo::new("good", 16, 8, 1)));
        assert_eq!(doc.tile_size(), Some((16, 8)));
    }

    #[test]
    fn test_view_state_changes_queue_repaints() {
        let doc = document();
        doc.set_hovered_tile(Some(TilePos::new(1, 2)));
        assert_eq!(doc.take_dirty_regions(), vec![DirtyRect::cell(1, 2)]);

        doc.set_hovered_tile(Some(TilePos::new(3, 3)));
        assert_eq!(
            doc.take_dirty_regions(),
            vec![DirtyRect::cell(1, 2), DirtyRect::cell(3, 3)]
        );

        doc.set_hovered_tile(None);
        assert_eq!(doc.take_dirty_regions(), vec![DirtyRect::cell(3, 3)]);

        doc.set_show_grid(false);
        assert_eq!(
            doc.take_dirty_regions(),
            vec![DirtyRect::new(0, 0, MAX_MAP_SIZE, MAX_MAP_SIZE)]
        );
        // Unchanged values queue nothing
        doc.set_show_grid(false);
        assert!(doc.take_dirty_regions().is_empty());
    }

    #[test]
    fn test_resize_is_undoable() {
        let mut doc = document();
        assert!(doc.resize(4, 4).unwrap());
        assert!(!doc.resize(4, 4).unwrap());
        assert!(doc.resize(200, 4).is_err());
        doc.undo();
        assert_eq!(doc.level.grid.size(), (8, 8));
    }

    #[test]
    fn test_from_section() {
        let mut source = document();
        source.paint_cell(LayerId::Middle, TilePos::new(1, 1), 6, false);
        let section = source.to_section().unwrap();

        let doc = Document::from_section("Copy", &section, &EditorConfig::default()).unwrap();
        assert_eq!(doc.level.name, "Copy");
        assert_eq!(doc.level.grid.get(LayerId::Middle, 1, 1), Some(6));
        assert!(!doc.history.can_undo());
    }

    #[test]
    fn test_fill_records_one_command() {
        let mut doc = document();
        assert!(doc.fill(LayerId::Base, TilePos::new(0, 0), &[2]));
        assert_eq!(doc.history.undo_depth(), 1);
        assert_eq!(doc.take_dirty_regions(), vec![DirtyRect::new(0, 0, 8, 8)]);
        assert!(!doc.fill(LayerId::Base, TilePos::new(8, 0), &[2]));
    }
}
