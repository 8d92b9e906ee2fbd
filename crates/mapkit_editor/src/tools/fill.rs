//! Flood fill tool

use mapkit_core::{TilePos, EMPTY_TILE};

use crate::document::Document;
use crate::pipeline::{CursorIcon, MapLayer, Modifiers};

/// Fills the connected region under a click with tiles from the pool.
/// Alt+click clears the region instead.
#[derive(Debug, Default)]
pub struct FillLayer;

impl FillLayer {
    pub fn new() -> Self {
        Self
    }
}

impl MapLayer for FillLayer {
    fn name(&self) -> &str {
        "Fill"
    }

    fn clicked(&mut self, doc: &mut Document, pos: TilePos, mods: Modifiers) {
        if mods.right_click() || mods.middle_click() {
            return;
        }
        let layer = doc.active_layer();
        let pool = if mods.alt() {
            if !layer.allows_empty() {
                tracing::debug!("{} layer cannot be cleared", layer.display_name());
                return;
            }
            vec![EMPTY_TILE]
        } else {
            doc.selected_tiles()
        };
        if doc.fill(layer, pos, &pool) {
            tracing::debug!(
                "Filled from ({}, {}) on {} layer",
                pos.row,
                pos.col,
                layer.display_name()
            );
        }
    }

    fn cursor(&self, doc: &Document, pos: TilePos) -> CursorIcon {
        if doc.level.grid.in_bounds(pos.row, pos.col) {
            CursorIcon::Crosshair
        } else {
            CursorIcon::Default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::tests::document;
    use mapkit_core::LayerId;

    #[test]
    fn test_fill_region_and_undo() {
        let mut doc = document();
        // Wall across row 5 splits the map
        for col in 0..10 {
            doc.paint_cell(LayerId::Base, TilePos::new(5, col), 9, false);
        }
        doc.history.clear();
        doc.set_selected_tiles(vec![4]);

        FillLayer::new().clicked(&mut doc, TilePos::new(0, 0), Modifiers::NONE);
        assert_eq!(doc.level.grid.get(LayerId::Base, 4, 9), Some(4));
        assert_eq!(doc.level.grid.get(LayerId::Base, 5, 0), Some(9));
        assert_eq!(doc.level.grid.get(LayerId::Base, 6, 0), Some(0));
        assert_eq!(doc.history.undo_depth(), 1);
        assert_eq!(doc.history.undo_entries()[0].leaf_count(), 50);

        doc.undo();
        assert_eq!(doc.level.grid.get(LayerId::Base, 0, 0), Some(0));
        assert_eq!(doc.level.grid.get(LayerId::Base, 4, 9), Some(0));
    }

    #[test]
    fn test_alt_clears_upper_layer_only() {
        let mut doc = document();
        let mut fill = FillLayer::new();

        fill.clicked(&mut doc, TilePos::new(0, 0), Modifiers::ALT);
        assert!(!doc.history.can_undo());

        doc.set_active_layer(LayerId::Top);
        doc.set_selected_tiles(vec![2]);
        fill.clicked(&mut doc, TilePos::new(0, 0), Modifiers::NONE);
        assert_eq!(doc.level.grid.get(LayerId::Top, 9, 9), Some(2));

        fill.clicked(&mut doc, TilePos::new(3, 3), Modifiers::ALT);
        assert_eq!(doc.level.grid.get(LayerId::Top, 9, 9), Some(EMPTY_TILE));
        assert_eq!(doc.history.undo_depth(), 2);
    }

    #[test]
    fn test_empty_pool_entry_never_fills_base() {
        let mut doc = document();
        let mut fill = FillLayer::new();
        doc.set_selected_tiles(vec![EMPTY_TILE]);
        fill.clicked(&mut doc, TilePos::new(9, 9), Modifiers::NONE);
        assert_eq!(doc.level.grid.get(LayerId::Base, 9, 9), Some(0));
        assert!(!doc.history.can_undo());

        doc.set_selected_tiles(vec![EMPTY_TILE, 5]);
        fill.clicked(&mut doc, TilePos::new(9, 9), Modifiers::NONE);
        assert_eq!(doc.level.grid.get(LayerId::Base, 0, 0), Some(5));
        assert_eq!(doc.level.grid.get(LayerId::Base, 9, 9), Some(5));
    }

    #[test]
    fn test_out_of_bounds_click_is_noop() {
        let mut doc = document();
        let mut fill = FillLayer::new();
        fill.clicked(&mut doc, TilePos::new(10, 0), Modifiers::NONE);
        assert!(!doc.history.can_undo());
        assert_eq!(fill.cursor(&doc, TilePos::new(10, 0)), CursorIcon::Default);
    }
}
