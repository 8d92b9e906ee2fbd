//! Paint and erase brushes

use mapkit_core::{is_empty_tile, LayerId, TileIndex, TilePos, EMPTY_TILE};

use super::bresenham_line;
use crate::document::Document;
use crate::pipeline::{CursorIcon, DragTracker, MapLayer, Modifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrushMode {
    /// Paint a random tile from the selected pool
    Paint,
    /// Clear cells to the empty sentinel
    Erase,
}

/// Single-cell brush. A drag paints a continuous line and records one undo
/// entry for the whole stroke.
#[derive(Debug)]
pub struct BrushLayer {
    mode: BrushMode,
    drag: DragTracker,
}

impl BrushLayer {
    pub fn painter() -> Self {
        Self {
            mode: BrushMode::Paint,
            drag: DragTracker::new("Paint"),
        }
    }

    pub fn eraser() -> Self {
        Self {
            mode: BrushMode::Erase,
            drag: DragTracker::new("Erase"),
        }
    }

    pub fn mode(&self) -> BrushMode {
        self.mode
    }

    fn can_edit(&self, layer: LayerId) -> bool {
        self.mode == BrushMode::Paint || layer.allows_empty()
    }

    fn value(&self, doc: &mut Document, layer: LayerId) -> Option<TileIndex> {
        match self.mode {
            BrushMode::Paint => doc.pick_tile(layer),
            BrushMode::Erase => Some(EMPTY_TILE),
        }
    }

    fn stamp(&self, doc: &mut Document, pos: TilePos, coalesce: bool) -> bool {
        let layer = doc.active_layer();
        if !self.can_edit(layer) {
            tracing::debug!("{} layer cannot be erased", layer.display_name());
            return false;
        }
        match self.value(doc, layer) {
            Some(value) => doc.paint_cell(layer, pos, value, coalesce),
            None => false,
        }
    }

    /// Copy the tile under the pointer into the selected pool
    fn pick(&self, doc: &mut Document, pos: TilePos) {
        let layer = doc.active_layer();
        let Some(tile) = doc.level.grid.get(layer, pos.row, pos.col) else {
            return;
        };
        if is_empty_tile(tile) {
            return;
        }
        doc.set_selected_tiles(vec![tile]);
    }
}

impl MapLayer for BrushLayer {
    fn name(&self) -> &str {
        self.drag.label()
    }

    fn clicked(&mut self, doc: &mut Document, pos: TilePos, mods: Modifiers) {
        if mods.right_click() {
            self.pick(doc, pos);
        } else if !mods.middle_click() {
            self.stamp(doc, pos, false);
        }
    }

    fn drag_start(&mut self, doc: &mut Document, pos: TilePos, mods: Modifiers) {
        if mods.right_click() || mods.middle_click() {
            return;
        }
        if !self.can_edit(doc.active_layer()) {
            return;
        }
        self.drag.begin(doc, pos);
        self.stamp(doc, pos, true);
    }

    fn drag(&mut self, doc: &mut Document, pos: TilePos, _mods: Modifiers) {
        let Some((from, to)) = self.drag.step(pos) else {
            return;
        };
        // The first point was stamped by the previous step
        for cell in bresenham_line(from, to).into_iter().skip(1) {
            self.stamp(doc, cell, true);
        }
    }

    fn drag_end(&mut self, doc: &mut Document, pos: TilePos, mods: Modifiers) {
        if !self.drag.is_dragging() {
            return;
        }
        self.drag(doc, pos, mods);
        self.drag.end(doc);
    }

    fn exited(&mut self, doc: &mut Document) {
        self.drag.end(doc);
    }

    fn cursor(&self, doc: &Document, pos: TilePos) -> CursorIcon {
        if !doc.level.grid.in_bounds(pos.row, pos.col) {
            return CursorIcon::Default;
        }
        if self.can_edit(doc.active_layer()) {
            CursorIcon::Crosshair
        } else {
            CursorIcon::NotAllowed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::tests::document;

    #[test]
    fn test_click_paints_from_pool() {
        let mut doc = document();
        doc.set_active_layer(LayerId::Middle);
        doc.set_selected_tiles(vec![8]);
        let mut brush = BrushLayer::painter();

        brush.clicked(&mut doc, TilePos::new(1, 1), Modifiers::NONE);
        assert_eq!(doc.level.grid.get(LayerId::Middle, 1, 1), Some(8));
        assert_eq!(doc.history.undo_depth(), 1);
    }

    #[test]
    fn test_drag_stroke_is_one_undo_entry() {
        let mut doc = document();
        doc.set_selected_tiles(vec![3]);
        let mut brush = BrushLayer::painter();
        let none = Modifiers::NONE;

        brush.drag_start(&mut doc, TilePos::new(0, 0), none);
        brush.drag(&mut doc, TilePos::new(0, 4), none);
        brush.drag(&mut doc, TilePos::new(2, 4), none);
        brush.drag_end(&mut doc, TilePos::new(2, 4), none);

        for col in 0..=4 {
            assert_eq!(doc.level.grid.get(LayerId::Base, 0, col), Some(3));
        }
        assert_eq!(doc.level.grid.get(LayerId::Base, 1, 4), Some(3));
        assert_eq!(doc.level.grid.get(LayerId::Base, 2, 4), Some(3));
        assert_eq!(doc.history.undo_depth(), 1);
        assert_eq!(doc.history.peek_undo_label(), Some("Paint"));

        doc.undo();
        for col in 0..=4 {
            assert_eq!(doc.level.grid.get(LayerId::Base, 0, col), Some(0));
        }
        assert_eq!(doc.level.grid.get(LayerId::Base, 2, 4), Some(0));
    }

    #[test]
    fn test_drag_past_edge_is_absorbed() {
        let mut doc = document();
        doc.set_selected_tiles(vec![1]);
        let mut brush = BrushLayer::painter();
        let none = Modifiers::NONE;

        brush.drag_start(&mut doc, TilePos::new(0, 8), none);
        brush.drag(&mut doc, TilePos::new(0, 12), none);
        brush.drag_end(&mut doc, TilePos::new(0, 12), none);
        assert_eq!(doc.level.grid.get(LayerId::Base, 0, 9), Some(1));
        assert_eq!(doc.history.undo_entries()[0].leaf_count(), 2);
    }

    #[test]
    fn test_eraser_refuses_base_layer() {
        let mut doc = document();
        let mut eraser = BrushLayer::eraser();
        let pos = TilePos::new(1, 1);

        eraser.clicked(&mut doc, pos, Modifiers::NONE);
        assert_eq!(doc.level.grid.get(LayerId::Base, 1, 1), Some(0));
        assert_eq!(eraser.cursor(&doc, pos), CursorIcon::NotAllowed);

        doc.set_active_layer(LayerId::Top);
        doc.paint_cell(LayerId::Top, pos, 5, false);
        eraser.clicked(&mut doc, pos, Modifiers::NONE);
        assert_eq!(doc.level.grid.get(LayerId::Top, 1, 1), Some(EMPTY_TILE));
        assert_eq!(eraser.cursor(&doc, pos), CursorIcon::Crosshair);
    }

    #[test]
    fn test_right_click_picks_tile() {
        let mut doc = document();
        doc.paint_cell(LayerId::Base, TilePos::new(4, 4), 12, false);
        let mut brush = BrushLayer::painter();

        brush.clicked(&mut doc, TilePos::new(4, 4), Modifiers::RIGHT_CLICK);
        assert_eq!(doc.selected_tiles(), vec![12]);
        assert_eq!(doc.history.undo_depth(), 1);

        // Empty cells leave the pool alone
        doc.set_active_layer(LayerId::Top);
        brush.clicked(&mut doc, TilePos::new(4, 4), Modifiers::RIGHT_CLICK);
        assert_eq!(doc.selected_tiles(), vec![12]);
    }

    #[test]
    fn test_empty_pool_entry_never_reaches_base() {
        let mut doc = document();
        doc.set_selected_tiles(vec![EMPTY_TILE]);
        let mut brush = BrushLayer::painter();
        let none = Modifiers::NONE;

        brush.clicked(&mut doc, TilePos::new(0, 0), none);
        brush.drag_start(&mut doc, TilePos::new(1, 0), none);
        brush.drag_end(&mut doc, TilePos::new(1, 3), none);
        for col in 0..4 {
            assert_eq!(doc.level.grid.get(LayerId::Base, 1, col), Some(0));
        }
        assert_eq!(doc.level.grid.get(LayerId::Base, 0, 0), Some(0));
        assert!(!doc.history.can_undo());

        // Upper layers take the sentinel as a regular value
        doc.set_active_layer(LayerId::Top);
        doc.paint_cell(LayerId::Top, TilePos::new(0, 0), 4, false);
        brush.clicked(&mut doc, TilePos::new(0, 0), none);
        assert_eq!(doc.level.grid.get(LayerId::Top, 0, 0), Some(EMPTY_TILE));
    }

    #[test]
    fn test_exit_closes_open_stroke() {
        let mut doc = document();
        doc.set_selected_tiles(vec![2]);
        let mut brush = BrushLayer::painter();
        brush.drag_start(&mut doc, TilePos::new(0, 0), Modifiers::NONE);
        assert!(doc.history.is_grouping());
        brush.exited(&mut doc);
        assert!(!doc.history.is_grouping());
        assert_eq!(doc.history.undo_depth(), 1);
    }
}
