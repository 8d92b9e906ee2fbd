//! Element placement, selection and moving

use mapkit_core::{EditCommand, Element, TilePos};
use uuid::Uuid;

use crate::document::Document;
use crate::pipeline::{CursorIcon, DragTracker, MapLayer, Modifiers};

/// Places and edits interactive elements
///
/// - click on empty ground places the configured kind (a unique kind such as
///   the hero start is moved instead of duplicated)
/// - click on an element selects it, Ctrl+click toggles it in the selection
/// - right-click removes the element under the pointer
/// - dragging moves the selection; the whole drag is one undo entry
#[derive(Debug)]
pub struct ElementLayer {
    drag: DragTracker,
    /// Cell the selection was last moved to during a drag
    anchor: Option<TilePos>,
}

impl Default for ElementLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementLayer {
    pub fn new() -> Self {
        Self {
            drag: DragTracker::new("Move Elements"),
            anchor: None,
        }
    }

    fn place(&self, doc: &mut Document, pos: TilePos) {
        let kind = doc.placement_kind();

        if kind.is_unique() {
            if let Some(existing) = doc.level.find_kind(kind) {
                let id = existing.id;
                let from = existing.position;
                doc.execute(EditCommand::ElementMove {
                    ids: vec![id],
                    dx: pos.col - from.col,
                    dy: pos.row - from.row,
                });
                doc.set_selected_elements(vec![id]);
                return;
            }
        }

        let element = Element::new(kind, pos);
        let id = element.id;
        tracing::debug!("Placing {} at ({}, {})", kind.display_name(), pos.row, pos.col);
        doc.execute(EditCommand::ElementAdd { element });
        doc.set_selected_elements(vec![id]);
    }

    fn remove(&self, doc: &mut Document, pos: TilePos) {
        let Some(element) = doc.level.element_at(pos).cloned() else {
            return;
        };
        let id = element.id;
        let Some(index) = doc.level.element_index(id) else {
            return;
        };
        doc.execute(EditCommand::ElementRemove { element, index });
        let mut selected = doc.selected_elements();
        selected.retain(|s| *s != id);
        doc.set_selected_elements(selected);
    }

    fn toggle(&self, doc: &mut Document, id: Uuid) {
        let mut selected = doc.selected_elements();
        match selected.iter().position(|s| *s == id) {
            Some(index) => {
                selected.remove(index);
            }
            None => selected.push(id),
        }
        doc.set_selected_elements(selected);
    }

    fn finish(&mut self, doc: &mut Document) {
        self.anchor = None;
        self.drag.end(doc);
    }
}

impl MapLayer for ElementLayer {
    fn name(&self) -> &str {
        "Element"
    }

    fn clicked(&mut self, doc: &mut Document, pos: TilePos, mods: Modifiers) {
        if !doc.level.grid.in_bounds(pos.row, pos.col) || mods.middle_click() {
            return;
        }
        if mods.right_click() {
            self.remove(doc, pos);
            return;
        }
        let hit = doc.level.element_at(pos).map(|e| e.id);
        match (hit, mods.control()) {
            (Some(id), true) => self.toggle(doc, id),
            (Some(id), false) => {
                doc.set_selected_elements(vec![id]);
            }
            (None, true) => {}
            (None, false) => self.place(doc, pos),
        }
    }

    fn drag_start(&mut self, doc: &mut Document, pos: TilePos, mods: Modifiers) {
        if mods.right_click() || mods.middle_click() {
            return;
        }
        if let Some(id) = doc.level.element_at(pos).map(|e| e.id) {
            let selected = doc.selected_elements();
            if !selected.contains(&id) {
                if mods.control() {
                    self.toggle(doc, id);
                } else {
                    doc.set_selected_elements(vec![id]);
                }
            }
        } else if !mods.control() {
            // Dragging from empty ground does not move anything
            return;
        }
        if doc.selected_elements().is_empty() {
            return;
        }
        self.drag.begin(doc, pos);
        self.anchor = Some(pos);
    }

    fn drag(&mut self, doc: &mut Document, pos: TilePos, _mods: Modifiers) {
        let Some(anchor) = self.anchor else {
            return;
        };
        let (dx, dy) = (pos.col - anchor.col, pos.row - anchor.row);
        if dx == 0 && dy == 0 {
            return;
        }
        let ids = doc.selected_elements();
        // Elements stay put until the pointer reaches a cell they all fit at
        if !doc.level.can_move_elements(&ids, dx, dy) {
            return;
        }
        doc.execute(EditCommand::ElementMove { ids, dx, dy });
        self.anchor = Some(pos);
    }

    fn drag_end(&mut self, doc: &mut Document, pos: TilePos, mods: Modifiers) {
        if self.anchor.is_none() {
            return;
        }
        self.drag(doc, pos, mods);
        self.finish(doc);
    }

    fn exited(&mut self, doc: &mut Document) {
        self.finish(doc);
    }

    fn cursor(&self, doc: &Document, pos: TilePos) -> CursorIcon {
        if self.anchor.is_some() || doc.level.element_at(pos).is_some() {
            CursorIcon::Move
        } else if doc.level.grid.in_bounds(pos.row, pos.col) {
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
    use mapkit_core::ElementKind;

    const NONE: Modifiers = Modifiers::NONE;

    #[test]
    fn test_click_places_and_selects() {
        let mut doc = document();
        let mut tool = ElementLayer::new();
        tool.clicked(&mut doc, TilePos::new(2, 2), NONE);

        assert_eq!(doc.level.elements.len(), 1);
        let element = &doc.level.elements[0];
        assert_eq!(element.kind, ElementKind::Npc);
        assert_eq!(doc.selected_elements(), vec![element.id]);

        doc.undo();
        assert!(doc.level.elements.is_empty());
        assert!(doc.selected_elements().is_empty());
    }

    #[test]
    fn test_hero_start_is_unique() {
        let mut doc = document();
        doc.set_placement_kind(ElementKind::HeroStart);
        let mut tool = ElementLayer::new();
        tool.clicked(&mut doc, TilePos::new(1, 1), NONE);
        tool.clicked(&mut doc, TilePos::new(6, 3), NONE);

        assert_eq!(doc.level.elements.len(), 1);
        assert_eq!(doc.level.elements[0].position, TilePos::new(6, 3));

        doc.undo();
        assert_eq!(doc.level.elements[0].position, TilePos::new(1, 1));
    }

    #[test]
    fn test_control_click_toggles_selection() {
        let mut doc = document();
        let mut tool = ElementLayer::new();
        tool.clicked(&mut doc, TilePos::new(0, 0), NONE);
        tool.clicked(&mut doc, TilePos::new(0, 1), NONE);
        let a = doc.level.elements[0].id;
        let b = doc.level.elements[1].id;
        assert_eq!(doc.selected_elements(), vec![b]);

        tool.clicked(&mut doc, TilePos::new(0, 0), Modifiers::CONTROL);
        assert_eq!(doc.selected_elements(), vec![b, a]);
        tool.clicked(&mut doc, TilePos::new(0, 1), Modifiers::CONTROL);
        assert_eq!(doc.selected_elements(), vec![a]);

        // Ctrl+click on empty ground places nothing
        tool.clicked(&mut doc, TilePos::new(5, 5), Modifiers::CONTROL);
        assert_eq!(doc.level.elements.len(), 2);
    }

    #[test]
    fn test_right_click_removes() {
        let mut doc = document();
        let mut tool = ElementLayer::new();
        tool.clicked(&mut doc, TilePos::new(3, 3), NONE);
        tool.clicked(&mut doc, TilePos::new(3, 3), Modifiers::RIGHT_CLICK);
        assert!(doc.level.elements.is_empty());
        assert!(doc.selected_elements().is_empty());

        doc.undo();
        assert_eq!(doc.level.elements.len(), 1);
    }

    #[test]
    fn test_drag_moves_selection_as_one_entry() {
        let mut doc = document();
        let mut tool = ElementLayer::new();
        tool.clicked(&mut doc, TilePos::new(1, 1), NONE);
        let depth = doc.history.undo_depth();

        tool.drag_start(&mut doc, TilePos::new(1, 1), NONE);
        assert_eq!(tool.cursor(&doc, TilePos::new(9, 9)), CursorIcon::Move);
        tool.drag(&mut doc, TilePos::new(1, 2), NONE);
        tool.drag(&mut doc, TilePos::new(3, 4), NONE);
        tool.drag_end(&mut doc, TilePos::new(3, 4), NONE);

        assert_eq!(doc.level.elements[0].position, TilePos::new(3, 4));
        assert_eq!(doc.history.undo_depth(), depth + 1);
        assert_eq!(doc.history.peek_undo_label(), Some("Move Elements"));

        doc.undo();
        assert_eq!(doc.level.elements[0].position, TilePos::new(1, 1));
    }

    #[test]
    fn test_drag_stops_at_map_edge() {
        let mut doc = document();
        let mut tool = ElementLayer::new();
        tool.clicked(&mut doc, TilePos::new(0, 8), NONE);

        tool.drag_start(&mut doc, TilePos::new(0, 8), NONE);
        tool.drag(&mut doc, TilePos::new(0, 9), NONE);
        tool.drag(&mut doc, TilePos::new(0, 11), NONE);
        tool.drag_end(&mut doc, TilePos::new(0, 11), NONE);
        assert_eq!(doc.level.elements[0].position, TilePos::new(0, 9));
    }

    #[test]
    fn test_drag_from_empty_ground_moves_nothing() {
        let mut doc = document();
        let mut tool = ElementLayer::new();
        tool.clicked(&mut doc, TilePos::new(0, 0), NONE);
        let depth = doc.history.undo_depth();

        tool.drag_start(&mut doc, TilePos::new(5, 5), NONE);
        tool.drag(&mut doc, TilePos::new(6, 6), NONE);
        tool.drag_end(&mut doc, TilePos::new(6, 6), NONE);
        assert_eq!(doc.level.elements[0].position, TilePos::new(0, 0));
        assert_eq!(doc.history.undo_depth(), depth);
        assert!(!doc.history.is_grouping());
    }

    #[test]
    fn test_cursor_over_elements() {
        let mut doc = document();
        let mut tool = ElementLayer::new();
        tool.clicked(&mut doc, TilePos::new(2, 2), NONE);
        assert_eq!(tool.cursor(&doc, TilePos::new(2, 2)), CursorIcon::Move);
        assert_eq!(tool.cursor(&doc, TilePos::new(2, 3)), CursorIcon::Crosshair);
        assert_eq!(tool.cursor(&doc, TilePos::new(-1, 3)), CursorIcon::Default);
    }
}
