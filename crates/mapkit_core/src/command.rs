//! Reversible edit commands
//!
//! Every mutation of a [`Level`] is described by an [`EditCommand`] value.
//! Commands are created after the change was already applied (the grid's
//! `set` returns one), then recorded in the [`crate::CommandHistory`], which
//! calls [`EditCommand::revert`] and [`EditCommand::apply`] on undo/redo.

use crate::{Element, LayerId, Level, TileIndex};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A reversible unit of change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditCommand {
    /// One cell changed from `old` to `new`
    CellEdit {
        layer: LayerId,
        row: i32,
        col: i32,
        old: TileIndex,
        new: TileIndex,
    },
    /// Ordered sub-commands applied and reverted as one unit
    Composite {
        label: String,
        commands: Vec<EditCommand>,
    },
    /// Logical map bounds changed
    Resize { old: (u32, u32), new: (u32, u32) },
    /// An element was placed
    ElementAdd { element: Element },
    /// An element was deleted from position `index` of the element list
    ElementRemove { element: Element, index: usize },
    /// Elements were shifted by a tile offset
    ElementMove { ids: Vec<Uuid>, dx: i32, dy: i32 },
}

impl EditCommand {
    pub fn composite(label: impl Into<String>, commands: Vec<EditCommand>) -> Self {
        EditCommand::Composite {
            label: label.into(),
            commands,
        }
    }

    /// Human-readable description for undo/redo menus
    pub fn label(&self) -> &str {
        match self {
            EditCommand::CellEdit { .. } => "Paint Tile",
            EditCommand::Composite { label, .. } => label.as_str(),
            EditCommand::Resize { .. } => "Resize Map",
            EditCommand::ElementAdd { .. } => "Add Element",
            EditCommand::ElementRemove { .. } => "Remove Element",
            EditCommand::ElementMove { .. } => "Move Elements",
        }
    }

    /// Number of leaf commands (a composite counts its children)
    pub fn leaf_count(&self) -> usize {
        match self {
            EditCommand::Composite { commands, .. } => {
                commands.iter().map(EditCommand::leaf_count).sum()
            }
            _ => 1,
        }
    }

    /// Re-apply the change (redo)
    ///
    /// Grid writes are only marked dirty; the caller flushes once afterwards.
    pub fn apply(&self, level: &mut Level) {
        match self {
            EditCommand::CellEdit {
                layer,
                row,
                col,
                new,
                ..
            } => write_cell(level, *layer, *row, *col, *new),
            EditCommand::Composite { commands, .. } => {
                for command in commands {
                    command.apply(level);
                }
            }
            EditCommand::Resize { new, .. } => level.grid.set_bounds(new.0, new.1),
            EditCommand::ElementAdd { element } => level.add_element(element.clone()),
            EditCommand::ElementRemove { element, .. } => {
                level.remove_element(element.id);
            }
            EditCommand::ElementMove { ids, dx, dy } => level.move_elements(ids, *dx, *dy),
        }
    }

    /// Undo the change
    pub fn revert(&self, level: &mut Level) {
        match self {
            EditCommand::CellEdit {
                layer,
                row,
                col,
                old,
                ..
            } => write_cell(level, *layer, *row, *col, *old),
            EditCommand::Composite { commands, .. } => {
                for command in commands.iter().rev() {
                    command.revert(level);
                }
            }
            EditCommand::Resize { old, .. } => level.grid.set_bounds(old.0, old.1),
            EditCommand::ElementAdd { element } => {
                level.remove_element(element.id);
            }
            EditCommand::ElementRemove { element, index } => {
                level.insert_element(*index, element.clone())
            }
            EditCommand::ElementMove { ids, dx, dy } => level.move_elements(ids, -dx, -dy),
        }
    }
}

fn write_cell(level: &mut Level, layer: LayerId, row: i32, col: i32, value: TileIndex) {
    if level.grid.write(layer, row, col, value).is_some() {
        level.grid.mark_dirty(crate::DirtyRect::cell(row, col));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ElementKind, TilePos, EMPTY_TILE};

    fn level() -> Level {
        Level::new("Test".to_string(), 3, 3).unwrap()
    }

    #[test]
    fn test_cell_edit_round_trip() {
        let mut level = level();
        let cmd = level.grid.set(LayerId::Top, 0, 1, 4, false).unwrap();

        cmd.revert(&mut level);
        assert_eq!(level.grid.get(LayerId::Top, 0, 1), Some(EMPTY_TILE));
        cmd.apply(&mut level);
        assert_eq!(level.grid.get(LayerId::Top, 0, 1), Some(4));
    }

    #[test]
    fn test_composite_reverts_in_reverse_order() {
        let mut level = level();
        // Two writes to the same cell: reverse order matters
        let first = level.grid.set(LayerId::Base, 0, 0, 1, true).unwrap();
        let second = level.grid.set(LayerId::Base, 0, 0, 2, true).unwrap();
        let cmd = EditCommand::composite("Stroke", vec![first, second]);
        assert_eq!(cmd.label(), "Stroke");
        assert_eq!(cmd.leaf_count(), 2);

        cmd.revert(&mut level);
        assert_eq!(level.grid.get(LayerId::Base, 0, 0), Some(0));
        cmd.apply(&mut level);
        assert_eq!(level.grid.get(LayerId::Base, 0, 0), Some(2));
    }

    #[test]
    fn test_commands_mark_dirty_without_flushing() {
        let mut level = level();
        let cmd = level.grid.set(LayerId::Base, 2, 2, 5, false).unwrap();
        assert!(level.grid.pending_dirty().is_none());

        cmd.revert(&mut level);
        assert_eq!(
            level.grid.pending_dirty(),
            Some(crate::DirtyRect::cell(2, 2))
        );
    }

    #[test]
    fn test_element_commands() {
        let mut level = level();
        let element = Element::new(ElementKind::Npc, TilePos::new(1, 1));
        let id = element.id;

        let add = EditCommand::ElementAdd {
            element: element.clone(),
        };
        add.apply(&mut level);
        assert!(level.get_element(id).is_some());

        let movement = EditCommand::ElementMove {
            ids: vec![id],
            dx: 1,
            dy: -1,
        };
        movement.apply(&mut level);
        assert_eq!(level.get_element(id).unwrap().position, TilePos::new(0, 2));
        movement.revert(&mut level);
        assert_eq!(level.get_element(id).unwrap().position, TilePos::new(1, 1));

        add.revert(&mut level);
        assert!(level.get_element(id).is_none());

        let remove = EditCommand::ElementRemove { element, index: 0 };
        remove.revert(&mut level);
        assert!(level.get_element(id).is_some());
    }

    #[test]
    fn test_undo_remove_restores_stacking_order() {
        let mut level = level();
        let bottom = Element::new(ElementKind::Npc, TilePos::new(1, 1));
        let top = Element::new(ElementKind::Trigger, TilePos::new(1, 1));
        let bottom_id = bottom.id;
        level.add_element(bottom.clone());
        level.add_element(top.clone());
        assert_eq!(level.element_at(TilePos::new(1, 1)).unwrap().id, top.id);

        let index = level.element_index(bottom_id).unwrap();
        let remove = EditCommand::ElementRemove {
            element: bottom,
            index,
        };
        remove.apply(&mut level);
        assert_eq!(level.elements.len(), 1);

        remove.revert(&mut level);
        assert_eq!(level.elements[0].id, bottom_id);
        assert_eq!(level.element_at(TilePos::new(1, 1)).unwrap().id, top.id);
    }

    #[test]
    fn test_element_commands_mark_cells_dirty() {
        let mut level = level();
        let element = Element::new(ElementKind::Npc, TilePos::new(0, 0));
        let id = element.id;
        EditCommand::ElementAdd { element }.apply(&mut level);
        assert_eq!(level.grid.flush_dirty(), Some(crate::DirtyRect::cell(0, 0)));

        EditCommand::ElementMove {
            ids: vec![id],
            dx: 2,
            dy: 1,
        }
        .apply(&mut level);
        assert_eq!(
            level.grid.flush_dirty(),
            Some(crate::DirtyRect::new(0, 0, 3, 2))
        );
    }

    #[test]
    fn test_resize_command() {
        let mut level = level();
        let cmd = level.grid.resize(2, 2).unwrap().unwrap();
        cmd.revert(&mut level);
        assert_eq!(level.grid.size(), (3, 3));
        cmd.apply(&mut level);
        assert_eq!(level.grid.size(), (2, 2));
    }

    #[test]
    fn test_commands_serialize() {
        let cmd = EditCommand::composite(
            "Fill",
            vec![EditCommand::CellEdit {
                layer: LayerId::Middle,
                row: 1,
                col: 2,
                old: EMPTY_TILE,
                new: 3,
            }],
        );
        let json = serde_json::to_string(&cmd).unwrap();
        let back: EditCommand = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cmd);
    }
}
