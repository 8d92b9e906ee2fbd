//! Keyboard shortcut mapping

use mapkit_core::LayerId;

use super::EditorAction;
use crate::tools::EditorTool;

/// Map a key press to an action
///
/// `key` is the character on the key, case-insensitive. Bindings:
/// - Ctrl+Z undo, Ctrl+Shift+Z or Ctrl+Y redo
/// - `1`-`4` select Paint, Erase, Fill, Element
/// - Shift+`1`-`3` select the Base, Middle, Top layer
/// - `G` toggles the grid, `L` cycles the active layer
pub fn shortcut_action(key: char, ctrl: bool, shift: bool) -> Option<EditorAction> {
    let key = key.to_ascii_lowercase();

    if ctrl {
        return match key {
            // Ctrl+Z - Undo, Ctrl+Shift+Z - Redo
            'z' if shift => Some(EditorAction::Redo),
            'z' => Some(EditorAction::Undo),
            // Ctrl+Y - Redo
            'y' => Some(EditorAction::Redo),
            _ => None,
        };
    }

    match key {
        'g' => Some(EditorAction::ToggleGrid),
        'l' => Some(EditorAction::CycleLayer),
        '1'..='9' => {
            let n = key.to_digit(10)?;
            if shift {
                LayerId::from_index(n as usize - 1).map(EditorAction::SelectLayer)
            } else {
                EditorTool::from_number(n).map(EditorAction::SelectTool)
            }
        }
        _ => None,
    }
}
