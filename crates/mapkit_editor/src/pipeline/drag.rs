//! Reusable drag bookkeeping for editing layers

use mapkit_core::TilePos;

use crate::document::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging { origin: TilePos, last: TilePos },
}

/// Idle/Dragging state machine that brackets a drag in one history group
///
/// Layers hold one of these and call [`DragTracker::begin`],
/// [`DragTracker::step`] and [`DragTracker::end`] from their drag callbacks.
/// Everything pushed to the history in between becomes one composite entry.
#[derive(Debug, Clone)]
pub struct DragTracker {
    label: String,
    state: DragState,
}

impl DragTracker {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            state: DragState::Idle,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn origin(&self) -> Option<TilePos> {
        match self.state {
            DragState::Dragging { origin, .. } => Some(origin),
            DragState::Idle => None,
        }
    }

    /// Enter Dragging and open a history group
    pub fn begin(&mut self, doc: &mut Document, pos: TilePos) {
        if self.is_dragging() {
            // A drag that never saw its end; close it before starting over
            self.end(doc);
        }
        doc.history.begin_group(self.label.clone());
        self.state = DragState::Dragging {
            origin: pos,
            last: pos,
        };
    }

    /// Advance to `pos`, returning the previous and new cells
    ///
    /// Returns `None` when idle or when the pointer stayed on the same cell.
    pub fn step(&mut self, pos: TilePos) -> Option<(TilePos, TilePos)> {
        match &mut self.state {
            DragState::Dragging { last, .. } if *last != pos => {
                let previous = std::mem::replace(last, pos);
                Some((previous, pos))
            }
            _ => None,
        }
    }

    /// Return to Idle, committing the group and publishing batched writes
    ///
    /// Returns the drag origin, or `None` if no drag was active.
    pub fn end(&mut self, doc: &mut Document) -> Option<TilePos> {
        let DragState::Dragging { origin, .. } = std::mem::take(&mut self.state) else {
            return None;
        };
        doc.history.end_group();
        doc.flush_grid();
        Some(origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::tests::document;
    use mapkit_core::LayerId;

    #[test]
    fn test_drag_groups_history() {
        let mut doc = document();
        let mut tracker = DragTracker::new("Paint");
        assert!(!tracker.is_dragging());

        tracker.begin(&mut doc, TilePos::new(0, 0));
        assert!(doc.history.is_grouping());
        doc.paint_cell(LayerId::Top, TilePos::new(0, 0), 1, true);

        assert_eq!(tracker.step(TilePos::new(0, 0)), None);
        assert_eq!(
            tracker.step(TilePos::new(0, 1)),
            Some((TilePos::new(0, 0), TilePos::new(0, 1)))
        );
        doc.paint_cell(LayerId::Top, TilePos::new(0, 1), 1, true);
        assert!(doc.take_dirty_regions().is_empty());

        assert_eq!(tracker.end(&mut doc), Some(TilePos::new(0, 0)));
        assert!(!tracker.is_dragging());
        assert!(!doc.history.is_grouping());
        assert_eq!(doc.history.undo_depth(), 1);
        assert_eq!(doc.history.peek_undo_label(), Some("Paint"));
        assert_eq!(
            doc.take_dirty_regions(),
            vec![mapkit_core::DirtyRect::new(0, 0, 2, 1)]
        );
    }

    #[test]
    fn test_end_when_idle_is_noop() {
        let mut doc = document();
        let mut tracker = DragTracker::new("Move");
        assert_eq!(tracker.end(&mut doc), None);
        assert_eq!(tracker.step(TilePos::new(1, 1)), None);
        assert!(!doc.history.can_undo());
    }

    #[test]
    fn test_begin_twice_closes_previous_group() {
        let mut doc = document();
        let mut tracker = DragTracker::new("Paint");
        tracker.begin(&mut doc, TilePos::new(0, 0));
        doc.paint_cell(LayerId::Top, TilePos::new(0, 0), 1, true);
        tracker.begin(&mut doc, TilePos::new(5, 5));
        doc.paint_cell(LayerId::Top, TilePos::new(5, 5), 1, true);
        tracker.end(&mut doc);
        assert_eq!(doc.history.undo_depth(), 2);
    }
}
