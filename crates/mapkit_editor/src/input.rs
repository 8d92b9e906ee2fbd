//! Pointer input routing
//!
//! The host translates native pointer events into [`PointerEvent`]s with
//! raw view pixels and modifier bits. The router converts pixels to tiles,
//! recognizes clicks and drags, and broadcasts the result through the
//! [`LayerPipeline`].

use mapkit_core::TilePos;

use crate::document::Document;
use crate::pipeline::{CursorIcon, LayerPipeline, Modifiers};

/// A pointer event in view pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Pressed { x: i32, y: i32, mods: Modifiers },
    Moved { x: i32, y: i32, mods: Modifiers },
    Released { x: i32, y: i32, mods: Modifiers },
    Exited,
}

/// Map a pixel to the tile containing it
///
/// Negative pixels map to negative tiles so a pointer left of or above the
/// map never lands on row or column 0.
pub fn pixel_to_tile(x: i32, y: i32, tile_size: (u32, u32)) -> TilePos {
    let (tw, th) = tile_size;
    TilePos::new(y.div_euclid(th as i32), x.div_euclid(tw as i32))
}

#[derive(Debug, Clone, Copy)]
struct Press {
    origin: TilePos,
    mods: Modifiers,
}

/// Click/drag recognizer feeding the layer pipeline
///
/// A drag starts when the pointer leaves the cell it was pressed on while
/// the button is held; `drag_start` is reported at the press cell, followed
/// by `drag` at the current cell. Releasing on the press cell without a
/// drag is a click; releasing elsewhere completes a drag.
#[derive(Debug, Default)]
pub struct InputRouter {
    press: Option<Press>,
    dragging: bool,
    last_tile: Option<TilePos>,
    cursor: CursorIcon,
}

impl InputRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Cursor resolved after the last event
    pub fn cursor(&self) -> CursorIcon {
        self.cursor
    }

    /// Last tile the pointer was seen over
    pub fn last_tile(&self) -> Option<TilePos> {
        self.last_tile
    }

    /// Route one event and return the cursor the host should show
    pub fn handle(
        &mut self,
        doc: &mut Document,
        pipeline: &mut LayerPipeline,
        event: PointerEvent,
    ) -> CursorIcon {
        let (x, y, mods) = match event {
            PointerEvent::Exited => {
                self.exit(doc, pipeline);
                return self.cursor;
            }
            PointerEvent::Pressed { x, y, mods }
            | PointerEvent::Moved { x, y, mods }
            | PointerEvent::Released { x, y, mods } => (x, y, mods),
        };

        let Some(tile_size) = doc.tile_size() else {
            // No tileset, no coordinate mapping. A drag in progress still
            // gets its end so the history group is closed.
            if matches!(event, PointerEvent::Released { .. }) {
                self.finish_drag(doc, pipeline, mods);
                self.press = None;
            }
            return self.cursor;
        };
        let pos = pixel_to_tile(x, y, tile_size);
        tracing::trace!("{:?} at tile ({}, {})", event, pos.row, pos.col);

        match event {
            PointerEvent::Pressed { .. } => {
                if self.dragging {
                    // Missed release; close the old drag first
                    self.finish_drag(doc, pipeline, mods);
                }
                self.press = Some(Press { origin: pos, mods });
            }
            PointerEvent::Moved { .. } => self.pointer_moved(doc, pipeline, pos, mods),
            PointerEvent::Released { .. } => {
                if let Some(press) = self.press.filter(|p| !self.dragging && p.origin != pos) {
                    // No move was seen between press and release
                    self.dragging = true;
                    let mods = press.mods | mods;
                    pipeline.drag_start(doc, press.origin, mods);
                    pipeline.drag(doc, pos, mods);
                }
                if self.dragging {
                    let mods = self.press.map_or(mods, |p| p.mods | mods);
                    self.dragging = false;
                    pipeline.drag_end(doc, pos, mods);
                } else if let Some(press) = self.press {
                    pipeline.clicked(doc, pos, press.mods | mods);
                }
                self.press = None;
            }
            PointerEvent::Exited => {}
        }

        self.last_tile = Some(pos);
        pipeline.flush_dirty(doc);
        self.cursor = pipeline.resolve_cursor(doc, pos);
        self.cursor
    }

    fn pointer_moved(
        &mut self,
        doc: &mut Document,
        pipeline: &mut LayerPipeline,
        pos: TilePos,
        mods: Modifiers,
    ) {
        let changed = self.last_tile != Some(pos);
        match self.press {
            Some(press) if !self.dragging => {
                if pos != press.origin {
                    self.dragging = true;
                    let mods = press.mods | mods;
                    pipeline.drag_start(doc, press.origin, mods);
                    pipeline.drag(doc, pos, mods);
                }
            }
            Some(press) => {
                if changed {
                    pipeline.drag(doc, pos, press.mods | mods);
                }
            }
            None => {
                if changed {
                    pipeline.moved(doc, pos, mods);
                }
            }
        }
    }

    fn finish_drag(&mut self, doc: &mut Document, pipeline: &mut LayerPipeline, mods: Modifiers) {
        if !self.dragging {
            return;
        }
        self.dragging = false;
        let mods = self.press.map_or(mods, |p| p.mods | mods);
        let pos = self
            .last_tile
            .or(self.press.map(|p| p.origin))
            .unwrap_or_default();
        pipeline.drag_end(doc, pos, mods);
        pipeline.flush_dirty(doc);
    }

    fn exit(&mut self, doc: &mut Document, pipeline: &mut LayerPipeline) {
        self.finish_drag(doc, pipeline, Modifiers::NONE);
        self.press = None;
        self.last_tile = None;
        pipeline.exited(doc);
        pipeline.flush_dirty(doc);
        self.cursor = CursorIcon::Default;
    }
}
