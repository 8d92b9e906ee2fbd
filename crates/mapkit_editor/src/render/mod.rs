//! Map rendering layers
//!
//! The editor never talks to a graphics API. Layers draw through the
//! [`Canvas`] trait, which the host implements on top of whatever it renders
//! with; pixel rectangles are derived from the tileset's tile size.

mod overlay;
mod tiles;

pub use overlay::*;
pub use tiles::*;

use mapkit_core::{DirtyRect, ElementKind, TileIndex, TilePos};

/// A rectangle in view pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Pixel bounds of one tile
    pub fn for_tile(pos: TilePos, tile_size: (u32, u32)) -> Self {
        let (tw, th) = tile_size;
        Self::new(pos.col * tw as i32, pos.row * th as i32, tw, th)
    }

    /// Pixel bounds of a tile-space region
    pub fn for_region(rect: DirtyRect, tile_size: (u32, u32)) -> Self {
        let (tw, th) = tile_size;
        Self::new(
            rect.x * tw as i32,
            rect.y * th as i32,
            rect.width * tw,
            rect.height * th,
        )
    }
}

/// Drawing surface supplied by the host
///
/// The surface keeps its contents between paints; only damaged regions are
/// cleared and redrawn.
pub trait Canvas {
    /// Erase a region before it is redrawn
    fn clear(&mut self, rect: PixelRect);

    /// Blit one tile from the active tileset
    fn draw_tile(&mut self, rect: PixelRect, tile: TileIndex);

    fn draw_line(&mut self, from: (i32, i32), to: (i32, i32));

    /// Translucent highlight over a cell, used for hover feedback
    fn draw_highlight(&mut self, rect: PixelRect);

    fn draw_marker(&mut self, rect: PixelRect, kind: ElementKind, selected: bool);
}

/// Canvas that records draw calls, for hosts that batch or for tests
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordingCanvas {
    pub commands: Vec<DrawCommand>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawCommand {
    Clear(PixelRect),
    Tile(PixelRect, TileIndex),
    Line((i32, i32), (i32, i32)),
    Highlight(PixelRect),
    Marker(PixelRect, ElementKind, bool),
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn tiles(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Tile(..)))
            .count()
    }

    pub fn highlights(&self) -> Vec<PixelRect> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Highlight(rect) => Some(*rect),
                _ => None,
            })
            .collect()
    }

    pub fn lines(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line(..)))
            .count()
    }
}

impl Canvas for RecordingCanvas {
    fn clear(&mut self, rect: PixelRect) {
        self.commands.push(DrawCommand::Clear(rect));
    }

    fn draw_tile(&mut self, rect: PixelRect, tile: TileIndex) {
        self.commands.push(DrawCommand::Tile(rect, tile));
    }

    fn draw_line(&mut self, from: (i32, i32), to: (i32, i32)) {
        self.commands.push(DrawCommand::Line(from, to));
    }

    fn draw_highlight(&mut self, rect: PixelRect) {
        self.commands.push(DrawCommand::Highlight(rect));
    }

    fn draw_marker(&mut self, rect: PixelRect, kind: ElementKind, selected: bool) {
        self.commands.push(DrawCommand::Marker(rect, kind, selected));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_rects() {
        assert_eq!(
            PixelRect::for_tile(TilePos::new(2, 3), (16, 8)),
            PixelRect::new(48, 16, 16, 8)
        );
        assert_eq!(
            PixelRect::for_region(DirtyRect::new(1, 2, 3, 4), (10, 10)),
            PixelRect::new(10, 20, 30, 40)
        );
    }
}
