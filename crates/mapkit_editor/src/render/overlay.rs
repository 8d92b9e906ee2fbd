//! Overlay band: grid lines, element markers and hover feedback

use mapkit_core::{DirtyRect, TilePos};

use super::{Canvas, PixelRect};
use crate::document::Document;
use crate::pipeline::{MapLayer, Modifiers};

/// Grid lines over the map, toggled by the `ShowGrid` key
#[derive(Debug, Default)]
pub struct GridLinesLayer;

impl GridLinesLayer {
    pub fn new() -> Self {
        Self
    }
}

impl MapLayer for GridLinesLayer {
    fn name(&self) -> &str {
        "Grid"
    }

    fn paint(&mut self, doc: &Document, canvas: &mut dyn Canvas, region: DirtyRect) {
        if !doc.show_grid() {
            return;
        }
        let Some((tw, th)) = doc.tile_size() else {
            return;
        };
        let (tw, th) = (tw as i32, th as i32);
        let (left, right) = (region.x * tw, region.right() * tw);
        let (top, bottom) = (region.y * th, region.bottom() * th);

        // Edges of the region are redrawn too since clearing may have cut them
        for col in region.x..=region.right() {
            let x = col * tw;
            canvas.draw_line((x, top), (x, bottom));
        }
        for row in region.y..=region.bottom() {
            let y = row * th;
            canvas.draw_line((left, y), (right, y));
        }
    }
}

/// Draws a marker for every interactive element
#[derive(Debug, Default)]
pub struct ElementMarkerLayer;

impl ElementMarkerLayer {
    pub fn new() -> Self {
        Self
    }
}

impl MapLayer for ElementMarkerLayer {
    fn name(&self) -> &str {
        "Elements"
    }

    fn paint(&mut self, doc: &Document, canvas: &mut dyn Canvas, region: DirtyRect) {
        let Some(tile_size) = doc.tile_size() else {
            return;
        };
        let selected = doc.selected_elements();
        for element in &doc.level.elements {
            let pos = element.position;
            if !region.contains(pos.row, pos.col) {
                continue;
            }
            canvas.draw_marker(
                PixelRect::for_tile(pos, tile_size),
                element.kind,
                selected.contains(&element.id),
            );
        }
    }
}

/// Highlights the cell under the pointer and publishes it as `HoveredTile`
#[derive(Debug, Default)]
pub struct HoverLayer;

impl HoverLayer {
    pub fn new() -> Self {
        Self
    }
}

impl MapLayer for HoverLayer {
    fn name(&self) -> &str {
        "Hover"
    }

    fn paint(&mut self, doc: &Document, canvas: &mut dyn Canvas, region: DirtyRect) {
        let Some(tile_size) = doc.tile_size() else {
            return;
        };
        if let Some(pos) = doc.hovered_tile() {
            if region.contains(pos.row, pos.col) {
                canvas.draw_highlight(PixelRect::for_tile(pos, tile_size));
            }
        }
    }

    fn moved(&mut self, doc: &mut Document, pos: TilePos, _mods: Modifiers) {
        let hovered = doc.level.grid.in_bounds(pos.row, pos.col).then_some(pos);
        doc.set_hovered_tile(hovered);
    }

    fn drag(&mut self, doc: &mut Document, pos: TilePos, mods: Modifiers) {
        self.moved(doc, pos, mods);
    }

    fn exited(&mut self, doc: &mut Document) {
        doc.set_hovered_tile(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::tests::document;
    use crate::render::{DrawCommand, RecordingCanvas};
    use mapkit_core::{Element, ElementKind};

    #[test]
    fn test_grid_lines_follow_show_grid() {
        let doc = document();
        let mut layer = GridLinesLayer::new();
        let mut canvas = RecordingCanvas::new();
        layer.paint(&doc, &mut canvas, doc.level.grid.extent());
        // 10x10 map: 11 vertical and 11 horizontal lines
        assert_eq!(canvas.lines(), 22);

        doc.set_show_grid(false);
        let mut hidden = RecordingCanvas::new();
        layer.paint(&doc, &mut hidden, doc.level.grid.extent());
        assert_eq!(hidden.lines(), 0);
    }

    #[test]
    fn test_grid_lines_stay_inside_region() {
        let doc = document();
        let mut canvas = RecordingCanvas::new();
        GridLinesLayer::new().paint(&doc, &mut canvas, DirtyRect::cell(1, 2));
        assert_eq!(
            canvas.commands,
            vec![
                DrawCommand::Line((32, 16), (32, 32)),
                DrawCommand::Line((48, 16), (48, 32)),
                DrawCommand::Line((32, 16), (48, 16)),
                DrawCommand::Line((32, 32), (48, 32)),
            ]
        );
    }

    #[test]
    fn test_markers_show_selection() {
        let mut doc = document();
        let npc = Element::new(ElementKind::Npc, TilePos::new(1, 1));
        let start = Element::new(ElementKind::HeroStart, TilePos::new(0, 2));
        doc.set_selected_elements(vec![start.id]);
        doc.level.add_element(npc);
        doc.level.add_element(start);

        let mut canvas = RecordingCanvas::new();
        ElementMarkerLayer::new().paint(&doc, &mut canvas, doc.level.grid.extent());
        assert_eq!(
            canvas.commands,
            vec![
                DrawCommand::Marker(PixelRect::new(16, 16, 16, 16), ElementKind::Npc, false),
                DrawCommand::Marker(PixelRect::new(32, 0, 16, 16), ElementKind::HeroStart, true),
            ]
        );

        // Only markers inside the region are redrawn
        let mut partial = RecordingCanvas::new();
        ElementMarkerLayer::new().paint(&doc, &mut partial, DirtyRect::cell(0, 2));
        assert_eq!(
            partial.commands,
            vec![DrawCommand::Marker(
                PixelRect::new(32, 0, 16, 16),
                ElementKind::HeroStart,
                true
            )]
        );
    }

    #[test]
    fn test_hover_publishes_and_clears() {
        let mut doc = document();
        let mut layer = HoverLayer::new();
        layer.moved(&mut doc, TilePos::new(4, 5), Modifiers::NONE);
        assert_eq!(doc.hovered_tile(), Some(TilePos::new(4, 5)));

        let mut canvas = RecordingCanvas::new();
        layer.paint(&doc, &mut canvas, doc.level.grid.extent());
        assert_eq!(canvas.highlights(), vec![PixelRect::new(80, 64, 16, 16)]);

        let mut elsewhere = RecordingCanvas::new();
        layer.paint(&doc, &mut elsewhere, DirtyRect::cell(0, 0));
        assert!(elsewhere.commands.is_empty());

        layer.moved(&mut doc, TilePos::new(-1, 5), Modifiers::NONE);
        assert_eq!(doc.hovered_tile(), None);

        layer.moved(&mut doc, TilePos::new(4, 5), Modifiers::NONE);
        layer.exited(&mut doc);
        assert_eq!(doc.hovered_tile(), None);
    }
}
