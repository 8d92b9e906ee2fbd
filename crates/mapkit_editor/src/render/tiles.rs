//! Display band: one layer per map layer

use mapkit_core::{is_empty_tile, DirtyRect, LayerId, TilePos};

use super::{Canvas, PixelRect};
use crate::document::Document;
use crate::pipeline::MapLayer;

/// Draws the tiles of one grid layer
///
/// Empty cells are skipped, as is the whole layer while it is hidden.
#[derive(Debug)]
pub struct TileDisplayLayer {
    layer: LayerId,
    name: String,
}

impl TileDisplayLayer {
    pub fn new(layer: LayerId) -> Self {
        Self {
            layer,
            name: format!("{} tiles", layer.display_name()),
        }
    }

    pub fn layer(&self) -> LayerId {
        self.layer
    }
}

impl MapLayer for TileDisplayLayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn paint(&mut self, doc: &Document, canvas: &mut dyn Canvas, region: DirtyRect) {
        if !doc.layer_visible(self.layer) {
            return;
        }
        let Some(tile_size) = doc.tile_size() else {
            return;
        };
        let grid = &doc.level.grid;
        for row in region.y..region.bottom() {
            for col in region.x..region.right() {
                let Some(tile) = grid.get(self.layer, row, col) else {
                    continue;
                };
                if is_empty_tile(tile) {
                    continue;
                }
                canvas.draw_tile(PixelRect::for_tile(TilePos::new(row, col), tile_size), tile);
            }
        }
    }
}
