//! Layer pipeline
//!
//! Layers live in three fixed bands that are always walked in the same
//! order: display, overlay, then editor. Every pointer event is broadcast to
//! every layer; nothing is consumed. Layers that don't care about an event
//! simply leave the default trait method in place.

mod drag;
mod selection;

pub use drag::*;
pub use selection::*;

use mapkit_core::{DirtyRect, TilePos};

use crate::document::Document;
use crate::render::{Canvas, PixelRect};

/// Z-order group a layer belongs to, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Band {
    Display,
    Overlay,
    Editor,
}

impl Band {
    pub const ALL: [Band; 3] = [Band::Display, Band::Overlay, Band::Editor];

    fn index(self) -> usize {
        match self {
            Band::Display => 0,
            Band::Overlay => 1,
            Band::Editor => 2,
        }
    }
}

/// Pointer shape requested by a layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CursorIcon {
    #[default]
    Default,
    Crosshair,
    Move,
    Pointer,
    NotAllowed,
}

/// Modifier bits supplied by the host with every pointer event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const CONTROL: Modifiers = Modifiers(1 << 0);
    pub const ALT: Modifiers = Modifiers(1 << 1);
    pub const RIGHT_CLICK: Modifiers = Modifiers(1 << 2);
    pub const MIDDLE_CLICK: Modifiers = Modifiers(1 << 3);
    pub const DOUBLE_CLICK: Modifiers = Modifiers(1 << 4);

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn from_bits(bits: u8) -> Self {
        Modifiers(bits & 0b1_1111)
    }

    pub const fn contains(self, other: Modifiers) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn union(self, other: Modifiers) -> Modifiers {
        Modifiers(self.0 | other.0)
    }

    pub fn control(self) -> bool {
        self.contains(Self::CONTROL)
    }

    pub fn alt(self) -> bool {
        self.contains(Self::ALT)
    }

    pub fn right_click(self) -> bool {
        self.contains(Self::RIGHT_CLICK)
    }

    pub fn middle_click(self) -> bool {
        self.contains(Self::MIDDLE_CLICK)
    }

    pub fn double_click(self) -> bool {
        self.contains(Self::DOUBLE_CLICK)
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Modifiers) -> Modifiers {
        self.union(rhs)
    }
}

/// A paintable, interactive layer of the map view
///
/// All methods have empty defaults so a layer only implements what it uses.
/// Positions are tile coordinates and may lie outside the map.
pub trait MapLayer {
    fn name(&self) -> &str;

    /// Redraw the part of the layer inside `region`
    ///
    /// The region lies within the map and was cleared just before the call.
    fn paint(&mut self, _doc: &Document, _canvas: &mut dyn Canvas, _region: DirtyRect) {}

    /// Region of the map changed and will be repainted
    fn update_region(&mut self, _doc: &Document, _rect: DirtyRect) {}

    fn moved(&mut self, _doc: &mut Document, _pos: TilePos, _mods: Modifiers) {}

    fn clicked(&mut self, _doc: &mut Document, _pos: TilePos, _mods: Modifiers) {}

    fn drag_start(&mut self, _doc: &mut Document, _pos: TilePos, _mods: Modifiers) {}

    fn drag(&mut self, _doc: &mut Document, _pos: TilePos, _mods: Modifiers) {}

    fn drag_end(&mut self, _doc: &mut Document, _pos: TilePos, _mods: Modifiers) {}

    /// Pointer left the view
    fn exited(&mut self, _doc: &mut Document) {}

    /// Cursor this layer wants at `pos`
    fn cursor(&self, _doc: &Document, _pos: TilePos) -> CursorIcon {
        CursorIcon::Default
    }
}

/// Ordered set of layers in three bands
///
/// The host canvas is persistent. The pipeline collects the regions damaged
/// since the last paint and redraws only those.
#[derive(Default)]
pub struct LayerPipeline {
    bands: [Vec<Box<dyn MapLayer>>; 3],
    damage: Option<DirtyRect>,
    painted_size: Option<(u32, u32)>,
}

impl LayerPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a layer to the top of its band
    pub fn add(&mut self, band: Band, layer: impl MapLayer + 'static) {
        self.add_boxed(band, Box::new(layer));
    }

    pub fn add_boxed(&mut self, band: Band, layer: Box<dyn MapLayer>) {
        tracing::debug!("Adding layer '{}' to {:?} band", layer.name(), band);
        self.bands[band.index()].push(layer);
    }

    pub fn len(&self) -> usize {
        self.bands.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Layer names in dispatch order
    pub fn layer_names(&self) -> Vec<&str> {
        self.layers().map(|l| l.name()).collect()
    }

    fn layers(&self) -> impl Iterator<Item = &Box<dyn MapLayer>> {
        self.bands.iter().flatten()
    }

    fn layers_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn MapLayer>> {
        self.bands.iter_mut().flatten()
    }

    /// Repaint the damaged region, every layer bottom to top
    ///
    /// The region is cleared on the canvas first. The first paint and the
    /// first paint after a resize cover the whole map, including cells a
    /// shrink left behind. Nothing is drawn until a tileset is loaded;
    /// damage keeps accumulating meanwhile.
    pub fn paint(&mut self, doc: &Document, canvas: &mut dyn Canvas) {
        self.absorb(doc);
        let Some(tile_size) = doc.tile_size() else {
            return;
        };
        let (width, height) = doc.level.grid.size();
        let mut bounds = (width, height);
        if self.painted_size != Some((width, height)) {
            let (old_width, old_height) = self.painted_size.unwrap_or((0, 0));
            bounds = (width.max(old_width), height.max(old_height));
            self.add_damage(DirtyRect::new(0, 0, bounds.0, bounds.1));
            self.painted_size = Some((width, height));
        }
        let Some(damage) = self.damage.take() else {
            return;
        };

        let cleared = damage.clip(bounds.0, bounds.1);
        if cleared.is_empty() {
            return;
        }
        canvas.clear(PixelRect::for_region(cleared, tile_size));
        let region = cleared.clip(width, height);
        if region.is_empty() {
            return;
        }
        tracing::trace!("Repainting {:?}", region);
        for layer in self.layers_mut() {
            layer.paint(doc, canvas, region);
        }
    }

    /// Forget what the canvas shows; the next paint covers the whole map
    pub fn invalidate(&mut self) {
        self.painted_size = None;
    }

    /// Publish pending grid changes to every layer
    pub fn flush_dirty(&mut self, doc: &mut Document) {
        doc.flush_grid();
        self.absorb(doc);
    }

    fn absorb(&mut self, doc: &Document) {
        for rect in doc.take_dirty_regions() {
            tracing::trace!("Dirty region {:?}", rect);
            self.add_damage(rect);
            for layer in self.layers_mut() {
                layer.update_region(doc, rect);
            }
        }
    }

    fn add_damage(&mut self, rect: DirtyRect) {
        self.damage = Some(match self.damage {
            Some(damage) => damage.union(&rect),
            None => rect,
        });
    }

    pub fn moved(&mut self, doc: &mut Document, pos: TilePos, mods: Modifiers) {
        for layer in self.layers_mut() {
            layer.moved(doc, pos, mods);
        }
    }

    pub fn clicked(&mut self, doc: &mut Document, pos: TilePos, mods: Modifiers) {
        for layer in self.layers_mut() {
            layer.clicked(doc, pos, mods);
        }
    }

    pub fn drag_start(&mut self, doc: &mut Document, pos: TilePos, mods: Modifiers) {
        for layer in self.layers_mut() {
            layer.drag_start(doc, pos, mods);
        }
    }

    pub fn drag(&mut self, doc: &mut Document, pos: TilePos, mods: Modifiers) {
        for layer in self.layers_mut() {
            layer.drag(doc, pos, mods);
        }
    }

    pub fn drag_end(&mut self, doc: &mut Document, pos: TilePos, mods: Modifiers) {
        for layer in self.layers_mut() {
            layer.drag_end(doc, pos, mods);
        }
    }

    pub fn exited(&mut self, doc: &mut Document) {
        for layer in self.layers_mut() {
            layer.exited(doc);
        }
    }

    /// The last layer in dispatch order asking for a non-default cursor wins
    pub fn resolve_cursor(&self, doc: &Document, pos: TilePos) -> CursorIcon {
        self.layers()
            .map(|layer| layer.cursor(doc, pos))
            .filter(|icon| *icon != CursorIcon::Default)
            .last()
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for LayerPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerPipeline")
            .field("layers", &self.layer_names())
            .finish()
    }
}
