//! Mutually exclusive sub-layers switched by a store value

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use mapkit_core::{DirtyRect, Listener, PropertyKey, PropertyStore, TilePos};

use super::{CursorIcon, MapLayer, Modifiers};
use crate::document::Document;
use crate::render::Canvas;

/// Forwards every call to the sub-layer registered for the current value of
/// a store key (typically the active tool)
///
/// The key is watched with a store listener, so switching takes effect on
/// the next call. The previously selected sub-layer receives `exited` when
/// the switch is observed, which lets it close an unfinished drag.
pub struct SelectionLayer<K> {
    name: String,
    key: PropertyKey<K>,
    current: Rc<Cell<Option<K>>>,
    active: Option<K>,
    listener: Listener,
    layers: Vec<(K, Box<dyn MapLayer>)>,
}

impl<K> SelectionLayer<K>
where
    K: Copy + PartialEq + fmt::Debug + 'static,
{
    pub fn new(name: impl Into<String>, doc: &Document, key: PropertyKey<K>) -> Self {
        let initial = doc.store.get(key).ok();
        let current = Rc::new(Cell::new(initial));
        let sink = current.clone();
        let listener: Listener = Rc::new(move |store: &PropertyStore| {
            sink.set(store.get(key).ok());
        });
        doc.store.add_listener(key, listener.clone());

        Self {
            name: name.into(),
            key,
            current,
            active: initial,
            listener,
            layers: Vec::new(),
        }
    }

    /// Register the sub-layer used while the key holds `value`
    pub fn with_layer(mut self, value: K, layer: impl MapLayer + 'static) -> Self {
        self.add(value, Box::new(layer));
        self
    }

    /// Register a sub-layer. A later registration for the same value replaces it.
    pub fn add(&mut self, value: K, layer: Box<dyn MapLayer>) {
        self.layers.retain(|(existing, _)| *existing != value);
        self.layers.push((value, layer));
    }

    /// Value the layer is currently forwarding for
    pub fn selected(&self) -> Option<K> {
        self.current.get()
    }

    /// Stop watching the store key
    pub fn detach(&self, doc: &Document) {
        doc.store.remove_listener(self.key, &self.listener);
    }

    fn find(&self, value: Option<K>) -> Option<&dyn MapLayer> {
        let value = value?;
        self.layers
            .iter()
            .find(|(k, _)| *k == value)
            .map(|(_, layer)| layer.as_ref())
    }

    fn find_mut(&mut self, value: Option<K>) -> Option<&mut Box<dyn MapLayer>> {
        let value = value?;
        self.layers
            .iter_mut()
            .find(|(k, _)| *k == value)
            .map(|(_, layer)| layer)
    }

    /// Catch up with the store, sending `exited` to the sub-layer being left
    fn sync(&mut self, doc: &mut Document) {
        let current = self.current.get();
        if current == self.active {
            return;
        }
        tracing::debug!(
            "{}: switching from {:?} to {:?}",
            self.name,
            self.active,
            current
        );
        if let Some(previous) = self.find_mut(self.active) {
            previous.exited(doc);
        }
        self.active = current;
    }

    fn selected_mut(&mut self, doc: &mut Document) -> Option<&mut Box<dyn MapLayer>> {
        self.sync(doc);
        self.find_mut(self.active)
    }
}

impl<K> MapLayer for SelectionLayer<K>
where
    K: Copy + PartialEq + fmt::Debug + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn paint(&mut self, doc: &Document, canvas: &mut dyn Canvas, region: DirtyRect) {
        let current = self.current.get();
        if let Some(layer) = self.find_mut(current) {
            layer.paint(doc, canvas, region);
        }
    }

    fn update_region(&mut self, doc: &Document, rect: DirtyRect) {
        let current = self.current.get();
        if let Some(layer) = self.find_mut(current) {
            layer.update_region(doc, rect);
        }
    }

    fn moved(&mut self, doc: &mut Document, pos: TilePos, mods: Modifiers) {
        if let Some(layer) = self.selected_mut(doc) {
            layer.moved(doc, pos, mods);
        }
    }

    fn clicked(&mut self, doc: &mut Document, pos: TilePos, mods: Modifiers) {
        if let Some(layer) = self.selected_mut(doc) {
            layer.clicked(doc, pos, mods);
        }
    }

    fn drag_start(&mut self, doc: &mut Document, pos: TilePos, mods: Modifiers) {
        if let Some(layer) = self.selected_mut(doc) {
            layer.drag_start(doc, pos, mods);
        }
    }

    fn drag(&mut self, doc: &mut Document, pos: TilePos, mods: Modifiers) {
        if let Some(layer) = self.selected_mut(doc) {
            layer.drag(doc, pos, mods);
        }
    }

    fn drag_end(&mut self, doc: &mut Document, pos: TilePos, mods: Modifiers) {
        if let Some(layer) = self.selected_mut(doc) {
            layer.drag_end(doc, pos, mods);
        }
    }

    fn exited(&mut self, doc: &mut Document) {
        if let Some(layer) = self.selected_mut(doc) {
            layer.exited(doc);
        }
    }

    fn cursor(&self, doc: &Document, pos: TilePos) -> CursorIcon {
        self.find(self.current.get())
            .map(|layer| layer.cursor(doc, pos))
            .unwrap_or_default()
    }
}

impl<K: Copy + fmt::Debug> fmt::Debug for SelectionLayer<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionLayer")
            .field("name", &self.name)
            .field("key", &self.key)
            .field("selected", &self.current.get())
            .field("options", &self.layers.iter().map(|(k, _)| k).collect::<Vec<_>>())
            .finish()
    }
}
