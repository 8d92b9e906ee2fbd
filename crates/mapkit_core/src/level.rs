//! Level: the tile grid plus the interactive elements placed on it

use crate::{DirtyRect, Element, ElementKind, GridError, MapSection, TileGrid, TilePos};
use uuid::Uuid;

/// A map being edited: tiles and elements
///
/// Elements are not stored in the grid but share its coordinate space, so
/// hit tests and moves are expressed in tile positions.
#[derive(Debug)]
pub struct Level {
    pub name: String,
    pub grid: TileGrid,
    pub elements: Vec<Element>,
}

impl Level {
    /// Create a new level with a default grid
    pub fn new(name: String, width: u32, height: u32) -> Result<Self, GridError> {
        Ok(Self {
            name,
            grid: TileGrid::new(width, height)?,
            elements: Vec::new(),
        })
    }

    /// Create a level from a parsed map section
    pub fn from_section(name: String, section: &MapSection) -> Result<Self, GridError> {
        Ok(Self {
            name,
            grid: TileGrid::from_section(section)?,
            elements: Vec::new(),
        })
    }

    /// Add an element on top of the others
    ///
    /// Element changes mark their cells dirty on the grid so the view
    /// repaints them with the next flush.
    pub fn add_element(&mut self, element: Element) {
        self.mark_cell(element.position);
        self.elements.push(element);
    }

    /// Insert an element at `index` in stacking order (clamped to the end)
    pub fn insert_element(&mut self, index: usize, element: Element) {
        self.mark_cell(element.position);
        let index = index.min(self.elements.len());
        self.elements.insert(index, element);
    }

    /// Remove an element by ID
    pub fn remove_element(&mut self, id: Uuid) -> Option<Element> {
        let index = self.element_index(id)?;
        let element = self.elements.remove(index);
        self.mark_cell(element.position);
        Some(element)
    }

    /// Position of an element in stacking order, bottom first
    pub fn element_index(&self, id: Uuid) -> Option<usize> {
        self.elements.iter().position(|e| e.id == id)
    }

    /// Get element by ID
    pub fn get_element(&self, id: Uuid) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    /// Get mutable element by ID
    pub fn get_element_mut(&mut self, id: Uuid) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    /// Topmost (most recently added) element at a position
    pub fn element_at(&self, position: TilePos) -> Option<&Element> {
        self.elements.iter().rev().find(|e| e.position == position)
    }

    /// First element of a kind, used for unique kinds like the hero start
    pub fn find_kind(&self, kind: ElementKind) -> Option<&Element> {
        self.elements.iter().find(|e| e.kind == kind)
    }

    /// Shift elements by a tile offset. Unknown IDs are skipped.
    pub fn move_elements(&mut self, ids: &[Uuid], dx: i32, dy: i32) {
        let mut touched = Vec::new();
        for element in self.elements.iter_mut().filter(|e| ids.contains(&e.id)) {
            let from = element.position;
            element.position = from.offset(dx, dy);
            touched.push(from);
            touched.push(element.position);
        }
        for pos in touched {
            self.mark_cell(pos);
        }
    }

    /// Whether every listed element would stay inside the grid after a move
    pub fn can_move_elements(&self, ids: &[Uuid], dx: i32, dy: i32) -> bool {
        ids.iter().all(|id| {
            self.get_element(*id)
                .map(|e| {
                    let to = e.position.offset(dx, dy);
                    self.grid.in_bounds(to.row, to.col)
                })
                .unwrap_or(false)
        })
    }

    fn mark_cell(&mut self, pos: TilePos) {
        self.grid.mark_dirty(DirtyRect::cell(pos.row, pos.col));
    }
}
