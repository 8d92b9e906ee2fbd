//! Fixed-capacity, three-layer tile grid with dirty-region tracking
//!
//! Storage is allocated once at [`MAX_MAP_SIZE`] squared per layer. The
//! logical `(width, height)` can change at any time without touching cells
//! beyond the new bounds, so shrinking and growing back restores content.
//!
//! Writes go through [`TileGrid::set`], which returns the reversible
//! [`EditCommand`] describing the change. Callers batching many writes pass
//! `coalesce = true` and call [`TileGrid::flush_dirty`] once at the end so
//! listeners see a single bounding rectangle.

use crate::layer::{tile_from_code, tile_to_code, LayerId, TileIndex, LAYER_COUNT};
use crate::EditCommand;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum width and height of a map, in tiles
pub const MAX_MAP_SIZE: u32 = 120;

const LAYER_STRIDE: usize = (MAX_MAP_SIZE * MAX_MAP_SIZE) as usize;

/// A cell coordinate in tile space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TilePos {
    pub row: i32,
    pub col: i32,
}

impl TilePos {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Offset by `dx` columns and `dy` rows
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            row: self.row + dy,
            col: self.col + dx,
        }
    }
}

/// A rectangle in tile space (`x` = column, `y` = row)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DirtyRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl DirtyRect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The 1x1 rectangle covering a single cell
    pub const fn cell(row: i32, col: i32) -> Self {
        Self::new(col, row, 1, 1)
    }

    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Smallest rectangle containing both
    pub fn union(&self, other: &DirtyRect) -> DirtyRect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        DirtyRect::new(x, y, (right - x) as u32, (bottom - y) as u32)
    }

    pub fn contains(&self, row: i32, col: i32) -> bool {
        col >= self.x && col < self.right() && row >= self.y && row < self.bottom()
    }

    /// Clip to `(0, 0, width, height)`
    pub fn clip(&self, width: u32, height: u32) -> DirtyRect {
        let x = self.x.max(0);
        let y = self.y.max(0);
        let right = self.right().min(width as i32);
        let bottom = self.bottom().min(height as i32);
        if right <= x || bottom <= y {
            return DirtyRect::new(x, y, 0, 0);
        }
        DirtyRect::new(x, y, (right - x) as u32, (bottom - y) as u32)
    }
}

/// Errors building or resizing a grid from external data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// Requested bounds exceed [`MAX_MAP_SIZE`]
    ExceedsCapacity { width: u32, height: u32 },
    /// Width or height is zero
    EmptyDimensions,
    /// A map section holds the wrong number of tiles
    SectionLength { expected: usize, found: usize },
    /// A map section contains a negative code other than the empty marker
    InvalidTileCode { index: usize, code: i32 },
    /// A cell holds a tile index too large to export as a code
    UnexportableTile { index: usize, tile: TileIndex },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::ExceedsCapacity { width, height } => write!(
                f,
                "Map size {}x{} exceeds the maximum of {}x{}",
                width, height, MAX_MAP_SIZE, MAX_MAP_SIZE
            ),
            GridError::EmptyDimensions => write!(f, "Map width and height must be non-zero"),
            GridError::SectionLength { expected, found } => write!(
                f,
                "Map section has {} tiles, expected {}",
                found, expected
            ),
            GridError::InvalidTileCode { index, code } => {
                write!(f, "Invalid tile code {} at index {}", code, index)
            }
            GridError::UnexportableTile { index, tile } => {
                write!(f, "Tile {} at index {} has no section code", tile, index)
            }
        }
    }
}

impl std::error::Error for GridError {}

/// Bounds-trimmed export of a grid, consumed by the map file serializer
///
/// `tiles` holds `LAYER_COUNT * height * width` codes, layer-major then
/// row-major. Empty cells are written as [`crate::EMPTY_TILE_CODE`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSection {
    pub width: u32,
    pub height: u32,
    pub tiles: Vec<i32>,
}

impl MapSection {
    /// Read one code from the section (no bounds checks beyond the slice)
    pub fn code(&self, layer: LayerId, row: u32, col: u32) -> Option<i32> {
        let index = (layer.index() * (self.width * self.height) as usize)
            + (row * self.width + col) as usize;
        self.tiles.get(index).copied()
    }
}

/// Handle returned by [`TileGrid::on_dirty`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DirtyListenerId(u64);

type DirtyListener = Box<dyn FnMut(DirtyRect)>;

/// Three-layer tile grid with logical bounds inside a fixed capacity
pub struct TileGrid {
    width: u32,
    height: u32,
    cells: Vec<TileIndex>,
    pending_dirty: Option<DirtyRect>,
    listeners: Vec<(DirtyListenerId, DirtyListener)>,
    next_listener: u64,
}

impl TileGrid {
    /// Create a grid with default contents (base filled with 0, upper layers empty)
    pub fn new(width: u32, height: u32) -> Result<Self, GridError> {
        check_bounds(width, height)?;
        let mut cells = Vec::with_capacity(LAYER_STRIDE * LAYER_COUNT);
        for layer in LayerId::ALL {
            cells.extend(std::iter::repeat(layer.default_tile()).take(LAYER_STRIDE));
        }
        Ok(Self {
            width,
            height,
            cells,
            pending_dirty: None,
            listeners: Vec::new(),
            next_listener: 0,
        })
    }

    /// Build a grid from a parsed map section, padding the rest of the
    /// capacity with each layer's default tile
    pub fn from_section(section: &MapSection) -> Result<Self, GridError> {
        let mut grid = Self::new(section.width, section.height)?;
        let expected = LAYER_COUNT * (section.width * section.height) as usize;
        if section.tiles.len() != expected {
            return Err(GridError::SectionLength {
                expected,
                found: section.tiles.len(),
            });
        }

        for layer in LayerId::ALL {
            for row in 0..section.height {
                for col in 0..section.width {
                    let index = layer.index() * (section.width * section.height) as usize
                        + (row * section.width + col) as usize;
                    let code = section.tiles[index];
                    let tile = tile_from_code(code)
                        .ok_or(GridError::InvalidTileCode { index, code })?;
                    let slot = cell_index(layer, row as i32, col as i32);
                    grid.cells[slot] = tile;
                }
            }
        }
        Ok(grid)
    }

    /// Export the cells within the logical bounds
    pub fn to_section(&self) -> Result<MapSection, GridError> {
        let mut tiles = Vec::with_capacity(LAYER_COUNT * (self.width * self.height) as usize);
        for layer in LayerId::ALL {
            for row in 0..self.height as i32 {
                for col in 0..self.width as i32 {
                    let tile = self.cells[cell_index(layer, row, col)];
                    let code = tile_to_code(tile).ok_or(GridError::UnexportableTile {
                        index: tiles.len(),
                        tile,
                    })?;
                    tiles.push(code);
                }
            }
        }
        Ok(MapSection {
            width: self.width,
            height: self.height,
            tiles,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Logical `(width, height)`
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn in_bounds(&self, row: i32, col: i32) -> bool {
        row >= 0 && col >= 0 && (row as u32) < self.height && (col as u32) < self.width
    }

    /// Full logical extent as a rectangle
    pub fn extent(&self) -> DirtyRect {
        DirtyRect::new(0, 0, self.width, self.height)
    }

    /// Read a cell, `None` when outside the logical bounds
    pub fn get(&self, layer: LayerId, row: i32, col: i32) -> Option<TileIndex> {
        if !self.in_bounds(row, col) {
            return None;
        }
        Some(self.cells[cell_index(layer, row, col)])
    }

    /// Write a cell and return the command that reverses it
    ///
    /// Returns `None` when the position is out of bounds or the value is
    /// unchanged. With `coalesce` set the dirty cell is accumulated instead
    /// of notified; call [`TileGrid::flush_dirty`] to publish the batch.
    ///
    /// The empty sentinel is accepted on every layer. Refusing it on the
    /// base layer is left to the editing session so undo stays uniform.
    pub fn set(
        &mut self,
        layer: LayerId,
        row: i32,
        col: i32,
        value: TileIndex,
        coalesce: bool,
    ) -> Option<EditCommand> {
        let old = self.write(layer, row, col, value)?;
        self.mark_dirty(DirtyRect::cell(row, col));
        if !coalesce {
            self.flush_dirty();
        }
        Some(EditCommand::CellEdit {
            layer,
            row,
            col,
            old,
            new: value,
        })
    }

    /// Change the logical bounds without touching storage
    ///
    /// Returns the reversing command, or `None` when the size is unchanged.
    /// Fires one dirty notification covering both the old and new extents.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<Option<EditCommand>, GridError> {
        check_bounds(width, height)?;
        let old = (self.width, self.height);
        if old == (width, height) {
            return Ok(None);
        }
        let before = self.extent();
        self.width = width;
        self.height = height;
        tracing::debug!(
            "resized grid from {}x{} to {}x{}",
            old.0,
            old.1,
            width,
            height
        );
        self.mark_dirty(before.union(&self.extent()));
        self.flush_dirty();
        Ok(Some(EditCommand::Resize {
            old,
            new: (width, height),
        }))
    }

    /// Add a rectangle to the pending dirty region
    pub fn mark_dirty(&mut self, rect: DirtyRect) {
        self.pending_dirty = Some(match self.pending_dirty {
            Some(pending) => pending.union(&rect),
            None => rect,
        });
    }

    /// The accumulated, not yet notified dirty region
    pub fn pending_dirty(&self) -> Option<DirtyRect> {
        self.pending_dirty
    }

    /// Notify listeners of the accumulated dirty region, if any
    pub fn flush_dirty(&mut self) -> Option<DirtyRect> {
        let rect = self.pending_dirty.take()?;
        for (_, listener) in self.listeners.iter_mut() {
            listener(rect);
        }
        Some(rect)
    }

    /// Subscribe to dirty-region notifications
    pub fn on_dirty(&mut self, listener: impl FnMut(DirtyRect) + 'static) -> DirtyListenerId {
        let id = DirtyListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Unsubscribe. Unknown ids are ignored.
    pub fn remove_dirty_listener(&mut self, id: DirtyListenerId) {
        self.listeners.retain(|(existing, _)| *existing != id);
    }

    /// Raw write used by commands: no dirty bookkeeping, returns the old value
    pub(crate) fn write(
        &mut self,
        layer: LayerId,
        row: i32,
        col: i32,
        value: TileIndex,
    ) -> Option<TileIndex> {
        if !self.in_bounds(row, col) {
            return None;
        }
        let slot = &mut self.cells[cell_index(layer, row, col)];
        if *slot == value {
            return None;
        }
        Some(std::mem::replace(slot, value))
    }

    /// Set bounds directly (used when replaying resize commands)
    pub(crate) fn set_bounds(&mut self, width: u32, height: u32) {
        let before = self.extent();
        self.width = width.min(MAX_MAP_SIZE);
        self.height = height.min(MAX_MAP_SIZE);
        self.mark_dirty(before.union(&self.extent()));
    }
}

impl fmt::Debug for TileGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TileGrid")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("pending_dirty", &self.pending_dirty)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

fn check_bounds(width: u32, height: u32) -> Result<(), GridError> {
    if width == 0 || height == 0 {
        return Err(GridError::EmptyDimensions);
    }
    if width > MAX_MAP_SIZE || height > MAX_MAP_SIZE {
        return Err(GridError::ExceedsCapacity { width, height });
    }
    Ok(())
}

#[inline]
fn cell_index(layer: LayerId, row: i32, col: i32) -> usize {
    layer.index() * LAYER_STRIDE + row as usize * MAX_MAP_SIZE as usize + col as usize
}
