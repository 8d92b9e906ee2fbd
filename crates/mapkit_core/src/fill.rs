//! Scanline flood fill with random-variant replacement
//!
//! Fills the 4-connected region of cells equal to the seed's value. Each
//! filled cell gets a tile drawn uniformly from a pool, which gives the
//! "random variant" look (grass, flowers, pebbles) instead of a flat area.
//!
//! The scan uses an explicit work stack of seed cells, so large maps never
//! grow the call stack.

use crate::{EditCommand, LayerId, TileGrid, TileIndex, MAX_MAP_SIZE};

/// Label of the composite command produced by [`flood_fill`]
pub const FILL_LABEL: &str = "Fill";

/// Fill the region connected to `(row, col)` on `layer`
///
/// Returns one composite command covering every changed cell, or `None`
/// when the seed is out of bounds, the pool is empty, or nothing changed.
/// Writes are coalesced and a single dirty notification fires at the end.
pub fn flood_fill(
    grid: &mut TileGrid,
    layer: LayerId,
    row: i32,
    col: i32,
    pool: &[TileIndex],
    rng: &mut fastrand::Rng,
) -> Option<EditCommand> {
    if pool.is_empty() {
        return None;
    }
    let target = grid.get(layer, row, col)?;
    let (width, height) = (grid.width() as i32, grid.height() as i32);

    let mut visited = vec![false; (MAX_MAP_SIZE * MAX_MAP_SIZE) as usize];
    let seen = |row: i32, col: i32| (row * MAX_MAP_SIZE as i32 + col) as usize;

    let mut stack = vec![(row, col)];
    let mut edits = Vec::new();

    while let Some((row, col)) = stack.pop() {
        if visited[seen(row, col)] || grid.get(layer, row, col) != Some(target) {
            continue;
        }

        // Unvisited cells still hold their original value, so matching
        // against `target` is valid even after neighbours were rewritten.
        let matches = |grid: &TileGrid, visited: &[bool], r: i32, c: i32| {
            !visited[seen(r, c)] && grid.get(layer, r, c) == Some(target)
        };

        let mut left = col;
        while left > 0 && matches(grid, &visited, row, left - 1) {
            left -= 1;
        }
        let mut right = col;
        while right + 1 < width && matches(grid, &visited, row, right + 1) {
            right += 1;
        }

        for c in left..=right {
            visited[seen(row, c)] = true;
            let value = pool[rng.usize(..pool.len())];
            if let Some(edit) = grid.set(layer, row, c, value, true) {
                edits.push(edit);
            }
        }

        for c in left..=right {
            if row > 0 && matches(grid, &visited, row - 1, c) {
                stack.push((row - 1, c));
            }
            if row + 1 < height && matches(grid, &visited, row + 1, c) {
                stack.push((row + 1, c));
            }
        }
    }

    grid.flush_dirty();
    if edits.is_empty() {
        return None;
    }
    tracing::debug!("flood fill on {:?} changed {} cells", layer, edits.len());
    Some(EditCommand::composite(FILL_LABEL, edits))
}
