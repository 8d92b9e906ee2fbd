//! Editor tools - painting, erasing, filling, element placement
//!
//! Each tool is a [`crate::pipeline::MapLayer`] living in the editor band
//! behind a [`crate::pipeline::SelectionLayer`] keyed on the active tool.

mod brush;
mod element;
mod fill;

pub use brush::*;
pub use element::*;
pub use fill::*;

use mapkit_core::TilePos;
use serde::{Deserialize, Serialize};

/// Available editor tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EditorTool {
    #[default]
    Paint,
    Erase,
    Fill,
    Element,
}

impl EditorTool {
    pub const ALL: [EditorTool; 4] = [
        EditorTool::Paint,
        EditorTool::Erase,
        EditorTool::Fill,
        EditorTool::Element,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            EditorTool::Paint => "Paint",
            EditorTool::Erase => "Erase",
            EditorTool::Fill => "Fill",
            EditorTool::Element => "Element",
        }
    }

    /// Tool bound to a number key, `1` for Paint through `4` for Element
    pub fn from_number(n: u32) -> Option<Self> {
        let index = usize::try_from(n.checked_sub(1)?).ok()?;
        Self::ALL.get(index).copied()
    }
}

/// Cells on the line between two tiles, both ends included
pub(crate) fn bresenham_line(from: TilePos, to: TilePos) -> Vec<TilePos> {
    let mut points = Vec::new();

    let dx = (to.col - from.col).abs();
    let dy = -(to.row - from.row).abs();
    let sx = if from.col < to.col { 1 } else { -1 };
    let sy = if from.row < to.row { 1 } else { -1 };
    let mut err = dx + dy;

    let mut col = from.col;
    let mut row = from.row;

    loop {
        points.push(TilePos::new(row, col));

        if col == to.col && row == to.row {
            break;
        }

        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            col += sx;
        }
        if e2 <= dx {
            err += dx;
            row += sy;
        }
    }

    points
}
