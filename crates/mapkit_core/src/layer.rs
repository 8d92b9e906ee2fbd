//! Tile layer identifiers and cell values

use serde::{Deserialize, Serialize};

/// Index of a tile in the active tileset
pub type TileIndex = u32;

/// Sentinel value for cells without a tile (only valid on upper layers)
pub const EMPTY_TILE: TileIndex = u32::MAX;

/// Integer code used for [`EMPTY_TILE`] in exported map sections
pub const EMPTY_TILE_CODE: i32 = -1;

/// Number of tile layers in every map
pub const LAYER_COUNT: usize = 3;

/// Check if a tile value is the empty sentinel
#[inline]
pub fn is_empty_tile(tile: TileIndex) -> bool {
    tile == EMPTY_TILE
}

/// Convert a cell value to its exported integer code
///
/// Returns `None` for indices above `i32::MAX`, which have no code.
#[inline]
pub fn tile_to_code(tile: TileIndex) -> Option<i32> {
    if is_empty_tile(tile) {
        Some(EMPTY_TILE_CODE)
    } else {
        i32::try_from(tile).ok()
    }
}

/// Convert an exported integer code back to a cell value
///
/// Returns `None` for negative codes other than [`EMPTY_TILE_CODE`].
#[inline]
pub fn tile_from_code(code: i32) -> Option<TileIndex> {
    match code {
        EMPTY_TILE_CODE => Some(EMPTY_TILE),
        c if c >= 0 => Some(c as TileIndex),
        _ => None,
    }
}

/// One of the three stacked tile layers, bottom to top
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LayerId {
    /// Ground layer, always holds a tile
    #[default]
    Base,
    /// Decoration layer drawn over the ground
    Middle,
    /// Layer drawn over everything else (roofs, tree tops)
    Top,
}

impl LayerId {
    pub const ALL: [LayerId; LAYER_COUNT] = [LayerId::Base, LayerId::Middle, LayerId::Top];

    pub fn index(self) -> usize {
        match self {
            LayerId::Base => 0,
            LayerId::Middle => 1,
            LayerId::Top => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The value a fresh cell on this layer holds
    pub fn default_tile(self) -> TileIndex {
        match self {
            LayerId::Base => 0,
            LayerId::Middle | LayerId::Top => EMPTY_TILE,
        }
    }

    /// Whether cells on this layer may hold [`EMPTY_TILE`]
    pub fn allows_empty(self) -> bool {
        self != LayerId::Base
    }

    /// The next layer up, wrapping around to the base
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % LAYER_COUNT]
    }

    /// Get display name for UI
    pub fn display_name(self) -> &'static str {
        match self {
            LayerId::Base => "Base",
            LayerId::Middle => "Middle",
            LayerId::Top => "Top",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_indices() {
        for (i, layer) in LayerId::ALL.iter().enumerate() {
            assert_eq!(layer.index(), i);
            assert_eq!(LayerId::from_index(i), Some(*layer));
        }
        assert_eq!(LayerId::from_index(3), None);
        assert_eq!(LayerId::Top.next(), LayerId::Base);
    }

    #[test]
    fn test_layer_defaults() {
        assert_eq!(LayerId::Base.default_tile(), 0);
        assert!(is_empty_tile(LayerId::Middle.default_tile()));
        assert!(!LayerId::Base.allows_empty());
        assert!(LayerId::Top.allows_empty());
    }

    #[test]
    fn test_tile_codes() {
        assert_eq!(tile_to_code(EMPTY_TILE), Some(-1));
        assert_eq!(tile_to_code(17), Some(17));
        assert_eq!(tile_to_code(i32::MAX as TileIndex), Some(i32::MAX));
        assert_eq!(tile_to_code(i32::MAX as TileIndex + 1), None);
        assert_eq!(tile_from_code(-1), Some(EMPTY_TILE));
        assert_eq!(tile_from_code(5), Some(5));
        assert_eq!(tile_from_code(-7), None);
    }
}
