//! Editor configuration
//!
//! Controls the initial state of a new editing session. Hosts either build
//! one with the `with_*` methods or load the user's saved configuration.

mod file;

pub use file::*;

use mapkit_core::DEFAULT_HISTORY_LIMIT;
use serde::{Deserialize, Serialize};

use crate::keys::TilesetInfo;
use crate::tools::EditorTool;

/// Initial settings for a [`crate::Document`]
///
/// # Example
///
/// ```
/// use mapkit_editor::{EditorConfig, EditorTool};
///
/// let config = EditorConfig::new()
///     .with_map_size(32, 24)
///     .with_initial_tool(EditorTool::Fill)
///     .with_seed(42);
/// assert_eq!(config.map_width, 32);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Width of a new map in tiles. Default: 20
    pub map_width: u32,
    /// Height of a new map in tiles. Default: 15
    pub map_height: u32,
    /// Maximum undo entries (0 = unbounded). Default: 200
    pub history_limit: usize,
    /// Tool selected on startup. Default: Paint
    pub initial_tool: EditorTool,
    /// Whether to show the grid on startup. Default: true
    pub show_grid: bool,
    /// Tileset available before the host loads one. Default: none
    pub tileset: Option<TilesetInfo>,
    /// Seed for random-variant painting; random when unset
    pub seed: Option<u64>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            map_width: 20,
            map_height: 15,
            history_limit: DEFAULT_HISTORY_LIMIT,
            initial_tool: EditorTool::Paint,
            show_grid: true,
            tileset: None,
            seed: None,
        }
    }
}

impl EditorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the size of new maps
    pub fn with_map_size(mut self, width: u32, height: u32) -> Self {
        self.map_width = width;
        self.map_height = height;
        self
    }

    /// Set the maximum number of undo entries
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Set the initial tool selection (default: Paint)
    pub fn with_initial_tool(mut self, tool: EditorTool) -> Self {
        self.initial_tool = tool;
        self
    }

    /// Set whether to show the grid on startup (default: true)
    pub fn with_initial_grid(mut self, show: bool) -> Self {
        self.show_grid = show;
        self
    }

    /// Provide a tileset up front
    pub fn with_tileset(mut self, tileset: TilesetInfo) -> Self {
        self.tileset = Some(tileset);
        self
    }

    /// Make random-variant painting reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Random number generator for the session
    pub fn rng(&self) -> fastrand::Rng {
        match self.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!((config.map_width, config.map_height), (20, 15));
        assert_eq!(config.history_limit, 200);
        assert_eq!(config.initial_tool, EditorTool::Paint);
        assert!(config.show_grid);
        assert!(config.tileset.is_none());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EditorConfig =
            serde_json::from_str(r#"{ "map_width": 40, "initial_tool": "Fill" }"#).unwrap();
        assert_eq!(config.map_width, 40);
        assert_eq!(config.map_height, 15);
        assert_eq!(config.initial_tool, EditorTool::Fill);
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let config = EditorConfig::new().with_seed(9);
        let a: Vec<usize> = {
            let mut rng = config.rng();
            (0..8).map(|_| rng.usize(..100)).collect()
        };
        let b: Vec<usize> = {
            let mut rng = config.rng();
            (0..8).map(|_| rng.usize(..100)).collect()
        };
        assert_eq!(a, b);
    }
}
