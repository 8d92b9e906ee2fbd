//! Interactive elements placed on the map (NPCs, triggers, hero start)

use crate::TilePos;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of an interactive element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ElementKind {
    /// Non-player character
    #[default]
    Npc,
    /// Invisible trigger running an action when stepped on
    Trigger,
    /// Where the hero spawns. At most one per map.
    HeroStart,
}

impl ElementKind {
    /// Get display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            ElementKind::Npc => "NPC",
            ElementKind::Trigger => "Trigger",
            ElementKind::HeroStart => "Hero Start",
        }
    }

    /// Whether a map may hold only one element of this kind
    pub fn is_unique(&self) -> bool {
        matches!(self, ElementKind::HeroStart)
    }
}

/// An element instance at a tile position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub id: Uuid,
    pub kind: ElementKind,
    pub name: String,
    pub position: TilePos,
}

impl Element {
    pub fn new(kind: ElementKind, position: TilePos) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            name: kind.display_name().to_string(),
            position,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}
