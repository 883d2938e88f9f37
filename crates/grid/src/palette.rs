use serde::{Deserialize, Serialize};

/// The two pixel colours that carry meaning in a map image.
///
/// Colours are compared as exact RGBA. Every other colour is floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapPalette {
    /// Pixels of this colour become solid wall cells.
    pub wall: [u8; 4],
    /// Pixels of this colour mark the player spawn.
    pub spawn: [u8; 4],
}

impl MapPalette {
    pub const WHITE: [u8; 4] = [255, 255, 255, 255];
    pub const RED: [u8; 4] = [255, 0, 0, 255];
}

impl Default for MapPalette {
    fn default() -> Self {
        Self {
            wall: Self::WHITE,
            spawn: Self::RED,
        }
    }
}
