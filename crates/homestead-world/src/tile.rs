//! Terrain tiles.
//!
//! A tile is the cosmetic ground occupant of one grid cell. Tiles carry
//! no physics and no behavior beyond their texture.

/// Terrain variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileType {
    /// Bare rock flooring.
    RockyFloor,
    /// Grassland, with several cosmetic variants.
    Grass,
}

impl TileType {
    /// All tile variants, in stable id order.
    pub const ALL: [TileType; 2] = [TileType::RockyFloor, TileType::Grass];

    /// Stable serialization name, as written to chunk files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::RockyFloor => "rocky_floor",
            Self::Grass => "grass",
        }
    }

    /// Human-readable display name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::RockyFloor => "Rocky Floor",
            Self::Grass => "Grass",
        }
    }

    /// Looks up a variant by its serialization name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Stable numeric id.
    #[must_use]
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Looks up a variant by its stable numeric id.
    #[must_use]
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    /// Texture variants for this terrain, at least one per variant.
    #[must_use]
    pub const fn textures(self) -> &'static [&'static str] {
        match self {
            Self::RockyFloor => &["tiles/rocky_floor.png"],
            Self::Grass => &[
                "tiles/grass/grass_1.png",
                "tiles/grass/grass_2.png",
                "tiles/grass/grass_3.png",
                "tiles/grass/grass_4.png",
                "tiles/grass/grass_5.png",
            ],
        }
    }
}

/// A placed terrain tile.
///
/// The texture variant is picked pseudo-randomly at placement and is not
/// persisted; reloading a chunk may re-roll it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    kind: TileType,
    texture: &'static str,
}

impl Tile {
    /// Places a new tile, picking a cosmetic texture variant.
    #[must_use]
    pub fn new(kind: TileType) -> Self {
        let textures = kind.textures();
        let texture = textures[fastrand::usize(..textures.len())];
        Self { kind, texture }
    }

    /// Terrain variant of this tile.
    #[must_use]
    pub const fn kind(self) -> TileType {
        self.kind
    }

    /// Texture chosen for this tile.
    #[must_use]
    pub const fn texture(self) -> &'static str {
        self.texture
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_round_trip() {
        for kind in TileType::ALL {
            assert_eq!(TileType::from_name(kind.name()), Some(kind));
        }
        assert_eq!(TileType::from_name("molten_floor"), None);
    }

    #[test]
    fn test_id_round_trip() {
        for kind in TileType::ALL {
            assert_eq!(TileType::from_id(kind.id()), Some(kind));
        }
        assert_eq!(TileType::from_id(200), None);
    }

    #[test]
    fn test_tile_texture_comes_from_table() {
        for _ in 0..32 {
            let tile = Tile::new(TileType::Grass);
            assert!(TileType::Grass.textures().contains(&tile.texture()));
        }
    }
}
