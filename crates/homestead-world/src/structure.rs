//! Placeable structures.
//!
//! A structure occupies one grid cell, may carry a physics body, and can
//! derive a cosmetic sub-state from its same-chunk neighbors at
//! placement time. The variant set is closed: each [`StructureType`]
//! dispatches statically to its capability implementations.

use crate::physics::{BodyHandle, CollisionShape};
use crate::tile::{Tile, TileType};

/// Structure variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructureType {
    /// Collision test dummy with a diamond-shaped footprint.
    Test,
    /// Stackable fortification wall that grows moss near grass.
    TowerWall,
}

impl StructureType {
    /// All structure variants, in stable id order.
    pub const ALL: [StructureType; 2] = [StructureType::Test, StructureType::TowerWall];

    /// Stable serialization name, as written to chunk files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Test => "test",
            Self::TowerWall => "tower_wall",
        }
    }

    /// Looks up a variant by its serialization name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Whether placing this structure should create a physics body.
    #[must_use]
    pub const fn has_physics(self) -> bool {
        match self {
            Self::Test | Self::TowerWall => true,
        }
    }

    /// Collision geometry, relative to the cell's bottom-left corner.
    #[must_use]
    pub const fn collision_shape(self) -> CollisionShape {
        match self {
            Self::Test => CollisionShape::Polygon(&[
                [64.0, 0.0],
                [110.0, 32.0],
                [64.0, 64.0],
                [18.0, 32.0],
            ]),
            Self::TowerWall => CollisionShape::Box {
                half_extents: [32.0, 32.0],
                center: [32.0, 32.0],
            },
        }
    }
}

/// Moss coverage sub-state of a wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MossState {
    /// Clean stone.
    Regular,
    /// A few patches of moss.
    BarelyMossy,
    /// Fully overgrown.
    Mossy,
}

impl MossState {
    /// State for a new wall resting on a wall in `self`.
    ///
    /// Moss thins out with height: Mossy supports BarelyMossy,
    /// BarelyMossy supports Regular, Regular supports Regular.
    #[must_use]
    pub const fn degraded(self) -> Self {
        match self {
            Self::Mossy => Self::BarelyMossy,
            Self::BarelyMossy | Self::Regular => Self::Regular,
        }
    }

    const fn textures(self) -> &'static [&'static str] {
        match self {
            Self::Regular => &[
                "structures/tower_wall/tower_wall_1.png",
                "structures/tower_wall/tower_wall_2.png",
            ],
            Self::BarelyMossy => &[
                "structures/tower_wall/patchy_mossy_tower_wall_1.png",
                "structures/tower_wall/patchy_mossy_tower_wall_2.png",
            ],
            Self::Mossy => &[
                "structures/tower_wall/mossy_tower_wall_1.png",
                "structures/tower_wall/mossy_tower_wall_2.png",
            ],
        }
    }
}

/// A placed structure cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Structure {
    kind: StructureType,
    moss: MossState,
    texture: &'static str,
    body: Option<BodyHandle>,
}

impl Structure {
    /// Runs placement behavior for `kind` given the same-chunk cells
    /// directly below the target cell.
    ///
    /// Only same-chunk neighbors participate: the neighboring chunk may
    /// not be resident, so placement never reaches across the border.
    pub(crate) fn place(
        kind: StructureType,
        below: Option<Structure>,
        below_tile: Option<Tile>,
    ) -> Self {
        let moss = match kind {
            StructureType::Test => MossState::Regular,
            StructureType::TowerWall => Self::moss_for_support(below, below_tile),
        };

        let texture = match kind {
            StructureType::Test => "structures/test.png",
            StructureType::TowerWall => {
                let variants = moss.textures();
                variants[fastrand::usize(..variants.len())]
            },
        };

        Self {
            kind,
            moss,
            texture,
            body: None,
        }
    }

    /// Moss state for a freshly placed wall, from what's under it.
    fn moss_for_support(below: Option<Structure>, below_tile: Option<Tile>) -> MossState {
        match below {
            // Ground-level wall on grass gets overgrown.
            None if below_tile.map(Tile::kind) == Some(TileType::Grass) => MossState::Mossy,
            None => MossState::Regular,
            Some(support) if support.kind == StructureType::TowerWall => support.moss.degraded(),
            Some(_) => MossState::Regular,
        }
    }

    /// Structure variant of this cell.
    #[must_use]
    pub const fn kind(self) -> StructureType {
        self.kind
    }

    /// Moss sub-state (always `Regular` for variants without moss).
    #[must_use]
    pub const fn moss(self) -> MossState {
        self.moss
    }

    /// Texture chosen for this structure.
    #[must_use]
    pub const fn texture(self) -> &'static str {
        self.texture
    }

    /// Attached physics body, if the registry created one.
    #[must_use]
    pub const fn body(self) -> Option<BodyHandle> {
        self.body
    }

    pub(crate) fn set_body(&mut self, handle: BodyHandle) {
        self.body = Some(handle);
    }

    pub(crate) fn take_body(&mut self) -> Option<BodyHandle> {
        self.body.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall_with_moss(moss: MossState) -> Structure {
        Structure {
            kind: StructureType::TowerWall,
            moss,
            texture: "structures/tower_wall/tower_wall_1.png",
            body: None,
        }
    }

    #[test]
    fn test_name_round_trip() {
        for kind in StructureType::ALL {
            assert_eq!(StructureType::from_name(kind.name()), Some(kind));
        }
        assert_eq!(StructureType::from_name("drawbridge"), None);
    }

    #[test]
    fn test_wall_on_grass_is_mossy() {
        let grass = Tile::new(TileType::Grass);
        let placed = Structure::place(StructureType::TowerWall, None, Some(grass));
        assert_eq!(placed.moss(), MossState::Mossy);
    }

    #[test]
    fn test_wall_on_rock_is_regular() {
        let rock = Tile::new(TileType::RockyFloor);
        let placed = Structure::place(StructureType::TowerWall, None, Some(rock));
        assert_eq!(placed.moss(), MossState::Regular);

        let bare = Structure::place(StructureType::TowerWall, None, None);
        assert_eq!(bare.moss(), MossState::Regular);
    }

    #[test]
    fn test_moss_degrades_up_the_wall() {
        let mossy = wall_with_moss(MossState::Mossy);
        let above = Structure::place(StructureType::TowerWall, Some(mossy), None);
        assert_eq!(above.moss(), MossState::BarelyMossy);

        let barely = wall_with_moss(MossState::BarelyMossy);
        let above = Structure::place(StructureType::TowerWall, Some(barely), None);
        assert_eq!(above.moss(), MossState::Regular);

        let regular = wall_with_moss(MossState::Regular);
        let above = Structure::place(StructureType::TowerWall, Some(regular), None);
        assert_eq!(above.moss(), MossState::Regular);
    }

    #[test]
    fn test_wall_on_non_wall_is_regular() {
        let dummy = Structure::place(StructureType::Test, None, None);
        let above = Structure::place(StructureType::TowerWall, Some(dummy), None);
        assert_eq!(above.moss(), MossState::Regular);
    }

    #[test]
    fn test_texture_matches_moss_state() {
        let grass = Tile::new(TileType::Grass);
        let placed = Structure::place(StructureType::TowerWall, None, Some(grass));
        assert!(placed.texture().contains("mossy_tower_wall"));
    }

    #[test]
    fn test_both_variants_carry_physics() {
        for kind in StructureType::ALL {
            assert!(kind.has_physics());
        }
    }
}
