//! Fixed-size world cell.
//!
//! A chunk is a `CHUNK_SIDE` x `CHUNK_SIDE` patch of the tile grid
//! holding two parallel layers: terrain tiles and structures. All
//! accessors are bounds-tolerant: an offset outside the chunk is a
//! no-op for writes and an empty result for reads, never a panic.

use homestead_common::{ChunkCoord, LocalCoord, PixelCoord, CHUNK_SIDE, TILE_PIXELS};

use crate::physics::BodyHandle;
use crate::structure::{Structure, StructureType};
use crate::tile::{Tile, TileType};

const SIDE: usize = CHUNK_SIDE as usize;

/// Which layer a drawn cell came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellLayer {
    /// Terrain layer, drawn first.
    Tile,
    /// Structure layer, drawn over the terrain.
    Structure,
}

/// One visible cell, handed to the render callback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellDraw {
    /// World pixel position of the cell's bottom-left corner.
    pub pixel: PixelCoord,
    /// Texture to draw.
    pub texture: &'static str,
    /// Layer the cell belongs to.
    pub layer: CellLayer,
}

/// A resident patch of world: terrain and structure grids plus the
/// chunk's own coordinate.
#[derive(Debug, Clone)]
pub struct Chunk {
    coord: ChunkCoord,
    tiles: [[Option<Tile>; SIDE]; SIDE],
    structures: [[Option<Structure>; SIDE]; SIDE],
}

impl Chunk {
    /// Creates an empty chunk at the given coordinate.
    #[must_use]
    pub const fn new(coord: ChunkCoord) -> Self {
        Self {
            coord,
            tiles: [[None; SIDE]; SIDE],
            structures: [[None; SIDE]; SIDE],
        }
    }

    /// Coordinate of this chunk, fixed at construction.
    #[must_use]
    pub const fn coord(&self) -> ChunkCoord {
        self.coord
    }

    const fn in_bounds(x: i32, y: i32) -> bool {
        x >= 0 && x < CHUNK_SIDE && y >= 0 && y < CHUNK_SIDE
    }

    /// Paints a terrain tile at a local offset. Out-of-range offsets are
    /// ignored.
    pub fn set_tile(&mut self, kind: TileType, x: i32, y: i32) {
        if !Self::in_bounds(x, y) {
            return;
        }
        self.tiles[x as usize][y as usize] = Some(Tile::new(kind));
    }

    /// Returns the tile at a local offset, or `None` when empty or out
    /// of range.
    #[must_use]
    pub fn get_tile(&self, x: i32, y: i32) -> Option<Tile> {
        if !Self::in_bounds(x, y) {
            return None;
        }
        self.tiles[x as usize][y as usize]
    }

    /// Clears the tile at a local offset. Out-of-range offsets are
    /// ignored.
    pub fn remove_tile(&mut self, x: i32, y: i32) {
        if !Self::in_bounds(x, y) {
            return;
        }
        self.tiles[x as usize][y as usize] = None;
    }

    /// Places a structure at a local offset, running its placement
    /// behavior against cells already committed in this chunk, and
    /// returns the stored cell so the caller can attach external
    /// resources. Out-of-range offsets return `None`.
    ///
    /// Placement only sees same-chunk neighbors; adjacent chunks may not
    /// be resident.
    pub fn set_structure(&mut self, kind: StructureType, x: i32, y: i32) -> Option<&mut Structure> {
        if !Self::in_bounds(x, y) {
            return None;
        }

        let below = self.get_structure(x, y - 1);
        let below_tile = self.get_tile(x, y - 1);
        let placed = Structure::place(kind, below, below_tile);

        self.structures[x as usize][y as usize] = Some(placed);
        self.structures[x as usize][y as usize].as_mut()
    }

    /// Returns the structure at a local offset, or `None` when empty or
    /// out of range.
    #[must_use]
    pub fn get_structure(&self, x: i32, y: i32) -> Option<Structure> {
        if !Self::in_bounds(x, y) {
            return None;
        }
        self.structures[x as usize][y as usize]
    }

    /// Clears and returns the structure at a local offset.
    ///
    /// Any attached physics body is NOT released here; the caller owns
    /// that contract and must detach through its backend first.
    pub fn remove_structure(&mut self, x: i32, y: i32) -> Option<Structure> {
        if !Self::in_bounds(x, y) {
            return None;
        }
        self.structures[x as usize][y as usize].take()
    }

    /// Returns the structure cell for in-place mutation.
    pub(crate) fn structure_mut(&mut self, x: i32, y: i32) -> Option<&mut Structure> {
        if !Self::in_bounds(x, y) {
            return None;
        }
        self.structures[x as usize][y as usize].as_mut()
    }

    /// Iterates occupied tile cells with their local offsets.
    pub fn tiles(&self) -> impl Iterator<Item = (LocalCoord, Tile)> + '_ {
        self.tiles.iter().enumerate().flat_map(|(x, column)| {
            column.iter().enumerate().filter_map(move |(y, cell)| {
                cell.map(|tile| (LocalCoord::new(x as u8, y as u8), tile))
            })
        })
    }

    /// Iterates occupied structure cells with their local offsets.
    pub fn structures(&self) -> impl Iterator<Item = (LocalCoord, Structure)> + '_ {
        self.structures.iter().enumerate().flat_map(|(x, column)| {
            column.iter().enumerate().filter_map(move |(y, cell)| {
                cell.map(|structure| (LocalCoord::new(x as u8, y as u8), structure))
            })
        })
    }

    /// Clears every attached physics body handle in this chunk and
    /// returns them for the caller to detach.
    pub(crate) fn take_body_handles(&mut self) -> Vec<BodyHandle> {
        let mut handles = Vec::new();
        for column in &mut self.structures {
            for cell in column.iter_mut().flatten() {
                if let Some(handle) = cell.take_body() {
                    handles.push(handle);
                }
            }
        }
        handles
    }

    /// World pixel position of a local cell's bottom-left corner.
    #[must_use]
    pub fn pixel_at(&self, local: LocalCoord) -> PixelCoord {
        let origin = self.coord.origin_pixel();
        PixelCoord::new(
            origin.x + i64::from(local.x) * TILE_PIXELS,
            origin.y + i64::from(local.y) * TILE_PIXELS,
        )
    }

    /// Invokes `draw` for every occupied cell whose pixel position
    /// passes `visible`. Empty cells never reach the predicate.
    ///
    /// Tiles are emitted first, then structures with the secondary axis
    /// descending — back-to-front, so structures lower on screen paint
    /// over the ones behind them.
    pub fn for_each_visible(
        &self,
        visible: impl Fn(PixelCoord) -> bool,
        draw: &mut impl FnMut(CellDraw),
    ) {
        for (x, column) in self.tiles.iter().enumerate() {
            for (y, cell) in column.iter().enumerate() {
                let Some(tile) = cell else { continue };
                let pixel = self.pixel_at(LocalCoord::new(x as u8, y as u8));
                if !visible(pixel) {
                    continue;
                }
                draw(CellDraw {
                    pixel,
                    texture: tile.texture(),
                    layer: CellLayer::Tile,
                });
            }
        }

        for y in (0..SIDE).rev() {
            for (x, column) in self.structures.iter().enumerate() {
                let Some(structure) = column[y] else { continue };
                let pixel = self.pixel_at(LocalCoord::new(x as u8, y as u8));
                if !visible(pixel) {
                    continue;
                }
                draw(CellDraw {
                    pixel,
                    texture: structure.texture(),
                    layer: CellLayer::Structure,
                });
            }
        }
    }
}
