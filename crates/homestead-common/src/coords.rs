//! Coordinate types for tile, chunk, local, and pixel positions.
//!
//! The world is an infinite 2D grid of tiles. Tiles group into square
//! chunks of `CHUNK_SIDE` x `CHUNK_SIDE`, and every tile spans
//! `TILE_PIXELS` x `TILE_PIXELS` pixels in world-pixel space.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Chunk side length as a power of two (`CHUNK_SIDE == 1 << CHUNK_BITS`).
pub const CHUNK_BITS: u32 = 4;

/// Tiles per chunk side.
pub const CHUNK_SIDE: i32 = 1 << CHUNK_BITS;

/// Pixels per tile side.
pub const TILE_PIXELS: i64 = 64;

/// Pixels per chunk side.
pub const CHUNK_PIXELS: i64 = CHUNK_SIDE as i64 * TILE_PIXELS;

/// World tile coordinate (global position on the tile grid).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct TileCoord {
    /// X coordinate in tile space
    pub x: i32,
    /// Y coordinate in tile space
    pub y: i32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the chunk containing this tile.
    ///
    /// Implemented as an arithmetic right shift. Rust's `>>` on signed
    /// integers sign-extends, so this is `floor(coord / CHUNK_SIDE)` on
    /// negative coordinates too.
    #[must_use]
    pub const fn chunk(self) -> ChunkCoord {
        ChunkCoord {
            x: self.x >> CHUNK_BITS,
            y: self.y >> CHUNK_BITS,
        }
    }

    /// Returns the offset of this tile within its chunk.
    ///
    /// Always in `[0, CHUNK_SIDE)` on both axes.
    #[must_use]
    pub const fn local(self) -> LocalCoord {
        let chunk = self.chunk();
        LocalCoord {
            x: (self.x - chunk.x * CHUNK_SIDE) as u8,
            y: (self.y - chunk.y * CHUNK_SIDE) as u8,
        }
    }

    /// Returns the pixel position of this tile's origin.
    #[must_use]
    pub const fn pixel(self) -> PixelCoord {
        PixelCoord {
            x: self.x as i64 * TILE_PIXELS,
            y: self.y as i64 * TILE_PIXELS,
        }
    }
}

impl std::fmt::Display for TileCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Chunk coordinate (identifies a chunk in the world grid).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct ChunkCoord {
    /// X coordinate in chunk space
    pub x: i32,
    /// Y coordinate in chunk space
    pub y: i32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the tile coordinate of this chunk's origin corner.
    #[must_use]
    pub const fn origin_tile(self) -> TileCoord {
        TileCoord {
            x: self.x * CHUNK_SIDE,
            y: self.y * CHUNK_SIDE,
        }
    }

    /// Returns the pixel position of this chunk's origin corner.
    #[must_use]
    pub const fn origin_pixel(self) -> PixelCoord {
        PixelCoord {
            x: self.x as i64 * CHUNK_PIXELS,
            y: self.y as i64 * CHUNK_PIXELS,
        }
    }

    /// Returns the world tile holding the given local offset of this chunk.
    #[must_use]
    pub const fn tile_at(self, local: LocalCoord) -> TileCoord {
        TileCoord {
            x: self.x * CHUNK_SIDE + local.x as i32,
            y: self.y * CHUNK_SIDE + local.y as i32,
        }
    }
}

impl std::fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Chunk({}, {})", self.x, self.y)
    }
}

/// Local coordinate within a chunk (`0..CHUNK_SIDE` per axis).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct LocalCoord {
    /// X offset within chunk
    pub x: u8,
    /// Y offset within chunk
    pub y: u8,
}

impl LocalCoord {
    /// Creates a new local coordinate.
    #[must_use]
    pub const fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }
}

/// World pixel coordinate (global position in pixel space).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct PixelCoord {
    /// X coordinate in pixel space
    pub x: i64,
    /// Y coordinate in pixel space
    pub y: i64,
}

impl PixelCoord {
    /// Creates a new pixel coordinate.
    #[must_use]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Returns the tile containing this pixel.
    ///
    /// Floor division, not truncation: `-1` px is tile `-1`, not tile `0`.
    #[must_use]
    pub const fn tile(self) -> TileCoord {
        TileCoord {
            x: self.x.div_euclid(TILE_PIXELS) as i32,
            y: self.y.div_euclid(TILE_PIXELS) as i32,
        }
    }
}
