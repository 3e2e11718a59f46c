//! # Homestead World
//!
//! Chunk-based world management and persistence:
//! - `chunk`: the fixed 16x16 cell holding terrain and structure grids
//! - `tile` / `structure`: the closed occupant type sets and their
//!   placement behavior
//! - `provider`: chunk sources (ephemeral, codec-backed file storage)
//! - `codec`: the chunk <-> tag-tree persistence codec
//! - `physics`: the injected attach/detach capability seam
//! - `registry`: the mutex-guarded resident set driven by the game loop

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod chunk;
pub mod codec;
pub mod physics;
pub mod provider;
pub mod registry;
pub mod structure;
pub mod tile;

pub use chunk::{CellDraw, CellLayer, Chunk};
pub use physics::{BodyHandle, CollisionShape, NullPhysics, PhysicsBackend};
pub use provider::{ChunkProvider, EphemeralProvider, FileChunkProvider, CHUNK_FILE_EXT};
pub use registry::WorldRegistry;
pub use structure::{MossState, Structure, StructureType};
pub use tile::{Tile, TileType};

// Coordinate currency is re-exported so game-loop code can speak world
// positions without a separate import of the common crate.
pub use homestead_common::{
    ChunkCoord, LocalCoord, PixelCoord, TileCoord, Viewport, CHUNK_PIXELS, CHUNK_SIDE,
    TILE_PIXELS,
};
