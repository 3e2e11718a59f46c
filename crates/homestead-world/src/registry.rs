//! World registry: the resident chunk set and its frame-loop surface.
//!
//! The registry owns one [`ChunkProvider`] exclusively, a
//! [`PhysicsBackend`] it drives around structure placement and removal,
//! and the map of resident chunks keyed by [`ChunkCoord`]. Inserting
//! into that map is the only way a chunk becomes reachable; removing it
//! hands the chunk back to the provider.
//!
//! One mutex guards the map. Every coordinate-qualified accessor runs
//! its whole protocol (decompose, load on demand, delegate) under a
//! single lock acquisition, so a chunk is never observable half-loaded
//! even when a shutdown path races the last frame. Load failures are
//! logged and flattened to a neutral result; they never panic the frame
//! loop.

use ahash::AHashMap;
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use homestead_common::{ChunkCoord, TileCoord, Viewport, CHUNK_PIXELS, TILE_PIXELS};

use crate::chunk::{CellDraw, Chunk};
use crate::physics::PhysicsBackend;
use crate::provider::ChunkProvider;
use crate::structure::{Structure, StructureType};
use crate::tile::{Tile, TileType};

/// How far past the viewport a chunk's origin may sit and still get
/// drawn: the chunk body plus half a chunk of margin.
const CHUNK_CULL_OVERHANG: i64 = CHUNK_PIXELS + CHUNK_PIXELS / 2;

/// Per-cell culling margin: structure sprites may overhang their cell
/// by up to two tiles.
const CELL_CULL_OVERHANG: i64 = 2 * TILE_PIXELS;

/// Owns and routes access to the resident chunks of one world.
pub struct WorldRegistry {
    provider: Box<dyn ChunkProvider>,
    physics: Box<dyn PhysicsBackend>,
    chunks: Mutex<AHashMap<ChunkCoord, Chunk>>,
}

impl WorldRegistry {
    /// Creates a registry over a provider and a physics backend.
    ///
    /// The provider is exclusively owned: sharing one provider between
    /// registries would collide on chunk files keyed only by coordinate.
    #[must_use]
    pub fn new(provider: Box<dyn ChunkProvider>, physics: Box<dyn PhysicsBackend>) -> Self {
        Self {
            provider,
            physics,
            chunks: Mutex::new(AHashMap::new()),
        }
    }

    /// Makes a chunk resident.
    ///
    /// Returns `false` when the provider reports the coordinate
    /// unavailable, or when the chunk is already resident — duplicate
    /// residency is rejected here, not left to the provider.
    pub fn load_chunk(&self, coord: ChunkCoord) -> bool {
        let mut chunks = self.chunks.lock();
        if chunks.contains_key(&coord) {
            warn!(chunk = %coord, "chunk is already resident");
            return false;
        }
        Self::load_into(&*self.provider, &mut chunks, coord)
    }

    fn load_into(
        provider: &dyn ChunkProvider,
        chunks: &mut AHashMap<ChunkCoord, Chunk>,
        coord: ChunkCoord,
    ) -> bool {
        match provider.provide(coord) {
            Some(chunk) => {
                chunks.insert(coord, chunk);
                debug!(chunk = %coord, "loaded chunk");
                true
            },
            None => {
                error!(chunk = %coord, "provider reported chunk unavailable");
                false
            },
        }
    }

    /// Resident chunk for `coord`, loading it on demand. `None` when the
    /// provider cannot supply it.
    fn resident_mut<'a>(
        &self,
        chunks: &'a mut AHashMap<ChunkCoord, Chunk>,
        coord: ChunkCoord,
    ) -> Option<&'a mut Chunk> {
        if !chunks.contains_key(&coord) && !Self::load_into(&*self.provider, chunks, coord) {
            return None;
        }
        chunks.get_mut(&coord)
    }

    /// Paints a terrain tile at a world tile coordinate.
    pub fn set_tile(&self, kind: TileType, at: TileCoord) {
        let mut chunks = self.chunks.lock();
        let Some(chunk) = self.resident_mut(&mut chunks, at.chunk()) else {
            error!(tile = %at, "failed to set tile: chunk unavailable");
            return;
        };
        let local = at.local();
        chunk.set_tile(kind, i32::from(local.x), i32::from(local.y));
    }

    /// Returns the tile at a world tile coordinate, loading its chunk on
    /// demand.
    #[must_use]
    pub fn get_tile(&self, at: TileCoord) -> Option<Tile> {
        let mut chunks = self.chunks.lock();
        let Some(chunk) = self.resident_mut(&mut chunks, at.chunk()) else {
            error!(tile = %at, "failed to get tile: chunk unavailable");
            return None;
        };
        let local = at.local();
        chunk.get_tile(i32::from(local.x), i32::from(local.y))
    }

    /// Clears the tile at a world tile coordinate.
    pub fn remove_tile(&self, at: TileCoord) {
        let mut chunks = self.chunks.lock();
        let Some(chunk) = self.resident_mut(&mut chunks, at.chunk()) else {
            error!(tile = %at, "failed to remove tile: chunk unavailable");
            return;
        };
        let local = at.local();
        chunk.remove_tile(i32::from(local.x), i32::from(local.y));
    }

    /// Places a structure at a world tile coordinate and, for
    /// physics-bearing variants, attaches a body through the backend.
    ///
    /// Returns a copy of the placed cell, body handle included.
    pub fn set_structure(&self, kind: StructureType, at: TileCoord) -> Option<Structure> {
        let mut chunks = self.chunks.lock();
        let Some(chunk) = self.resident_mut(&mut chunks, at.chunk()) else {
            error!(tile = %at, "failed to set structure: chunk unavailable");
            return None;
        };
        let local = at.local();
        let (x, y) = (i32::from(local.x), i32::from(local.y));

        // Replacing an occupied cell must not strand its body.
        if let Some(cell) = chunk.structure_mut(x, y) {
            if let Some(handle) = cell.take_body() {
                self.physics.detach_body(handle);
            }
        }

        let placed = chunk.set_structure(kind, x, y)?;
        if placed.kind().has_physics() {
            let handle = self
                .physics
                .attach_body(&placed.kind().collision_shape(), at.pixel());
            placed.set_body(handle);
        }
        Some(*placed)
    }

    /// Returns the structure at a world tile coordinate, loading its
    /// chunk on demand.
    #[must_use]
    pub fn get_structure(&self, at: TileCoord) -> Option<Structure> {
        let mut chunks = self.chunks.lock();
        let Some(chunk) = self.resident_mut(&mut chunks, at.chunk()) else {
            error!(tile = %at, "failed to get structure: chunk unavailable");
            return None;
        };
        let local = at.local();
        chunk.get_structure(i32::from(local.x), i32::from(local.y))
    }

    /// Removes the structure at a world tile coordinate, detaching its
    /// physics body first. Returns the removed cell.
    pub fn remove_structure(&self, at: TileCoord) -> Option<Structure> {
        let mut chunks = self.chunks.lock();
        let Some(chunk) = self.resident_mut(&mut chunks, at.chunk()) else {
            error!(tile = %at, "failed to remove structure: chunk unavailable");
            return None;
        };
        let local = at.local();
        let (x, y) = (i32::from(local.x), i32::from(local.y));

        let Some(cell) = chunk.structure_mut(x, y) else {
            error!(tile = %at, "failed to remove structure: cell is empty");
            return None;
        };
        if let Some(handle) = cell.take_body() {
            self.physics.detach_body(handle);
        }
        chunk.remove_structure(x, y)
    }

    /// Evicts a chunk: detaches any physics bodies its structures still
    /// hold, then hands the chunk to the provider for persistence.
    ///
    /// Returns `false` (logged) when the coordinate is not resident; the
    /// second of two back-to-back unloads has no side effects.
    pub fn unload_chunk(&self, coord: ChunkCoord) -> bool {
        let mut chunks = self.chunks.lock();
        let Some(mut chunk) = chunks.remove(&coord) else {
            warn!(chunk = %coord, "cannot unload chunk that is not resident");
            return false;
        };
        self.release_bodies(&mut chunk);
        self.provider.unload(chunk);
        debug!(chunk = %coord, "unloaded chunk");
        true
    }

    /// Evicts every resident chunk. Returns how many were unloaded.
    pub fn unload_all(&self) -> usize {
        let mut chunks = self.chunks.lock();
        let count = chunks.len();
        for (_, mut chunk) in chunks.drain() {
            self.release_bodies(&mut chunk);
            self.provider.unload(chunk);
        }
        if count > 0 {
            info!(count, "unloaded all resident chunks");
        }
        count
    }

    fn release_bodies(&self, chunk: &mut Chunk) {
        for handle in chunk.take_body_handles() {
            self.physics.detach_body(handle);
        }
    }

    /// Whether a chunk is currently resident.
    #[must_use]
    pub fn is_resident(&self, coord: ChunkCoord) -> bool {
        self.chunks.lock().contains_key(&coord)
    }

    /// Number of resident chunks.
    #[must_use]
    pub fn resident_count(&self) -> usize {
        self.chunks.lock().len()
    }

    /// Drives one render pass: culls resident chunks against the
    /// viewport, then emits every visible occupied cell to `draw`.
    ///
    /// Chunks are visited in `(y, x)` key order so a frame's draw
    /// sequence is deterministic. The visible set is snapshotted under
    /// the lock and the lock released before `draw` runs, so the
    /// callback is free to load or unload chunks mid-frame. Returns once
    /// every visible cell has been emitted; the presentation layer owns
    /// the surrounding batch boundaries and steps physics and lighting
    /// between passes.
    pub fn render(&self, viewport: &Viewport, mut draw: impl FnMut(CellDraw)) {
        let visible = {
            let chunks = self.chunks.lock();

            let mut order: Vec<ChunkCoord> = chunks.keys().copied().collect();
            order.sort_unstable_by_key(|coord| (coord.y, coord.x));

            let mut visible = Vec::new();
            for coord in order {
                let Some(chunk) = chunks.get(&coord) else {
                    continue;
                };
                if !viewport.sees(coord.origin_pixel(), CHUNK_CULL_OVERHANG) {
                    continue;
                }
                chunk.for_each_visible(
                    |pixel| viewport.sees(pixel, CELL_CULL_OVERHANG),
                    &mut |cell| visible.push(cell),
                );
            }
            visible
        };

        for cell in visible {
            draw(cell);
        }
    }
}
