//! Chunk providers: where chunks come from and where they go.
//!
//! A provider owns the storage side of the chunk lifecycle. The registry
//! asks it for a chunk when a coordinate first becomes resident and
//! hands the chunk back on unload. Providers never report "chunk is
//! empty" as a failure — a coordinate nobody visited yet simply yields a
//! fresh chunk.

use std::path::{Path, PathBuf};

use tracing::{debug, error, warn};

use homestead_common::ChunkCoord;

use crate::chunk::Chunk;
use crate::codec;

/// File extension of chunk files.
pub const CHUNK_FILE_EXT: &str = "hstd";

/// Supplies and disposes chunks for a single registry.
///
/// A provider must not be shared between registries: chunk files are
/// keyed by coordinate alone, so two registries over one provider would
/// clobber each other's saves.
pub trait ChunkProvider: Send + Sync {
    /// Returns the chunk for a coordinate, or `None` when the chunk
    /// exists in storage but cannot be loaded. A coordinate with no
    /// stored data yields a fresh empty chunk.
    fn provide(&self, coord: ChunkCoord) -> Option<Chunk>;

    /// Takes ownership of an evicted chunk, persisting it if the
    /// provider has writable storage.
    fn unload(&self, chunk: Chunk);
}

/// Provider for non-persistent worlds: every load is a fresh empty
/// chunk and unloading discards the data.
#[derive(Debug, Default)]
pub struct EphemeralProvider;

impl ChunkProvider for EphemeralProvider {
    fn provide(&self, coord: ChunkCoord) -> Option<Chunk> {
        Some(Chunk::new(coord))
    }

    fn unload(&self, _chunk: Chunk) {}
}

/// Codec-backed provider persisting one file per chunk under
/// `<worlds-root>/<world-name>/chunks/`.
#[derive(Debug)]
pub struct FileChunkProvider {
    chunks_dir: PathBuf,
    writable: bool,
}

impl FileChunkProvider {
    /// Opens a writable world directory.
    #[must_use]
    pub fn new(worlds_root: impl AsRef<Path>, world_name: &str) -> Self {
        Self {
            chunks_dir: worlds_root.as_ref().join(world_name).join("chunks"),
            writable: true,
        }
    }

    /// Opens a world whose backing storage must not be written, e.g. a
    /// world shipped inside the application bundle. Unloads skip the
    /// save with a warning instead of failing.
    #[must_use]
    pub fn read_only(worlds_root: impl AsRef<Path>, world_name: &str) -> Self {
        Self {
            chunks_dir: worlds_root.as_ref().join(world_name).join("chunks"),
            writable: false,
        }
    }

    fn chunk_path(&self, coord: ChunkCoord) -> PathBuf {
        self.chunks_dir
            .join(format!("chunk.{}.{}.{CHUNK_FILE_EXT}", coord.x, coord.y))
    }
}

impl ChunkProvider for FileChunkProvider {
    fn provide(&self, coord: ChunkCoord) -> Option<Chunk> {
        let path = self.chunk_path(coord);
        if !path.exists() {
            // First visit to virgin terrain.
            debug!(chunk = %coord, "no chunk file, synthesizing empty chunk");
            return Some(Chunk::new(coord));
        }

        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(chunk = %coord, path = %path.display(), "failed to read chunk file: {e}");
                return None;
            },
        };

        match codec::decode_chunk(coord, &mut bytes.as_slice()) {
            Ok(chunk) => Some(chunk),
            Err(e) => {
                error!(chunk = %coord, path = %path.display(), "failed to decode chunk: {e}");
                None
            },
        }
    }

    fn unload(&self, chunk: Chunk) {
        let coord = chunk.coord();
        if !self.writable {
            warn!(chunk = %coord, "storage is read-only, chunk save skipped");
            return;
        }

        // Encode fully in memory first; the file is only touched once a
        // complete byte stream exists.
        let mut buffer = Vec::new();
        if let Err(e) = codec::encode_chunk(&chunk, &mut buffer) {
            error!(chunk = %coord, "failed to encode chunk: {e}");
            return;
        }

        if let Err(e) = std::fs::create_dir_all(&self.chunks_dir) {
            error!(chunk = %coord, "failed to create chunks directory: {e}");
            return;
        }

        let path = self.chunk_path(coord);
        if let Err(e) = std::fs::write(&path, buffer) {
            error!(chunk = %coord, path = %path.display(), "failed to write chunk file: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::StructureType;
    use crate::tile::TileType;

    fn coord() -> ChunkCoord {
        ChunkCoord::new(-3, 11)
    }

    #[test]
    fn test_ephemeral_always_fresh() {
        let provider = EphemeralProvider;
        let mut chunk = provider.provide(coord()).expect("chunk");
        chunk.set_tile(TileType::Grass, 1, 1);
        provider.unload(chunk);

        let again = provider.provide(coord()).expect("chunk");
        assert_eq!(again.get_tile(1, 1), None);
    }

    #[test]
    fn test_file_provider_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let provider = FileChunkProvider::new(dir.path(), "meadow");

        let mut chunk = provider.provide(coord()).expect("virgin chunk");
        chunk.set_tile(TileType::RockyFloor, 4, 5);
        chunk.set_structure(StructureType::TowerWall, 4, 6);
        provider.unload(chunk);

        assert!(dir
            .path()
            .join("meadow/chunks/chunk.-3.11.hstd")
            .exists());

        let restored = provider.provide(coord()).expect("stored chunk");
        assert_eq!(
            restored.get_tile(4, 5).map(|t| t.kind()),
            Some(TileType::RockyFloor)
        );
        assert_eq!(
            restored.get_structure(4, 6).map(|s| s.kind()),
            Some(StructureType::TowerWall)
        );
    }

    #[test]
    fn test_virgin_coordinate_is_not_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let provider = FileChunkProvider::new(dir.path(), "meadow");
        let chunk = provider.provide(ChunkCoord::new(100, 100)).expect("fresh");
        assert_eq!(chunk.tiles().count(), 0);
    }

    #[test]
    fn test_corrupt_file_reports_unavailable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let provider = FileChunkProvider::new(dir.path(), "meadow");

        let chunks_dir = dir.path().join("meadow/chunks");
        std::fs::create_dir_all(&chunks_dir).expect("mkdir");
        std::fs::write(chunks_dir.join("chunk.0.0.hstd"), b"not a tag tree").expect("write");

        assert!(provider.provide(ChunkCoord::new(0, 0)).is_none());
    }

    #[test]
    fn test_read_only_provider_skips_save() {
        let dir = tempfile::tempdir().expect("tempdir");
        let provider = FileChunkProvider::read_only(dir.path(), "meadow");

        let mut chunk = provider.provide(coord()).expect("virgin chunk");
        chunk.set_tile(TileType::Grass, 0, 0);
        provider.unload(chunk);

        assert!(!dir.path().join("meadow/chunks").exists());
    }
}
