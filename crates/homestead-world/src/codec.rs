//! Chunk persistence codec.
//!
//! Maps a [`Chunk`] to and from the named-tag tree stored in chunk
//! files:
//!
//! ```text
//! root (Compound)
//!   blocks (List<Compound>)  entry: type (String), x (Byte), y (Byte)
//!   tiles  (List<Compound>)  entry: type (String), x (Byte), y (Byte)
//! ```
//!
//! Decoding is defensive at two levels. A malformed *entry* (missing or
//! mistyped field, unknown type name, offset outside the chunk) is
//! skipped with an error log and the rest of the list still loads. A
//! malformed *tree* (root not a compound, a list missing, a list of the
//! wrong element type) aborts the whole chunk: the caller gets an error
//! and must treat the chunk as unavailable, which is not the same as
//! empty.

use std::io::{Read, Write};

use thiserror::Error;
use tracing::error;

use homestead_common::{ChunkCoord, CHUNK_SIDE};
use homestead_tag::{io as tag_io, Compound, List, Tag, TagError, TagId};

use crate::chunk::Chunk;
use crate::structure::StructureType;
use crate::tile::TileType;

/// Name of the root tag in a chunk file.
const ROOT_NAME: &str = "root";

/// Errors that abort an entire chunk encode/decode.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Underlying tag stream failure (I/O, truncation, bad wire data).
    #[error("tag stream error: {0}")]
    Tag(#[from] TagError),

    /// The tag tree does not have the expected shape.
    #[error("malformed chunk structure: {0}")]
    Structure(String),
}

/// Encodes a chunk and writes it as one named root tag.
///
/// The tree is built fully in memory before the first byte is written,
/// so a failed encode never emits a partial stream.
pub fn encode_chunk(chunk: &Chunk, w: &mut impl Write) -> Result<(), CodecError> {
    let root = chunk_to_tag(chunk);
    tag_io::write_named(w, ROOT_NAME, &root)?;
    Ok(())
}

/// Reads one named root tag and decodes it into a chunk at `coord`.
pub fn decode_chunk(coord: ChunkCoord, r: &mut impl Read) -> Result<Chunk, CodecError> {
    let (_, root) = tag_io::read_named(r)?;
    tag_to_chunk(coord, &root)
}

/// Builds the tag tree for a chunk.
#[must_use]
pub fn chunk_to_tag(chunk: &Chunk) -> Tag {
    let mut blocks = List::new(TagId::Compound);
    for (local, structure) in chunk.structures() {
        blocks.push(Tag::Compound(cell_entry(
            structure.kind().name(),
            local.x,
            local.y,
        )));
    }

    let mut tiles = List::new(TagId::Compound);
    for (local, tile) in chunk.tiles() {
        tiles.push(Tag::Compound(cell_entry(tile.kind().name(), local.x, local.y)));
    }

    let mut root = Compound::new();
    root.insert("blocks", Tag::List(blocks));
    root.insert("tiles", Tag::List(tiles));
    Tag::Compound(root)
}

fn cell_entry(type_name: &str, x: u8, y: u8) -> Compound {
    // Offsets fit a signed byte because CHUNK_SIDE <= 16.
    let mut entry = Compound::new();
    entry.insert("type", Tag::String(type_name.to_owned()));
    entry.insert("x", Tag::Byte(x as i8));
    entry.insert("y", Tag::Byte(y as i8));
    entry
}

/// Decodes a tag tree into a chunk at `coord`.
///
/// Tiles are applied before structures so structure placement can see
/// the chunk's terrain, exactly as it would during live placement.
pub fn tag_to_chunk(coord: ChunkCoord, root: &Tag) -> Result<Chunk, CodecError> {
    let root = root
        .as_compound()
        .ok_or_else(|| CodecError::Structure("root tag is not a compound".into()))?;

    let blocks = entry_list(root, "blocks")?;
    let tiles = entry_list(root, "tiles")?;

    let structures: Vec<(StructureType, i8, i8)> = blocks
        .items()
        .iter()
        .filter_map(|entry| decode_entry(coord, "block", entry, StructureType::from_name))
        .collect();

    let terrain: Vec<(TileType, i8, i8)> = tiles
        .items()
        .iter()
        .filter_map(|entry| decode_entry(coord, "tile", entry, TileType::from_name))
        .collect();

    let mut chunk = Chunk::new(coord);
    for (kind, x, y) in terrain {
        chunk.set_tile(kind, i32::from(x), i32::from(y));
    }
    for (kind, x, y) in structures {
        chunk.set_structure(kind, i32::from(x), i32::from(y));
    }

    Ok(chunk)
}

fn entry_list<'a>(root: &'a Compound, key: &'static str) -> Result<&'a List, CodecError> {
    let tag = root
        .get(key)
        .ok_or_else(|| CodecError::Structure(format!("missing {key} list")))?;
    let list = tag
        .as_list()
        .ok_or_else(|| CodecError::Structure(format!("{key} tag is not a list")))?;
    if list.elem() != TagId::Compound {
        return Err(CodecError::Structure(format!(
            "{key} list does not hold compound entries"
        )));
    }
    Ok(list)
}

/// Decodes one cell entry, or logs and returns `None` when the entry is
/// unusable on its own.
fn decode_entry<T>(
    coord: ChunkCoord,
    layer: &'static str,
    entry: &Tag,
    lookup: impl Fn(&str) -> Option<T>,
) -> Option<(T, i8, i8)> {
    // List homogeneity already guarantees a compound here.
    let entry = entry.as_compound()?;

    let Some(type_tag) = entry.get("type") else {
        entry_error(coord, layer, "entry has no type");
        return None;
    };
    let (Some(x_tag), Some(y_tag)) = (entry.get("x"), entry.get("y")) else {
        entry_error(coord, layer, "entry has no coordinates");
        return None;
    };

    let (Some(type_name), Some(x), Some(y)) =
        (type_tag.as_str(), x_tag.as_byte(), y_tag.as_byte())
    else {
        entry_error(coord, layer, "entry field has the wrong tag type");
        return None;
    };

    let Some(kind) = lookup(type_name) else {
        error!(
            chunk = %coord,
            layer,
            type_name,
            "skipping entry with unknown type name"
        );
        return None;
    };

    if x < 0 || i32::from(x) >= CHUNK_SIDE || y < 0 || i32::from(y) >= CHUNK_SIDE {
        entry_error(coord, layer, "entry offset outside the chunk");
        return None;
    }

    Some((kind, x, y))
}

fn entry_error(coord: ChunkCoord, layer: &'static str, reason: &'static str) {
    error!(chunk = %coord, layer, reason, "skipping malformed cell entry");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::MossState;

    fn coord() -> ChunkCoord {
        ChunkCoord::new(2, -7)
    }

    fn entry(type_name: &str, x: i8, y: i8) -> Tag {
        let mut compound = Compound::new();
        compound.insert("type", Tag::String(type_name.to_owned()));
        compound.insert("x", Tag::Byte(x));
        compound.insert("y", Tag::Byte(y));
        Tag::Compound(compound)
    }

    fn root_with(blocks: List, tiles: List) -> Tag {
        let mut root = Compound::new();
        root.insert("blocks", Tag::List(blocks));
        root.insert("tiles", Tag::List(tiles));
        Tag::Compound(root)
    }

    #[test]
    fn test_round_trip_preserves_cells() {
        let mut chunk = Chunk::new(coord());
        chunk.set_tile(TileType::Grass, 0, 0);
        chunk.set_tile(TileType::RockyFloor, 15, 15);
        chunk.set_structure(StructureType::Test, 4, 5);
        chunk.set_structure(StructureType::TowerWall, 9, 0);

        let mut buffer = Vec::new();
        encode_chunk(&chunk, &mut buffer).expect("encode");
        let restored = decode_chunk(coord(), &mut buffer.as_slice()).expect("decode");

        assert_eq!(restored.coord(), coord());
        assert_eq!(
            restored.get_tile(0, 0).map(|t| t.kind()),
            Some(TileType::Grass)
        );
        assert_eq!(
            restored.get_tile(15, 15).map(|t| t.kind()),
            Some(TileType::RockyFloor)
        );
        assert_eq!(
            restored.get_structure(4, 5).map(|s| s.kind()),
            Some(StructureType::Test)
        );
        assert_eq!(
            restored.get_structure(9, 0).map(|s| s.kind()),
            Some(StructureType::TowerWall)
        );
        assert_eq!(restored.tiles().count(), 2);
        assert_eq!(restored.structures().count(), 2);
    }

    #[test]
    fn test_empty_chunk_round_trips() {
        let chunk = Chunk::new(coord());
        let mut buffer = Vec::new();
        encode_chunk(&chunk, &mut buffer).expect("encode");
        let restored = decode_chunk(coord(), &mut buffer.as_slice()).expect("decode");
        assert_eq!(restored.tiles().count(), 0);
        assert_eq!(restored.structures().count(), 0);
    }

    #[test]
    fn test_tiles_apply_before_structures() {
        // A wall standing on grass must come back mossy, which requires
        // the terrain to be present when the structure is placed.
        let mut blocks = List::new(TagId::Compound);
        blocks.push(entry("tower_wall", 3, 8));
        let mut tiles = List::new(TagId::Compound);
        tiles.push(entry("grass", 3, 7));

        let chunk = tag_to_chunk(coord(), &root_with(blocks, tiles)).expect("decode");
        assert_eq!(
            chunk.get_structure(3, 8).map(|s| s.moss()),
            Some(MossState::Mossy)
        );
    }

    #[test]
    fn test_unknown_type_name_skips_entry_only() {
        let mut tiles = List::new(TagId::Compound);
        tiles.push(entry("grass", 1, 1));
        tiles.push(entry("molten_floor", 2, 2));

        let chunk =
            tag_to_chunk(coord(), &root_with(List::new(TagId::Compound), tiles)).expect("decode");
        assert_eq!(chunk.tiles().count(), 1);
        assert_eq!(
            chunk.get_tile(1, 1).map(|t| t.kind()),
            Some(TileType::Grass)
        );
        assert_eq!(chunk.get_tile(2, 2), None);
    }

    #[test]
    fn test_missing_fields_skip_entry_only() {
        let mut no_type = Compound::new();
        no_type.insert("x", Tag::Byte(1));
        no_type.insert("y", Tag::Byte(1));

        let mut no_coords = Compound::new();
        no_coords.insert("type", Tag::String("grass".into()));

        let mut tiles = List::new(TagId::Compound);
        tiles.push(Tag::Compound(no_type));
        tiles.push(Tag::Compound(no_coords));
        tiles.push(entry("rocky_floor", 0, 9));

        let chunk =
            tag_to_chunk(coord(), &root_with(List::new(TagId::Compound), tiles)).expect("decode");
        assert_eq!(chunk.tiles().count(), 1);
    }

    #[test]
    fn test_mistyped_field_skips_entry_only() {
        let mut bad = Compound::new();
        bad.insert("type", Tag::String("grass".into()));
        bad.insert("x", Tag::String("4".into()));
        bad.insert("y", Tag::Byte(4));

        let mut tiles = List::new(TagId::Compound);
        tiles.push(Tag::Compound(bad));

        let chunk =
            tag_to_chunk(coord(), &root_with(List::new(TagId::Compound), tiles)).expect("decode");
        assert_eq!(chunk.tiles().count(), 0);
    }

    #[test]
    fn test_out_of_range_offset_skips_entry_only() {
        let mut tiles = List::new(TagId::Compound);
        tiles.push(entry("grass", -1, 4));
        tiles.push(entry("grass", 16, 4));

        let chunk =
            tag_to_chunk(coord(), &root_with(List::new(TagId::Compound), tiles)).expect("decode");
        assert_eq!(chunk.tiles().count(), 0);
    }

    #[test]
    fn test_missing_blocks_list_aborts() {
        let mut root = Compound::new();
        root.insert("tiles", Tag::List(List::new(TagId::Compound)));
        let result = tag_to_chunk(coord(), &Tag::Compound(root));
        assert!(matches!(result, Err(CodecError::Structure(_))));
    }

    #[test]
    fn test_non_compound_root_aborts() {
        let result = tag_to_chunk(coord(), &Tag::Byte(1));
        assert!(matches!(result, Err(CodecError::Structure(_))));
    }

    #[test]
    fn test_non_list_blocks_aborts() {
        let mut root = Compound::new();
        root.insert("blocks", Tag::Byte(0));
        root.insert("tiles", Tag::List(List::new(TagId::Compound)));
        let result = tag_to_chunk(coord(), &Tag::Compound(root));
        assert!(matches!(result, Err(CodecError::Structure(_))));
    }

    #[test]
    fn test_wrong_list_element_type_aborts() {
        // Even an empty byte-list is structurally wrong for tiles.
        let mut root = Compound::new();
        root.insert("blocks", Tag::List(List::new(TagId::Compound)));
        root.insert("tiles", Tag::List(List::new(TagId::Byte)));
        let result = tag_to_chunk(coord(), &Tag::Compound(root));
        assert!(matches!(result, Err(CodecError::Structure(_))));
    }

    #[test]
    fn test_truncated_stream_aborts() {
        let mut chunk = Chunk::new(coord());
        chunk.set_tile(TileType::Grass, 1, 2);
        let mut buffer = Vec::new();
        encode_chunk(&chunk, &mut buffer).expect("encode");
        buffer.truncate(buffer.len() / 2);

        let result = decode_chunk(coord(), &mut buffer.as_slice());
        assert!(matches!(result, Err(CodecError::Tag(_))));
    }

    #[test]
    fn test_encoded_offsets_are_bytes() {
        let mut chunk = Chunk::new(coord());
        chunk.set_tile(TileType::Grass, 15, 15);
        let root = chunk_to_tag(&chunk);

        let tiles = root
            .as_compound()
            .and_then(|c| c.get("tiles"))
            .and_then(Tag::as_list)
            .expect("tiles list");
        let entry = tiles.items()[0].as_compound().expect("entry");
        assert_eq!(entry.get("x").and_then(Tag::as_byte), Some(15));
        assert_eq!(entry.get("y").and_then(Tag::as_byte), Some(15));
        assert_eq!(entry.get("type").and_then(Tag::as_str), Some("grass"));
    }
}
