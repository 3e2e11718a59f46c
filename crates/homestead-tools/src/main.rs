//! # chunk-dump
//!
//! Prints a Homestead chunk file as its raw tag tree and, when the
//! coordinate can be read off the file name, as decoded cell contents.
//!
//! ```text
//! chunk-dump worlds/meadow/chunks/chunk.1.-2.hstd
//! chunk-dump --raw worlds/meadow/chunks/chunk.1.-2.hstd
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::warn;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use homestead_common::ChunkCoord;
use homestead_tag::{io as tag_io, Tag};
use homestead_world::codec;

/// Main entry point.
fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let mut raw_only = false;
    let mut path = None;
    for arg in std::env::args().skip(1) {
        if arg == "--raw" {
            raw_only = true;
        } else if path.is_none() {
            path = Some(arg);
        } else {
            bail!("unexpected argument: {arg}");
        }
    }
    let Some(path) = path else {
        bail!("usage: chunk-dump [--raw] <chunk file>");
    };
    let path = Path::new(&path);

    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let (name, root) = tag_io::read_named(&mut BufReader::new(file))
        .with_context(|| format!("reading tag stream from {}", path.display()))?;

    println!("{}:", path.display());
    print_tag(&name, &root, 1);

    if raw_only {
        return Ok(());
    }

    let Some(coord) = coord_from_file_name(path) else {
        warn!(path = %path.display(), "file name does not carry a chunk coordinate, skipping decode");
        return Ok(());
    };

    let chunk = codec::tag_to_chunk(coord, &root)
        .with_context(|| format!("decoding chunk at {coord}"))?;

    println!();
    println!("decoded {coord}:");
    println!("  {} tiles", chunk.tiles().count());
    for (local, tile) in chunk.tiles() {
        println!("    {} @ ({}, {})", tile.kind().name(), local.x, local.y);
    }
    println!("  {} structures", chunk.structures().count());
    for (local, structure) in chunk.structures() {
        println!(
            "    {} @ ({}, {})",
            structure.kind().name(),
            local.x,
            local.y
        );
    }

    Ok(())
}

/// Extracts `(x, y)` from a `chunk.<x>.<y>.<ext>` file name.
fn coord_from_file_name(path: &Path) -> Option<ChunkCoord> {
    let name = path.file_name()?.to_str()?;
    let mut parts = name.split('.');
    if parts.next() != Some("chunk") {
        return None;
    }
    let x = parts.next()?.parse().ok()?;
    let y = parts.next()?.parse().ok()?;
    Some(ChunkCoord::new(x, y))
}

fn print_tag(name: &str, tag: &Tag, depth: usize) {
    let indent = "  ".repeat(depth);
    let label = if name.is_empty() { "_" } else { name };
    match tag {
        Tag::Byte(value) => println!("{indent}{label} (Byte): {value}"),
        Tag::String(value) => println!("{indent}{label} (String): {value:?}"),
        Tag::List(list) => {
            println!(
                "{indent}{label} (List<{}>): {} entries",
                list.elem(),
                list.len()
            );
            for item in list.items() {
                print_tag("", item, depth + 1);
            }
        },
        Tag::Compound(compound) => {
            println!("{indent}{label} (Compound):");
            for (child_name, child) in compound.iter() {
                print_tag(child_name, child, depth + 1);
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coord_from_file_name() {
        assert_eq!(
            coord_from_file_name(Path::new("worlds/meadow/chunks/chunk.1.-2.hstd")),
            Some(ChunkCoord::new(1, -2))
        );
        assert_eq!(coord_from_file_name(Path::new("chunk.3.4.hstd")), Some(ChunkCoord::new(3, 4)));
        assert_eq!(coord_from_file_name(Path::new("region.1.2.hstd")), None);
        assert_eq!(coord_from_file_name(Path::new("chunk.x.y.hstd")), None);
    }
}
