//! Tag stream reader and writer.
//!
//! Big-endian wire form over any `std::io` stream. Reading is fully
//! defensive: malformed input yields a [`TagError`], never a panic, and
//! nesting is capped at [`MAX_DEPTH`] so hostile files cannot blow the
//! stack.

use std::io::{Read, Write};

use crate::{Compound, List, Tag, TagError, TagId};

/// Maximum tag tree nesting the reader accepts.
pub const MAX_DEPTH: usize = 64;

/// Writes one named tag (and its whole subtree) to a stream.
pub fn write_named(w: &mut impl Write, name: &str, tag: &Tag) -> Result<(), TagError> {
    w.write_all(&[tag.id() as u8])?;
    write_string(w, name)?;
    write_payload(w, tag)
}

/// Reads one named tag (and its whole subtree) from a stream.
pub fn read_named(r: &mut impl Read) -> Result<(String, Tag), TagError> {
    let id = read_id(r)?;
    if id == TagId::End {
        return Err(TagError::UnexpectedEnd);
    }
    let name = read_string(r)?;
    let tag = read_payload(r, id, 0)?;
    Ok((name, tag))
}

fn write_payload(w: &mut impl Write, tag: &Tag) -> Result<(), TagError> {
    match tag {
        Tag::Byte(value) => w.write_all(&value.to_be_bytes())?,
        Tag::String(value) => write_string(w, value)?,
        Tag::List(list) => {
            let count = i32::try_from(list.len())
                .map_err(|_| TagError::ListTooLong(list.len()))?;
            w.write_all(&[list.elem() as u8])?;
            w.write_all(&count.to_be_bytes())?;
            for item in list.items() {
                write_payload(w, item)?;
            }
        },
        Tag::Compound(compound) => {
            for (name, child) in compound.iter() {
                write_named(w, name, child)?;
            }
            w.write_all(&[TagId::End as u8])?;
        },
    }
    Ok(())
}

fn write_string(w: &mut impl Write, value: &str) -> Result<(), TagError> {
    let len = u16::try_from(value.len())
        .map_err(|_| TagError::StringTooLong(value.len()))?;
    w.write_all(&len.to_be_bytes())?;
    w.write_all(value.as_bytes())?;
    Ok(())
}

fn read_id(r: &mut impl Read) -> Result<TagId, TagError> {
    let mut byte = [0u8; 1];
    r.read_exact(&mut byte)?;
    TagId::from_u8(byte[0]).ok_or(TagError::UnknownTagId(byte[0]))
}

fn read_payload(r: &mut impl Read, id: TagId, depth: usize) -> Result<Tag, TagError> {
    if depth >= MAX_DEPTH {
        return Err(TagError::DepthLimit);
    }

    match id {
        TagId::End => Err(TagError::UnexpectedEnd),
        TagId::Byte => {
            let mut byte = [0u8; 1];
            r.read_exact(&mut byte)?;
            Ok(Tag::Byte(i8::from_be_bytes(byte)))
        },
        TagId::String => Ok(Tag::String(read_string(r)?)),
        TagId::List => {
            let elem = read_id(r)?;
            let mut count_bytes = [0u8; 4];
            r.read_exact(&mut count_bytes)?;
            let count = i32::from_be_bytes(count_bytes);
            if count < 0 {
                return Err(TagError::NegativeLength(count));
            }
            if count > 0 && elem == TagId::End {
                return Err(TagError::UnexpectedEnd);
            }
            let mut list = List::new(elem);
            for _ in 0..count {
                list.push(read_payload(r, elem, depth + 1)?);
            }
            Ok(Tag::List(list))
        },
        TagId::Compound => {
            let mut compound = Compound::new();
            loop {
                let child_id = read_id(r)?;
                if child_id == TagId::End {
                    return Ok(Tag::Compound(compound));
                }
                let name = read_string(r)?;
                let child = read_payload(r, child_id, depth + 1)?;
                compound.insert(name, child);
            }
        },
    }
}

fn read_string(r: &mut impl Read) -> Result<String, TagError> {
    let mut len_bytes = [0u8; 2];
    r.read_exact(&mut len_bytes)?;
    let len = u16::from_be_bytes(len_bytes) as usize;
    let mut bytes = vec![0u8; len];
    r.read_exact(&mut bytes)?;
    Ok(String::from_utf8(bytes)?)
}
