//! Item-placement formats, text and binary.
//!
//! The text form reuses the shared section grammar; only "inst" records
//! matter. One placement schema forks into three shapes disambiguated
//! solely by field count: 12 fields (no interior, no LOD index), 13 fields
//! (adds interior) or 11 fields (no explicit scale, interior present,
//! trailing LOD index). Any other count is a hard parse failure.
//!
//! The binary form is a fixed little-endian record array starting at a
//! header-declared offset that must match [`BINARY_DATA_OFFSET`]; a
//! mismatch is treated as corruption.
//!
//! Both forms store rotations with the W component's sign inverted relative
//! to the raw field: the source convention uses a left-handed rotation
//! sense that has to be corrected at load time.

use bytemuck::{Pod, Zeroable};
use cgmath::{Quaternion, Vector3};

use crate::data_structures::instance::ItemInstance;
use crate::error::FormatError;
use crate::formats::{field_count_error, parse_f32, parse_i32, read_sections};

/// Magic prefix of binary placement files.
pub const BINARY_MAGIC: &[u8; 4] = b"bnry";

/// The only valid instance-data offset a binary header may declare.
pub const BINARY_DATA_OFFSET: u32 = 0x4C;

const BINARY_RECORD_SIZE: usize = 40;

/// True when `bytes` should take the binary parse path.
pub fn is_binary_placement(bytes: &[u8]) -> bool {
    bytes.len() >= BINARY_MAGIC.len() && &bytes[..BINARY_MAGIC.len()] == BINARY_MAGIC
}

fn parse_instance_record(
    file: &str,
    line: usize,
    fields: &[&str],
) -> Result<ItemInstance, FormatError> {
    // Field count is the only schema discriminator.
    let (interior, pos_at, scale_at, rot_at, lod_at) = match fields.len() {
        12 => (None, 2, Some(5), 8, None),
        13 => (Some(2), 3, Some(6), 9, None),
        11 => (Some(2), 3, None, 6, Some(10)),
        n => return Err(field_count_error(file, line, "inst", "11, 12 or 13", n)),
    };

    let f = |at: usize| parse_f32(file, line, fields[at]);
    let scale = match scale_at {
        Some(at) => Vector3::new(f(at)?, f(at + 1)?, f(at + 2)?),
        None => Vector3::new(1.0, 1.0, 1.0),
    };
    Ok(ItemInstance {
        id: Some(parse_i32(file, line, fields[0])?),
        model_name: Some(fields[1].to_string()),
        translation: Vector3::new(f(pos_at)?, f(pos_at + 1)?, f(pos_at + 2)?),
        scale,
        rotation: Quaternion::new(-f(rot_at + 3)?, f(rot_at)?, f(rot_at + 1)?, f(rot_at + 2)?),
        interior: interior
            .map(|at| parse_i32(file, line, fields[at]))
            .transpose()?,
        lod: lod_at.map(|at| parse_i32(file, line, fields[at])).transpose()?,
    })
}

/// Parse every "inst" record in a text placement file.
pub fn parse_item_placement(file: &str, text: &str) -> Result<Vec<ItemInstance>, FormatError> {
    let mut instances = Vec::new();
    read_sections(text, |section, fields, line| {
        if section == "inst" {
            instances.push(parse_instance_record(file, line, fields)?);
        }
        Ok(())
    })?;
    Ok(instances)
}

/// One 40-byte binary placement record.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct RawInstance {
    position: [f32; 3],
    rotation: [f32; 4],
    id: i32,
    interior: i32,
    lod: i32,
}

fn read_u32_le(file: &str, bytes: &[u8], offset: usize) -> Result<u32, FormatError> {
    let end = offset + 4;
    if bytes.len() < end {
        return Err(FormatError::Truncated {
            file: file.to_string(),
            offset,
            needed: 4,
        });
    }
    Ok(u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ]))
}

/// Parse a binary placement buffer.
///
/// The record count comes from the header; the parser never reads past
/// `count` records even when the buffer is longer.
pub fn parse_item_placement_binary(
    file: &str,
    bytes: &[u8],
) -> Result<Vec<ItemInstance>, FormatError> {
    let count = read_u32_le(file, bytes, 4)? as usize;
    let offset = read_u32_le(file, bytes, 7 * 4)?;
    if offset != BINARY_DATA_OFFSET {
        return Err(FormatError::BadOffset {
            file: file.to_string(),
            expected: BINARY_DATA_OFFSET,
            found: offset,
        });
    }

    let data_start = offset as usize;
    let needed = count * BINARY_RECORD_SIZE;
    if bytes.len() < data_start + needed {
        return Err(FormatError::Truncated {
            file: file.to_string(),
            offset: data_start,
            needed,
        });
    }

    let mut instances = Vec::with_capacity(count);
    for i in 0..count {
        let at = data_start + i * BINARY_RECORD_SIZE;
        let raw: RawInstance = bytemuck::pod_read_unaligned(&bytes[at..at + BINARY_RECORD_SIZE]);
        let [x, y, z, w] = raw.rotation;
        instances.push(ItemInstance {
            id: Some(raw.id),
            model_name: None,
            translation: raw.position.into(),
            scale: Vector3::new(1.0, 1.0, 1.0),
            rotation: Quaternion::new(-w, x, y, z),
            interior: Some(raw.interior),
            lod: Some(raw.lod),
        });
    }
    Ok(instances)
}
