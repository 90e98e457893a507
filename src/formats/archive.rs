//! Asset-archive directory format (`.img`/`.dir`).
//!
//! Directories are arrays of 32-byte entries: a 4-byte little-endian offset
//! in 2048-byte sectors, a size field, and a 24-byte null-terminated name.
//! The two archive versions differ only in a few constants — version 1
//! keeps the directory in a separate headerless file with a 4-byte size
//! field, version 2 embeds it behind an 8-byte header and narrows the size
//! field to 2 bytes — so the difference is a configuration value here, not
//! a type hierarchy.

use crate::error::FormatError;

/// Bytes per archive sector; entry offsets and sizes scale by this.
pub const SECTOR_SIZE: usize = 2048;

const ENTRY_SIZE: usize = 32;
const NAME_LEN: usize = 24;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArchiveVersion {
    V1,
    V2,
}

impl ArchiveVersion {
    fn header_len(self) -> usize {
        match self {
            Self::V1 => 0,
            Self::V2 => 8,
        }
    }
}

/// One directory entry, offset and size in sectors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub offset: u32,
    pub size: u32,
}

impl ArchiveEntry {
    /// Byte range of this entry's data within the archive image.
    pub fn byte_range(&self) -> std::ops::Range<usize> {
        let start = self.offset as usize * SECTOR_SIZE;
        start..start + self.size as usize * SECTOR_SIZE
    }
}

fn u32_at(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

fn name_at(bytes: &[u8], at: usize) -> String {
    let raw = &bytes[at..at + NAME_LEN];
    let len = raw.iter().position(|&b| b == 0).unwrap_or(NAME_LEN);
    String::from_utf8_lossy(&raw[..len]).to_lowercase()
}

/// Parse a directory buffer into its entries.
pub fn parse_directory(
    file: &str,
    bytes: &[u8],
    version: ArchiveVersion,
) -> Result<Vec<ArchiveEntry>, FormatError> {
    let start = version.header_len();
    let count = match version {
        ArchiveVersion::V1 => (bytes.len() - start.min(bytes.len())) / ENTRY_SIZE,
        ArchiveVersion::V2 => {
            if bytes.len() < start {
                return Err(FormatError::Truncated {
                    file: file.to_string(),
                    offset: 0,
                    needed: start,
                });
            }
            u32_at(bytes, 4) as usize
        }
    };

    let needed = count * ENTRY_SIZE;
    if bytes.len() < start + needed {
        return Err(FormatError::Truncated {
            file: file.to_string(),
            offset: start,
            needed,
        });
    }

    let mut entries = Vec::with_capacity(count);
    for i in 0..count {
        let at = start + i * ENTRY_SIZE;
        let size = match version {
            ArchiveVersion::V1 => u32_at(bytes, at + 4),
            ArchiveVersion::V2 => u16::from_le_bytes([bytes[at + 4], bytes[at + 5]]) as u32,
        };
        entries.push(ArchiveEntry {
            name: name_at(bytes, at + 8),
            offset: u32_at(bytes, at),
            size,
        });
    }
    Ok(entries)
}

/// Slice one entry's data out of the archive image.
pub fn entry_data<'a>(
    file: &str,
    image: &'a [u8],
    entry: &ArchiveEntry,
) -> Result<&'a [u8], FormatError> {
    let range = entry.byte_range();
    if image.len() < range.end {
        return Err(FormatError::Truncated {
            file: file.to_string(),
            offset: range.start,
            needed: range.end - range.start,
        });
    }
    Ok(&image[range])
}
