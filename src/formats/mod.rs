//! Parsers for the text and binary map-description formats.
//!
//! All parsers here are pure transformations from raw bytes or text into the
//! records in [`crate::data_structures`]. They either return fully-typed
//! record sets or fail with a [`FormatError`] naming the offending line or
//! offset; malformed records are never skipped silently.
//!
//! - `definitions` parses item-definition files ("objs"/"tobj"/"anim")
//! - `placements` parses item-placement files, text and binary
//! - `zones` parses zone-boundary files
//! - `timecycle` parses the day/night color-curve table
//! - `archive` parses `.img`/`.dir` asset-archive directories

use crate::error::FormatError;

pub mod archive;
pub mod definitions;
pub mod placements;
pub mod timecycle;
pub mod zones;

/// Walk the shared section grammar and hand each record to `cb`.
///
/// A section opens with a bare `section-name` line and closes with `end`.
/// Blank lines and `#` comments are ignored, everything is folded to lower
/// case, and records are comma-separated with optional surrounding
/// whitespace. `cb` receives the section name, the record fields and the
/// 1-based line number.
pub(crate) fn read_sections<F>(text: &str, mut cb: F) -> Result<(), FormatError>
where
    F: FnMut(&str, &[&str], usize) -> Result<(), FormatError>,
{
    let mut section: Option<String> = None;
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim().to_lowercase();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match &section {
            None => section = Some(line),
            Some(_) if line == "end" => section = None,
            Some(name) => {
                let fields: Vec<&str> = line.split(',').map(str::trim).collect();
                cb(name, &fields, idx + 1)?;
            }
        }
    }
    Ok(())
}

pub(crate) fn parse_f32(file: &str, line: usize, value: &str) -> Result<f32, FormatError> {
    value.parse().map_err(|_| FormatError::Number {
        file: file.to_string(),
        line,
        value: value.to_string(),
    })
}

pub(crate) fn parse_i32(file: &str, line: usize, value: &str) -> Result<i32, FormatError> {
    value.parse().map_err(|_| FormatError::Number {
        file: file.to_string(),
        line,
        value: value.to_string(),
    })
}

pub(crate) fn parse_u8(file: &str, line: usize, value: &str) -> Result<u8, FormatError> {
    value.parse().map_err(|_| FormatError::Number {
        file: file.to_string(),
        line,
        value: value.to_string(),
    })
}

pub(crate) fn parse_u32(file: &str, line: usize, value: &str) -> Result<u32, FormatError> {
    value.parse().map_err(|_| FormatError::Number {
        file: file.to_string(),
        line,
        value: value.to_string(),
    })
}

pub(crate) fn field_count_error(
    file: &str,
    line: usize,
    section: &str,
    expected: &'static str,
    found: usize,
) -> FormatError {
    FormatError::FieldCount {
        file: file.to_string(),
        line,
        section: section.to_string(),
        expected,
        found,
    }
}
