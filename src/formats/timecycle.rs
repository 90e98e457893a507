//! Time-cycle color-curve table.
//!
//! A fixed-shape numeric table, one row per (hour, weather) combination in
//! weather-major order: 24 consecutive rows per weather type. Rows are
//! whitespace-separated; `//` comment lines and blank lines are ignored.
//! Of the row's columns, this pipeline consumes the ambient color (columns
//! 0-2) and the sky-top/sky-bottom colors (columns 6-8 and 9-11); values
//! are 0-255 and normalised to 0-1.

use crate::data_structures::color_set::{ColorSet, Rgb};
use crate::error::FormatError;
use crate::formats::parse_f32;

const MIN_COLUMNS: usize = 12;

fn color_at(file: &str, line: usize, fields: &[&str], at: usize) -> Result<Rgb, FormatError> {
    Ok(Rgb::new(
        parse_f32(file, line, fields[at])? / 255.0,
        parse_f32(file, line, fields[at + 1])? / 255.0,
        parse_f32(file, line, fields[at + 2])? / 255.0,
    ))
}

/// Parse the table into the flat ordered sequence indexed by
/// [`crate::data_structures::color_set::color_set_index`].
pub fn parse_time_cycle(file: &str, text: &str) -> Result<Vec<ColorSet>, FormatError> {
    let mut sets = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < MIN_COLUMNS {
            return Err(FormatError::FieldCount {
                file: file.to_string(),
                line: idx + 1,
                section: "timecycle".to_string(),
                expected: "at least 12",
                found: fields.len(),
            });
        }
        sets.push(ColorSet {
            ambient: color_at(file, idx + 1, &fields, 0)?,
            sky_top: color_at(file, idx + 1, &fields, 6)?,
            sky_bottom: color_at(file, idx + 1, &fields, 9)?,
        });
    }
    Ok(sets)
}
