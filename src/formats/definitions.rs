//! Item-definition text format.
//!
//! Line-oriented, case-insensitive, section-delimited. The sections
//! "objs", "tobj" and "anim" contribute one [`ObjectDefinition`] per record;
//! all other sections are skipped. Records may carry an unused extra field
//! after the texture-dictionary name which makes them one field longer, so
//! the time-gate hours of "tobj" records are consumed from the record's end
//! rather than positionally.

use crate::data_structures::definition::{ObjectDefinition, ObjectFlags, TimeWindow};
use crate::error::FormatError;
use crate::formats::{field_count_error, parse_f32, parse_u8, parse_u32, read_sections};

fn parse_record(
    file: &str,
    line: usize,
    section: &str,
    fields: &[&str],
    time_gated: bool,
) -> Result<ObjectDefinition, FormatError> {
    let (base_len, expected): (usize, &'static str) = if time_gated {
        (7, "7 or 8")
    } else {
        (5, "5 or 6")
    };
    if fields.len() != base_len && fields.len() != base_len + 1 {
        return Err(field_count_error(file, line, section, expected, fields.len()));
    }

    // The optional extra field shifts draw distance and flags right by one.
    let dd_index = if fields.len() == base_len { 3 } else { 4 };
    let time_window = if time_gated {
        Some(TimeWindow {
            on: parse_u8(file, line, fields[fields.len() - 2])?,
            off: parse_u8(file, line, fields[fields.len() - 1])?,
        })
    } else {
        None
    };
    let flags_index = if time_gated {
        fields.len() - 3
    } else {
        fields.len() - 1
    };

    Ok(ObjectDefinition {
        id: Some(parse_u32(file, line, fields[0])?),
        model_name: fields[1].to_string(),
        txd_name: fields[2].to_string(),
        draw_distance: parse_f32(file, line, fields[dd_index])?,
        flags: ObjectFlags::from_bits(parse_u32(file, line, fields[flags_index])?),
        time_window,
    })
}

/// Parse every definition record in `text`. `file` is used in diagnostics.
pub fn parse_item_definitions(
    file: &str,
    text: &str,
) -> Result<Vec<ObjectDefinition>, FormatError> {
    let mut objects = Vec::new();
    read_sections(text, |section, fields, line| {
        match section {
            "objs" | "anim" => {
                objects.push(parse_record(file, line, section, fields, false)?);
            }
            "tobj" => {
                objects.push(parse_record(file, line, section, fields, true)?);
            }
            _ => {}
        }
        Ok(())
    })?;
    Ok(objects)
}

/// Reconstruct the comma-separated record for `def`, without the unused
/// extra field. Parsing the result yields a field-equal definition; used by
/// the round-trip tests.
pub fn serialize_definition(def: &ObjectDefinition) -> String {
    let mut fields = vec![
        def.id.map_or_else(|| "0".to_string(), |id| id.to_string()),
        def.model_name.clone(),
        def.txd_name.clone(),
        format!("{}", def.draw_distance),
        def.flags.bits().to_string(),
    ];
    if let Some(window) = def.time_window {
        fields.push(window.on.to_string());
        fields.push(window.off.to_string());
    }
    fields.join(", ")
}
