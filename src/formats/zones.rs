//! Zone-boundary text format.

use cgmath::Point3;

use crate::data_structures::zone::Zone;
use crate::error::FormatError;
use crate::formats::{field_count_error, parse_f32, read_sections};
use crate::geometry::Aabb;

/// Sub-type of the zone records that contribute to classification.
const CITY_ZONE_TYPE: &str = "0";

/// Parse "zone" records into named boxes, keeping declaration order.
///
/// Only records of the city sub-type contribute; other zone kinds (map
/// areas, navigation hints) share the section but are ignored. The box is
/// given as two opposite corners.
pub fn parse_zones(file: &str, text: &str) -> Result<Vec<Zone>, FormatError> {
    let mut zones = Vec::new();
    read_sections(text, |section, fields, line| {
        if section != "zone" {
            return Ok(());
        }
        if fields.len() != 9 {
            return Err(field_count_error(file, line, "zone", "9", fields.len()));
        }
        if fields[1] != CITY_ZONE_TYPE {
            return Ok(());
        }
        let f = |at: usize| parse_f32(file, line, fields[at]);
        zones.push(Zone {
            name: fields[0].to_string(),
            bounds: Aabb::from_corners(
                Point3::new(f(2)?, f(3)?, f(4)?),
                Point3::new(f(5)?, f(6)?, f(7)?),
            ),
        });
        Ok(())
    })?;
    Ok(zones)
}
