//! Named world-space zones and point classification.

use cgmath::Point3;

use crate::geometry::Aabb;

/// Name every point outside all declared zones falls back to.
pub const DEFAULT_ZONE: &str = "cityzon";

/// A named axis-aligned region used to bucket instances.
#[derive(Clone, Debug)]
pub struct Zone {
    pub name: String,
    pub bounds: Aabb,
}

/// Zones in declaration order.
///
/// Zones may overlap; classification is deterministic because it always
/// returns the first declared zone containing the point, never the smallest
/// or the closest. Two runs over the same input therefore produce identical
/// draw keys.
#[derive(Clone, Debug, Default)]
pub struct ZoneTable {
    zones: Vec<Zone>,
}

impl ZoneTable {
    pub fn new(zones: Vec<Zone>) -> Self {
        Self { zones }
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// First declared zone whose box contains `point` (inclusive bounds),
    /// or [`DEFAULT_ZONE`].
    pub fn classify(&self, point: Point3<f32>) -> &str {
        self.zones
            .iter()
            .find(|zone| zone.bounds.contains(point))
            .map_or(DEFAULT_ZONE, |zone| zone.name.as_str())
    }
}
