//! Canonical draw-group keys.
//!
//! A [`DrawKey`] is the value every placed instance is classified into:
//! instances with field-equal keys are rendered as one batch. Equality is
//! structural — the key is used as a dictionary key during batching, so two
//! keys built from field-equal inputs must merge regardless of identity.

use std::hash::{Hash, Hasher};

use crate::data_structures::definition::{ObjectDefinition, ObjectFlags, TimeWindow};

/// Draw distances at or above this many world units mean "always at full
/// detail"; the key then carries no distance at all.
pub const DRAW_DISTANCE_CUTOFF: f32 = 99.0;

/// Ordering bucket of a batch within the frame.
///
/// `Translucent` is never produced from a definition alone: translucency is
/// a materialized-mesh property, and the batcher upgrades `Opaque` keys when
/// decoded fragments turn out transparent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RenderLayer {
    Opaque,
    Translucent,
    NoDepthWrite,
    DrawLast,
}

/// Structurally-comparable grouping key: zone, render layer, optional
/// draw-distance cutoff, optional day/night window.
#[derive(Clone, Debug)]
pub struct DrawKey {
    pub zone: String,
    pub layer: RenderLayer,
    /// Present only when the definition's draw distance is below
    /// [`DRAW_DISTANCE_CUTOFF`]; omitted means "no distance cull", not zero.
    pub draw_distance: Option<f32>,
    /// Present only for time-gated definitions, copied verbatim.
    pub time_window: Option<TimeWindow>,
}

impl DrawKey {
    /// Derive the key for a definition resolved into `zone`.
    pub fn build(def: &ObjectDefinition, zone: &str) -> Self {
        let layer = if def.flags.contains(ObjectFlags::DRAW_LAST) {
            RenderLayer::DrawLast
        } else if def.flags.contains(ObjectFlags::NO_ZBUFFER_WRITE) {
            RenderLayer::NoDepthWrite
        } else {
            RenderLayer::Opaque
        };
        let draw_distance =
            (def.draw_distance < DRAW_DISTANCE_CUTOFF).then_some(def.draw_distance);
        Self {
            zone: zone.to_string(),
            layer,
            draw_distance,
            time_window: def.time_window,
        }
    }

    /// Key with the distance cutoff removed, used when a base model has a
    /// distant-LOD stand-in and must keep rendering at any range.
    pub fn without_draw_distance(mut self) -> Self {
        self.draw_distance = None;
        self
    }

    /// Key with an opaque layer upgraded to translucent. Other layers keep
    /// their stricter ordering.
    pub fn upgraded_translucent(mut self) -> Self {
        if self.layer == RenderLayer::Opaque {
            self.layer = RenderLayer::Translucent;
        }
        self
    }

    fn canonical(&self) -> (&str, RenderLayer, Option<u32>, Option<(u8, u8)>) {
        // Distances compare by bit pattern so the key stays hashable; the
        // parsers never produce NaN and -0.0 never appears in source data.
        (
            self.zone.as_str(),
            self.layer,
            self.draw_distance.map(f32::to_bits),
            self.time_window.map(|w| (w.on, w.off)),
        )
    }
}

impl PartialEq for DrawKey {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl Eq for DrawKey {}

impl Hash for DrawKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical().hash(state);
    }
}
