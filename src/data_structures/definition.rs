//! Static per-model-type metadata records.

/// Bit flags carried by an [`ObjectDefinition`].
///
/// Only `DRAW_LAST` and `NO_ZBUFFER_WRITE` influence draw-key construction;
/// the rest are kept so definitions survive a parse/serialize round trip
/// and remain available to downstream material handling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ObjectFlags(u32);

impl ObjectFlags {
    pub const IS_ROAD: Self = Self(0x01);
    pub const DO_NOT_FADE: Self = Self(0x02);
    pub const DRAW_LAST: Self = Self(0x04);
    pub const ADDITIVE: Self = Self(0x08);
    pub const IS_SUBWAY: Self = Self(0x10);
    pub const IGNORE_LIGHTING: Self = Self(0x20);
    pub const NO_ZBUFFER_WRITE: Self = Self(0x40);
    pub const DONT_RECEIVE_SHADOWS: Self = Self(0x80);
    pub const IGNORE_DRAW_DISTANCE: Self = Self(0x100);
    pub const IS_GLASS_TYPE_1: Self = Self(0x200);
    pub const IS_GLASS_TYPE_2: Self = Self(0x400);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

/// Day/night hours (0-23) during which a time-gated object is shown.
///
/// `on` may be greater than `off`, expressing a window that wraps past
/// midnight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeWindow {
    pub on: u8,
    pub off: u8,
}

/// Static metadata for one model type, identified by its model name.
///
/// Immutable once parsed. The numeric id is only consulted when binary
/// placements reference objects by id instead of by name.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectDefinition {
    pub id: Option<u32>,
    pub model_name: String,
    pub txd_name: String,
    pub draw_distance: f32,
    pub flags: ObjectFlags,
    /// `Some` only for records from a time-gated ("tobj") section.
    pub time_window: Option<TimeWindow>,
}
