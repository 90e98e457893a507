//! Per-frame batch visibility.
//!
//! Three independent tests combined cheapest-first: the day/night window of
//! the batch's draw key, the draw-distance cull against the camera's near
//! plane, and the frustum test against the batch bounds. The same key
//! fields that drove batching drive these tests, so authoring-time grouping
//! and per-frame culling can never disagree.

use instant::Instant;

use crate::batch::Batch;
use crate::data_structures::definition::TimeWindow;
use crate::geometry::Frustum;

/// Simulation-time units per in-game hour; 24 hours make a day cycle.
pub const TIME_FACTOR: f64 = 2500.0;

/// Wall-clock driven in-simulation time of day.
#[derive(Debug)]
pub struct WorldClock {
    start: Instant,
}

impl Default for WorldClock {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Fractional hours elapsed since the clock started, unbounded; feed
    /// `day_time % 24` and its fraction into color-set interpolation.
    pub fn day_time(&self) -> f64 {
        self.start.elapsed().as_millis() as f64 / TIME_FACTOR
    }

    /// Current whole hour, 0-23.
    pub fn hour(&self) -> u8 {
        hour_of(self.start.elapsed().as_millis() as f64)
    }
}

/// Hour of day for an elapsed time in simulation units.
pub fn hour_of(elapsed: f64) -> u8 {
    ((elapsed / TIME_FACTOR).floor() as i64).rem_euclid(24) as u8
}

/// Whether a time-gated object is shown at `hour`.
///
/// For windows that wrap past midnight (`on > off`) the source policy is
/// kept verbatim: hidden only when the hour is strictly between `off` and
/// `on`. This is deliberately not the symmetric complement of the non-wrap
/// rule; content depends on the boundary behavior at the wrap seam.
pub fn time_window_visible(window: TimeWindow, hour: u8) -> bool {
    let TimeWindow { on, off } = window;
    if on < off && (hour < on || hour > off) {
        return false;
    }
    if off < on && (hour < on && hour > off) {
        return false;
    }
    true
}

/// Per-frame predicate for one batch.
pub fn batch_visible(batch: &Batch, hour: u8, frustum: &Frustum) -> bool {
    if let Some(window) = batch.key.time_window {
        if !time_window_visible(window, hour) {
            return false;
        }
    }
    if let Some(threshold) = batch.key.draw_distance {
        let distance = frustum.near_plane_distance(batch.sphere.center);
        if distance > batch.sphere.radius + 3.0 * threshold {
            return false;
        }
    }
    frustum.intersects_aabb(&batch.bounds)
}
