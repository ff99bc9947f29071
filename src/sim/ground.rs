//! Ground height field: dome curvature plus accumulated snow
//!
//! The globe floor is the lower arc of the globe circle. Settled flakes raise
//! the local ground, so the field grows over a session until a shake clears
//! or loosens the pack.

use serde::{Deserialize, Serialize};

use super::state::{GlobeGeometry, Snowflake};

/// Each settled flake raises the ground over a footprint of its own diameter.
pub const SETTLE_FOOTPRINT_SCALE: f32 = 2.0;
/// Height contributed per settled flake within its footprint: half its radius.
pub const SETTLE_HEIGHT_SCALE: f32 = 0.5;

/// Snapshot of a settled flake. Settled flakes never move, so the height
/// query only ever needs these three fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SettledFlake {
    pub id: u32,
    pub x: f32,
    pub radius: f32,
}

/// The growing ground surface inside the globe.
///
/// Overlapping settled flakes stack linearly; the pile is not capped by
/// overlap count, so piles come out lumpy rather than physically exact.
#[derive(Debug, Clone)]
pub struct GroundField {
    geom: GlobeGeometry,
    /// Accumulation reach factor in (0, 1]; scales the horizontal distance
    /// before the dome curve is evaluated, pulling the floor toward the rim.
    parallax: f32,
    /// Settled flakes in settle order.
    settled: Vec<SettledFlake>,
}

impl GroundField {
    pub fn new(geom: GlobeGeometry, parallax: f32) -> Self {
        Self {
            geom,
            parallax,
            settled: Vec::new(),
        }
    }

    /// Snow-column height measured up from the canvas bottom at horizontal
    /// offset `x`.
    ///
    /// Returns 0 outside the globe's horizontal span and for degenerate
    /// geometry: "no ground" rather than a fault. Callers must not resolve a
    /// collision where this returns 0 because `x` is out of bounds.
    pub fn height_at(&self, x: f32) -> f32 {
        if self.geom.radius <= 0.0 {
            return 0.0;
        }

        let d = (x - self.geom.center_x).abs();
        if d > self.geom.radius {
            return 0.0;
        }

        // Lower arc of the globe circle, optionally flattened by parallax.
        let reach = d * self.parallax;
        let curve = (self.geom.radius * self.geom.radius - reach * reach).sqrt();
        let base = self.geom.canvas_height - (self.geom.center_y + curve);

        let piled: f32 = self
            .settled
            .iter()
            .filter(|s| (s.x - x).abs() < s.radius * SETTLE_FOOTPRINT_SCALE)
            .map(|s| s.radius * SETTLE_HEIGHT_SCALE)
            .sum();

        (base + piled).max(0.0)
    }

    /// Screen-space y of the ground line at `x` (y grows downward). Flakes
    /// rest exactly on this line; decorative host elements are seated on it.
    pub fn surface_y(&self, x: f32) -> f32 {
        self.geom.canvas_height - self.height_at(x)
    }

    /// Record a flake as part of the pack. The caller must already have
    /// transitioned the flake to Settled and fixed its position and velocity.
    pub fn settle(&mut self, flake: &Snowflake) {
        self.settled.push(SettledFlake {
            id: flake.id,
            x: flake.pos.x,
            radius: flake.radius,
        });
    }

    /// Drop one settled flake (selective reactivation).
    pub fn remove(&mut self, id: u32) {
        self.settled.retain(|s| s.id != id);
    }

    /// Empty the pack (hard shake reset).
    pub fn clear(&mut self) {
        self.settled.clear();
    }

    pub fn contains(&self, id: u32) -> bool {
        self.settled.iter().any(|s| s.id == id)
    }

    pub fn settled(&self) -> &[SettledFlake] {
        &self.settled
    }

    pub fn len(&self) -> usize {
        self.settled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settled.is_empty()
    }
}
