//! Snow Globe - a shakeable snow globe particle simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (flake physics, ground accumulation,
//!   pointer interaction)
//! - `tuning`: Data-driven simulation balance
//!
//! The host owns the frame loop and the presentation layer: it adapts native
//! pointer events into [`sim::PointerSample`]s, calls [`sim::tick()`] once
//! per display frame, and draws from the read-only flake and ground
//! snapshots.

pub mod sim;
pub mod tuning;

pub use sim::{
    FlakeColor, FlakeState, GlobeGeometry, GroundField, Impulse, ImpulseMode, InputTracker,
    InteractionController, PointerSample, SnowState, Snowflake, apply_impulse, tick,
};
pub use tuning::Tuning;

/// Simulation constants that are structural rather than tunable
pub mod consts {
    /// Horizontal-drift tolerance for clearing the shaken state: once a
    /// flake's drift is back within this of its natural drift (and it is
    /// falling faster than its floor), the impulse is considered spent.
    pub const SHAKEN_DRIFT_EPS: f32 = 0.1;

    /// Recycled flakes reappear within this top fraction of the canvas.
    pub const TOP_BAND_FRACTION: f32 = 0.1;
}
