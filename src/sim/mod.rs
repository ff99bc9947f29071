//! Deterministic snow simulation
//!
//! All globe behavior lives here. This module must be pure and deterministic:
//! - Unit timestep only (one tick per display frame)
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod ground;
pub mod input;
pub mod state;
pub mod tick;

pub use ground::{GroundField, SettledFlake};
pub use input::{Impulse, ImpulseMode, InputTracker, InteractionController, PointerSample};
pub use state::{FlakeColor, FlakeState, GlobeGeometry, SnowState, Snowflake};
pub use tick::{apply_impulse, tick};
