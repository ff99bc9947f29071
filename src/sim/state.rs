//! Simulation state and core types
//!
//! Everything the simulation owns lives here: the globe geometry, the flake
//! entity with its per-tick update rule, and the `SnowState` container that
//! replaces the usual pile of module-level globals.

use glam::Vec2;
use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::ground::GroundField;
use crate::consts::*;
use crate::tuning::Tuning;

/// Viewport and globe geometry, supplied once at construction and treated as
/// immutable by the simulation. y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlobeGeometry {
    pub center_x: f32,
    pub center_y: f32,
    pub radius: f32,
    pub canvas_width: f32,
    pub canvas_height: f32,
}

impl GlobeGeometry {
    /// The canonical globe: a square canvas with the circle inscribed,
    /// tangent to the canvas bottom.
    pub fn square(size: f32) -> Self {
        Self {
            center_x: size / 2.0,
            center_y: size / 2.0,
            radius: size / 2.0,
            canvas_width: size,
            canvas_height: size,
        }
    }

    /// Circle test, used for pointer-down hit detection.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        let dx = x - self.center_x;
        let dy = y - self.center_y;
        dx * dx + dy * dy <= self.radius * self.radius
    }
}

/// Pastel tints for the occasional colored flake.
pub const TINT_PALETTE: [(u8, u8, u8); 5] = [
    (255, 182, 193), // light pink
    (173, 216, 230), // light blue
    (144, 238, 144), // light green
    (255, 218, 185), // peach
    (221, 160, 221), // plum
];

/// Flake color, resolved once at creation rather than re-parsed at draw time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlakeColor {
    White,
    Tinted(u8, u8, u8),
}

impl FlakeColor {
    fn sample(rng: &mut Pcg32, tint_chance: f32) -> Self {
        if rng.random::<f32>() < tint_chance {
            let (r, g, b) = TINT_PALETTE[rng.random_range(0..TINT_PALETTE.len())];
            FlakeColor::Tinted(r, g, b)
        } else {
            FlakeColor::White
        }
    }

    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            FlakeColor::White => (255, 255, 255),
            FlakeColor::Tinted(r, g, b) => (*r, *g, *b),
        }
    }
}

/// Flake lifecycle state - free-falling or at rest in the pack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlakeState {
    Falling,
    Settled,
}

/// A single snowflake
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snowflake {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Base falling speed - the natural-motion floor for `vel.y`
    pub min_vy: f32,
    /// Base horizontal drift restored on recycle
    pub min_vx: f32,
    pub opacity: f32,
    pub color: FlakeColor,
    pub state: FlakeState,
    /// Set by an impulse; suppresses the velocity floor until the flake
    /// relaxes back near its natural motion
    pub shaken: bool,
}

impl Snowflake {
    /// Sample a new flake at a random canvas position.
    pub fn sample(id: u32, rng: &mut Pcg32, geom: &GlobeGeometry, tuning: &Tuning) -> Self {
        let min_vy = rng.random_range(tuning.min_vy_range.0..tuning.min_vy_range.1);
        Self {
            id,
            pos: Vec2::new(
                rng.random_range(0.0..geom.canvas_width),
                rng.random_range(0.0..geom.canvas_height),
            ),
            vel: Vec2::new(0.0, rng.random_range(tuning.min_vy_range.0..tuning.min_vy_range.1)),
            radius: rng.random_range(tuning.radius_range.0..tuning.radius_range.1),
            min_vy,
            min_vx: rng.random_range(tuning.min_vx_range.0..tuning.min_vx_range.1),
            opacity: rng.random_range(tuning.opacity_range.0..tuning.opacity_range.1),
            color: FlakeColor::sample(rng, tuning.tint_chance),
            state: FlakeState::Falling,
            shaken: true,
        }
    }

    pub fn is_falling(&self) -> bool {
        self.state == FlakeState::Falling
    }

    pub fn is_settled(&self) -> bool {
        self.state == FlakeState::Settled
    }

    /// Recycle in place: random x, reappear in the top band, natural
    /// velocities restored. Used for top exits and collision misses alike.
    pub fn reset(&mut self, rng: &mut Pcg32, geom: &GlobeGeometry) {
        self.pos.x = rng.random_range(0.0..geom.canvas_width);
        self.pos.y = rng.random_range(0.0..geom.canvas_height * TOP_BAND_FRACTION);
        self.vel = Vec2::new(self.min_vx, self.min_vy);
        self.state = FlakeState::Falling;
        self.shaken = false;
    }

    /// Advance one tick. No-op while settled.
    pub fn update(
        &mut self,
        ground: &mut GroundField,
        geom: &GlobeGeometry,
        tuning: &Tuning,
        rng: &mut Pcg32,
    ) {
        if self.is_settled() {
            return;
        }

        self.vel.y += tuning.gravity;

        // Stochastic ambient wind, not a directional force
        if tuning.wind_force > 0.0 {
            self.vel.x += tuning.wind_force * rng.random_range(-0.5..=0.5);
        }

        // Relax the shaken state once velocity is back near the natural floor
        if self.shaken && (self.vel.x - self.min_vx).abs() < SHAKEN_DRIFT_EPS && self.vel.y > self.min_vy
        {
            self.shaken = false;
        }

        // Natural-floor enforcement, suppressed while shaken so impulses can
        // carry the flake upward
        if !self.shaken {
            self.vel.y = self.vel.y.max(self.min_vy);
        }

        // Impulses decay geometrically
        self.vel.x *= tuning.x_damp;
        self.vel.y *= tuning.y_damp;

        self.pos += self.vel;

        // Off the top: free recycle, not a settle event
        if self.pos.y < 0.0 {
            self.reset(rng, geom);
            return;
        }

        // Wrap (not reflect) across the globe's horizontal span to keep the
        // illusion of a continuous curved interior
        let span_min = geom.center_x - geom.radius;
        let span_max = geom.center_x + geom.radius;
        if self.pos.x < span_min - self.radius {
            self.pos.x = span_max + self.radius;
        } else if self.pos.x > span_max + self.radius {
            self.pos.x = span_min - self.radius;
        }

        // Ground collision. Settle or recycle on a weighted coin: the miss
        // branch keeps the pack uneven and some flakes perpetually falling.
        let surface = ground.surface_y(self.pos.x);
        if self.pos.y + self.radius >= surface {
            if rng.random::<f32>() >= tuning.recycle_rate {
                self.state = FlakeState::Settled;
                self.pos.y = surface;
                self.vel = Vec2::ZERO;
                ground.settle(self);
            } else {
                self.reset(rng, geom);
            }
        }
    }
}

/// Complete simulation state: the flake set, the ground field, and the
/// injected RNG. Constructed once and handed to the host's frame loop.
#[derive(Debug, Clone)]
pub struct SnowState {
    pub geom: GlobeGeometry,
    pub tuning: Tuning,
    pub flakes: Vec<Snowflake>,
    pub ground: GroundField,
    pub rng: Pcg32,
    /// Run seed for reproducibility
    pub seed: u64,
    /// Simulation tick counter
    pub time_ticks: u64,
}

impl SnowState {
    /// Create a new simulation with the given seed.
    pub fn new(geom: GlobeGeometry, tuning: Tuning, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let flakes = (0..tuning.flake_count)
            .map(|i| Snowflake::sample(i as u32, &mut rng, &geom, &tuning))
            .collect();

        log::info!(
            "Snow globe initialized: {} flakes, seed {}",
            tuning.flake_count,
            seed
        );

        Self {
            geom,
            ground: GroundField::new(geom, tuning.parallax),
            tuning,
            flakes,
            rng,
            seed,
            time_ticks: 0,
        }
    }

    /// Read-only flake iteration for the external renderer.
    pub fn for_each_flake(&self, mut f: impl FnMut(&Snowflake)) {
        for flake in &self.flakes {
            f(flake);
        }
    }

    /// Snow-column height above the canvas bottom at `x`.
    pub fn ground_height_at(&self, x: f32) -> f32 {
        self.ground.height_at(x)
    }

    /// Screen-space ground line at `x`, for seating decorative elements.
    pub fn ground_surface_y(&self, x: f32) -> f32 {
        self.ground.surface_y(x)
    }

    pub fn settled_count(&self) -> usize {
        self.ground.len()
    }
}
