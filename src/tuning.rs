//! Data-driven simulation balance
//!
//! Every stochastic branch and force constant the simulation uses is a knob
//! here, so behavior can be tuned from a JSON document instead of code edits,
//! and tests can pin the coin weights they need.

use serde::{Deserialize, Serialize};

/// Simulation balance knobs. All fields have defaults, so a partial JSON
/// document overrides only what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Number of flakes in the globe
    pub flake_count: usize,
    /// Constant downward acceleration per tick
    pub gravity: f32,
    /// Horizontal velocity damping per tick
    pub x_damp: f32,
    /// Vertical velocity damping per tick
    pub y_damp: f32,
    /// Weighted coin for the collision branch: probability a landing flake
    /// recycles back to the top instead of settling. Keeps the pack uneven
    /// and some flakes perpetually falling.
    pub recycle_rate: f32,
    /// Gain applied to an impulse velocity before it reaches the flakes
    pub impulse_scale: f32,
    /// Half-width of the uniform per-axis noise added to each flung flake
    pub impulse_noise: f32,
    /// Horizontal speed of the explicit shake trigger
    pub shake_speed: f32,
    /// Ambient wind strength; 0 disables the wind perturbation entirely
    pub wind_force: f32,
    /// EMA decay for the drag velocity estimate; higher is smoother
    pub drag_smoothing: f32,
    /// Ground curve reach factor in (0, 1]; below 1 the accumulation floor
    /// flattens toward the rim
    pub parallax: f32,
    /// Probability a flake is tinted instead of white
    pub tint_chance: f32,

    // Flake attribute sampling ranges, half-open [min, max)
    pub radius_range: (f32, f32),
    pub min_vy_range: (f32, f32),
    pub min_vx_range: (f32, f32),
    pub opacity_range: (f32, f32),
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            flake_count: 100,
            gravity: 0.02,
            x_damp: 0.99,
            y_damp: 0.98,
            recycle_rate: 0.3,
            impulse_scale: 2.0,
            impulse_noise: 0.5,
            shake_speed: 3.0,
            wind_force: 0.0,
            drag_smoothing: 0.95,
            parallax: 1.0,
            tint_chance: 0.2,
            radius_range: (1.0, 3.0),
            min_vy_range: (0.5, 1.5),
            min_vx_range: (-0.1, 0.1),
            opacity_range: (0.3, 1.0),
        }
    }
}

impl Tuning {
    /// Load from a (possibly partial) JSON document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_overrides_named_fields_only() {
        let tuning = Tuning::from_json(r#"{"gravity": 0.05, "flake_count": 12}"#).unwrap();
        assert_eq!(tuning.gravity, 0.05);
        assert_eq!(tuning.flake_count, 12);
        assert_eq!(tuning.y_damp, Tuning::default().y_damp);
        assert_eq!(tuning.radius_range, Tuning::default().radius_range);
    }

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(Tuning::from_json("{}").unwrap(), Tuning::default());
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(Tuning::from_json("{gravity}").is_err());
    }

    #[test]
    fn test_roundtrip() {
        let mut tuning = Tuning::default();
        tuning.wind_force = 0.3;
        let json = serde_json::to_string(&tuning).unwrap();
        assert_eq!(Tuning::from_json(&json).unwrap(), tuning);
    }
}
