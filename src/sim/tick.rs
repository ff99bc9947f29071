//! Frame-driven simulation advance
//!
//! The host calls `tick` once per display frame; pointer callbacks run on the
//! same logical thread, so flake updates and ground mutation stay sequential.

use rand::Rng;
use rand_pcg::Pcg32;

use super::input::{Impulse, ImpulseMode};
use super::state::{FlakeState, SnowState, Snowflake};

/// Advance the simulation by one tick.
///
/// Flakes are independent (they only read the ground field), so iteration
/// order affects nothing but the settle order of same-tick ties.
pub fn tick(state: &mut SnowState) {
    state.time_ticks += 1;

    let SnowState {
        flakes,
        ground,
        rng,
        geom,
        tuning,
        ..
    } = state;

    for flake in flakes.iter_mut() {
        flake.update(ground, geom, tuning, rng);
    }
}

/// Inject a velocity into the flake set.
///
/// Every affected flake gets the impulse scaled by the tuned gain plus an
/// independent noise draw per axis, so the set never moves as a rigid block.
pub fn apply_impulse(state: &mut SnowState, impulse: &Impulse) {
    log::debug!(
        "impulse ({:.2}, {:.2}) mode {:?} on {} flakes",
        impulse.vel.x,
        impulse.vel.y,
        impulse.mode,
        state.flakes.len()
    );

    let SnowState {
        flakes,
        ground,
        rng,
        tuning,
        ..
    } = state;

    let scale = tuning.impulse_scale;
    let noise = tuning.impulse_noise;

    match impulse.mode {
        ImpulseMode::Reset => {
            ground.clear();
            for flake in flakes.iter_mut() {
                fling(flake, impulse, scale, noise, rng);
            }
        }
        ImpulseMode::Loosen => {
            for flake in flakes.iter_mut() {
                if flake.state == FlakeState::Settled {
                    ground.remove(flake.id);
                    fling(flake, impulse, scale, noise, rng);
                }
            }
        }
    }
}

fn fling(flake: &mut Snowflake, impulse: &Impulse, scale: f32, noise: f32, rng: &mut Pcg32) {
    flake.state = FlakeState::Falling;
    flake.vel.x = impulse.vel.x * scale + rng.random_range(-noise..=noise);
    flake.vel.y = impulse.vel.y * scale + rng.random_range(-noise..=noise);
    flake.shaken = true;
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use proptest::prelude::*;

    use crate::sim::ground::GroundField;
    use crate::sim::state::{GlobeGeometry, SnowState};
    use crate::tuning::Tuning;

    fn test_state(seed: u64) -> SnowState {
        SnowState::new(GlobeGeometry::square(300.0), Tuning::default(), seed)
    }

    /// Each flake is in exactly one place: Settled iff its id is in the pack.
    fn assert_membership(state: &SnowState) {
        for flake in &state.flakes {
            match flake.state {
                FlakeState::Settled => {
                    assert!(state.ground.contains(flake.id));
                    assert_eq!(flake.vel, Vec2::ZERO);
                }
                FlakeState::Falling => assert!(!state.ground.contains(flake.id)),
            }
        }
        assert_eq!(
            state.ground.len(),
            state.flakes.iter().filter(|f| f.is_settled()).count()
        );
    }

    fn settle_everything_possible(state: &mut SnowState, ticks: u64) {
        for _ in 0..ticks {
            tick(state);
        }
    }

    #[test]
    fn test_membership_invariant_over_long_run() {
        let mut state = test_state(42);
        let shake = Impulse {
            vel: Vec2::new(3.0, -1.0),
            mode: ImpulseMode::Reset,
        };

        for round in 0..4 {
            settle_everything_possible(&mut state, 500);
            assert_membership(&state);
            if round % 2 == 0 {
                apply_impulse(&mut state, &shake);
                assert_membership(&state);
            }
        }
        assert_eq!(state.time_ticks, 2000);
    }

    #[test]
    fn test_snow_accumulates() {
        let mut state = test_state(7);
        settle_everything_possible(&mut state, 2000);
        assert!(state.settled_count() > 0);
        // The pack raised the ground somewhere
        let raised = (0..300).any(|x| {
            state.ground_height_at(x as f32)
                > GroundField::new(state.geom, state.tuning.parallax).height_at(x as f32)
        });
        assert!(raised);
    }

    #[test]
    fn test_reset_impulse_clears_pack_and_flings_all() {
        let mut state = test_state(11);
        settle_everything_possible(&mut state, 2000);
        assert!(state.settled_count() > 0);

        apply_impulse(
            &mut state,
            &Impulse {
                vel: Vec2::new(2.0, -1.0),
                mode: ImpulseMode::Reset,
            },
        );

        assert_eq!(state.settled_count(), 0);
        assert!(state.flakes.iter().all(|f| f.is_falling() && f.shaken));
    }

    #[test]
    fn test_loosen_impulse_reactivates_only_settled() {
        let mut state = test_state(13);
        settle_everything_possible(&mut state, 2000);
        assert!(state.settled_count() > 0);

        let falling_before: Vec<(u32, Vec2)> = state
            .flakes
            .iter()
            .filter(|f| f.is_falling())
            .map(|f| (f.id, f.vel))
            .collect();
        let settled_before: Vec<u32> = state
            .flakes
            .iter()
            .filter(|f| f.is_settled())
            .map(|f| f.id)
            .collect();

        apply_impulse(
            &mut state,
            &Impulse {
                vel: Vec2::new(2.0, -1.0),
                mode: ImpulseMode::Loosen,
            },
        );

        assert_eq!(state.settled_count(), 0);
        assert_membership(&state);
        for id in settled_before {
            let flake = state.flakes.iter().find(|f| f.id == id).unwrap();
            assert!(flake.is_falling() && flake.shaken);
        }
        // Falling flakes kept their motion untouched
        for (id, vel) in falling_before {
            let flake = state.flakes.iter().find(|f| f.id == id).unwrap();
            assert_eq!(flake.vel, vel);
        }
    }

    #[test]
    fn test_settled_flake_fling_exact_range() {
        let mut state = test_state(17);
        settle_everything_possible(&mut state, 2000);
        let id = state
            .flakes
            .iter()
            .find(|f| f.is_settled())
            .map(|f| f.id)
            .expect("something settled in 2000 ticks");

        apply_impulse(
            &mut state,
            &Impulse {
                vel: Vec2::new(3.0, -2.0),
                mode: ImpulseMode::Loosen,
            },
        );

        let flake = state.flakes.iter().find(|f| f.id == id).unwrap();
        assert!(flake.is_falling());
        assert!(!state.ground.contains(id));
        // scale 2, noise 0.5
        assert!(flake.vel.x >= 5.5 && flake.vel.x <= 6.5);
        assert!(flake.vel.y >= -4.5 && flake.vel.y <= -3.5);
        assert!(flake.shaken);
    }

    #[test]
    fn test_impulse_decorrelates_flakes() {
        let mut state = test_state(19);
        apply_impulse(
            &mut state,
            &Impulse {
                vel: Vec2::new(3.0, 0.0),
                mode: ImpulseMode::Reset,
            },
        );

        let n = state.flakes.len() as f32;
        let mean: f32 = state.flakes.iter().map(|f| f.vel.x).sum::<f32>() / n;
        let var: f32 = state
            .flakes
            .iter()
            .map(|f| (f.vel.x - mean).powi(2))
            .sum::<f32>()
            / n;

        assert!((mean - 6.0).abs() < 0.2);
        assert!(var > 0.0);
    }

    #[test]
    fn test_empty_flake_set_is_noop() {
        let mut tuning = Tuning::default();
        tuning.flake_count = 0;
        let mut state = SnowState::new(GlobeGeometry::square(300.0), tuning, 1);

        tick(&mut state);
        apply_impulse(
            &mut state,
            &Impulse {
                vel: Vec2::new(5.0, 5.0),
                mode: ImpulseMode::Reset,
            },
        );
        assert_eq!(state.time_ticks, 1);
        assert!(state.flakes.is_empty());
        assert!(state.ground.is_empty());
    }

    #[test]
    fn test_fall_speed_converges_to_steady_state() {
        // A globe with its floor far below the flakes, so nothing reaches
        // the ground while the velocities relax.
        let geom = GlobeGeometry {
            center_x: 150.0,
            center_y: 5.0e5,
            radius: 150.0,
            canvas_width: 300.0,
            canvas_height: 1.0e6,
        };
        let mut state = SnowState::new(geom, Tuning::default(), 23);
        for flake in state.flakes.iter_mut() {
            flake.pos.y = 10.0;
            flake.shaken = false;
        }

        settle_everything_possible(&mut state, 1000);

        let tuning = &state.tuning;
        // Fixed point of vy -> max(vy + g, min_vy) * y_damp
        let drift_terminal = tuning.gravity * tuning.y_damp / (1.0 - tuning.y_damp);
        for flake in &state.flakes {
            assert!(flake.is_falling());
            let expected = drift_terminal.max(flake.min_vy * tuning.y_damp);
            assert!(
                (flake.vel.y - expected).abs() < 0.05,
                "vy {} expected near {}",
                flake.vel.y,
                expected
            );
        }
    }

    #[test]
    fn test_determinism() {
        let mut a = test_state(99);
        let mut b = test_state(99);
        let shake = Impulse {
            vel: Vec2::new(-2.5, 1.0),
            mode: ImpulseMode::Reset,
        };

        for i in 0..600 {
            tick(&mut a);
            tick(&mut b);
            if i == 300 {
                apply_impulse(&mut a, &shake);
                apply_impulse(&mut b, &shake);
            }
        }

        assert_eq!(a.time_ticks, b.time_ticks);
        assert_eq!(a.settled_count(), b.settled_count());
        for (fa, fb) in a.flakes.iter().zip(b.flakes.iter()) {
            assert_eq!(fa.pos, fb.pos);
            assert_eq!(fa.vel, fb.vel);
            assert_eq!(fa.state, fb.state);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_membership_holds_for_any_seed_and_impulse(
            seed in any::<u64>(),
            vx in -10.0f32..10.0,
            vy in -10.0f32..10.0,
            loosen in any::<bool>(),
        ) {
            let mut state = test_state(seed);
            for _ in 0..300 {
                tick(&mut state);
            }
            let mode = if loosen { ImpulseMode::Loosen } else { ImpulseMode::Reset };
            apply_impulse(&mut state, &Impulse { vel: Vec2::new(vx, vy), mode });
            for _ in 0..100 {
                tick(&mut state);
            }

            for flake in &state.flakes {
                let settled = flake.is_settled();
                prop_assert_eq!(settled, state.ground.contains(flake.id));
                prop_assert!(flake.pos.is_finite());
                prop_assert!(flake.vel.is_finite());
            }
        }
    }
}
