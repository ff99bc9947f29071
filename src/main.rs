//! Headless demo driver
//!
//! Exercises the full public API without a renderer: builds the canonical
//! globe, lets snow settle, replays a scripted drag gesture through the
//! interaction controller, applies the released fling, and finishes with an
//! explicit shake. Run with `RUST_LOG=debug` to watch the impulses.

use glam::Vec2;

use snow_globe::sim::{
    GlobeGeometry, InteractionController, PointerSample, SnowState, apply_impulse, tick,
};
use snow_globe::tuning::Tuning;

/// Canonical globe size, matching a 300x300 canvas.
const GLOBE_SIZE: f32 = 300.0;

fn run_ticks(state: &mut SnowState, n: u64) {
    for _ in 0..n {
        tick(state);
    }
}

fn report(state: &SnowState, label: &str) {
    let falling = state.flakes.iter().filter(|f| f.is_falling()).count();
    log::info!(
        "{label}: tick {}, {} falling, {} settled, pack height at center {:.1}",
        state.time_ticks,
        falling,
        state.settled_count(),
        state.ground_height_at(state.geom.center_x)
    );
}

fn main() {
    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(42u64);

    let geom = GlobeGeometry::square(GLOBE_SIZE);
    let tuning = Tuning::default();
    let mut controller = InteractionController::new(tuning.drag_smoothing, tuning.shake_speed);
    let mut state = SnowState::new(geom, tuning, seed);

    // Let the first snowfall accumulate
    run_ticks(&mut state, 1200);
    report(&state, "after initial snowfall");

    // A quick rightward drag across the globe, sampled every 16ms
    let started = controller.on_pointer_down(
        PointerSample::new(120.0, 150.0, 0.0),
        Vec2::ZERO,
        &state.geom,
    );
    debug_assert!(started);
    for i in 1..=12 {
        controller.on_pointer_move(PointerSample::new(
            120.0 + i as f32 * 12.0,
            150.0 - i as f32 * 2.0,
            i as f64 * 16.0,
        ));
    }
    if let Some(impulse) = controller.on_pointer_up() {
        apply_impulse(&mut state, &impulse);
    }
    report(&state, "after drag release");

    run_ticks(&mut state, 1200);
    report(&state, "after the pack reformed");

    // An explicit shake, no drag involved
    let impulse = controller.shake(&mut state.rng);
    apply_impulse(&mut state, &impulse);
    run_ticks(&mut state, 600);
    report(&state, "after shake");
}
