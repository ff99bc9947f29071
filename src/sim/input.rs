//! Pointer input: drag velocity tracking and the shake state machine
//!
//! The host adapts its native pointer/touch events into `PointerSample`s and
//! feeds them to an `InteractionController`; the controller turns them into
//! `Impulse` commands for the simulation. No UI toolkit types leak in here.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::state::GlobeGeometry;

/// One pointer event: position plus a host-supplied monotonic timestamp in
/// milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub x: f32,
    pub y: f32,
    pub t: f64,
}

impl PointerSample {
    pub fn new(x: f32, y: f32, t: f64) -> Self {
        Self { x, y, t }
    }

    fn pos(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Momentum-smoothed pointer velocity estimate.
///
/// An exponential moving average over per-sample instantaneous velocities:
/// smoother than raw deltas and robust to jittery per-frame sampling, which
/// makes the released fling feel natural.
#[derive(Debug, Clone)]
pub struct InputTracker {
    last: Option<PointerSample>,
    vel: Vec2,
    /// EMA decay toward history; 0 = instantaneous, 1 = frozen.
    smoothing: f32,
}

impl InputTracker {
    pub fn new(smoothing: f32) -> Self {
        Self {
            last: None,
            vel: Vec2::ZERO,
            smoothing,
        }
    }

    /// Seed the tracker at drag start.
    pub fn begin(&mut self, sample: PointerSample) {
        self.last = Some(sample);
        self.vel = Vec2::ZERO;
    }

    /// Fold in a new sample and return the smoothed velocity estimate.
    ///
    /// Defined even for a single-sample drag: with no previous sample the
    /// instantaneous velocity is zero. A degenerate time delta (`dt <= 0`)
    /// substitutes 1 so the estimate stays finite instead of going NaN.
    pub fn on_sample(&mut self, sample: PointerSample) -> Vec2 {
        let instant = match self.last {
            Some(prev) => {
                let dt = (sample.t - prev.t) as f32;
                let dt = if dt > 0.0 { dt } else { 1.0 };
                (sample.pos() - prev.pos()) / dt
            }
            None => Vec2::ZERO,
        };

        self.vel = self.smoothing * self.vel + (1.0 - self.smoothing) * instant;
        self.last = Some(sample);
        self.vel
    }

    pub fn velocity(&self) -> Vec2 {
        self.vel
    }
}

/// How an impulse treats the accumulated pack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpulseMode {
    /// Clear the snowpack and fling every flake.
    Reset,
    /// Pull settled flakes back into the air; falling flakes keep their
    /// motion and the rest of the pack stays put.
    Loosen,
}

/// A velocity injection to apply to the flake set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Impulse {
    pub vel: Vec2,
    pub mode: ImpulseMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragPhase {
    Idle,
    Dragging,
}

/// Drag/shake state machine over raw pointer events.
///
/// Velocity is tracked silently during the drag and the impulse is deferred
/// to release; drag releases always reset the whole pack, matching the
/// "pick up the globe and shake it" gesture.
#[derive(Debug, Clone)]
pub struct InteractionController {
    phase: DragPhase,
    tracker: InputTracker,
    /// Pointer offset from the globe container origin at grab time, so the
    /// host can drag the globe element in place.
    grab_offset: Vec2,
    shake_speed: f32,
}

impl InteractionController {
    pub fn new(smoothing: f32, shake_speed: f32) -> Self {
        Self {
            phase: DragPhase::Idle,
            tracker: InputTracker::new(smoothing),
            grab_offset: Vec2::ZERO,
            shake_speed,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.phase == DragPhase::Dragging
    }

    /// Pointer pressed. Engages only when the pointer lands inside the globe
    /// circle; `container_origin` is the globe element's top-left in the same
    /// coordinate space as the sample. Returns whether a drag started.
    pub fn on_pointer_down(
        &mut self,
        sample: PointerSample,
        container_origin: Vec2,
        geom: &GlobeGeometry,
    ) -> bool {
        let local = sample.pos() - container_origin;
        if !geom.contains(local.x, local.y) {
            return false;
        }

        self.phase = DragPhase::Dragging;
        self.grab_offset = local;
        self.tracker.begin(sample);
        log::debug!("drag started at ({:.1}, {:.1})", sample.x, sample.y);
        true
    }

    /// Pointer moved. While dragging, feeds the velocity tracker and returns
    /// the new container origin for the host to apply; `None` when idle.
    pub fn on_pointer_move(&mut self, sample: PointerSample) -> Option<Vec2> {
        if self.phase != DragPhase::Dragging {
            return None;
        }
        self.tracker.on_sample(sample);
        Some(sample.pos() - self.grab_offset)
    }

    /// Pointer released. Ends the drag and emits the fling impulse built from
    /// the smoothed velocity; `None` when no drag was active.
    pub fn on_pointer_up(&mut self) -> Option<Impulse> {
        if self.phase != DragPhase::Dragging {
            return None;
        }
        self.phase = DragPhase::Idle;
        let vel = self.tracker.velocity();
        log::debug!("drag released, fling velocity ({:.2}, {:.2})", vel.x, vel.y);
        Some(Impulse {
            vel,
            mode: ImpulseMode::Reset,
        })
    }

    /// Explicit shake trigger, independent of any drag: a sideways jolt with
    /// a random direction. Works regardless of the current phase.
    pub fn shake(&self, rng: &mut Pcg32) -> Impulse {
        let sign = if rng.random::<bool>() { 1.0 } else { -1.0 };
        Impulse {
            vel: Vec2::new(sign * self.shake_speed, 0.0),
            mode: ImpulseMode::Reset,
        }
    }
}
