//! Fixed timestep simulation tick
//!
//! `step` advances every live ball by exactly one fixed slice. `advance`
//! feeds variable frame time through the accumulator, capped at
//! `max_substeps` slices per frame.

use super::board::BoardLayout;
use super::collision::{clamp_between_walls, resolve_peg, resolve_walls};
use super::state::{Ball, SimState};
use crate::settings::PhysicsSettings;

/// A ball that crossed the landing line during a step
#[derive(Debug, Clone)]
pub struct Landing {
    pub ball: Ball,
    /// Always within `[0, slots - 1]`
    pub slot_index: usize,
    pub multiplier: f32,
    /// Balls still in flight right after this one was removed
    pub balls_after: usize,
}

/// Advance every ball by one fixed timestep
///
/// Landed balls are removed from `state` and appended to `landings`.
pub fn step(
    state: &mut SimState,
    layout: &BoardLayout,
    physics: &PhysicsSettings,
    landings: &mut Vec<Landing>,
) {
    let dt = physics.fixed_dt;
    let speed = state.speed;

    let mut i = 0;
    while i < state.balls.len() {
        let ball = &mut state.balls[i];
        let (left, right) = layout.inner_bounds(ball.radius);

        ball.vel.y += physics.gravity * dt;
        ball.vel *= physics.air_damp;

        // Speed scales displacement only, never the stored velocity
        ball.pos += ball.vel * dt * speed;

        resolve_walls(&mut ball.pos, &mut ball.vel, left, right, physics.restitution);

        for peg in &layout.pegs {
            resolve_peg(&mut ball.pos, &mut ball.vel, ball.radius, peg, physics.restitution);
        }

        // A peg next to a wall can push the ball back out of bounds
        clamp_between_walls(&mut ball.pos, left, right);

        if ball.pos.y >= layout.landing_y(ball.radius) {
            let slot_index = layout.slot_for_x(ball.pos.x);
            let ball = state.balls.remove(i);
            log::trace!("Ball {} landed in slot {}", ball.id, slot_index);
            landings.push(Landing {
                ball,
                slot_index,
                multiplier: layout.multiplier(slot_index),
                balls_after: state.balls.len(),
            });
            continue;
        }

        i += 1;
    }

    state.time_ticks += 1;
}

/// Consume `elapsed` seconds of frame time. Returns the number of steps run.
///
/// At most `max_substeps` steps run per call; whatever is left stays in the
/// accumulator for the next frame. The carried debt never exceeds
/// `max_accumulated` seconds, so a long stall is dropped rather than replayed.
pub fn advance(
    state: &mut SimState,
    layout: &BoardLayout,
    physics: &PhysicsSettings,
    elapsed: f32,
    landings: &mut Vec<Landing>,
) -> u32 {
    if elapsed.is_finite() && elapsed > 0.0 {
        state.accumulator += elapsed;
    }
    if state.accumulator > physics.max_accumulated {
        log::debug!(
            "Dropping {:.3}s of frame debt after a stall",
            state.accumulator - physics.max_accumulated
        );
        state.accumulator = physics.max_accumulated;
    }

    let dt = physics.fixed_dt;
    let mut substeps = 0;
    while state.accumulator >= dt && substeps < physics.max_substeps {
        step(state, layout, physics, landings);
        state.accumulator -= dt;
        substeps += 1;
    }

    if state.accumulator >= dt {
        log::debug!(
            "Catch-up capped at {} steps, {:.3}s carried over",
            substeps,
            state.accumulator
        );
    }

    substeps
}
