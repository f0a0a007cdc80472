//! Collision detection and response for balls against pegs and walls
//!
//! Balls only ever touch static geometry, so every response is a one-sided
//! push-out plus a reflection of the normal velocity component.

use glam::Vec2;

use super::state::Peg;

/// Squared distance floor so coincident centers never divide by zero
const MIN_DIST_SQ: f32 = 1e-6;

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Surface normal at collision (pointing toward ball center)
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check overlap between a ball and a peg
pub fn ball_peg_collision(ball_pos: Vec2, ball_radius: f32, peg: &Peg) -> CollisionResult {
    let delta = ball_pos - peg.pos;
    let reach = ball_radius + peg.radius;
    let d2 = delta.length_squared();
    if d2 >= reach * reach {
        return CollisionResult::miss();
    }

    let d = d2.max(MIN_DIST_SQ).sqrt();
    CollisionResult {
        hit: true,
        normal: delta / d,
        penetration: reach - d,
    }
}

/// Reflect the normal component of velocity, scaled by restitution
///
/// Tangential velocity is untouched. Velocities already separating from the
/// surface are returned as-is.
#[inline]
pub fn reflect_with_restitution(velocity: Vec2, normal: Vec2, restitution: f32) -> Vec2 {
    let vn = velocity.dot(normal);
    if vn < 0.0 {
        velocity - (1.0 + restitution) * vn * normal
    } else {
        velocity
    }
}

/// Push a ball out of a peg and bounce it. Returns true on contact.
pub fn resolve_peg(pos: &mut Vec2, vel: &mut Vec2, radius: f32, peg: &Peg, restitution: f32) -> bool {
    let result = ball_peg_collision(*pos, radius, peg);
    if !result.hit {
        return false;
    }
    *pos += result.normal * result.penetration;
    *vel = reflect_with_restitution(*vel, result.normal, restitution);
    true
}

/// Clamp a ball between the side walls, bouncing it back inward
///
/// The outgoing horizontal velocity always points away from the wall that
/// was hit, whatever its sign going in.
pub fn resolve_walls(pos: &mut Vec2, vel: &mut Vec2, left: f32, right: f32, restitution: f32) -> bool {
    if pos.x < left {
        pos.x = left;
        vel.x = vel.x.abs() * restitution;
        true
    } else if pos.x > right {
        pos.x = right;
        vel.x = -vel.x.abs() * restitution;
        true
    } else {
        false
    }
}

/// Clamp position only, leaving velocity alone
#[inline]
pub fn clamp_between_walls(pos: &mut Vec2, left: f32, right: f32) {
    if pos.x < left {
        pos.x = left;
    } else if pos.x > right {
        pos.x = right;
    }
}
