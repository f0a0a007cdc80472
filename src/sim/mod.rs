//! Deterministic simulation module
//!
//! All physics lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod board;
pub mod collision;
pub mod state;
pub mod tick;

pub use board::{BoardDims, BoardLayout};
pub use collision::{CollisionResult, ball_peg_collision, reflect_with_restitution};
pub use state::{Ball, Peg, RngState, SimState};
pub use tick::{Landing, advance, step};
