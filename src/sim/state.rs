//! Simulation state and core entity types
//!
//! Owned exclusively by the engine; hosts only read counts and events.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::render::ProxyHandle;

/// A fixed obstacle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Peg {
    pub pos: Vec2,
    pub radius: f32,
}

/// A falling ball
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Host-side sprite standing in for this ball
    pub proxy: ProxyHandle,
}

impl Ball {
    pub fn new(id: u32, pos: Vec2, vel: Vec2, proxy: ProxyHandle) -> Self {
        Self {
            id,
            pos,
            vel,
            radius: BALL_RADIUS,
            proxy,
        }
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }
}

/// RNG state wrapper for serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub stream: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, stream: 0 }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::new(self.seed, self.stream)
    }
}

/// Live simulation state
#[derive(Debug, Clone)]
pub struct SimState {
    pub rng_state: RngState,
    /// Balls in flight (spawn order)
    pub balls: Vec<Ball>,
    /// Displacement multiplier, already clamped by the engine
    pub speed: f32,
    /// Unconsumed frame time in seconds
    pub accumulator: f32,
    /// Fixed steps executed since creation
    pub time_ticks: u64,
    rng: Pcg32,
    next_id: u32,
}

impl SimState {
    pub fn new(seed: u64) -> Self {
        let rng_state = RngState::new(seed);
        let rng = rng_state.to_rng();
        Self {
            rng_state,
            balls: Vec::new(),
            speed: 1.0,
            accumulator: 0.0,
            time_ticks: 0,
            rng,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Uniform sample in `[-spread / 2, spread / 2)`
    pub fn centered_random(&mut self, spread: f32) -> f32 {
        (self.rng.random::<f32>() - 0.5) * spread
    }

    /// Remove every ball, handing back their proxies for cleanup
    pub fn take_balls(&mut self) -> Vec<Ball> {
        std::mem::take(&mut self.balls)
    }
}
