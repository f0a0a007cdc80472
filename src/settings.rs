//! Engine settings and tuning
//!
//! Every field falls back to the board constants, so a host can override
//! just the values it cares about from a JSON blob.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::EngineError;

/// Board geometry tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardSettings {
    pub top_margin: f32,
    pub bottom_margin: f32,
    pub side_margin: f32,
    /// Number of peg rows (the last row holds one peg per slot)
    pub rows: u32,
    /// Vertical distance between peg rows
    pub row_spacing: f32,
    /// Offset of the first peg row below the top margin
    pub peg_start_offset: f32,
    pub peg_radius: f32,
    pub ball_radius: f32,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            top_margin: TOP_MARGIN,
            bottom_margin: BOTTOM_MARGIN,
            side_margin: SIDE_MARGIN,
            rows: PEG_ROWS,
            row_spacing: ROW_SPACING,
            peg_start_offset: PEG_START_OFFSET,
            peg_radius: PEG_RADIUS,
            ball_radius: BALL_RADIUS,
        }
    }
}

/// Physics constants shared by every ball
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSettings {
    pub gravity: f32,
    pub restitution: f32,
    pub air_damp: f32,
    /// Fixed step length in seconds
    pub fixed_dt: f32,
    /// Catch-up cap per frame
    pub max_substeps: u32,
    /// Most frame time, in seconds, carried over between frames
    pub max_accumulated: f32,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            restitution: RESTITUTION,
            air_damp: AIR_DAMP,
            fixed_dt: SIM_DT,
            max_substeps: MAX_SUBSTEPS,
            max_accumulated: MAX_ACCUMULATED,
        }
    }
}

/// Initial conditions for freshly dropped balls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnSettings {
    pub offset_y: f32,
    pub jitter: f32,
    pub vx_spread: f32,
    pub vy_spread: f32,
}

impl Default for SpawnSettings {
    fn default() -> Self {
        Self {
            offset_y: SPAWN_OFFSET,
            jitter: SPAWN_JITTER,
            vx_spread: SPAWN_VX_SPREAD,
            vy_spread: SPAWN_VY_SPREAD,
        }
    }
}

/// Complete engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub board: BoardSettings,
    pub physics: PhysicsSettings,
    pub spawn: SpawnSettings,
    pub min_speed: f32,
    pub max_speed: f32,
}

impl EngineSettings {
    /// Parse settings from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, EngineError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Reject settings the simulation cannot run with
    pub fn validate(&self) -> Result<(), EngineError> {
        let b = &self.board;
        let p = &self.physics;
        let s = &self.spawn;

        let invalid = |msg: &str| Err(EngineError::InvalidSettings(msg.to_string()));

        if b.rows == 0 {
            return invalid("rows must be at least 1");
        }
        if !(b.peg_radius > 0.0 && b.ball_radius > 0.0) {
            return invalid("peg and ball radius must be positive");
        }
        let margins = [b.top_margin, b.bottom_margin, b.side_margin, b.peg_start_offset];
        if margins.iter().any(|m| !m.is_finite() || *m < 0.0) {
            return invalid("margins must be finite and non-negative");
        }
        if !(b.row_spacing.is_finite() && b.row_spacing > 0.0) {
            return invalid("row spacing must be positive");
        }
        if !(p.fixed_dt.is_finite() && p.fixed_dt > 0.0) {
            return invalid("fixed timestep must be positive");
        }
        if p.max_substeps == 0 {
            return invalid("max substeps must be at least 1");
        }
        if !(p.max_accumulated.is_finite() && p.max_accumulated >= p.fixed_dt) {
            return invalid("max accumulated time must be finite and at least one step");
        }
        if !(0.0..=1.0).contains(&p.restitution) {
            return invalid("restitution must be within [0, 1]");
        }
        if !(p.air_damp > 0.0 && p.air_damp <= 1.0) {
            return invalid("air damping must be within (0, 1]");
        }
        if !p.gravity.is_finite() {
            return invalid("gravity must be finite");
        }
        if [s.offset_y, s.jitter, s.vx_spread, s.vy_spread]
            .iter()
            .any(|v| !v.is_finite() || *v < 0.0)
        {
            return invalid("spawn parameters must be finite and non-negative");
        }
        if !(self.min_speed > 0.0 && self.min_speed <= self.max_speed && self.max_speed.is_finite()) {
            return invalid("speed range must satisfy 0 < min <= max");
        }
        Ok(())
    }

    /// Clamp a requested speed multiplier into the configured range
    pub fn clamp_speed(&self, speed: f32) -> f32 {
        if speed.is_nan() {
            return self.min_speed;
        }
        speed.clamp(self.min_speed, self.max_speed)
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            board: BoardSettings::default(),
            physics: PhysicsSettings::default(),
            spawn: SpawnSettings::default(),
            min_speed: MIN_SPEED,
            max_speed: MAX_SPEED,
        }
    }
}
