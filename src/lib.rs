//! Plinko Drop - deterministic physics core for a ball drop board
//!
//! Core modules:
//! - `sim`: Deterministic simulation (board layout, physics step, state)
//! - `engine`: Lifecycle controller driven by the host's frame callback
//! - `schedule`: Cancellable delayed spawns
//! - `render`: Visual proxy abstraction (the engine never draws pixels)
//! - `events`: Landing/stats events and the results sink
//! - `settings`: Data-driven board and physics tuning

pub mod engine;
pub mod error;
pub mod events;
pub mod render;
pub mod schedule;
pub mod settings;
pub mod sim;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use engine::{Engine, EngineConfig, FrameReport};
pub use error::EngineError;
pub use events::{CallbackSink, LandingEvent, ResultsSink, StatsEvent};
pub use render::{DetachedHandles, NullProxies, ProxyHandle, VisualProxies};
pub use settings::EngineSettings;

/// Board and physics configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 5;
    /// Frame debt beyond this many seconds is dropped
    pub const MAX_ACCUMULATED: f32 = 1.0;

    /// Board margins
    pub const TOP_MARGIN: f32 = 24.0;
    pub const BOTTOM_MARGIN: f32 = 80.0;
    pub const SIDE_MARGIN: f32 = 24.0;

    /// Peg lattice
    pub const PEG_RADIUS: f32 = 6.0;
    pub const PEG_ROWS: u32 = 9;
    pub const ROW_SPACING: f32 = 52.0;
    /// First peg row sits this far below the top margin
    pub const PEG_START_OFFSET: f32 = 64.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 10.0;
    /// Balls spawn this far below the top margin
    pub const SPAWN_OFFSET: f32 = 32.0;
    /// Total horizontal spawn jitter (±half on either side of center)
    pub const SPAWN_JITTER: f32 = 12.0;
    /// Total spread of the random initial velocity
    pub const SPAWN_VX_SPREAD: f32 = 40.0;
    pub const SPAWN_VY_SPREAD: f32 = 20.0;

    /// Downward acceleration (pixels/s²)
    pub const GRAVITY: f32 = 20.0;
    /// Fraction of normal velocity kept on wall/peg contact
    pub const RESTITUTION: f32 = 0.85;
    /// Per-step velocity damping
    pub const AIR_DAMP: f32 = 0.999;

    /// Speed multiplier range
    pub const MIN_SPEED: f32 = 0.05;
    pub const MAX_SPEED: f32 = 5.0;

    /// Slot labels sit this far below the slot line
    pub const LABEL_OFFSET: f32 = 10.0;
}

