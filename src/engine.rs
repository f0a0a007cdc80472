//! Lifecycle controller
//!
//! `Engine` owns the simulation state, the current board layout and the
//! pending spawn schedule. The host calls `frame` once per rendered frame
//! and issues the lifecycle operations in between; nothing else mutates
//! engine state.
//!
//! Per frame: due spawns fire, the fixed-step integrator consumes the
//! accumulated time, landings are reported, then every surviving ball's
//! visual is moved exactly once.

use std::sync::Arc;

use glam::Vec2;

use crate::error::EngineError;
use crate::events::{LandingEvent, ResultsSink, StatsEvent};
use crate::render::{VisualProxies, sync_positions};
use crate::schedule::{SpawnSchedule, SpawnTaskId};
use crate::settings::EngineSettings;
use crate::sim::{self, Ball, BoardDims, BoardLayout, Landing, SimState};

/// Seed used when the host does not supply one
pub const DEFAULT_SEED: u64 = 0x5EED_B0A2D;

/// Engine construction parameters
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub width: f32,
    pub height: f32,
    /// One multiplier per slot, left to right
    pub multipliers: Vec<f32>,
    pub seed: u64,
    pub settings: EngineSettings,
}

impl EngineConfig {
    pub fn new(width: f32, height: f32, multipliers: Vec<f32>) -> Self {
        Self {
            width,
            height,
            multipliers,
            seed: DEFAULT_SEED,
            settings: EngineSettings::default(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Reject configurations the board cannot be built from
    pub fn validate(&self) -> Result<(), EngineError> {
        self.settings.validate()?;

        if self.multipliers.is_empty() {
            return Err(EngineError::NoSlots);
        }
        if let Some((index, &value)) = self
            .multipliers
            .iter()
            .enumerate()
            .find(|(_, m)| !m.is_finite() || **m < 0.0)
        {
            return Err(EngineError::InvalidMultiplier { index, value });
        }

        let (width, height) = (self.width, self.height);
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(EngineError::InvalidDimensions { width, height });
        }

        let board = &self.settings.board;
        let min_width = board.side_margin * 2.0;
        if width <= min_width {
            return Err(EngineError::BoardTooNarrow {
                width,
                min: min_width,
            });
        }
        let min_height = board.top_margin + board.bottom_margin;
        if height <= min_height {
            return Err(EngineError::BoardTooShort {
                height,
                min: min_height,
            });
        }
        Ok(())
    }
}

/// What a single `frame` call did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Fixed steps executed
    pub steps: u32,
    /// Delayed spawns that fired
    pub spawned: usize,
    /// Balls that reached a slot
    pub landed: usize,
}

/// The ball drop engine
///
/// Dropping the engine tears it down exactly like `destroy`.
pub struct Engine<P = Box<dyn VisualProxies>, S = Box<dyn ResultsSink>>
where
    P: VisualProxies,
    S: ResultsSink,
{
    settings: EngineSettings,
    layout: Arc<BoardLayout>,
    state: SimState,
    schedule: SpawnSchedule,
    proxies: P,
    sink: S,
    landings: Vec<Landing>,
    torn_down: bool,
}

impl<P, S> Engine<P, S>
where
    P: VisualProxies,
    S: ResultsSink,
{
    /// Create an engine and build the initial board
    pub fn new(config: EngineConfig, mut proxies: P, sink: S) -> Result<Self, EngineError> {
        config.validate()?;

        let EngineConfig {
            width,
            height,
            multipliers,
            seed,
            settings,
        } = config;

        let layout = Arc::new(BoardLayout::build(
            BoardDims::new(width, height),
            &settings.board,
            &multipliers,
        ));
        proxies.board_rebuilt(&layout);

        let mut state = SimState::new(seed);
        state.speed = settings.clamp_speed(1.0);

        log::info!(
            "Plinko engine created: {}x{} board, {} slots, {} pegs, seed {}",
            width,
            height,
            layout.slot_count(),
            layout.pegs.len(),
            seed
        );

        Ok(Self {
            settings,
            layout,
            state,
            schedule: SpawnSchedule::new(),
            proxies,
            sink,
            landings: Vec::new(),
            torn_down: false,
        })
    }

    /// Drop `count` balls
    ///
    /// With `interval_ms == 0` every ball spawns now. Otherwise one ball
    /// spawns every `interval_ms`, the first on the next frame; the returned
    /// task IDs can be cancelled individually.
    pub fn drop_balls(&mut self, count: u32, interval_ms: u32) -> Vec<SpawnTaskId> {
        if interval_ms == 0 {
            for _ in 0..count {
                self.spawn_ball();
            }
            log::debug!("Dropped {} balls ({} in flight)", count, self.state.balls.len());
            return Vec::new();
        }

        let ids: Vec<_> = (0..count)
            .map(|i| self.schedule.schedule(f64::from(i) * f64::from(interval_ms)))
            .collect();
        log::debug!(
            "Scheduled {} balls every {}ms ({} pending)",
            count,
            interval_ms,
            self.schedule.len()
        );
        ids
    }

    /// Cancel one pending delayed spawn
    pub fn cancel_spawn(&mut self, id: SpawnTaskId) -> bool {
        self.schedule.cancel(id)
    }

    /// Cancel pending spawns and clear every ball. Board geometry is kept.
    pub fn reset(&mut self) {
        let cancelled = self.schedule.cancel_all();
        let cleared = self.clear_balls();
        log::debug!("Reset: {} balls cleared, {} spawns cancelled", cleared, cancelled);
    }

    /// Set the displacement multiplier; out-of-range values are clamped
    pub fn set_speed(&mut self, speed: f32) {
        self.state.speed = self.settings.clamp_speed(speed);
    }

    /// Rebuild the board for new dimensions and clear in-flight balls
    pub fn resize(&mut self, width: f32, height: f32) {
        let dims = BoardDims::new(floor_dimension(width), floor_dimension(height));

        let board = &self.settings.board;
        if dims.width <= board.side_margin * 2.0 || dims.height <= board.top_margin + board.bottom_margin {
            log::warn!(
                "Resize to {}x{} leaves no playable board area",
                dims.width,
                dims.height
            );
        }

        // Build the replacement fully before swapping it in
        let layout = Arc::new(BoardLayout::build(dims, board, &self.layout.multipliers));
        self.layout = layout;
        self.proxies.board_rebuilt(&self.layout);
        log::info!(
            "Board resized to {}x{} ({} pegs)",
            dims.width,
            dims.height,
            self.layout.pegs.len()
        );

        self.reset();
    }

    /// Tear the engine down: cancel spawns, clear balls, release visuals
    pub fn destroy(mut self) {
        self.teardown();
    }

    /// Advance by one rendered frame of `elapsed` seconds
    pub fn frame(&mut self, elapsed: f32) -> FrameReport {
        let elapsed_ms = if elapsed.is_finite() {
            f64::from(elapsed) * 1000.0
        } else {
            0.0
        };
        let due = self.schedule.advance(elapsed_ms);
        for _ in &due {
            self.spawn_ball();
        }

        let steps = sim::advance(
            &mut self.state,
            &self.layout,
            &self.settings.physics,
            elapsed,
            &mut self.landings,
        );

        let landed = self.landings.len();
        for landing in self.landings.drain(..) {
            self.proxies.destroy(landing.ball.proxy);
            self.sink.on_landing(LandingEvent {
                slot_index: landing.slot_index,
                multiplier: landing.multiplier,
            });
            self.sink.on_stats(StatsEvent {
                balls_in_flight: landing.balls_after,
            });
        }

        sync_positions(&mut self.proxies, &self.state.balls);

        FrameReport {
            steps,
            spawned: due.len(),
            landed,
        }
    }

    pub fn balls_in_flight(&self) -> usize {
        self.state.balls.len()
    }

    pub fn balls(&self) -> &[Ball] {
        &self.state.balls
    }

    pub fn ball_positions(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.state.balls.iter().map(|b| b.pos)
    }

    pub fn speed(&self) -> f32 {
        self.state.speed
    }

    pub fn layout(&self) -> &BoardLayout {
        &self.layout
    }

    /// Shared handle to the current layout snapshot
    pub fn layout_snapshot(&self) -> Arc<BoardLayout> {
        Arc::clone(&self.layout)
    }

    /// Unconsumed frame time in seconds
    pub fn accumulator(&self) -> f32 {
        self.state.accumulator
    }

    /// Fixed steps executed since creation
    pub fn time_ticks(&self) -> u64 {
        self.state.time_ticks
    }

    pub fn pending_spawns(&self) -> usize {
        self.schedule.len()
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn proxies(&self) -> &P {
        &self.proxies
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn spawn_ball(&mut self) {
        let spawn = &self.settings.spawn;
        let layout = &self.layout;

        let x = layout.center_x() + self.state.centered_random(spawn.jitter);
        let y = layout.top_margin + spawn.offset_y;
        let vx = self.state.centered_random(spawn.vx_spread);
        let vy = self.state.centered_random(spawn.vy_spread);
        let pos = Vec2::new(x, y);

        let proxy = self.proxies.create(pos);
        let id = self.state.next_entity_id();
        let ball = Ball::new(id, pos, Vec2::new(vx, vy), proxy)
            .with_radius(self.settings.board.ball_radius);
        self.state.balls.push(ball);

        self.sink.on_stats(StatsEvent {
            balls_in_flight: self.state.balls.len(),
        });
    }

    /// Remove every ball and its visual, then report zero in flight
    fn clear_balls(&mut self) -> usize {
        let balls = self.state.take_balls();
        for ball in &balls {
            self.proxies.destroy(ball.proxy);
        }
        self.sink.on_stats(StatsEvent { balls_in_flight: 0 });
        balls.len()
    }

    fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.schedule.cancel_all();
        self.clear_balls();
        self.proxies.release();
        log::info!("Plinko engine destroyed after {} steps", self.state.time_ticks);
    }
}

impl<P, S> Drop for Engine<P, S>
where
    P: VisualProxies,
    S: ResultsSink,
{
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Floor a host-reported dimension at one pixel
fn floor_dimension(v: f32) -> f32 {
    if v.is_finite() { v.max(1.0) } else { 1.0 }
}
