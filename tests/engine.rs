//! End-to-end engine behaviour through the public API

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use glam::Vec2;
use plinko_drop::sim::{BoardDims, BoardLayout};
use plinko_drop::{
    Engine, EngineConfig, EngineSettings, LandingEvent, ProxyHandle, ResultsSink, StatsEvent, VisualProxies,
};
use proptest::prelude::*;

const MULTIPLIERS: [f32; 9] = [0.5, 1.0, 2.0, 3.0, 5.0, 3.0, 2.0, 1.0, 0.5];
const FRAME: f32 = 1.0 / 60.0;

#[derive(Debug, Default)]
struct ProxyLog {
    next: u64,
    live: HashSet<ProxyHandle>,
    /// Position updates received during the most recent frame
    moves: Vec<(ProxyHandle, Vec2)>,
    rebuilds: usize,
    released: bool,
}

#[derive(Clone, Default)]
struct Proxies(Rc<RefCell<ProxyLog>>);

impl VisualProxies for Proxies {
    fn create(&mut self, _pos: Vec2) -> ProxyHandle {
        let mut log = self.0.borrow_mut();
        log.next += 1;
        let handle = ProxyHandle(log.next);
        log.live.insert(handle);
        handle
    }

    fn set_position(&mut self, handle: ProxyHandle, pos: Vec2) {
        let mut log = self.0.borrow_mut();
        assert!(log.live.contains(&handle), "moved a destroyed proxy");
        log.moves.push((handle, pos));
    }

    fn destroy(&mut self, handle: ProxyHandle) {
        assert!(self.0.borrow_mut().live.remove(&handle), "double destroy");
    }

    fn board_rebuilt(&mut self, _layout: &BoardLayout) {
        self.0.borrow_mut().rebuilds += 1;
    }

    fn release(&mut self) {
        self.0.borrow_mut().released = true;
    }
}

#[derive(Debug, Default)]
struct SinkLog {
    landings: Vec<LandingEvent>,
    stats: Vec<usize>,
}

#[derive(Clone, Default)]
struct Sink(Rc<RefCell<SinkLog>>);

impl ResultsSink for Sink {
    fn on_landing(&mut self, event: LandingEvent) {
        self.0.borrow_mut().landings.push(event);
    }

    fn on_stats(&mut self, event: StatsEvent) {
        self.0.borrow_mut().stats.push(event.balls_in_flight);
    }
}

struct Harness {
    engine: Engine<Proxies, Sink>,
    proxies: Rc<RefCell<ProxyLog>>,
    sink: Rc<RefCell<SinkLog>>,
}

impl Harness {
    fn new(seed: u64) -> Self {
        Self::with_config(EngineConfig::new(800.0, 700.0, MULTIPLIERS.to_vec()).with_seed(seed))
    }

    fn with_config(config: EngineConfig) -> Self {
        let proxies = Proxies::default();
        let sink = Sink::default();
        let (p, s) = (proxies.0.clone(), sink.0.clone());
        let engine = Engine::new(config, proxies, sink).expect("valid config");
        Self {
            engine,
            proxies: p,
            sink: s,
        }
    }

    fn last_stats(&self) -> Option<usize> {
        self.sink.borrow().stats.last().copied()
    }

    fn frame(&mut self, elapsed: f32) {
        self.proxies.borrow_mut().moves.clear();
        self.engine.frame(elapsed);
    }

    /// Run frames until nothing is in flight or pending
    fn run_until_empty(&mut self, max_frames: usize) -> usize {
        for n in 0..max_frames {
            if self.engine.balls_in_flight() == 0 && self.engine.pending_spawns() == 0 {
                return n;
            }
            self.frame(FRAME);
        }
        panic!("balls still in flight after {max_frames} frames");
    }
}

#[test]
fn drop_then_reset_clears_everything() {
    let mut h = Harness::new(1);
    h.engine.drop_balls(10, 0);
    assert_eq!(h.last_stats(), Some(10));
    assert_eq!(h.engine.balls_in_flight(), 10);
    assert_eq!(h.proxies.borrow().live.len(), 10);

    h.engine.reset();
    assert_eq!(h.last_stats(), Some(0));
    assert_eq!(h.engine.balls_in_flight(), 0);
    assert!(h.proxies.borrow().live.is_empty());

    for _ in 0..600 {
        h.frame(FRAME);
    }
    assert!(h.sink.borrow().landings.is_empty());
}

#[test]
fn reset_is_idempotent() {
    let mut h = Harness::new(2);
    h.engine.drop_balls(3, 0);
    h.engine.reset();
    assert_eq!(h.last_stats(), Some(0));
    h.engine.reset();
    assert_eq!(h.last_stats(), Some(0));
    assert!(h.sink.borrow().landings.is_empty());
}

#[test]
fn resize_clears_balls_and_rebuilds_board() {
    let mut h = Harness::new(3);
    h.engine.drop_balls(5, 0);
    for _ in 0..10 {
        h.frame(FRAME);
    }
    assert_eq!(h.engine.balls_in_flight(), 5);

    h.engine.resize(1024.0, 900.0);
    assert_eq!(h.last_stats(), Some(0));
    assert_eq!(h.engine.balls_in_flight(), 0);
    assert!(h.proxies.borrow().live.is_empty());
    assert_eq!(h.proxies.borrow().rebuilds, 2);

    let fresh = BoardLayout::build(
        BoardDims::new(1024.0, 900.0),
        &h.engine.settings().board,
        &MULTIPLIERS,
    );
    assert_eq!(h.engine.layout().pegs, fresh.pegs);
    assert_eq!(h.engine.layout().slot_edges, fresh.slot_edges);
    assert_eq!(h.engine.layout().slot_line_y, fresh.slot_line_y);
}

#[test]
fn resize_cancels_pending_spawns() {
    let mut h = Harness::new(4);
    h.engine.drop_balls(5, 100);
    h.engine.resize(640.0, 600.0);
    for _ in 0..120 {
        h.frame(FRAME);
    }
    assert_eq!(h.engine.balls_in_flight(), 0);
    assert_eq!(h.engine.pending_spawns(), 0);
}

#[test]
fn every_ball_eventually_lands_once() {
    let mut h = Harness::new(5);
    h.engine.drop_balls(25, 0);
    h.run_until_empty(60 * 120);

    let sink = h.sink.borrow();
    assert_eq!(sink.landings.len(), 25);
    for event in &sink.landings {
        assert!(event.slot_index < MULTIPLIERS.len());
        assert_eq!(event.multiplier, MULTIPLIERS[event.slot_index]);
    }
    assert_eq!(sink.stats.last(), Some(&0));
    assert!(h.proxies.borrow().live.is_empty());
}

#[test]
fn stats_follow_every_count_change() {
    let mut h = Harness::new(6);
    h.engine.drop_balls(4, 0);
    assert_eq!(h.sink.borrow().stats, vec![1, 2, 3, 4]);

    h.run_until_empty(60 * 120);
    let sink = h.sink.borrow();
    // One stats event per spawn plus one per landing
    assert_eq!(sink.stats.len(), 4 + 4);
    assert_eq!(sink.stats.last(), Some(&0));
}

#[test]
fn simultaneous_landings_report_each_count() {
    // No jitter and no pegs above the slot line: both balls follow one path
    let mut settings = EngineSettings::default();
    settings.spawn.jitter = 0.0;
    settings.spawn.vx_spread = 0.0;
    settings.spawn.vy_spread = 0.0;
    settings.board.peg_start_offset = 2000.0;
    let config = EngineConfig::new(800.0, 700.0, MULTIPLIERS.to_vec()).with_settings(settings);
    let mut h = Harness::with_config(config);

    h.engine.drop_balls(2, 0);
    h.run_until_empty(60 * 120);

    let sink = h.sink.borrow();
    assert_eq!(sink.landings.len(), 2);
    assert_eq!(sink.stats, vec![1, 2, 1, 0]);
}

#[test]
fn identical_seeds_give_identical_runs() {
    let run = |seed: u64| {
        let mut h = Harness::new(seed);
        h.engine.drop_balls(8, 0);
        let mut trace = Vec::new();
        for i in 0..60 * 60 {
            // Uneven frame times, same on both runs
            h.frame(if i % 3 == 0 { 0.021 } else { 0.014 });
            trace.extend(h.engine.ball_positions());
            if h.engine.balls_in_flight() == 0 {
                break;
            }
        }
        let slots: Vec<_> = h.sink.borrow().landings.iter().map(|e| e.slot_index).collect();
        (trace, slots)
    };

    let (trace_a, slots_a) = run(99);
    let (trace_b, slots_b) = run(99);
    assert_eq!(trace_a, trace_b);
    assert_eq!(slots_a, slots_b);
    assert_eq!(slots_a.len(), 8);
}

#[test]
fn positions_synced_once_per_frame() {
    let mut h = Harness::new(7);
    h.engine.drop_balls(6, 0);
    // A long frame runs several fixed steps
    h.frame(5.0 / 60.0);

    let proxies = h.proxies.borrow();
    assert_eq!(proxies.moves.len(), 6);
    let unique: HashSet<_> = proxies.moves.iter().map(|(handle, _)| *handle).collect();
    assert_eq!(unique.len(), 6);

    for ((_, pos), ball) in proxies.moves.iter().zip(h.engine.balls()) {
        assert_eq!(*pos, ball.pos);
    }
}

#[test]
fn catch_up_is_capped_per_frame() {
    let mut h = Harness::new(8);
    h.engine.drop_balls(1, 0);
    let before = h.engine.time_ticks();
    let report = h.engine.frame(1.0);
    assert_eq!(report.steps, 5);
    assert_eq!(h.engine.time_ticks() - before, 5);
    assert!((h.engine.accumulator() - (1.0 - 5.0 * FRAME)).abs() < 1e-4);
}

#[test]
fn interval_drop_spawns_one_per_interval() {
    let mut h = Harness::new(9);
    let ids = h.engine.drop_balls(3, 100);
    assert_eq!(ids.len(), 3);
    assert_eq!(h.engine.balls_in_flight(), 0);
    assert_eq!(h.engine.pending_spawns(), 3);

    // First spawn fires on the next frame
    h.frame(FRAME);
    assert_eq!(h.engine.balls_in_flight(), 1);

    // 100ms later the second one
    for _ in 0..6 {
        h.frame(FRAME);
    }
    assert_eq!(h.engine.balls_in_flight(), 2);
    assert_eq!(h.engine.pending_spawns(), 1);
}

#[test]
fn reset_cancels_pending_spawns() {
    let mut h = Harness::new(10);
    h.engine.drop_balls(10, 50);
    h.frame(FRAME);
    assert_eq!(h.engine.balls_in_flight(), 1);

    h.engine.reset();
    assert_eq!(h.engine.pending_spawns(), 0);
    // Long stall: every cancelled task would be overdue by now
    h.frame(10.0);
    for _ in 0..60 {
        h.frame(FRAME);
    }
    assert_eq!(h.engine.balls_in_flight(), 0);
    assert_eq!(h.proxies.borrow().next, 1);
}

#[test]
fn individual_spawn_can_be_cancelled() {
    let mut h = Harness::new(11);
    let ids = h.engine.drop_balls(3, 100);
    assert!(h.engine.cancel_spawn(ids[1]));
    assert!(!h.engine.cancel_spawn(ids[1]));
    for _ in 0..30 {
        h.frame(FRAME);
    }
    assert_eq!(h.proxies.borrow().next, 2);
}

#[test]
fn destroy_releases_everything() {
    let mut h = Harness::new(12);
    h.engine.drop_balls(4, 0);
    h.engine.drop_balls(4, 100);

    let Harness {
        engine,
        proxies,
        sink,
    } = h;
    engine.destroy();

    let proxies = proxies.borrow();
    assert!(proxies.released);
    assert!(proxies.live.is_empty());
    assert_eq!(proxies.next, 4);
    assert_eq!(sink.borrow().stats.last(), Some(&0));
}

proptest! {
    #[test]
    fn balls_stay_within_walls(
        seed in any::<u64>(),
        slots in 2usize..40,
        count in 1u32..12,
        speed in 0.05f32..5.0,
        frames in prop::collection::vec(0.0f32..0.1, 1..200),
    ) {
        let config = EngineConfig::new(800.0, 700.0, vec![1.0; slots]).with_seed(seed);
        let mut h = Harness::with_config(config);
        h.engine.set_speed(speed);
        h.engine.drop_balls(count, 0);
        let (left, right) = h.engine.layout().inner_bounds(h.engine.settings().board.ball_radius);
        for elapsed in frames {
            h.frame(elapsed);
            for pos in h.engine.ball_positions() {
                prop_assert!(pos.x >= left && pos.x <= right, "x {} outside [{}, {}]", pos.x, left, right);
            }
        }
    }

    #[test]
    fn stats_match_live_count(
        seed in any::<u64>(),
        ops in prop::collection::vec(0u8..4, 1..60),
    ) {
        let mut h = Harness::new(seed);
        for op in ops {
            match op {
                0 => h.engine.drop_balls(2, 0).len(),
                1 => h.engine.drop_balls(2, 30).len(),
                2 => { h.engine.reset(); 0 }
                _ => { h.frame(0.05); 0 }
            };
            if let Some(last) = h.last_stats() {
                prop_assert_eq!(last, h.engine.balls_in_flight());
            }
        }
    }
}
