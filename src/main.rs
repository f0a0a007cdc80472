//! Plinko Drop entry point
//!
//! Native builds run a headless drop and log where the balls landed. The
//! browser build is driven from JS through `plinko_drop::web`.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Plinko Drop (native) starting...");

    if let Err(e) = headless::run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is web::start, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::cell::RefCell;
    use std::rc::Rc;

    use plinko_drop::consts::SIM_DT;
    use plinko_drop::{
        CallbackSink, Engine, EngineConfig, EngineError, EngineSettings, LandingEvent,
        NullProxies, StatsEvent,
    };

    const MULTIPLIERS: [f32; 9] = [0.5, 1.0, 2.0, 3.0, 5.0, 3.0, 2.0, 1.0, 0.5];
    const BALLS: u32 = 100;
    /// Give up after ten simulated minutes
    const MAX_FRAMES: u32 = 60 * 60 * 10;

    pub fn run() -> Result<(), EngineError> {
        let mut args = std::env::args().skip(1);
        let seed = args
            .next()
            .and_then(|s| s.parse().ok())
            .unwrap_or(plinko_drop::engine::DEFAULT_SEED);
        let settings = match std::env::var("PLINKO_SETTINGS") {
            Ok(json) => EngineSettings::from_json(&json)?,
            Err(_) => EngineSettings::default(),
        };

        let histogram = Rc::new(RefCell::new(vec![0u32; MULTIPLIERS.len()]));
        let payout = Rc::new(RefCell::new(0.0f32));
        let sink = {
            let histogram = Rc::clone(&histogram);
            let payout = Rc::clone(&payout);
            CallbackSink::new(
                move |e: LandingEvent| {
                    histogram.borrow_mut()[e.slot_index] += 1;
                    *payout.borrow_mut() += e.multiplier;
                },
                |s: StatsEvent| log::trace!("{} balls in flight", s.balls_in_flight),
            )
        };

        let config = EngineConfig::new(800.0, 700.0, MULTIPLIERS.to_vec())
            .with_seed(seed)
            .with_settings(settings);
        let mut engine = Engine::new(config, NullProxies::default(), sink)?;

        engine.drop_balls(BALLS, 50);
        let mut frames = 0;
        while (engine.balls_in_flight() > 0 || engine.pending_spawns() > 0) && frames < MAX_FRAMES {
            engine.frame(SIM_DT);
            frames += 1;
        }
        let stuck = engine.balls_in_flight();
        engine.destroy();

        log::info!(
            "{} balls settled in {} frames ({:.1}s simulated)",
            BALLS as usize - stuck,
            frames,
            frames as f32 * SIM_DT
        );
        for (slot, (count, m)) in histogram.borrow().iter().zip(MULTIPLIERS).enumerate() {
            println!("slot {:>2} x{:<4} {:>4} {}", slot + 1, m, count, "#".repeat(*count as usize));
        }
        println!("average payout: x{:.3}", *payout.borrow() / BALLS as f32);
        Ok(())
    }
}
