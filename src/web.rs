//! Browser host binding
//!
//! Exposes the engine to a JS render loop. The JS side owns the sprites and
//! passes plain callbacks for proxy management and results.

use glam::Vec2;
use js_sys::Function;
use wasm_bindgen::prelude::*;

use crate::engine::{Engine, EngineConfig};
use crate::events::{LandingEvent, ResultsSink, StatsEvent};
use crate::render::{DetachedHandles, ProxyHandle, VisualProxies};
use crate::settings::EngineSettings;
use crate::sim::BoardLayout;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    // Already initialised when the module is re-instantiated
    let _ = console_log::init_with_level(log::Level::Info);
}

/// Sprite callbacks supplied by the page
struct JsProxies {
    create: Function,
    set_position: Function,
    destroy: Function,
    board_rebuilt: Option<Function>,
    detached: DetachedHandles,
}

impl VisualProxies for JsProxies {
    fn create(&mut self, pos: Vec2) -> ProxyHandle {
        match self
            .create
            .call2(&JsValue::NULL, &pos.x.into(), &pos.y.into())
        {
            Ok(v) => match v.as_f64() {
                Some(id) if id >= 0.0 && id < (1u64 << 53) as f64 => ProxyHandle(id as u64),
                _ => {
                    log::error!("create proxy returned {:?}, ball has no visual", v);
                    self.detached.next_handle()
                }
            },
            Err(e) => {
                log::error!("create proxy failed: {:?}", e);
                self.detached.next_handle()
            }
        }
    }

    fn set_position(&mut self, handle: ProxyHandle, pos: Vec2) {
        if DetachedHandles::is_detached(handle) {
            return;
        }
        let args = js_sys::Array::of3(
            &(handle.0 as f64).into(),
            &pos.x.into(),
            &pos.y.into(),
        );
        if let Err(e) = self.set_position.apply(&JsValue::NULL, &args) {
            log::warn!("set_position failed: {:?}", e);
        }
    }

    fn destroy(&mut self, handle: ProxyHandle) {
        if DetachedHandles::is_detached(handle) {
            return;
        }
        if let Err(e) = self.destroy.call1(&JsValue::NULL, &(handle.0 as f64).into()) {
            log::warn!("destroy proxy failed: {:?}", e);
        }
    }

    fn board_rebuilt(&mut self, layout: &BoardLayout) {
        let Some(callback) = &self.board_rebuilt else {
            return;
        };
        match serde_json::to_string(layout) {
            Ok(json) => {
                if let Err(e) = callback.call1(&JsValue::NULL, &json.into()) {
                    log::warn!("board_rebuilt callback failed: {:?}", e);
                }
            }
            Err(e) => log::error!("failed to serialize layout: {}", e),
        }
    }
}

/// Result callbacks supplied by the page
struct JsSink {
    on_result: Function,
    on_stats: Function,
}

impl ResultsSink for JsSink {
    fn on_landing(&mut self, event: LandingEvent) {
        if let Err(e) = self.on_result.call2(
            &JsValue::NULL,
            &(event.slot_index as u32).into(),
            &event.multiplier.into(),
        ) {
            log::warn!("onResult callback failed: {:?}", e);
        }
    }

    fn on_stats(&mut self, event: StatsEvent) {
        if let Err(e) = self
            .on_stats
            .call1(&JsValue::NULL, &(event.balls_in_flight as u32).into())
        {
            log::warn!("onStats callback failed: {:?}", e);
        }
    }
}

/// JS-facing engine handle
#[wasm_bindgen]
pub struct PlinkoEngine {
    inner: Option<Engine<JsProxies, JsSink>>,
}

#[wasm_bindgen]
impl PlinkoEngine {
    /// `settings_json` may be empty to use the defaults
    #[wasm_bindgen(constructor)]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        width: f32,
        height: f32,
        multipliers: Vec<f32>,
        seed: f64,
        settings_json: &str,
        create_proxy: Function,
        move_proxy: Function,
        destroy_proxy: Function,
        board_rebuilt: Option<Function>,
        on_result: Function,
        on_stats: Function,
    ) -> Result<PlinkoEngine, JsError> {
        let settings = if settings_json.trim().is_empty() {
            EngineSettings::default()
        } else {
            EngineSettings::from_json(settings_json)?
        };
        let config = EngineConfig::new(width, height, multipliers)
            .with_seed(seed as u64)
            .with_settings(settings);
        let proxies = JsProxies {
            create: create_proxy,
            set_position: move_proxy,
            destroy: destroy_proxy,
            board_rebuilt,
            detached: DetachedHandles::new(),
        };
        let sink = JsSink {
            on_result,
            on_stats,
        };
        let engine = Engine::new(config, proxies, sink)?;
        Ok(Self {
            inner: Some(engine),
        })
    }

    /// Per-frame callback; `elapsed_ms` is the ticker's elapsed time
    pub fn tick(&mut self, elapsed_ms: f64) {
        if let Some(engine) = self.inner.as_mut() {
            engine.frame((elapsed_ms / 1000.0) as f32);
        }
    }

    #[wasm_bindgen(js_name = drop)]
    pub fn drop_balls(&mut self, count: u32, interval_ms: u32) {
        if let Some(engine) = self.inner.as_mut() {
            engine.drop_balls(count, interval_ms);
        }
    }

    pub fn reset(&mut self) {
        if let Some(engine) = self.inner.as_mut() {
            engine.reset();
        }
    }

    #[wasm_bindgen(js_name = setSpeed)]
    pub fn set_speed(&mut self, speed: f32) {
        if let Some(engine) = self.inner.as_mut() {
            engine.set_speed(speed);
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        if let Some(engine) = self.inner.as_mut() {
            engine.resize(width, height);
        }
    }

    #[wasm_bindgen(js_name = ballsInFlight)]
    pub fn balls_in_flight(&self) -> u32 {
        self.inner
            .as_ref()
            .map(|e| e.balls_in_flight() as u32)
            .unwrap_or(0)
    }

    /// Safe to call more than once; later calls do nothing
    pub fn destroy(&mut self) {
        if let Some(engine) = self.inner.take() {
            engine.destroy();
        } else {
            log::warn!("PlinkoEngine.destroy called twice");
        }
    }
}
