//! Events emitted to the host

use serde::{Deserialize, Serialize};

/// A ball reached a scoring slot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandingEvent {
    /// Zero-based, always within `[0, slots - 1]`
    pub slot_index: usize,
    pub multiplier: f32,
}

/// Live statistics, sent whenever the ball count changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsEvent {
    pub balls_in_flight: usize,
}

/// Receiver for scoring and stats events
pub trait ResultsSink {
    fn on_landing(&mut self, event: LandingEvent);
    fn on_stats(&mut self, event: StatsEvent);
}

impl<T: ResultsSink + ?Sized> ResultsSink for Box<T> {
    fn on_landing(&mut self, event: LandingEvent) {
        (**self).on_landing(event)
    }

    fn on_stats(&mut self, event: StatsEvent) {
        (**self).on_stats(event)
    }
}

/// Sink backed by a pair of closures (`on_result` / `on_stats` callbacks)
pub struct CallbackSink<L, S>
where
    L: FnMut(LandingEvent),
    S: FnMut(StatsEvent),
{
    on_landing: L,
    on_stats: S,
}

impl<L, S> CallbackSink<L, S>
where
    L: FnMut(LandingEvent),
    S: FnMut(StatsEvent),
{
    pub fn new(on_landing: L, on_stats: S) -> Self {
        Self {
            on_landing,
            on_stats,
        }
    }
}

impl<L, S> ResultsSink for CallbackSink<L, S>
where
    L: FnMut(LandingEvent),
    S: FnMut(StatsEvent),
{
    fn on_landing(&mut self, event: LandingEvent) {
        (self.on_landing)(event)
    }

    fn on_stats(&mut self, event: StatsEvent) {
        (self.on_stats)(event)
    }
}
