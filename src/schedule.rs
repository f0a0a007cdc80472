//! Cancellable delayed spawns
//!
//! Interval drops are tracked as explicit tasks against the engine clock,
//! which only moves inside `Engine::frame`. A cancelled task is gone from
//! the set immediately, so nothing spawns after `reset` or `destroy` even if
//! its due time has already passed.

/// Identifies a pending spawn task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpawnTaskId(pub u64);

#[derive(Debug, Clone)]
struct ScheduledSpawn {
    id: SpawnTaskId,
    due_ms: f64,
}

/// Pending spawn tasks ordered by due time
#[derive(Debug, Default)]
pub struct SpawnSchedule {
    /// Engine clock in milliseconds
    clock_ms: f64,
    tasks: Vec<ScheduledSpawn>,
    next_id: u64,
}

impl SpawnSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current engine clock in milliseconds
    pub fn clock_ms(&self) -> f64 {
        self.clock_ms
    }

    /// Queue a spawn `delay_ms` from now
    pub fn schedule(&mut self, delay_ms: f64) -> SpawnTaskId {
        self.next_id += 1;
        let id = SpawnTaskId(self.next_id);
        let due_ms = self.clock_ms + delay_ms.max(0.0);

        // Stable insert keeps equal due times in scheduling order
        let at = self.tasks.partition_point(|t| t.due_ms <= due_ms);
        self.tasks.insert(at, ScheduledSpawn { id, due_ms });
        id
    }

    /// Cancel one task. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: SpawnTaskId) -> bool {
        match self.tasks.iter().position(|t| t.id == id) {
            Some(idx) => {
                self.tasks.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Cancel every pending task, returning how many were dropped
    pub fn cancel_all(&mut self) -> usize {
        let n = self.tasks.len();
        self.tasks.clear();
        n
    }

    /// Move the clock forward and pop every task now due, in due order
    pub fn advance(&mut self, elapsed_ms: f64) -> Vec<SpawnTaskId> {
        if elapsed_ms.is_finite() && elapsed_ms > 0.0 {
            self.clock_ms += elapsed_ms;
        }
        let due = self.tasks.partition_point(|t| t.due_ms <= self.clock_ms);
        self.tasks.drain(..due).map(|t| t.id).collect()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
