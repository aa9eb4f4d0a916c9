//! Simulation clock.
//!
//! Tracks game time separately from wall time so that time spent paused
//! never reaches the simulation.

#[derive(Debug, Clone, Default)]
pub struct Clock {
    /// Game time at the last update, seconds.
    pub now: f64,
    /// Game time elapsed between the last two updates.
    pub dt: f64,
    /// Wall time we paused at.
    paused: Option<f64>,
    /// Total wall time spent paused.
    offset: f64,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances to wall time `real`. Does nothing while paused.
    pub fn update(&mut self, real: f64) {
        if self.paused.is_some() {
            return;
        }
        let adjusted = real - self.offset;
        self.dt = adjusted - self.now;
        self.now = adjusted;
    }

    pub fn pause(&mut self, real: f64) {
        if self.paused.is_none() {
            self.paused = Some(real);
        }
    }

    pub fn resume(&mut self, real: f64) {
        if let Some(at) = self.paused.take() {
            self.offset += real - at;
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused.is_some()
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }
}
