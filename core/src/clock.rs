//! Simulation clock — owns tick state and pause.

use crate::types::{Tick, TICK_DELTA};

#[derive(Debug, Clone, PartialEq)]
pub struct SimClock {
    pub current_tick: Tick,
    pub paused:       bool,
}

impl SimClock {
    pub fn new() -> Self {
        Self {
            current_tick: 0,
            paused: true,
        }
    }

    /// Advance one tick. Returns the new tick number.
    /// Panics if called while paused — callers must check.
    pub fn advance(&mut self) -> Tick {
        assert!(!self.paused, "advance() called on paused clock");
        self.current_tick += 1;
        self.current_tick
    }

    pub fn pause(&mut self)  { self.paused = true;  }
    pub fn resume(&mut self) { self.paused = false; }

    /// Simulated seconds covered by one tick. The timestep is fixed so a
    /// run is a pure function of its seed.
    pub fn tick_delta(&self) -> f32 {
        TICK_DELTA
    }
}

impl Default for SimClock {
    fn default() -> Self { Self::new() }
}
