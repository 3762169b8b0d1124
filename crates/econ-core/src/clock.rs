//! Time Sources
//!
//! Births are paced in seconds. Where those seconds come from is decided
//! here: a real clock, a clock the caller advances by hand, or a fixed
//! amount of simulated time per tick.

use bevy_ecs::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// A monotonic source of elapsed seconds
pub trait Clock: Send + Sync {
    /// Seconds since the clock was created
    fn elapsed_secs(&self) -> f64;
}

/// Wall-clock time since construction
#[derive(Debug, Clone)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same reading, so a test can keep one handle and give
/// another to the economy.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    bits: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, secs: f64) {
        self.set(self.elapsed_secs() + secs);
    }

    pub fn set(&self, secs: f64) {
        self.bits.store(secs.to_bits(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn elapsed_secs(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::SeqCst))
    }
}

/// How birth pacing measures elapsed time
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum BirthTiming {
    /// Real seconds from the injected clock
    #[default]
    WallClock,
    /// Each tick counts as `seconds_per_tick` scaled by the time speed
    SimulatedTicks { seconds_per_tick: f64 },
}

/// Resource: the elapsed-time source used for births
#[derive(Resource)]
pub struct TimeKeeper {
    clock: Box<dyn Clock>,
    timing: BirthTiming,
    simulated_secs: f64,
}

impl TimeKeeper {
    pub fn new(clock: Box<dyn Clock>, timing: BirthTiming) -> Self {
        Self {
            clock,
            timing,
            simulated_secs: 0.0,
        }
    }

    pub fn wall_clock() -> Self {
        Self::new(Box::new(SystemClock::new()), BirthTiming::WallClock)
    }

    pub fn timing(&self) -> BirthTiming {
        self.timing
    }

    /// Account for one tick at the given time speed
    pub fn on_tick(&mut self, time_speed: f64) {
        if let BirthTiming::SimulatedTicks { seconds_per_tick } = self.timing {
            self.simulated_secs += seconds_per_tick * time_speed;
        }
    }

    /// Seconds elapsed under the configured timing
    pub fn elapsed(&self) -> f64 {
        match self.timing {
            BirthTiming::WallClock => self.clock.elapsed_secs(),
            BirthTiming::SimulatedTicks { .. } => self.simulated_secs,
        }
    }
}

impl Default for TimeKeeper {
    fn default() -> Self {
        Self::wall_clock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::new();
        let handle = clock.clone();
        handle.advance(1.5);
        assert_eq!(clock.elapsed_secs(), 1.5);
    }

    #[test]
    fn test_wall_clock_ignores_ticks() {
        let clock = ManualClock::new();
        let mut keeper = TimeKeeper::new(Box::new(clock.clone()), BirthTiming::WallClock);
        keeper.on_tick(1.0);
        assert_eq!(keeper.elapsed(), 0.0);
        clock.advance(2.0);
        assert_eq!(keeper.elapsed(), 2.0);
    }

    #[test]
    fn test_simulated_ticks_scale_with_speed() {
        let mut keeper = TimeKeeper::new(
            Box::new(ManualClock::new()),
            BirthTiming::SimulatedTicks { seconds_per_tick: 0.5 },
        );
        keeper.on_tick(1.0);
        keeper.on_tick(2.0);
        assert_eq!(keeper.elapsed(), 1.5);
    }
}
