//! Time system for the Enjon engine
//!
//! Countdown timers used by effects and transient entities, plus the
//! fixed-step frame clock that drives the simulation tick.

use serde::{Deserialize, Serialize};

/// A countdown timer. `current` falls by `dt` every tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Timer {
    pub current: f32,
    pub dt: f32,
    pub total_duration: f32,
}

impl Timer {
    /// Create a full timer that expires after `total_duration / dt` ticks
    pub fn new(total_duration: f32, dt: f32) -> Self {
        Self {
            current: total_duration,
            dt,
            total_duration,
        }
    }

    /// Advance by one step. Returns `true` once the timer has run out.
    pub fn tick(&mut self) -> bool {
        self.current -= self.dt;
        self.is_expired()
    }

    pub fn is_expired(&self) -> bool {
        self.current <= 0.0
    }

    /// Refill to the full duration
    pub fn reset(&mut self) {
        self.current = self.total_duration;
    }

    /// Fraction of the duration remaining, 0.0 to 1.0
    pub fn fraction_remaining(&self) -> f32 {
        if self.total_duration <= 0.0 {
            return 0.0;
        }
        (self.current / self.total_duration).clamp(0.0, 1.0)
    }
}

/// Configuration for the frame clock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeConfig {
    /// Simulation seconds per real second
    pub time_scale: f32,
    /// Fixed timestep of one simulation tick (in seconds)
    pub fixed_timestep: f32,
    /// Maximum delta time to prevent spiral of death
    pub max_delta_time: f32,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            fixed_timestep: 1.0 / 60.0,
            max_delta_time: 0.25,
        }
    }
}

/// Accumulates real frame time and hands out whole simulation ticks
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    pub config: TimeConfig,
    /// Simulated seconds since start
    pub total_time: f64,
    /// Ticks handed out so far
    pub tick_count: u64,
    pub paused: bool,
    accumulator: f32,
}

impl FrameClock {
    pub fn new(config: TimeConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Feed the raw delta of the previous frame
    pub fn advance(&mut self, raw_delta: f32) {
        if self.paused {
            return;
        }
        let delta = raw_delta.min(self.config.max_delta_time) * self.config.time_scale;
        self.total_time += delta as f64;
        self.accumulator += delta;
    }

    /// Number of fixed ticks to run this frame
    pub fn drain_ticks(&mut self) -> u32 {
        let step = self.config.fixed_timestep;
        if step <= 0.0 {
            return 0;
        }
        let mut ticks = 0;
        while self.accumulator >= step {
            self.accumulator -= step;
            ticks += 1;
        }
        self.tick_count += ticks as u64;
        ticks
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_expires_after_duration() {
        let mut timer = Timer::new(1.0, 0.25);
        assert!(!timer.tick());
        assert!(!timer.tick());
        assert!(!timer.tick());
        assert!(timer.tick());
        assert!(timer.is_expired());
    }

    #[test]
    fn test_timer_reset() {
        let mut timer = Timer::new(2.0, 1.0);
        timer.tick();
        timer.reset();
        assert_eq!(timer.current, 2.0);
        assert_eq!(timer.fraction_remaining(), 1.0);
    }

    #[test]
    fn test_frame_clock_fixed_steps() {
        let mut clock = FrameClock::new(TimeConfig {
            time_scale: 1.0,
            fixed_timestep: 0.1,
            max_delta_time: 1.0,
        });
        clock.advance(0.35);
        assert_eq!(clock.drain_ticks(), 3);
        clock.advance(0.06);
        assert_eq!(clock.drain_ticks(), 1);
        assert_eq!(clock.tick_count, 4);
    }

    #[test]
    fn test_frame_clock_clamps_delta() {
        let mut clock = FrameClock::new(TimeConfig {
            time_scale: 1.0,
            fixed_timestep: 0.1,
            max_delta_time: 0.25,
        });
        clock.advance(10.0);
        assert_eq!(clock.drain_ticks(), 2);
    }

    #[test]
    fn test_paused_clock_yields_nothing() {
        let mut clock = FrameClock::default();
        clock.toggle_pause();
        clock.advance(1.0);
        assert_eq!(clock.drain_ticks(), 0);
    }
}
