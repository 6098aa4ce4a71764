//! Render utility helpers.
//!
//! This module is intentionally small and dependency-light. It provides the
//! timing helper interactive demos need for smooth, frame-rate-independent
//! animation (the explorer's auto-spin mode).

use std::time::{Duration, Instant};

/// A simple frame timer that tracks:
/// - `elapsed`: seconds since creation
/// - `dt`: seconds since the last `tick()`
///
/// Typical usage:
/// - Create once in your state: `let mut clock = FrameClock::new();`
/// - Each frame: `let dt = clock.tick();`
///
/// Note:
/// - `tick()` clamps unreasonable `dt` (e.g. when resuming from a breakpoint).
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last: Instant,
    /// Max dt allowed from `tick()` (in seconds).
    max_dt: f32,
}

impl FrameClock {
    /// Create a new clock with a reasonable default `max_dt` clamp.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
            max_dt: 0.1, // 100ms
        }
    }

    /// Set the `max_dt` clamp for `tick()`.
    #[inline]
    pub fn with_max_dt(mut self, max_dt: f32) -> Self {
        self.max_dt = max_dt.max(0.0);
        self
    }

    /// Seconds since this clock was created.
    #[inline]
    pub fn elapsed_s(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }

    /// Duration since this clock was created.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Advance the clock and return `dt` in seconds.
    ///
    /// `dt` is clamped to `[0, max_dt]` to avoid destabilizing animations.
    #[inline]
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let dt = (now - self.last).as_secs_f32();
        self.last = now;
        dt.clamp(0.0, self.max_dt)
    }

    /// Reset the clock start time (and last tick) to now.
    #[inline]
    pub fn reset(&mut self) {
        let now = Instant::now();
        self.start = now;
        self.last = now;
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
